//! Palette reduction: histogram, spatial-hash agglomeration, truncation,
//! null-color selection, and repaint (spec 4.1).

use crate::color::{dist, pack, relaxed_eq, unpack, ColorRecord};
use crate::error::{Result, VectorizeError};
use crate::image_processor::ImageData;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rgb::RGBA8;
use std::collections::HashMap;

/// Source of random bytes for null-color selection (spec 4.1 Phase D).
/// Injectable so tests can make the pick deterministic.
pub trait RandSource {
    fn next_rgb(&mut self) -> (u8, u8, u8);
}

/// Default random source backed by the thread-local RNG.
pub struct ThreadRandSource;

impl RandSource for ThreadRandSource {
    fn next_rgb(&mut self) -> (u8, u8, u8) {
        let mut rng = rand::thread_rng();
        (rng.r#gen(), rng.r#gen(), rng.r#gen())
    }
}

/// Deterministic random source for tests: a seeded PRNG.
pub struct SeededRandSource {
    rng: StdRng,
}

impl SeededRandSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandSource for SeededRandSource {
    fn next_rgb(&mut self) -> (u8, u8, u8) {
        (self.rng.r#gen(), self.rng.r#gen(), self.rng.r#gen())
    }
}

/// The result of palette reduction: the retained palette and the source
/// image repainted to only use palette colors (or the null color for
/// originally-transparent pixels).
#[derive(Debug)]
pub struct PaletteResult {
    pub palette: Vec<RGBA8>,
    pub null_color: RGBA8,
    pub repainted: ImageData,
}

/// Default spatial-hash cube side. An RGB-only hash would default to 10;
/// this implementation always hashes all four channels, so it uses the
/// alpha-participating default of 5.
pub const DEFAULT_HASH_WIDTH: u32 = 5;

/// Phase A: histogram distinct colors (including alpha) by exact value.
pub fn histogram(image: &ImageData) -> Vec<ColorRecord> {
    let mut counts: HashMap<u32, u64> = HashMap::new();
    for &p in &image.pixels {
        *counts.entry(pack(p)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| ColorRecord {
            color: unpack(key),
            count,
        })
        .collect()
}

/// Fixed integer spatial hash: multiply-xor with four odd constants,
/// absolute value.
fn spatial_hash(r: i64, g: i64, b: i64, a: i64) -> i64 {
    const C1: i64 = 73_856_093;
    const C2: i64 = 19_349_669;
    const C3: i64 = 83_492_791;
    const C4: i64 = 2_654_435_761;
    (r.wrapping_mul(C1) ^ g.wrapping_mul(C2) ^ b.wrapping_mul(C3) ^ a.wrapping_mul(C4)).abs()
}

/// Phase B: spatial-hash agglomeration. Merges colors within `hash_width`
/// of each other into whichever has the larger count, in place. Tombstoned
/// (absorbed) records are left with `count == 0`.
///
/// Because each color only scans its own bucket, two colors within
/// `hash_width` that straddle a cube boundary can land in different buckets
/// and miss each other entirely — an accepted approximation, not a bug.
pub fn agglomerate(records: &mut [ColorRecord], hash_width: u32) {
    let n = records.len();
    if n == 0 {
        return;
    }
    let t = (5 * n) as i64;
    let w = hash_width as i64;

    let mut buckets: HashMap<i64, Vec<usize>> = HashMap::new();
    for (i, rec) in records.iter().enumerate() {
        let c = rec.color;
        let bucket = spatial_hash(
            c.r as i64 / w.max(1),
            c.g as i64 / w.max(1),
            c.b as i64 / w.max(1),
            c.a as i64 / w.max(1),
        ) % t.max(1);
        buckets.entry(bucket).or_default().push(i);
    }

    for i in 0..n {
        if records[i].count == 0 {
            continue;
        }
        let c = records[i].color;
        let bucket = spatial_hash(
            c.r as i64 / w.max(1),
            c.g as i64 / w.max(1),
            c.b as i64 / w.max(1),
            c.a as i64 / w.max(1),
        ) % t.max(1);

        let Some(candidates) = buckets.get(&bucket) else {
            continue;
        };
        let candidates = candidates.clone();

        for j in candidates {
            if j == i || records[i].count == 0 || records[j].count == 0 {
                continue;
            }
            if dist(records[i].color, records[j].color) < hash_width as f64 {
                let (dom, sub) = if records[i].count >= records[j].count {
                    (i, j)
                } else {
                    (j, i)
                };
                let absorbed = records[sub].count;
                records[dom].count += absorbed;
                records[sub].count = 0;
            }
        }
    }
}

/// Phase C: drop tombstones, sort by count descending (stable), keep the
/// first `k`.
pub fn truncate(mut records: Vec<ColorRecord>, k: usize) -> Vec<ColorRecord> {
    records.retain(|r| r.count > 0);
    records.sort_by(|a, b| b.count.cmp(&a.count));
    records.truncate(k);
    records
}

/// Phase D: pick a null color not (relaxed-)equal to any palette entry.
pub fn pick_null_color(palette: &[RGBA8], rand: &mut dyn RandSource) -> RGBA8 {
    loop {
        let (r, g, b) = rand.next_rgb();
        let candidate = RGBA8::new(r, g, b, 255);
        if !palette.iter().any(|&p| relaxed_eq(p, candidate)) {
            return candidate;
        }
    }
}

/// Phase E: repaint the source image to only use palette colors, mapping
/// originally-fully-transparent pixels to the null color.
pub fn repaint(image: &ImageData, palette: &[RGBA8], null_color: RGBA8) -> ImageData {
    let mut pixels = Vec::with_capacity(image.pixels.len());
    for &p in &image.pixels {
        let out = if p.r == 0 && p.g == 0 && p.b == 0 && p.a == 0 {
            null_color
        } else {
            *palette
                .iter()
                .min_by(|&&a, &&b| dist(a, p).partial_cmp(&dist(b, p)).unwrap())
                .expect("palette is non-empty when repaint is reached")
        };
        pixels.push(out);
    }
    ImageData {
        width: image.width,
        height: image.height,
        pixels,
    }
}

/// Run the full palette-reduction pipeline (4.1, Phases A-E).
pub fn reduce_palette(
    image: &ImageData,
    k: usize,
    hash_width: u32,
    rand: &mut dyn RandSource,
) -> Result<PaletteResult> {
    if k == 0 {
        return Err(VectorizeError::Input(
            "palette size K must be >= 1".to_string(),
        ));
    }
    let mut records = histogram(image);
    if records.is_empty() {
        return Err(VectorizeError::Empty(
            "source image has zero area".to_string(),
        ));
    }

    agglomerate(&mut records, hash_width);
    let records = truncate(records, k);
    let palette: Vec<RGBA8> = records.iter().map(|r| r.color).collect();

    let null_color = pick_null_color(&palette, rand);
    let repainted = repaint(image, &palette, null_color);

    Ok(PaletteResult {
        palette,
        null_color,
        repainted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(w: u32, h: u32, c: RGBA8) -> ImageData {
        ImageData {
            width: w,
            height: h,
            pixels: vec![c; (w * h) as usize],
        }
    }

    #[test]
    fn histogram_counts_distinct_colors() {
        let mut img = solid_image(2, 2, RGBA8::new(1, 1, 1, 255));
        img.set(0, 0, RGBA8::new(9, 9, 9, 255));
        let hist = histogram(&img);
        assert_eq!(hist.len(), 2);
        let total: u64 = hist.iter().map(|r| r.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn truncate_keeps_top_k_by_count_stable() {
        let records = vec![
            ColorRecord { color: RGBA8::new(1, 0, 0, 255), count: 5 },
            ColorRecord { color: RGBA8::new(2, 0, 0, 255), count: 9 },
            ColorRecord { color: RGBA8::new(3, 0, 0, 255), count: 9 },
        ];
        let kept = truncate(records, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].color, RGBA8::new(2, 0, 0, 255));
        assert_eq!(kept[1].color, RGBA8::new(3, 0, 0, 255));
    }

    #[test]
    fn agglomeration_merges_close_colors_scenario_d() {
        // Scenario D: two colors 3 apart in each RGB channel, roughly equal
        // counts, hash_width=10 comfortably exceeds the distance so they
        // land in the same bucket and merge.
        let mut records = vec![
            ColorRecord { color: RGBA8::new(100, 100, 100, 255), count: 50 },
            ColorRecord { color: RGBA8::new(103, 103, 103, 255), count: 48 },
        ];
        agglomerate(&mut records, 10);
        let survivors: Vec<_> = records.iter().filter(|r| r.count > 0).collect();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].count, 98);
    }

    #[test]
    fn null_color_never_matches_palette() {
        let palette = vec![RGBA8::new(1, 2, 3, 255)];
        struct FixedThenRandom(Vec<(u8, u8, u8)>);
        impl RandSource for FixedThenRandom {
            fn next_rgb(&mut self) -> (u8, u8, u8) {
                if self.0.is_empty() {
                    (200, 200, 200)
                } else {
                    self.0.remove(0)
                }
            }
        }
        let mut src = FixedThenRandom(vec![(1, 2, 3), (1, 2, 3)]);
        let null = pick_null_color(&palette, &mut src);
        assert_eq!(null, RGBA8::new(200, 200, 200, 255));
    }

    #[test]
    fn repaint_maps_transparent_pixels_to_null_color() {
        let img = ImageData {
            width: 1,
            height: 1,
            pixels: vec![RGBA8::new(0, 0, 0, 0)],
        };
        let palette = vec![RGBA8::new(9, 9, 9, 255)];
        let null = RGBA8::new(42, 42, 42, 255);
        let out = repaint(&img, &palette, null);
        assert_eq!(out.pixels[0], null);
    }

    #[test]
    fn repaint_picks_nearest_palette_color_first_on_tie() {
        let img = ImageData {
            width: 1,
            height: 1,
            pixels: vec![RGBA8::new(5, 5, 5, 255)],
        };
        // Both palette entries are equidistant from (5,5,5,255).
        let palette = vec![RGBA8::new(0, 0, 0, 255), RGBA8::new(10, 10, 10, 255)];
        let out = repaint(&img, &palette, RGBA8::new(255, 0, 255, 255));
        assert_eq!(out.pixels[0], palette[0]);
    }

    #[test]
    fn reduce_palette_rejects_zero_k() {
        let img = solid_image(1, 1, RGBA8::new(1, 1, 1, 255));
        let mut rand = SeededRandSource::new(1);
        let err = reduce_palette(&img, 0, DEFAULT_HASH_WIDTH, &mut rand).unwrap_err();
        assert!(matches!(err, VectorizeError::Input(_)));
    }

    #[test]
    fn reduce_palette_retains_min_k_post_merge_count() {
        let img = solid_image(4, 4, RGBA8::new(1, 1, 1, 255));
        let mut rand = SeededRandSource::new(1);
        let result = reduce_palette(&img, 5, DEFAULT_HASH_WIDTH, &mut rand).unwrap();
        assert_eq!(result.palette.len(), 1);
    }
}
