//! SVG emission: loop ordering, the transparency mask, and path generation
//! via straight segments or centripetal Catmull-Rom-derived cubic Béziers
//! (spec 4.5).

use crate::color::relaxed_eq;
use crate::region::Region;
use rgb::RGBA8;
use std::fmt::Write as _;

/// Below this interior-angle threshold (degrees) a vertex is a sharp corner
/// and gets a straight segment instead of a curve.
const CORNER_THRESHOLD_DEG: f64 = 122.0;

/// Loops simplified down to this many vertices or fewer are always drawn
/// with straight segments, smoothing or not.
const MIN_VERTICES_FOR_SMOOTHING: usize = 5;

type Pt = (f64, f64);

struct DrawLoop<'a> {
    color: RGBA8,
    area: f64,
    points: &'a [(i32, i32)],
    ideal_length: usize,
    is_null: bool,
}

/// Render the full SVG document for a segmented, simplified image.
pub fn emit_svg(width: u32, height: u32, regions: &[Region], null_color: RGBA8, smooth: bool) -> String {
    let mut loops: Vec<DrawLoop> = Vec::new();
    for region in regions {
        for lp in &region.loops {
            loops.push(DrawLoop {
                color: region.color,
                area: lp.area,
                points: &lp.simplified,
                ideal_length: lp.ideal_length,
                is_null: relaxed_eq(region.color, null_color),
            });
        }
    }
    loops.sort_by(|a, b| b.area.partial_cmp(&a.area).unwrap_or(std::cmp::Ordering::Equal));

    // A null loop is the background only when it is the overall
    // area-largest loop in the scene, not merely the largest among
    // null-colored loops. A hole surrounded by a bigger filled shape must
    // still be punched into the mask.
    let background_is_null = loops.first().is_some_and(|l| l.is_null);

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">"#
    );
    let _ = writeln!(out, r#"<defs><mask id="sceneMask">"#);
    let _ = writeln!(
        out,
        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="white"/>"#
    );
    for (i, lp) in loops.iter().enumerate() {
        if !lp.is_null || (i == 0 && background_is_null) {
            continue;
        }
        let d = path_data(lp.points, lp.ideal_length, smooth);
        if d.is_empty() {
            continue;
        }
        let _ = writeln!(out, r#"<path d="{d}" fill="black"/>"#);
    }
    let _ = writeln!(out, "</mask></defs>");

    for lp in &loops {
        if lp.is_null {
            continue;
        }
        let d = path_data(lp.points, lp.ideal_length, smooth);
        if d.is_empty() {
            continue;
        }
        let opacity = lp.color.a as f64 / 255.0 * 100.0;
        let _ = writeln!(
            out,
            r#"<path d="{d}" fill="rgb({},{},{})" fill-opacity="{opacity}%" mask="url(#sceneMask)"/>"#,
            lp.color.r, lp.color.g, lp.color.b
        );
    }
    let _ = writeln!(out, "</svg>");
    out
}

fn path_data(points: &[(i32, i32)], ideal_length: usize, smooth: bool) -> String {
    let n = points.len();
    if n == 0 {
        return String::new();
    }
    if n < 3 {
        // Not a real polygon; draw whatever segments exist, no fill region.
        let mut d = format!("M{} {}", points[0].0, points[0].1);
        for &(x, y) in &points[1..] {
            let _ = write!(d, " L{x} {y}");
        }
        return d;
    }

    let fpts: Vec<Pt> = points.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
    let use_lines_only = !smooth || ideal_length <= MIN_VERTICES_FOR_SMOOTHING;

    let mut d = format!("M{} {}", points[0].0, points[0].1);
    for i in 0..n {
        let next = (i + 1) % n;
        let (nx, ny) = points[next];

        let sharp = use_lines_only || is_sharp(&fpts, i) || is_sharp(&fpts, next);
        if sharp {
            let _ = write!(d, " L{nx} {ny}");
            continue;
        }

        let p0 = fpts[(i + n - 1) % n];
        let p1 = fpts[i];
        let p2 = fpts[next];
        let p3 = fpts[(next + 1) % n];
        match catmull_rom_to_bezier(p0, p1, p2, p3) {
            Some((c1, c2)) => {
                let _ = write!(d, " C{} {} {} {} {} {}", c1.0, c1.1, c2.0, c2.1, nx, ny);
            }
            None => {
                let _ = write!(d, " L{nx} {ny}");
            }
        }
    }
    d.push('Z');
    d
}

fn is_sharp(points: &[Pt], i: usize) -> bool {
    let n = points.len();
    let p = points[(i + n - 1) % n];
    let v = points[i];
    let q = points[(i + 1) % n];
    angle_degrees(p, v, q) < CORNER_THRESHOLD_DEG
}

fn angle_degrees(p: Pt, v: Pt, q: Pt) -> f64 {
    let v1 = (p.0 - v.0, p.1 - v.1);
    let v2 = (q.0 - v.0, q.1 - v.1);
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let len1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let len2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if len1 == 0.0 || len2 == 0.0 {
        return 180.0;
    }
    let cos_a = (dot / (len1 * len2)).clamp(-1.0, 1.0);
    cos_a.acos().to_degrees()
}

/// Centripetal Catmull-Rom (alpha = 0.5) through p0,p1,p2,p3, returning the
/// two cubic Bézier control points for the p1->p2 segment. `None` if any two
/// of the four control vertices coincide (degenerate; caller falls back to
/// a straight line).
fn catmull_rom_to_bezier(p0: Pt, p1: Pt, p2: Pt, p3: Pt) -> Option<(Pt, Pt)> {
    if p0 == p1 || p1 == p2 || p2 == p3 || p0 == p2 || p1 == p3 || p0 == p3 {
        return None;
    }

    let alpha = 0.5;
    let t0 = 0.0f64;
    let t1 = t0 + dist(p0, p1).powf(alpha);
    let t2 = t1 + dist(p1, p2).powf(alpha);
    let t3 = t2 + dist(p2, p3).powf(alpha);

    let m1 = scale(
        sub(
            sub(scale(sub(p1, p0), 1.0 / (t1 - t0)), scale(sub(p2, p0), 1.0 / (t2 - t0))),
            scale(sub(p2, p1), -1.0 / (t2 - t1)),
        ),
        t2 - t1,
    );
    let m2 = scale(
        sub(
            sub(scale(sub(p2, p1), 1.0 / (t2 - t1)), scale(sub(p3, p1), 1.0 / (t3 - t1))),
            scale(sub(p3, p2), -1.0 / (t3 - t2)),
        ),
        t2 - t1,
    );

    let c1 = add(p1, scale(m1, 1.0 / 3.0));
    let c2 = sub(p2, scale(m2, 1.0 / 3.0));
    Some((c1, c2))
}

#[inline]
fn dist(a: Pt, b: Pt) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
#[inline]
fn sub(a: Pt, b: Pt) -> Pt {
    (a.0 - b.0, a.1 - b.1)
}
#[inline]
fn add(a: Pt, b: Pt) -> Pt {
    (a.0 + b.0, a.1 + b.1)
}
#[inline]
fn scale(a: Pt, s: f64) -> Pt {
    (a.0 * s, a.1 * s)
}
