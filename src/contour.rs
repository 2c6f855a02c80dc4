//! Contour tracing: a greedy 8-neighbor walk over a region's unmatched
//! boundary pixels, with distance-based backtracking and a jump-recovery
//! step (spec 4.3).

use crate::region::Region;
use rgb::RGBA8;
use std::collections::HashSet;

/// Fixed neighbor priority: up, left, down, right, down-right, down-left,
/// up-right, up-left.
const PRIORITY: [(i32, i32); 8] = [
    (0, -1),
    (-1, 0),
    (0, 1),
    (1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// An ordered traversal of a region's boundary pixels, plus the data later
/// stages attach to it.
#[derive(Debug, Clone)]
pub struct Loop {
    pub points: Vec<(i32, i32)>,
    pub closed: bool,
    pub color: RGBA8,
    pub simplified: Vec<(i32, i32)>,
    pub area: f64,
    pub ideal_length: usize,
    pub ideal_error: f64,
}

impl Loop {
    pub fn new(points: Vec<(i32, i32)>, closed: bool) -> Self {
        Self {
            points,
            closed,
            color: RGBA8::new(0, 0, 0, 0),
            simplified: Vec::new(),
            area: 0.0,
            ideal_length: 0,
            ideal_error: 0.0,
        }
    }
}

#[inline]
fn decode(key: u32, width: u32) -> (i32, i32) {
    ((key % width) as i32, (key / width) as i32)
}

#[inline]
fn encode(x: i32, y: i32, width: u32) -> u32 {
    y as u32 * width + x as u32
}

#[inline]
fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}

#[inline]
fn chebyshev(a: (i32, i32), b: (i32, i32)) -> i32 {
    (a.0 - b.0).abs().max((a.1 - b.1).abs())
}

#[inline]
fn euclid(a: (i32, i32), b: (i32, i32)) -> f64 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Find the unmatched coordinate closest (Euclidean) to `from`. Ties break
/// on the lowest encoded key for determinism.
fn find_closest(unmatched: &HashSet<u32>, from: (i32, i32), width: u32) -> Option<(u32, (i32, i32), f64)> {
    let mut best: Option<(u32, (i32, i32), f64)> = None;
    for &key in unmatched {
        let pt = decode(key, width);
        let d = euclid(pt, from);
        let better = match &best {
            None => true,
            Some((bkey, _, bd)) => d < *bd || (d == *bd && key < *bkey),
        };
        if better {
            best = Some((key, pt, d));
        }
    }
    best
}

/// Trace all loops out of a region's unmatched boundary pixels, draining the
/// set. Each loop is appended to `region.loops`; callers should then call
/// [`crate::region::Region::keep_longest_loop`].
pub fn trace_region(region: &mut Region, width: u32, height: u32) {
    let cap = width as usize * height as usize;

    while let Some(&start_key) = region.unmatched.iter().next() {
        region.unmatched.remove(&start_key);
        let start = decode(start_key, width);

        let mut points = vec![start];
        let curr = start;
        let mut nxt = start;
        let mut moved_once = false;
        let mut open = false;
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > cap {
                open = true;
                break;
            }

            let mut advanced = false;
            for &(dx, dy) in &PRIORITY {
                let cand = (nxt.0 + dx, nxt.1 + dy);
                if !in_bounds(cand.0, cand.1, width, height) {
                    continue;
                }
                let key = encode(cand.0, cand.1, width);
                if region.unmatched.contains(&key) {
                    region.unmatched.remove(&key);
                    nxt = cand;
                    points.push(nxt);
                    moved_once = true;
                    advanced = true;
                    break;
                }
            }
            if advanced {
                continue;
            }

            // Steps 2-4 below "snap nxt to curr" to close the loop. The
            // snap is a logical closure, not a new vertex: `points` already
            // starts at `curr`, so closing does not append a duplicate.
            if moved_once && chebyshev(nxt, curr) <= 1 {
                break;
            }

            if let Some((closest_key, closest_pt, dist_to_nxt)) =
                find_closest(&region.unmatched, nxt, width)
            {
                let dist_back = euclid(nxt, curr);
                if dist_to_nxt > dist_back {
                    break;
                }
                region.unmatched.remove(&closest_key);
                nxt = closest_pt;
                points.push(nxt);
                moved_once = true;
                continue;
            }

            if region.unmatched.is_empty() {
                break;
            }

            open = true;
            break;
        }

        region.loops.push(Loop::new(points, !open));
    }
}
