//! Polygon simplification: Visvalingam-Whyatt vertex removal over a closed
//! loop, with an error-bounded search for the smallest vertex count that
//! still fits under a tolerance (spec 4.4).
//!
//! There is no corner-detection pass feeding into this step — every vertex
//! is a candidate for removal, and sharpness is only judged later at
//! emission time.

use crate::contour::Loop;
use std::collections::HashSet;

/// Loops with this many or fewer vertices use a linear scan for the ideal
/// reduction count; larger loops binary-search it instead.
const SMALL_LOOP_THRESHOLD: usize = 32;

/// A reduced polygon with only this many vertices is assigned this error
/// per original vertex (effectively infinite, but not actually infinite so
/// callers can still compare it).
const DEGENERATE_ERROR_PER_VERTEX: f64 = 9_999_999.0;

type Pt = (f64, f64);

#[inline]
fn triangle_area(a: Pt, b: Pt, c: Pt) -> f64 {
    ((a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1)) / 2.0).abs()
}

#[inline]
fn prev_alive(alive: &[bool], idx: usize) -> usize {
    let n = alive.len();
    let mut i = (idx + n - 1) % n;
    while !alive[i] {
        i = (i + n - 1) % n;
    }
    i
}

#[inline]
fn next_alive(alive: &[bool], idx: usize) -> usize {
    let n = alive.len();
    let mut i = (idx + 1) % n;
    while !alive[i] {
        i = (i + 1) % n;
    }
    i
}

/// Run Visvalingam-Whyatt over the full cyclic polygon down to a single
/// vertex, recording removal order. Ties on minimum triangle area break on
/// the lowest index. Because the process is deterministic and monotone, the
/// reduced polygon for any `count` is just "the first `count` removals
/// applied" — no need to re-run the whole thing per candidate count.
fn removal_order(points: &[Pt]) -> Vec<usize> {
    let n = points.len();
    if n <= 1 {
        return Vec::new();
    }
    let mut alive = vec![true; n];
    let mut alive_count = n;
    let mut areas = vec![0.0f64; n];
    for i in 0..n {
        let p = prev_alive(&alive, i);
        let q = next_alive(&alive, i);
        areas[i] = triangle_area(points[p], points[i], points[q]);
    }

    let mut order = Vec::with_capacity(n - 1);
    while alive_count > 1 {
        let mut min_idx = 0;
        let mut min_val = f64::MAX;
        for i in 0..n {
            if alive[i] && areas[i] < min_val {
                min_val = areas[i];
                min_idx = i;
            }
        }
        alive[min_idx] = false;
        alive_count -= 1;
        order.push(min_idx);

        if alive_count >= 2 {
            let p = prev_alive(&alive, min_idx);
            let q = next_alive(&alive, min_idx);
            let pp = prev_alive(&alive, p);
            let pn = next_alive(&alive, p);
            areas[p] = triangle_area(points[pp], points[p], points[pn]);
            let qp = prev_alive(&alive, q);
            let qn = next_alive(&alive, q);
            areas[q] = triangle_area(points[qp], points[q], points[qn]);
        }
    }
    order
}

fn apply_removals(points: &[Pt], order: &[usize], count: usize) -> Vec<Pt> {
    let removed: HashSet<usize> = order[..count].iter().copied().collect();
    points
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, &p)| p)
        .collect()
}

fn dist_point_to_segment(p: Pt, a: Pt, b: Pt) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        let ex = p.0 - a.0;
        let ey = p.1 - a.1;
        return (ex * ex + ey * ey).sqrt();
    }
    let t = ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let cx = a.0 + t * dx;
    let cy = a.1 + t * dy;
    let ex = p.0 - cx;
    let ey = p.1 - cy;
    (ex * ex + ey * ey).sqrt()
}

/// Mean, over every vertex of `original`, of the perpendicular distance to
/// the nearest edge of `reduced` (cyclic: the edge from the last vertex back
/// to the first counts too).
fn error_measure(original: &[Pt], reduced: &[Pt]) -> f64 {
    let n = original.len() as f64;
    if reduced.len() <= 1 {
        return DEGENERATE_ERROR_PER_VERTEX * n;
    }
    let m = reduced.len();
    let mut sum = 0.0;
    for &v in original {
        let mut best = f64::MAX;
        for i in 0..m {
            let a = reduced[i];
            let b = reduced[(i + 1) % m];
            let d = dist_point_to_segment(v, a, b);
            if d < best {
                best = d;
            }
        }
        sum += best;
    }
    sum / n
}

/// Find the largest reduction count whose error stays below `tau`, falling
/// back to 0 (no reduction) if even the smallest reduction already exceeds
/// it. Returns `(count, error_at_count)`.
fn find_ideal_count(points: &[Pt], order: &[usize], tau: f64) -> (usize, f64) {
    let max_count = order.len();
    let error_at = |count: usize| error_measure(points, &apply_removals(points, order, count));

    if max_count == 0 {
        return (0, 0.0);
    }

    if points.len() <= SMALL_LOOP_THRESHOLD {
        let mut best = 0usize;
        let mut best_err = 0.0;
        for count in 1..=max_count {
            let err = error_at(count);
            if err < tau {
                best = count;
                best_err = err;
            } else {
                break;
            }
        }
        return (best, best_err);
    }

    if error_at(1) >= tau {
        return (0, 0.0);
    }
    let mut lo = 1usize;
    let mut hi = max_count;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if error_at(mid) < tau {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    (lo, error_at(lo))
}

fn shoelace_area(points: &[(i32, i32)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % n];
        sum += x1 as f64 * y2 as f64 - x2 as f64 * y1 as f64;
    }
    (sum / 2.0).abs()
}

/// Simplify a loop in place per 4.4: populates `simplified`, `ideal_length`,
/// `ideal_error`, and `area` (shoelace area of the original boundary, used
/// by the emitter's draw order).
pub fn simplify_loop(lp: &mut Loop, tau: f64) {
    lp.area = shoelace_area(&lp.points);

    let points: Vec<Pt> = lp.points.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
    if points.len() < 3 {
        lp.simplified = lp.points.clone();
        lp.ideal_length = lp.points.len();
        lp.ideal_error = 0.0;
        return;
    }

    let order = removal_order(&points);
    let (count, error) = find_ideal_count(&points, &order, tau);
    let reduced = apply_removals(&points, &order, count);

    lp.simplified = reduced
        .iter()
        .map(|&(x, y)| (x.round() as i32, y.round() as i32))
        .collect();
    lp.ideal_length = points.len() - count;
    lp.ideal_error = error;
}
