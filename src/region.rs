//! Region segmentation: 4-connected flood fill with simultaneous boundary
//! marking (spec 4.2).

use crate::color::relaxed_eq;
use crate::contour::Loop;
use crate::image_processor::ImageData;
use rgb::RGBA8;
use std::collections::{HashSet, VecDeque};

/// Minimum boundary-pixel count for a region to survive noise rejection.
pub const MIN_BOUNDARY_PIXELS: usize = 10;

/// A maximal 4-connected run of one color in the quantized image.
pub struct Region {
    pub color: RGBA8,
    /// Boundary coordinates not yet consumed by a traced loop, keyed as
    /// `y * width + x` per the Design Notes' integer-key guidance.
    pub unmatched: HashSet<u32>,
    pub loops: Vec<Loop>,
}

impl Region {
    /// After tracing, keep only the longest loop (by vertex count), ties
    /// going to whichever was traced first. The swap happens inside this
    /// region's own loop list — never across the region list itself.
    pub fn keep_longest_loop(&mut self) {
        if self.loops.len() <= 1 {
            return;
        }
        let mut longest_idx = 0;
        for i in 1..self.loops.len() {
            if self.loops[i].points.len() > self.loops[longest_idx].points.len() {
                longest_idx = i;
            }
        }
        self.loops.swap(0, longest_idx);
        self.loops.truncate(1);
    }
}

/// Result of segmentation: the surviving regions, and the working image
/// with interior pixels cleared and boundary pixels repainted back to their
/// region color.
pub struct SegmentationResult {
    pub regions: Vec<Region>,
    pub working: ImageData,
}

/// Segment a repainted image into regions, per 4.2.
pub fn segment(image: &ImageData) -> SegmentationResult {
    let w = image.width;
    let h = image.height;
    let mut working = image.clone();
    let mut visited = vec![false; (w * h) as usize];
    let mut regions = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if visited[idx] {
                continue;
            }
            let region_color = working.get(x, y);
            if region_color.a == 0 {
                // Already-cleared interior from an earlier region's flood.
                visited[idx] = true;
                continue;
            }

            let mut unmatched = HashSet::new();
            let mut queue = VecDeque::new();
            queue.push_back((x, y));
            visited[idx] = true;

            while let Some((cx, cy)) = queue.pop_front() {
                let is_boundary = is_boundary_pixel(&working, cx, cy, region_color);
                if is_boundary {
                    unmatched.insert(cy * w + cx);
                }
                // Mark interior cleared: alpha -> 0, RGB preserved, which
                // keeps relaxed_eq matching this region's color afterward.
                let preserved = working.get(cx, cy);
                working.set(cx, cy, RGBA8::new(preserved.r, preserved.g, preserved.b, 0));

                for (nx, ny) in neighbors4(cx, cy, w, h) {
                    let nidx = (ny * w + nx) as usize;
                    if visited[nidx] {
                        continue;
                    }
                    if relaxed_eq(working.get(nx, ny), region_color) {
                        visited[nidx] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }

            if unmatched.len() < MIN_BOUNDARY_PIXELS {
                continue;
            }

            // Repaint boundary pixels back to the region's full color.
            for &key in &unmatched {
                let (bx, by) = (key % w, key / w);
                working.set(bx, by, region_color);
            }

            regions.push(Region {
                color: region_color,
                unmatched,
                loops: Vec::new(),
            });
        }
    }

    SegmentationResult { regions, working }
}

fn is_boundary_pixel(image: &ImageData, x: u32, y: u32, region_color: RGBA8) -> bool {
    let ix = x as i64;
    let iy = y as i64;
    for (dx, dy) in [(0i64, -1i64), (0, 1), (-1, 0), (1, 0)] {
        let nx = ix + dx;
        let ny = iy + dy;
        if !image.in_bounds(nx, ny) {
            return true;
        }
        if !relaxed_eq(image.get(nx as u32, ny as u32), region_color) {
            return true;
        }
    }
    false
}

fn neighbors4(x: u32, y: u32, w: u32, h: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(4);
    if y > 0 {
        out.push((x, y - 1));
    }
    if y + 1 < h {
        out.push((x, y + 1));
    }
    if x > 0 {
        out.push((x - 1, y));
    }
    if x + 1 < w {
        out.push((x + 1, y));
    }
    out
}
