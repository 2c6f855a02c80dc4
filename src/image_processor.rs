//! Image decoding — the raster-input external collaborator.
//!
//! Hands back an owned, row-major, top-left-origin RGBA8 grid. Everything
//! downstream of this module treats that grid as the source of truth.

use crate::error::{Result, VectorizeError};
use rgb::RGBA8;

#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<RGBA8>,
}

impl ImageData {
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> RGBA8 {
        self.pixels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: RGBA8) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }
}

pub fn load_image(path: &std::path::Path) -> Result<ImageData> {
    let img = image::open(path).map_err(VectorizeError::Decode)?;
    let rgba = img.to_rgba8();

    let pixels: Vec<RGBA8> = rgba
        .pixels()
        .map(|p| RGBA8::new(p[0], p[1], p[2], p[3]))
        .collect();

    Ok(ImageData {
        width: rgba.width(),
        height: rgba.height(),
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_roundtrip() {
        let mut img = ImageData {
            width: 2,
            height: 2,
            pixels: vec![RGBA8::new(0, 0, 0, 0); 4],
        };
        img.set(1, 1, RGBA8::new(1, 2, 3, 4));
        assert_eq!(img.get(1, 1), RGBA8::new(1, 2, 3, 4));
    }

    #[test]
    fn in_bounds_rejects_negative_and_out_of_range() {
        let img = ImageData {
            width: 3,
            height: 3,
            pixels: vec![RGBA8::new(0, 0, 0, 0); 9],
        };
        assert!(img.in_bounds(0, 0));
        assert!(img.in_bounds(2, 2));
        assert!(!img.in_bounds(-1, 0));
        assert!(!img.in_bounds(3, 0));
    }
}
