//! Pipeline orchestration: palette reduction, segmentation, contour tracing,
//! simplification, and SVG emission chained into one pass over an image.
//! One function that loads nothing itself and just threads owned data
//! through each stage.

use crate::contour;
use crate::error::Result;
use crate::image_processor::ImageData;
use crate::palette::{self, RandSource};
use crate::region;
use crate::simplify;
use crate::svg;

/// The library's single configuration struct, built by the CLI or directly
/// by a library caller.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target palette size K (spec 4.1).
    pub palette_size: usize,
    /// Error tolerance τ for the simplifier (spec 4.4). Default 5.
    pub error_tolerance: f64,
    /// Emit Bézier-smoothed edges instead of straight segments (spec 4.5).
    pub smooth_edges: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            palette_size: 16,
            error_tolerance: 5.0,
            smooth_edges: false,
        }
    }
}

/// Run the full pipeline (4.1 through 4.5) and return the SVG document text.
pub fn run(image: &ImageData, config: &PipelineConfig, rand: &mut dyn RandSource) -> Result<String> {
    let palette_result = palette::reduce_palette(
        image,
        config.palette_size,
        palette::DEFAULT_HASH_WIDTH,
        rand,
    )?;

    let segmentation = region::segment(&palette_result.repainted);
    let mut regions = segmentation.regions;

    for r in &mut regions {
        contour::trace_region(r, segmentation.working.width, segmentation.working.height);
        r.keep_longest_loop();
    }

    for r in &mut regions {
        for lp in &mut r.loops {
            simplify::simplify_loop(lp, config.error_tolerance);
        }
    }

    Ok(svg::emit_svg(
        segmentation.working.width,
        segmentation.working.height,
        &regions,
        palette_result.null_color,
        config.smooth_edges,
    ))
}
