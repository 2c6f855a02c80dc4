//! Crate-level error type.
//!
//! Distinct error kinds (input, decode, write) each get their own variant
//! via `thiserror`, rather than a single blanket error type.

use thiserror::Error;

/// Errors the vectorization pipeline can report.
#[derive(Debug, Error)]
pub enum VectorizeError {
    /// Wrong argument count or a malformed numeric/boolean CLI argument.
    #[error("input error: {0}")]
    Input(String),

    /// The image-decoding collaborator failed.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The SVG output file could not be opened or written.
    #[error("failed to write SVG output: {0}")]
    Write(#[from] std::io::Error),

    /// Palette size is non-positive, or the source image has zero area.
    #[error("cannot build a palette: {0}")]
    Empty(String),
}

pub type Result<T> = std::result::Result<T, VectorizeError>;
