//! Render error types

use thiserror::Error;

/// Errors from texture creation and decoding
#[derive(Error, Debug)]
pub enum RenderError {
    /// Encoded image bytes could not be decoded
    #[error("Image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Width or height is zero
    #[error("Texture has zero size ({width}x{height})")]
    ZeroSizedTexture { width: u32, height: u32 },

    /// Pixel buffer length does not match dimensions and format
    #[error("Pixel data is {actual} bytes, expected {expected}")]
    PixelDataMismatch { expected: usize, actual: usize },
}

/// Text shaping errors reported by a font provider
#[derive(Error, Debug)]
pub enum TextError {
    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Shaping failed: {0}")]
    Shaping(String),
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;
