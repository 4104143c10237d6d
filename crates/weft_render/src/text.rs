//! Font provider boundary
//!
//! Shaping and rasterization live outside the core. A [`FontProvider`] turns
//! a string into positioned glyph quads (plus the atlas page they sample),
//! and the builder pushes those quads as-is.
//!
//! [`FallbackFont`] is the built-in provider of last resort: fixed advance,
//! untextured block glyphs. It never fails, so text always draws something.

use weft_core::{Point, Rect, Size};

use crate::error::TextError;
use crate::texture::Texture;

/// Logical font selection
#[derive(Clone, Debug, PartialEq)]
pub struct FontRequest {
    /// Family name, `None` for the provider's default
    pub family: Option<String>,
    /// Font size in pixels
    pub size: f32,
}

impl Default for FontRequest {
    fn default() -> Self {
        Self {
            family: None,
            size: 14.0,
        }
    }
}

impl FontRequest {
    pub fn new(size: f32) -> Self {
        Self { family: None, size }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }
}

/// One positioned glyph, relative to the text origin (top-left)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphQuad {
    pub rect: Rect,
    /// Normalized uv rect in the atlas page
    pub uv: Rect,
}

/// Result of shaping a string
#[derive(Clone, Debug, Default)]
pub struct ShapedText {
    /// Bounding size of the laid-out text
    pub size: Size,
    /// Distance from the top to the first baseline
    pub baseline: f32,
    pub glyphs: Vec<GlyphQuad>,
    /// Atlas page sampled by the glyphs, `None` for untextured glyphs
    pub texture: Option<Texture>,
}

/// Text shaping collaborator
pub trait FontProvider {
    /// Shape `text` into glyph quads
    fn shape(&self, text: &str, font: &FontRequest) -> Result<ShapedText, TextError>;

    /// Size of `text` once laid out
    fn measure(&self, text: &str, font: &FontRequest) -> Result<Size, TextError> {
        self.shape(text, font).map(|shaped| shaped.size)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fallback font
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-advance block font
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackFont;

impl FallbackFont {
    pub const ADVANCE: f32 = 0.6;
    pub const LINE_HEIGHT: f32 = 1.25;

    /// Lay out `text`; lines split on `\n`
    pub fn layout(&self, text: &str, font: &FontRequest) -> ShapedText {
        let size = if font.size.is_finite() {
            font.size.max(0.0)
        } else {
            0.0
        };
        let advance = size * Self::ADVANCE;
        let line_height = size * Self::LINE_HEIGHT;

        let mut glyphs = Vec::new();
        let mut columns = 0usize;
        let mut lines = 0usize;
        for (row, line) in text.split('\n').enumerate() {
            lines += 1;
            let mut count = 0usize;
            for (col, ch) in line.chars().enumerate() {
                count = col + 1;
                if ch.is_whitespace() {
                    continue;
                }
                let origin = Point::new(
                    col as f32 * advance + advance * 0.1,
                    row as f32 * line_height + size * 0.2,
                );
                glyphs.push(GlyphQuad {
                    rect: Rect::from_origin_size(origin, Size::new(advance * 0.8, size * 0.8)),
                    uv: Rect::ZERO,
                });
            }
            columns = columns.max(count);
        }

        ShapedText {
            size: Size::new(columns as f32 * advance, lines as f32 * line_height),
            baseline: size,
            glyphs,
            texture: None,
        }
    }
}

impl FontProvider for FallbackFont {
    fn shape(&self, text: &str, font: &FontRequest) -> Result<ShapedText, TextError> {
        Ok(self.layout(text, font))
    }
}
