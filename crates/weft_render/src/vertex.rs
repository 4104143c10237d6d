//! Vertex layout and draw-state kinds
//!
//! Every backend consumes the same fixed vertex layout. All structures use
//! `#[repr(C)]` and implement `bytemuck::Pod` for direct buffer uploads.

use weft_core::{Color, Point};

/// A single vertex (matches the backend vertex input)
///
/// Memory layout:
/// - position: `vec2<f32>` (8 bytes)
/// - color:    `vec4<f32>` (16 bytes)
/// - uv:       `vec2<f32>` (8 bytes)
/// Total: 32 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Point, color: Color, uv: Point) -> Self {
        Self {
            position: [position.x, position.y],
            color: color.to_array(),
            uv: [uv.x, uv.y],
        }
    }

    /// Untextured vertex
    pub fn solid(position: Point, color: Color) -> Self {
        Self::new(position, color, Point::ZERO)
    }

    pub fn position(&self) -> Point {
        Point::new(self.position[0], self.position[1])
    }
}

/// Which pipeline a draw is executed with
///
/// Switching kinds while vertices are pending always forces a flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Position + color only
    #[default]
    Solid,
    /// Color-modulated RGBA texture
    Textured,
    /// Alpha-mask glyph atlas
    Glyph,
}

/// Vertices emitted per quad (two triangles)
pub const QUAD_VERTICES: usize = 6;
