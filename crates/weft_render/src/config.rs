//! Batch builder configuration presets.

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`BatchBuilder`](crate::BatchBuilder).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Vertex count after which a draw is sealed and a new one opened.
    pub max_vertices_per_draw: usize,
    /// Maximum deviation (px) when flattening bezier curves.
    pub curve_tolerance: f32,
    /// Fan segments per rounded corner.
    pub corner_segments: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl BatchConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            max_vertices_per_draw: 60_000,
            curve_tolerance: 0.25,
            corner_segments: 8,
        }
    }

    /// Small draw limit so splitting shows up in tests.
    pub fn testing() -> Self {
        Self {
            max_vertices_per_draw: 36,
            curve_tolerance: 0.5,
            corner_segments: 4,
        }
    }

    pub fn with_max_vertices(mut self, max: usize) -> Self {
        self.max_vertices_per_draw = max;
        self
    }

    pub fn with_curve_tolerance(mut self, tolerance: f32) -> Self {
        self.curve_tolerance = tolerance;
        self
    }

    pub fn with_corner_segments(mut self, segments: u32) -> Self {
        self.corner_segments = segments;
        self
    }

    /// Effective vertex limit: rounded down to whole quads, never below one quad.
    pub fn vertex_limit(&self) -> usize {
        let quads = self.max_vertices_per_draw / crate::QUAD_VERTICES;
        quads.max(1) * crate::QUAD_VERTICES
    }

    /// Tolerance clamped to something lyon can flatten with.
    pub fn effective_tolerance(&self) -> f32 {
        if self.curve_tolerance.is_finite() && self.curve_tolerance > 0.0 {
            self.curve_tolerance.max(0.01)
        } else {
            0.25
        }
    }
}
