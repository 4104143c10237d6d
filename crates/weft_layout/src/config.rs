//! Layout configuration.

use serde::{Deserialize, Serialize};

/// Layout engine switches, read through [`UiContext`](crate::UiContext).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Snap arranged rects to whole pixels unless a node overrides it.
    pub pixel_perfect: bool,
    /// Skip re-measuring clean nodes that receive the same constraint.
    pub measure_cache: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl LayoutConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            pixel_perfect: false,
            measure_cache: true,
        }
    }

    /// Every node measured on every pass.
    pub fn uncached() -> Self {
        Self {
            measure_cache: false,
            ..Self::standard()
        }
    }

    pub fn with_pixel_perfect(mut self, enabled: bool) -> Self {
        self.pixel_perfect = enabled;
        self
    }

    pub fn with_measure_cache(mut self, enabled: bool) -> Self {
        self.measure_cache = enabled;
        self
    }
}
