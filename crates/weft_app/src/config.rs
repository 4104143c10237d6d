//! Application configuration
//!
//! Bundles the batch and layout settings with the theme selection and the
//! log filter. Loaded from TOML; every section is optional.
//!
//! ```toml
//! theme = "dark"
//! log_filter = "weft_layout=debug"
//!
//! [batch]
//! corner_segments = 12
//!
//! [layout]
//! pixel_perfect = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use weft_layout::LayoutConfig;
use weft_render::BatchConfig;

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub batch: BatchConfig,
    pub layout: LayoutConfig,
    /// Built-in theme name (`light`, `dark`) or a path to a theme TOML file
    pub theme: String,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl UiConfig {
    /// Standard configuration for general use
    pub fn standard() -> Self {
        Self {
            batch: BatchConfig::standard(),
            layout: LayoutConfig::standard(),
            theme: "light".to_string(),
            log_filter: "info".to_string(),
        }
    }

    /// Verbose logging and a layout pass on every frame
    pub fn debug() -> Self {
        Self {
            layout: LayoutConfig::uncached(),
            log_filter: "debug".to_string(),
            ..Self::standard()
        }
    }

    /// Small draw limits so tests exercise batch splitting
    pub fn testing() -> Self {
        Self {
            batch: BatchConfig::testing(),
            log_filter: "warn".to_string(),
            ..Self::standard()
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), theme = %config.theme, "config loaded");
        Ok(config)
    }
}
