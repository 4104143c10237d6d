//! Weft Theme System
//!
//! Design tokens, built-in light/dark themes, TOML theme files, and the
//! versioned [`ThemeContext`] that property slots consult lazily.
//!
//! There is no global theme state: the application owns a `ThemeContext`
//! and passes it by reference into layout and drawing.

pub mod context;
pub mod error;
pub mod theme;
pub mod tokens;

pub use context::ThemeContext;
pub use error::{Result, ThemeError};
pub use theme::{ColorScheme, Theme};
pub use tokens::{ColorToken, MetricToken, ThemeKey};
