//! Theme error types

use thiserror::Error;

/// Errors raised while loading a theme
#[derive(Error, Debug)]
pub enum ThemeError {
    /// The theme file is not valid TOML for the theme schema
    #[error("Theme parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    /// A token name in the theme file is not known
    #[error("Unknown theme token: {0}")]
    UnknownToken(String),

    /// A color value could not be parsed
    #[error("Invalid color for '{token}': {value}")]
    InvalidColor { token: String, value: String },

    /// `base` names a theme that is not built in
    #[error("Unknown base theme: {0}")]
    UnknownBase(String),
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;
