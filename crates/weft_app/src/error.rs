//! Error types for weft_app

use thiserror::Error;
use weft_theme::ThemeError;

/// Errors raised while setting up a [`Ui`](crate::Ui)
#[derive(Error, Debug)]
pub enum AppError {
    /// A config or theme file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for the config schema
    #[error("Config parse failed: {0}")]
    Config(#[from] toml::de::Error),

    /// The configured theme failed to load
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),
}

/// Result type for weft_app operations
pub type Result<T> = std::result::Result<T, AppError>;
