//! Theme tables and theme files

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use weft_core::Color;

use crate::error::{Result, ThemeError};
use crate::tokens::{ColorToken, MetricToken, ThemeKey};

/// Light or dark base scheme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// A resolved theme: token → value tables
#[derive(Clone, Debug)]
pub struct Theme {
    name: String,
    scheme: ColorScheme,
    colors: FxHashMap<ColorToken, Color>,
    metrics: FxHashMap<MetricToken, f32>,
}

impl Theme {
    /// Built-in light theme
    pub fn light() -> Self {
        let mut theme = Self::empty("light", ColorScheme::Light);
        theme.set_color(ColorToken::Background, Color::from_hex(0xF5F5F7));
        theme.set_color(ColorToken::Surface, Color::WHITE);
        theme.set_color(ColorToken::SurfaceElevated, Color::from_hex(0xF3F3F3));
        theme.set_color(ColorToken::Border, Color::from_hex(0xD1D1D6));
        theme.set_color(ColorToken::TextPrimary, Color::from_hex(0x1D1D1F));
        theme.set_color(ColorToken::TextSecondary, Color::from_hex(0x86868B));
        theme.set_color(ColorToken::Accent, Color::from_hex(0x007AFF));
        theme.set_color(ColorToken::AccentHover, Color::from_hex(0x0056CC));
        theme.set_color(
            ColorToken::Selection,
            Color::from_hex(0x007AFF).with_alpha(0.25),
        );
        theme.set_color(ColorToken::Error, Color::from_hex(0xFF3B30));
        theme.set_default_metrics();
        theme
    }

    /// Built-in dark theme
    pub fn dark() -> Self {
        let mut theme = Self::empty("dark", ColorScheme::Dark);
        theme.set_color(ColorToken::Background, Color::from_hex(0x1C1C1E));
        theme.set_color(ColorToken::Surface, Color::from_hex(0x2C2C2E));
        theme.set_color(ColorToken::SurfaceElevated, Color::from_hex(0x3A3A3C));
        theme.set_color(ColorToken::Border, Color::from_hex(0x48484A));
        theme.set_color(ColorToken::TextPrimary, Color::from_hex(0xF5F5F7));
        theme.set_color(ColorToken::TextSecondary, Color::from_hex(0x98989D));
        theme.set_color(ColorToken::Accent, Color::from_hex(0x0A84FF));
        theme.set_color(ColorToken::AccentHover, Color::from_hex(0x409CFF));
        theme.set_color(
            ColorToken::Selection,
            Color::from_hex(0x0A84FF).with_alpha(0.35),
        );
        theme.set_color(ColorToken::Error, Color::from_hex(0xFF453A));
        theme.set_default_metrics();
        theme
    }

    /// Look up a built-in theme by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "light" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    fn empty(name: &str, scheme: ColorScheme) -> Self {
        Self {
            name: name.to_string(),
            scheme,
            colors: FxHashMap::default(),
            metrics: FxHashMap::default(),
        }
    }

    fn set_default_metrics(&mut self) {
        self.set_metric(MetricToken::Spacing, 8.0);
        self.set_metric(MetricToken::CornerRadius, 6.0);
        self.set_metric(MetricToken::BorderWidth, 1.0);
        self.set_metric(MetricToken::FontSize, 14.0);
    }

    /// Parse a theme file.
    ///
    /// ```toml
    /// name = "ocean"
    /// base = "dark"
    ///
    /// [colors]
    /// accent = "#00AAFF"
    ///
    /// [metrics]
    /// spacing = 12.0
    /// ```
    ///
    /// Tokens missing from the file keep the base theme's values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ThemeFile = toml::from_str(text)?;

        let base = file.base.as_deref().unwrap_or("light");
        let mut theme =
            Theme::builtin(base).ok_or_else(|| ThemeError::UnknownBase(base.to_string()))?;
        if let Some(name) = file.name {
            theme.name = name;
        }

        for (key, value) in &file.colors {
            let token = ColorToken::from_name(key)
                .ok_or_else(|| ThemeError::UnknownToken(key.clone()))?;
            let color = Color::parse_hex(value).ok_or_else(|| ThemeError::InvalidColor {
                token: key.clone(),
                value: value.clone(),
            })?;
            theme.set_color(token, color);
        }

        for (key, value) in &file.metrics {
            let token = MetricToken::from_name(key)
                .ok_or_else(|| ThemeError::UnknownToken(key.clone()))?;
            theme.set_metric(token, *value);
        }

        tracing::debug!(
            name = %theme.name,
            colors = file.colors.len(),
            metrics = file.metrics.len(),
            "loaded theme file"
        );
        Ok(theme)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    pub fn color(&self, token: ColorToken) -> Option<Color> {
        self.colors.get(&token).copied()
    }

    pub fn metric(&self, token: MetricToken) -> Option<f32> {
        self.metrics.get(&token).copied()
    }

    pub fn set_color(&mut self, token: ColorToken, color: Color) {
        self.colors.insert(token, color);
    }

    pub fn set_metric(&mut self, token: MetricToken, value: f32) {
        self.metrics.insert(token, value);
    }

    /// Whether the theme defines a value for `key`
    pub fn contains(&self, key: ThemeKey) -> bool {
        match key {
            ThemeKey::Color(token) => self.colors.contains_key(&token),
            ThemeKey::Metric(token) => self.metrics.contains_key(&token),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[derive(Debug, Deserialize)]
struct ThemeFile {
    name: Option<String>,
    base: Option<String>,
    #[serde(default)]
    colors: BTreeMap<String, String>,
    #[serde(default)]
    metrics: BTreeMap<String, f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_themes_are_complete() {
        for theme in [Theme::light(), Theme::dark()] {
            for token in ColorToken::ALL {
                assert!(theme.color(token).is_some(), "{:?} missing", token);
            }
            for token in MetricToken::ALL {
                assert!(theme.metric(token).is_some(), "{:?} missing", token);
            }
        }
    }

    #[test]
    fn test_theme_file_overrides_base() {
        let theme = Theme::from_toml_str(
            r##"
            name = "ocean"
            base = "dark"

            [colors]
            accent = "#00AAFF"

            [metrics]
            spacing = 12.0
            "##,
        )
        .unwrap();

        assert_eq!(theme.name(), "ocean");
        assert_eq!(theme.scheme(), ColorScheme::Dark);
        assert_eq!(theme.color(ColorToken::Accent), Some(Color::from_hex(0x00AAFF)));
        assert_eq!(theme.metric(MetricToken::Spacing), Some(12.0));
        // Untouched tokens come from the base
        assert_eq!(
            theme.color(ColorToken::Surface),
            Theme::dark().color(ColorToken::Surface)
        );
    }

    #[test]
    fn test_theme_file_errors() {
        assert!(matches!(
            Theme::from_toml_str("[colors]\nnot_a_token = \"#000000\""),
            Err(ThemeError::UnknownToken(_))
        ));
        assert!(matches!(
            Theme::from_toml_str("[colors]\naccent = \"blue\""),
            Err(ThemeError::InvalidColor { .. })
        ));
        assert!(matches!(
            Theme::from_toml_str("base = \"sepia\""),
            Err(ThemeError::UnknownBase(_))
        ));
        assert!(matches!(
            Theme::from_toml_str("colors = 3"),
            Err(ThemeError::Parse(_))
        ));
    }
}
