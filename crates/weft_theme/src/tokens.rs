//! Design tokens
//!
//! Tokens are the stable keys a property slot binds to. The active theme
//! maps each token to a concrete value.

/// Semantic color tokens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorToken {
    Background,
    Surface,
    SurfaceElevated,
    Border,
    TextPrimary,
    TextSecondary,
    Accent,
    AccentHover,
    Selection,
    Error,
}

impl ColorToken {
    pub const ALL: [ColorToken; 10] = [
        ColorToken::Background,
        ColorToken::Surface,
        ColorToken::SurfaceElevated,
        ColorToken::Border,
        ColorToken::TextPrimary,
        ColorToken::TextSecondary,
        ColorToken::Accent,
        ColorToken::AccentHover,
        ColorToken::Selection,
        ColorToken::Error,
    ];

    /// Name used in theme files
    pub fn name(self) -> &'static str {
        match self {
            ColorToken::Background => "background",
            ColorToken::Surface => "surface",
            ColorToken::SurfaceElevated => "surface_elevated",
            ColorToken::Border => "border",
            ColorToken::TextPrimary => "text_primary",
            ColorToken::TextSecondary => "text_secondary",
            ColorToken::Accent => "accent",
            ColorToken::AccentHover => "accent_hover",
            ColorToken::Selection => "selection",
            ColorToken::Error => "error",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Numeric tokens (spacing, radii, font sizes)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricToken {
    Spacing,
    CornerRadius,
    BorderWidth,
    FontSize,
}

impl MetricToken {
    pub const ALL: [MetricToken; 4] = [
        MetricToken::Spacing,
        MetricToken::CornerRadius,
        MetricToken::BorderWidth,
        MetricToken::FontSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricToken::Spacing => "spacing",
            MetricToken::CornerRadius => "corner_radius",
            MetricToken::BorderWidth => "border_width",
            MetricToken::FontSize => "font_size",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Key a property slot can be bound to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeKey {
    Color(ColorToken),
    Metric(MetricToken),
}

impl From<ColorToken> for ThemeKey {
    fn from(token: ColorToken) -> Self {
        ThemeKey::Color(token)
    }
}

impl From<MetricToken> for ThemeKey {
    fn from(token: MetricToken) -> Self {
        ThemeKey::Metric(token)
    }
}
