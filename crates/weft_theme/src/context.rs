//! Versioned theme context
//!
//! The context owns the active theme and a version counter that bumps on
//! every switch. Property slots compare the version they last resolved
//! against; nothing is pushed to them.

use weft_core::Color;

use crate::theme::Theme;
use crate::tokens::{ColorToken, MetricToken, ThemeKey};

/// Active theme plus a monotonically increasing version
#[derive(Clone, Debug)]
pub struct ThemeContext {
    theme: Theme,
    version: u64,
}

impl ThemeContext {
    pub fn new(theme: Theme) -> Self {
        Self { theme, version: 1 }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Current version; starts at 1 so a fresh slot (version 0) always resolves
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the active theme
    pub fn set_theme(&mut self, theme: Theme) {
        tracing::debug!(from = %self.theme.name(), to = %theme.name(), "theme switched");
        self.theme = theme;
        self.version += 1;
    }

    /// Mutate the active theme in place (counts as a switch)
    pub fn update(&mut self, f: impl FnOnce(&mut Theme)) {
        f(&mut self.theme);
        self.version += 1;
    }

    pub fn color(&self, token: ColorToken) -> Option<Color> {
        self.theme.color(token)
    }

    pub fn metric(&self, token: MetricToken) -> Option<f32> {
        self.theme.metric(token)
    }

    pub fn contains(&self, key: ThemeKey) -> bool {
        self.theme.contains(key)
    }
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_bumps_on_switch() {
        let mut ctx = ThemeContext::default();
        let v = ctx.version();
        ctx.set_theme(Theme::dark());
        assert_eq!(ctx.version(), v + 1);
        ctx.update(|t| t.set_metric(MetricToken::Spacing, 2.0));
        assert_eq!(ctx.version(), v + 2);
        assert_eq!(ctx.metric(MetricToken::Spacing), Some(2.0));
    }
}
