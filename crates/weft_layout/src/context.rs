//! Per-pass context
//!
//! Everything layout and drawing read besides the tree itself. Passed by
//! reference through measure, arrange and draw; nothing is global, so
//! independent trees can coexist in one process.

use weft_render::FontProvider;
use weft_theme::ThemeContext;

use crate::config::LayoutConfig;
use crate::input::InputHandle;

#[derive(Clone, Copy)]
pub struct UiContext<'a> {
    pub theme: &'a ThemeContext,
    pub fonts: &'a dyn FontProvider,
    pub input: &'a InputHandle,
    pub config: &'a LayoutConfig,
}

impl<'a> UiContext<'a> {
    pub fn new(
        theme: &'a ThemeContext,
        fonts: &'a dyn FontProvider,
        input: &'a InputHandle,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            theme,
            fonts,
            input,
            config,
        }
    }

    /// Same context with another font provider
    pub fn with_fonts(self, fonts: &'a dyn FontProvider) -> Self {
        Self { fonts, ..self }
    }
}

impl std::fmt::Debug for UiContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiContext")
            .field("theme_version", &self.theme.version())
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
