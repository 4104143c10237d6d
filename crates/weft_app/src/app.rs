//! Weft application facade
//!
//! [`Ui`] owns everything a frame needs and hands out one finished
//! [`CommandList`] per call to [`Ui::frame`].

use weft_core::Size;
use weft_layout::{InputHandle, LayoutTree, UiContext};
use weft_render::{BatchBuilder, CommandList, CommandLog, FallbackFont, FontProvider, RenderCommand};
use weft_theme::{Theme, ThemeContext};

use crate::config::UiConfig;
use crate::error::Result;

/// A UI tree with its theme, fonts, input and batch builder
///
/// # Example
///
/// ```rust
/// use weft_app::prelude::*;
///
/// let mut ui = Ui::new(UiConfig::standard()).unwrap();
/// let root = ui.tree_mut().insert(Panel);
/// ui.tree_mut().set_background(root, Color::RED).unwrap();
/// ui.tree_mut().set_root(root).unwrap();
/// ui.resize(Size::new(40.0, 30.0));
///
/// let list = ui.frame();
/// assert_eq!(list.vertex_count(), 6);
/// ```
pub struct Ui {
    tree: LayoutTree,
    theme: ThemeContext,
    fonts: Box<dyn FontProvider>,
    input: InputHandle,
    builder: BatchBuilder,
    config: UiConfig,
    frames: u64,
}

impl Ui {
    /// Create a UI with the configured theme and the fallback font
    pub fn new(config: UiConfig) -> Result<Self> {
        let theme = load_theme(&config.theme)?;
        tracing::debug!(theme = %theme.name(), "ui created");
        Ok(Self {
            tree: LayoutTree::new(),
            theme: ThemeContext::new(theme),
            fonts: Box::new(FallbackFont),
            input: InputHandle::new(),
            builder: BatchBuilder::new(config.batch.clone()),
            config,
            frames: 0,
        })
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    pub fn theme(&self) -> &ThemeContext {
        &self.theme
    }

    /// Swap the active theme; theme-bound slots re-resolve on the next frame
    pub fn set_theme(&mut self, theme: Theme) {
        tracing::debug!(theme = %theme.name(), "theme changed");
        self.theme.set_theme(theme);
    }

    /// Edit the active theme in place
    pub fn update_theme(&mut self, f: impl FnOnce(&mut Theme)) {
        self.theme.update(f);
    }

    pub fn set_font_provider(&mut self, fonts: impl FontProvider + 'static) {
        self.fonts = Box::new(fonts);
        // Text metrics may differ under the new provider
        if let Some(root) = self.tree.root() {
            self.tree
                .invalidate_subtree(root, weft_layout::Invalidation::SelfLayout);
        }
    }

    /// Resize the viewport the root is laid out in
    pub fn resize(&mut self, size: Size) {
        self.tree.set_viewport(size);
    }

    pub fn input(&self) -> &InputHandle {
        &self.input
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Lay out if needed and build this frame's command list
    pub fn frame(&mut self) -> CommandList {
        let ui = UiContext::new(
            &self.theme,
            self.fonts.as_ref(),
            &self.input,
            &self.config.layout,
        );
        self.tree.draw(&mut self.builder, &ui);
        let list = self.builder.build();
        self.frames += 1;

        // Replaying runs callbacks, which belong to the backend's pass only
        let has_callbacks = list
            .iter()
            .any(|command| matches!(command, RenderCommand::Callback(_)));
        if tracing::enabled!(tracing::Level::DEBUG) && !has_callbacks {
            let stats = CommandLog::capture(&list).stats();
            tracing::debug!(
                frame = self.frames,
                commands = list.len(),
                draw_calls = stats.draw_calls,
                vertices = stats.vertices,
                texture_binds = stats.texture_binds,
                max_transform_depth = stats.max_transform_depth,
                max_clip_depth = stats.max_clip_depth,
                "frame built"
            );
        } else {
            tracing::debug!(
                frame = self.frames,
                commands = list.len(),
                vertices = list.vertex_count(),
                "frame built"
            );
        }
        list
    }
}

/// Built-in theme by name, otherwise a theme TOML file at that path
fn load_theme(theme: &str) -> Result<Theme> {
    if let Some(builtin) = Theme::builtin(theme) {
        return Ok(builtin);
    }
    let text = std::fs::read_to_string(theme)?;
    let loaded = Theme::from_toml_str(&text)?;
    tracing::debug!(path = theme, name = %loaded.name(), "theme file loaded");
    Ok(loaded)
}
