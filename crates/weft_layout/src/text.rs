//! Text block element

use std::any::Any;

use weft_core::{Color, Size};
use weft_render::{FallbackFont, FontRequest};
use weft_theme::{ColorToken, MetricToken, ThemeContext};

use crate::element::{Element, LayoutCx, VisualsCx};
use crate::property::{fire, Invalidation, PropertySlot};

/// A run of text measured and shaped through the context's font provider.
///
/// Size and color follow the theme's `FontSize` and `TextPrimary` tokens
/// until set explicitly.
#[derive(Clone, Debug)]
pub struct TextBlock {
    text: PropertySlot<String>,
    family: PropertySlot<Option<String>>,
    font_size: PropertySlot<f32>,
    foreground: PropertySlot<Color>,
}

impl Default for TextBlock {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: PropertySlot::new(text.into(), Invalidation::SelfLayout),
            family: PropertySlot::new(None, Invalidation::SelfLayout),
            font_size: PropertySlot::new(FontRequest::default().size, Invalidation::SelfLayout)
                .with_theme(MetricToken::FontSize),
            foreground: PropertySlot::new(Color::BLACK, Invalidation::Visuals)
                .with_theme(ColorToken::TextPrimary),
        }
    }

    pub fn text(&self) -> &str {
        self.text.get()
    }

    pub fn font_size(&self) -> f32 {
        self.font_size.value()
    }

    pub fn foreground(&self) -> Color {
        self.foreground.value()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Option<Invalidation> {
        self.text.set(text.into())
    }

    pub fn set_family(&mut self, family: Option<String>) -> Option<Invalidation> {
        self.family.set(family)
    }

    pub fn set_font_size(&mut self, size: f32) -> Option<Invalidation> {
        self.font_size.set(size)
    }

    pub fn set_foreground(&mut self, color: Color) -> Option<Invalidation> {
        self.foreground.set(color)
    }

    pub fn font(&self) -> FontRequest {
        FontRequest {
            family: self.family.get().clone(),
            size: self.font_size(),
        }
    }
}

impl Element for TextBlock {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, _available: Size) -> Size {
        let font = self.font();
        match cx.ui().fonts.measure(self.text(), &font) {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(%err, "text measure failed, using fallback font");
                FallbackFont.layout(self.text(), &font).size
            }
        }
    }

    fn update_visuals(&mut self, cx: &mut VisualsCx<'_>) {
        if self.text().is_empty() {
            return;
        }
        let ui = *cx.ui();
        let origin = cx.rects().inside.origin;
        cx.builder()
            .draw_text(self.text(), origin, &self.font(), self.foreground(), ui.fonts);
    }

    fn resolve_theme(&mut self, theme: &ThemeContext) -> Option<Invalidation> {
        let mut fired = None;
        fire(&mut fired, self.font_size.resolve_theme(theme));
        fire(&mut fired, self.foreground.resolve_theme(theme));
        fired
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
