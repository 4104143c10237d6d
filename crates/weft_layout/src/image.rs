//! Image element

use std::any::Any;

use weft_core::{Color, Size};
use weft_render::Texture;

use crate::element::{Element, LayoutCx, VisualsCx};
use crate::property::{Invalidation, PropertySlot};

/// A texture region stretched over the inside rect.
///
/// Wants the region's pixel size. Without a texture it wants nothing and
/// draws the missing-texture quad.
#[derive(Clone, Debug)]
pub struct ImageBox {
    texture: Option<Texture>,
    tint: PropertySlot<Color>,
}

impl Default for ImageBox {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ImageBox {
    pub fn new(texture: Option<Texture>) -> Self {
        Self {
            texture,
            tint: PropertySlot::new(Color::WHITE, Invalidation::Visuals),
        }
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn tint(&self) -> Color {
        self.tint.value()
    }

    /// Textures have no value equality; every assignment re-measures
    pub fn set_texture(&mut self, texture: Option<Texture>) -> Option<Invalidation> {
        self.texture = texture;
        Some(Invalidation::SelfLayout)
    }

    pub fn set_tint(&mut self, tint: Color) -> Option<Invalidation> {
        self.tint.set(tint)
    }
}

impl Element for ImageBox {
    fn measure(&mut self, _cx: &mut LayoutCx<'_>, _available: Size) -> Size {
        self.texture
            .as_ref()
            .map(Texture::region_size)
            .unwrap_or_default()
    }

    fn arrange(&mut self, _cx: &mut LayoutCx<'_>, final_size: Size) -> Size {
        final_size
    }

    fn update_visuals(&mut self, cx: &mut VisualsCx<'_>) {
        let inside = cx.rects().inside;
        cx.builder()
            .draw_image(inside, self.texture.as_ref(), self.tint());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
