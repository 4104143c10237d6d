//! Shared textures
//!
//! A [`Texture`] is a cheap handle onto a reference-counted pixel page plus a
//! uv region inside that page. Handles created with [`Texture::sub_region`]
//! share the page, so glyphs or icons packed into one atlas batch together.
//! The core only reads a texture's region and filter; the backing store is
//! never mutated after creation.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use weft_core::{Color, Rect};

use crate::error::{RenderError, Result};

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a texture page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Pixel layout of a texture page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8,
    Alpha8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Alpha8 => 1,
        }
    }
}

/// Sampler interpolation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    Linear,
    Nearest,
}

struct TexturePage {
    id: TextureId,
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

/// Handle to a region of a shared texture page
#[derive(Clone)]
pub struct Texture {
    page: Rc<TexturePage>,
    /// Normalized uv region (0..1) inside the page
    region: Rect,
    filter: Filter,
}

impl Texture {
    /// Create a texture page from raw pixels
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::ZeroSizedTexture { width, height });
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(RenderError::PixelDataMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let id = TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(id = id.0, width, height, ?format, "texture created");

        Ok(Self {
            page: Rc::new(TexturePage {
                id,
                width,
                height,
                format,
                pixels,
            }),
            region: Rect::new(0.0, 0.0, 1.0, 1.0),
            filter: Filter::Linear,
        })
    }

    /// Decode an encoded image (PNG) into an RGBA page
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelFormat::Rgba8, image.into_raw())
    }

    /// 1x1 texture of a single color
    pub fn solid(color: Color) -> Self {
        let px = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        Self::new(1, 1, PixelFormat::Rgba8, px.to_vec())
            .unwrap_or_else(|_| unreachable!("1x1 RGBA buffer is always 4 bytes"))
    }

    /// A handle onto a pixel sub-rectangle of the same page
    pub fn sub_region(&self, pixels: Rect) -> Texture {
        let w = self.page.width as f32;
        let h = self.page.height as f32;
        Texture {
            page: Rc::clone(&self.page),
            region: Rect::new(
                pixels.x() / w,
                pixels.y() / h,
                pixels.width() / w,
                pixels.height() / h,
            ),
            filter: self.filter,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn id(&self) -> TextureId {
        self.page.id
    }

    pub fn width(&self) -> u32 {
        self.page.width
    }

    pub fn height(&self) -> u32 {
        self.page.height
    }

    pub fn format(&self) -> PixelFormat {
        self.page.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.page.pixels
    }

    /// Normalized uv region
    pub fn uv_region(&self) -> Rect {
        self.region
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Size of the region in pixels
    pub fn region_size(&self) -> weft_core::Size {
        weft_core::Size::new(
            self.region.width() * self.page.width as f32,
            self.region.height() * self.page.height as f32,
        )
    }

    /// Whether two handles bind identical GPU state (same page and filter)
    pub fn same_binding(&self, other: &Texture) -> bool {
        self.page.id == other.page.id && self.filter == other.filter
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.page.id)
            .field("size", &(self.page.width, self.page.height))
            .field("format", &self.page.format)
            .field("region", &self.region)
            .field("filter", &self.filter)
            .finish()
    }
}

/// Binding equality for optional textures
pub(crate) fn same_binding(a: Option<&Texture>, b: Option<&Texture>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_binding(b),
        _ => false,
    }
}
