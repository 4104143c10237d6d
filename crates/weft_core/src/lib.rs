//! Weft Core Types
//!
//! Foundational value types shared by every Weft crate:
//!
//! - **Geometry**: [`Point`], [`Size`], [`Rect`], [`Thickness`], [`CornerRadius`]
//! - **Transforms**: [`Affine2D`] for the render transform stack and hit-testing
//! - **Color**: linear RGBA [`Color`]
//!
//! These are pure math types. Invalidation and dirty tracking live in
//! `weft_layout`; nothing here knows about the element tree.
//!
//! # Example
//!
//! ```rust
//! use weft_core::{Rect, Thickness};
//!
//! let margin_rect = Rect::new(0.0, 0.0, 120.0, 70.0);
//! let border_rect = margin_rect.deflate(&Thickness::uniform(10.0));
//! assert_eq!(border_rect, Rect::new(10.0, 10.0, 100.0, 50.0));
//! ```

pub mod color;
pub mod geometry;

pub use color::Color;
pub use geometry::{Affine2D, CornerRadius, Point, Rect, Size, Thickness};
