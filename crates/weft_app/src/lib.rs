//! Weft Application
//!
//! Ties the layout tree, theme, fonts and input together behind [`Ui`].
//! Each [`Ui::frame`] runs layout when something changed and returns the
//! frame's [`weft_render::CommandList`] for a backend to replay.
//!
//! # Example
//!
//! ```rust
//! use weft_app::prelude::*;
//!
//! let mut ui = Ui::new(UiConfig::standard()).unwrap();
//! let tree = ui.tree_mut();
//! let root = tree.insert(StackPanel::vertical().with_spacing(4.0));
//! let title = tree.insert(TextBlock::new("Hello Weft"));
//! tree.append_child(root, title).unwrap();
//! tree.set_root(root).unwrap();
//!
//! ui.resize(Size::new(320.0, 240.0));
//! let list = ui.frame();
//! assert!(list.vertex_count() > 0);
//! ```

mod app;
mod config;
mod error;
mod logging;


pub use app::Ui;
pub use config::UiConfig;
pub use error::{AppError, Result};
pub use logging::init_logging;

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::app::Ui;
    pub use crate::config::UiConfig;
    pub use crate::error::{AppError, Result};
    pub use crate::logging::init_logging;

    // Tree and elements
    pub use weft_layout::{
        CanvasPanel, Dock, DockPanel, Element, HorizontalAlignment, ImageBox, Invalidation,
        LayoutCx, LayoutTree, NodeId, Orientation, Panel, StackPanel, TextBlock,
        VerticalAlignment, Visibility, VisualsCx,
    };

    // Rendering
    pub use weft_render::{Backend, CommandList, CommandLog, FontProvider, Texture};

    // Theme
    pub use weft_theme::{ColorToken, MetricToken, Theme};

    // Core types
    pub use weft_core::{Color, CornerRadius, Point, Rect, Size, Thickness};
}
