//! Weft Layout Engine
//!
//! A retained tree of layout nodes with a two-pass Measure/Arrange engine:
//!
//! - **Tree**: [`LayoutTree`] arena of nodes, strict parent ownership, typed
//!   property setters routed through dirty-state invalidation
//! - **Properties**: [`PropertySlot`]s with invalidation categories and theme
//!   bindings, plus per-node [`AttachedProperties`]
//! - **Layout**: WPF-style min/max derivation, alignment and clip detection
//! - **Elements**: the [`Element`] capability trait with built-in panels,
//!   text and images
//! - **Drawing**: traversal into a [`weft_render::BatchBuilder`] with cached
//!   per-node visuals
//!
//! # Example
//!
//! ```rust
//! use weft_core::{Size, Thickness};
//! use weft_layout::{InputHandle, LayoutConfig, LayoutTree, Panel, UiContext};
//! use weft_render::FallbackFont;
//! use weft_theme::ThemeContext;
//!
//! let theme = ThemeContext::default();
//! let input = InputHandle::new();
//! let config = LayoutConfig::default();
//! let ui = UiContext::new(&theme, &FallbackFont, &input, &config);
//!
//! let mut tree = LayoutTree::new();
//! let node = tree.insert(Panel);
//! tree.set_width(node, Some(100.0)).unwrap();
//! tree.set_height(node, Some(50.0)).unwrap();
//! tree.set_margin(node, Thickness::uniform(10.0)).unwrap();
//!
//! let desired = tree.measure_node(node, Size::new(200.0, 200.0), &ui);
//! assert_eq!(desired, Size::new(120.0, 70.0));
//! ```

pub mod attached;
pub mod canvas;
pub mod config;
pub mod context;
pub mod dock;
pub mod draw;
pub mod element;
pub mod error;
pub mod image;
pub mod input;
pub mod layout;
pub mod node;
pub mod panel;
pub mod property;
pub mod stack;
pub mod text;
pub mod tree;

pub use attached::{AttachedKey, AttachedProperties, AttachedType, AttachedValue};
pub use canvas::CanvasPanel;
pub use config::LayoutConfig;
pub use context::UiContext;
pub use dock::{Dock, DockPanel};
pub use draw::DrawCx;
pub use element::{Element, LayoutCx, VisualsCx};
pub use error::{LayoutError, Result};
pub use image::ImageBox;
pub use input::{InputHandle, InputState, MouseButton};
pub use layout::MinMax;
pub use node::{
    HorizontalAlignment, LayoutRects, NodeProperties, NodeState, VerticalAlignment, Visibility,
};
pub use panel::Panel;
pub use property::{Invalidation, PropertySlot, Themed};
pub use stack::{Orientation, StackPanel};
pub use text::TextBlock;
pub use tree::{ChildList, LayoutTree, NodeId};

#[cfg(test)]
pub(crate) mod testing {
    use weft_render::FallbackFont;
    use weft_theme::ThemeContext;

    use crate::{InputHandle, LayoutConfig, UiContext};

    /// Owned collaborators for building a [`UiContext`] in tests
    pub struct TestEnv {
        pub theme: ThemeContext,
        pub fonts: FallbackFont,
        pub input: InputHandle,
        pub config: LayoutConfig,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                theme: ThemeContext::default(),
                fonts: FallbackFont,
                input: InputHandle::new(),
                config: LayoutConfig::standard(),
            }
        }

        pub fn ui(&self) -> UiContext<'_> {
            UiContext::new(&self.theme, &self.fonts, &self.input, &self.config)
        }
    }
}
