//! Element capability interface
//!
//! An [`Element`] gives a node its behavior: how it measures and arranges
//! children, what it contributes to the node's cached visuals, and what it
//! draws dynamically each frame. The tree owns elements as `Box<dyn Element>`
//! and lends each one a context ([`LayoutCx`], [`VisualsCx`],
//! [`DrawCx`](crate::DrawCx)) through which it reaches its children.

use std::any::Any;

use weft_core::{Point, Rect, Size};
use weft_render::BatchBuilder;
use weft_theme::ThemeContext;

use crate::attached::{AttachedKey, AttachedType};
use crate::context::UiContext;
use crate::draw::DrawCx;
use crate::node::{LayoutRects, NodeProperties, Visibility};
use crate::panel;
use crate::property::Invalidation;
use crate::tree::{ChildList, LayoutTree, NodeId};

/// Behavior of a layout node
///
/// Sizes passed to `measure` and `arrange` exclude the node's margin,
/// border and padding; the tree adds those around the element's answer.
/// The defaults lay every child over the full inside rect.
pub trait Element: Any {
    /// Desired content size for the space available inside border and padding
    fn measure(&mut self, cx: &mut LayoutCx<'_>, available: Size) -> Size {
        panel::measure_overlay(cx, available)
    }

    /// Place children inside `final_size`; returns the size actually used
    fn arrange(&mut self, cx: &mut LayoutCx<'_>, final_size: Size) -> Size {
        panel::arrange_overlay(cx, final_size)
    }

    /// Append static content to the node's cached visuals
    fn update_visuals(&mut self, _cx: &mut VisualsCx<'_>) {}

    /// Draw per-frame content after the cached visuals
    fn draw(&mut self, _cx: &mut DrawCx<'_>) {}

    /// Called after arrange when the render size changed
    fn on_resize(&mut self, _size: Size) {}

    /// Re-resolve element-owned theme-bound slots
    fn resolve_theme(&mut self, _theme: &ThemeContext) -> Option<Invalidation> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout context
// ─────────────────────────────────────────────────────────────────────────────

/// Tree access lent to an element during measure and arrange
pub struct LayoutCx<'a> {
    pub(crate) tree: &'a mut LayoutTree,
    pub(crate) ui: &'a UiContext<'a>,
    pub(crate) node: NodeId,
    /// Border + padding offset of this node's inside rect
    pub(crate) inside_offset: Point,
}

impl<'a> LayoutCx<'a> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn ui(&self) -> &UiContext<'a> {
        self.ui
    }

    pub fn children(&self) -> ChildList {
        self.tree.children(self.node).iter().copied().collect()
    }

    /// Children that take part in layout (not collapsed)
    pub fn visible_children(&self) -> ChildList {
        self.tree
            .children(self.node)
            .iter()
            .copied()
            .filter(|&child| self.visibility(child) != Visibility::Collapsed)
            .collect()
    }

    /// Measure a child; the result includes its margin
    pub fn measure_child(&mut self, child: NodeId, available: Size) -> Size {
        self.tree.measure_node(child, available, self.ui)
    }

    /// Arrange a child within `rect`, given relative to this node's inside rect
    pub fn arrange_child(&mut self, child: NodeId, rect: Rect) {
        let rect = rect.offset(self.inside_offset.x, self.inside_offset.y);
        self.tree.arrange_node(child, rect, self.ui);
    }

    pub fn desired_size(&self, child: NodeId) -> Size {
        self.tree.desired_size(child).unwrap_or_default()
    }

    pub fn visibility(&self, child: NodeId) -> Visibility {
        self.tree
            .properties(child)
            .map(|p| p.visibility.value())
            .unwrap_or_default()
    }

    /// A child's `x`/`y`
    pub fn position(&self, child: NodeId) -> Point {
        self.tree
            .properties(child)
            .map(NodeProperties::position)
            .unwrap_or_default()
    }

    pub fn attached<T: AttachedType>(&self, child: NodeId, key: AttachedKey) -> Option<T> {
        self.tree.attached(child, key)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Visuals context
// ─────────────────────────────────────────────────────────────────────────────

/// Builder and node state lent to an element while its visuals are rebuilt
pub struct VisualsCx<'a> {
    pub(crate) builder: &'a mut BatchBuilder,
    pub(crate) ui: &'a UiContext<'a>,
    pub(crate) tree: &'a LayoutTree,
    pub(crate) node: NodeId,
    pub(crate) rects: LayoutRects,
}

impl<'a> VisualsCx<'a> {
    pub fn builder(&mut self) -> &mut BatchBuilder {
        &mut *self.builder
    }

    pub fn ui(&self) -> &UiContext<'a> {
        self.ui
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The node's rects relative to its border origin
    pub fn rects(&self) -> LayoutRects {
        self.rects
    }

    pub fn properties(&self) -> Option<&NodeProperties> {
        self.tree.properties(self.node)
    }
}
