//! Layout node data
//!
//! A [`Node`] bundles the element that gives it behavior, its property
//! slots, attached properties, dirty state and the results of the last
//! layout pass. Nodes live in the [`LayoutTree`](crate::LayoutTree) arena
//! and are only reachable through it.

use weft_core::{Color, CornerRadius, Point, Rect, Size, Thickness};
use weft_render::CommandList;
use weft_theme::ThemeContext;

use crate::attached::AttachedProperties;
use crate::element::Element;
use crate::property::{fire, Invalidation, PropertySlot};
use crate::tree::{ChildList, NodeId};

// ─────────────────────────────────────────────────────────────────────────────
// Enumerations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    #[default]
    Stretch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    #[default]
    Stretch,
}

/// Visible draws; Hidden keeps its layout slot but draws nothing;
/// Collapsed is skipped by panels entirely
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapsed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

/// Property slots shared by every node
#[derive(Clone, Debug)]
pub struct NodeProperties {
    pub x: PropertySlot<f32>,
    pub y: PropertySlot<f32>,
    pub width: PropertySlot<Option<f32>>,
    pub height: PropertySlot<Option<f32>>,
    pub min_width: PropertySlot<f32>,
    pub min_height: PropertySlot<f32>,
    pub max_width: PropertySlot<f32>,
    pub max_height: PropertySlot<f32>,
    pub margin: PropertySlot<Thickness>,
    pub border_thickness: PropertySlot<Thickness>,
    pub padding: PropertySlot<Thickness>,
    pub horizontal_alignment: PropertySlot<HorizontalAlignment>,
    pub vertical_alignment: PropertySlot<VerticalAlignment>,
    pub visibility: PropertySlot<Visibility>,
    pub background: PropertySlot<Color>,
    pub border_brush: PropertySlot<Color>,
    pub corner_radius: PropertySlot<CornerRadius>,
    pub clip_to_bounds: PropertySlot<bool>,
    pub pixel_perfect: PropertySlot<bool>,
}

impl Default for NodeProperties {
    fn default() -> Self {
        use Invalidation::{ParentLayout, SelfLayout, Visuals};
        Self {
            x: PropertySlot::new(0.0, ParentLayout),
            y: PropertySlot::new(0.0, ParentLayout),
            width: PropertySlot::new(None, SelfLayout),
            height: PropertySlot::new(None, SelfLayout),
            min_width: PropertySlot::new(0.0, SelfLayout),
            min_height: PropertySlot::new(0.0, SelfLayout),
            max_width: PropertySlot::new(f32::INFINITY, SelfLayout),
            max_height: PropertySlot::new(f32::INFINITY, SelfLayout),
            margin: PropertySlot::new(Thickness::ZERO, ParentLayout),
            border_thickness: PropertySlot::new(Thickness::ZERO, SelfLayout),
            padding: PropertySlot::new(Thickness::ZERO, SelfLayout),
            horizontal_alignment: PropertySlot::new(HorizontalAlignment::Stretch, ParentLayout),
            vertical_alignment: PropertySlot::new(VerticalAlignment::Stretch, ParentLayout),
            visibility: PropertySlot::new(Visibility::Visible, ParentLayout),
            background: PropertySlot::new(Color::TRANSPARENT, Visuals),
            border_brush: PropertySlot::new(Color::TRANSPARENT, Visuals),
            corner_radius: PropertySlot::new(CornerRadius::ZERO, Visuals),
            clip_to_bounds: PropertySlot::new(false, Visuals),
            pixel_perfect: PropertySlot::new(false, SelfLayout),
        }
    }
}

impl NodeProperties {
    /// Re-resolve every theme-bound slot; returns the strongest category fired
    pub fn resolve_theme(&mut self, theme: &ThemeContext) -> Option<Invalidation> {
        let mut fired = None;
        fire(&mut fired, self.x.resolve_theme(theme));
        fire(&mut fired, self.y.resolve_theme(theme));
        fire(&mut fired, self.width.resolve_theme(theme));
        fire(&mut fired, self.height.resolve_theme(theme));
        fire(&mut fired, self.min_width.resolve_theme(theme));
        fire(&mut fired, self.min_height.resolve_theme(theme));
        fire(&mut fired, self.max_width.resolve_theme(theme));
        fire(&mut fired, self.max_height.resolve_theme(theme));
        fire(&mut fired, self.margin.resolve_theme(theme));
        fire(&mut fired, self.border_thickness.resolve_theme(theme));
        fire(&mut fired, self.padding.resolve_theme(theme));
        fire(&mut fired, self.background.resolve_theme(theme));
        fire(&mut fired, self.border_brush.resolve_theme(theme));
        fire(&mut fired, self.corner_radius.resolve_theme(theme));
        fired
    }

    /// Border plus padding
    pub fn frame(&self) -> Thickness {
        self.border_thickness.value().clamp_non_negative() + self.padding.value().clamp_non_negative()
    }

    pub fn margin(&self) -> Thickness {
        self.margin.value().clamp_non_negative()
    }

    /// Explicit position used by canvas-style panels
    pub fn position(&self) -> Point {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        Point::new(finite(self.x.value()), finite(self.y.value()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout results
// ─────────────────────────────────────────────────────────────────────────────

/// The four nested rects of a node, in its parent's local space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutRects {
    pub margin: Rect,
    pub border: Rect,
    pub padding: Rect,
    pub inside: Rect,
}

impl LayoutRects {
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            margin: self.margin.offset(dx, dy),
            border: self.border.offset(dx, dy),
            padding: self.padding.offset(dx, dy),
            inside: self.inside.offset(dx, dy),
        }
    }

    /// Same rects relative to the border origin
    pub fn to_local(&self) -> Self {
        self.offset(-self.border.x(), -self.border.y())
    }

    /// `inside ⊆ padding ⊆ border ⊆ margin`
    pub fn is_nested(&self) -> bool {
        self.margin.contains_rect(&self.border)
            && self.border.contains_rect(&self.padding)
            && self.padding.contains_rect(&self.inside)
    }
}

/// Dirty flags; layout invalidity implies visuals invalidity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeState {
    pub layout_invalid: bool,
    pub visuals_invalid: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            layout_invalid: true,
            visuals_invalid: true,
        }
    }
}

impl NodeState {
    pub fn is_clean(&self) -> bool {
        !self.layout_invalid && !self.visuals_invalid
    }
}

/// Outputs of the last measure and arrange
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutResult {
    /// Including margin
    pub desired_size: Size,
    /// Excluding margin, before clamping to max
    pub unclipped_desired_size: Size,
    pub render_size: Size,
    pub needs_clip_bounds: bool,
    pub rects: LayoutRects,
    pub(crate) last_measure: Option<Size>,
    pub(crate) last_arrange: Option<Rect>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Node
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: ChildList,
    /// Taken out while the element runs so it can borrow the tree
    pub(crate) element: Option<Box<dyn Element>>,
    pub(crate) props: NodeProperties,
    pub(crate) attached: AttachedProperties,
    pub(crate) state: NodeState,
    pub(crate) layout: LayoutResult,
    /// Background, border and element visuals from the last rebuild
    pub(crate) visuals: Option<CommandList>,
}

impl Node {
    pub(crate) fn new(element: Box<dyn Element>) -> Self {
        Self {
            parent: None,
            children: ChildList::new(),
            element: Some(element),
            props: NodeProperties::default(),
            attached: AttachedProperties::default(),
            state: NodeState::default(),
            layout: LayoutResult::default(),
            visuals: None,
        }
    }

    pub(crate) fn visibility(&self) -> Visibility {
        self.props.visibility.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories() {
        let props = NodeProperties::default();
        assert_eq!(props.x.invalidation(), Invalidation::ParentLayout);
        assert_eq!(props.width.invalidation(), Invalidation::SelfLayout);
        assert_eq!(props.margin.invalidation(), Invalidation::ParentLayout);
        assert_eq!(props.padding.invalidation(), Invalidation::SelfLayout);
        assert_eq!(props.visibility.invalidation(), Invalidation::ParentLayout);
        assert_eq!(props.background.invalidation(), Invalidation::Visuals);
        assert_eq!(props.pixel_perfect.invalidation(), Invalidation::SelfLayout);
    }

    #[test]
    fn test_default_values_are_unset() {
        let props = NodeProperties::default();
        assert_eq!(props.width.value(), None);
        assert_eq!(props.height.value(), None);
        assert!(!props.width.is_set());
        assert_eq!(props.max_width.value(), f32::INFINITY);
        assert_eq!(props.background.value(), Color::TRANSPARENT);
        assert!(!props.clip_to_bounds.value());
    }

    #[test]
    fn test_local_rects() {
        let rects = LayoutRects {
            margin: Rect::new(0.0, 0.0, 30.0, 30.0),
            border: Rect::new(5.0, 5.0, 20.0, 20.0),
            padding: Rect::new(6.0, 6.0, 18.0, 18.0),
            inside: Rect::new(8.0, 8.0, 14.0, 14.0),
        };
        assert!(rects.is_nested());
        let local = rects.to_local();
        assert_eq!(local.border, Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(local.margin.origin, Point::new(-5.0, -5.0));
        assert_eq!(local.inside.origin, Point::new(3.0, 3.0));
    }
}
