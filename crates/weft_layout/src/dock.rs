//! Dock panel
//!
//! Children claim strips along the remaining edges in order. The side is
//! read from the [`DockPanel::DOCK`] attached property (default `Left`);
//! with `last_child_fill` the final visible child takes what is left.

use std::any::Any;

use weft_core::{Rect, Size};

use crate::attached::{AttachedKey, AttachedType, AttachedValue};
use crate::element::{Element, LayoutCx};
use crate::property::{Invalidation, PropertySlot};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dock {
    #[default]
    Left,
    Top,
    Right,
    Bottom,
}

impl AttachedType for Dock {
    fn into_value(self) -> AttachedValue {
        AttachedValue::Int(self as i64)
    }

    fn from_value(value: &AttachedValue) -> Option<Self> {
        match value {
            AttachedValue::Int(0) => Some(Dock::Left),
            AttachedValue::Int(1) => Some(Dock::Top),
            AttachedValue::Int(2) => Some(Dock::Right),
            AttachedValue::Int(3) => Some(Dock::Bottom),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DockPanel {
    last_child_fill: PropertySlot<bool>,
}

impl Default for DockPanel {
    fn default() -> Self {
        Self {
            last_child_fill: PropertySlot::new(true, Invalidation::SelfLayout),
        }
    }
}

impl DockPanel {
    /// Side a child docks to
    pub const DOCK: AttachedKey = AttachedKey::new("DockPanel.Dock", Invalidation::ParentLayout);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_child_fill(&self) -> bool {
        self.last_child_fill.value()
    }

    pub fn set_last_child_fill(&mut self, fill: bool) -> Option<Invalidation> {
        self.last_child_fill.set(fill)
    }
}

fn dock_of(cx: &LayoutCx<'_>, child: crate::NodeId) -> Dock {
    cx.attached(child, DockPanel::DOCK).unwrap_or_default()
}

impl Element for DockPanel {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, available: Size) -> Size {
        let mut parent = Size::ZERO;
        let mut used = Size::ZERO;

        for child in cx.visible_children() {
            let remaining = Size::new(
                (available.width - used.width).max(0.0),
                (available.height - used.height).max(0.0),
            );
            let desired = cx.measure_child(child, remaining);
            match dock_of(cx, child) {
                Dock::Left | Dock::Right => {
                    parent.height = parent.height.max(used.height + desired.height);
                    used.width += desired.width;
                }
                Dock::Top | Dock::Bottom => {
                    parent.width = parent.width.max(used.width + desired.width);
                    used.height += desired.height;
                }
            }
        }
        parent.max(used)
    }

    fn arrange(&mut self, cx: &mut LayoutCx<'_>, final_size: Size) -> Size {
        let children = cx.visible_children();
        let docked = if self.last_child_fill() {
            children.len().saturating_sub(1)
        } else {
            children.len()
        };

        let (mut left, mut top, mut right, mut bottom) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
        for (index, &child) in children.iter().enumerate() {
            let desired = cx.desired_size(child);
            let mut rect = Rect::new(
                left,
                top,
                (final_size.width - (left + right)).max(0.0),
                (final_size.height - (top + bottom)).max(0.0),
            );

            if index < docked {
                match dock_of(cx, child) {
                    Dock::Left => {
                        left += desired.width;
                        rect.size.width = desired.width;
                    }
                    Dock::Right => {
                        right += desired.width;
                        rect.origin.x = (final_size.width - right).max(0.0);
                        rect.size.width = desired.width;
                    }
                    Dock::Top => {
                        top += desired.height;
                        rect.size.height = desired.height;
                    }
                    Dock::Bottom => {
                        bottom += desired.height;
                        rect.origin.y = (final_size.height - bottom).max(0.0);
                        rect.size.height = desired.height;
                    }
                }
            }
            cx.arrange_child(child, rect);
        }
        final_size
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;
    use crate::{LayoutTree, NodeId, Panel};

    fn docked(tree: &mut LayoutTree, parent: NodeId, dock: Dock, w: f32, h: f32) -> NodeId {
        let child = tree.insert(Panel);
        tree.set_width(child, Some(w)).unwrap();
        tree.set_height(child, Some(h)).unwrap();
        tree.set_attached(child, DockPanel::DOCK, dock).unwrap();
        tree.append_child(parent, child).unwrap();
        child
    }

    #[test]
    fn test_dock_round_trip() {
        for dock in [Dock::Left, Dock::Top, Dock::Right, Dock::Bottom] {
            assert_eq!(Dock::from_value(&dock.into_value()), Some(dock));
        }
        assert_eq!(Dock::from_value(&AttachedValue::Int(9)), None);
    }

    #[test]
    fn test_edges_then_fill() {
        let env = TestEnv::new();
        let mut tree = LayoutTree::new();
        let root = tree.insert(DockPanel::new());
        let top = docked(&mut tree, root, Dock::Top, 100.0, 10.0);
        let left = docked(&mut tree, root, Dock::Left, 20.0, 50.0);
        let bottom = docked(&mut tree, root, Dock::Bottom, 80.0, 5.0);
        let fill = tree.insert(Panel);
        tree.append_child(root, fill).unwrap();
        tree.set_root(root).unwrap();
        tree.set_viewport(Size::new(100.0, 80.0));
        tree.update_layout(&env.ui());

        assert_eq!(tree.rects(top).unwrap().border, Rect::new(0.0, 0.0, 100.0, 10.0));
        // Fixed height 50 centered in the 70-high strip below the top edge
        assert_eq!(tree.rects(left).unwrap().border, Rect::new(0.0, 20.0, 20.0, 50.0));
        assert_eq!(tree.rects(bottom).unwrap().border, Rect::new(20.0, 75.0, 80.0, 5.0));
        assert_eq!(tree.rects(fill).unwrap().border, Rect::new(20.0, 10.0, 80.0, 65.0));
    }

    #[test]
    fn test_measure_accumulates_edges() {
        let env = TestEnv::new();
        let mut tree = LayoutTree::new();
        let root = tree.insert(DockPanel::new());
        docked(&mut tree, root, Dock::Left, 20.0, 30.0);
        docked(&mut tree, root, Dock::Top, 50.0, 10.0);
        let desired = tree.measure_node(root, Size::new(200.0, 200.0), &env.ui());
        assert_eq!(desired, Size::new(70.0, 30.0));
    }

    #[test]
    fn test_changing_dock_invalidates_parent() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(DockPanel::new());
        let child = docked(&mut tree, root, Dock::Left, 1.0, 1.0);
        let env = TestEnv::new();
        tree.set_root(root).unwrap();
        tree.set_viewport(Size::new(10.0, 10.0));
        tree.update_layout(&env.ui());
        assert!(!tree.state(root).unwrap().layout_invalid);

        tree.set_attached(child, DockPanel::DOCK, Dock::Right).unwrap();
        assert!(tree.state(root).unwrap().layout_invalid);
    }
}
