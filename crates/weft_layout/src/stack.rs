//! Stack panel
//!
//! Lines children up along one axis. Each child gets its desired extent on
//! the stacking axis and the full cross extent; collapsed children take no
//! space and no spacing.

use std::any::Any;

use weft_core::{Rect, Size};

use crate::element::{Element, LayoutCx};
use crate::property::{Invalidation, PropertySlot};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Clone, Debug)]
pub struct StackPanel {
    orientation: PropertySlot<Orientation>,
    spacing: PropertySlot<f32>,
}

impl Default for StackPanel {
    fn default() -> Self {
        Self::new(Orientation::Vertical)
    }
}

impl StackPanel {
    pub fn new(orientation: Orientation) -> Self {
        let mut panel = Self {
            orientation: PropertySlot::new(Orientation::Vertical, Invalidation::SelfLayout),
            spacing: PropertySlot::new(0.0, Invalidation::SelfLayout),
        };
        panel.orientation.set(orientation);
        panel
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.set_spacing(spacing);
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.value()
    }

    pub fn spacing(&self) -> f32 {
        self.spacing.value()
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Option<Invalidation> {
        self.orientation.set(orientation)
    }

    /// Gap between consecutive visible children; negatives read as zero
    pub fn set_spacing(&mut self, spacing: f32) -> Option<Invalidation> {
        let spacing = if spacing.is_finite() { spacing.max(0.0) } else { 0.0 };
        self.spacing.set(spacing)
    }

    fn is_vertical(&self) -> bool {
        self.orientation() == Orientation::Vertical
    }
}

impl Element for StackPanel {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, available: Size) -> Size {
        let vertical = self.is_vertical();
        let child_available = if vertical {
            Size::new(available.width, f32::INFINITY)
        } else {
            Size::new(f32::INFINITY, available.height)
        };

        let children = cx.visible_children();
        let mut along = 0.0f32;
        let mut across = 0.0f32;
        for child in &children {
            let size = cx.measure_child(*child, child_available);
            if vertical {
                along += size.height;
                across = across.max(size.width);
            } else {
                along += size.width;
                across = across.max(size.height);
            }
        }
        along += self.spacing() * children.len().saturating_sub(1) as f32;

        if vertical {
            Size::new(across, along)
        } else {
            Size::new(along, across)
        }
    }

    fn arrange(&mut self, cx: &mut LayoutCx<'_>, final_size: Size) -> Size {
        let vertical = self.is_vertical();
        let spacing = self.spacing();
        let mut offset = 0.0f32;
        for child in cx.visible_children() {
            let desired = cx.desired_size(child);
            let rect = if vertical {
                Rect::new(0.0, offset, final_size.width.max(desired.width), desired.height)
            } else {
                Rect::new(offset, 0.0, desired.width, final_size.height.max(desired.height))
            };
            cx.arrange_child(child, rect);
            offset += if vertical { desired.height } else { desired.width } + spacing;
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
    use crate::node::{HorizontalAlignment, Visibility};
    use crate::testing::TestEnv;
    use crate::{LayoutTree, NodeId, Panel};
    use weft_core::Thickness;

    fn sized(tree: &mut LayoutTree, parent: NodeId, w: f32, h: f32) -> NodeId {
        let child = tree.insert(Panel);
        tree.set_width(child, Some(w)).unwrap();
        tree.set_height(child, Some(h)).unwrap();
        tree.append_child(parent, child).unwrap();
        child
    }

    #[test]
    fn test_vertical_stack_with_spacing() {
        let env = TestEnv::new();
        let mut tree = LayoutTree::new();
        let root = tree.insert(StackPanel::vertical().with_spacing(4.0));
        let a = sized(&mut tree, root, 30.0, 10.0);
        let b = sized(&mut tree, root, 50.0, 20.0);
        tree.set_margin(b, Thickness::uniform(1.0)).unwrap();
        tree.set_horizontal_alignment(b, HorizontalAlignment::Left).unwrap();
        tree.set_root(root).unwrap();
        tree.set_viewport(Size::new(100.0, 100.0));
        tree.update_layout(&env.ui());

        assert_eq!(tree.desired_size(root), Some(Size::new(52.0, 36.0)));
        assert_eq!(tree.rects(a).unwrap().border, Rect::new(35.0, 0.0, 30.0, 10.0));
        assert_eq!(tree.rects(b).unwrap().margin, Rect::new(0.0, 14.0, 52.0, 22.0));
        assert_eq!(tree.rects(b).unwrap().border, Rect::new(1.0, 15.0, 50.0, 20.0));
    }

    #[test]
    fn test_horizontal_stack_skips_collapsed() {
        let env = TestEnv::new();
        let mut tree = LayoutTree::new();
        let root = tree.insert(StackPanel::horizontal().with_spacing(2.0));
        let a = sized(&mut tree, root, 10.0, 5.0);
        let gone = sized(&mut tree, root, 99.0, 99.0);
        let c = sized(&mut tree, root, 10.0, 8.0);
        tree.set_visibility(gone, Visibility::Collapsed).unwrap();

        let desired = tree.measure_node(root, Size::new(100.0, 100.0), &env.ui());
        assert_eq!(desired, Size::new(22.0, 8.0));

        tree.arrange_node(root, Rect::new(0.0, 0.0, 22.0, 8.0), &env.ui());
        assert_eq!(tree.rects(a).unwrap().border.x(), 0.0);
        assert_eq!(tree.rects(c).unwrap().border.x(), 12.0);
    }

    #[test]
    fn test_spacing_setter_fires_once() {
        let mut panel = StackPanel::vertical();
        assert_eq!(panel.set_spacing(-3.0), Some(Invalidation::SelfLayout));
        assert_eq!(panel.spacing(), 0.0);
        assert_eq!(panel.set_spacing(0.0), None);
        assert_eq!(
            panel.set_orientation(Orientation::Horizontal),
            Some(Invalidation::SelfLayout)
        );
    }
}
