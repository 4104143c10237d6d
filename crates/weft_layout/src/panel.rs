//! Overlay panel
//!
//! The default container: every visible child is offered the whole inside
//! rect and the panel wants the largest child size.

use std::any::Any;

use weft_core::{Rect, Size};

use crate::element::{Element, LayoutCx};

/// Children stacked on top of each other
#[derive(Clone, Copy, Debug, Default)]
pub struct Panel;

impl Element for Panel {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Measure every visible child with the full space; returns the largest
pub fn measure_overlay(cx: &mut LayoutCx<'_>, available: Size) -> Size {
    let mut desired = Size::ZERO;
    for child in cx.visible_children() {
        desired = desired.max(cx.measure_child(child, available));
    }
    desired
}

/// Arrange every visible child over the full rect
pub fn arrange_overlay(cx: &mut LayoutCx<'_>, final_size: Size) -> Size {
    let rect = Rect::from_origin_size(Default::default(), final_size);
    for child in cx.visible_children() {
        cx.arrange_child(child, rect);
    }
    final_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Visibility;
    use crate::testing::TestEnv;
    use crate::LayoutTree;
    use weft_core::Thickness;

    #[test]
    fn test_overlay_takes_largest_child() {
        let env = TestEnv::new();
        let mut tree = LayoutTree::new();
        let root = tree.insert(Panel);
        let wide = tree.insert(Panel);
        let tall = tree.insert(Panel);
        let hidden = tree.insert(Panel);
        tree.append_child(root, wide).unwrap();
        tree.append_child(root, tall).unwrap();
        tree.append_child(root, hidden).unwrap();
        tree.set_width(wide, Some(60.0)).unwrap();
        tree.set_height(wide, Some(10.0)).unwrap();
        tree.set_width(tall, Some(5.0)).unwrap();
        tree.set_height(tall, Some(40.0)).unwrap();
        tree.set_width(hidden, Some(500.0)).unwrap();
        tree.set_visibility(hidden, Visibility::Collapsed).unwrap();

        let desired = tree.measure_node(root, Size::new(100.0, 100.0), &env.ui());
        assert_eq!(desired, Size::new(60.0, 40.0));
    }

    #[test]
    fn test_children_offset_by_border_and_padding() {
        let env = TestEnv::new();
        let mut tree = LayoutTree::new();
        let root = tree.insert(Panel);
        let child = tree.insert(Panel);
        tree.append_child(root, child).unwrap();
        tree.set_border_thickness(root, Thickness::uniform(2.0)).unwrap();
        tree.set_padding(root, Thickness::uniform(3.0)).unwrap();
        tree.set_root(root).unwrap();
        tree.set_viewport(Size::new(50.0, 50.0));
        tree.update_layout(&env.ui());

        // Child rects are relative to the parent's border origin
        assert_eq!(
            tree.rects(child).unwrap().border,
            Rect::new(5.0, 5.0, 40.0, 40.0)
        );
        assert_eq!(
            tree.global_border_rect(child),
            Some(Rect::new(5.0, 5.0, 40.0, 40.0))
        );
    }
}
