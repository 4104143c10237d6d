//! Canvas panel: absolute placement at each child's `x`/`y`

use std::any::Any;

use weft_core::{Rect, Size};

use crate::element::{Element, LayoutCx};

/// Children measured without limits and placed at their own position.
///
/// The canvas wants the extent that covers every child.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasPanel;

impl Element for CanvasPanel {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, _available: Size) -> Size {
        let mut extent = Size::ZERO;
        for child in cx.visible_children() {
            let desired = cx.measure_child(child, Size::INFINITY);
            let position = cx.position(child);
            extent = extent.max(Size::new(
                position.x + desired.width,
                position.y + desired.height,
            ));
        }
        extent
    }

    fn arrange(&mut self, cx: &mut LayoutCx<'_>, final_size: Size) -> Size {
        for child in cx.visible_children() {
            let desired = cx.desired_size(child);
            cx.arrange_child(child, Rect::from_origin_size(cx.position(child), desired));
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
    use crate::{LayoutTree, Panel};

    #[test]
    fn test_children_at_position() {
        let env = TestEnv::new();
        let mut tree = LayoutTree::new();
        let canvas = tree.insert(CanvasPanel);
        let child = tree.insert(Panel);
        tree.append_child(canvas, child).unwrap();
        tree.set_x(child, 15.0).unwrap();
        tree.set_y(child, 25.0).unwrap();
        tree.set_width(child, Some(10.0)).unwrap();
        tree.set_height(child, Some(5.0)).unwrap();
        tree.set_root(canvas).unwrap();
        tree.set_viewport(Size::new(200.0, 200.0));
        tree.update_layout(&env.ui());

        assert_eq!(tree.desired_size(canvas), Some(Size::new(25.0, 30.0)));
        assert_eq!(
            tree.rects(child).unwrap().border,
            Rect::new(15.0, 25.0, 10.0, 5.0)
        );

        // Moving a child re-lays out through its parent
        tree.set_x(child, 40.0).unwrap();
        assert!(tree.state(canvas).unwrap().layout_invalid);
        tree.update_layout(&env.ui());
        assert_eq!(tree.rects(child).unwrap().border.x(), 40.0);
    }
}
