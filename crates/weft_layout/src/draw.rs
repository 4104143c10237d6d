//! Drawing traversal
//!
//! Walks the arranged tree and feeds a [`BatchBuilder`]. Each node draws in
//! its own border-local space under a multiply transform, so cached visuals
//! stay valid when only an ancestor moves.
//!
//! Per node:
//!
//! 1. translate to the border origin
//! 2. clip to the border rect when layout overflowed or `clip_to_bounds` is set
//! 3. rebuild the cached visuals list if it is stale, then inline it
//! 4. let the element draw dynamic content
//! 5. recurse into children

use weft_core::{Affine2D, Rect};
use weft_render::{BatchBuilder, CommandList};

use crate::context::UiContext;
use crate::element::VisualsCx;
use crate::input::InputHandle;
use crate::node::{LayoutRects, NodeProperties, Visibility};
use crate::tree::{LayoutTree, NodeId};

/// Builder and node state lent to an element for per-frame drawing
pub struct DrawCx<'a> {
    pub(crate) builder: &'a mut BatchBuilder,
    pub(crate) ui: &'a UiContext<'a>,
    pub(crate) node: NodeId,
    pub(crate) rects: LayoutRects,
}

impl<'a> DrawCx<'a> {
    pub fn builder(&mut self) -> &mut BatchBuilder {
        &mut *self.builder
    }

    /// The node's rects relative to its border origin
    pub fn rects(&self) -> LayoutRects {
        self.rects
    }

    pub fn context(&self) -> &UiContext<'a> {
        self.ui
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn input(&self) -> &InputHandle {
        self.ui.input
    }

    /// Whether the mouse is over `rect`, given in this node's local space.
    ///
    /// The mouse position is mapped back through the builder's current
    /// transform; anything outside the active clip never counts.
    pub fn is_mouse_over(&self, rect: Rect) -> bool {
        let mouse = self.ui.input.mouse_position();
        if let Some(clip) = self.builder.current_clip() {
            if !clip.contains(mouse) {
                return false;
            }
        }
        match self.builder.current_transform().inverse() {
            Some(inverse) => rect.contains(inverse.transform_point(mouse)),
            None => false,
        }
    }

    /// Defer work to backend execution time; see [`BatchBuilder::run_action`]
    pub fn run_action(&mut self, thunk: impl Fn() -> CommandList + 'static) {
        self.builder.run_action(thunk);
    }
}

impl LayoutTree {
    /// Lay out if needed, then draw the whole tree into `builder`
    pub fn draw(&mut self, builder: &mut BatchBuilder, ui: &UiContext<'_>) {
        self.update_layout(ui);
        let Some(root) = self.root else {
            return;
        };
        let mut rebuilt = 0usize;
        self.draw_node(root, builder, ui, &mut rebuilt);
        tracing::trace!(rebuilt, "tree drawn");
    }

    fn draw_node(
        &mut self,
        id: NodeId,
        builder: &mut BatchBuilder,
        ui: &UiContext<'_>,
        rebuilt: &mut usize,
    ) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.visibility() != Visibility::Visible {
            return;
        }

        let rects = node.layout.rects;
        let clip = node.layout.needs_clip_bounds || node.props.clip_to_bounds.value();
        let origin = rects.border.origin;
        let local = rects.to_local();

        builder.with_transform(Affine2D::translation(origin.x, origin.y), true, |builder| {
            if clip {
                builder.with_clip(local.border, |builder| {
                    self.draw_contents(id, local, builder, ui, rebuilt)
                });
            } else {
                self.draw_contents(id, local, builder, ui, rebuilt);
            }
        });
    }

    fn draw_contents(
        &mut self,
        id: NodeId,
        local: LayoutRects,
        builder: &mut BatchBuilder,
        ui: &UiContext<'_>,
        rebuilt: &mut usize,
    ) {
        let node = &self.nodes[id];
        if node.state.visuals_invalid || node.visuals.is_none() {
            let visuals = self.build_visuals(id, local, builder, ui);
            let node = &mut self.nodes[id];
            node.visuals = Some(visuals);
            node.state.visuals_invalid = false;
            *rebuilt += 1;
        }
        if let Some(visuals) = self.nodes[id].visuals.clone() {
            builder.enqueue_commands(&visuals);
        }

        if let Some(mut element) = self.nodes[id].element.take() {
            let mut cx = DrawCx {
                builder: &mut *builder,
                ui,
                node: id,
                rects: local,
            };
            element.draw(&mut cx);
            self.nodes[id].element = Some(element);
        }

        let children = self.nodes[id].children.clone();
        for child in children {
            self.draw_node(child, builder, ui, rebuilt);
        }
    }

    /// Background, border and element visuals in border-local space
    fn build_visuals(
        &mut self,
        id: NodeId,
        local: LayoutRects,
        builder: &BatchBuilder,
        ui: &UiContext<'_>,
    ) -> CommandList {
        let mut visuals = builder.fork();
        paint_frame(&mut visuals, &self.nodes[id].props, local.border);

        if let Some(mut element) = self.nodes[id].element.take() {
            let mut cx = VisualsCx {
                builder: &mut visuals,
                ui,
                tree: &*self,
                node: id,
                rects: local,
            };
            element.update_visuals(&mut cx);
            self.nodes[id].element = Some(element);
        }
        visuals.build()
    }
}

fn paint_frame(builder: &mut BatchBuilder, props: &NodeProperties, border: Rect) {
    let radii = props.corner_radius.value();
    let background = props.background.value();
    if !background.is_transparent() {
        if radii.is_zero() {
            builder.draw_rectangle(border, background);
        } else {
            builder.draw_rounded_rectangle(border, radii, background);
        }
    }

    let thickness = props.border_thickness.value().clamp_non_negative();
    let brush = props.border_brush.value();
    if !thickness.is_zero() && !brush.is_transparent() {
        if radii.is_zero() {
            builder.draw_rectangle_outline(border, &thickness, brush);
        } else {
            builder.draw_rounded_outline(border, radii, &thickness, brush);
        }
    }
}
