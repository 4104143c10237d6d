//! Measure and arrange passes
//!
//! Two-pass layout over the tree:
//!
//! 1. **Measure** walks down with the space a parent offers and returns the
//!    size each node wants, margin included. Min/max constraints follow the
//!    WPF `MinMax` derivation so explicit sizes and limits combine the same
//!    way.
//! 2. **Arrange** walks down with the slot each node gets and produces its
//!    margin, border, padding and inside rects in parent-local coordinates.
//!
//! Elements only see their inside space; border, padding and margin are
//! handled here.

use weft_core::{Point, Rect, Size, Thickness};

use crate::context::UiContext;
use crate::element::{Element, LayoutCx};
use crate::node::{HorizontalAlignment, NodeProperties, VerticalAlignment};
use crate::tree::{LayoutTree, NodeId};

// ─────────────────────────────────────────────────────────────────────────────
// Min / max
// ─────────────────────────────────────────────────────────────────────────────

/// Effective size limits of a node's border box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMax {
    pub min: Size,
    pub max: Size,
}

impl MinMax {
    pub fn new(props: &NodeProperties) -> Self {
        let (min_width, max_width) = Self::axis(
            props.width.value(),
            props.min_width.value(),
            props.max_width.value(),
        );
        let (min_height, max_height) = Self::axis(
            props.height.value(),
            props.min_height.value(),
            props.max_height.value(),
        );
        Self {
            min: Size::new(min_width, min_height),
            max: Size::new(max_width, max_height),
        }
    }

    /// Explicit value narrows max first, then min is derived from that max
    fn axis(explicit: Option<f32>, min_prop: f32, max_prop: f32) -> (f32, f32) {
        let explicit = explicit.filter(|v| !v.is_nan()).map(|v| v.max(0.0));
        let min_prop = if min_prop.is_finite() { min_prop.max(0.0) } else { 0.0 };
        let max_prop = if max_prop.is_nan() { f32::INFINITY } else { max_prop.max(0.0) };

        let max = explicit.unwrap_or(f32::INFINITY).min(max_prop).max(min_prop);
        let min = max.min(explicit.unwrap_or(0.0)).max(min_prop);
        (min, max)
    }

    /// Clamp per axis into `[min, max]`
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            self.min.width.max(size.width.min(self.max.width)),
            self.min.height.max(size.height.min(self.max.height)),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Passes
// ─────────────────────────────────────────────────────────────────────────────

impl LayoutTree {
    /// Run a layout pass if the root is layout-invalid; returns whether one ran
    pub fn update_layout(&mut self, ui: &UiContext<'_>) -> bool {
        self.sync_theme(ui.theme);
        let Some(root) = self.root else {
            return false;
        };
        if !self.nodes[root].state.layout_invalid {
            return false;
        }

        let viewport = self.viewport;
        let desired = self.measure_node(root, viewport, ui);
        self.arrange_node(root, viewport.to_rect(), ui);
        tracing::debug!(
            nodes = self.nodes.len(),
            viewport_w = viewport.width,
            viewport_h = viewport.height,
            desired_w = desired.width,
            desired_h = desired.height,
            "layout pass"
        );
        true
    }

    /// Measure `id` against the space offered by its parent.
    ///
    /// Returns the desired size including margin. Measuring a node that does
    /// not exist yields zero.
    pub fn measure_node(&mut self, id: NodeId, outside: Size, ui: &UiContext<'_>) -> Size {
        let Some(node) = self.nodes.get(id) else {
            return Size::ZERO;
        };
        if ui.config.measure_cache
            && !node.state.layout_invalid
            && node.layout.last_measure == Some(outside)
        {
            return node.layout.desired_size;
        }

        let margin = node.props.margin();
        let border = node.props.border_thickness.value().clamp_non_negative();
        let frame = node.props.frame();
        let mm = MinMax::new(&node.props);

        let available = mm.clamp(outside.shrink(&margin));
        let inside = available.shrink(&frame);
        let inside_offset = inside_origin(&border, &node.props.padding.value());

        let content = self.with_element(id, ui, inside_offset, |element, cx| {
            element.measure(cx, inside)
        });

        let unclipped = content
            .unwrap_or_default()
            .clamp_non_negative()
            .grow(&frame)
            .max(mm.min);
        let desired = unclipped.min(mm.max).grow(&margin);

        let layout = &mut self.nodes[id].layout;
        layout.unclipped_desired_size = unclipped;
        layout.desired_size = desired;
        layout.last_measure = Some(outside);

        tracing::trace!(
            ?id,
            outside_w = outside.width,
            outside_h = outside.height,
            desired_w = desired.width,
            desired_h = desired.height,
            "measure"
        );
        desired
    }

    /// Place `id` within `final_rect`, given in its parent's local space
    pub fn arrange_node(&mut self, id: NodeId, final_rect: Rect, ui: &UiContext<'_>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.state.layout_invalid && node.layout.last_arrange == Some(final_rect) {
            return;
        }

        let props = &node.props;
        let margin = props.margin();
        let border = props.border_thickness.value().clamp_non_negative();
        let padding = props.padding.value().clamp_non_negative();
        let frame = props.frame();
        let mm = MinMax::new(props);
        let h_align = props.horizontal_alignment.value();
        let v_align = props.vertical_alignment.value();
        let pixel_perfect = if props.pixel_perfect.is_set() {
            props.pixel_perfect.value()
        } else {
            ui.config.pixel_perfect
        };
        let unclipped = node.layout.unclipped_desired_size;
        let previous_render_size = node.layout.render_size;

        let client = final_rect.size.shrink(&margin);
        let mut needs_clip = false;

        let mut arrange_size = client;
        if arrange_size.width < unclipped.width {
            needs_clip = true;
            arrange_size.width = unclipped.width;
        }
        if arrange_size.height < unclipped.height {
            needs_clip = true;
            arrange_size.height = unclipped.height;
        }
        if h_align != HorizontalAlignment::Stretch {
            arrange_size.width = unclipped.width;
        }
        if v_align != VerticalAlignment::Stretch {
            arrange_size.height = unclipped.height;
        }

        let effective_max = unclipped.max(mm.max);
        if effective_max.width < arrange_size.width {
            needs_clip = true;
            arrange_size.width = effective_max.width;
        }
        if effective_max.height < arrange_size.height {
            needs_clip = true;
            arrange_size.height = effective_max.height;
        }

        let inner = arrange_size.shrink(&frame);
        let inside_offset = inside_origin(&border, &padding);
        let used = self
            .with_element(id, ui, inside_offset, |element, cx| element.arrange(cx, inner))
            .unwrap_or(inner);
        let render_size = used.clamp_non_negative().grow(&frame);

        let ink = render_size.min(mm.max);
        needs_clip |= ink.width < render_size.width || ink.height < render_size.height;
        needs_clip |= client.width < ink.width || client.height < ink.height;

        let offset = alignment_offset(client, ink, h_align, v_align);
        let mut border_rect = Rect::from_origin_size(
            Point::new(
                final_rect.x() + margin.left + offset.x,
                final_rect.y() + margin.top + offset.y,
            ),
            render_size,
        );
        if pixel_perfect {
            border_rect = border_rect.snap_to_pixels();
        }
        let padding_rect = border_rect.deflate(&border);

        let node = &mut self.nodes[id];
        let layout = &mut node.layout;
        layout.render_size = border_rect.size;
        layout.needs_clip_bounds = needs_clip;
        layout.rects.border = border_rect;
        layout.rects.margin = border_rect.inflate(&margin);
        layout.rects.padding = padding_rect;
        layout.rects.inside = padding_rect.deflate(&padding);
        layout.last_arrange = Some(final_rect);
        node.state.layout_invalid = false;
        node.state.visuals_invalid = true;

        let resized = node.layout.render_size != previous_render_size;
        if resized {
            let size = node.layout.render_size;
            if let Some(element) = node.element.as_mut() {
                element.on_resize(size);
            }
        }

        tracing::trace!(
            ?id,
            x = border_rect.x(),
            y = border_rect.y(),
            w = border_rect.width(),
            h = border_rect.height(),
            needs_clip,
            "arrange"
        );
    }

    /// Lend the node's element a [`LayoutCx`] over the rest of the tree
    fn with_element<R>(
        &mut self,
        id: NodeId,
        ui: &UiContext<'_>,
        inside_offset: Point,
        f: impl FnOnce(&mut Box<dyn Element>, &mut LayoutCx<'_>) -> R,
    ) -> Option<R> {
        let mut element = self.nodes.get_mut(id)?.element.take()?;
        let result = {
            let mut cx = LayoutCx {
                tree: self,
                ui,
                node: id,
                inside_offset,
            };
            f(&mut element, &mut cx)
        };
        if let Some(node) = self.nodes.get_mut(id) {
            node.element = Some(element);
        }
        Some(result)
    }
}

fn inside_origin(border: &Thickness, padding: &Thickness) -> Point {
    let padding = padding.clamp_non_negative();
    Point::new(border.left + padding.left, border.top + padding.top)
}

/// Offset of the ink inside the client area
///
/// `Stretch` behaves like `Left`/`Top` when the ink does not fit and like
/// `Center` otherwise.
fn alignment_offset(
    client: Size,
    ink: Size,
    h_align: HorizontalAlignment,
    v_align: VerticalAlignment,
) -> Point {
    let h_align = if h_align == HorizontalAlignment::Stretch && ink.width > client.width {
        HorizontalAlignment::Left
    } else {
        h_align
    };
    let v_align = if v_align == VerticalAlignment::Stretch && ink.height > client.height {
        VerticalAlignment::Top
    } else {
        v_align
    };

    let x = match h_align {
        HorizontalAlignment::Center | HorizontalAlignment::Stretch => {
            (client.width - ink.width) * 0.5
        }
        HorizontalAlignment::Right => client.width - ink.width,
        HorizontalAlignment::Left => 0.0,
    };
    let y = match v_align {
        VerticalAlignment::Center | VerticalAlignment::Stretch => {
            (client.height - ink.height) * 0.5
        }
        VerticalAlignment::Bottom => client.height - ink.height,
        VerticalAlignment::Top => 0.0,
    };
    Point::new(x, y)
}
