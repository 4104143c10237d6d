//! Layout tree management
//!
//! Nodes live in a [`SlotMap`] arena. Parents own their children (a node
//! has at most one parent and removing a node drops its subtree); the
//! parent link is a plain id used for invalidation.
//!
//! Every property write goes through a typed setter which forwards the
//! slot's [`Invalidation`] category to the dirty-state machine:
//!
//! - `SelfLayout` marks the node layout-invalid
//! - `ParentLayout` additionally marks its parent
//! - `Visuals` marks only the node's cached visuals
//!
//! Layout invalidity is propagated to every ancestor, so the root always
//! knows whether a layout pass is needed.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use weft_core::{Color, CornerRadius, Rect, Size, Thickness};
use weft_theme::ThemeContext;

use crate::attached::{AttachedKey, AttachedType};
use crate::element::Element;
use crate::error::{LayoutError, Result};
use crate::node::{
    HorizontalAlignment, LayoutRects, Node, NodeProperties, NodeState, VerticalAlignment,
    Visibility,
};
use crate::property::Invalidation;

new_key_type! {
    pub struct NodeId;
}

/// Ordered child ids
pub type ChildList = SmallVec<[NodeId; 8]>;

/// Arena of layout nodes with a designated root
pub struct LayoutTree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) root: Option<NodeId>,
    pub(crate) viewport: Size,
    /// Theme version the tree was last synced against; 0 forces a sync
    pub(crate) theme_version: u64,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            viewport: Size::ZERO,
            theme_version: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structure
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a detached node
    pub fn insert(&mut self, element: impl Element) -> NodeId {
        self.insert_boxed(Box::new(element))
    }

    pub fn insert_boxed(&mut self, element: Box<dyn Element>) -> NodeId {
        self.nodes.insert(Node::new(element))
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` (clamped) among the children of `parent`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.node(parent)?;
        if let Some(existing) = self.node(child)?.parent {
            return Err(LayoutError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LayoutError::WouldCycle { parent, child });
        }

        let siblings = &mut self.nodes[parent].children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.nodes[child].parent = Some(parent);
        self.invalidate(parent, Invalidation::SelfLayout);
        // The subtree may have been laid out elsewhere; its layout is stale
        self.invalidate(child, Invalidation::SelfLayout);
        Ok(())
    }

    /// Unlink `child` from its parent; the subtree stays alive
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        self.nodes[parent].children.retain(|c| *c != child);
        self.nodes[child].parent = None;
        self.invalidate(parent, Invalidation::SelfLayout);
        Ok(())
    }

    /// Detach and drop `id` with its whole subtree
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)?;
        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children.iter().copied());
                removed += 1;
            }
        }
        if self.root.is_some_and(|root| !self.nodes.contains_key(root)) {
            self.root = None;
        }
        tracing::trace!(?id, removed, "subtree removed");
        Ok(())
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        self.root = Some(id);
        self.invalidate(id, Invalidation::SelfLayout);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Size the root is measured and arranged against
    pub fn set_viewport(&mut self, size: Size) {
        let size = size.clamp_non_negative();
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        if let Some(root) = self.root {
            self.invalidate(root, Invalidation::SelfLayout);
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(LayoutError::NodeNotFound(id))
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invalidation
    // ─────────────────────────────────────────────────────────────────────────

    /// Route a fired category through the dirty-state machine
    pub fn invalidate(&mut self, id: NodeId, invalidation: Invalidation) {
        match invalidation {
            Invalidation::None => {}
            Invalidation::Visuals => {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.state.visuals_invalid = true;
                }
            }
            Invalidation::SelfLayout => self.invalidate_layout(id),
            Invalidation::ParentLayout => {
                self.invalidate_layout(id);
                if let Some(parent) = self.parent(id) {
                    self.invalidate_layout(parent);
                }
            }
        }
    }

    /// Fire `invalidation` on `id` and every descendant
    pub fn invalidate_subtree(&mut self, id: NodeId, invalidation: Invalidation) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            self.invalidate(next, invalidation);
            pending.extend(self.children(next).iter().copied());
        }
    }

    /// Mark `id` and every ancestor layout-invalid
    fn invalidate_layout(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(next) = current {
            let Some(node) = self.nodes.get_mut(next) else {
                break;
            };
            node.state.layout_invalid = true;
            node.state.visuals_invalid = true;
            current = node.parent;
        }
    }

    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.nodes.get(id).map(|n| n.state)
    }

    /// Re-resolve theme-bound slots when the theme version moved
    pub fn sync_theme(&mut self, theme: &ThemeContext) {
        if self.theme_version == theme.version() {
            return;
        }
        let ids: Vec<NodeId> = self.nodes.keys().collect();
        let mut fired_nodes = 0usize;
        for id in ids {
            let node = &mut self.nodes[id];
            let mut fired = node.props.resolve_theme(theme);
            if let Some(element) = node.element.as_mut() {
                crate::property::fire(&mut fired, element.resolve_theme(theme));
            }
            if let Some(invalidation) = fired {
                fired_nodes += 1;
                self.invalidate(id, invalidation);
            }
        }
        self.theme_version = theme.version();
        tracing::debug!(
            version = theme.version(),
            theme = %theme.theme().name(),
            fired_nodes,
            "theme synced"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────────

    pub fn properties(&self, id: NodeId) -> Option<&NodeProperties> {
        self.nodes.get(id).map(|n| &n.props)
    }

    /// Edit slots directly (clear, bind to theme tokens, ...).
    ///
    /// The closure returns the category to fire. Theme bindings made here
    /// are resolved on the next sync.
    pub fn update_properties(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut NodeProperties) -> Option<Invalidation>,
    ) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))?;
        if let Some(invalidation) = f(&mut node.props) {
            self.invalidate(id, invalidation);
        }
        self.theme_version = 0;
        Ok(())
    }

    pub fn attached<T: AttachedType>(&self, id: NodeId, key: AttachedKey) -> Option<T> {
        self.nodes.get(id).and_then(|n| n.attached.get(key))
    }

    /// Set an attached property; an equal value is a no-op
    pub fn set_attached<T: AttachedType>(
        &mut self,
        id: NodeId,
        key: AttachedKey,
        value: T,
    ) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))?;
        if let Some(invalidation) = node.attached.set(key, value.into_value()) {
            self.invalidate(id, invalidation);
        }
        Ok(())
    }

    pub fn clear_attached(&mut self, id: NodeId, key: AttachedKey) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))?;
        if let Some(invalidation) = node.attached.remove(key) {
            self.invalidate(id, invalidation);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Elements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn element<E: Element>(&self, id: NodeId) -> Option<&E> {
        self.nodes
            .get(id)
            .and_then(|n| n.element.as_deref())
            .and_then(|e| e.as_any().downcast_ref::<E>())
    }

    /// Mutate a node's element; the closure returns the category to fire
    pub fn update_element<E: Element, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut E) -> (R, Option<Invalidation>),
    ) -> Result<R> {
        let node = self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))?;
        let element = node
            .element
            .as_deref_mut()
            .and_then(|e| e.as_any_mut().downcast_mut::<E>())
            .ok_or(LayoutError::ElementType {
                node: id,
                expected: std::any::type_name::<E>(),
            })?;
        let (result, fired) = f(element);
        if let Some(invalidation) = fired {
            self.invalidate(id, invalidation);
        }
        self.theme_version = 0;
        Ok(result)
    }

    /// Shorthand for element setters that only report a category
    pub fn set_element<E: Element>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut E) -> Option<Invalidation>,
    ) -> Result<()> {
        self.update_element(id, |e: &mut E| ((), f(e)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layout results
    // ─────────────────────────────────────────────────────────────────────────

    /// Rects from the last arrange, in the parent's local space
    pub fn rects(&self, id: NodeId) -> Option<LayoutRects> {
        self.nodes.get(id).map(|n| n.layout.rects)
    }

    /// Last measured size, including margin
    pub fn desired_size(&self, id: NodeId) -> Option<Size> {
        self.nodes.get(id).map(|n| n.layout.desired_size)
    }

    /// Last measured size before max clamping, excluding margin
    pub fn unclipped_desired_size(&self, id: NodeId) -> Option<Size> {
        self.nodes.get(id).map(|n| n.layout.unclipped_desired_size)
    }

    pub fn render_size(&self, id: NodeId) -> Option<Size> {
        self.nodes.get(id).map(|n| n.layout.render_size)
    }

    pub fn needs_clip_bounds(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(id).map(|n| n.layout.needs_clip_bounds)
    }

    /// Border rect in root space, summing ancestor origins
    pub fn global_border_rect(&self, id: NodeId) -> Option<Rect> {
        let mut rect = self.nodes.get(id)?.layout.rects.border;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            let origin = self.nodes[parent].layout.rects.border.origin;
            rect = rect.offset(origin.x, origin.y);
            current = self.parent(parent);
        }
        Some(rect)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed setters
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! node_properties {
    ($($(#[$meta:meta])* $field:ident / $setter:ident: $ty:ty;)*) => {
        impl LayoutTree {
            $(
                $(#[$meta])*
                pub fn $setter(&mut self, id: NodeId, value: $ty) -> Result<()> {
                    let node = self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))?;
                    if let Some(invalidation) = node.props.$field.set(value) {
                        tracing::trace!(?id, property = stringify!($field), ?invalidation, "property set");
                        self.invalidate(id, invalidation);
                    }
                    Ok(())
                }
            )*
        }
    };
}

node_properties! {
    /// Position used by canvas-style parents
    x / set_x: f32;
    y / set_y: f32;
    /// Explicit width; `None` sizes to content
    width / set_width: Option<f32>;
    height / set_height: Option<f32>;
    min_width / set_min_width: f32;
    min_height / set_min_height: f32;
    max_width / set_max_width: f32;
    max_height / set_max_height: f32;
    margin / set_margin: Thickness;
    border_thickness / set_border_thickness: Thickness;
    padding / set_padding: Thickness;
    horizontal_alignment / set_horizontal_alignment: HorizontalAlignment;
    vertical_alignment / set_vertical_alignment: VerticalAlignment;
    visibility / set_visibility: Visibility;
    background / set_background: Color;
    border_brush / set_border_brush: Color;
    corner_radius / set_corner_radius: CornerRadius;
    /// Clip children and content to the border rect
    clip_to_bounds / set_clip_to_bounds: bool;
    /// Snap this node's rects to whole pixels
    pixel_perfect / set_pixel_perfect: bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Panel;
    use crate::stack::StackPanel;

    fn clean(tree: &mut LayoutTree) {
        for node in tree.nodes.values_mut() {
            node.state = NodeState {
                layout_invalid: false,
                visuals_invalid: false,
            };
        }
    }

    #[test]
    fn test_append_rejects_second_parent_and_cycles() {
        let mut tree = LayoutTree::new();
        let a = tree.insert(Panel);
        let b = tree.insert(Panel);
        let c = tree.insert(Panel);
        tree.append_child(a, b).unwrap();
        tree.append_child(b, c).unwrap();

        assert_eq!(
            tree.append_child(c, b),
            Err(LayoutError::AlreadyParented { child: b, parent: a })
        );
        assert_eq!(
            tree.append_child(c, a),
            Err(LayoutError::WouldCycle { parent: c, child: a })
        );
        assert_eq!(
            tree.append_child(a, a),
            Err(LayoutError::WouldCycle { parent: a, child: a })
        );
    }

    #[test]
    fn test_insert_child_order_and_detach() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(Panel);
        let a = tree.insert(Panel);
        let b = tree.insert(Panel);
        let c = tree.insert(Panel);
        tree.append_child(root, a).unwrap();
        tree.append_child(root, c).unwrap();
        tree.insert_child(root, 1, b).unwrap();
        assert_eq!(tree.children(root), &[a, b, c]);

        tree.detach(b).unwrap();
        assert_eq!(tree.children(root), &[a, c]);
        assert_eq!(tree.parent(b), None);
        assert!(tree.contains(b));
        // Detached node can be re-attached
        tree.insert_child(root, 99, b).unwrap();
        assert_eq!(tree.children(root), &[a, c, b]);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(Panel);
        let branch = tree.insert(Panel);
        let leaf = tree.insert(Panel);
        tree.append_child(root, branch).unwrap();
        tree.append_child(branch, leaf).unwrap();
        tree.set_root(root).unwrap();

        tree.remove(branch).unwrap();
        assert!(!tree.contains(branch));
        assert!(!tree.contains(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.set_width(leaf, Some(1.0)), Err(LayoutError::NodeNotFound(leaf)));

        tree.remove(root).unwrap();
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn test_invalidation_categories() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(Panel);
        let parent = tree.insert(Panel);
        let child = tree.insert(Panel);
        let sibling = tree.insert(Panel);
        tree.append_child(root, parent).unwrap();
        tree.append_child(parent, child).unwrap();
        tree.append_child(parent, sibling).unwrap();

        clean(&mut tree);
        tree.set_background(child, Color::RED).unwrap();
        assert_eq!(
            tree.state(child),
            Some(NodeState {
                layout_invalid: false,
                visuals_invalid: true
            })
        );
        assert!(tree.state(parent).unwrap().is_clean());

        clean(&mut tree);
        tree.set_width(child, Some(10.0)).unwrap();
        assert!(tree.state(child).unwrap().layout_invalid);
        // Layout invalidity reaches the root
        assert!(tree.state(parent).unwrap().layout_invalid);
        assert!(tree.state(root).unwrap().layout_invalid);
        assert!(tree.state(sibling).unwrap().is_clean());

        clean(&mut tree);
        tree.set_margin(child, Thickness::uniform(2.0)).unwrap();
        assert!(tree.state(child).unwrap().layout_invalid);
        assert!(tree.state(parent).unwrap().layout_invalid);

        // Equal value on an already-set slot fires nothing
        clean(&mut tree);
        tree.set_margin(child, Thickness::uniform(2.0)).unwrap();
        assert!(tree.state(child).unwrap().is_clean());
        assert!(tree.state(root).unwrap().is_clean());
    }

    #[test]
    fn test_attached_fires_key_category() {
        const SLOT: AttachedKey = AttachedKey::new("Test.Slot", Invalidation::ParentLayout);
        let mut tree = LayoutTree::new();
        let parent = tree.insert(Panel);
        let child = tree.insert(Panel);
        tree.append_child(parent, child).unwrap();

        clean(&mut tree);
        tree.set_attached(child, SLOT, 3i64).unwrap();
        assert!(tree.state(parent).unwrap().layout_invalid);
        assert_eq!(tree.attached::<i64>(child, SLOT), Some(3));

        clean(&mut tree);
        tree.set_attached(child, SLOT, 3i64).unwrap();
        assert!(tree.state(parent).unwrap().is_clean());
    }

    #[test]
    fn test_update_element_checks_type() {
        let mut tree = LayoutTree::new();
        let panel = tree.insert(Panel);
        let stack = tree.insert(StackPanel::vertical());

        clean(&mut tree);
        tree.set_element(stack, |s: &mut StackPanel| s.set_spacing(4.0))
            .unwrap();
        assert!(tree.state(stack).unwrap().layout_invalid);
        assert_eq!(tree.element::<StackPanel>(stack).unwrap().spacing(), 4.0);

        assert!(matches!(
            tree.set_element(panel, |s: &mut StackPanel| s.set_spacing(1.0)),
            Err(LayoutError::ElementType { .. })
        ));
    }

    #[test]
    fn test_viewport_invalidates_root() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(Panel);
        tree.set_root(root).unwrap();
        clean(&mut tree);
        tree.set_viewport(Size::new(100.0, 100.0));
        assert!(tree.state(root).unwrap().layout_invalid);
        clean(&mut tree);
        tree.set_viewport(Size::new(100.0, 100.0));
        assert!(tree.state(root).unwrap().is_clean());
    }

    #[test]
    fn test_invalidate_subtree_reaches_descendants() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(Panel);
        let child = tree.insert(Panel);
        let grandchild = tree.insert(Panel);
        tree.append_child(root, child).unwrap();
        tree.append_child(child, grandchild).unwrap();

        clean(&mut tree);
        tree.invalidate_subtree(root, Invalidation::SelfLayout);
        assert!(tree.state(child).unwrap().layout_invalid);
        assert!(tree.state(grandchild).unwrap().layout_invalid);

        clean(&mut tree);
        tree.invalidate_subtree(child, Invalidation::Visuals);
        assert!(tree.state(grandchild).unwrap().visuals_invalid);
        assert!(tree.state(root).unwrap().is_clean());
    }
}
