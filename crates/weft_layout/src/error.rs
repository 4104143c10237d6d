//! Layout tree error types

use thiserror::Error;

use crate::tree::NodeId;

/// Structural errors from tree manipulation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The id does not refer to a live node
    #[error("Node {0:?} not found")]
    NodeNotFound(NodeId),

    /// Nodes are owned by exactly one parent
    #[error("Node {child:?} already has parent {parent:?}")]
    AlreadyParented { child: NodeId, parent: NodeId },

    /// The child is the parent or one of its ancestors
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },

    /// The node's element is not of the requested type
    #[error("Node {node:?} does not hold a {expected}")]
    ElementType {
        node: NodeId,
        expected: &'static str,
    },
}

/// Result type for layout tree operations
pub type Result<T> = std::result::Result<T, LayoutError>;
