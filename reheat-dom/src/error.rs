use indextree::{NodeError, NodeId};

/// Errors raised by tree operations on a [`Document`](crate::Document).
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} has been removed from the arena")]
    Removed(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} is not a text node")]
    NotAText(NodeId),

    #[error("node {0:?} has no parent")]
    Detached(NodeId),

    #[error("node {node:?} is not a child of {parent:?}")]
    NotAChild { node: NodeId, parent: NodeId },

    #[error("invalid tree operation: {0}")]
    Tree(#[from] NodeError),
}
