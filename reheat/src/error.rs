use reheat_dom::{DomError, NodeId};

/// Errors surfaced by [`patch_dom`](crate::patch_dom).
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Rejected before any mutation happened.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// The traversal failed part way. The live tree may be partially
    /// patched; the next render should start over from a consistent state.
    #[error("patching container {container:?} failed")]
    PatchFailure {
        container: NodeId,
        #[source]
        source: PatchError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidArgument {
    #[error("container {0:?} is not a live node")]
    StaleContainer(NodeId),

    #[error("container {node:?} is a {kind} node, not an element")]
    NotAnElement { node: NodeId, kind: &'static str },
}

/// A tree operation that failed while patching `node`.
#[derive(Debug, thiserror::Error)]
#[error("while patching node {node:?}: {source}")]
pub struct PatchError {
    pub node: NodeId,
    #[source]
    pub source: DomError,
}

pub(crate) trait AtNode<T> {
    fn at(self, node: NodeId) -> Result<T, PatchError>;
}

impl<T> AtNode<T> for Result<T, DomError> {
    fn at(self, node: NodeId) -> Result<T, PatchError> {
        self.map_err(|source| PatchError { node, source })
    }
}
