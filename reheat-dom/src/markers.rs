//! Out-of-band node flags.
//!
//! Hosts flag nodes in a side table keyed by [`NodeId`](indextree::NodeId)
//! instead of attaching properties to node objects. Absence from the table
//! means "no marker".

use facet::Facet;

/// A flag attached to a node by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum NodeMarker {
    /// Root of a mounted nested component instance. Its subtree belongs to
    /// that instance and must not be touched by the parent's reconciliation.
    Owned,
    /// A `<style>` node injected by the styling step. It survives removal
    /// passes.
    StyleMarker,
}
