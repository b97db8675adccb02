use facet::Facet;

/// What a reconciliation pass did to the live tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
pub struct PatchStats {
    /// Nodes matched and patched in place
    pub patched: usize,
    /// Target nodes moved into the live tree as new nodes
    pub inserted: usize,
    /// Keyed live nodes moved to a new position
    pub moved: usize,
    /// Live nodes replaced because kind or tag changed
    pub replaced: usize,
    /// Live nodes removed
    pub removed: usize,
    /// Style marker nodes kept despite being absent from the target
    pub preserved: usize,
    /// Owned subtrees left alone
    pub skipped_owned: usize,
    pub attributes_set: usize,
    pub attributes_removed: usize,
    /// Property and dataset writes mirroring attribute writes
    pub properties_set: usize,
    pub texts_updated: usize,
    /// Key maps built after a start-pointer mismatch
    pub key_maps_built: usize,
    /// The deep-equality shortcut skipped the pass
    pub fast_path: bool,
}

impl PatchStats {
    /// Number of observable mutations.
    pub fn mutations(&self) -> usize {
        self.inserted
            + self.moved
            + self.replaced
            + self.removed
            + self.attributes_set
            + self.attributes_removed
            + self.properties_set
            + self.texts_updated
    }

    pub fn is_noop(&self) -> bool {
        self.mutations() == 0
    }
}
