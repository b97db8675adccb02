//! The child diff.
//!
//! Live children are walked with a two-pointer scan against the target
//! children. Matching nodes are patched in place. A mismatch at the start
//! pointer builds a key map over the remaining live children (once per
//! list), which lets keyed nodes be found and moved instead of recreated.
//! Target nodes without a live counterpart are moved out of the parsed
//! fragment into the live tree, so nothing is ever copied.
//!
//! Two kinds of live nodes are never touched by the diff:
//! - nodes flagged owned, which belong to a mounted nested component
//! - style marker nodes, which hold component-scoped styles

use rapidhash::RapidHashMap;
use smallvec::SmallVec;

use reheat_dom::{Document, DomError, NodeId, NodeKind, StrTendril};

use crate::attributes::update_attributes;
use crate::error::{AtNode, PatchError};
use crate::identity::{is_same_node, node_key};
use crate::options::ReconcileOptions;
use crate::stats::PatchStats;
use crate::tracing_macros::{debug, trace};

/// Map from identity key to the slot of the live child carrying it.
type KeyMap = RapidHashMap<String, usize>;

/// Reconcile the children of `old_parent` (live) against the children of
/// `new_parent` (target). Target children that end up in the live tree are
/// moved out of `new_parent`.
pub fn diff_children(
    doc: &mut Document,
    old_parent: NodeId,
    new_parent: NodeId,
    opts: &ReconcileOptions,
) -> Result<PatchStats, PatchError> {
    let mut patcher = Patcher::new(doc, opts);
    patcher.diff_children(old_parent, new_parent)?;
    Ok(patcher.stats)
}

/// Bring the live node `old` in line with the target node `new`.
pub fn patch_node(
    doc: &mut Document,
    old: NodeId,
    new: NodeId,
    opts: &ReconcileOptions,
) -> Result<PatchStats, PatchError> {
    let mut patcher = Patcher::new(doc, opts);
    patcher.patch_node(old, new)?;
    Ok(patcher.stats)
}

/// Remove `node` from `parent`, unless it is a style marker node. Returns
/// whether the node was removed.
pub fn remove_node(
    doc: &mut Document,
    parent: NodeId,
    node: NodeId,
    opts: &ReconcileOptions,
) -> Result<bool, PatchError> {
    Patcher::new(doc, opts).remove_node(parent, node)
}

/// State of a single reconciliation pass.
pub(crate) struct Patcher<'a> {
    pub(crate) doc: &'a mut Document,
    opts: &'a ReconcileOptions,
    pub(crate) stats: PatchStats,
}

/// What `patch_node` has to do, decided before any mutation.
enum Plan {
    Replace,
    Element,
    Text(Option<StrTendril>),
    Keep,
}

impl<'a> Patcher<'a> {
    pub(crate) fn new(doc: &'a mut Document, opts: &'a ReconcileOptions) -> Self {
        Self {
            doc,
            opts,
            stats: PatchStats::default(),
        }
    }

    fn is_preserved(&self, node: NodeId) -> bool {
        self.doc.is_style_marker(node, &self.opts.style_marker)
    }

    fn same(&self, old: NodeId, new: NodeId) -> bool {
        is_same_node(self.doc, Some(old), Some(new), self.opts)
    }

    pub(crate) fn diff_children(
        &mut self,
        old_parent: NodeId,
        new_parent: NodeId,
    ) -> Result<(), PatchError> {
        self.doc.try_get(old_parent).at(old_parent)?;

        // Snapshots: the live list changes as nodes move, the target list
        // shrinks as nodes are adopted. Moved live slots become holes.
        let mut old_children: SmallVec<[Option<NodeId>; 16]> =
            self.doc.children(old_parent).map(Some).collect();
        let new_children: SmallVec<[NodeId; 16]> = self.doc.children(new_parent).collect();

        // Half-open windows [start, end)
        let old_end = old_children.len();
        let new_end = new_children.len();
        let mut old_start = 0;
        let mut new_start = 0;
        let mut key_map: Option<KeyMap> = None;

        trace!(
            ?old_parent,
            old = old_end,
            new = new_end,
            "diffing children"
        );

        while old_start < old_end && new_start < new_end {
            let Some(old) = old_children[old_start] else {
                old_start += 1;
                continue;
            };
            if self.is_preserved(old) {
                self.stats.preserved += 1;
                old_start += 1;
                continue;
            }

            let new = new_children[new_start];
            if self.same(old, new) {
                self.patch_node(old, new)?;
                old_start += 1;
                new_start += 1;
                continue;
            }

            if key_map.is_none() {
                self.stats.key_maps_built += 1;
                key_map = Some(self.build_key_map(&old_children, old_start, old_end));
            }

            // Slots at or before the start pointer were consumed already
            let slot = key_map
                .as_ref()
                .zip(node_key(self.doc, new, self.opts))
                .and_then(|(map, key)| map.get(key).copied())
                .filter(|&slot| slot > old_start);
            let moved = slot.and_then(|slot| old_children[slot].map(|node| (slot, node)));

            match moved {
                Some((slot, moved)) if self.same(moved, new) => {
                    trace!(?moved, from = slot, to = old_start, "moving keyed node");
                    self.patch_node(moved, new)?;
                    self.doc.insert_before(old, moved).at(moved)?;
                    old_children[slot] = None;
                    self.stats.moved += 1;
                }
                _ => {
                    self.doc.insert_before(old, new).at(new)?;
                    self.stats.inserted += 1;
                }
            }
            new_start += 1;
        }

        if old_start >= old_end {
            let reference = old_children.get(old_start).copied().flatten();
            for &new in &new_children[new_start..new_end] {
                self.doc
                    .insert_child(old_parent, new, reference)
                    .at(new)?;
                self.stats.inserted += 1;
            }
        } else if new_start >= new_end {
            for slot in old_start..old_end {
                if let Some(old) = old_children[slot] {
                    self.remove_node(old_parent, old)?;
                }
            }
        }

        Ok(())
    }

    /// Key map over the live slots `[start, end)`. Holes and unkeyed nodes
    /// are left out; the first of duplicate keys wins.
    fn build_key_map(&self, old_children: &[Option<NodeId>], start: usize, end: usize) -> KeyMap {
        let mut map = KeyMap::default();
        for (slot, node) in old_children.iter().enumerate().take(end).skip(start) {
            let Some(node) = node else { continue };
            if let Some(key) = node_key(self.doc, *node, self.opts) {
                map.entry(key.to_owned()).or_insert(slot);
            }
        }
        map
    }

    pub(crate) fn patch_node(&mut self, old: NodeId, new: NodeId) -> Result<(), PatchError> {
        if self.doc.is_owned(old) {
            trace!(?old, "skipping owned subtree");
            self.stats.skipped_owned += 1;
            return Ok(());
        }

        let plan = {
            let old_data = self.doc.try_get(old).at(old)?;
            let new_data = self.doc.try_get(new).at(new)?;
            match (&old_data.kind, &new_data.kind) {
                (NodeKind::Element(a), NodeKind::Element(b)) if a.tag == b.tag => Plan::Element,
                (NodeKind::Element(_), _) | (_, NodeKind::Element(_)) => Plan::Replace,
                (a, b) if !a.same_type(b) => Plan::Replace,
                (NodeKind::Text(a), NodeKind::Text(b))
                | (NodeKind::Comment(a), NodeKind::Comment(b)) => {
                    Plan::Text((a != b).then(|| b.clone()))
                }
                _ => Plan::Keep,
            }
        };

        match plan {
            Plan::Replace => {
                trace!(?old, ?new, "replacing node");
                self.doc.replace(old, new).at(old)?;
                self.stats.replaced += 1;
            }
            Plan::Element => {
                update_attributes(self.doc, old, new, self.opts, &mut self.stats).at(old)?;
                self.diff_children(old, new)?;
                self.stats.patched += 1;
            }
            Plan::Text(update) => {
                if let Some(text) = update {
                    self.doc.set_text(old, &text).at(old)?;
                    self.stats.texts_updated += 1;
                }
                self.stats.patched += 1;
            }
            Plan::Keep => self.stats.patched += 1,
        }
        Ok(())
    }

    pub(crate) fn remove_node(&mut self, parent: NodeId, node: NodeId) -> Result<bool, PatchError> {
        if self.is_preserved(node) {
            trace!(?node, "keeping style marker node");
            self.stats.preserved += 1;
            return Ok(false);
        }
        if self.doc.parent(node) != Some(parent) {
            return Err(DomError::NotAChild { node, parent }).at(node);
        }
        if self.doc.is_owned(node) {
            debug!(?node, "removing owned subtree");
        }
        self.doc.remove(node);
        self.stats.removed += 1;
        Ok(true)
    }
}
