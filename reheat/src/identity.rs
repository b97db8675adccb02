//! Node identity: when can a live node be patched into a target node
//! instead of being replaced?

use reheat_dom::{Document, NodeId, NodeKind};

use crate::options::ReconcileOptions;

/// The identity key of `node`, if it is an element carrying the key
/// attribute. An empty value is still a key.
pub fn node_key<'d>(doc: &'d Document, node: NodeId, opts: &ReconcileOptions) -> Option<&'d str> {
    doc.element(node)?.attr(&opts.key_attribute)
}

/// Whether `old` and `new` denote the same logical node.
///
/// Two keyed nodes match when their keys and tags are equal. Otherwise they
/// match when they have the same kind and, for elements, the same tag. A key
/// on only one side never matches. Absent or freed nodes never match.
pub fn is_same_node(
    doc: &Document,
    old: Option<NodeId>,
    new: Option<NodeId>,
    opts: &ReconcileOptions,
) -> bool {
    let (Some(old), Some(new)) = (old, new) else {
        return false;
    };
    let (Ok(old_data), Ok(new_data)) = (doc.try_get(old), doc.try_get(new)) else {
        return false;
    };

    match (&old_data.kind, &new_data.kind) {
        (NodeKind::Element(a), NodeKind::Element(b)) => {
            let key = &opts.key_attribute;
            match (a.attr(key), b.attr(key)) {
                (Some(x), Some(y)) => x == y && a.tag == b.tag,
                (None, None) => a.tag == b.tag,
                _ => false,
            }
        }
        (a, b) => a.same_type(b),
    }
}
