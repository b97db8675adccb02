//! In-place keyed DOM reconciliation.
//!
//! reheat patches a live [`Document`] subtree so that it matches freshly
//! rendered markup while touching as little of the tree as it can:
//! - **Identity**: live nodes are reused when their `key` attribute (or,
//!   without a key, their node kind and tag) matches a target node, so a node
//!   keeps its identity and any state attached to it across renders
//! - **Keyed moves**: reordered keyed children are moved, not recreated
//! - **Attribute sync**: attributes are set and removed with their reflected
//!   properties (`checked`, `value`, ARIA properties, `dataset`) kept in step
//! - **Boundaries**: subtrees owned by a mounted nested component and
//!   component style nodes are never touched
//!
//! # Example
//!
//! ```rust
//! use reheat::{ReconcileOptions, Reconciler};
//! use reheat_dom::{parse, SerializeOptions};
//!
//! let mut doc = parse(r#"<html><body><ul><li key="a">A</li><li key="b">B</li></ul></body></html>"#);
//! let body = doc.body().unwrap();
//! let ul = doc.children(body).next().unwrap();
//! let a = doc.children(ul).next().unwrap();
//!
//! let reconciler = Reconciler::new(ReconcileOptions::default());
//! let stats = reconciler
//!     .patch_dom(&mut doc, ul, r#"<li key="b">B</li><li key="a">A!</li>"#)
//!     .unwrap();
//!
//! assert_eq!(
//!     doc.to_html(ul, &SerializeOptions::default()),
//!     r#"<li key="b">B</li><li key="a">A!</li>"#
//! );
//! assert_eq!(doc.children(ul).nth(1), Some(a));
//! assert_eq!(stats.moved, 1);
//! ```

mod tracing_macros;

mod attributes;
mod error;
mod identity;
mod options;
mod patch;
mod reconciler;
mod stats;

pub use attributes::update_attributes;
pub use error::{InvalidArgument, PatchError, ReconcileError};
pub use identity::{is_same_node, node_key};
pub use options::ReconcileOptions;
pub use patch::{diff_children, patch_node, remove_node};
pub use reconciler::{Reconciler, patch_dom};
pub use stats::PatchStats;

pub use reheat_dom::{Document, NodeId};
