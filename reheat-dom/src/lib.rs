//! Arena-backed HTML DOM for in-place reconciliation.
//!
//! reheat-dom provides:
//! - **Arena DOM**: every node of a document lives in one `indextree` arena, so
//!   nodes can be moved between a detached parse target and the live tree
//!   without copying
//! - **Parsing**: browser-compatible HTML5 parsing via html5ever, including
//!   fragment parsing with a context element (innerHTML semantics)
//! - **Reflected properties**: a small model of DOM properties (`checked`,
//!   `value`, ARIA properties, `dataset`) that can drift from attributes
//! - **Markers**: a side table flagging nodes owned by nested components or
//!   holding component-scoped styles
//! - **Serialization**: HTML5 serialization with proper escaping
//!
//! # Example
//!
//! ```rust
//! use reheat_dom::{parse, SerializeOptions};
//!
//! let mut doc = parse("<html><body><ul><li>one</li></ul></body></html>");
//! let body = doc.body().expect("parser always creates a body");
//! let fragment = doc.parse_fragment(body, "<p>two</p>").unwrap();
//! assert_eq!(doc.to_html(fragment, &SerializeOptions::default()), "<p>two</p>");
//! ```

mod tracing_macros;

mod document;
mod error;
mod markers;
mod parser;
mod properties;
mod serialize;

pub use document::{Document, ElementData, Namespace, NodeData, NodeKind};
pub use error::DomError;
pub use markers::NodeMarker;
pub use parser::parse;
pub use properties::{
    PropKind, PropValue, camel_case, dataset_key, reflected_attribute, reflected_property,
};
pub use serialize::SerializeOptions;

pub use indextree::NodeId;
pub use tendril::StrTendril;
