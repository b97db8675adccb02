//! HTML5 serialization of arena nodes.
//!
//! - Void elements never get end tags
//! - Text content is escaped, except inside raw text elements (script, style)
//! - Attribute values are escaped and double-quoted

use indextree::NodeId;
use std::fmt::Write;

use crate::document::{Document, ElementData, NodeKind};
use crate::markers::NodeMarker;

/// Options for HTML serialization.
#[derive(Clone, Debug)]
pub struct SerializeOptions {
    /// Whether to sort attributes alphabetically (default: false, which keeps
    /// insertion order).
    pub sort_attributes: bool,
    /// Skip nodes flagged [`NodeMarker::Owned`] (default: false)
    pub skip_owned: bool,
    /// Skip style marker nodes (default: false)
    pub skip_style_markers: bool,
    /// Attribute identifying a style marker node (default: `data-e-style`)
    pub style_marker: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            sort_attributes: false,
            skip_owned: false,
            skip_style_markers: false,
            style_marker: "data-e-style".to_string(),
        }
    }
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable sorting attributes alphabetically for deterministic output.
    pub fn sort_attributes(mut self) -> Self {
        self.sort_attributes = true;
        self
    }

    /// Leave out subtrees owned by nested components and style marker nodes,
    /// keeping only what reconciliation manages.
    pub fn managed_only(mut self) -> Self {
        self.skip_owned = true;
        self.skip_style_markers = true;
        self
    }

    pub fn with_style_marker(mut self, attr: impl Into<String>) -> Self {
        self.style_marker = attr.into();
        self
    }
}

impl Document {
    /// Serialize the children of `node` (innerHTML).
    pub fn to_html(&self, node: NodeId, opts: &SerializeOptions) -> String {
        let mut out = String::new();
        let mut ser = Serializer::new(self, &mut out, opts);
        ser.write_children(node);
        out
    }

    /// Serialize `node` itself (outerHTML).
    pub fn outer_html(&self, node: NodeId, opts: &SerializeOptions) -> String {
        let mut out = String::new();
        let mut ser = Serializer::new(self, &mut out, opts);
        ser.write_node(node);
        out
    }

    /// Whether `id` is a style marker node: flagged in the side table, or a
    /// `<style>` carrying the marker attribute.
    pub fn is_style_marker(&self, id: NodeId, marker_attr: &str) -> bool {
        if self.marker(id) == Some(NodeMarker::StyleMarker) {
            return true;
        }
        self.element(id)
            .is_some_and(|e| e.tag.as_ref() == "style" && e.attrs.contains_key(marker_attr))
    }
}

struct Serializer<'a, W: Write> {
    doc: &'a Document,
    out: &'a mut W,
    options: &'a SerializeOptions,
    in_raw_text: bool,
}

impl<'a, W: Write> Serializer<'a, W> {
    fn new(doc: &'a Document, out: &'a mut W, options: &'a SerializeOptions) -> Self {
        Self {
            doc,
            out,
            options,
            in_raw_text: false,
        }
    }

    fn skipped(&self, node: NodeId) -> bool {
        (self.options.skip_owned && self.doc.is_owned(node))
            || (self.options.skip_style_markers
                && self.doc.is_style_marker(node, &self.options.style_marker))
    }

    fn write_children(&mut self, node: NodeId) {
        let doc = self.doc;
        for child in doc.children(node) {
            self.write_node(child);
        }
    }

    fn write_node(&mut self, node: NodeId) {
        if self.skipped(node) {
            return;
        }
        let doc = self.doc;
        match &doc.get(node).kind {
            NodeKind::Document => self.write_children(node),
            NodeKind::Element(elem) => self.write_element(node, elem),
            NodeKind::Text(text) => self.write_text_escaped(text),
            NodeKind::Comment(text) => {
                let _ = write!(self.out, "<!--{}-->", text.as_ref());
            }
        }
    }

    fn write_element(&mut self, node: NodeId, elem: &ElementData) {
        let tag = elem.tag.as_ref();
        let _ = write!(self.out, "<{}", tag);

        if self.options.sort_attributes {
            let mut attrs: Vec<_> = elem.attrs.iter().collect();
            attrs.sort_by_key(|(k, _)| *k);
            for (name, value) in attrs {
                self.write_attr(name, value);
            }
        } else {
            for (name, value) in &elem.attrs {
                self.write_attr(name, value);
            }
        }
        let _ = write!(self.out, ">");

        if is_void_element(tag) {
            return;
        }

        let was_raw = self.in_raw_text;
        self.in_raw_text = is_raw_text_element(tag);
        self.write_children(node);
        self.in_raw_text = was_raw;

        let _ = write!(self.out, "</{}>", tag);
    }

    fn write_text_escaped(&mut self, text: &str) {
        if self.in_raw_text {
            let _ = write!(self.out, "{}", text);
            return;
        }
        for c in text.chars() {
            let _ = match c {
                '&' => write!(self.out, "&amp;"),
                '<' => write!(self.out, "&lt;"),
                '>' => write!(self.out, "&gt;"),
                '\u{a0}' => write!(self.out, "&nbsp;"),
                _ => write!(self.out, "{}", c),
            };
        }
    }

    fn write_attr(&mut self, name: &str, value: &str) {
        let _ = write!(self.out, " {}=\"", name);
        for c in value.chars() {
            let _ = match c {
                '&' => write!(self.out, "&amp;"),
                '"' => write!(self.out, "&quot;"),
                '\u{a0}' => write!(self.out, "&nbsp;"),
                _ => write!(self.out, "{}", c),
            };
        }
        let _ = write!(self.out, "\"");
    }
}

/// HTML5 void elements that never have closing tags
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose text children are written verbatim
fn is_raw_text_element(tag: &str) -> bool {
    matches!(
        tag,
        "style" | "script" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext"
    )
}
