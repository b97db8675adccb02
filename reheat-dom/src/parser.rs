//! HTML5 parsing into the arena via html5ever's `TreeSink`.
//!
//! Full documents go through [`parse`]. Re-renders go through
//! [`Document::parse_fragment`], which parses markup the way assigning to
//! `innerHTML` would: with the live container as context element, into the
//! document's own arena, so parsed nodes can later be moved into the live
//! tree.

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, LocalName, QualName, parse_document, parse_fragment};
use indexmap::IndexMap;
use indextree::{Arena, NodeId};
use std::borrow::Cow;
use std::cell::RefCell;
use std::mem;
use tendril::StrTendril;

use crate::document::{Document, ElementData, Namespace, NodeData, NodeKind};
use crate::error::DomError;
use crate::tracing_macros::{debug, trace};

/// Parse HTML into an arena-based [`Document`].
pub fn parse(html: &str) -> Document {
    let sink = ArenaSink::new(Arena::new());
    let tendril = StrTendril::from(html);
    let parsed = parse_document(sink, Default::default()).one(tendril);

    // Find the root element (usually <html>)
    let root = parsed
        .document
        .children(&parsed.arena)
        .next()
        .unwrap_or(parsed.document);

    Document::from_parts(parsed.arena, root, parsed.doctype)
}

impl Document {
    /// Parse `markup` as the children of an element shaped like `context`,
    /// into this document's scratch container. The previous contents of the
    /// scratch container are freed first.
    ///
    /// Returns the scratch container. It has no parent; its children are the
    /// parsed nodes.
    pub fn parse_fragment(&mut self, context: NodeId, markup: &str) -> Result<NodeId, DomError> {
        let context_name = match &self.try_get(context)?.kind {
            NodeKind::Element(elem) => {
                let ns = self.get(context).ns;
                QualName::new(
                    None,
                    html5ever::Namespace::from(ns.url()),
                    LocalName::from(elem.tag.as_ref()),
                )
            }
            _ => return Err(DomError::NotAnElement(context)),
        };

        let scratch = self.scratch_container();
        self.clear_children(scratch);

        let sink = ArenaSink::new(mem::take(&mut self.arena));
        let tendril = StrTendril::from(markup);
        let parsed =
            parse_fragment(sink, Default::default(), context_name, Vec::new(), false).one(tendril);
        self.arena = parsed.arena;

        // The tree builder wraps fragment content in an <html> element under
        // the document node; move that content under the scratch container.
        if let Some(html) = parsed.document.children(&self.arena).next() {
            let nodes: Vec<NodeId> = html.children(&self.arena).collect();
            for node in nodes {
                self.append(scratch, node)?;
            }
        }
        parsed.document.remove_subtree(&mut self.arena);

        // The context element and anything the tree builder dropped were
        // never attached; free them so the arena does not grow per pass.
        for orphan in parsed.created {
            if self.contains(orphan) && self.parent(orphan).is_none() {
                orphan.remove_subtree(&mut self.arena);
            }
        }

        debug!(
            children = scratch.children(&self.arena).count(),
            "parsed fragment into scratch container"
        );
        Ok(scratch)
    }
}

/// What the sink hands back once html5ever is done.
struct Parsed {
    arena: Arena<NodeData>,
    document: NodeId,
    doctype: Option<StrTendril>,
    created: Vec<NodeId>,
}

/// Owned element name wrapper
#[derive(Debug, Clone)]
struct OwnedElemName(QualName);

impl ElemName for OwnedElemName {
    fn ns(&self) -> &html5ever::Namespace {
        &self.0.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.0.local
    }
}

/// TreeSink implementation building nodes straight into an arena
struct ArenaSink {
    /// Wrapped in RefCell for interior mutability (TreeSink methods take &self)
    arena: RefCell<Arena<NodeData>>,

    /// Document node (parent of `<html>`)
    document: NodeId,

    /// DOCTYPE encountered during parse
    doctype: RefCell<Option<StrTendril>>,

    /// Elements and comments created during the parse
    created: RefCell<Vec<NodeId>>,
}

impl ArenaSink {
    fn new(mut arena: Arena<NodeData>) -> Self {
        let document = arena.new_node(NodeData {
            kind: NodeKind::Document,
            ns: Namespace::Html,
        });

        ArenaSink {
            arena: RefCell::new(arena),
            document,
            doctype: RefCell::new(None),
            created: RefCell::new(Vec::new()),
        }
    }

    fn new_node(&self, data: NodeData) -> NodeId {
        let id = self.arena.borrow_mut().new_node(data);
        self.created.borrow_mut().push(id);
        id
    }

    fn new_text(arena: &mut Arena<NodeData>, text: StrTendril) -> NodeId {
        arena.new_node(NodeData {
            kind: NodeKind::Text(text),
            ns: Namespace::Html,
        })
    }
}

impl TreeSink for ArenaSink {
    type Handle = NodeId;
    type Output = Parsed;
    type ElemName<'a>
        = OwnedElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        Parsed {
            arena: self.arena.into_inner(),
            document: self.document,
            doctype: self.doctype.into_inner(),
            created: self.created.into_inner(),
        }
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // html5ever recovers on its own, same as a browser would
        trace!("parse error: {}", _msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn same_node(&self, a: &Self::Handle, b: &Self::Handle) -> bool {
        a == b
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> OwnedElemName {
        let arena = self.arena.borrow();
        let node = arena[*target].get();

        let local = match &node.kind {
            NodeKind::Element(elem) => LocalName::from(elem.tag.as_ref()),
            _ => LocalName::from(""),
        };
        OwnedElemName(QualName::new(
            None,
            html5ever::Namespace::from(node.ns.url()),
            local,
        ))
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let tag = StrTendril::from(name.local.as_ref());
        let ns = Namespace::from_url(name.ns.as_ref());

        // First occurrence wins, like in browsers
        let mut attr_map: IndexMap<String, StrTendril> = IndexMap::with_capacity(attrs.len());
        for attr in attrs {
            attr_map
                .entry(attr.name.local.to_string())
                .or_insert(attr.value);
        }

        self.new_node(NodeData {
            kind: NodeKind::Element(ElementData::new(tag, attr_map)),
            ns,
        })
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        self.new_node(NodeData {
            kind: NodeKind::Comment(text),
            ns: Namespace::Html,
        })
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        // Processing instructions - create empty comment
        self.new_node(NodeData {
            kind: NodeKind::Comment(StrTendril::new()),
            ns: Namespace::Html,
        })
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => {
                parent.append(node, &mut arena);
            }
            NodeOrText::AppendText(text) => {
                // Merge with a preceding text node like the browser parser
                let last_child = parent.children(&arena).next_back();
                if let Some(last_child) = last_child
                    && let NodeKind::Text(existing) = &mut arena[last_child].get_mut().kind
                {
                    existing.push_tendril(&text);
                    return;
                }

                let text_node = Self::new_text(&mut arena, text);
                parent.append(text_node, &mut arena);
            }
        }
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => {
                sibling.insert_before(node, &mut arena);
            }
            NodeOrText::AppendText(text) => {
                let prev = arena[*sibling].previous_sibling();
                if let Some(prev) = prev
                    && let NodeKind::Text(existing) = &mut arena[prev].get_mut().kind
                {
                    existing.push_tendril(&text);
                    return;
                }

                let text_node = Self::new_text(&mut arena, text);
                sibling.insert_before(text_node, &mut arena);
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.arena.borrow()[*element].parent().is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        *self.doctype.borrow_mut() = Some(name);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template content is kept inline under the <template> element
        *target
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut arena = self.arena.borrow_mut();
        if let NodeKind::Element(elem) = &mut arena[*target].get_mut().kind {
            for attr in attrs {
                elem.attrs
                    .entry(attr.name.local.to_string())
                    .or_insert(attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        target.detach(&mut self.arena.borrow_mut());
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut arena = self.arena.borrow_mut();
        let children: Vec<NodeId> = node.children(&arena).collect();
        for child in children {
            child.detach(&mut arena);
            new_parent.append(child, &mut arena);
        }
    }
}
