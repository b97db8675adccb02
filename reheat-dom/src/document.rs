//! Arena-based DOM.
//!
//! All nodes of a document, including the detached trees produced by fragment
//! parsing, live in one `indextree` arena. A node parsed into the scratch
//! container can therefore be moved into the live tree without copying it.

use indexmap::IndexMap;
use indextree::{Arena, Node, NodeId};
use rapidhash::RapidHashMap;
use std::mem;
use tendril::StrTendril;

use crate::error::DomError;
use crate::markers::NodeMarker;
use crate::properties::{self, PropValue};
use crate::tracing_macros::trace;

/// A document: one arena holding the live tree and any detached trees.
#[derive(Debug, Clone)]
pub struct Document {
    /// THE tree - all nodes live here
    pub arena: Arena<NodeData>,

    /// Root node (usually `<html>` element)
    pub root: NodeId,

    /// DOCTYPE if present (usually "html")
    pub doctype: Option<StrTendril>,

    /// Reusable detached container receiving parsed fragments
    scratch: Option<NodeId>,

    /// Side table of host-owned node flags
    markers: RapidHashMap<NodeId, NodeMarker>,
}

/// What goes in each arena slot
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub ns: Namespace,
}

/// Node types
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Document or fragment root (invisible)
    Document,
    /// Element with tag, attributes and reflected properties
    Element(ElementData),
    /// Text content (StrTendril is refcounted - cheap to clone)
    Text(StrTendril),
    /// HTML comment
    Comment(StrTendril),
}

impl NodeKind {
    /// Whether both kinds are the same variant (element, text, ...), ignoring content.
    pub fn same_type(&self, other: &NodeKind) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "#document",
            NodeKind::Element(_) => "element",
            NodeKind::Text(_) => "#text",
            NodeKind::Comment(_) => "#comment",
        }
    }
}

/// Element data (tag + attributes + property state)
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase local name
    pub tag: StrTendril,

    /// Attributes - IndexMap preserves insertion order for consistent serialization
    pub attrs: IndexMap<String, StrTendril>,

    /// Reflected DOM properties, keyed by camelCased property name
    pub props: IndexMap<String, PropValue>,

    /// The `dataset` view: camelCased `data-*` names
    pub dataset: IndexMap<String, String>,
}

impl ElementData {
    /// Create an element, seeding properties and dataset from `attrs`.
    pub fn new(tag: StrTendril, attrs: IndexMap<String, StrTendril>) -> Self {
        let props = properties::seed_properties(&tag, &attrs);
        let dataset = attrs
            .iter()
            .filter_map(|(name, value)| {
                properties::dataset_key(name).map(|key| (key, value.as_ref().to_owned()))
            })
            .collect();
        ElementData {
            tag,
            attrs,
            props,
            dataset,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|v| v.as_ref())
    }
}

/// XML namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

impl Namespace {
    pub fn from_url(url: &str) -> Self {
        match url {
            "http://www.w3.org/1999/xhtml" => Namespace::Html,
            "http://www.w3.org/2000/svg" => Namespace::Svg,
            "http://www.w3.org/1998/Math/MathML" => Namespace::MathMl,
            _ => Namespace::Html, // default
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with a bare `<html>` root.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData {
            kind: NodeKind::Element(ElementData::new(
                StrTendril::from("html"),
                IndexMap::new(),
            )),
            ns: Namespace::Html,
        });
        Self::from_parts(arena, root, None)
    }

    pub(crate) fn from_parts(
        arena: Arena<NodeData>,
        root: NodeId,
        doctype: Option<StrTendril>,
    ) -> Self {
        Document {
            arena,
            root,
            doctype,
            scratch: None,
            markers: RapidHashMap::default(),
        }
    }

    /// Get immutable reference to node data
    pub fn get(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    /// Get mutable reference to node data
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.arena[id].get_mut()
    }

    /// Node data, or an error if the id is stale.
    pub fn try_get(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.node(id).map(|node| node.get()).ok_or(DomError::Removed(id))
    }

    /// The arena node behind `id`, unless it was freed (possibly with its
    /// slot reused since).
    fn node(&self, id: NodeId) -> Option<&Node<NodeData>> {
        let node = self.arena.get(id)?;
        (!id.is_removed(&self.arena)).then_some(node)
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        if self.node(id).is_none() {
            return Err(DomError::Removed(id));
        }
        Ok(self.arena[id].get_mut())
    }

    /// Whether `id` still refers to a node in this arena.
    pub fn contains(&self, id: NodeId) -> bool {
        self.try_get(id).is_ok()
    }

    /// Iterate children of a node
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent()
    }

    /// Get the `<body>` element if present
    pub fn body(&self) -> Option<NodeId> {
        self.child_element(self.root, "body")
    }

    /// Get the `<head>` element if present
    pub fn head(&self) -> Option<NodeId> {
        self.child_element(self.root, "head")
    }

    fn child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&id| self.tag(id).is_some_and(|t| t == tag))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.get().kind {
            NodeKind::Element(elem) => Some(elem),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Element(elem) => Ok(elem),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_ref())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Text of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.get().kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => Some(t.as_ref()),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        id.descendants(&self.arena)
            .filter_map(|n| match &self.get(n).kind {
                NodeKind::Text(t) => Some(t.as_ref()),
                _ => None,
            })
            .collect()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), StrTendril::from(*v)))
            .collect();
        self.arena.new_node(NodeData {
            kind: NodeKind::Element(ElementData::new(StrTendril::from(tag), attrs)),
            ns: Namespace::Html,
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(NodeData {
            kind: NodeKind::Text(StrTendril::from(text)),
            ns: Namespace::Html,
        })
    }

    /// Set an attribute. The dataset view follows `data-*` attributes;
    /// other properties are left alone.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let elem = self.element_mut(id)?;
        elem.attrs
            .insert(name.to_owned(), StrTendril::from(value));
        if let Some(key) = properties::dataset_key(name) {
            elem.dataset.insert(key, value.to_owned());
        }
        Ok(())
    }

    /// Remove an attribute, returning whether it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        let elem = self.element_mut(id)?;
        let removed = elem.attrs.shift_remove(name).is_some();
        if let Some(key) = properties::dataset_key(name) {
            elem.dataset.shift_remove(&key);
        }
        Ok(removed)
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&PropValue> {
        self.element(id)?.props.get(name)
    }

    /// Set a property without touching attributes, like a script or a user
    /// interaction would.
    pub fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<PropValue>,
    ) -> Result<(), DomError> {
        self.element_mut(id)?
            .props
            .insert(name.to_owned(), value.into());
        Ok(())
    }

    /// Drop a property, returning whether it was set.
    pub fn remove_property(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.element_mut(id)?.props.shift_remove(name).is_some())
    }

    pub fn dataset(&self, id: NodeId, key: &str) -> Option<&str> {
        self.element(id)?.dataset.get(key).map(String::as_str)
    }

    pub fn set_dataset(&mut self, id: NodeId, key: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?
            .dataset
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    /// Overwrite the content of a text or comment node in place.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => {
                *t = StrTendril::from(text);
                Ok(())
            }
            _ => Err(DomError::NotAText(id)),
        }
    }

    /// Append `child` to `parent`, detaching it from wherever it was.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        parent.checked_append(child, &mut self.arena)?;
        Ok(())
    }

    /// Insert `node` right before `sibling`, detaching it from wherever it was.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) -> Result<(), DomError> {
        if self.parent(sibling).is_none() {
            return Err(DomError::Detached(sibling));
        }
        sibling.checked_insert_before(node, &mut self.arena)?;
        Ok(())
    }

    /// Insert `node` into `parent` before `reference`, or at the end when
    /// there is no reference node.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        match reference {
            Some(sibling) => self.insert_before(sibling, node),
            None => self.append(parent, node),
        }
    }

    /// Put `new` where `old` is, then free `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        self.insert_before(old, new)?;
        self.remove(old);
        Ok(())
    }

    /// Detach and free a node with its whole subtree, dropping any markers
    /// attached to the freed nodes.
    pub fn remove(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        if !self.markers.is_empty() {
            for node in id.descendants(&self.arena) {
                self.markers.remove(&node);
            }
        }
        trace!(?id, "removing subtree");
        id.remove_subtree(&mut self.arena);
    }

    /// Free every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children: Vec<_> = self.children(id).collect();
        for child in children {
            self.remove(child);
        }
    }

    /// The reusable detached container that fragment parsing fills. Created
    /// on first use, then shared by every later pass.
    pub fn scratch_container(&mut self) -> NodeId {
        match self.scratch {
            Some(id) if self.contains(id) => id,
            _ => {
                let id = self.arena.new_node(NodeData {
                    kind: NodeKind::Document,
                    ns: Namespace::Html,
                });
                self.scratch = Some(id);
                id
            }
        }
    }

    pub fn marker(&self, id: NodeId) -> Option<NodeMarker> {
        self.markers.get(&id).copied()
    }

    /// Flag `id` as the root of a mounted nested component.
    pub fn mark_owned(&mut self, id: NodeId) {
        self.markers.insert(id, NodeMarker::Owned);
    }

    /// Flag `id` as a component style node.
    pub fn mark_style(&mut self, id: NodeId) {
        self.markers.insert(id, NodeMarker::StyleMarker);
    }

    /// Drop the marker of `id` (component unmount).
    pub fn clear_marker(&mut self, id: NodeId) -> Option<NodeMarker> {
        self.markers.remove(&id)
    }

    pub fn is_owned(&self, id: NodeId) -> bool {
        self.marker(id) == Some(NodeMarker::Owned)
    }

    /// Deep structural comparison of two nodes' children: kinds, tags,
    /// attributes and text must all match.
    pub fn children_equal(&self, a: NodeId, b: NodeId) -> bool {
        let mut left = self.children(a);
        let mut right = self.children(b);
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if self.nodes_equal(x, y) => {}
                _ => return false,
            }
        }
    }

    fn nodes_equal(&self, a: NodeId, b: NodeId) -> bool {
        let same_shallow = match (&self.get(a).kind, &self.get(b).kind) {
            (NodeKind::Element(x), NodeKind::Element(y)) => {
                x.tag == y.tag
                    && x.attrs.len() == y.attrs.len()
                    && x.attrs
                        .iter()
                        .all(|(k, v)| y.attrs.get(k).is_some_and(|w| w == v))
            }
            (NodeKind::Text(x), NodeKind::Text(y))
            | (NodeKind::Comment(x), NodeKind::Comment(y)) => x == y,
            (NodeKind::Document, NodeKind::Document) => true,
            _ => false,
        };
        same_shallow && self.children_equal(a, b)
    }

    /// Number of nodes currently allocated in the arena, removed slots excluded.
    pub fn node_count(&self) -> usize {
        self.arena.iter().filter(|n| !n.is_removed()).count()
    }
}
