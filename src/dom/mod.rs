//! Retained SVG document model.
//!
//! A small, d3-flavoured element tree: nodes are shared handles, selections
//! are ordered lists of nodes with chaining mutators, and transitions are
//! recorded on the node for the host to play back later.

mod geometry;
mod serialize;
mod transition;

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub use transition::{ScheduledTransition, Staged, Transition};

use crate::types::{BBox, DataPoint};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Tag of character-data nodes; they hold text and never have children.
const TEXT_TAG: &str = "#text";

// ============================================================================
// Nodes
// ============================================================================

#[derive(Default)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Node>,
    parent: Weak<RefCell<NodeData>>,
    datum: Option<Rc<DataPoint>>,
    transitions: Vec<ScheduledTransition>,
}

/// Shared handle to one element of the document.
///
/// Cloning the handle does not clone the element; use [`Node::deep_clone`]
/// for that.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Node")
            .field("tag", &data.tag)
            .field("attrs", &data.attrs)
            .field("styles", &data.styles)
            .field("children", &data.children.len())
            .finish()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn upsert(entries: &mut Vec<(String, String)>, name: &str, value: String) {
    match entries.iter_mut().find(|(k, _)| k == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name.to_string(), value)),
    }
}

impl Node {
    /// Create a detached element.
    pub fn new(tag: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            tag: tag.into(),
            ..Default::default()
        })))
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        let data = self.0.borrow();
        data.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    /// Attribute parsed as a number; `None` when absent or not numeric.
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.0.borrow().attrs.iter().any(|(k, _)| k == name)
    }

    /// Set an attribute, keeping its original position when it already exists.
    ///
    /// A `style` attribute is split into inline style declarations.
    pub fn set_attr(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == "style" {
            for decl in value.split(';') {
                if let Some((k, v)) = decl.split_once(':') {
                    self.set_style(k.trim(), v.trim());
                }
            }
            return;
        }
        upsert(&mut self.0.borrow_mut().attrs, name, value);
    }

    pub fn attrs(&self) -> Vec<(String, String)> {
        self.0.borrow().attrs.clone()
    }

    pub fn style(&self, name: &str) -> Option<String> {
        let data = self.0.borrow();
        data.styles.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    pub fn set_style(&self, name: &str, value: impl Into<String>) {
        upsert(&mut self.0.borrow_mut().styles, name, value.into());
    }

    /// Character data node
    pub fn text_node(text: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            tag: TEXT_TAG.to_string(),
            text: Some(text.into()),
            ..Default::default()
        })))
    }

    pub fn is_text(&self) -> bool {
        self.0.borrow().tag == TEXT_TAG
    }

    /// Text content of this node and its descendants, in document order.
    pub fn text(&self) -> Option<String> {
        if self.is_text() {
            return self.0.borrow().text.clone();
        }
        let parts: Vec<String> = self.children().iter().filter_map(Node::text).collect();
        if parts.is_empty() { None } else { Some(parts.concat()) }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&self, text: impl Into<String>) {
        if self.is_text() {
            self.0.borrow_mut().text = Some(text.into());
            return;
        }
        for child in self.children() {
            child.0.borrow_mut().parent = Weak::new();
        }
        self.0.borrow_mut().children.clear();
        self.append_text(text);
    }

    /// Append character data after the existing children.
    pub fn append_text(&self, text: impl Into<String>) -> Node {
        let node = Node::text_node(text);
        self.append_child(&node);
        node
    }

    pub fn id(&self) -> Option<String> {
        self.attr("id")
    }

    pub fn datum(&self) -> Option<Rc<DataPoint>> {
        self.0.borrow().datum.clone()
    }

    pub fn set_datum(&self, datum: DataPoint) {
        self.0.borrow_mut().datum = Some(Rc::new(datum));
    }

    fn set_shared_datum(&self, datum: Option<Rc<DataPoint>>) {
        self.0.borrow_mut().datum = datum;
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    /// Topmost ancestor (the node itself when detached).
    pub fn root(&self) -> Node {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Append a new child element. The child inherits this node's datum.
    pub fn append(&self, tag: &str) -> Node {
        let child = Node::new(tag);
        child.set_shared_datum(self.datum());
        self.append_child(&child);
        child
    }

    /// Attach an existing node as the last child, detaching it from any
    /// previous parent.
    pub fn append_child(&self, child: &Node) {
        if let Some(old) = child.parent() {
            old.0.borrow_mut().children.retain(|c| c != child);
        }
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Depth-first search of this node and its descendants by `id`.
    pub fn find_by_id(&self, id: &str) -> Option<Node> {
        if self.id().as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children().iter().find_map(|c| c.find_by_id(id))
    }

    /// Descendants (not including this node) with the given tag, in document order.
    pub fn descendants_by_tag(&self, tag: &str) -> Vec<Node> {
        let mut out = Vec::new();
        for child in self.children() {
            if child.tag() == tag {
                out.push(child.clone());
            }
            out.extend(child.descendants_by_tag(tag));
        }
        out
    }

    /// Detached copy of this element and its subtree.
    ///
    /// Data bindings are shared; scheduled transitions are not copied.
    pub fn deep_clone(&self) -> Node {
        let data = self.0.borrow();
        let copy = Node(Rc::new(RefCell::new(NodeData {
            tag: data.tag.clone(),
            attrs: data.attrs.clone(),
            styles: data.styles.clone(),
            text: data.text.clone(),
            datum: data.datum.clone(),
            ..Default::default()
        })));
        for child in &data.children {
            copy.append_child(&child.deep_clone());
        }
        copy
    }

    /// Transitions scheduled on this node and not yet played.
    pub fn transitions(&self) -> Vec<ScheduledTransition> {
        self.0.borrow().transitions.clone()
    }

    fn transitions_mut(&self) -> std::cell::RefMut<'_, Vec<ScheduledTransition>> {
        std::cell::RefMut::map(self.0.borrow_mut(), |d| &mut d.transitions)
    }

    /// Play every scheduled transition in this subtree to its end state.
    pub fn settle(&self) {
        let pending = std::mem::take(&mut *self.transitions_mut());
        for t in pending {
            for (k, v) in t.attrs {
                self.set_attr(&k, v);
            }
            for (k, v) in t.styles {
                self.set_style(&k, v);
            }
        }
        for child in self.children() {
            child.settle();
        }
    }

    /// Rendered bounding box in the node's own user space.
    pub fn bbox(&self) -> BBox {
        geometry::bbox(self)
    }

    /// Serialize this subtree to SVG text.
    pub fn to_svg(&self) -> String {
        serialize::to_svg(self)
    }

    fn data(&self) -> Ref<'_, NodeData> {
        self.0.borrow()
    }
}

// ============================================================================
// Selections
// ============================================================================

/// An ordered group of nodes mutated together.
///
/// Value functions receive each node's bound datum; nodes without a datum
/// are skipped by the `*_with` mutators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    nodes: Vec<Node>,
}

impl From<Node> for Selection {
    fn from(node: Node) -> Self {
        Selection { nodes: vec![node] }
    }
}

impl From<Vec<Node>> for Selection {
    fn from(nodes: Vec<Node>) -> Self {
        Selection { nodes }
    }
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// First node of the selection
    pub fn node(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Value of an attribute on the first node
    pub fn get_attr(&self, name: &str) -> Option<String> {
        self.node().and_then(|n| n.attr(name))
    }

    pub fn attr(self, name: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        for node in &self.nodes {
            node.set_attr(name, value.clone());
        }
        self
    }

    pub fn attr_with<V: fmt::Display>(self, name: &str, f: impl Fn(&DataPoint) -> V) -> Self {
        for node in &self.nodes {
            if let Some(d) = node.datum() {
                node.set_attr(name, f(&d).to_string());
            }
        }
        self
    }

    pub fn style(self, name: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        for node in &self.nodes {
            node.set_style(name, value.clone());
        }
        self
    }

    pub fn style_with<V: fmt::Display>(self, name: &str, f: impl Fn(&DataPoint) -> V) -> Self {
        for node in &self.nodes {
            if let Some(d) = node.datum() {
                node.set_style(name, f(&d).to_string());
            }
        }
        self
    }

    /// Append a child element to every node; the result selects the new children.
    pub fn append(&self, tag: &str) -> Selection {
        Selection {
            nodes: self.nodes.iter().map(|n| n.append(tag)).collect(),
        }
    }

    /// Children of every node with the given tag.
    pub fn select_all(&self, tag: &str) -> Selection {
        Selection {
            nodes: self
                .nodes
                .iter()
                .flat_map(|n| n.children())
                .filter(|c| c.tag() == tag)
                .collect(),
        }
    }

    /// Schedule a named transition on every node.
    pub fn transition(self, name: &str) -> Transition {
        Transition::schedule(self.nodes, name)
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Root `<svg>` element with its shared `<defs>` pool.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
    defs: Node,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node::new("svg");
        root.set_attr("xmlns", SVG_NS);
        root.set_attr("xmlns:xlink", XLINK_NS);
        let defs = root.append("defs");
        Document { root, defs }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn defs(&self) -> &Node {
        &self.defs
    }

    pub fn settle(&self) {
        self.root.settle();
    }

    pub fn to_svg(&self) -> String {
        self.root.to_svg()
    }
}
