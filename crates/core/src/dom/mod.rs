//! Live DOM tree.
//!
//! Nodes are reference-counted handles with interior mutability, so a
//! handle held by a caller keeps observing the tree as it changes. HTML is
//! parsed with html5ever into an rcdom and then converted into this tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever::QualName;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::css::declaration::{hyphenate, StyleDeclaration};
use crate::css::selector::{self, SelectorList};
use crate::error::DomError;
use crate::event::Listener;

mod class_list;
mod serialize;

pub use class_list::ClassList;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Document,
    Fragment,
    ShadowRoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

pub(crate) struct NodeInner {
    node_type: NodeType,
    /// Local name for elements, lowercase for HTML elements.
    tag: String,
    html: bool,
    attributes: RefCell<Vec<Attribute>>,
    /// Character data of text and comment nodes.
    data: RefCell<String>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    shadow_root: RefCell<Option<Node>>,
    host: RefCell<Weak<NodeInner>>,
    pub(crate) listeners: RefCell<Vec<Listener>>,
}

/// A handle to a node in a live tree. Cloning is cheap; equality is identity.
#[derive(Clone)]
pub struct Node(pub(crate) Rc<NodeInner>);

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Node");
        out.field("name", &self.node_name());
        if let Some(id) = self.get_attribute("id") {
            out.field("id", &id);
        }
        if matches!(self.0.node_type, NodeType::Text | NodeType::Comment) {
            out.field("data", &*self.0.data.borrow());
        }
        out.finish()
    }
}

impl Node {
    fn with_type(node_type: NodeType, tag: &str, html: bool) -> Self {
        Node(Rc::new(NodeInner {
            node_type,
            tag: tag.to_string(),
            html,
            attributes: RefCell::new(Vec::new()),
            data: RefCell::new(String::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            shadow_root: RefCell::new(None),
            host: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    /// Create an HTML element. The tag name is lowercased.
    pub fn new_element(tag: &str) -> Self {
        Self::with_type(NodeType::Element, &tag.to_ascii_lowercase(), true)
    }

    fn new_foreign_element(tag: &str) -> Self {
        Self::with_type(NodeType::Element, tag, false)
    }

    pub fn new_text(text: &str) -> Self {
        let node = Self::with_type(NodeType::Text, "", false);
        node.0.data.borrow_mut().push_str(text);
        node
    }

    pub fn new_comment(text: &str) -> Self {
        let node = Self::with_type(NodeType::Comment, "", false);
        node.0.data.borrow_mut().push_str(text);
        node
    }

    pub fn new_document() -> Self {
        Self::with_type(NodeType::Document, "", false)
    }

    pub fn new_fragment() -> Self {
        Self::with_type(NodeType::Fragment, "", false)
    }

    pub fn node_type(&self) -> NodeType {
        self.0.node_type
    }

    pub fn is_element(&self) -> bool {
        self.0.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.0.node_type == NodeType::Text
    }

    pub fn is_shadow_root(&self) -> bool {
        self.0.node_type == NodeType::ShadowRoot
    }

    /// `nodeName`: the upper-cased tag for HTML elements, `#text` etc. otherwise.
    pub fn node_name(&self) -> String {
        match self.0.node_type {
            NodeType::Element => self.tag_name().unwrap_or_default(),
            NodeType::Text => "#text".to_string(),
            NodeType::Comment => "#comment".to_string(),
            NodeType::Document => "#document".to_string(),
            NodeType::Fragment | NodeType::ShadowRoot => "#document-fragment".to_string(),
        }
    }

    pub fn tag_name(&self) -> Option<String> {
        if !self.is_element() {
            return None;
        }
        if self.0.html {
            Some(self.0.tag.to_ascii_uppercase())
        } else {
            Some(self.0.tag.clone())
        }
    }

    /// Lowercase local name for HTML elements; empty for other node kinds.
    pub fn local_name(&self) -> &str {
        &self.0.tag
    }

    // Attributes

    fn attribute_key(&self, name: &str) -> String {
        if self.0.html {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let key = self.attribute_key(name);
        self.0
            .attributes
            .borrow()
            .iter()
            .find(|a| a.name == key)
            .map(|a| a.value.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        let key = self.attribute_key(name);
        self.0.attributes.borrow().iter().any(|a| a.name == key)
    }

    /// Set an attribute. Non-element nodes ignore the call.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if !self.is_element() {
            return;
        }
        let key = self.attribute_key(name);
        let mut attributes = self.0.attributes.borrow_mut();
        match attributes.iter_mut().find(|a| a.name == key) {
            Some(attr) => attr.value = value.to_string(),
            None => attributes.push(Attribute {
                name: key,
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        let key = self.attribute_key(name);
        self.0.attributes.borrow_mut().retain(|a| a.name != key);
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.0.attributes.borrow().clone()
    }

    pub fn id(&self) -> String {
        self.get_attribute("id").unwrap_or_default()
    }

    pub fn set_id(&self, id: &str) {
        self.set_attribute("id", id);
    }

    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    pub fn set_class_name(&self, value: &str) {
        self.set_attribute("class", value);
    }

    pub fn class_list(&self) -> ClassList<'_> {
        ClassList::new(self)
    }

    // Inline style

    /// Snapshot of the parsed `style` attribute.
    pub fn style(&self) -> StyleDeclaration {
        StyleDeclaration::parse(&self.get_attribute("style").unwrap_or_default())
    }

    fn write_style(&self, style: &StyleDeclaration) {
        self.set_attribute("style", &style.to_css_text());
    }

    /// `style.getPropertyValue`; accepts camelCase or hyphenated names.
    pub fn style_property(&self, name: &str) -> String {
        self.style().get(&hyphenate(name)).unwrap_or_default()
    }

    /// `style[name] = value`. An empty value clears the property.
    pub fn set_style_property(&self, name: &str, value: &str) {
        if !self.is_element() {
            return;
        }
        let mut style = self.style();
        style.set(&hyphenate(name), value);
        self.write_style(&style);
    }

    /// `style.removeProperty`; expects a hyphenated name and returns the old value.
    pub fn remove_style_property(&self, name: &str) -> String {
        if !self.is_element() {
            return String::new();
        }
        let mut style = self.style();
        let old = style.remove(name).unwrap_or_default();
        self.write_style(&style);
        old
    }

    /// `style.cssText = css`.
    pub fn set_css_text(&self, css: &str) {
        if !self.is_element() {
            return;
        }
        self.write_style(&StyleDeclaration::parse(css));
    }

    // Tree

    pub fn parent_node(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    /// Element children only.
    pub fn children(&self) -> Vec<Node> {
        self.0
            .children
            .borrow()
            .iter()
            .filter(|c| c.is_element())
            .cloned()
            .collect()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.children.borrow().first().cloned()
    }

    pub fn last_child(&self) -> Option<Node> {
        self.0.children.borrow().last().cloned()
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.0.children.borrow().is_empty()
    }

    fn index_in_parent(&self) -> Option<(Node, usize)> {
        let parent = self.parent_node()?;
        let index = parent.0.children.borrow().iter().position(|c| c == self)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let (parent, index) = self.index_in_parent()?;
        let next = parent.0.children.borrow().get(index + 1).cloned();
        next
    }

    pub fn previous_sibling(&self) -> Option<Node> {
        let (parent, index) = self.index_in_parent()?;
        let previous = index
            .checked_sub(1)
            .and_then(|i| parent.0.children.borrow().get(i).cloned());
        previous
    }

    /// Inclusive descendant check.
    pub fn contains(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if &node == self {
                return true;
            }
            current = node.parent_node();
        }
        false
    }

    /// Topmost ancestor, without crossing shadow roots.
    pub fn root(&self) -> Node {
        let mut node = self.clone();
        while let Some(parent) = node.parent_node() {
            node = parent;
        }
        node
    }

    /// Like `root`, but continues from a shadow root to its host.
    pub fn shadow_including_root(&self) -> Node {
        let mut root = self.root();
        while let Some(host) = root.host() {
            root = host.root();
        }
        root
    }

    /// Remove this node from its parent, if any.
    pub fn detach(&self) {
        if let Some((parent, index)) = self.index_in_parent() {
            parent.0.children.borrow_mut().remove(index);
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    pub fn append_child(&self, child: &Node) -> Result<Node, DomError> {
        self.insert_before(child, None)
    }

    /// Insert `child` before `reference`, or at the end when `reference` is
    /// `None`. Fragments are emptied into the parent in order.
    pub fn insert_before(&self, child: &Node, reference: Option<&Node>) -> Result<Node, DomError> {
        match self.0.node_type {
            NodeType::Element | NodeType::Document | NodeType::Fragment | NodeType::ShadowRoot => {}
            _ => return Err(DomError::HierarchyRequest),
        }
        if matches!(child.0.node_type, NodeType::Document | NodeType::ShadowRoot)
            || child.contains(self)
        {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(reference) = reference {
            if reference.parent_node().as_ref() != Some(self) {
                return Err(DomError::NotFound);
            }
        }

        let reference = match reference {
            Some(r) if r == child => child.next_sibling(),
            other => other.cloned(),
        };

        let nodes: Vec<Node> = if child.0.node_type == NodeType::Fragment {
            child.0.children.borrow_mut().drain(..).collect()
        } else {
            child.detach();
            vec![child.clone()]
        };

        for node in &nodes {
            *node.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }

        let mut children = self.0.children.borrow_mut();
        let index = reference
            .and_then(|r| children.iter().position(|c| *c == r))
            .unwrap_or(children.len());
        children.splice(index..index, nodes);

        Ok(child.clone())
    }

    pub fn remove_child(&self, child: &Node) -> Result<Node, DomError> {
        if child.parent_node().as_ref() != Some(self) {
            return Err(DomError::NotFound);
        }
        child.detach();
        Ok(child.clone())
    }

    fn clear_children(&self) {
        let children: Vec<Node> = self.0.children.borrow_mut().drain(..).collect();
        for child in children {
            *child.0.parent.borrow_mut() = Weak::new();
        }
    }

    /// Concatenated character data of all descendant text nodes.
    pub fn text_content(&self) -> String {
        match self.0.node_type {
            NodeType::Text | NodeType::Comment => self.0.data.borrow().clone(),
            _ => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
        }
    }

    fn collect_text(&self, out: &mut String) {
        for child in self.0.children.borrow().iter() {
            match child.0.node_type {
                NodeType::Text => out.push_str(&child.0.data.borrow()),
                NodeType::Element | NodeType::Fragment => child.collect_text(out),
                _ => {}
            }
        }
    }

    /// Replace all children with a single text node (none for empty text).
    pub fn set_text_content(&self, text: &str) {
        match self.0.node_type {
            NodeType::Text | NodeType::Comment => {
                *self.0.data.borrow_mut() = text.to_string();
            }
            _ => {
                self.clear_children();
                if !text.is_empty() {
                    let node = Node::new_text(text);
                    *node.0.parent.borrow_mut() = Rc::downgrade(&self.0);
                    self.0.children.borrow_mut().push(node);
                }
            }
        }
    }

    /// All descendants in tree order, not descending into shadow trees.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Node>) {
        for child in self.0.children.borrow().iter() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    // Shadow DOM

    /// Attach an open shadow root to this element.
    pub fn attach_shadow(&self) -> Result<Node, DomError> {
        if !self.is_element() {
            return Err(DomError::NotAnElement);
        }
        if self.0.shadow_root.borrow().is_some() {
            return Err(DomError::NotSupported(
                "element already hosts a shadow root".to_string(),
            ));
        }
        let root = Self::with_type(NodeType::ShadowRoot, "", false);
        *root.0.host.borrow_mut() = Rc::downgrade(&self.0);
        *self.0.shadow_root.borrow_mut() = Some(root.clone());
        Ok(root)
    }

    pub fn shadow_root(&self) -> Option<Node> {
        self.0.shadow_root.borrow().clone()
    }

    /// The host element of a shadow root.
    pub fn host(&self) -> Option<Node> {
        self.0.host.borrow().upgrade().map(Node)
    }

    // Selectors

    pub fn query_selector_all(&self, selectors: &str) -> Vec<Node> {
        match SelectorList::parse(selectors) {
            Some(list) => selector::select_all(self, &list),
            None => Vec::new(),
        }
    }

    pub fn query_selector(&self, selectors: &str) -> Option<Node> {
        self.query_selector_all(selectors).into_iter().next()
    }

    /// `Element.matches`; false for non-elements and unparsable selectors.
    pub fn matches(&self, selectors: &str) -> bool {
        if !self.is_element() {
            return false;
        }
        SelectorList::parse(selectors).is_some_and(|list| list.matches(self))
    }

    // Markup

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        serialize::serialize_children(self, &mut out);
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        serialize::serialize_node(self, &mut out);
        out
    }

    /// Replace the children with the nodes parsed from `html`.
    pub fn set_inner_html(&self, html: &str) {
        self.clear_children();
        for node in parse_fragment(html) {
            *node.0.parent.borrow_mut() = Rc::downgrade(&self.0);
            self.0.children.borrow_mut().push(node);
        }
    }

    pub(crate) fn character_data(&self) -> String {
        self.0.data.borrow().clone()
    }

    pub(crate) fn is_html(&self) -> bool {
        self.0.html
    }
}

/// A fresh `<html><head></head><body></body></html>` document.
pub fn create_html_document() -> Node {
    parse_html("")
}

/// Parse an HTML string into a document tree.
pub fn parse_html(html: &str) -> Node {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts).one(html);

    convert_node(&dom.document).unwrap_or_else(Node::new_document)
}

/// Parse markup as the content of a `<body>` and return the detached
/// top-level nodes. Each call parses into a fresh html5ever document; the
/// caller's tree only receives the resulting nodes.
pub(crate) fn parse_fragment(html: &str) -> Vec<Node> {
    let document = parse_html(&format!("<body>{html}"));
    let Some(body) = document.query_selector("body") else {
        return Vec::new();
    };
    let nodes = body.child_nodes();
    for node in &nodes {
        node.detach();
    }
    nodes
}

fn is_html_name(name: &QualName) -> bool {
    &*name.ns == HTML_NAMESPACE
}

fn adopt_children(node: &Node, children: &[Handle]) {
    for child in children {
        if let Some(child_node) = convert_node(child) {
            *child_node.0.parent.borrow_mut() = Rc::downgrade(&node.0);
            node.0.children.borrow_mut().push(child_node);
        }
    }
}

fn convert_node(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Document => {
            let doc = Node::new_document();
            adopt_children(&doc, &handle.children.borrow());
            Some(doc)
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let node = if is_html_name(name) {
                Node::new_element(&name.local)
            } else {
                Node::new_foreign_element(&name.local)
            };
            for attr in attrs.borrow().iter() {
                node.0.attributes.borrow_mut().push(Attribute {
                    name: attr.name.local.to_string(),
                    value: attr.value.to_string(),
                });
            }
            // <template> content lives outside the regular child list.
            if let Some(contents) = template_contents.borrow().as_ref() {
                adopt_children(&node, &contents.children.borrow());
            }
            adopt_children(&node, &handle.children.borrow());
            Some(node)
        }
        NodeData::Text { contents } => Some(Node::new_text(&contents.borrow())),
        NodeData::Comment { contents } => Some(Node::new_comment(contents)),
        _ => None, // doctypes, processing instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builds_html_head_body() {
        let doc = parse_html("<p id=a>hi</p>");
        let html = doc.first_child().unwrap();
        assert_eq!(html.node_name(), "HTML");
        let names: Vec<String> = html.children().iter().map(|c| c.node_name()).collect();
        assert_eq!(names, vec!["HEAD", "BODY"]);
        assert_eq!(doc.query_selector("#a").unwrap().text_content(), "hi");
    }

    #[test]
    fn parent_links_follow_moves() {
        let a = Node::new_element("div");
        let b = Node::new_element("div");
        let child = Node::new_element("span");
        a.append_child(&child).unwrap();
        b.append_child(&child).unwrap();
        assert!(!a.has_child_nodes());
        assert_eq!(child.parent_node(), Some(b.clone()));
    }

    #[test]
    fn inserting_an_ancestor_is_rejected() {
        let outer = Node::new_element("div");
        let inner = Node::new_element("div");
        outer.append_child(&inner).unwrap();
        assert!(matches!(
            inner.append_child(&outer),
            Err(DomError::HierarchyRequest)
        ));
    }

    #[test]
    fn fragment_is_emptied_into_parent() {
        let fragment = Node::new_fragment();
        fragment.append_child(&Node::new_element("a")).unwrap();
        fragment.append_child(&Node::new_text("x")).unwrap();
        let parent = Node::new_element("div");
        parent.append_child(&fragment).unwrap();
        assert!(!fragment.has_child_nodes());
        assert_eq!(parent.inner_html(), "<a></a>x");
    }

    #[test]
    fn insert_before_reference_and_itself() {
        let parent = Node::new_element("ul");
        let one = Node::new_element("li");
        let two = Node::new_element("li");
        parent.append_child(&two).unwrap();
        parent.insert_before(&one, Some(&two)).unwrap();
        assert_eq!(parent.first_child(), Some(one.clone()));
        parent.insert_before(&one, Some(&one)).unwrap();
        assert_eq!(parent.child_nodes(), vec![one, two]);
    }

    #[test]
    fn shadow_root_links_to_host() {
        let host = Node::new_element("x-card");
        let root = host.attach_shadow().unwrap();
        assert!(root.is_shadow_root());
        assert_eq!(root.host(), Some(host.clone()));
        assert!(host.attach_shadow().is_err());
    }

    #[test]
    fn svg_keeps_case() {
        let doc = parse_html("<svg><foreignObject></foreignObject></svg>");
        let svg = doc.query_selector("svg").unwrap();
        assert_eq!(svg.node_name(), "svg");
        assert_eq!(svg.first_child().unwrap().node_name(), "foreignObject");
    }
}
