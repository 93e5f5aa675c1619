//! Argument shapes accepted by the `DomAid` helpers: a single value or a
//! list, nodes or markup.

use std::collections::{BTreeMap, HashMap};

use crate::dom::Node;

/// Something to insert: an existing node or a markup string.
#[derive(Debug, Clone)]
pub enum Content {
    Node(Node),
    Markup(String),
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Content::Node(node)
    }
}

impl From<&Node> for Content {
    fn from(node: &Node) -> Self {
        Content::Node(node.clone())
    }
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Content::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Content::Markup(markup)
    }
}

impl From<&String> for Content {
    fn from(markup: &String) -> Self {
        Content::Markup(markup.clone())
    }
}

pub trait IntoContents {
    fn into_contents(self) -> Vec<Content>;
}

impl IntoContents for Content {
    fn into_contents(self) -> Vec<Content> {
        vec![self]
    }
}

impl IntoContents for Node {
    fn into_contents(self) -> Vec<Content> {
        vec![self.into()]
    }
}

impl IntoContents for &Node {
    fn into_contents(self) -> Vec<Content> {
        vec![self.into()]
    }
}

impl IntoContents for &str {
    fn into_contents(self) -> Vec<Content> {
        vec![self.into()]
    }
}

impl IntoContents for String {
    fn into_contents(self) -> Vec<Content> {
        vec![self.into()]
    }
}

impl<T: Into<Content>> IntoContents for Vec<T> {
    fn into_contents(self) -> Vec<Content> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Content>, const N: usize> IntoContents for [T; N] {
    fn into_contents(self) -> Vec<Content> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Elements to act on: one node or many.
pub trait IntoElements {
    fn into_elements(self) -> Vec<Node>;
}

impl IntoElements for &Node {
    fn into_elements(self) -> Vec<Node> {
        vec![self.clone()]
    }
}

impl IntoElements for Node {
    fn into_elements(self) -> Vec<Node> {
        vec![self]
    }
}

impl IntoElements for &[Node] {
    fn into_elements(self) -> Vec<Node> {
        self.to_vec()
    }
}

impl IntoElements for &Vec<Node> {
    fn into_elements(self) -> Vec<Node> {
        self.clone()
    }
}

impl IntoElements for Vec<Node> {
    fn into_elements(self) -> Vec<Node> {
        self
    }
}

/// Names to remove: a single name, a list, or the keys of a rule mapping.
pub trait IntoNames {
    fn into_names(self) -> Vec<String>;
}

impl IntoNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoNames for &[&str] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|n| n.to_string()).collect()
    }
}

impl<const N: usize> IntoNames for [&str; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|n| n.to_string()).collect()
    }
}

impl IntoNames for Vec<&str> {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoNames for Vec<String> {
    fn into_names(self) -> Vec<String> {
        self
    }
}

impl<const N: usize> IntoNames for [(&str, &str); N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|(n, _)| n.to_string()).collect()
    }
}

impl IntoNames for &[(&str, &str)] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|(n, _)| n.to_string()).collect()
    }
}

impl IntoNames for &HashMap<String, String> {
    fn into_names(self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

impl IntoNames for &BTreeMap<String, String> {
    fn into_names(self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}
