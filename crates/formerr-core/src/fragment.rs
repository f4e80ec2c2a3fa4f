#![forbid(unsafe_code)]

//! Structured message content.
//!
//! A [`Fragment`] is a detached list of text and element nodes: the content
//! of a `<template>`, the inline children of a binding, or what a binding
//! currently renders. Fragments are plain values; cloning one is how a
//! template is "instantiated".

use std::fmt::Write as _;

/// A node inside a [`Fragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentNode {
    /// A text node.
    Text(String),
    /// An element with attributes and children.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<FragmentNode>,
    },
}

impl FragmentNode {
    /// Create a text node.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text(data.into())
    }

    /// Create an element without attributes.
    #[must_use]
    pub fn element(tag: impl Into<String>, children: Vec<FragmentNode>) -> Self {
        Self::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(data) => out.push_str(data),
            Self::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Self::Text(data) => escape_into(data, false, out),
            Self::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    child.write_markup(out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

/// An ordered list of detached nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    nodes: Vec<FragmentNode>,
}

impl Fragment {
    /// An empty fragment.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// A fragment holding a single text node.
    #[must_use]
    pub fn from_text(data: impl Into<String>) -> Self {
        Self {
            nodes: vec![FragmentNode::text(data)],
        }
    }

    /// Append a node.
    pub fn push(&mut self, node: FragmentNode) {
        self.nodes.push(node);
    }

    /// Builder-style [`Fragment::push`].
    #[must_use]
    pub fn with(mut self, node: FragmentNode) -> Self {
        self.push(node);
        self
    }

    /// Top-level nodes.
    #[must_use]
    pub fn nodes(&self) -> &[FragmentNode] {
        &self.nodes
    }

    /// Number of top-level nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the fragment has no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the fragment has no element and only whitespace text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.nodes.iter().all(|node| match node {
            FragmentNode::Text(data) => data.trim().is_empty(),
            FragmentNode::Element { .. } => false,
        })
    }

    /// Concatenated text of every descendant text node.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }

    /// Serialize to markup, escaping text and attribute values.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_markup(&mut out);
        }
        out
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::from_text(text)
    }
}

impl FromIterator<FragmentNode> for Fragment {
    fn from_iter<I: IntoIterator<Item = FragmentNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

fn escape_into(raw: &str, attribute: bool, out: &mut String) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
