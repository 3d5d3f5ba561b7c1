//! Tag-Length-Value wire format.
//!
//! A NAMQR payload is a flat run of `tag(2) length(2) value(length)` nodes.
//! Values of composite tags are themselves TLV runs. This module splits
//! text into nodes ([`tokenize`]), expands composite values into a tree
//! ([`expand`]) and writes trees back out ([`write_tree`]).

mod expander;
mod tokenizer;
mod writer;

pub use expander::{expand, TemplateLayout};
pub use tokenizer::tokenize;
pub use writer::{write_nodes, write_tree};

use crate::tag::Tag;
use serde::Serialize;

/// Maximum value length a two-digit length prefix can express.
pub const MAX_VALUE_LEN: usize = 99;

/// Value of a TLV node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TlvValue {
    /// Opaque scalar value.
    Leaf(String),
    /// Nested TLV sequence owned by this node.
    Template(Vec<TlvNode>),
}

/// A single TLV node. The length prefix is derived from the value on write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TlvNode {
    /// Node tag.
    pub tag: Tag,
    /// Node value.
    pub value: TlvValue,
}

impl TlvNode {
    /// Create a leaf node.
    pub fn leaf(tag: Tag, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: TlvValue::Leaf(value.into()),
        }
    }

    /// Create a template node owning `children`.
    pub fn template(tag: Tag, children: Vec<TlvNode>) -> Self {
        Self {
            tag,
            value: TlvValue::Template(children),
        }
    }

    /// Whether this node owns nested children.
    pub fn is_template(&self) -> bool {
        matches!(self.value, TlvValue::Template(_))
    }

    /// The scalar value, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match &self.value {
            TlvValue::Leaf(value) => Some(value),
            TlvValue::Template(_) => None,
        }
    }

    /// The children, if this is a template.
    pub fn children(&self) -> Option<&[TlvNode]> {
        match &self.value {
            TlvValue::Leaf(_) => None,
            TlvValue::Template(children) => Some(children),
        }
    }
}

/// An ordered sequence of root nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TlvTree {
    nodes: Vec<TlvNode>,
}

impl TlvTree {
    /// Create a tree from root nodes.
    pub fn new(nodes: Vec<TlvNode>) -> Self {
        Self { nodes }
    }

    /// Root nodes in wire order.
    pub fn nodes(&self) -> &[TlvNode] {
        &self.nodes
    }

    /// Consume the tree, yielding its root nodes.
    pub fn into_nodes(self) -> Vec<TlvNode> {
        self.nodes
    }

    /// First root node carrying `tag`.
    pub fn find(&self, tag: Tag) -> Option<&TlvNode> {
        self.nodes.iter().find(|node| node.tag == tag)
    }

    /// Number of root nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no root nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
