use super::{TlvNode, TlvTree, TlvValue, MAX_VALUE_LEN};
use crate::tag::{FieldPath, Tag};
use crate::{NamqrError, Result};
use std::fmt::Write;

/// Serialize a tree to flat TLV text, without a checksum.
///
/// Nodes are written in the order they appear in the tree.
pub fn write_tree(tree: &TlvTree) -> Result<String> {
    write_nodes(tree.nodes())
}

/// Serialize a node sequence to flat TLV text.
///
/// Each length prefix is the character count of the written value, padded
/// to two digits. A value longer than [`MAX_VALUE_LEN`] characters fails
/// with [`NamqrError::ValueTooLong`].
///
/// # Example
///
/// ```
/// use namqr_lib::tlv::{write_nodes, TlvNode};
/// use namqr_lib::Tag;
///
/// let nodes = vec![
///     TlvNode::leaf(Tag::new(0).unwrap(), "01"),
///     TlvNode::template(
///         Tag::new(62).unwrap(),
///         vec![TlvNode::leaf(Tag::new(5).unwrap(), "INV1")],
///     ),
/// ];
/// assert_eq!(write_nodes(&nodes).unwrap(), "00020162080504INV1");
/// ```
pub fn write_nodes(nodes: &[TlvNode]) -> Result<String> {
    let mut out = String::new();
    write_level(&mut out, nodes, None)?;
    Ok(out)
}

fn write_level(out: &mut String, nodes: &[TlvNode], parent: Option<Tag>) -> Result<()> {
    for node in nodes {
        let value = match &node.value {
            TlvValue::Leaf(value) => value.clone(),
            TlvValue::Template(children) => {
                let mut inner = String::new();
                // Paths only carry one level of parent; deeper nodes report
                // their nearest root template.
                write_level(&mut inner, children, Some(parent.unwrap_or(node.tag)))?;
                inner
            }
        };

        let length = value.chars().count();
        if length > MAX_VALUE_LEN {
            let path = match parent {
                Some(parent) => FieldPath::child(parent, node.tag),
                None => FieldPath::root(node.tag),
            };
            return Err(NamqrError::ValueTooLong { path, length });
        }

        // Writing into a String cannot fail.
        let _ = write!(out, "{}{:02}{}", node.tag, length, value);
    }
    Ok(())
}
