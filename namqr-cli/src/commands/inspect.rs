//! Print the TLV structure of a payload

use anyhow::Result;
use namqr_lib::{NamqrCodec, TlvNode, TlvValue};

use crate::ui;

/// Validate the frame and checksum, then print the tree
pub fn run(codec: &NamqrCodec, payload: &str, json: bool) -> Result<()> {
    let payload = super::read_payload(payload)?;
    let tree = codec.inspect(&payload)?;

    if json {
        ui::json(&serde_json::to_value(&tree)?);
        return Ok(());
    }

    ui::header("TLV Tree");
    for line in render(tree.nodes()) {
        println!("{line}");
    }
    ui::separator();
    ui::key_value("Root nodes", &tree.len().to_string());
    ui::key_value("Length", &payload.chars().count().to_string());
    Ok(())
}

/// One line per node, children indented under their template.
fn render(nodes: &[TlvNode]) -> Vec<String> {
    let mut lines = Vec::new();
    render_level(nodes, 1, &mut lines);
    lines
}

fn render_level(nodes: &[TlvNode], indent: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    for node in nodes {
        match &node.value {
            TlvValue::Leaf(value) => lines.push(format!("{pad}{} {value}", node.tag)),
            TlvValue::Template(children) => {
                lines.push(format!("{pad}{} [template]", node.tag));
                render_level(children, indent + 1, lines);
            }
        }
    }
}
