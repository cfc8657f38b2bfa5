// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Textual `.dts` emission (spec §6): "when `enhanced` is set, the
//! emitter includes comments, symbolic phandle references, and
//! annotated types."

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

fn type_annotation(value: &Value) -> &'static str {
    match value {
        Value::Empty => "empty",
        Value::U32(_) => "u32",
        Value::U32List(_) => "u32-list",
        Value::Bytes(_) => "bytes",
        Value::Str(_) => "string",
        Value::StrList(_) => "string-list",
        Value::Phandle(_) => "phandle",
        Value::PhandleList(_) => "phandle-list",
        Value::Mixed(_) => "mixed",
    }
}

fn render_node(tree: &Tree, id: NodeId, depth: usize, enhanced: bool, out: &mut String) {
    let node = match tree.get(id) {
        Some(n) => n,
        None => return,
    };
    let indent = "\t".repeat(depth);
    if enhanced {
        for label in node.labels() {
            out.push_str(&format!("{}// label: {}\n", indent, label));
        }
    }
    let label_prefix = node
        .labels()
        .first()
        .map(|l| format!("{}: ", l))
        .unwrap_or_default();
    let name = if node.name().is_empty() { "/" } else { node.name() };
    out.push_str(&format!("{}{}{} {{\n", indent, label_prefix, name));

    for prop in node.properties() {
        if enhanced {
            out.push_str(&format!(
                "{}\t// type: {}\n",
                indent,
                type_annotation(prop.value())
            ));
            if let Some(p) = prop.value().as_phandle() {
                if let Some(referenced) = tree.pnode(p) {
                    out.push_str(&format!(
                        "{}\t// refers to: {}\n",
                        indent,
                        tree.path_of(referenced)
                    ));
                }
            }
        }
        out.push_str(&format!("{}\t{} = {};\n", indent, prop.name(), prop.value()));
    }

    for &child in node.children() {
        render_node(tree, child, depth + 1, enhanced, out);
    }

    out.push_str(&format!("{}}};\n", indent));
}

/// Renders `tree` as `.dts` text.
pub fn render(tree: &Tree, enhanced: bool) -> String {
    let mut out = String::from("/dts-v1/;\n\n");
    render_node(tree, tree.root(), 0, enhanced, &mut out);
    out
}

/// Writes `tree` to `path` as `.dts` text.
pub fn write(tree: &Tree, path: &Path, enhanced: bool) -> Result<()> {
    fs::write(path, render(tree, enhanced))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::property::Property;

    #[test]
    fn render_includes_property_assignment() {
        let mut tree = Tree::new();
        let root = tree.root();
        let amba = tree.add_child(root, Node::new("amba", None)).unwrap();
        tree.get_mut(amba).unwrap().set_property(Property::string("status", "okay"));
        tree.sync();
        let text = render(&tree, false);
        assert!(text.contains("amba {"));
        assert!(text.contains("status = \"okay\";"));
    }

    #[test]
    fn enhanced_render_annotates_types() {
        let mut tree = Tree::new();
        let root = tree.root();
        let amba = tree.add_child(root, Node::new("amba", None)).unwrap();
        tree.get_mut(amba).unwrap().set_property(Property::u32("reg", 1));
        tree.sync();
        let text = render(&tree, true);
        assert!(text.contains("// type: u32"));
    }
}
