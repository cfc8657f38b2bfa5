// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! `.yaml` front end (spec §6): YAML serialization of a tree, and the
//! additive main-tree merge semantics pinned by SPEC_FULL.md §D.2.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::tree::Tree;

/// Serializes `tree` to a YAML string via its neutral export mapping.
pub fn render(tree: &Tree) -> Result<String> {
    Ok(serde_yaml::to_string(&tree.export())?)
}

/// Writes `tree` to `path` as YAML.
pub fn write(tree: &Tree, path: &Path) -> Result<()> {
    fs::write(path, render(tree)?)?;
    Ok(())
}

/// Parses a YAML source into a standalone [`Tree`].
pub fn parse(source: &str) -> Result<Tree> {
    let value: serde_json::Value = serde_yaml::from_str(source)?;
    Tree::load(&value)
}

/// Merges `incoming` into `dest`, node-by-node, additively (spec §6:
/// "YAML sources for the main tree are parsed to trees in memory and
/// merged (node-by-node, additive) into the main tree"). A property
/// collision (same path, same name, different value) overwrites and
/// logs a warning, per the open-question resolution in SPEC_FULL.md §D.2.
pub fn merge_into(dest: &mut Tree, incoming: &Tree) -> Result<()> {
    merge_node(dest, dest.root(), incoming, incoming.root());
    dest.sync();
    Ok(())
}

fn merge_node(dest: &mut Tree, dest_id: NodeId, incoming: &Tree, incoming_id: NodeId) {
    let incoming_node: Node = match incoming.get(incoming_id) {
        Some(n) => n.clone(),
        None => return,
    };

    for prop in incoming_node.properties() {
        let path = dest.path_of(dest_id);
        let existing = dest.get(dest_id).and_then(|n| n.property(prop.name())).cloned();
        if let Some(existing) = existing {
            if existing.value() != prop.value() {
                warn!(
                    "yaml merge: overwriting '{}' on {} ({} -> {})",
                    prop.name(),
                    path,
                    existing.value(),
                    prop.value()
                );
            }
        }
        if let Some(node) = dest.get_mut(dest_id) {
            node.set_property(prop.clone());
        }
    }

    for &child_id in incoming_node.children() {
        let child_name = incoming.get(child_id).map(|n| n.name().to_string()).unwrap_or_default();
        let dest_child = dest
            .get(dest_id)
            .and_then(|n| n.children().iter().copied().find(|&c| dest.get(c).map(|n| n.name() == child_name).unwrap_or(false)));
        let dest_child = match dest_child {
            Some(c) => c,
            None => match dest.add_child(dest_id, Node::new(child_name, None)) {
                Ok(c) => c,
                Err(_) => continue,
            },
        };
        merge_node(dest, dest_child, incoming, child_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    #[test]
    fn merge_adds_new_node_and_overwrites_conflicting_property() {
        let mut dest = Tree::new();
        let root = dest.root();
        let amba = dest.add_child(root, Node::new("amba", None)).unwrap();
        dest.get_mut(amba).unwrap().set_property(Property::string("status", "disabled"));
        dest.sync();

        let mut incoming = Tree::new();
        let iroot = incoming.root();
        let iamba = incoming.add_child(iroot, Node::new("amba", None)).unwrap();
        incoming.get_mut(iamba).unwrap().set_property(Property::string("status", "okay"));
        let iuart = incoming.add_child(iamba, Node::new("uart@0", None)).unwrap();
        incoming.get_mut(iuart).unwrap().set_property(Property::string("compatible", "ns16550"));
        incoming.sync();

        merge_into(&mut dest, &incoming).unwrap();

        let amba = dest.lookup_by_path("/amba").unwrap();
        assert_eq!(
            dest.get(amba).unwrap().property("status").unwrap().value().to_string(),
            "\"okay\""
        );
        assert!(dest.lookup_by_path("/amba/uart@0").is_some());
    }
}
