// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `tree` lop (spec §4.4): like `output`, but stores the filtered
//! copy in the subtree table instead of writing a file.

use log::warn;

use crate::engine::Engine;
use crate::error::{LopError, Result};
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

/// Builds a detached [`Tree`] whose root has one child per path in
/// `paths`, each a deep copy of the corresponding main-tree node (spec
/// §8 scenario 5: "subtree table contains `chosen-only` whose root has
/// single child `chosen`").
pub fn extract(engine: &Engine, paths: &[String]) -> Tree {
    let mut out = Tree::new();
    let out_root = out.root();
    let phandle_desc = engine.phandle_desc().clone();
    for path in paths {
        if let Some(src_id) = engine.main().lookup_by_path(path) {
            let detached = engine.main().deep_copy(src_id);
            if let Err(e) = out.graft(out_root, None, detached, &phandle_desc) {
                warn!("extracting '{}' failed: {}", path, e);
            }
        }
    }
    out.sync();
    out
}

fn node_list(node: &crate::node::Node) -> Vec<String> {
    match node.property("nodes").map(|p| p.value()) {
        Some(Value::StrList(list)) => list.clone(),
        Some(Value::Str(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Executes a `tree` lop: extracts the requested nodes into the subtree
/// table under the name in the lop's `tree` property. Always truthy.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let path_for_err = lop_tree.path_of(id);
    let lop = lop_tree
        .get(id)
        .ok_or_else(|| LopError::LopMalformed(path_for_err.clone(), "lop node disappeared".to_string()))?;
    let name = match lop.property("tree").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => {
            return Err(LopError::LopMalformed(
                path_for_err,
                "missing 'tree' property".to_string(),
            ))
        }
    };
    let paths = node_list(lop);
    let extracted = extract(engine, &paths);
    engine.subtrees_mut().insert(name, extracted);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::node::Node;
    use crate::property::Property;

    #[test]
    fn tree_lop_extracts_named_subtree() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.add_child(root, Node::new("chosen", None)).unwrap();
        tree.sync();
        let mut engine = Engine::new(tree, EngineConfig::default());

        let mut lop_tree = Tree::new();
        let lop_root = lop_tree.root();
        let mut lop = Node::new("tree-1", None);
        lop.set_property(Property::string("compatible", "system-device-tree-v1,lop,tree"));
        lop.set_property(Property::string("tree", "chosen-only"));
        lop.set_property(Property::new(
            "nodes",
            Value::StrList(vec!["/chosen".to_string()]),
        ));
        let lop_id = lop_tree.add_child(lop_root, lop).unwrap();
        lop_tree.sync();

        execute(&mut engine, &lop_tree, lop_id).unwrap();
        let extracted = engine.subtrees().get("chosen-only").unwrap();
        assert_eq!(extracted.get(extracted.root()).unwrap().children().len(), 1);
        assert!(extracted.lookup_by_path("/chosen").is_some());
    }
}
