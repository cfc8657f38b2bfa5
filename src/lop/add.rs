// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `add` lop (spec §4.4): copies the subtree rooted at `node_src` (a
//! direct child of the lop node) into the target tree at `node_dest`
//! (default `/` + `node_src.name`).

use crate::engine::Engine;
use crate::error::{LopError, Result};
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

fn split_parent_and_name(path: &str) -> (String, String) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => ("/".to_string(), trimmed[1..].to_string()),
        Some(idx) => (trimmed[..idx].to_string(), trimmed[idx + 1..].to_string()),
        None => ("/".to_string(), trimmed.to_string()),
    }
}

/// Executes an `add` lop against the engine's main tree. Always truthy.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let path_for_err = lop_tree.path_of(id);
    let lop = lop_tree
        .get(id)
        .ok_or_else(|| LopError::LopMalformed(path_for_err.clone(), "lop node disappeared".to_string()))?;

    let src_name = match lop.property("node_src").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => {
            return Err(LopError::LopMalformed(
                path_for_err,
                "missing 'node_src' property".to_string(),
            ))
        }
    };

    let src_id = lop
        .children()
        .iter()
        .find(|&&c| lop_tree.get(c).map(|n| n.name() == src_name).unwrap_or(false))
        .copied()
        .ok_or_else(|| {
            LopError::LopMalformed(
                lop_tree.path_of(id),
                format!("node_src '{}' is not a child of this lop", src_name),
            )
        })?;

    let dest = match lop.property("node_dest").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => format!("/{}", src_name),
    };

    let (dest_parent_path, dest_name) = split_parent_and_name(&dest);
    let dest_parent = engine.main().lookup_by_path(&dest_parent_path).ok_or_else(|| {
        LopError::InvariantViolation(format!("add destination parent not found: {}", dest_parent_path))
    })?;

    let detached = lop_tree.deep_copy(src_id);
    let phandle_desc = engine.phandle_desc().clone();
    engine
        .main_mut()
        .graft(dest_parent, Some(&dest_name), detached, &phandle_desc)?;
    engine.main_mut().sync();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::node::Node;
    use crate::property::Property;

    #[test]
    fn add_grafts_the_templated_child_at_destination() {
        let mut engine = Engine::new(Tree::new(), EngineConfig::default());

        let mut lop_tree = Tree::new();
        let root = lop_tree.root();
        let mut lop = Node::new("add-1", None);
        lop.set_property(Property::string("compatible", "system-device-tree-v1,lop,add"));
        lop.set_property(Property::string("node_src", "foo"));
        lop.set_property(Property::string("node_dest", "/foo"));
        let lop_id = lop_tree.add_child(root, lop).unwrap();
        lop_tree.add_child(lop_id, Node::new("foo", None)).unwrap();
        lop_tree.sync();

        execute(&mut engine, &lop_tree, lop_id).unwrap();
        assert!(engine.main().lookup_by_path("/foo").is_some());
    }
}
