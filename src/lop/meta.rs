// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `meta` lop (spec §4.3/§4.4): registers phandle-property metadata
//! in the engine's process-wide [`crate::phandle::PhandleDesc`] map.

use crate::engine::Engine;
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

/// Executes a `meta` lop. Always truthy.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let node = match lop_tree.get(id) {
        Some(n) => n,
        None => return Ok(true),
    };
    let entries: Vec<String> = match node.property("phandle-desc").map(|p| p.value()) {
        Some(Value::StrList(list)) => list.clone(),
        Some(Value::Str(s)) => vec![s.clone()],
        _ => Vec::new(),
    };
    for prop_name in entries {
        engine.phandle_desc_mut().register(prop_name);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::node::Node;
    use crate::property::Property;

    #[test]
    fn meta_lop_registers_phandle_bearing_properties() {
        let mut engine = Engine::new(Tree::new(), EngineConfig::default());
        let mut lop_tree = Tree::new();
        let root = lop_tree.root();
        let mut lop = Node::new("meta-1", None);
        lop.set_property(Property::string("compatible", "system-device-tree-v1,lop,meta"));
        lop.set_property(Property::new(
            "phandle-desc",
            Value::StrList(vec!["interrupts-extended".to_string()]),
        ));
        let lop_id = lop_tree.add_child(root, lop).unwrap();
        lop_tree.sync();

        execute(&mut engine, &lop_tree, lop_id).unwrap();
        assert!(engine.phandle_desc().is_phandle_bearing("interrupts-extended"));
    }
}
