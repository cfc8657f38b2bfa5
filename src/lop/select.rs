// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `select` lop (spec §4.2/§4.4): evaluates a lop's `select_N`
//! properties and updates the target tree's selection set.

use crate::engine::Engine;
use crate::error::Result;
use crate::node::NodeId;
use crate::selector;
use crate::tree::Tree;
use crate::value::Value;

/// Reads `select_1`, `select_2`, ... off `lop` in index order.
fn select_clauses(lop_tree: &Tree, id: NodeId) -> Vec<String> {
    let node = match lop_tree.get(id) {
        Some(n) => n,
        None => return Vec::new(),
    };
    let mut clauses: Vec<(u32, String)> = node
        .properties()
        .filter_map(|p| {
            let n = p.name().strip_prefix("select_")?;
            let idx: u32 = n.parse().ok()?;
            let value = match p.value() {
                Value::Str(s) => s.clone(),
                other => other.to_string(),
            };
            Some((idx, value))
        })
        .collect();
    clauses.sort_by_key(|(idx, _)| *idx);
    clauses.into_iter().map(|(_, v)| v).collect()
}

/// Executes a `select` lop against the engine's main tree. Always
/// truthy.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let clauses = select_clauses(lop_tree, id);
    let selection = selector::evaluate(engine.main(), &clauses)?;
    engine.main_mut().set_selection(selection);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::node::Node;
    use crate::property::Property;

    #[test]
    fn select_lop_populates_main_tree_selection() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, Node::new("a", None)).unwrap();
        let b = tree.add_child(a, Node::new("b", None)).unwrap();
        tree.get_mut(b).unwrap().set_property(Property::u32("foo", 1));
        tree.sync();
        let mut engine = Engine::new(tree, EngineConfig::default());

        let mut lop_tree = Tree::new();
        let lop_root = lop_tree.root();
        let mut lop = Node::new("select-1", None);
        lop.set_property(Property::string("compatible", "system-device-tree-v1,lop,select"));
        lop.set_property(Property::string("select_1", "/a/.*:foo:1"));
        let lop_id = lop_tree.add_child(lop_root, lop).unwrap();
        lop_tree.sync();

        execute(&mut engine, &lop_tree, lop_id).unwrap();
        assert_eq!(engine.main().selection(), &[b]);
    }
}
