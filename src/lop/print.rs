// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `print` lop (spec §4.4; rendering pinned by SPEC_FULL.md §B): a
//! `print_N` property holds either a literal line or a phandle; a
//! phandle is resolved to its node and the node's path plus all
//! properties are written to the diagnostic stream bracketed `{ ... }`.

use log::info;

use crate::engine::Engine;
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

fn print_lines(node: &crate::node::Node) -> Vec<(u32, Value)> {
    let mut lines: Vec<(u32, Value)> = node
        .properties()
        .filter_map(|p| {
            let n = p.name().strip_prefix("print_")?;
            let idx: u32 = n.parse().ok()?;
            Some((idx, p.value().clone()))
        })
        .collect();
    lines.sort_by_key(|(idx, _)| *idx);
    lines
}

fn render_phandle_resolved(engine: &Engine, phandle: u32) -> String {
    match engine.main().pnode(phandle) {
        Some(id) => render_node_block(engine, id),
        None => format!("{{ <unresolved phandle {}> }}", phandle),
    }
}

fn render_node_block(engine: &Engine, id: NodeId) -> String {
    let node = match engine.main().get(id) {
        Some(n) => n,
        None => return "{ <node removed> }".to_string(),
    };
    let mut body = format!("{} {{ ", engine.main().path_of(id));
    for prop in node.properties() {
        body.push_str(&format!("{} = {}; ", prop.name(), prop.value()));
    }
    body.push('}');
    body
}

/// Executes a `print` lop. Always truthy.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let node = match lop_tree.get(id) {
        Some(n) => n,
        None => return Ok(true),
    };
    for (_, value) in print_lines(node) {
        match value {
            Value::Phandle(p) | Value::U32(p) if p != 0 => info!("{}", render_phandle_resolved(engine, p)),
            Value::Str(s) => info!("{}", s),
            other => info!("{}", other),
        }
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
    fn print_lop_does_not_error_on_literal_and_phandle_lines() {
        let mut tree = Tree::new();
        let root = tree.root();
        let cpu0 = tree.add_child(root, Node::new("cpu@0", None)).unwrap();
        tree.get_mut(cpu0).unwrap().set_phandle(Some(7));
        tree.sync();
        let mut engine = Engine::new(tree, EngineConfig::default());

        let mut lop_tree = Tree::new();
        let lop_root = lop_tree.root();
        let mut lop = Node::new("print-1", None);
        lop.set_property(Property::string("compatible", "system-device-tree-v1,lop,print"));
        lop.set_property(Property::string("print_1", "starting pass"));
        lop.set_property(Property::new("print_2", Value::Phandle(7)));
        let lop_id = lop_tree.add_child(lop_root, lop).unwrap();
        lop_tree.sync();

        assert!(execute(&mut engine, &lop_tree, lop_id).unwrap());
    }
}
