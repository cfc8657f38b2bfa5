// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `conditional` lop (spec §4.4.2): matches a relative-path chain
//! against the target tree, partitions matches into true/false, and runs
//! the corresponding `true*`/`false*` child lops.

use crate::engine::Engine;
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

use super::interpreter::{self, kind_of};

fn chain_target_path(lop_tree: &Tree, cond_root: &str, chain_root: NodeId) -> (String, NodeId) {
    let mut segments = Vec::new();
    let mut cur = chain_root;
    loop {
        let node = lop_tree.get(cur).expect("chain node vanished mid-walk");
        segments.push(node.name().to_string());
        match node.children().first() {
            Some(&child) => cur = child,
            None => break,
        }
    }
    let relative = format!("/{}", segments.join("/"));
    let target = if cond_root == "/" {
        relative
    } else {
        format!("{}{}", cond_root.trim_end_matches('/'), relative)
    };
    (target, cur)
}

/// Executes a `conditional` lop against the engine's main tree.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let lop = match lop_tree.get(id) {
        Some(n) => n,
        None => return Ok(true),
    };

    let cond_root = match lop.property("cond_root").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => "/".to_string(),
    };

    let children: Vec<NodeId> = lop.children().to_vec();
    let chain_root = children.iter().copied().find(|&c| {
        let name = lop_tree.get(c).map(|n| n.name()).unwrap_or("");
        !name.starts_with("true") && !name.starts_with("false")
    });
    let chain_root = match chain_root {
        Some(c) => c,
        None => return Ok(true),
    };

    let (target_path, deepest) = chain_target_path(lop_tree, &cond_root, chain_root);

    let predicates: Vec<(String, Value, bool)> = lop_tree
        .get(deepest)
        .map(|n| {
            n.properties()
                .filter(|p| p.name() != "compatible")
                .map(|p| match p.name().strip_suffix("__not__") {
                    Some(base) => (base.to_string(), p.value().clone(), true),
                    None => (p.name().to_string(), p.value().clone(), false),
                })
                .collect()
        })
        .unwrap_or_default();

    let (true_matches, false_matches): (Vec<NodeId>, Vec<NodeId>) =
        match engine.main().lookup_by_path(&target_path) {
            None => (Vec::new(), Vec::new()),
            Some(candidate) => {
                let node = engine.main().get(candidate);
                let all_pass = node
                    .map(|n| {
                        predicates.iter().all(|(name, value, negate)| {
                            let matched = n.property(name).map(|p| p.value() == value).unwrap_or(false);
                            matched != *negate
                        })
                    })
                    .unwrap_or(false);
                if all_pass {
                    (vec![candidate], Vec::new())
                } else {
                    (Vec::new(), vec![candidate])
                }
            }
        };

    run_chain(engine, lop_tree, &children, "true", &true_matches)?;
    run_chain(engine, lop_tree, &children, "false", &false_matches)?;
    Ok(true)
}

fn run_chain(
    engine: &mut Engine,
    lop_tree: &Tree,
    children: &[NodeId],
    prefix: &str,
    matches: &[NodeId],
) -> Result<()> {
    if matches.is_empty() {
        return Ok(());
    }
    let handlers: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|&c| {
            lop_tree
                .get(c)
                .map(|n| n.name().starts_with(prefix))
                .unwrap_or(false)
        })
        .collect();

    for &start_node in matches {
        engine.bind_start_node(start_node);
        for &handler in &handlers {
            let kind = match lop_tree.get(handler).and_then(kind_of) {
                Some(k) => k,
                None => continue,
            };
            let truthy = interpreter::dispatch(engine, lop_tree, handler, kind)?;
            if !truthy {
                break;
            }
        }
        engine.clear_start_node();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::node::Node;
    use crate::property::Property;

    fn build_cpus_tree() -> Engine {
        let mut tree = Tree::new();
        let root = tree.root();
        let cpus = tree.add_child(root, Node::new("cpus", None)).unwrap();
        let cpu0 = tree.add_child(cpus, Node::new("cpu@0", None)).unwrap();
        tree.get_mut(cpu0).unwrap().set_property(Property::string("status", "okay"));
        let cpu1 = tree.add_child(cpus, Node::new("cpu@1", None)).unwrap();
        tree.get_mut(cpu1).unwrap().set_property(Property::string("status", "disabled"));
        tree.sync();
        Engine::new(tree, EngineConfig::default())
    }

    fn build_conditional_lop() -> Tree {
        let mut lop_tree = Tree::new();
        let lop_root = lop_tree.root();
        let mut cond = Node::new("cond-1", None);
        cond.set_property(Property::string(
            "compatible",
            "system-device-tree-v1,lop,conditional",
        ));
        let cond_id = lop_tree.add_child(lop_root, cond).unwrap();

        let cpus = lop_tree.add_child(cond_id, Node::new("cpus", None)).unwrap();
        let mut cpu0 = Node::new("cpu@0", None);
        cpu0.set_property(Property::string("status", "okay"));
        lop_tree.add_child(cpus, cpu0).unwrap();

        let mut true1 = Node::new("true1", None);
        true1.set_property(Property::string("compatible", "system-device-tree-v1,lop,modify"));
        true1.set_property(Property::string("modify", "/cpus/cpu@0:enabled:1"));
        lop_tree.add_child(cond_id, true1).unwrap();

        let mut false1 = Node::new("false1", None);
        false1.set_property(Property::string("compatible", "system-device-tree-v1,lop,modify"));
        false1.set_property(Property::string("modify", "/cpus/cpu@1:status:"));
        lop_tree.add_child(cond_id, false1).unwrap();

        lop_tree.sync();
        lop_tree
    }

    #[test]
    fn true_branch_runs_on_match_and_unrelated_node_is_untouched() {
        let mut engine = build_cpus_tree();
        let lop_tree = build_conditional_lop();
        let cond_id = lop_tree.lookup_by_path("/cond-1").unwrap();
        execute(&mut engine, &lop_tree, cond_id).unwrap();

        let cpu0 = engine.main().lookup_by_path("/cpus/cpu@0").unwrap();
        assert_eq!(
            engine.main().get(cpu0).unwrap().property("enabled").unwrap().value(),
            &Value::U32(1)
        );

        // cpu@1 was never a candidate (the chain path names only cpu@0),
        // so it is left exactly as it was: no false-branch firing.
        let cpu1 = engine.main().lookup_by_path("/cpus/cpu@1").unwrap();
        assert_eq!(
            engine.main().get(cpu1).unwrap().property("status").unwrap().value(),
            &Value::Str("disabled".to_string())
        );
    }

    #[test]
    fn true_branch_child_resolves_a_relative_path_against_start_node() {
        let mut tree = Tree::new();
        let root = tree.root();
        let display = tree.add_child(root, Node::new("display", None)).unwrap();
        tree.add_child(display, Node::new("panel", None)).unwrap();
        tree.sync();
        let mut engine = Engine::new(tree, EngineConfig::default());

        let mut lop_tree = Tree::new();
        let lop_root = lop_tree.root();
        let mut cond = Node::new("cond-2", None);
        cond.set_property(Property::string(
            "compatible",
            "system-device-tree-v1,lop,conditional",
        ));
        let cond_id = lop_tree.add_child(lop_root, cond).unwrap();

        // The chain ends at "display" (no further children in the lop
        // tree), so the matched candidate is `/display` itself, with no
        // predicates to satisfy.
        lop_tree.add_child(cond_id, Node::new("display", None)).unwrap();

        // A relative path names a child of the matched node, so it only
        // resolves correctly if `start_node` is bound to `/display`.
        let mut true1 = Node::new("true1", None);
        true1.set_property(Property::string("compatible", "system-device-tree-v1,lop,modify"));
        true1.set_property(Property::string("modify", "panel:enabled:1"));
        lop_tree.add_child(cond_id, true1).unwrap();
        lop_tree.sync();

        let cond_id = lop_tree.lookup_by_path("/cond-2").unwrap();
        execute(&mut engine, &lop_tree, cond_id).unwrap();

        let panel = engine.main().lookup_by_path("/display/panel").unwrap();
        assert_eq!(
            engine.main().get(panel).unwrap().property("enabled").unwrap().value(),
            &Value::U32(1)
        );
    }
}
