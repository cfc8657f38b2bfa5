// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `modify` lop (spec §4.4.1): a `PATH:PROP:VAL` mutation.

use crate::engine::Engine;
use crate::error::{LopError, Result};
use crate::node::NodeId;
use crate::property::Property;
use crate::tree::Tree;
use crate::value::Value;

/// Resolves a `modify` path field to a node. An absolute path (leading
/// `/`) is looked up as-is; a relative path is resolved against the
/// engine's bound `start_node` (spec §4.4.2), falling back to the tree
/// root when no `conditional` binding is live.
fn resolve_target(engine: &Engine, path: &str) -> Option<NodeId> {
    if path.starts_with('/') {
        return engine.main().lookup_by_path(path);
    }
    let base = engine.start_node().unwrap_or_else(|| engine.main().root());
    let base_path = engine.main().path_of(base);
    let full = if base_path == "/" {
        format!("/{}", path)
    } else {
        format!("{}/{}", base_path, path)
    };
    engine.main().lookup_by_path(&full)
}

/// Splits an absolute path into `(parent_path, leaf_name)`.
fn split_path(path: &str) -> (String, String) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => ("/".to_string(), trimmed[1..].to_string()),
        Some(idx) => (trimmed[..idx].to_string(), trimmed[idx + 1..].to_string()),
        None => ("/".to_string(), trimmed.to_string()),
    }
}

/// Resolves a `modify` RHS into a typed value, handling the `&NAME[#FIELD]`
/// label-reference syntax (spec §4.4.1).
fn resolve_value(engine: &Engine, lop_tree: &Tree, val: &str) -> Value {
    let reference = match val.strip_prefix('&') {
        Some(r) => r,
        None => return Value::parse_literal(val),
    };

    let (label, field) = match reference.split_once('#') {
        Some((l, f)) => (l, Some(f)),
        None => (reference, None),
    };

    let target = engine
        .main()
        .lookup_by_label(label)
        .or_else(|| lop_tree.lookup_by_label(label));

    match (target, field) {
        (Some(id), Some(field_name)) => {
            let source_tree = if engine.main().lookup_by_label(label).is_some() {
                engine.main()
            } else {
                lop_tree
            };
            source_tree
                .get(id)
                .and_then(|n| n.property(field_name))
                .map(|p| p.value().clone())
                .unwrap_or(Value::Phandle(0))
        }
        (Some(id), None) => {
            let phandle = if engine.main().lookup_by_label(label).is_some() {
                engine.main().get(id).and_then(|n| n.phandle())
            } else {
                lop_tree.get(id).and_then(|n| n.phandle())
            };
            Value::Phandle(phandle.unwrap_or(0))
        }
        (None, _) => Value::Phandle(0),
    }
}

/// Executes a `modify` lop against the engine's main tree. Always
/// truthy: `modify` has no notion of a falsy outcome (spec §4.4.1).
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let path_for_err = lop_tree.path_of(id);
    let raw = lop_tree
        .get(id)
        .and_then(|n| n.property("modify"))
        .map(|p| p.value().to_string())
        .ok_or_else(|| LopError::LopMalformed(path_for_err.clone(), "missing 'modify' property".to_string()))?;
    // `Value::to_string` quotes strings; strip that back off for our own
    // three-field parse.
    let raw = raw.trim_matches('"').to_string();

    let mut parts = raw.splitn(3, ':');
    let path = parts.next().unwrap_or("");
    let prop = parts.next().unwrap_or("");
    let val = parts.next().unwrap_or("");

    let targets: Vec<NodeId> = if path.is_empty() {
        engine.main().selection().to_vec()
    } else {
        match resolve_target(engine, path) {
            Some(n) => engine.main().subnodes(n),
            None => Vec::new(),
        }
    };
    if targets.is_empty() {
        return Ok(true);
    }

    if prop.is_empty() {
        if val.is_empty() {
            for &t in &targets {
                if engine.main().get(t).is_some() {
                    engine.main_mut().delete(t)?;
                }
            }
        } else {
            let primary = targets[0];
            let current_path = engine.main().path_of(primary);
            let (cur_parent, _cur_name) = split_path(&current_path);
            let (new_parent, new_name) = split_path(val);
            if cur_parent == new_parent {
                engine.main_mut().rename(primary, &new_name)?;
            } else {
                let detached = engine.main().deep_copy(primary);
                let dest_parent = engine.main().lookup_by_path(&new_parent).ok_or_else(|| {
                    LopError::InvariantViolation(format!(
                        "move destination parent not found: {}",
                        new_parent
                    ))
                })?;
                let phandle_desc = engine.phandle_desc().clone();
                engine.main_mut().delete(primary)?;
                engine
                    .main_mut()
                    .graft(dest_parent, Some(&new_name), detached, &phandle_desc)?;
            }
        }
    } else if val.is_empty() {
        for &t in &targets {
            if let Some(node) = engine.main_mut().get_mut(t) {
                node.remove_property(prop);
            }
        }
    } else {
        let value = resolve_value(engine, lop_tree, val);
        for &t in &targets {
            if let Some(node) = engine.main_mut().get_mut(t) {
                node.set_property(Property::new(prop, value.clone()));
            }
        }
    }

    engine.main_mut().sync();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::node::Node;

    fn build_amba_tree() -> Engine {
        let mut tree = Tree::new();
        let root = tree.root();
        let amba = tree.add_child(root, Node::new("amba", None)).unwrap();
        tree.add_child(amba, Node::new("uart@0", None)).unwrap();
        tree.sync();
        Engine::new(tree, EngineConfig::default())
    }

    fn lop_with_modify(expr: &str) -> Tree {
        let mut lop_tree = Tree::new();
        let root = lop_tree.root();
        let mut node = Node::new("modify-1", None);
        node.set_property(Property::string(
            "compatible",
            "system-device-tree-v1,lop,modify",
        ));
        node.set_property(Property::string("modify", expr));
        lop_tree.add_child(root, node).unwrap();
        lop_tree.sync();
        lop_tree
    }

    #[test]
    fn rename_moves_node_to_new_leaf_name() {
        let mut engine = build_amba_tree();
        let lop_tree = lop_with_modify("/amba/uart@0::/amba/serial0");
        let lop_id = lop_tree.lookup_by_path("/modify-1").unwrap();
        execute(&mut engine, &lop_tree, lop_id).unwrap();
        assert!(engine.main().lookup_by_path("/amba/serial0").is_some());
        assert!(engine.main().lookup_by_path("/amba/uart@0").is_none());
    }

    #[test]
    fn property_delete_removes_named_property_only() {
        let mut engine = build_amba_tree();
        let chosen = {
            let root = engine.main().root();
            let id = engine.main_mut().add_child(root, Node::new("chosen", None)).unwrap();
            engine
                .main_mut()
                .get_mut(id)
                .unwrap()
                .set_property(Property::string("bootargs", "console=ttyS0"));
            engine.main_mut().sync();
            id
        };
        let lop_tree = lop_with_modify("/chosen:bootargs:");
        let lop_id = lop_tree.lookup_by_path("/modify-1").unwrap();
        execute(&mut engine, &lop_tree, lop_id).unwrap();
        assert!(engine.main().get(chosen).unwrap().property("bootargs").is_none());
    }

    #[test]
    fn phandle_substitution_resolves_label() {
        let mut engine = build_amba_tree();
        let cpu0 = {
            let root = engine.main().root();
            let id = engine.main_mut().add_child(root, Node::new("cpu@0", None)).unwrap();
            engine.main_mut().get_mut(id).unwrap().add_label("cpu0");
            engine.main_mut().get_mut(id).unwrap().set_phandle(Some(7));
            let chosen = engine.main_mut().add_child(root, Node::new("chosen", None)).unwrap();
            engine.main_mut().get_mut(chosen).unwrap().set_property(Property::string("cpu", ""));
            engine.main_mut().sync();
            id
        };
        let lop_tree = lop_with_modify("/chosen:cpu:&cpu0");
        let lop_id = lop_tree.lookup_by_path("/modify-1").unwrap();
        execute(&mut engine, &lop_tree, lop_id).unwrap();
        let chosen = engine.main().lookup_by_path("/chosen").unwrap();
        assert_eq!(
            engine.main().get(chosen).unwrap().property("cpu").unwrap().value(),
            &Value::Phandle(7)
        );
        assert_eq!(engine.main().get(cpu0).unwrap().phandle(), Some(7));
    }
}
