// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Top-level dispatch loop (spec §4.4): walks a lop tree in document
//! order, skipping conditional children and `noexec` nodes, and invokes
//! the handler matching each directive's decoded [`LopKind`].

use log::debug;

use crate::engine::Engine;
use crate::error::{LopError, Result};
use crate::node::{Node, NodeId};
use crate::tree::Tree;

use super::{add, code, conditional, exec, meta, modify, output, print, select, tree_extract, LopKind};

/// Reads a node's `compatible` property as a list of strings, regardless
/// of whether it was authored as a single string or a string list.
pub fn compatible_strings(node: &Node) -> Vec<String> {
    use crate::value::Value;
    match node.property("compatible").map(|p| p.value()) {
        Some(Value::Str(s)) => vec![s.clone()],
        Some(Value::StrList(list)) => list.clone(),
        _ => Vec::new(),
    }
}

/// Decodes the first `compatible` entry that names a lop kind.
pub fn kind_of(node: &Node) -> Option<LopKind> {
    compatible_strings(node).iter().find_map(|c| LopKind::decode(c))
}

/// Walks `lop_tree` in document order and executes every top-level
/// directive against `engine`'s main tree (spec §4.4 "Execution order").
pub fn run_file(engine: &mut Engine, lop_tree: &Tree) -> Result<()> {
    let order = lop_tree.subnodes(lop_tree.root());
    for id in order {
        if id == lop_tree.root() {
            continue;
        }
        let node = match lop_tree.get(id) {
            Some(n) => n,
            None => continue,
        };
        if node.property("noexec").is_some() {
            debug!("skipping {} (noexec)", lop_tree.path_of(id));
            continue;
        }
        if is_under_conditional(lop_tree, id) {
            continue;
        }
        let kind = match kind_of(node) {
            Some(k) => k,
            None => continue,
        };
        dispatch(engine, lop_tree, id, kind)?;
    }
    Ok(())
}

fn is_under_conditional(lop_tree: &Tree, id: NodeId) -> bool {
    let parent = match lop_tree.get(id).and_then(|n| n.parent()) {
        Some(p) => p,
        None => return false,
    };
    lop_tree
        .get(parent)
        .and_then(kind_of)
        .map(|k| k == LopKind::Conditional)
        .unwrap_or(false)
}

/// Dispatches a single decoded lop node to its operation handler,
/// returning its truthiness (spec §4.4.2: only `code`/`xlate` lops can
/// return false; every other kind is unconditionally truthy). Also used
/// by [`conditional::execute`] to run `true*`/`false*` children outside
/// the top-level walk.
pub fn dispatch(engine: &mut Engine, lop_tree: &Tree, id: NodeId, kind: LopKind) -> Result<bool> {
    let path = lop_tree.path_of(id);
    debug!("dispatching {} as {:?}", path, kind);
    match kind {
        LopKind::Load => crate::lop::exec::load(engine, lop_tree, id),
        LopKind::AssistV1 => crate::lop::exec::assist_v1(engine, lop_tree, id),
        LopKind::Add => add::execute(engine, lop_tree, id),
        LopKind::Modify => modify::execute(engine, lop_tree, id),
        LopKind::Conditional => conditional::execute(engine, lop_tree, id),
        LopKind::Code | LopKind::Xlate => code::execute(engine, lop_tree, id, kind),
        LopKind::Output => output::execute(engine, lop_tree, id),
        LopKind::Tree => tree_extract::execute(engine, lop_tree, id),
        LopKind::Select => select::execute(engine, lop_tree, id),
        LopKind::Print => print::execute(engine, lop_tree, id),
        LopKind::Meta => meta::execute(engine, lop_tree, id),
        LopKind::Exec => exec::execute(engine, lop_tree, id),
    }
    .map_err(|e| match e {
        LopError::LopMalformed(_, _) => LopError::LopMalformed(path.clone(), e.to_string()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::property::Property;

    #[test]
    fn kind_of_reads_compatible_string() {
        let mut node = Node::new("modify-1", None);
        node.set_property(Property::string("compatible", "system-device-tree-v1,lop,modify"));
        assert_eq!(kind_of(&node), Some(LopKind::Modify));
    }

    #[test]
    fn noexec_nodes_are_skipped() {
        let mut tree = Tree::new();
        let root = tree.root();
        let mut lop = Node::new("modify-1", None);
        lop.set_property(Property::string("compatible", "system-device-tree-v1,lop,modify"));
        lop.set_property(Property::flag("noexec"));
        lop.set_property(Property::string("modify", "/nonexistent::"));
        tree.add_child(root, lop).unwrap();
        let mut engine = Engine::new(Tree::new(), crate::config::EngineConfig::default());
        run_file(&mut engine, &tree).unwrap();
    }
}
