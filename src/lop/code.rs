// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `code`/`xlate` lops (spec §4.4): evaluates an embedded script
//! body against a context node. Per REDESIGN FLAGS, script execution
//! itself is an out-of-core capability; this module supplies the stable
//! context object (tree, current node, selection set, options) and
//! honors whatever truthiness a registered [`ScriptHost`] returns.

use log::warn;

use crate::engine::Engine;
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

use super::LopKind;

/// The stable context object handed to a [`ScriptHost`] (REDESIGN FLAGS:
/// "the engine exposes a stable context object (tree, current node,
/// selection set, options, helper library surface)").
pub struct ScriptContext<'a> {
    /// The main tree the script runs against.
    pub tree: &'a Tree,
    /// The node currently bound as the script's subject.
    pub node: NodeId,
    /// The tree's selection set at the time of the call.
    pub selection: &'a [NodeId],
    /// The lop's `code` property body.
    pub code: &'a str,
    /// The lop's `options` property entries.
    pub options: &'a [String],
}

/// An external script execution engine, pluggable by embedders (spec §9
/// "Embedded script execution (`code` lop)").
pub trait ScriptHost: std::fmt::Debug {
    /// Evaluates `ctx.code` and returns its truthiness.
    fn eval(&self, ctx: &ScriptContext) -> Result<bool>;
}

fn code_and_options(node: &crate::node::Node) -> (String, Vec<String>) {
    let code = match node.property("code").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => String::new(),
    };
    let options = match node.property("options").map(|p| p.value()) {
        Some(Value::StrList(list)) => list.clone(),
        Some(Value::Str(s)) => vec![s.clone()],
        _ => Vec::new(),
    };
    (code, options)
}

/// Executes a `code` or `xlate` lop. With no [`ScriptHost`] registered,
/// this is a permissive no-op (truthy with a warning), since script
/// execution is out-of-core capability rather than a structural failure.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId, kind: LopKind) -> Result<bool> {
    let node = match lop_tree.get(id) {
        Some(n) => n,
        None => return Ok(true),
    };
    let (code, mut options) = code_and_options(node);
    options.extend(engine.take_pending_exec_options());

    let host = match engine.script_host() {
        Some(h) => h,
        None => {
            warn!("no ScriptHost registered; skipping code body at {}", lop_tree.path_of(id));
            return Ok(true);
        }
    };

    let selection = engine.main().selection().to_vec();
    let subjects: Vec<NodeId> = match kind {
        LopKind::Xlate => selection.clone(),
        _ => vec![selection.first().copied().unwrap_or_else(|| engine.main().root())],
    };

    let mut result = true;
    for subject in subjects {
        let ctx = ScriptContext {
            tree: engine.main(),
            node: subject,
            selection: &selection,
            code: &code,
            options: &options,
        };
        if !host.eval(&ctx)? {
            result = false;
            break;
        }
    }
    Ok(result)
}
