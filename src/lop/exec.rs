// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `exec` lop, and the `load`/`assist-v1` handlers (spec §4.4/§4.5).
//!
//! `exec` indirects to another lop node via a phandle, merging its
//! `options` into the call (SPEC_FULL.md §B pins the `"key:value"`
//! string-list encoding for the merge, since spec.md left it unstated).

use log::{info, warn};

use crate::engine::Engine;
use crate::error::{LopError, Result};
use crate::lop::assist::{self, AssistOptions};
use crate::lop::interpreter::{self, kind_of};
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

fn string_list_options(node: &crate::node::Node) -> Vec<String> {
    match node.property("options").map(|p| p.value()) {
        Some(Value::StrList(list)) => list.clone(),
        Some(Value::Str(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Executes an `exec` lop: follows the `exec` phandle to another lop
/// node in the same lop tree and dispatches it, with `options` merged in
/// (honored by the `assist-v1`/`code` targets that read options; other
/// kinds ignore them).
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let path_for_err = lop_tree.path_of(id);
    let node = lop_tree
        .get(id)
        .ok_or_else(|| LopError::LopMalformed(path_for_err.clone(), "lop node disappeared".to_string()))?;

    let phandle = match node.property("exec").map(|p| p.value()) {
        Some(Value::Phandle(p)) => *p,
        Some(Value::U32(n)) => *n,
        _ => {
            return Err(LopError::LopMalformed(
                path_for_err,
                "missing 'exec' phandle property".to_string(),
            ))
        }
    };

    let target = lop_tree.pnode(phandle).ok_or_else(|| {
        LopError::InvariantViolation(format!("exec target phandle {} not found", phandle))
    })?;
    let kind = kind_of(lop_tree.get(target).ok_or_else(|| {
        LopError::LopMalformed(path_for_err.clone(), "exec target node disappeared".to_string())
    })?)
    .ok_or_else(|| LopError::LopMalformed(lop_tree.path_of(target), "target has no recognized lop kind".to_string()))?;

    let merged_options = string_list_options(node);
    if !merged_options.is_empty() {
        info!("exec merging {} option(s) into {}", merged_options.len(), lop_tree.path_of(target));
        engine.set_pending_exec_options(merged_options);
    }

    let result = interpreter::dispatch(engine, lop_tree, target, kind);
    engine.take_pending_exec_options();
    result
}

/// Executes a `load` lop (spec §4.4 table): validates that an assist has
/// already been registered under the requested source, since the
/// dynamic loader itself is out of scope (spec §1).
pub fn load(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let path_for_err = lop_tree.path_of(id);
    let node = lop_tree
        .get(id)
        .ok_or_else(|| LopError::LopMalformed(path_for_err.clone(), "lop node disappeared".to_string()))?;
    let source = match node.property("load").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => {
            return Err(LopError::LopMalformed(
                path_for_err,
                "missing 'load' property".to_string(),
            ))
        }
    };

    if engine.assists().contains(&source) {
        info!("assist '{}' already registered", source);
        return Ok(true);
    }
    if engine.config().permissive {
        warn!("assist '{}' not registered in this run; continuing (permissive)", source);
        Ok(true)
    } else {
        Err(LopError::AssistLoadFailure(source))
    }
}

/// Executes an `assist-v1` lop (spec §4.4/§4.5): resolves the target
/// node and invokes every compatible registered assist.
pub fn assist_v1(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let path_for_err = lop_tree.path_of(id);
    let node = lop_tree
        .get(id)
        .ok_or_else(|| LopError::LopMalformed(path_for_err.clone(), "lop node disappeared".to_string()))?;

    let target_path = match node.property("node").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => {
            return Err(LopError::LopMalformed(
                path_for_err,
                "missing 'node' property".to_string(),
            ))
        }
    };
    let target = engine.main().lookup_by_path(&target_path).ok_or_else(|| {
        LopError::InvariantViolation(format!("assist-v1 target node not found: {}", target_path))
    })?;

    let id_filter = match node.property("id").map(|p| p.value()) {
        Some(Value::Str(s)) => Some(s.clone()),
        _ => None,
    };
    let mask = match node.property("mask").map(|p| p.value()) {
        Some(Value::Str(s)) => Some(s.clone()),
        _ => None,
    };
    let mut args = string_list_options(node);
    args.extend(engine.take_pending_exec_options());
    let options = AssistOptions {
        verbose: engine.config().verbosity,
        args,
    };

    assist::invoke_compatible(engine, target, id_filter.as_deref(), mask.as_deref(), &options)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::EngineConfig;
    use crate::lop::code::{ScriptContext, ScriptHost};
    use crate::node::Node;
    use crate::property::Property;

    #[derive(Debug)]
    struct RecordingHost {
        seen_options: Rc<RefCell<Vec<String>>>,
    }

    impl ScriptHost for RecordingHost {
        fn eval(&self, ctx: &ScriptContext) -> Result<bool> {
            self.seen_options.borrow_mut().extend(ctx.options.iter().cloned());
            Ok(true)
        }
    }

    #[test]
    fn exec_merges_options_into_the_target_code_lop() {
        let mut lop_tree = Tree::new();
        let root = lop_tree.root();

        let mut target = Node::new("inner-code", None);
        target.set_property(Property::string("compatible", "system-device-tree-v1,lop,code"));
        target.set_property(Property::string("code", "noop"));
        target.set_property(Property::flag("noexec"));
        target.set_property(Property::new(
            "options",
            Value::StrList(vec!["own:1".to_string()]),
        ));
        let target_id = lop_tree.add_child(root, target).unwrap();
        lop_tree.get_mut(target_id).unwrap().set_phandle(Some(5));

        let mut caller = Node::new("call-it", None);
        caller.set_property(Property::string("compatible", "system-device-tree-v1,lop,exec"));
        caller.set_property(Property::new("exec", Value::Phandle(5)));
        caller.set_property(Property::new(
            "options",
            Value::StrList(vec!["merged:2".to_string()]),
        ));
        lop_tree.add_child(root, caller).unwrap();
        lop_tree.sync();

        let mut engine = Engine::new(Tree::new(), EngineConfig::default());
        let seen_options = Rc::new(RefCell::new(Vec::new()));
        engine.register_script_host(Box::new(RecordingHost {
            seen_options: seen_options.clone(),
        }));

        interpreter::run_file(&mut engine, &lop_tree).unwrap();

        assert!(seen_options.borrow().contains(&"own:1".to_string()));
        assert!(seen_options.borrow().contains(&"merged:2".to_string()));
    }
}
