// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! [`Engine`]: the single owner of a run's main tree, subtree table,
//! assist registry, and phandle-property metadata (spec §5: "Shared
//! resources ... are all owned exclusively by the engine instance").
//!
//! Modeled on the teacher's `TreeReplica`, which is likewise the one
//! value a caller holds and drives through a sequence of operations; here
//! the operations are lop directives instead of CRDT `OpMove`s.

use log::info;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::lop::assist::AssistRegistry;
use crate::lop::code::ScriptHost;
use crate::lop::interpreter;
use crate::lop::loader::{self, LopFile};
use crate::node::NodeId;
use crate::phandle::PhandleDesc;
use crate::subtree_table::SubtreeTable;
use crate::tree::Tree;

/// Owns everything a lop run touches: the main tree, the subtree table,
/// the assist registry, and the process-wide phandle-descriptor map
/// (spec §4.3, §5).
pub struct Engine {
    pub(crate) main: Tree,
    pub(crate) subtrees: SubtreeTable,
    pub(crate) assists: AssistRegistry,
    pub(crate) phandle_desc: PhandleDesc,
    pub(crate) config: EngineConfig,
    script_host: Option<Box<dyn ScriptHost>>,
    pending_exec_options: Vec<String>,
    bound_start_node: Option<NodeId>,
}

impl Engine {
    /// Creates an engine around an already-parsed main tree.
    pub fn new(main: Tree, config: EngineConfig) -> Self {
        Engine {
            main,
            subtrees: SubtreeTable::new(),
            assists: AssistRegistry::new(),
            phandle_desc: PhandleDesc::new(),
            config,
            script_host: None,
            pending_exec_options: Vec::new(),
            bound_start_node: None,
        }
    }

    /// Binds `node` as `start_node` for lops dispatched while the binding
    /// is live (spec §4.4.2: a `conditional`'s `true*`/`false*` children
    /// run "with `start_node` bound to the match").
    pub(crate) fn bind_start_node(&mut self, node: NodeId) {
        self.bound_start_node = Some(node);
    }

    /// Clears a `start_node` binding set by [`Engine::bind_start_node`].
    pub(crate) fn clear_start_node(&mut self) {
        self.bound_start_node = None;
    }

    /// The currently bound `start_node`, if any lop dispatch is running
    /// under one. Consulted by lops (e.g. `modify`) that accept a
    /// relative path.
    pub(crate) fn start_node(&self) -> Option<NodeId> {
        self.bound_start_node
    }

    /// Stashes `options` for the next lop dispatched via `exec` to pick up
    /// (spec §4.4 `exec` row: "options merge into the call's option map").
    /// Consumed (and cleared) by the dispatched lop, or by `run` once the
    /// dispatch returns, whichever comes first.
    pub(crate) fn set_pending_exec_options(&mut self, options: Vec<String>) {
        self.pending_exec_options = options;
    }

    /// Drains whatever `exec` staged for this dispatch, if any.
    pub(crate) fn take_pending_exec_options(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_exec_options)
    }

    /// Registers the embedder's script execution engine for `code`/`xlate`
    /// lops (spec §9).
    pub fn register_script_host(&mut self, host: Box<dyn ScriptHost>) {
        self.script_host = Some(host);
    }

    /// The registered script host, if any.
    pub fn script_host(&self) -> Option<&dyn ScriptHost> {
        self.script_host.as_deref()
    }

    /// The main tree.
    pub fn main(&self) -> &Tree {
        &self.main
    }

    /// The main tree, mutably. Callers outside the `lop` module should
    /// prefer driving mutation through `run` instead.
    pub fn main_mut(&mut self) -> &mut Tree {
        &mut self.main
    }

    /// The subtree table accumulated by `tree`/`output` lops.
    pub fn subtrees(&self) -> &SubtreeTable {
        &self.subtrees
    }

    /// The subtree table, mutably.
    pub fn subtrees_mut(&mut self) -> &mut SubtreeTable {
        &mut self.subtrees
    }

    /// The phandle-bearing-property registry (spec §4.3).
    pub fn phandle_desc(&self) -> &PhandleDesc {
        &self.phandle_desc
    }

    /// The phandle-bearing-property registry, mutably (populated by
    /// `meta` lops).
    pub fn phandle_desc_mut(&mut self) -> &mut PhandleDesc {
        &mut self.phandle_desc
    }

    /// The run's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The registered assist plug-ins.
    pub fn assists(&self) -> &AssistRegistry {
        &self.assists
    }

    /// Registers an in-process assist under `source`, standing in for
    /// the out-of-scope dynamic loader (spec §1, REDESIGN FLAGS).
    pub fn register_assist(&mut self, source: impl Into<String>, assist: Box<dyn crate::lop::assist::Assist>) {
        self.assists.register(source, assist);
    }

    /// Runs every lop tree in `files` to completion against this
    /// engine's main tree (spec §4.4: "Execution order").
    pub fn run(&mut self, files: Vec<LopFile>) -> Result<()> {
        let runqueue = loader::build_runqueue(files);
        for file in runqueue {
            info!(
                "running lop file (priority {}) with {} top-level nodes",
                file.priority,
                file.tree.get(file.tree.root()).map(|n| n.children().len()).unwrap_or(0)
            );
            interpreter::run_file(self, &file.tree)?;
        }
        self.main.sync();
        self.main.validate_phandles()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn new_engine_wraps_a_fresh_tree() {
        let engine = Engine::new(Tree::new(), EngineConfig::default());
        assert_eq!(engine.main().lookup_by_path("/"), Some(engine.main().root()));
    }

    #[test]
    fn run_with_no_lop_files_is_a_no_op() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.add_child(root, Node::new("amba", None)).unwrap();
        let mut engine = Engine::new(tree, EngineConfig::default());
        engine.run(Vec::new()).unwrap();
        assert!(engine.main().lookup_by_path("/amba").is_some());
    }
}
