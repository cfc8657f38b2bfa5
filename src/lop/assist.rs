// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Assist dispatch (spec §4.5): a trait/registry standing in for the
//! source tool's dynamically loaded plug-in modules, per REDESIGN FLAGS
//! ("dynamic assist modules loaded by path -> a trait/interface ...
//! discovered via a language-appropriate plug-in mechanism"). This crate
//! uses an in-process registry: embedders register `Box<dyn Assist>`
//! values keyed by the same "source" string the source tool used as a
//! file path, and the engine probes them exactly as spec §4.5 describes.

use std::fmt;

use log::warn;

use crate::engine::Engine;
use crate::error::Result;
use crate::node::{Node, NodeId};

/// Options passed to an invoked assist (spec §4.5: `{verbose, args}`).
#[derive(Debug, Clone, Default)]
pub struct AssistOptions {
    /// Verbosity level forwarded from the run's `EngineConfig`.
    pub verbose: u8,
    /// Free-form argument strings, as collected from the lop's `options`
    /// property or `-a`/CLI-style trailing arguments.
    pub args: Vec<String>,
}

/// An externally provided plug-in, probed and invoked per spec §4.5.
pub trait Assist: fmt::Debug {
    /// Probes whether this assist can handle `node` under the given
    /// compatibility `id`. A `false` return means "not compatible".
    fn is_compat(&self, node: &Node, id: &str) -> bool;

    /// Optional stable identifier used as the `id` argument of
    /// `assist-v1` lops and of `find_compatible_assist`.
    fn id(&self) -> Option<&str> {
        None
    }

    /// Optional file-extension mask this assist handles (used by output
    /// dispatch for non-native extensions, and by `assist-v1`'s `mask`).
    fn file_ext(&self) -> Option<&str> {
        None
    }

    /// Optional set of property names this assist consumes from the
    /// lop node that invoked it; informative only.
    fn props(&self) -> Vec<String> {
        Vec::new()
    }

    /// Invokes the assist against `target`. Returning `Ok(false)` is a
    /// warning (spec §4.5); returning `Err` is always fatal.
    fn invoke(
        &self,
        target: NodeId,
        engine: &mut Engine,
        options: &AssistOptions,
    ) -> Result<bool>;
}

/// The engine's registry of loaded assists, deduplicated by source.
#[derive(Default)]
pub struct AssistRegistry {
    entries: Vec<(String, Box<dyn Assist>)>,
}

impl fmt::Debug for AssistRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistRegistry")
            .field("sources", &self.entries.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

impl Clone for AssistRegistry {
    fn clone(&self) -> Self {
        // Assists are process-supplied plug-ins, not tree data; a clone
        // of the owning `Engine` starts with an empty registry rather
        // than attempting to duplicate trait objects.
        AssistRegistry::default()
    }
}

impl AssistRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the assist known by `source`, mirroring
    /// the source tool's dedup-by-file-path behavior for `load` lops.
    pub fn register(&mut self, source: impl Into<String>, assist: Box<dyn Assist>) {
        let source = source.into();
        if let Some(slot) = self.entries.iter_mut().find(|(s, _)| *s == source) {
            slot.1 = assist;
        } else {
            self.entries.push((source, assist));
        }
    }

    /// Whether an assist is already registered under `source`.
    pub fn contains(&self, source: &str) -> bool {
        self.entries.iter().any(|(s, _)| s == source)
    }

    /// `find_compatible_assist(node, id, mask)` (spec §4.5): a mask is
    /// only enforced when both caller and assist declare one
    /// (SPEC_FULL.md §B).
    pub fn find_compatible(
        &self,
        node: &Node,
        id: Option<&str>,
        mask: Option<&str>,
    ) -> Vec<&dyn Assist> {
        let mut out = Vec::new();
        for (_, assist) in &self.entries {
            if let (Some(caller_mask), Some(assist_mask)) = (mask, assist.file_ext()) {
                if caller_mask != assist_mask {
                    continue;
                }
            }
            let probe_id = id.unwrap_or_default();
            if assist.is_compat(node, probe_id) {
                out.push(assist.as_ref());
            }
        }
        out
    }

    /// Finds the first assist whose declared `file_ext` equals
    /// `extension`, used by output dispatch for non-native extensions.
    pub fn find_by_extension(&self, extension: &str) -> Option<&dyn Assist> {
        self.entries
            .iter()
            .map(|(_, a)| a.as_ref())
            .find(|a| a.file_ext() == Some(extension))
    }
}

/// Invokes every assist `find_compatible` returns, honoring spec §4.5's
/// "each returned callable is invoked ... a false return is a warning
/// (error under `werror`)" policy.
pub fn invoke_compatible(
    engine: &mut Engine,
    target: NodeId,
    id: Option<&str>,
    mask: Option<&str>,
    options: &AssistOptions,
) -> Result<()> {
    // The registry is taken out of the engine so each assist's `invoke`
    // can borrow `engine` mutably without aliasing the entry it was
    // fetched from; it is restored once every candidate has run.
    let mut entries = std::mem::take(&mut engine.assists).entries;
    let node = match engine.main.get(target) {
        Some(n) => n.clone(),
        None => {
            engine.assists.entries = entries;
            return Ok(());
        }
    };

    let mut result = Ok(());
    for (source, assist) in entries.drain(..) {
        let is_match = match (mask, assist.file_ext()) {
            (Some(caller_mask), Some(assist_mask)) if caller_mask != assist_mask => false,
            _ => assist.is_compat(&node, id.unwrap_or_default()),
        };
        if is_match && result.is_ok() {
            match assist.invoke(target, engine, options) {
                Ok(true) => {}
                Ok(false) => {
                    let msg = format!("assist returned false for node {:?}", target);
                    if engine.config.werror {
                        result = Err(crate::error::LopError::AssistRuntimeFailure(msg));
                    } else {
                        warn!("{}", msg);
                    }
                }
                Err(e) => result = Err(e),
            }
        }
        engine.assists.entries.push((source, assist));
    }
    result
}
