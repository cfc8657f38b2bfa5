// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Lop loading and runqueue construction (spec §2/§4.4): "The loader
//! buckets lop trees into a priority runqueue (1 highest first)."

use crate::tree::Tree;

/// Default priority for a lop tree whose root carries no `priority`
/// property (spec §3: "declares a `priority` (1-9, default 5)").
pub const DEFAULT_PRIORITY: u8 = 5;

/// One parsed lop tree plus its file-level priority.
pub struct LopFile {
    /// The parsed lop tree (spec §3: "structurally identical to a main
    /// tree").
    pub tree: Tree,
    /// 1 (earliest) through 9 (latest).
    pub priority: u8,
}

impl LopFile {
    /// Wraps a parsed tree with an explicit priority.
    pub fn new(tree: Tree, priority: u8) -> Self {
        LopFile { tree, priority }
    }

    /// Reads `priority` off the tree's root node, falling back to
    /// [`DEFAULT_PRIORITY`].
    pub fn from_tree(tree: Tree) -> Self {
        let priority = tree
            .get(tree.root())
            .and_then(|root| root.property("priority"))
            .and_then(|p| p.value().as_phandle())
            .map(|p| p as u8)
            .filter(|p| (1..=9).contains(p))
            .unwrap_or(DEFAULT_PRIORITY);
        LopFile { tree, priority }
    }
}

/// Buckets `files` by priority (ascending: 1 runs first, per spec §8
/// scenario 6), preserving each bucket's original relative order.
pub fn build_runqueue(mut files: Vec<LopFile>) -> Vec<LopFile> {
    files.sort_by_key(|f| f.priority);
    files
}
