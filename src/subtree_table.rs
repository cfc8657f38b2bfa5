// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! [`SubtreeTable`] (spec §3): a named side-channel of trees extracted
//! from the main tree by the `tree` lop (spec §4.4), operable by
//! subsequent lops in place of the main tree.

use indexmap::IndexMap;

use crate::tree::Tree;

/// Maps user-chosen names to detached [`Tree`] values.
#[derive(Debug, Clone, Default)]
pub struct SubtreeTable {
    trees: IndexMap<String, Tree>,
}

impl SubtreeTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) the tree named `name`.
    pub fn insert(&mut self, name: impl Into<String>, tree: Tree) {
        self.trees.insert(name.into(), tree);
    }

    /// Borrows the tree named `name`.
    pub fn get(&self, name: &str) -> Option<&Tree> {
        self.trees.get(name)
    }

    /// Mutably borrows the tree named `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tree> {
        self.trees.get_mut(name)
    }

    /// Names currently registered, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_round_trip() {
        let mut table = SubtreeTable::new();
        table.insert("chosen-only", Tree::new());
        assert!(table.get("chosen-only").is_some());
        assert!(table.get("missing").is_none());
    }
}
