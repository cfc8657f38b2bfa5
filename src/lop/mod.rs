// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The lop interpreter (spec §4.4): decodes each directive node's kind
//! from its `compatible` tag and dispatches to an operation handler.

pub mod add;
pub mod assist;
pub mod code;
pub mod conditional;
pub mod exec;
pub mod interpreter;
pub mod loader;
pub mod meta;
pub mod modify;
pub mod output;
pub mod print;
pub mod select;
pub mod tree_extract;

/// The operation a lop node encodes, decoded from its `compatible`
/// property (spec §4.4 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LopKind {
    /// Loads an external assist module.
    Load,
    /// Dispatches to compatible assists against a target node.
    AssistV1,
    /// Copies a subtree into the target tree.
    Add,
    /// Encodes a `path:prop:val` mutation.
    Modify,
    /// Branches on a property predicate.
    Conditional,
    /// Evaluates an embedded script body.
    Code,
    /// Like `code`, iterating over the selection set.
    Xlate,
    /// Emits a filtered copy of the tree to a file.
    Output,
    /// Stores a filtered copy of the tree in the subtree table.
    Tree,
    /// Updates the selection set.
    Select,
    /// Writes diagnostic output.
    Print,
    /// Registers phandle-property metadata.
    Meta,
    /// Indirects to another lop node via phandle.
    Exec,
}

impl LopKind {
    /// Decodes a lop's kind from its `compatible` value.
    ///
    /// SPEC_FULL.md §B: the match is `.*,lop,KIND.*`, a substring probe
    /// against the first `,lop,` segment, not a full-string equality
    /// test — a compound compatible like
    /// `system-device-tree-v1,lop,modify,special` still dispatches as
    /// `modify`.
    pub fn decode(compatible: &str) -> Option<LopKind> {
        let marker = ",lop,";
        let start = compatible.find(marker)? + marker.len();
        let rest = &compatible[start..];
        let kind = rest.split(',').next().unwrap_or(rest);
        match kind {
            "load" => Some(LopKind::Load),
            "assist-v1" => Some(LopKind::AssistV1),
            "add" => Some(LopKind::Add),
            "modify" => Some(LopKind::Modify),
            "conditional" => Some(LopKind::Conditional),
            "code" => Some(LopKind::Code),
            "xlate" => Some(LopKind::Xlate),
            "output" => Some(LopKind::Output),
            "tree" => Some(LopKind::Tree),
            "select" => Some(LopKind::Select),
            "print" => Some(LopKind::Print),
            "meta" => Some(LopKind::Meta),
            "exec" => Some(LopKind::Exec),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_exact_kind() {
        assert_eq!(
            LopKind::decode("system-device-tree-v1,lop,modify"),
            Some(LopKind::Modify)
        );
    }

    #[test]
    fn decodes_compound_compatible_by_prefix() {
        assert_eq!(
            LopKind::decode("system-device-tree-v1,lop,modify,special"),
            Some(LopKind::Modify)
        );
    }

    #[test]
    fn unknown_kind_is_none() {
        assert_eq!(LopKind::decode("system-device-tree-v1,lop,frobnicate"), None);
        assert_eq!(LopKind::decode("not-a-lop-at-all"), None);
    }
}
