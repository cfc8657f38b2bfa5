// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The binary flattened-device-tree boundary (spec §1: "the mapping
//! between the tree model and flattened form is in scope; bit-level
//! layout is the external format's concern").
//!
//! This crate models the codec as a trait rather than shipping a bit-level
//! FDT (de)serializer; `Tree::export`/`Tree::load` already provide the
//! neutral mapping a concrete codec would marshal to/from bytes.

use std::path::Path;

use crate::error::{LopError, Result};
use crate::tree::Tree;

/// An external flattened-device-tree encoder/decoder. Not implemented by
/// this crate (spec §1 Out of scope); embedders plug in a concrete
/// codec (e.g. wrapping `dtc`, or a pure-Rust FDT reader) by implementing
/// this trait and driving `Tree::export`/`Tree::load` themselves.
pub trait FdtCodec {
    /// Serializes `tree`'s neutral mapping into flattened-device-tree
    /// bytes.
    fn encode(&self, tree: &Tree) -> Result<Vec<u8>>;

    /// Parses flattened-device-tree bytes into a tree's neutral mapping.
    fn decode(&self, bytes: &[u8]) -> Result<Tree>;
}

/// Writes `tree` as a `.dtb` file. No in-process codec is bundled with
/// this crate, so this always reports a [`LopError::CompileFailure`]
/// unless an embedder routes `.dtb` output through its own [`FdtCodec`]
/// ahead of calling into `format::write`.
pub fn write(_tree: &Tree, path: &Path) -> Result<()> {
    Err(LopError::CompileFailure(format!(
        "no FdtCodec linked in this build; cannot write {}",
        path.display()
    )))
}

/// Reads a `.dtb` file. See [`write`] for why this is unimplemented by
/// default.
pub fn read(path: &Path) -> Result<Tree> {
    Err(LopError::CompileFailure(format!(
        "no FdtCodec linked in this build; cannot read {}",
        path.display()
    )))
}
