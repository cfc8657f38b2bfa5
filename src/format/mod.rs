// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Output format dispatch (spec §6): `.dtb` via an external codec,
//! `.dts` textual emission, `.yaml` serialization, anything else routed
//! through the assist dispatch mechanism.

pub mod dtb;
pub mod dts;
pub mod yaml;

use std::path::Path;

use crate::engine::Engine;
use crate::error::{LopError, Result};
use crate::lop::assist::AssistOptions;
use crate::tree::Tree;

/// Writes `tree` to `path`, choosing a format by `path`'s extension
/// (spec §6 "Output files").
pub fn write(engine: &mut Engine, tree: &Tree, path: &Path) -> Result<()> {
    if path.exists() && !engine.config().force {
        return Err(LopError::OutputExistsNoForce(path.to_path_buf()));
    }
    if engine.config().dryrun {
        return Ok(());
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("dtb") => dtb::write(tree, path),
        Some("dts") => dts::write(tree, path, engine.config().enhanced),
        Some("yaml") | Some("yml") => yaml::write(tree, path),
        Some(other) => write_via_assist(engine, tree, path, other),
        None => Err(LopError::CompileFailure(format!(
            "cannot infer output format: {}",
            path.display()
        ))),
    }
}

fn write_via_assist(engine: &mut Engine, tree: &Tree, path: &Path, extension: &str) -> Result<()> {
    let assist = engine
        .assists()
        .find_by_extension(extension)
        .ok_or_else(|| {
            LopError::AssistLoadFailure(format!(
                "no assist registered for output extension '{}'",
                extension
            ))
        })?;
    let _ = assist;
    let options = AssistOptions {
        verbose: engine.config().verbosity,
        args: vec![path.display().to_string()],
    };
    let root = tree.root();
    crate::lop::assist::invoke_compatible(engine, root, None, Some(extension), &options)
}
