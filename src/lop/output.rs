// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The `output` lop (spec §4.4/§6): emits a filtered copy of the tree to
//! a file, format chosen by the `outfile` extension.

use std::path::PathBuf;

use crate::engine::Engine;
use crate::error::{LopError, Result};
use crate::format;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::Value;

fn node_list(node: &crate::node::Node) -> Vec<String> {
    match node.property("nodes").map(|p| p.value()) {
        Some(Value::StrList(list)) => list.clone(),
        Some(Value::Str(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Executes an `output` lop against the engine's main tree. Always
/// truthy.
pub fn execute(engine: &mut Engine, lop_tree: &Tree, id: NodeId) -> Result<bool> {
    let path_for_err = lop_tree.path_of(id);
    let lop = lop_tree
        .get(id)
        .ok_or_else(|| LopError::LopMalformed(path_for_err.clone(), "lop node disappeared".to_string()))?;

    let outfile = match lop.property("outfile").map(|p| p.value()) {
        Some(Value::Str(s)) => s.clone(),
        _ => {
            return Err(LopError::LopMalformed(
                path_for_err,
                "missing 'outfile' property".to_string(),
            ))
        }
    };

    let paths = node_list(lop);
    let filtered = if paths.is_empty() {
        engine.main().clone()
    } else {
        crate::lop::tree_extract::extract(engine, &paths)
    };

    let mut resolved = PathBuf::from(&outfile);
    if resolved.is_relative() {
        if let Some(dir) = &engine.config().output_dir {
            resolved = dir.join(resolved);
        }
    }

    format::write(engine, &filtered, &resolved)?;
    Ok(true)
}
