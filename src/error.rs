// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Error kinds produced by the lop engine.
//!
//! The variants mirror the error-kind taxonomy of the engine's design: a
//! small fail-fast set for configuration/structural problems, and a
//! best-effort set for conditions encountered while a single operation
//! body runs (most of those are logged as warnings and only become
//! `LopError` values when `werror` is set).

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the engine's public operations.
#[derive(Debug, Error)]
pub enum LopError {
    /// A required input file (main tree source, or an auxiliary lop file)
    /// could not be found or opened.
    #[error("missing input: {0}")]
    MissingInput(PathBuf),

    /// An external compiler (`dtc`/`cpp`) invocation failed.
    #[error("compile failure: {0}")]
    CompileFailure(String),

    /// A source file could not be parsed into a tree.
    #[error("parse failure: {0}")]
    ParseFailure(String),

    /// A structural invariant of the tree model was violated, e.g. an
    /// unresolved phandle while the owning tree is in `strict` mode.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A lop node was missing a property required by its kind, or its
    /// `compatible` did not resolve to a known kind.
    #[error("malformed lop at {0}: {1}")]
    LopMalformed(String, String),

    /// An assist module could not be registered.
    #[error("assist load failure: {0}")]
    AssistLoadFailure(String),

    /// An assist callback failed or returned false under `werror`.
    #[error("assist runtime failure: {0}")]
    AssistRuntimeFailure(String),

    /// The requested output path already exists and `force` was not set.
    #[error("output already exists (use force to overwrite): {}", .0.display())]
    OutputExistsNoForce(PathBuf),

    /// Wraps an I/O failure encountered while reading/writing a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wraps a YAML (de)serialization failure.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wraps a JSON (de)serialization failure, used for the neutral
    /// export/load mapping.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, LopError>;
