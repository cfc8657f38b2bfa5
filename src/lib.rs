// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! A System Device Tree lop transformation engine: loads a hierarchical
//! hardware description, applies an ordered pipeline of rewrite
//! directives ("lops") authored as auxiliary trees, and emits the
//! modified tree in one of several formats.
//!
//! The three tightly coupled subsystems are [`tree`] (the mutable,
//! ordered, labelled tree model), [`lop`] (the directive interpreter),
//! and [`selector`] (the node-selection sublanguage lop directives drive
//! through). [`engine::Engine`] is the single value that owns a run's
//! main tree, subtree table, assist registry, and phandle metadata.
#![deny(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod lop;
pub mod node;
pub mod phandle;
pub mod property;
pub mod selector;
pub mod subtree_table;
pub mod tree;
pub mod value;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{LopError, Result};
pub use lop::loader::LopFile;
pub use node::{Node, NodeId};
pub use property::Property;
pub use tree::Tree;
pub use value::Value;
