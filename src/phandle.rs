// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Phandle metadata (spec §4.3): which properties carry phandle
//! references, beyond the ones a [`crate::value::Value`] already tags as
//! `Phandle`/`PhandleList`.
//!
//! A source tree's properties are typed once, at parse time, from their
//! literal text; a bare `<&foo>` reference parses straight to
//! `Value::Phandle`. But some well-known properties (`interrupt-parent`,
//! `clocks`, ...) carry a phandle in a cell position the literal syntax
//! alone doesn't distinguish from a plain integer. The `meta` lop's
//! `phandle-desc` argument (spec §4.3) publishes that extra knowledge once
//! per run; [`PhandleDesc`] is where it lives.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The set of property names known to carry a phandle reference, beyond
/// whatever a property's own [`crate::value::Value`] variant already
/// says. Consulted by `Tree::graft` when deciding whether to rewrite a
/// property's value during phandle renumbering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhandleDesc {
    phandle_bearing: HashSet<String>,
}

impl PhandleDesc {
    /// An empty descriptor: only properties already typed
    /// `Value::Phandle`/`Value::PhandleList` are treated as phandle
    /// references.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as phandle-bearing, as published by a `meta` lop
    /// (spec §4.3).
    pub fn register(&mut self, name: impl Into<String>) {
        self.phandle_bearing.insert(name.into());
    }

    /// Whether `name` is known to carry a phandle reference.
    pub fn is_phandle_bearing(&self, name: &str) -> bool {
        self.phandle_bearing.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_property_is_not_phandle_bearing() {
        let desc = PhandleDesc::new();
        assert!(!desc.is_phandle_bearing("clocks"));
    }

    #[test]
    fn registered_property_is_phandle_bearing() {
        let mut desc = PhandleDesc::new();
        desc.register("clocks");
        assert!(desc.is_phandle_bearing("clocks"));
        assert!(!desc.is_phandle_bearing("status"));
    }
}
