// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! [`Property`], a named, typed value attached to a [`crate::node::Node`].

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A single node property: a name plus an inferred, typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    name: String,
    value: Value,
    /// Set once a deep-copy or output pass has rewritten any phandle this
    /// property carries. Mirrors the tree's `sync()` dirty-bit contract in
    /// spec §4.1: cleared by `sync`, set by any mutation.
    dirty: bool,
}

impl Property {
    /// Creates a new property, inferring its type from `value` immediately
    /// (spec §3 allows lazy inference; this implementation infers eagerly
    /// at construction since every call site already has a concrete
    /// `Value`).
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            dirty: true,
        }
    }

    /// Creates an empty (flag) property.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, Value::Empty)
    }

    /// Creates a string property.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Value::Str(value.into()))
    }

    /// Creates a single u32 property.
    pub fn u32(name: impl Into<String>, value: u32) -> Self {
        Self::new(name, Value::U32(value))
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference to the typed value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replaces the value, marking the property dirty.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.dirty = true;
    }

    /// Whether this property has been touched since the last `sync()`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty bit; called by `Tree::sync()`.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Compares this property's value against `other`'s, per spec §4.2
    /// ("property comparison uses the property's inferred type; for
    /// lists, equality is set-membership of the literal value"). Used by
    /// the `conditional` lop (spec §4.4.2), which compares two live
    /// properties rather than a property against a literal string.
    pub fn compare(&self, other: &Property) -> bool {
        self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_property_is_dirty() {
        let p = Property::string("status", "okay");
        assert!(p.is_dirty());
    }

    #[test]
    fn sync_clears_dirty() {
        let mut p = Property::string("status", "okay");
        p.mark_clean();
        assert!(!p.is_dirty());
        p.set_value(Value::Str("disabled".into()));
        assert!(p.is_dirty());
    }

    #[test]
    fn compare_equal_values() {
        let a = Property::u32("foo", 1);
        let b = Property::u32("foo", 1);
        assert!(a.compare(&b));
    }
}
