// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! [`NodeId`] and [`Node`], the arena-indexed node type stored by
//! [`crate::tree::Tree`].
//!
//! The teacher crate represented a tree node as a `(parent_id, metadata)`
//! triple keyed by a caller-supplied `ID: TreeId`. Per REDESIGN FLAGS
//! ("cyclic parent/child references -> arena-backed tree with node-id
//! indices"), `NodeId` plays that same `ID` role here, but it is now
//! allocated by the tree itself rather than supplied by the caller, and
//! the "metadata" is a full device-tree node: name, properties, child
//! order, label(s), and an optional phandle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::property::Property;

/// Opaque, tree-local identifier for a node. Stable across mutation of
/// other nodes; invalidated only by deleting the node it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// The id reserved for "no node" (used as a null phandle target, and
    /// as a sentinel parent for the root).
    pub const NONE: NodeId = NodeId(0);
}

/// A node in the tree: a short name, an ordered map of properties, an
/// ordered list of children, optional label(s), an optional phandle, and
/// a parent link.
///
/// `parent` is `None` only for the root of a tree, matching spec §3
/// ("root's parent is absent").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    name: String,
    properties: IndexMap<String, Property>,
    children: Vec<NodeId>,
    labels: Vec<String>,
    phandle: Option<u32>,
    parent: Option<NodeId>,
}

impl Node {
    /// Creates a new, childless, unlabeled node with the given short name.
    pub fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            children: Vec::new(),
            labels: Vec::new(),
            phandle: None,
            parent,
        }
    }

    /// Short name (last path segment). The root's name is always empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames this node in place. Callers are responsible for updating
    /// the owning tree's path index (`Tree::sync` re-establishes it).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Parent node id, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Ordered list of this node's immediate children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, id: NodeId) {
        self.children.push(id);
    }

    pub(crate) fn remove_child(&mut self, id: NodeId) {
        self.children.retain(|c| *c != id);
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Properties in declaration order, mutably. Used by `Tree::sync()`
    /// to clear dirty bits after a rebuild.
    pub fn properties_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.properties.values_mut()
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Looks up a property by name, mutably.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }

    /// Inserts or replaces a property, preserving its original position
    /// on replace and appending on insert.
    pub fn set_property(&mut self, property: Property) {
        self.properties
            .insert(property.name().to_string(), property);
    }

    /// Removes a property by name, returning it if present.
    pub fn remove_property(&mut self, name: &str) -> Option<Property> {
        self.properties.shift_remove(name)
    }

    /// Properties whose name matches `predicate`, used by lops that
    /// select properties by a name pattern (e.g. `select_N`, `print_N`).
    pub fn properties_matching<'a>(
        &'a self,
        predicate: impl Fn(&str) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties
            .values()
            .filter(move |p| predicate(p.name()))
    }

    /// Symbolic labels attached to this node.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Adds a label, ignoring duplicates.
    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// This node's phandle, if it has been allocated one.
    pub fn phandle(&self) -> Option<u32> {
        self.phandle
    }

    /// Sets (or clears, with `None`) this node's phandle.
    pub fn set_phandle(&mut self, phandle: Option<u32>) {
        self.phandle = phandle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_round_trips_through_set_and_remove() {
        let mut n = Node::new("uart@0", None);
        n.set_property(Property::string("status", "okay"));
        assert_eq!(
            n.property("status").unwrap().value(),
            &crate::value::Value::Str("okay".into())
        );
        let removed = n.remove_property("status");
        assert!(removed.is_some());
        assert!(n.property("status").is_none());
    }

    #[test]
    fn labels_deduplicate() {
        let mut n = Node::new("cpu@0", None);
        n.add_label("cpu0");
        n.add_label("cpu0");
        assert_eq!(n.labels(), &["cpu0".to_string()]);
    }
}
