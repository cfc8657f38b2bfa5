// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! [`Tree`], the mutable labelled tree described in spec §3/§4.1.
//!
//! Structurally this generalizes the teacher crate's `Tree<ID, TM>` (a
//! `HashMap<child_id, (parent_id, metadata)>` plus a `parent -> children`
//! index) from a generic CRDT triple-store into an arena of real
//! device-tree [`Node`]s keyed by [`NodeId`], with the extra path/label/
//! phandle indices and selection set spec §3 requires. A `Tree` value
//! serves equally as a main tree or a lop tree (spec §3: "a lop tree is
//! structurally identical to a main tree").

use std::collections::HashMap;

use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{LopError, Result};
use crate::node::{Node, NodeId};
use crate::phandle::PhandleDesc;
use crate::property::Property;
use crate::value::Value;

/// A tree-agnostic, fully-owned copy of a node and its descendants,
/// produced by [`Tree::deep_copy`] and consumed by [`Tree::graft`].
///
/// Per spec §4.1 ("deep-copy(n) ... with a fresh (deferred) phandle
/// allocation scope"), a `DetachedNode` still carries whatever phandle
/// its source node had; the *renumbering* (if the destination tree
/// already uses that value) only happens when it is grafted.
#[derive(Debug, Clone)]
pub struct DetachedNode {
    name: String,
    properties: IndexMap<String, Property>,
    labels: Vec<String>,
    phandle: Option<u32>,
    children: Vec<DetachedNode>,
}

impl DetachedNode {
    fn from_tree(tree: &Tree, id: NodeId) -> DetachedNode {
        let node = tree.node(id);
        let mut properties = IndexMap::new();
        for p in node.properties() {
            properties.insert(p.name().to_string(), p.clone());
        }
        DetachedNode {
            name: node.name().to_string(),
            properties,
            labels: node.labels().to_vec(),
            phandle: node.phandle(),
            children: node
                .children()
                .iter()
                .map(|&c| DetachedNode::from_tree(tree, c))
                .collect(),
        }
    }

    /// The name this fragment will take unless a graft overrides it.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A mutable, ordered, labelled tree of [`Node`]s (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    #[serde(skip)]
    path_index: HashMap<String, NodeId>,
    #[serde(skip)]
    label_index: HashMap<String, NodeId>,
    #[serde(skip)]
    phandle_index: HashMap<u32, NodeId>,
    #[serde(skip)]
    selection: Vec<NodeId>,
    /// Whether a dangling phandle reference is an error (true) or a
    /// warning (false). Spec §3.
    strict: bool,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a new tree with a single root node at `/`.
    pub fn new() -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(String::new(), None));
        let mut tree = Tree {
            nodes,
            root,
            next_id: 2,
            path_index: HashMap::new(),
            label_index: HashMap::new(),
            phandle_index: HashMap::new(),
            selection: Vec::new(),
            strict: false,
        };
        tree.sync();
        tree
    }

    /// The root node's id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether this tree raises `InvariantViolation` (vs. a warning) on
    /// a dangling phandle reference.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Sets the strict flag.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Looks up a node by id, panicking if it is not present. Only used
    /// internally where the id is known to have come from this tree's
    /// own indices in the same operation.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(&id)
            .expect("NodeId used after it was removed from this tree")
    }

    /// Borrows a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutably borrows a node by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// The absolute path of `id`, computed by walking parent links.
    pub fn path_of(&self, id: NodeId) -> String {
        if id == self.root {
            return "/".to_string();
        }
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(nid) = cur {
            if nid == self.root {
                break;
            }
            let node = self.node(nid);
            parts.push(node.name().to_string());
            cur = node.parent();
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    /// **lookup-by-path(p)** — spec §4.1.
    pub fn lookup_by_path(&self, path: &str) -> Option<NodeId> {
        self.path_index.get(path).copied()
    }

    /// **lookup-by-label(l)** — spec §4.1.
    pub fn lookup_by_label(&self, label: &str) -> Option<NodeId> {
        self.label_index.get(label).copied()
    }

    /// **pnode(phandle)** — spec §4.1.
    pub fn pnode(&self, phandle: u32) -> Option<NodeId> {
        self.phandle_index.get(&phandle).copied()
    }

    /// **subnodes(n)** — `n` followed by all its transitive descendants
    /// in pre-order. Spec §4.1.
    pub fn subnodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            if let Some(node) = self.nodes.get(&n) {
                for &c in node.children().iter().rev() {
                    stack.push(c);
                }
            }
        }
        out
    }

    /// All node ids in the tree, pre-order from the root.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.subnodes(self.root)
    }

    /// **nodes(regex)** — spec §4.1: if `regex` contains no `/`, it is
    /// implicitly prefixed with `.*`.
    pub fn nodes(&self, pattern: &str) -> Result<Vec<NodeId>> {
        let pattern = if pattern.contains('/') {
            pattern.to_string()
        } else {
            format!(".*{}", pattern)
        };
        let re = Regex::new(&pattern).map_err(|e| LopError::ParseFailure(e.to_string()))?;
        Ok(self
            .all_nodes()
            .into_iter()
            .filter(|&id| re.is_match(&self.path_of(id)))
            .collect())
    }

    /// **lnodes(regex)** — all nodes with a label matching `regex`.
    pub fn lnodes(&self, pattern: &str) -> Result<Vec<NodeId>> {
        let re = Regex::new(pattern).map_err(|e| LopError::ParseFailure(e.to_string()))?;
        Ok(self
            .all_nodes()
            .into_iter()
            .filter(|&id| {
                self.nodes
                    .get(&id)
                    .map(|n| n.labels().iter().any(|l| re.is_match(l)))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// **add(n)** — inserts a freshly built childless node under `parent`,
    /// failing if a child of that name already exists there.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId> {
        let parent_path = self.path_of(parent);
        let candidate_path = if parent_path == "/" {
            format!("/{}", node.name())
        } else {
            format!("{}/{}", parent_path, node.name())
        };
        if self.path_index.contains_key(&candidate_path) {
            return Err(LopError::InvariantViolation(format!(
                "path already occupied: {}",
                candidate_path
            )));
        }
        node.set_parent(Some(parent));
        let id = self.alloc_id();
        let labels = node.labels().to_vec();
        let phandle = node.phandle();
        self.nodes.insert(id, node);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.push_child(id);
        }
        self.path_index.insert(candidate_path, id);
        for label in labels {
            self.label_index.entry(label).or_insert(id);
        }
        if let Some(ph) = phandle {
            self.phandle_index.entry(ph).or_insert(id);
        }
        Ok(id)
    }

    /// **delete(n)** — removes `n` and its descendants; updates indices
    /// and the selection set. Spec §4.1/§8.
    pub fn delete(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(LopError::InvariantViolation(
                "cannot delete the root node".to_string(),
            ));
        }
        let children: Vec<NodeId> = self
            .nodes
            .get(&id)
            .map(|n| n.children().to_vec())
            .unwrap_or_default();
        for c in children {
            self.delete(c)?;
        }
        let path = self.path_of(id);
        if let Some(node) = self.nodes.remove(&id) {
            if let Some(parent_id) = node.parent() {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.remove_child(id);
                }
            }
            for label in node.labels() {
                if self.label_index.get(label) == Some(&id) {
                    self.label_index.remove(label);
                }
            }
            if let Some(ph) = node.phandle() {
                if self.phandle_index.get(&ph) == Some(&id) {
                    self.phandle_index.remove(&ph);
                }
            }
        }
        self.path_index.remove(&path);
        self.selection.retain(|s| *s != id);
        Ok(())
    }

    /// **deep-copy(n)** — spec §4.1.
    pub fn deep_copy(&self, id: NodeId) -> DetachedNode {
        DetachedNode::from_tree(self, id)
    }

    fn plan_phandle_remap(&self, node: &DetachedNode, remap: &mut HashMap<u32, u32>) {
        if let Some(old) = node.phandle {
            if old != 0
                && (self.phandle_index.contains_key(&old) || remap.values().any(|&v| v == old))
            {
                let new = self.next_free_phandle(remap);
                remap.insert(old, new);
            }
        }
        for c in &node.children {
            self.plan_phandle_remap(c, remap);
        }
    }

    fn next_free_phandle(&self, remap: &HashMap<u32, u32>) -> u32 {
        let mut candidate = self
            .phandle_index
            .keys()
            .copied()
            .chain(remap.values().copied())
            .max()
            .unwrap_or(0)
            + 1;
        while self.phandle_index.contains_key(&candidate) || remap.values().any(|&v| v == candidate)
        {
            candidate += 1;
        }
        candidate
    }

    fn rewrite_phandle_value(value: &Value, remap: &HashMap<u32, u32>) -> Value {
        match value {
            Value::Phandle(p) => Value::Phandle(*remap.get(p).unwrap_or(p)),
            Value::PhandleList(list) => {
                Value::PhandleList(list.iter().map(|p| *remap.get(p).unwrap_or(p)).collect())
            }
            other => other.clone(),
        }
    }

    fn graft_recursive(
        &mut self,
        parent: NodeId,
        name_override: Option<&str>,
        detached: &DetachedNode,
        remap: &HashMap<u32, u32>,
        phandle_desc: &PhandleDesc,
    ) -> Result<NodeId> {
        let name = name_override.unwrap_or(&detached.name);
        let mut node = Node::new(name.to_string(), Some(parent));
        for label in &detached.labels {
            node.add_label(label.clone());
        }
        let new_phandle = detached.phandle.map(|old| *remap.get(&old).unwrap_or(&old));
        node.set_phandle(new_phandle);
        for prop in detached.properties.values() {
            let mut cloned = prop.clone();
            let should_rewrite = phandle_desc.is_phandle_bearing(cloned.name())
                || matches!(cloned.value(), Value::Phandle(_) | Value::PhandleList(_));
            if should_rewrite {
                let rewritten = Self::rewrite_phandle_value(cloned.value(), remap);
                cloned.set_value(rewritten);
            }
            node.set_property(cloned);
        }
        let id = self.add_child(parent, node)?;
        for child in &detached.children {
            self.graft_recursive(id, None, child, remap, phandle_desc)?;
        }
        Ok(id)
    }

    /// **add(copy_of(n))** at a chosen path — grafts a [`DetachedNode`]
    /// fragment under `parent`, optionally renaming its root, and
    /// renumbering any phandle that collides with one already present in
    /// this tree (spec §4.1 "fresh (deferred) phandle allocation scope",
    /// §4.3). Phandle-bearing properties named in `phandle_desc`, or
    /// already typed `Phandle`/`PhandleList`, are rewritten to follow the
    /// renumbering.
    pub fn graft(
        &mut self,
        parent: NodeId,
        name_override: Option<&str>,
        detached: DetachedNode,
        phandle_desc: &PhandleDesc,
    ) -> Result<NodeId> {
        let mut remap = HashMap::new();
        self.plan_phandle_remap(&detached, &mut remap);
        self.graft_recursive(parent, name_override, &detached, &remap, phandle_desc)
    }

    /// Renames a node in place, deleting any node already occupying the
    /// destination path first (spec §4.4.1: "if destination path is
    /// occupied, the occupying node is deleted first").
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<()> {
        let parent = self
            .node(id)
            .parent()
            .ok_or_else(|| LopError::InvariantViolation("cannot rename the root node".to_string()))?;
        let parent_path = self.path_of(parent);
        let new_path = if parent_path == "/" {
            format!("/{}", new_name)
        } else {
            format!("{}/{}", parent_path, new_name)
        };
        if let Some(existing) = self.path_index.get(&new_path).copied() {
            if existing != id {
                self.delete(existing)?;
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_name(new_name);
        }
        self.sync();
        Ok(())
    }

    /// The transient selection set (spec §3/§4.2).
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Replaces the selection set.
    pub fn set_selection(&mut self, nodes: Vec<NodeId>) {
        self.selection = nodes;
    }

    /// Clears the selection set.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// **sync()** — rebuilds the path/label/phandle indices and marks
    /// every property's dirty bit clean. Spec §4.1.
    pub fn sync(&mut self) {
        let order = self.subnodes(self.root);
        let paths: Vec<(NodeId, String)> = order.iter().map(|&id| (id, self.path_of(id))).collect();
        self.path_index.clear();
        self.label_index.clear();
        self.phandle_index.clear();
        for (id, path) in paths {
            self.path_index.insert(path, id);
            if let Some(node) = self.nodes.get_mut(&id) {
                let labels = node.labels().to_vec();
                let phandle = node.phandle();
                for label in labels {
                    self.label_index.entry(label).or_insert(id);
                }
                if let Some(ph) = phandle {
                    self.phandle_index.entry(ph).or_insert(id);
                }
                for prop in node.properties_mut() {
                    prop.mark_clean();
                }
            }
        }
        self.selection.retain(|id| self.nodes.contains_key(id));
    }

    /// Checks every phandle-typed property value against `pnode`,
    /// returning the dangling ones. Used to enforce spec §3's phandle
    /// invariant under `strict`.
    pub fn dangling_phandles(&self) -> Vec<(NodeId, String, u32)> {
        let mut out = Vec::new();
        for id in self.all_nodes() {
            let node = self.node(id);
            for prop in node.properties() {
                let refs: Vec<u32> = match prop.value() {
                    Value::Phandle(p) => vec![*p],
                    Value::PhandleList(list) => list.clone(),
                    _ => Vec::new(),
                };
                for p in refs {
                    if p != 0 && self.pnode(p).is_none() {
                        out.push((id, prop.name().to_string(), p));
                    }
                }
            }
        }
        out
    }

    /// Validates the phandle invariant (spec §3/§8), warning or erroring
    /// depending on `strict()`.
    pub fn validate_phandles(&self) -> Result<()> {
        let dangling = self.dangling_phandles();
        if dangling.is_empty() {
            return Ok(());
        }
        for (id, prop, p) in &dangling {
            let msg = format!(
                "dangling phandle {} in property '{}' of node '{}'",
                p,
                prop,
                self.path_of(*id)
            );
            if self.strict {
                return Err(LopError::InvariantViolation(msg));
            }
            warn!("{}", msg);
        }
        Ok(())
    }

    /// **export()** — a neutral nested mapping suitable for round-tripping
    /// through an external flattened-tree codec. Spec §4.1.
    pub fn export(&self) -> serde_json::Value {
        self.export_node(self.root)
    }

    fn export_node(&self, id: NodeId) -> serde_json::Value {
        let node = self.node(id);
        let mut props = serde_json::Map::new();
        for p in node.properties() {
            props.insert(
                p.name().to_string(),
                serde_json::to_value(p.value()).unwrap_or(serde_json::Value::Null),
            );
        }
        let children: Vec<serde_json::Value> =
            node.children().iter().map(|&c| self.export_node(c)).collect();
        json!({
            "name": node.name(),
            "labels": node.labels(),
            "phandle": node.phandle(),
            "properties": props,
            "children": children,
        })
    }

    /// **load(dict)** — the inverse of [`Tree::export`].
    pub fn load(value: &serde_json::Value) -> Result<Tree> {
        let mut tree = Tree::new();
        let root = tree.root;
        Self::load_into(&mut tree, root, value)?;
        tree.sync();
        Ok(tree)
    }

    fn load_into(tree: &mut Tree, id: NodeId, value: &serde_json::Value) -> Result<()> {
        let obj = value
            .as_object()
            .ok_or_else(|| LopError::ParseFailure("expected a JSON object node".to_string()))?;

        if let Some(props) = obj.get("properties").and_then(|v| v.as_object()) {
            for (name, raw) in props {
                let parsed: Value = serde_json::from_value(raw.clone())?;
                if let Some(node) = tree.get_mut(id) {
                    node.set_property(Property::new(name.clone(), parsed));
                }
            }
        }
        if let Some(labels) = obj.get("labels").and_then(|v| v.as_array()) {
            for l in labels {
                if let Some(s) = l.as_str() {
                    if let Some(node) = tree.get_mut(id) {
                        node.add_label(s.to_string());
                    }
                }
            }
        }
        if let Some(ph) = obj.get("phandle").and_then(|v| v.as_u64()) {
            if let Some(node) = tree.get_mut(id) {
                node.set_phandle(Some(ph as u32));
            }
        }

        if let Some(children) = obj.get("children").and_then(|v| v.as_array()) {
            for child in children {
                let name = child
                    .get("name")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| LopError::ParseFailure("child node missing name".to_string()))?;
                let child_id = tree.add_child(id, Node::new(name.to_string(), None))?;
                Self::load_into(tree, child_id, child)?;
            }
        }
        Ok(())
    }
}
