// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The selector sublanguage (spec §4.2): `PATH_REGEX[:PROPNAME[:PROPVAL]]`
//! expressions, as found in a selector lop's `select_N` properties.

use regex::Regex;

use crate::error::{LopError, Result};
use crate::node::NodeId;
use crate::tree::Tree;

/// A parsed predicate against a node's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    /// No predicate: every candidate node passes.
    None,
    /// Property must be present.
    Present(String),
    /// Property must be absent.
    Absent(String),
    /// Property must compare equal (or, if `negate`, unequal) to `value`.
    Equals {
        name: String,
        value: String,
        negate: bool,
    },
}

/// One parsed `select_N` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// A `select_N = ""` clause: clears the selection set.
    Clear,
    /// Empty path, nonempty predicate: AND-filter the existing selection.
    FilterSelection(Predicate),
    /// Nonempty path, no predicate: add regex matches to the candidate pool.
    AddMatches(String),
    /// Nonempty path and predicate: add regex matches that also satisfy
    /// the predicate.
    AddMatchesFiltered(String, Predicate),
}

impl Clause {
    /// Parses one `select_N` value into a [`Clause`], per spec §4.2.
    pub fn parse(raw: &str) -> Clause {
        if raw.is_empty() {
            return Clause::Clear;
        }
        let mut parts = raw.splitn(3, ':');
        let path = parts.next().unwrap_or("");
        let prop = parts.next();
        let val = parts.next();

        let predicate = match prop {
            None => Predicate::None,
            Some(p) if p.is_empty() => Predicate::None,
            Some(p) => {
                if let Some(name) = p.strip_prefix('!') {
                    if val.map(|v| v.is_empty()).unwrap_or(true) {
                        Predicate::Absent(name.to_string())
                    } else {
                        let v = val.unwrap();
                        let (negate, v) = strip_negation(v);
                        Predicate::Equals {
                            name: name.to_string(),
                            value: v.to_string(),
                            negate,
                        }
                    }
                } else {
                    match val {
                        None => Predicate::Present(p.to_string()),
                        Some(v) if v.is_empty() => Predicate::Present(p.to_string()),
                        Some(v) => {
                            let (negate, v) = strip_negation(v);
                            Predicate::Equals {
                                name: p.to_string(),
                                value: v.to_string(),
                                negate,
                            }
                        }
                    }
                }
            }
        };

        match (path.is_empty(), predicate.clone()) {
            (true, Predicate::None) => Clause::Clear,
            (true, pred) => Clause::FilterSelection(pred),
            (false, Predicate::None) => Clause::AddMatches(path.to_string()),
            (false, pred) => Clause::AddMatchesFiltered(path.to_string(), pred),
        }
    }
}

fn strip_negation(v: &str) -> (bool, &str) {
    match v.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, v),
    }
}

fn predicate_matches(tree: &Tree, id: NodeId, predicate: &Predicate) -> bool {
    let node = match tree.get(id) {
        Some(n) => n,
        None => return false,
    };
    match predicate {
        Predicate::None => true,
        Predicate::Present(name) => node.property(name).is_some(),
        Predicate::Absent(name) => node.property(name).is_none(),
        Predicate::Equals { name, value, negate } => {
            let matched = node
                .property(name)
                .map(|p| p.value().matches_literal(value))
                .unwrap_or(false);
            matched != *negate
        }
    }
}

/// Evaluates an ordered sequence of `select_N` clauses against `tree`,
/// starting from `tree`'s current selection set, and returns the resulting
/// selection (spec §4.2/§8).
pub fn evaluate(tree: &Tree, clauses: &[String]) -> Result<Vec<NodeId>> {
    let mut selection: Vec<NodeId> = tree.selection().to_vec();
    let mut pool: Vec<NodeId> = Vec::new();
    let mut pool_active = false;

    for raw in clauses {
        match Clause::parse(raw) {
            Clause::Clear => {
                selection.clear();
                pool.clear();
                pool_active = false;
            }
            Clause::FilterSelection(pred) => {
                let base = if pool_active { &pool } else { &selection };
                let filtered: Vec<NodeId> = base
                    .iter()
                    .copied()
                    .filter(|&id| predicate_matches(tree, id, &pred))
                    .collect();
                if pool_active {
                    pool = filtered;
                } else {
                    selection = filtered;
                }
            }
            Clause::AddMatches(path) => {
                let re = Regex::new(&path).map_err(|e| LopError::ParseFailure(e.to_string()))?;
                let matched: Vec<NodeId> = tree
                    .all_nodes()
                    .into_iter()
                    .filter(|&id| re.is_match(&tree.path_of(id)))
                    .collect();
                pool.extend(matched);
                pool_active = true;
            }
            Clause::AddMatchesFiltered(path, pred) => {
                let re = Regex::new(&path).map_err(|e| LopError::ParseFailure(e.to_string()))?;
                let matched: Vec<NodeId> = tree
                    .all_nodes()
                    .into_iter()
                    .filter(|&id| re.is_match(&tree.path_of(id)) && predicate_matches(tree, id, &pred))
                    .collect();
                pool.extend(matched);
                pool_active = true;
            }
        }
    }

    let result = if pool_active { pool } else { selection };
    let mut seen = std::collections::HashSet::new();
    Ok(result.into_iter().filter(|id| seen.insert(*id)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::property::Property;

    fn build_tree() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.add_child(root, Node::new("a", None)).unwrap();
        let b = tree.add_child(a, Node::new("b", None)).unwrap();
        tree.get_mut(b).unwrap().set_property(Property::u32("foo", 1));
        let c = tree.add_child(a, Node::new("c", None)).unwrap();
        tree.get_mut(c).unwrap().set_property(Property::u32("bar", 1));
        tree.sync();
        tree
    }

    #[test]
    fn select_path_and_property_value() {
        let tree = build_tree();
        let clauses = vec!["/a/.*:foo:1".to_string()];
        let result = evaluate(&tree, &clauses).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(tree.path_of(result[0]), "/a/b");
    }

    #[test]
    fn select_then_filter_intersects() {
        let tree = build_tree();
        let b = tree.lookup_by_path("/a/b").unwrap();
        let mut tree = tree;
        tree.set_selection(vec![b, tree.lookup_by_path("/a/c").unwrap()]);
        let clauses = vec![":bar:".to_string()];
        let result = evaluate(&tree, &clauses).unwrap();
        assert_eq!(result, vec![tree.lookup_by_path("/a/c").unwrap()]);
    }

    #[test]
    fn select_union_of_two_subtrees() {
        let tree = build_tree();
        let clauses = vec!["/a/b".to_string(), "/a/c".to_string()];
        let result = evaluate(&tree, &clauses).unwrap();
        assert_eq!(result.len(), 2);
    }
}
