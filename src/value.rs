// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! `Value`, the tagged sum a [`crate::property::Property`] carries.
//!
//! Device-tree property values are duck-typed in the source tool: the same
//! property slot can hold a bare integer, a string, a byte blob, or a list
//! of any of those, and which one it "is" is inferred from the literal text
//! that produced it. REDESIGN FLAGS calls for replacing that with a tagged
//! sum inferred once at parse/assignment time; `Value` is that sum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single property value, always logically a list (scalars are
/// singleton lists) except for [`Value::Empty`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// A property with no value (a boolean-style flag property).
    Empty,
    /// A single unsigned 32-bit scalar.
    U32(u32),
    /// A list of unsigned 32-bit scalars (a `<...>` cell list with more
    /// than one entry, none of which are resolved as phandles).
    U32List(Vec<u32>),
    /// An opaque byte string.
    Bytes(Vec<u8>),
    /// A single string.
    Str(String),
    /// A list of strings (a `"a", "b"` property).
    StrList(Vec<String>),
    /// A single phandle reference (non-zero 32-bit id, or 0 for null).
    Phandle(u32),
    /// A list of phandle references, optionally interleaved with plain
    /// u32 cells (e.g. `interrupts-extended`). Each entry here has already
    /// been classified as phandle vs plain by the phandle-desc metadata.
    PhandleList(Vec<u32>),
    /// A value that does not fit any single-typed list above, kept as a
    /// heterogeneous sequence of already-typed sub-values.
    Mixed(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Empty
    }
}

impl Value {
    /// Best-effort parse of a `modify` RHS literal (spec §4.4.1) into a
    /// typed `Value`. Handles quoted strings, comma-separated string
    /// lists, bare integers (decimal or `0x` hex), and whitespace/comma
    /// separated integer lists. Anything else is kept as a single string.
    pub fn parse_literal(raw: &str) -> Value {
        let raw = raw.trim();
        if raw.is_empty() {
            return Value::Empty;
        }

        if raw.contains(',') && raw.contains('"') {
            let items: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().trim_matches('"').to_string())
                .collect();
            return Value::StrList(items);
        }

        if let Some(stripped) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            return Value::Str(stripped.to_string());
        }

        if let Some(n) = parse_u32(raw) {
            return Value::U32(n);
        }

        if raw.contains(',') || raw.contains(' ') {
            let parts: Vec<&str> = raw
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            if !parts.is_empty() {
                if let Some(nums) = parts.iter().map(|p| parse_u32(p)).collect::<Option<Vec<_>>>()
                {
                    return Value::U32List(nums);
                }
            }
        }

        Value::Str(raw.to_string())
    }

    /// The phandle this value resolves to, if it is phandle-typed.
    pub fn as_phandle(&self) -> Option<u32> {
        match self {
            Value::Phandle(p) => Some(*p),
            Value::PhandleList(v) if v.len() == 1 => Some(v[0]),
            Value::U32(n) => Some(*n),
            _ => None,
        }
    }

    /// Rendering used for set-membership / equality checks against a
    /// `modify`/selector predicate literal. Lists compare by
    /// set-membership of the literal, scalars by direct equality, per
    /// spec §4.2.
    pub fn matches_literal(&self, literal: &str) -> bool {
        match self {
            Value::Empty => literal.is_empty(),
            Value::Str(s) => s == literal,
            Value::StrList(list) => list.iter().any(|s| s == literal),
            Value::U32(n) => parse_u32(literal).map(|l| l == *n).unwrap_or(false),
            Value::U32List(list) | Value::PhandleList(list) => parse_u32(literal)
                .map(|l| list.contains(&l))
                .unwrap_or(false),
            Value::Phandle(p) => parse_u32(literal).map(|l| l == *p).unwrap_or(false),
            Value::Bytes(b) => b.as_slice() == literal.as_bytes(),
            Value::Mixed(items) => items.iter().any(|v| v.matches_literal(literal)),
        }
    }

    /// True if this value is the empty/absent marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, ""),
            Value::U32(n) => write!(f, "{}", n),
            Value::U32List(list) => write!(
                f,
                "<{}>",
                list.iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            Value::Bytes(b) => write!(
                f,
                "[{}]",
                b.iter()
                    .map(|byte| format!("{:02x}", byte))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::StrList(list) => write!(
                f,
                "{}",
                list.iter()
                    .map(|s| format!("\"{}\"", s))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Phandle(p) => write!(f, "<&{:#x}>", p),
            Value::PhandleList(list) => write!(
                f,
                "<{}>",
                list.iter()
                    .map(|n| format!("&{:#x}", n))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            Value::Mixed(items) => write!(
                f,
                "{}",
                items
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
        }
    }
}

fn parse_u32(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        raw.parse::<u32>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(Value::parse_literal("0x7"), Value::U32(7));
        assert_eq!(Value::parse_literal("42"), Value::U32(42));
    }

    #[test]
    fn parses_quoted_string() {
        assert_eq!(
            Value::parse_literal("\"okay\""),
            Value::Str("okay".to_string())
        );
    }

    #[test]
    fn parses_u32_list() {
        assert_eq!(
            Value::parse_literal("1 2 3"),
            Value::U32List(vec![1, 2, 3])
        );
    }

    #[test]
    fn empty_is_empty() {
        assert!(Value::parse_literal("").is_empty());
    }

    #[test]
    fn list_membership_equality() {
        let v = Value::U32List(vec![1, 2, 3]);
        assert!(v.matches_literal("2"));
        assert!(!v.matches_literal("9"));
    }
}
