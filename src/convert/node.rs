//! Language-neutral intermediate tree.
//!
//! Both directions pass through [`GenericNode`]: Lua values are lowered into
//! it before typed decoding, and Rust values are flattened into it before a
//! Lua table is built.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// Unordered mapping of scalar keys to nodes.
pub type Mapping = FxHashMap<Key, GenericNode>;

/// Intermediate value between Lua and typed Rust records.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericNode {
    /// Absent value.
    Nil,
    /// Boolean.
    Bool(bool),
    /// UTF-8 text.
    String(String),
    /// Any number. Integers and floats are not distinguished.
    ///
    /// Integers beyond ±2^53 lose precision here. `i64::MAX` rounds up to
    /// 2^63, which no longer fits `i64`; it reaches Lua as a float and fails
    /// the range check when decoded back into an `i64`.
    Float(f64),
    /// Key/value container.
    Mapping(Mapping),
    /// Ordered container.
    Sequence(Vec<GenericNode>),
}

impl GenericNode {
    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            GenericNode::Nil => "nil",
            GenericNode::Bool(_) => "boolean",
            GenericNode::String(_) => "string",
            GenericNode::Float(_) => "number",
            GenericNode::Mapping(_) => "mapping",
            GenericNode::Sequence(_) => "sequence",
        }
    }

    /// Whether this is an empty mapping or an empty sequence.
    pub fn is_empty_container(&self) -> bool {
        match self {
            GenericNode::Mapping(map) => map.is_empty(),
            GenericNode::Sequence(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Render as JSON for inspection.
    ///
    /// Non-string keys are stringified and non-finite numbers become `null`,
    /// so the output is lossy.
    pub fn to_json(&self) -> JsonValue {
        match self {
            GenericNode::Nil => JsonValue::Null,
            GenericNode::Bool(b) => JsonValue::Bool(*b),
            GenericNode::String(s) => JsonValue::String(s.clone()),
            GenericNode::Float(f) => number_to_json(*f),
            GenericNode::Mapping(map) => {
                let obj: Map<String, JsonValue> = map
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect();
                JsonValue::Object(obj)
            }
            GenericNode::Sequence(items) => {
                JsonValue::Array(items.iter().map(GenericNode::to_json).collect())
            }
        }
    }
}

fn number_to_json(f: f64) -> JsonValue {
    if let Some(i) = integral(f) {
        JsonValue::from(i)
    } else {
        serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

/// `Some(i)` when `f` is a whole number representable as `i64`.
pub(crate) fn integral(f: f64) -> Option<i64> {
    // 2^63 is exact in f64; anything at or above it overflows i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

// =============================================================================
// Key
// =============================================================================

/// Scalar mapping key.
///
/// Numbers compare by value, with `-0.0` equal to `0.0`. NaN is rejected on
/// construction, so every key is equal to itself.
#[derive(Debug, Clone)]
pub enum Key {
    /// Boolean key.
    Bool(bool),
    /// String key.
    String(String),
    /// Numeric key.
    Number(f64),
}

impl Key {
    fn number_bits(n: f64) -> u64 {
        if n == 0.0 { 0 } else { n.to_bits() }
    }

    /// Borrow as a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::String(a), Key::String(b)) => a == b,
            (Key::Number(a), Key::Number(b)) => Key::number_bits(*a) == Key::number_bits(*b),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Bool(b) => b.hash(state),
            Key::String(s) => s.hash(state),
            Key::Number(n) => Key::number_bits(*n).hash(state),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{b}"),
            Key::String(s) => f.write_str(s),
            Key::Number(n) => write!(f, "{n}"),
        }
    }
}

impl TryFrom<GenericNode> for Key {
    type Error = Error;

    fn try_from(node: GenericNode) -> Result<Self> {
        match node {
            GenericNode::Bool(b) => Ok(Key::Bool(b)),
            GenericNode::String(s) => Ok(Key::String(s)),
            GenericNode::Float(n) if n.is_nan() => Err(Error::unsupported("NaN key")),
            GenericNode::Float(n) => Ok(Key::Number(n)),
            other => Err(Error::unsupported(format!("{} key", other.kind()))),
        }
    }
}

impl From<Key> for GenericNode {
    fn from(key: Key) -> Self {
        match key {
            Key::Bool(b) => GenericNode::Bool(b),
            Key::String(s) => GenericNode::String(s),
            Key::Number(n) => GenericNode::Float(n),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}
