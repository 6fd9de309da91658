//! Array-vs-map detection for Lua tables.

use mlua::{Table, Value};

use crate::error::Result;

/// How a table is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Keys are exactly `1..=n`.
    Sequence(usize),
    /// Anything else, including the empty table.
    Mapping,
}

impl Shape {
    /// Human-readable shape name.
    pub fn describe(self) -> &'static str {
        match self {
            Shape::Sequence(_) => "array-shaped table",
            Shape::Mapping => "map-shaped table",
        }
    }
}

/// Classify a table as a sequence or a mapping.
///
/// A table is a sequence when its border `n = #t` is at least 1 and the
/// keys are exactly the integers `1..=n`. A single extra key, a gap, or a
/// non-integer key makes it a mapping. The empty table is a mapping.
pub fn classify(table: &Table) -> Result<Shape> {
    let len = table.raw_len();
    if len == 0 {
        return Ok(Shape::Mapping);
    }

    let mut count = 0usize;
    for pair in table.pairs::<Value, Value>() {
        let (key, _) = pair?;
        match array_index(&key) {
            Some(i) if i <= len => count += 1,
            _ => {
                tracing::trace!(len, key = key.type_name(), "non-index key, table is a mapping");
                return Ok(Shape::Mapping);
            }
        }
    }

    // Keys are distinct, so `len` of them inside 1..=len covers the range.
    if count == len {
        Ok(Shape::Sequence(len))
    } else {
        Ok(Shape::Mapping)
    }
}

/// Positive integer index of a key, accepting integral floats.
fn array_index(key: &Value) -> Option<usize> {
    match key {
        Value::Integer(i) if *i >= 1 => usize::try_from(*i).ok(),
        Value::Number(n) if *n >= 1.0 && n.fract() == 0.0 && *n <= usize::MAX as f64 => {
            Some(*n as usize)
        }
        _ => None,
    }
}
