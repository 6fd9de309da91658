//! Lua value ↔ [`GenericNode`] translation.

use mlua::{Lua, Table, Value};

use super::classify::{classify, Shape};
use super::node::{integral, GenericNode, Key, Mapping};
use crate::config::Config;
use crate::error::{Error, Result};

/// Recursive translator between Lua values and generic nodes.
///
/// Carries the mapper configuration so the depth limit applies to both
/// directions.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    config: &'a Config,
}

impl<'a> Translator<'a> {
    /// Create a translator for the given configuration.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Lower a Lua value into a generic node.
    ///
    /// Integers and floats both become [`GenericNode::Float`]. Functions,
    /// threads, userdata and errors fail with [`Error::UnsupportedValue`].
    /// Any failure inside a table aborts the whole table.
    pub fn to_generic(&self, value: &Value) -> Result<GenericNode> {
        self.to_generic_at(value, 0)
    }

    fn to_generic_at(&self, value: &Value, depth: usize) -> Result<GenericNode> {
        match value {
            Value::Nil => Ok(GenericNode::Nil),
            Value::Boolean(b) => Ok(GenericNode::Bool(*b)),
            Value::Integer(i) => Ok(GenericNode::Float(*i as f64)),
            Value::Number(n) => Ok(GenericNode::Float(*n)),
            Value::String(s) => {
                let text = s
                    .to_str()
                    .map_err(|_| Error::unsupported("non-UTF-8 string"))?;
                let text: &str = &text;
                Ok(GenericNode::String(text.to_owned()))
            }
            Value::Table(table) => {
                let depth = self.descend(depth)?;
                self.table_to_generic(table, depth)
            }
            other => Err(Error::unsupported(other.type_name())),
        }
    }

    fn table_to_generic(&self, table: &Table, depth: usize) -> Result<GenericNode> {
        match classify(table)? {
            Shape::Sequence(len) => {
                let mut items = Vec::with_capacity(len);
                for index in 1..=len {
                    let item: Value = table.raw_get(index)?;
                    items.push(self.to_generic_at(&item, depth)?);
                }
                Ok(GenericNode::Sequence(items))
            }
            Shape::Mapping => {
                let mut map = Mapping::default();
                for pair in table.pairs::<Value, Value>() {
                    let (key, value) = pair?;
                    let key = Key::try_from(self.to_generic_at(&key, depth)?)?;
                    let value = self.to_generic_at(&value, depth)?;
                    map.insert(key, value);
                }
                Ok(GenericNode::Mapping(map))
            }
        }
    }

    /// Build a Lua value from a generic node.
    ///
    /// Mappings and sequences become fresh tables; sequences use keys
    /// `1..=n`. Whole numbers that fit `i64` become Lua integers.
    /// A nil sequence element fails with [`Error::UnsupportedValue`].
    pub fn from_generic(&self, lua: &Lua, node: GenericNode) -> Result<Value> {
        self.from_generic_at(lua, node, 0)
    }

    fn from_generic_at(&self, lua: &Lua, node: GenericNode, depth: usize) -> Result<Value> {
        match node {
            GenericNode::Nil => Ok(Value::Nil),
            GenericNode::Bool(b) => Ok(Value::Boolean(b)),
            GenericNode::String(s) => Ok(Value::String(lua.create_string(&s)?)),
            GenericNode::Float(n) => Ok(match integral(n) {
                Some(i) => Value::Integer(i),
                None => Value::Number(n),
            }),
            GenericNode::Mapping(map) => {
                let depth = self.descend(depth)?;
                let table = lua.create_table()?;
                for (key, value) in map {
                    let key = self.from_generic_at(lua, key.into(), depth)?;
                    let value = self.from_generic_at(lua, value, depth)?;
                    table.raw_set(key, value)?;
                }
                Ok(Value::Table(table))
            }
            GenericNode::Sequence(items) => {
                let depth = self.descend(depth)?;
                let table = lua.create_table()?;
                for (index, item) in items.into_iter().enumerate() {
                    // A nil element would leave a hole and the table would
                    // no longer read back as a sequence.
                    if item == GenericNode::Nil {
                        tracing::trace!(index = index + 1, "nil element in sequence");
                        return Err(Error::unsupported("nil sequence element"));
                    }
                    let value = self.from_generic_at(lua, item, depth)?;
                    table.raw_set(index + 1, value)?;
                }
                Ok(Value::Table(table))
            }
        }
    }

    fn descend(&self, depth: usize) -> Result<usize> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthExceeded(self.config.max_depth));
        }
        Ok(depth + 1)
    }
}
