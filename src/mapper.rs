//! Public entry points: decode Lua tables into records, encode records into
//! Lua tables.

use mlua::{Lua, Table, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Config, MapperBuilder, Options};
use crate::convert::{classify, from_node, Flattener, GenericNode, Shape, Translator};
use crate::error::{Error, Result};

/// Maps between Lua tables and typed Rust records.
///
/// The mapper holds only its configuration. It is cheap to clone and can be
/// shared between threads; each call works on the values it is given.
///
/// # Example
///
/// ```
/// use lua_glue::{Mapper, Options};
/// use mlua::{Lua, Table};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let lua = Lua::new();
/// let table: Table = lua.load(r#"return { name = "Jan", age = "31" }"#).eval()?;
///
/// let mapper = Mapper::new(Options::NONE);
/// let person: Person = mapper.decode(&table)?;
/// assert_eq!(person.age, 31);
///
/// let out = lua.create_table()?;
/// mapper.encode(&lua, &person, &out)?;
/// assert_eq!(out.get::<String>("name")?, "Jan");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: Config,
}

impl Mapper {
    /// Create a mapper from an option bitset.
    pub fn new(options: Options) -> Self {
        Self::with_config(Config::from(options))
    }

    /// Create a mapper from a resolved configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Start a [`MapperBuilder`].
    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    /// The mapper's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode a map-shaped table into a record.
    ///
    /// Fails with [`Error::ShapeMismatch`] when the table is array-shaped,
    /// and with [`Error::Decode`] when the contents don't fit `T`.
    pub fn decode<T: DeserializeOwned>(&self, table: &Table) -> Result<T> {
        let shape = classify(table)?;
        if shape != Shape::Mapping {
            return Err(Error::ShapeMismatch {
                expected: Shape::Mapping.describe(),
                found: shape.describe(),
            });
        }

        let node = self.to_generic(&Value::Table(table.clone()))?;
        if let GenericNode::Mapping(map) = &node {
            tracing::debug!(entries = map.len(), "decoding table");
        }
        from_node(node, &self.config)
    }

    /// Decode any Lua value, without the root-shape check of [`decode`](Self::decode).
    pub fn from_value<T: DeserializeOwned>(&self, value: &Value) -> Result<T> {
        from_node(self.to_generic(value)?, &self.config)
    }

    /// Encode a record into an empty destination table.
    ///
    /// The destination must be empty; otherwise [`Error::ShapeMismatch`] is
    /// returned and the table is left untouched. Every entry is translated
    /// before any is written, so a failed encode also leaves it empty.
    pub fn encode<T: Serialize + ?Sized>(
        &self,
        lua: &Lua,
        source: &T,
        dest: &Table,
    ) -> Result<()> {
        if let Some(pair) = dest.pairs::<Value, Value>().next() {
            pair?;
            return Err(Error::ShapeMismatch {
                expected: "empty destination table",
                found: "populated table",
            });
        }

        let entries = match self.flatten(source)? {
            GenericNode::Mapping(map) => {
                let translator = Translator::new(&self.config);
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    entries.push((
                        translator.from_generic(lua, key.into())?,
                        translator.from_generic(lua, value)?,
                    ));
                }
                entries
            }
            GenericNode::Sequence(items) => {
                let translator = Translator::new(&self.config);
                let mut entries = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let value = translator.from_generic(lua, item)?;
                    entries.push((Value::Integer(index as i64 + 1), value));
                }
                entries
            }
            other => {
                return Err(Error::ShapeMismatch {
                    expected: "record or collection",
                    found: other.kind(),
                });
            }
        };

        tracing::debug!(entries = entries.len(), "encoding into table");
        for (key, value) in entries {
            dest.raw_set(key, value)?;
        }
        Ok(())
    }

    /// Encode a record into a fresh table.
    pub fn to_table<T: Serialize + ?Sized>(&self, lua: &Lua, source: &T) -> Result<Table> {
        let table = lua.create_table()?;
        self.encode(lua, source, &table)?;
        Ok(table)
    }

    /// Convert any Rust value, scalars included, into a Lua value.
    pub fn to_value<T: Serialize + ?Sized>(&self, lua: &Lua, source: &T) -> Result<Value> {
        let node = self.flatten(source)?;
        Translator::new(&self.config).from_generic(lua, node)
    }

    /// Lower a Lua value into the intermediate tree.
    pub fn to_generic(&self, value: &Value) -> Result<GenericNode> {
        Translator::new(&self.config).to_generic(value)
    }

    fn flatten<T: Serialize + ?Sized>(&self, source: &T) -> Result<GenericNode> {
        Flattener::new().flatten(source)
    }
}
