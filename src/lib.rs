//! # lua-glue
//!
//! Map Lua tables to typed Rust records and back.
//!
//! Embedded scripts describe data as tables; host code wants structs. This
//! crate translates between the two through a small intermediate tree:
//!
//! - **Decode**: Lua table → [`GenericNode`] → record (`serde::Deserialize`)
//! - **Encode**: record (`serde::Serialize`) → [`GenericNode`] → Lua table
//!
//! Decoding is weakly typed (`age = "31"` fills a `u32`) and strict about
//! unknown keys unless [`Options::LENIENT`] is set.
//!
//! ## Quick Start
//!
//! ```
//! use lua_glue::{Mapper, Options};
//! use mlua::{Lua, Table};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Role {
//!     name: String,
//! }
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Person {
//!     first_name: String,
//!     age: u32,
//!     roles: Vec<Role>,
//! }
//!
//! let lua = Lua::new();
//! lua.load(r#"
//!     person = { first_name = "Jan", age = "31", roles = { { name = "Operator" } } }
//! "#).exec()?;
//!
//! let mapper = Mapper::new(Options::NONE);
//! let person: Person = mapper.decode(&lua.globals().get::<Table>("person")?)?;
//! assert_eq!(person.age, 31);
//!
//! let table = mapper.to_table(&lua, &person)?;
//! lua.globals().set("copy", table)?;
//! lua.load(r#"assert(copy.roles[1].name == "Operator")"#).exec()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Table shapes
//!
//! Lua has one container type. A table whose keys are exactly `1..=n` is an
//! array; everything else, including the empty table, is a map. See
//! [`classify`]. Decoding requires a map-shaped root, and an empty table
//! decodes into an empty `Vec` as well as an empty map.
//!
//! ## Limits
//!
//! Translation recurses once per nesting level. Self-referencing tables and
//! very deep records fail with [`Error::DepthExceeded`] once
//! [`Config::max_depth`] is reached.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
mod convert;
pub mod error;
mod mapper;
pub mod prelude;

// =============================================================================
// High-Level API
// =============================================================================

pub use mapper::Mapper;

pub use config::{Config, MapperBuilder, Naming, Options, DEFAULT_MAX_DEPTH};
pub use error::{Error, Result};

// =============================================================================
// Conversion layers
// =============================================================================

pub use convert::{
    classify, from_node, Flattener, GenericNode, Key, Mapping, NodeDeserializer, Shape,
    Translator,
};

/// Re-export of the Lua runtime used by the public API.
pub use mlua;
