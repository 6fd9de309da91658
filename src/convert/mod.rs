//! Lua ↔ Rust value conversion.
//!
//! Provides the translation layers behind [`Mapper`](crate::Mapper).
//!
//! # Modules
//!
//! - [`node`] - Intermediate tree shared by both directions
//! - [`classify`] - Array-vs-map detection for Lua tables
//! - [`translate`] - Lua value ↔ node translation
//! - [`flatten`] - Rust → node via serde
//! - [`de`] - Node → Rust via serde, with weak typing

mod classify;
mod de;
mod flatten;
mod node;
mod translate;

mod roundtrip;

// Intermediate tree
pub use node::{GenericNode, Key, Mapping};

// Lua side
pub use classify::{classify, Shape};
pub use translate::Translator;

// Rust side
pub use de::{from_node, NodeDeserializer};
pub use flatten::Flattener;
