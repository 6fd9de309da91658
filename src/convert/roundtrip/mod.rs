//! Roundtrip tests for Lua ↔ record mapping.
//!
//! Tests verify that:
//! - Lua script → record → Lua table → record reproduces the record
//! - Array/map shape detection holds end to end
//! - Weak typing and the unknown-field policy apply through `Mapper`


#[cfg(test)]
mod record;

#[cfg(test)]
mod shape;

#[cfg(test)]
mod weak;
