//! Prelude module for convenient imports.
//!
//! ```ignore
//! use lua_glue::prelude::*;
//! ```

// Mapping
pub use crate::mapper::Mapper;
pub use crate::config::{MapperBuilder, Naming, Options};

// Errors
pub use crate::error::{Error, Result};

// Intermediate tree
pub use crate::convert::{GenericNode, Key, Shape};
