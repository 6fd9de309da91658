//! Error types for table mapping.

use std::fmt::Display;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error during Lua ↔ Rust mapping.
#[derive(Debug, Error)]
pub enum Error {
    /// Root table has the wrong shape (array where a map was required,
    /// or a populated destination where an empty one was required).
    #[error("expected {expected}, got {found}")]
    ShapeMismatch {
        /// Shape the operation required.
        expected: &'static str,
        /// Shape that was found.
        found: &'static str,
    },

    /// A Lua or Rust value whose kind has no translation.
    #[error("could not convert {0} value")]
    UnsupportedValue(String),

    /// Typed decoding failed (type mismatch, unknown field, missing field).
    #[error("decode failed: {0}")]
    Decode(String),

    /// A `Serialize` implementation reported an error while flattening.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Nesting went deeper than the configured limit.
    #[error("nesting exceeds maximum depth of {0}")]
    DepthExceeded(usize),

    /// The Lua runtime rejected an operation.
    #[error(transparent)]
    Lua(#[from] mlua::Error),
}

impl Error {
    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedValue(kind.into())
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Decode(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Encode(msg.to_string())
    }
}
