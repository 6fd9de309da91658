//! Configuration for the mapper.
//!
//! Options are fixed when a [`Mapper`](crate::Mapper) is constructed and
//! passed explicitly to every translation step. Use [`Options`] for the
//! common flags, or [`MapperBuilder`] when the depth limit needs changing.

use std::ops::{BitOr, BitOrAssign};

use crate::mapper::Mapper;

/// Default limit on table/record nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Bitset of mapper options.
///
/// ```
/// use lua_glue::Options;
///
/// let options = Options::LENIENT | Options::CAMEL_CASE;
/// assert!(options.contains(Options::LENIENT));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Options(u32);

impl Options {
    /// No options: strict fields, keys named exactly like the Rust fields.
    pub const NONE: Options = Options(0);

    /// Ignore table keys that match no field of the destination record.
    pub const LENIENT: Options = Options(1 << 0);

    /// When decoding, also match lowerCamelCase keys to snake_case fields
    /// (`firstName` fills `first_name`). Encoding always writes serde's field
    /// names; use `#[serde(rename_all = "camelCase")]` to write camelCase.
    pub const CAMEL_CASE: Options = Options(1 << 1);

    /// Raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: Options) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        Options(self.0 | rhs.0)
    }
}

impl BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Options) {
        self.0 |= rhs.0;
    }
}

/// Fallback convention for matching table keys to record fields on decode.
///
/// A key is first compared with the serde field name, which already reflects
/// any `#[serde(rename)]`. The convention is only tried when that fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Naming {
    /// Keys must equal the serde field names.
    #[default]
    Preserve,
    /// Keys may also be the lowerCamelCase form of the serde field names.
    CamelCase,
}

impl Naming {
    /// Apply the convention to a field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            Naming::Preserve => field.to_string(),
            Naming::CamelCase => to_camel_case(field),
        }
    }
}

/// `first_name` → `firstName`. Leading underscores are kept.
fn to_camel_case(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let mut out = String::with_capacity(name.len());
    out.push_str(&name[..name.len() - trimmed.len()]);

    let mut upper_next = false;
    for ch in trimmed.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Resolved mapper configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Drop unknown keys instead of failing.
    pub lenient: bool,
    /// Key matching convention tried after the exact field name on decode.
    pub naming: Naming,
    /// Maximum nesting depth before translation fails.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(Options::NONE)
    }
}

impl From<Options> for Config {
    fn from(options: Options) -> Self {
        Self {
            lenient: options.contains(Options::LENIENT),
            naming: if options.contains(Options::CAMEL_CASE) {
                Naming::CamelCase
            } else {
                Naming::Preserve
            },
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Builder for [`Mapper`].
#[derive(Debug, Clone, Default)]
pub struct MapperBuilder {
    options: Options,
    naming: Option<Naming>,
    max_depth: Option<usize>,
}

impl MapperBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an option bitset.
    pub fn options(mut self, options: Options) -> Self {
        self.options |= options;
        self
    }

    /// Allow or reject table keys that match no record field.
    ///
    /// Default: `false` (unknown keys are an error).
    pub fn lenient(mut self, lenient: bool) -> Self {
        if lenient {
            self.options |= Options::LENIENT;
        } else {
            self.options = Options(self.options.0 & !Options::LENIENT.0);
        }
        self
    }

    /// Set the fallback naming convention. Overrides [`Options::CAMEL_CASE`].
    pub fn naming(mut self, naming: Naming) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Set the nesting limit.
    ///
    /// Default: [`DEFAULT_MAX_DEPTH`]
    ///
    /// # Example
    ///
    /// ```
    /// use lua_glue::MapperBuilder;
    ///
    /// let mapper = MapperBuilder::new().max_depth(16).build();
    /// assert_eq!(mapper.config().max_depth, 16);
    /// ```
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Build the mapper.
    pub fn build(self) -> Mapper {
        let mut config = Config::from(self.options);
        if let Some(naming) = self.naming {
            config.naming = naming;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        Mapper::with_config(config)
    }
}
