//! [`GenericNode`] → Rust decoding with weak typing.
//!
//! Scripts are loose about types: `age = "31"` should still fill a `u32`.
//! The deserializer accepts any unambiguous conversion between scalars:
//!
//! | Target | Accepted input |
//! |--------|----------------|
//! | `bool` | boolean, number (non-zero is true), `"true"`/`"1"`/`"f"`/... (`""` is false) |
//! | integers | number (truncated), boolean (1/0), decimal or `0x`/`0o`/`0b` string (`""` is 0) |
//! | floats | number, boolean (1/0), numeric string (`""` is 0) |
//! | `String` | string, number (`31`, `0.5`), boolean (`"1"`/`"0"`) |
//! | `Vec<T>` | sequence, empty mapping, or a single scalar |
//! | maps | mapping, or a sequence (keys `1..=n`) |
//! | records | mapping, empty sequence |
//!
//! Record keys that match no field are an error unless the mapper is
//! lenient, in which case they are dropped.

use serde::de::value::{MapDeserializer, SeqDeserializer, StringDeserializer};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, Expected, IntoDeserializer, Unexpected,
    VariantAccess, Visitor,
};

use super::node::{integral, GenericNode, Key, Mapping};
use crate::config::{Config, Naming};
use crate::error::{Error, Result};

/// Decode a typed value from a node.
pub fn from_node<T: DeserializeOwned>(node: GenericNode, config: &Config) -> Result<T> {
    T::deserialize(NodeDeserializer::new(node, config))
}

/// Weakly typed deserializer over an owned [`GenericNode`].
#[derive(Debug)]
pub struct NodeDeserializer<'a> {
    node: GenericNode,
    config: &'a Config,
}

impl<'a> NodeDeserializer<'a> {
    /// Wrap a node for deserialization.
    pub fn new(node: GenericNode, config: &'a Config) -> Self {
        Self { node, config }
    }

    fn weak_integer(self, expected: &'static str) -> Result<i128> {
        match self.node {
            GenericNode::Float(f) if f.is_finite() => Ok(f.trunc() as i128),
            GenericNode::Bool(b) => Ok(i128::from(b)),
            GenericNode::String(s) => {
                parse_int(&s)
                    .ok_or_else(|| Error::Decode(format!("cannot parse {s:?} as {expected}")))
            }
            other => Err(invalid_type(&other, &expected)),
        }
    }

    fn weak_float(self) -> Result<f64> {
        match self.node {
            GenericNode::Float(f) => Ok(f),
            GenericNode::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
            GenericNode::String(s) => {
                let text = s.trim();
                if text.is_empty() {
                    return Ok(0.0);
                }
                text.parse::<f64>()
                    .map_err(|_| Error::Decode(format!("cannot parse {s:?} as a number")))
            }
            other => Err(invalid_type(&other, &"a number")),
        }
    }

    fn visit_items<'de, V: Visitor<'de>>(
        config: &'a Config,
        items: Vec<GenericNode>,
        visitor: V,
    ) -> Result<V::Value> {
        let iter = items
            .into_iter()
            .map(move |item| NodeDeserializer::new(item, config));
        let mut seq = SeqDeserializer::<_, Error>::new(iter);
        let value = visitor.visit_seq(&mut seq)?;
        seq.end()?;
        Ok(value)
    }

    fn visit_entries<'de, V: Visitor<'de>>(
        config: &'a Config,
        map: Mapping,
        visitor: V,
    ) -> Result<V::Value> {
        let iter = map.into_iter().map(move |(key, value)| {
            (
                NodeDeserializer::new(key.into(), config),
                NodeDeserializer::new(value, config),
            )
        });
        let mut access = MapDeserializer::<_, Error>::new(iter);
        let value = visitor.visit_map(&mut access)?;
        access.end()?;
        Ok(value)
    }

    fn visit_record<'de, V: Visitor<'de>>(
        config: &'a Config,
        name: &'static str,
        map: Mapping,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let mut entries = Vec::with_capacity(map.len());
        let mut unknown = Vec::new();
        for (key, value) in map {
            match resolve_field(&key, fields, config.naming) {
                Some(field) => entries.push((field, NodeDeserializer::new(value, config))),
                None if config.lenient => {
                    tracing::trace!(record = name, key = %key, "dropping unknown field");
                }
                None => unknown.push(key.to_string()),
            }
        }

        if !unknown.is_empty() {
            unknown.sort();
            return Err(Error::Decode(format!(
                "unknown field(s) `{}` in {name}, expected one of `{}`",
                unknown.join("`, `"),
                fields.join("`, `"),
            )));
        }

        let mut access = MapDeserializer::<_, Error>::new(entries.into_iter());
        let value = visitor.visit_map(&mut access)?;
        access.end()?;
        Ok(value)
    }
}

/// Match a table key to a record field: exact name first, then the
/// naming convention.
fn resolve_field(
    key: &Key,
    fields: &'static [&'static str],
    naming: Naming,
) -> Option<&'static str> {
    let name = key.as_str()?;
    fields.iter().copied().find(|field| *field == name).or_else(|| match naming {
        Naming::Preserve => None,
        naming => fields
            .iter()
            .copied()
            .find(|field| naming.apply(field) == name),
    })
}

fn unexpected(node: &GenericNode) -> Unexpected<'_> {
    match node {
        GenericNode::Nil => Unexpected::Other("nil"),
        GenericNode::Bool(b) => Unexpected::Bool(*b),
        GenericNode::String(s) => Unexpected::Str(s),
        GenericNode::Float(f) => Unexpected::Float(*f),
        GenericNode::Mapping(_) => Unexpected::Map,
        GenericNode::Sequence(_) => Unexpected::Seq,
    }
}

fn invalid_type(node: &GenericNode, expected: &dyn Expected) -> Error {
    de::Error::invalid_type(unexpected(node), expected)
}

/// Parse a boolean the way scripts tend to spell them.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "" | "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        _ => None,
    }
}

/// Parse an integer literal with an optional sign and radix prefix.
fn parse_int(text: &str) -> Option<i128> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0);
    }

    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let prefixed = |lower: &str, upper: &str| {
        rest.strip_prefix(lower).or_else(|| rest.strip_prefix(upper))
    };
    let (radix, digits) = if let Some(d) = prefixed("0x", "0X") {
        (16, d)
    } else if let Some(d) = prefixed("0o", "0O") {
        (8, d)
    } else if let Some(d) = prefixed("0b", "0B") {
        (2, d)
    } else {
        (10, rest)
    };
    // from_str_radix accepts its own sign; one sign is enough.
    if digits.starts_with(['+', '-']) {
        return None;
    }

    let value = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

/// Shortest text form of a number: `31`, not `31.0`.
fn format_number(f: f64) -> String {
    match integral(f) {
        Some(i) => i.to_string(),
        None => f.to_string(),
    }
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                let wide = self.weak_integer(stringify!($ty))?;
                let value = <$ty>::try_from(wide).map_err(|_| {
                    Error::Decode(format!("{wide} is out of range for {}", stringify!($ty)))
                })?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for NodeDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::Nil => visitor.visit_unit(),
            GenericNode::Bool(b) => visitor.visit_bool(b),
            GenericNode::String(s) => visitor.visit_string(s),
            GenericNode::Float(f) => match integral(f) {
                Some(i) => visitor.visit_i64(i),
                None => visitor.visit_f64(f),
            },
            GenericNode::Mapping(map) => Self::visit_entries(self.config, map, visitor),
            GenericNode::Sequence(items) => Self::visit_items(self.config, items, visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::Bool(b) => visitor.visit_bool(b),
            GenericNode::Float(f) => visitor.visit_bool(f != 0.0),
            GenericNode::String(s) => match parse_bool(s.trim()) {
                Some(b) => visitor.visit_bool(b),
                None => Err(Error::Decode(format!("cannot parse {s:?} as a boolean"))),
            },
            other => Err(invalid_type(&other, &visitor)),
        }
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.weak_float()? as f32)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.weak_float()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::String(s) => visitor.visit_string(s),
            GenericNode::Float(f) => visitor.visit_string(format_number(f)),
            GenericNode::Bool(b) => visitor.visit_str(if b { "1" } else { "0" }),
            other => Err(invalid_type(&other, &visitor)),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::String(s) => visitor.visit_byte_buf(s.into_bytes()),
            GenericNode::Sequence(items) => Self::visit_items(self.config, items, visitor),
            other => Err(invalid_type(&other, &visitor)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::Nil => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::Nil => visitor.visit_unit(),
            node if node.is_empty_container() => visitor.visit_unit(),
            other => Err(invalid_type(&other, &visitor)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let items = match self.node {
            GenericNode::Sequence(items) => items,
            // An empty table is classified as a mapping; it is also the empty list.
            GenericNode::Mapping(map) if map.is_empty() => Vec::new(),
            other @ (GenericNode::Mapping(_) | GenericNode::Nil) => {
                return Err(invalid_type(&other, &visitor));
            }
            scalar => vec![scalar],
        };
        Self::visit_items(self.config, items, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::Mapping(map) => Self::visit_entries(self.config, map, visitor),
            // A map whose keys happen to be 1..n was classified as a sequence.
            GenericNode::Sequence(items) => {
                let map = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (Key::Number((index + 1) as f64), item))
                    .collect();
                Self::visit_entries(self.config, map, visitor)
            }
            other => Err(invalid_type(&other, &visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.node {
            GenericNode::Mapping(map) => {
                Self::visit_record(self.config, name, map, fields, visitor)
            }
            GenericNode::Sequence(items) if items.is_empty() => {
                Self::visit_record(self.config, name, Mapping::default(), fields, visitor)
            }
            other => Err(invalid_type(&other, &visitor)),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.node {
            GenericNode::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: GenericNode::Nil,
                config: self.config,
            }),
            GenericNode::Mapping(map) if map.len() == 1 => match map.into_iter().next() {
                Some((Key::String(variant), value)) => visitor.visit_enum(EnumDeserializer {
                    variant,
                    value,
                    config: self.config,
                }),
                _ => Err(Error::Decode("enum variant key must be a string".into())),
            },
            other => Err(invalid_type(&other, &"a variant name or single-entry table")),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            GenericNode::String(s) => visitor.visit_string(s),
            GenericNode::Float(f) => match integral(f) {
                Some(i) if i >= 0 => visitor.visit_u64(i as u64),
                _ => Err(invalid_type(&GenericNode::Float(f), &visitor)),
            },
            other => Err(invalid_type(&other, &visitor)),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

impl<'de, 'a> IntoDeserializer<'de, Error> for NodeDeserializer<'a> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

// =============================================================================
// Enums
// =============================================================================

/// `{Variant = payload}` or a bare variant name.
struct EnumDeserializer<'a> {
    variant: String,
    value: GenericNode,
    config: &'a Config,
}

impl<'de, 'a> EnumAccess<'de> for EnumDeserializer<'a> {
    type Error = Error;
    type Variant = NodeDeserializer<'a>;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let name: StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, NodeDeserializer::new(self.value, self.config)))
    }
}

impl<'de, 'a> VariantAccess<'de> for NodeDeserializer<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.node {
            GenericNode::Nil => Ok(()),
            node if node.is_empty_container() => Ok(()),
            other => Err(invalid_type(&other, &"unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(self, "variant", fields, visitor)
    }
}
