//! Rust → [`GenericNode`] flattening via serde.
//!
//! Any `Serialize` value can be flattened: records become mappings keyed by
//! their serde field names, collections become sequences or mappings, and
//! scalars map directly. `Option::None` and unit values become
//! [`GenericNode::Nil`], so a missing pointer never needs dereferencing.
//!
//! Field names are written exactly as serde reports them. An explicit
//! `#[serde(rename)]` has already been applied at that point, and a
//! convention such as `#[serde(rename_all = "camelCase")]` is chosen on the
//! type, not at runtime.

use serde::ser::{self, Serialize};

use super::node::{GenericNode, Key, Mapping};
use crate::error::{Error, Result};

/// Serializer producing a [`GenericNode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Flattener;

impl Flattener {
    /// Create a flattener.
    pub fn new() -> Self {
        Self
    }

    /// Flatten a value.
    pub fn flatten<T: Serialize + ?Sized>(self, value: &T) -> Result<GenericNode> {
        value.serialize(self)
    }
}

/// Single-entry mapping `{variant = payload}`.
fn tagged(variant: &str, payload: GenericNode) -> GenericNode {
    let mut map = Mapping::default();
    map.insert(Key::from(variant), payload);
    GenericNode::Mapping(map)
}

impl ser::Serializer for Flattener {
    type Ok = GenericNode;
    type Error = Error;

    type SerializeSeq = SeqFlattener;
    type SerializeTuple = SeqFlattener;
    type SerializeTupleStruct = SeqFlattener;
    type SerializeTupleVariant = VariantFlattener<SeqFlattener>;
    type SerializeMap = MapFlattener;
    type SerializeStruct = StructFlattener;
    type SerializeStructVariant = VariantFlattener<StructFlattener>;

    fn serialize_bool(self, v: bool) -> Result<GenericNode> {
        Ok(GenericNode::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<GenericNode> {
        Ok(GenericNode::Float(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<GenericNode> {
        Ok(GenericNode::Float(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<GenericNode> {
        Ok(GenericNode::Float(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<GenericNode> {
        Ok(GenericNode::Float(v as f64))
    }

    fn serialize_u8(self, v: u8) -> Result<GenericNode> {
        Ok(GenericNode::Float(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<GenericNode> {
        Ok(GenericNode::Float(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<GenericNode> {
        Ok(GenericNode::Float(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<GenericNode> {
        Ok(GenericNode::Float(v as f64))
    }

    fn serialize_i128(self, _v: i128) -> Result<GenericNode> {
        Err(Error::unsupported("i128"))
    }

    fn serialize_u128(self, _v: u128) -> Result<GenericNode> {
        Err(Error::unsupported("u128"))
    }

    fn serialize_f32(self, v: f32) -> Result<GenericNode> {
        Ok(GenericNode::Float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<GenericNode> {
        Ok(GenericNode::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<GenericNode> {
        Ok(GenericNode::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<GenericNode> {
        Ok(GenericNode::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<GenericNode> {
        Err(Error::unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<GenericNode> {
        Ok(GenericNode::Nil)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<GenericNode> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<GenericNode> {
        Ok(GenericNode::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<GenericNode> {
        Ok(GenericNode::Nil)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<GenericNode> {
        Ok(GenericNode::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<GenericNode> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<GenericNode> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqFlattener> {
        Ok(SeqFlattener {
            flattener: self,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqFlattener> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqFlattener> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantFlattener<SeqFlattener>> {
        Ok(VariantFlattener {
            variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapFlattener> {
        Ok(MapFlattener {
            flattener: self,
            map: Mapping::default(),
            pending: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<StructFlattener> {
        Ok(StructFlattener {
            flattener: self,
            map: Mapping::default(),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantFlattener<StructFlattener>> {
        Ok(VariantFlattener {
            variant,
            inner: self.serialize_struct(name, len)?,
        })
    }
}

// =============================================================================
// Compound serializers
// =============================================================================

/// Collects sequence and tuple elements.
#[doc(hidden)]
pub struct SeqFlattener {
    flattener: Flattener,
    items: Vec<GenericNode>,
}

impl SeqFlattener {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(self.flattener)?);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqFlattener {
    type Ok = GenericNode;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<GenericNode> {
        Ok(GenericNode::Sequence(self.items))
    }
}

impl ser::SerializeTuple for SeqFlattener {
    type Ok = GenericNode;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<GenericNode> {
        Ok(GenericNode::Sequence(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqFlattener {
    type Ok = GenericNode;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<GenericNode> {
        Ok(GenericNode::Sequence(self.items))
    }
}

/// Collects map entries. Keys must flatten to scalars.
#[doc(hidden)]
pub struct MapFlattener {
    flattener: Flattener,
    map: Mapping,
    pending: Option<Key>,
}

impl ser::SerializeMap for MapFlattener {
    type Ok = GenericNode;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.pending = Some(Key::try_from(key.serialize(self.flattener)?)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending
            .take()
            .ok_or_else(|| Error::Encode("map value without a key".into()))?;
        self.map.insert(key, value.serialize(self.flattener)?);
        Ok(())
    }

    fn end(self) -> Result<GenericNode> {
        Ok(GenericNode::Mapping(self.map))
    }
}

/// Collects record fields under their Lua-side names.
#[doc(hidden)]
pub struct StructFlattener {
    flattener: Flattener,
    map: Mapping,
}

impl StructFlattener {
    fn field<T: Serialize + ?Sized>(&mut self, name: &'static str, value: &T) -> Result<()> {
        let node = value.serialize(self.flattener)?;
        self.map.insert(Key::from(name), node);
        Ok(())
    }
}

impl ser::SerializeStruct for StructFlattener {
    type Ok = GenericNode;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<GenericNode> {
        Ok(GenericNode::Mapping(self.map))
    }
}

/// Wraps a tuple or struct variant payload as `{variant = payload}`.
#[doc(hidden)]
pub struct VariantFlattener<S> {
    variant: &'static str,
    inner: S,
}

impl ser::SerializeTupleVariant for VariantFlattener<SeqFlattener> {
    type Ok = GenericNode;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.inner.push(value)
    }

    fn end(self) -> Result<GenericNode> {
        Ok(tagged(self.variant, GenericNode::Sequence(self.inner.items)))
    }
}

impl ser::SerializeStructVariant for VariantFlattener<StructFlattener> {
    type Ok = GenericNode;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.inner.field(key, value)
    }

    fn end(self) -> Result<GenericNode> {
        Ok(tagged(self.variant, GenericNode::Mapping(self.inner.map)))
    }
}
