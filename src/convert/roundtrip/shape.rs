//! Shape detection and unsupported kinds, end to end.

use mlua::Value;
use serde::Serialize;

use super::common::{jan, Person, TestEnv};
use crate::{classify, Error, GenericNode, MapperBuilder, Options, Shape};

#[test]
fn classifier_cases() {
    let env = TestEnv::new(Options::NONE);
    assert_eq!(
        classify(&env.table("return {[1]=1, [2]=2, [3]=3}")).unwrap(),
        Shape::Sequence(3)
    );
    assert_eq!(
        classify(&env.table("return {[1]=1, [2]=2, [4]=4}")).unwrap(),
        Shape::Mapping
    );
    assert_eq!(classify(&env.table("return {a = 1}")).unwrap(), Shape::Mapping);
    assert_eq!(classify(&env.table("return {}")).unwrap(), Shape::Mapping);
}

#[test]
fn empty_table_is_empty_mapping() {
    let env = TestEnv::new(Options::NONE);
    let node = env
        .mapper
        .to_generic(&Value::Table(env.table("return {}")))
        .unwrap();
    assert_eq!(node, GenericNode::Mapping(Default::default()));
}

#[test]
fn decode_rejects_array_root() {
    let env = TestEnv::new(Options::NONE);
    let err = env
        .mapper
        .decode::<Person>(&env.table("return {10, 20, 30}"))
        .unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }), "{err}");
}

#[test]
fn encode_rejects_populated_table() {
    let env = TestEnv::new(Options::NONE);
    let dest = env.table("return {1}");
    let err = env.mapper.encode(&env.lua, &jan(), &dest).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }), "{err}");
}

#[test]
fn function_field_is_unsupported() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table(r#"return { first_name = "Jan", callback = function() end }"#);
    let err = env.mapper.decode::<Person>(&table).unwrap_err();
    assert!(matches!(err, Error::UnsupportedValue(ref kind) if kind == "function"));
}

#[test]
fn userdata_in_sequence_is_unsupported() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table("return { items = { 1, 2, io.stdout } }");
    let err = env
        .mapper
        .decode::<serde_json::Value>(&table)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedValue(ref kind) if kind == "userdata"));
}

#[test]
fn bytes_field_is_unsupported() {
    struct Raw;
    impl Serialize for Raw {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_bytes(b"\x00\x01")
        }
    }

    #[derive(Serialize)]
    struct Packet {
        payload: Raw,
    }

    let env = TestEnv::new(Options::NONE);
    let dest = env.lua.create_table().unwrap();
    let err = env
        .mapper
        .encode(&env.lua, &Packet { payload: Raw }, &dest)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedValue(_)));
    assert_eq!(dest.pairs::<Value, Value>().count(), 0);
}

#[test]
fn self_reference_fails_cleanly() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table("local t = { name = 'loop' } t.next = t return t");
    let err = env.mapper.decode::<serde_json::Value>(&table).unwrap_err();
    assert!(matches!(err, Error::DepthExceeded(_)), "{err}");
}

#[test]
fn depth_limit_applies_to_encode() {
    let env = TestEnv::new(Options::NONE);
    let mapper = MapperBuilder::new().max_depth(2).build();
    let nested = serde_json::json!({"a": {"b": {"c": {"d": 1}}}});
    let err = mapper.to_table(&env.lua, &nested).unwrap_err();
    assert!(matches!(err, Error::DepthExceeded(2)), "{err}");
}

#[test]
fn nil_in_sequence_field_is_rejected() {
    #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
    struct Readings {
        values: Vec<Option<u32>>,
    }

    let env = TestEnv::new(Options::NONE);
    let dest = env.lua.create_table().unwrap();
    let gappy = Readings {
        values: vec![Some(1), None, Some(3)],
    };
    let err = env.mapper.encode(&env.lua, &gappy, &dest).unwrap_err();
    assert!(matches!(err, Error::UnsupportedValue(ref kind) if kind == "nil sequence element"));
    assert_eq!(dest.pairs::<Value, Value>().count(), 0);

    env.assert_roundtrip(&Readings {
        values: vec![Some(1), Some(3)],
    });
}

#[test]
fn i64_max_does_not_survive_the_float_tree() {
    #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
    struct Counter {
        value: i64,
    }

    let env = TestEnv::new(Options::NONE);
    let table = env
        .mapper
        .to_table(&env.lua, &Counter { value: i64::MAX })
        .unwrap();
    assert!(matches!(table.raw_get::<Value>("value").unwrap(), Value::Number(_)));
    let err = env.mapper.decode::<Counter>(&table).unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "{err}");

    env.assert_roundtrip(&Counter { value: 1 << 53 });
}
