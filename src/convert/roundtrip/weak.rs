//! Weak typing and unknown-field policy through `Mapper`.

use serde::Deserialize;

use super::common::{Person, TestEnv};
use crate::{Error, Options};

#[derive(Debug, Deserialize, PartialEq)]
struct Settings {
    port: u16,
    ratio: f32,
    verbose: bool,
    name: String,
    tags: Vec<String>,
}

#[test]
fn string_number_into_integer() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table(
        r#"return { first_name = "Jan", last_name = "Novak", age = "31",
                    workplace = "Prague", roles = {} }"#,
    );
    let person: Person = env.mapper.decode(&table).unwrap();
    assert_eq!(person.age, 31);
    assert!(person.roles.is_empty());
}

#[test]
fn mixed_weak_inputs() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table(
        r#"return { port = "8080", ratio = "0.25", verbose = 1, name = 42, tags = "solo" }"#,
    );
    let settings: Settings = env.mapper.decode(&table).unwrap();
    assert_eq!(
        settings,
        Settings {
            port: 8080,
            ratio: 0.25,
            verbose: true,
            name: "42".into(),
            tags: vec!["solo".into()],
        }
    );
}

#[test]
fn strict_rejects_extra_key() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table(
        r#"return { port = 1, ratio = 1, verbose = true, name = "x", tags = {}, colour = "red" }"#,
    );
    let err = env.mapper.decode::<Settings>(&table).unwrap_err();
    let Error::Decode(message) = err else {
        panic!("Expected Decode error, got {err:?}");
    };
    assert!(message.contains("colour"), "{message}");
}

#[test]
fn lenient_drops_extra_key() {
    let env = TestEnv::new(Options::LENIENT);
    let table = env.table(
        r#"return { port = 1, ratio = 1, verbose = true, name = "x", tags = {}, colour = "red" }"#,
    );
    let settings: Settings = env.mapper.decode(&table).unwrap();
    assert_eq!(settings.port, 1);
    assert!(settings.tags.is_empty());
}

#[test]
fn strict_applies_to_nested_records() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table(
        r#"return { first_name = "Jan", last_name = "Novak", age = 31, workplace = "Prague",
                    roles = { { name = "Admin", level = 9 } } }"#,
    );
    assert!(matches!(
        env.mapper.decode::<Person>(&table),
        Err(Error::Decode(_))
    ));

    let lenient = TestEnv::new(Options::LENIENT);
    let table = lenient.table(
        r#"return { first_name = "Jan", last_name = "Novak", age = 31, workplace = "Prague",
                    roles = { { name = "Admin", level = 9 } } }"#,
    );
    let person: Person = lenient.mapper.decode(&table).unwrap();
    assert_eq!(person.roles[0].name, "Admin");
}

#[test]
fn type_mismatch_is_decode_error() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table(
        r#"return { port = { 1 }, ratio = 1, verbose = true, name = "x", tags = {} }"#,
    );
    assert!(matches!(
        env.mapper.decode::<Settings>(&table),
        Err(Error::Decode(_))
    ));
}

#[test]
fn missing_field_is_decode_error() {
    let env = TestEnv::new(Options::NONE);
    let table = env.table(r#"return { port = 1 }"#);
    let err = env.mapper.decode::<Settings>(&table).unwrap_err();
    assert!(err.to_string().contains("missing field"), "{err}");
}
