//! Record roundtrips: script → record, record → table → record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::common::{jan, Person, TestEnv, PERSON_SCRIPT};
use crate::Options;

#[test]
fn decode_person_script() {
    let env = TestEnv::new(Options::NONE);
    let table = env.global(PERSON_SCRIPT, "person");

    let person: Person = env.mapper.decode(&table).unwrap();
    assert_eq!(person, jan());
}

#[test]
fn encode_person() {
    let env = TestEnv::new(Options::NONE);
    let table = env.lua.create_table().unwrap();
    env.mapper.encode(&env.lua, &jan(), &table).unwrap();

    assert_eq!(
        env.dump(&table),
        "{age=31,first_name=Jan,last_name=Novak,\
         roles={1={name=Administrator},2={name=Operator}},workplace=Prague}"
    );
}

#[test]
fn encoded_table_is_usable_from_lua() {
    let env = TestEnv::new(Options::NONE);
    let table = env.mapper.to_table(&env.lua, &jan()).unwrap();
    env.lua.globals().set("person", table).unwrap();

    let summary: String = env
        .lua
        .load(r#"return person.first_name .. " " .. #person.roles .. " " .. (person.age + 1)"#)
        .eval()
        .unwrap();
    assert_eq!(summary, "Jan 2 32");
}

#[test]
fn person_roundtrip() {
    let env = TestEnv::new(Options::NONE);
    env.assert_roundtrip(&jan());
}

#[test]
fn camel_case_option_keeps_encoded_names() {
    let env = TestEnv::new(Options::CAMEL_CASE);
    let table = env.mapper.to_table(&env.lua, &jan()).unwrap();
    assert_eq!(table.get::<String>("first_name").unwrap(), "Jan");
    assert!(table.get::<Option<String>>("firstName").unwrap().is_none());

    env.assert_roundtrip(&jan());
}

#[test]
fn rename_all_camel_case_roundtrip() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Profile {
        first_name: String,
        last_name: String,
    }

    let env = TestEnv::new(Options::NONE);
    let profile = Profile {
        first_name: "Jan".into(),
        last_name: "Novak".into(),
    };
    let table = env.mapper.to_table(&env.lua, &profile).unwrap();
    assert_eq!(env.dump(&table), "{firstName=Jan,lastName=Novak}");
    env.assert_roundtrip(&profile);
}

#[test]
fn camel_case_decodes_script_keys() {
    let env = TestEnv::new(Options::CAMEL_CASE);
    let table = env.table(
        r#"return {
            firstName = "Jan", lastName = "Novak", age = 31,
            workplace = "Prague", roles = { { name = "Administrator" }, { name = "Operator" } },
        }"#,
    );
    let person: Person = env.mapper.decode(&table).unwrap();
    assert_eq!(person, jan());
}

#[test]
fn explicit_rename_wins() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Tagged {
        #[serde(rename = "FULL-NAME")]
        full_name: String,
        #[serde(rename = "user_id")]
        id: u32,
    }

    let env = TestEnv::new(Options::CAMEL_CASE);
    let table = env.table(r#"return { ["FULL-NAME"] = "Jan Novak", user_id = 7 }"#);
    let tagged: Tagged = env.mapper.decode(&table).unwrap();
    assert_eq!(tagged.id, 7);

    let encoded = env.mapper.to_table(&env.lua, &tagged).unwrap();
    assert_eq!(env.dump(&encoded), "{FULL-NAME=Jan Novak,user_id=7}");
    env.lua.globals().set("tagged", encoded).unwrap();
    let id: u32 = env.lua.load("return tagged.user_id").eval().unwrap();
    assert_eq!(id, 7);

    env.assert_roundtrip(&tagged);
}

#[test]
fn nested_and_optional_roundtrip() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Node {
        label: String,
        weight: f64,
        enabled: bool,
        parent: Option<Box<Node>>,
        children: Vec<Node>,
    }

    let env = TestEnv::new(Options::NONE);
    let leaf = |label: &str| Node {
        label: label.into(),
        weight: 0.5,
        enabled: false,
        parent: None,
        children: vec![],
    };
    let tree = Node {
        label: "root".into(),
        weight: 2.0,
        enabled: true,
        parent: Some(Box::new(leaf("up"))),
        children: vec![leaf("a"), leaf("b")],
    };
    env.assert_roundtrip(&tree);
}

#[test]
fn empty_sequence_roundtrip() {
    let env = TestEnv::new(Options::NONE);
    let mut person = jan();
    person.roles.clear();
    env.assert_roundtrip(&person);
}

#[test]
fn map_field_roundtrip() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Scores {
        by_name: BTreeMap<String, u32>,
        by_rank: BTreeMap<u32, String>,
    }

    let env = TestEnv::new(Options::NONE);
    let scores = Scores {
        by_name: BTreeMap::from([("ann".to_string(), 3), ("bob".to_string(), 5)]),
        by_rank: BTreeMap::from([(1, "bob".to_string()), (3, "ann".to_string())]),
    };
    env.assert_roundtrip(&scores);

    // Keys 1..n come back as an array-shaped table.
    let dense = Scores {
        by_name: BTreeMap::new(),
        by_rank: BTreeMap::from([(1, "ann".to_string()), (2, "bob".to_string())]),
    };
    env.assert_roundtrip(&dense);
}

#[test]
fn enum_field_roundtrip() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Access {
        Guest,
        Member { since: u32 },
        Admin(String),
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Account {
        access: Vec<Access>,
    }

    let env = TestEnv::new(Options::NONE);
    env.assert_roundtrip(&Account {
        access: vec![
            Access::Guest,
            Access::Member { since: 2019 },
            Access::Admin("root".into()),
        ],
    });
}

#[test]
fn from_value_any_root() {
    let env = TestEnv::new(Options::NONE);
    let value: mlua::Value = env.lua.load("return {3, 1, 2}").eval().unwrap();
    let items: Vec<u8> = env.mapper.from_value(&value).unwrap();
    assert_eq!(items, vec![3, 1, 2]);
}
