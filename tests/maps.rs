use std::collections::{BTreeMap, HashMap};

use indoc::indoc;
use serde::Deserialize;
use serde_piyaml::{from_str, Error};

#[test]
fn integer_keyed_entries() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Slot {
        x: i32,
    }

    #[derive(Deserialize)]
    struct Doc {
        lookup: BTreeMap<u32, Slot>,
    }

    let parsed: Doc = from_str(indoc! {"
        lookup:
          2:
            x: 42
          3:
            x: 101
    "})
    .unwrap();
    assert_eq!(parsed.lookup[&2], Slot { x: 42 });
    assert_eq!(parsed.lookup[&3], Slot { x: 101 });
}

#[test]
fn string_keyed_scalar_entries() {
    #[derive(Deserialize)]
    struct Doc {
        scores: HashMap<String, i32>,
    }

    let parsed: Doc = from_str(indoc! {"
        scores:
          alice: 3
          bob: 5
    "})
    .unwrap();
    assert_eq!(parsed.scores["alice"], 3);
    assert_eq!(parsed.scores["bob"], 5);
}

#[test]
fn root_mapping_with_typed_keys() {
    let parsed: BTreeMap<i64, String> = from_str("3: 'third'\n7: 'seventh'").unwrap();
    assert_eq!(parsed[&3], "third");
    assert_eq!(parsed[&7], "seventh");
}

#[test]
fn empty_mapping_forms() {
    #[derive(Deserialize)]
    struct Doc {
        literal: BTreeMap<String, i32>,
        empty_block: BTreeMap<String, i32>,
        #[serde(default)]
        absent: BTreeMap<String, i32>,
    }

    let parsed: Doc = from_str(indoc! {"
        literal: {}
        empty_block:
    "})
    .unwrap();
    assert!(parsed.literal.is_empty());
    assert!(parsed.empty_block.is_empty());
    assert!(parsed.absent.is_empty());
}

#[test]
fn non_empty_inline_literal_is_rejected() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Doc {
        lookup: BTreeMap<String, i32>,
    }

    let err = from_str::<Doc>("lookup: {a: 1}").unwrap_err();
    assert!(matches!(err, Error::MalformedCollectionLiteral { .. }));
}

#[test]
fn duplicate_keys_are_not_deduplicated_by_the_engine() {
    // Both pairs reach the accumulating collection; what wins is the
    // collection's own insert semantics (last write, for the std maps).
    let parsed: HashMap<String, i32> = from_str("a: 1\na: 2").unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed["a"], 2);

    let parsed: BTreeMap<u32, i32> = from_str(indoc! {"
        7: 1
        3: 5
        7: 9
    "})
    .unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[&7], 9);
    assert_eq!(parsed[&3], 5);
}

#[test]
fn key_that_does_not_fit_the_key_type() {
    let err = from_str::<BTreeMap<u8, i32>>("300: 1").unwrap_err();
    assert!(matches!(err, Error::Coercion { .. }));
}

#[test]
fn sequence_where_a_mapping_is_expected() {
    let err = from_str::<BTreeMap<String, i32>>("- 1\n- 2").unwrap_err();
    assert!(matches!(err, Error::Unexpected { .. }));
}
