use indoc::indoc;
use serde::Deserialize;
use serde_piyaml::{from_str, Error};

#[derive(Deserialize, Debug, PartialEq)]
struct Simple {
    answer: i32,
    name: String,
    enabled: bool,
}

#[test]
fn flat_record() {
    let parsed: Simple = from_str(indoc! {"
        answer: 42
        name: 'joe'
        enabled: true
    "})
    .unwrap();
    assert_eq!(
        parsed,
        Simple {
            answer: 42,
            name: "joe".into(),
            enabled: true,
        }
    );
}

#[test]
fn unquoted_strings_and_numeric_strings() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Person {
        name: String,
        age: String,
    }

    // Plain scalars coerce by the field's type, so a bare number can land in
    // a string field and a quoted number in a numeric one.
    let parsed: Person = from_str("name: joe\nage: 34").unwrap();
    assert_eq!(parsed.name, "joe");
    assert_eq!(parsed.age, "34");

    #[derive(Deserialize)]
    struct Aged {
        age: u8,
    }
    let parsed: Aged = from_str("age: '34'").unwrap();
    assert_eq!(parsed.age, 34);
}

#[test]
fn nested_record_then_sibling() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Inner {
        x: i32,
        y: i32,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Outer {
        sub: Inner,
        other: i32,
    }

    let parsed: Outer = from_str(indoc! {"
        sub:
          x: 1
          y: 2
        other: 3
    "})
    .unwrap();
    assert_eq!(
        parsed,
        Outer {
            sub: Inner { x: 1, y: 2 },
            other: 3,
        }
    );
}

#[test]
fn spaces_before_the_colon_are_tolerated() {
    #[derive(Deserialize)]
    struct Doc {
        sub_class: i32,
    }

    let parsed: Doc = from_str("sub_class  : 7").unwrap();
    assert_eq!(parsed.sub_class, 7);
}

#[test]
fn field_aliases_resolve_display_names() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        #[serde(alias = "anotherAnswer")]
        another_answer: String,
    }

    let parsed: Doc = from_str("anotherAnswer: '99'").unwrap();
    assert_eq!(parsed.another_answer, "99");
}

#[test]
fn missing_fields_use_defaults_when_declared() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        answer: i32,
        #[serde(default)]
        count: u32,
        #[serde(default = "default_label")]
        label: String,
    }

    fn default_label() -> String {
        "none".into()
    }

    let parsed: Doc = from_str("answer: 1").unwrap();
    assert_eq!(
        parsed,
        Doc {
            answer: 1,
            count: 0,
            label: "none".into(),
        }
    );
}

#[test]
fn missing_field_without_default_fails() {
    let err = from_str::<Simple>("answer: 1").unwrap_err();
    assert!(err.to_string().contains("name"));
}

#[test]
fn unknown_fields_are_skipped_by_default() {
    #[derive(Deserialize)]
    struct Doc {
        answer: i32,
    }

    let parsed: Doc = from_str(indoc! {"
        ignored:
          deep:
            x: 1
        answer: 42
        also_ignored:
          - 1
          - 2
    "})
    .unwrap();
    assert_eq!(parsed.answer, 42);
}

#[test]
fn unknown_field_error_carries_the_key_location() {
    #[derive(Deserialize, Debug)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct Doc {
        answer: i32,
    }

    let err = from_str::<Doc>("answer: 42\nbogus: 1").unwrap_err();
    assert!(err.to_string().contains("bogus"));
    assert_eq!(err.location().unwrap().line(), 2);
}

#[test]
fn empty_value_block_means_none() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        present: Option<i32>,
        missing: Option<i32>,
        last: i32,
    }

    let parsed: Doc = from_str(indoc! {"
        present: 5
        missing:
        last: 9
    "})
    .unwrap();
    assert_eq!(
        parsed,
        Doc {
            present: Some(5),
            missing: None,
            last: 9,
        }
    );
}

#[test]
fn plain_enum_variants_parse_from_bare_names() {
    #[derive(Deserialize, Debug, PartialEq)]
    enum Choice {
        First,
        Second,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        choice: Choice,
    }

    let parsed: Doc = from_str("choice: Second").unwrap();
    assert_eq!(parsed.choice, Choice::Second);
    let err = from_str::<Doc>("choice: Third").unwrap_err();
    assert!(err.to_string().contains("Third"));
}

#[test]
fn scalar_where_a_record_is_expected() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Inner {
        x: i32,
    }

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Doc {
        sub: Inner,
    }

    let err = from_str::<Doc>("sub: hello").unwrap_err();
    assert!(matches!(err, Error::MalformedCollectionLiteral { .. }));
}
