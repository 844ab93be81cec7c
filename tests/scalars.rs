use indoc::indoc;
use serde::Deserialize;
use serde_piyaml::{from_str, Error};

#[test]
fn hex_literals_are_unsigned_32_bit() {
    #[derive(Deserialize)]
    struct Doc {
        color: u32,
        wide: u64,
        signed: i64,
    }

    let parsed: Doc = from_str(indoc! {"
        color: 0xFFA800
        wide: 0xffffffff
        signed: 0x10
    "})
    .unwrap();
    assert_eq!(parsed.color, 16_754_688);
    assert_eq!(parsed.wide, 4_294_967_295);
    assert_eq!(parsed.signed, 16);

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Overflow {
        wide: u64,
    }
    let err = from_str::<Overflow>("wide: 0x1FFFFFFFF").unwrap_err();
    assert!(matches!(err, Error::Coercion { .. }));
}

#[test]
fn booleans_are_strict() {
    #[derive(Deserialize, Debug)]
    struct Doc {
        flag: bool,
    }

    assert!(!from_str::<Doc>("flag: false").unwrap().flag);
    let err = from_str::<Doc>("flag: True").unwrap_err();
    assert!(matches!(err, Error::Coercion { .. }));
    assert_eq!(err.location().unwrap().line(), 1);
}

#[test]
fn floats_parse_with_and_without_exponent() {
    #[derive(Deserialize)]
    struct Doc {
        a: f32,
        b: f64,
        c: f64,
    }

    let parsed: Doc = from_str(indoc! {"
        a: 2.5
        b: -1.5e3
        c: 7
    "})
    .unwrap();
    assert_eq!(parsed.a, 2.5);
    assert_eq!(parsed.b, -1500.0);
    assert_eq!(parsed.c, 7.0);
}

#[test]
fn quoted_scalars_preserve_text() {
    #[derive(Deserialize)]
    struct Doc {
        single: String,
        double: String,
        escaped: String,
        not_a_comment: String,
    }

    let parsed: Doc = from_str(indoc! {"
        single: 'hello world'
        double: \"greetings\"
        escaped: 'it''s'
        not_a_comment: 'keep # this'
    "})
    .unwrap();
    assert_eq!(parsed.single, "hello world");
    assert_eq!(parsed.double, "greetings");
    assert_eq!(parsed.escaped, "it's");
    assert_eq!(parsed.not_a_comment, "keep # this");
}

#[test]
fn comments_are_stripped() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        a: i32,
        b: String,
    }

    let parsed: Doc = from_str(indoc! {"
        # leading comment
        a: 1 # trailing comment
        b: plain
    "})
    .unwrap();
    assert_eq!(
        parsed,
        Doc {
            a: 1,
            b: "plain".into(),
        }
    );
}

#[test]
fn odd_indentation_is_fatal_with_location() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Doc {
        a: i32,
        b: i32,
    }

    let err = from_str::<Doc>("a: 1\n b: 2").unwrap_err();
    assert!(matches!(err, Error::Indentation { .. }));
    assert_eq!(err.location().unwrap().line(), 2);
}

#[test]
fn tabs_are_rejected() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Doc {
        a: i32,
    }

    let err = from_str::<Doc>("\ta: 1").unwrap_err();
    assert!(matches!(err, Error::Indentation { .. }));
}

#[test]
fn coercion_failures_name_the_text() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Doc {
        answer: i32,
    }

    let err = from_str::<Doc>("answer: duck").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("duck"), "{text}");
    assert!(text.contains("line 1"), "{text}");
}

#[test]
fn bounds_are_enforced_per_target_type() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Doc {
        tiny: i8,
    }

    assert_eq!(from_str::<i8>("-128").unwrap(), -128);
    let err = from_str::<Doc>("tiny: 128").unwrap_err();
    assert!(matches!(err, Error::Coercion { .. }));
}

#[test]
fn root_scalars() {
    assert_eq!(from_str::<i32>("42").unwrap(), 42);
    assert_eq!(from_str::<String>("'hi'").unwrap(), "hi");
    assert_eq!(from_str::<Option<i32>>("").unwrap(), None);
}

#[test]
fn crlf_input_parses() {
    #[derive(Deserialize)]
    struct Doc {
        a: i32,
        b: i32,
    }

    let parsed: Doc = from_str("a: 1\r\nb: 2\r\n").unwrap();
    assert_eq!(parsed.a + parsed.b, 3);
}
