use indoc::indoc;
use serde::{Deserialize, Serialize};
use serde_piyaml::{from_str, to_string};

serde_piyaml::flags! {
    /// Multi-choice answer set.
    pub struct Answers: u32 {
        FirstChoice ["first-choice"] = 0x1,
        Second = 0x2,
        Third = 0x4,
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Quiz {
    name: String,
    picked: Answers,
}

#[test]
fn pipe_separated_members() {
    let quiz: Quiz = from_str(indoc! {"
        name: 'colors'
        picked: Second | FirstChoice
    "})
    .unwrap();
    assert_eq!(quiz.picked, Answers::FirstChoice | Answers::Second);
}

#[test]
fn comma_separated_members_and_aliases() {
    let quiz: Quiz = from_str(indoc! {"
        name: 'colors'
        picked: first-choice, Third
    "})
    .unwrap();
    assert_eq!(quiz.picked, Answers::FirstChoice | Answers::Third);
    assert!(quiz.picked.contains(Answers::Third));
}

#[test]
fn quoted_member_lists_also_parse() {
    let quiz: Quiz = from_str("name: 'q'\npicked: 'Second, Third'").unwrap();
    assert_eq!(quiz.picked, Answers::Second | Answers::Third);
}

#[test]
fn unknown_member_fails_with_its_name() {
    let err = from_str::<Quiz>("name: 'q'\npicked: Second | Fourth").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Fourth"), "{text}");
    assert_eq!(err.location().unwrap().line(), 2);
}

#[test]
fn writes_declared_names_joined_with_commas() {
    let quiz = Quiz {
        name: "q".into(),
        picked: Answers::Third | Answers::FirstChoice,
    };
    let text = to_string(&quiz).unwrap();
    assert_eq!(text, "name: 'q'\npicked: 'FirstChoice, Third'\n");

    let back: Quiz = from_str(&text).unwrap();
    assert_eq!(back, quiz);
}

#[test]
fn empty_set_round_trips() {
    let quiz = Quiz {
        name: "q".into(),
        picked: Answers::empty(),
    };
    let text = to_string(&quiz).unwrap();
    assert_eq!(text, "name: 'q'\npicked: ''\n");
    let back: Quiz = from_str(&text).unwrap();
    assert!(back.picked.is_empty());
}
