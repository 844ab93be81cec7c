//! Context stack machine: turns tokenized lines into a balanced event stream.
//!
//! Nesting is tracked with an explicit stack of frames, one per open mapping
//! or sequence. A rising indent pushes a frame, a falling indent pops frames
//! until one whose recorded level matches the destination exactly; landing
//! between recorded levels is fatal. The machine is purely structural: which
//! Rust value a mapping or sequence materializes into is decided later by the
//! serde layer.

use smallvec::SmallVec;

use crate::error::{Error, Location};
use crate::event::Ev;
use crate::tokenizer::{tokenize_line, LineTokens, ScalarKind, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    /// Keys at `Frame::indent`.
    Mapping,
    /// `-` entries at `item_indent`, which is either the owning key's level
    /// or one deeper; both styles are accepted, but all entries of one
    /// sequence must agree.
    Sequence { item_indent: usize },
}

/// Saved scope, pushed when descending into a nested block.
#[derive(Clone, Copy, Debug)]
struct Frame {
    /// For mappings: the level its keys sit at. For sequences: the level of
    /// the owning key, which is where parsing resumes after the sequence.
    indent: usize,
    kind: FrameKind,
}

/// A token seen on an earlier line that still awaits its value block.
#[derive(Clone, Copy, Debug)]
enum Pending {
    /// `key:` with nothing after the colon; `indent` is the key's level.
    Value { indent: usize },
    /// A bare `-` ending its line; `indent` is the element slot's level.
    Element { indent: usize },
}

struct Machine {
    events: Vec<Ev>,
    stack: SmallVec<[Frame; 8]>,
    pending: Option<Pending>,
    last_location: Location,
    /// A sequence frame was closed while resolving the current line. Used to
    /// tell a misindented `-` apart from a `-` that never had a sequence.
    seq_popped: bool,
}

/// Run the machine over the whole input and return the event stream.
///
/// An empty document yields a single null scalar.
pub(crate) fn parse_events(input: &str) -> Result<Vec<Ev>, Error> {
    let mut machine = Machine {
        events: Vec::new(),
        stack: SmallVec::new(),
        pending: None,
        last_location: Location::new(1, 1),
        seq_popped: false,
    };
    for (idx, raw) in input.lines().enumerate() {
        let line = tokenize_line(raw, idx + 1)?;
        if line.tokens.is_empty() {
            continue;
        }
        machine.line(&line)?;
    }
    machine.finish()
}

impl Machine {
    fn line(&mut self, line: &LineTokens) -> Result<(), Error> {
        let indent = line.indent;
        let first = &line.tokens[0];
        let loc = Location::new(line.line, first.col());
        self.last_location = loc;
        self.seq_popped = false;

        self.resolve_pending(indent, first, loc)?;
        if self.pending.is_none() {
            self.resolve_frames(indent, first, loc)?;
        }
        self.emit_tokens(line, loc)
    }

    /// Decide what an outstanding `key:` or bare `-` binds to, now that the
    /// indent of the following content line is known.
    fn resolve_pending(&mut self, indent: usize, first: &Token, loc: Location) -> Result<(), Error> {
        let Some(pending) = self.pending else {
            return Ok(());
        };
        match pending {
            Pending::Value { indent: at } => match first {
                Token::Hyphen { .. } if indent == at || indent == at + 1 => {
                    // The key's value is a sequence; flush and indented
                    // entry styles are both legal.
                    self.events.push(Ev::SeqStart { location: loc });
                    self.stack.push(Frame {
                        indent: at,
                        kind: FrameKind::Sequence { item_indent: indent },
                    });
                    self.pending = None;
                }
                Token::Key { .. } if indent == at + 1 => {
                    self.events.push(Ev::MapStart { location: loc });
                    self.stack.push(Frame {
                        indent,
                        kind: FrameKind::Mapping,
                    });
                    self.pending = None;
                }
                _ if indent <= at => {
                    // Dedent or a sibling key: the value block is empty.
                    self.push_null(loc);
                    self.pending = None;
                }
                Token::Scalar { .. } => Err(Error::structural(
                    "a plain value cannot open a nested block; write it on the `key:` line",
                    loc,
                ))?,
                _ => Err(Error::indentation(
                    format!(
                        "content under a key must be at most one level deeper: key at level {at}, content at level {indent}"
                    ),
                    loc,
                ))?,
            },
            Pending::Element { indent: at } => match first {
                Token::Key { .. } if indent == at + 1 => {
                    self.events.push(Ev::MapStart { location: loc });
                    self.stack.push(Frame {
                        indent,
                        kind: FrameKind::Mapping,
                    });
                    self.pending = None;
                }
                Token::Hyphen { .. } if indent == at + 1 => {
                    // The element is itself a sequence.
                    self.events.push(Ev::SeqStart { location: loc });
                    self.stack.push(Frame {
                        indent: at,
                        kind: FrameKind::Sequence { item_indent: indent },
                    });
                    self.pending = None;
                }
                _ if indent <= at => {
                    // Next entry or dedent: the element was empty.
                    self.push_null(loc);
                    self.pending = None;
                }
                Token::Scalar { .. } if indent == at + 1 => Err(Error::structural(
                    "a plain value cannot open a nested block; write it after the `-`",
                    loc,
                ))?,
                _ => Err(Error::indentation(
                    format!(
                        "content under a `-` must be at most one level deeper: entry at level {at}, content at level {indent}"
                    ),
                    loc,
                ))?,
            },
        }
        Ok(())
    }

    /// Pop frames until the line's first token fits the top of the stack.
    fn resolve_frames(&mut self, indent: usize, first: &Token, loc: Location) -> Result<(), Error> {
        loop {
            let Some(top) = self.stack.last().copied() else {
                // Root scope: the first content line decides the root shape.
                if indent != 0 {
                    return Err(Error::indentation(
                        "the first value must start at indentation level 0",
                        loc,
                    ));
                }
                match first {
                    Token::Key { .. } => {
                        self.events.push(Ev::MapStart { location: loc });
                        self.stack.push(Frame {
                            indent: 0,
                            kind: FrameKind::Mapping,
                        });
                    }
                    Token::Hyphen { .. } => {
                        self.events.push(Ev::SeqStart { location: loc });
                        self.stack.push(Frame {
                            indent: 0,
                            kind: FrameKind::Sequence { item_indent: 0 },
                        });
                    }
                    Token::Scalar { .. } => {
                        if !self.events.is_empty() {
                            return Err(Error::structural(
                                "trailing content after the root value",
                                loc,
                            ));
                        }
                        // A bare root scalar; emitted by `emit_tokens`.
                    }
                }
                return Ok(());
            };

            match top.kind {
                FrameKind::Mapping => match first {
                    Token::Key { .. } => {
                        if indent == top.indent {
                            return Ok(());
                        }
                        if indent < top.indent {
                            self.pop_frame(loc);
                            continue;
                        }
                        return Err(Error::indentation(
                            format!(
                                "key indented too deep: expected level {}, found level {indent}",
                                top.indent
                            ),
                            loc,
                        ));
                    }
                    _ if indent < top.indent => {
                        self.pop_frame(loc);
                        continue;
                    }
                    Token::Hyphen { .. } => {
                        let near_sequence = self.seq_popped
                            || (self.stack.len() >= 2
                                && matches!(
                                    self.stack[self.stack.len() - 2].kind,
                                    FrameKind::Sequence { .. }
                                ));
                        if near_sequence {
                            return Err(Error::indentation(
                                format!(
                                    "inconsistent sequence indentation: `-` at level {indent} does not line up with this sequence's entries"
                                ),
                                loc,
                            ));
                        }
                        return Err(Error::structural(
                            "a sequence entry is not allowed directly inside a mapping; it needs an owning `key:`",
                            loc,
                        ));
                    }
                    Token::Scalar { .. } => {
                        return Err(Error::structural(
                            "expected `key:` inside a mapping",
                            loc,
                        ));
                    }
                },
                FrameKind::Sequence { item_indent } => match first {
                    Token::Hyphen { .. } if indent == item_indent => return Ok(()),
                    _ if indent <= top.indent => {
                        self.pop_frame(loc);
                        continue;
                    }
                    Token::Hyphen { .. } => {
                        return Err(Error::indentation(
                            format!(
                                "inconsistent sequence indentation: this sequence puts `-` at level {item_indent}, found level {indent}"
                            ),
                            loc,
                        ));
                    }
                    _ => {
                        return Err(Error::structural(
                            "expected a `- ` sequence entry",
                            loc,
                        ));
                    }
                },
            }
        }
    }

    /// Emit events for the resolved line's tokens.
    fn emit_tokens(&mut self, line: &LineTokens, first_loc: Location) -> Result<(), Error> {
        let tokens = &line.tokens;
        let mut pos = 0;

        if matches!(tokens.first(), Some(Token::Hyphen { .. })) {
            pos += 1;
            let mut item = match self.stack.last() {
                Some(Frame {
                    kind: FrameKind::Sequence { item_indent },
                    ..
                }) => *item_indent,
                _ => {
                    return Err(Error::structural(
                        "sequence entry without an enclosing sequence",
                        first_loc,
                    ))
                }
            };
            // Further `-` on the same line open nested sequences in the
            // current element slot.
            while let Some(Token::Hyphen { col }) = tokens.get(pos) {
                let loc = Location::new(line.line, *col);
                self.events.push(Ev::SeqStart { location: loc });
                self.stack.push(Frame {
                    indent: item,
                    kind: FrameKind::Sequence {
                        item_indent: item + 1,
                    },
                });
                item += 1;
                pos += 1;
            }
            match tokens.get(pos) {
                None => {
                    // The element body arrives on the following lines.
                    self.pending = Some(Pending::Element { indent: item });
                    return Ok(());
                }
                Some(Token::Key { col, .. }) => {
                    // A record element: its fields sit one level under the
                    // dash, the first one inlined on the dash's line.
                    self.events.push(Ev::MapStart {
                        location: Location::new(line.line, *col),
                    });
                    self.stack.push(Frame {
                        indent: item + 1,
                        kind: FrameKind::Mapping,
                    });
                }
                Some(Token::Scalar { .. }) => {}
                Some(Token::Hyphen { .. }) => unreachable!("consumed above"),
            }
        }

        match tokens.get(pos) {
            None => Ok(()),
            Some(Token::Key { name, col }) => {
                let loc = Location::new(line.line, *col);
                self.events.push(Ev::Scalar {
                    text: name.clone(),
                    kind: ScalarKind::Str,
                    location: loc,
                });
                match tokens.get(pos + 1) {
                    Some(Token::Scalar {
                        text, kind, col, ..
                    }) => {
                        self.events.push(Ev::Scalar {
                            text: text.clone(),
                            kind: *kind,
                            location: Location::new(line.line, *col),
                        });
                        Ok(())
                    }
                    None => {
                        // The value arrives on the following lines, or the
                        // block turns out empty.
                        let at = match self.stack.last() {
                            Some(Frame {
                                indent,
                                kind: FrameKind::Mapping,
                            }) => *indent,
                            _ => {
                                return Err(Error::structural(
                                    "internal error: key outside of a mapping scope",
                                    loc,
                                ))
                            }
                        };
                        self.pending = Some(Pending::Value { indent: at });
                        Ok(())
                    }
                    Some(other) => Err(Error::structural(
                        "unexpected extra token after a value",
                        Location::new(line.line, other.col()),
                    )),
                }
            }
            Some(Token::Scalar {
                text, kind, col, ..
            }) => {
                self.events.push(Ev::Scalar {
                    text: text.clone(),
                    kind: *kind,
                    location: Location::new(line.line, *col),
                });
                Ok(())
            }
            Some(Token::Hyphen { .. }) => unreachable!("hyphens are consumed first"),
        }
    }

    /// Unwind everything at end of input. The final dedent to level 0 always
    /// terminates cleanly.
    fn finish(mut self) -> Result<Vec<Ev>, Error> {
        let loc = self.last_location;
        if self.pending.take().is_some() {
            self.push_null(loc);
        }
        while let Some(frame) = self.stack.pop() {
            self.events.push(match frame.kind {
                FrameKind::Mapping => Ev::MapEnd { location: loc },
                FrameKind::Sequence { .. } => Ev::SeqEnd { location: loc },
            });
        }
        if self.events.is_empty() {
            self.push_null(loc);
        }
        Ok(self.events)
    }

    fn pop_frame(&mut self, loc: Location) {
        if let Some(frame) = self.stack.pop() {
            self.events.push(match frame.kind {
                FrameKind::Mapping => Ev::MapEnd { location: loc },
                FrameKind::Sequence { .. } => {
                    self.seq_popped = true;
                    Ev::SeqEnd { location: loc }
                }
            });
        }
    }

    fn push_null(&mut self, loc: Location) {
        self.events.push(Ev::Scalar {
            text: String::new(),
            kind: ScalarKind::Null,
            location: loc,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compact fingerprint of the event stream for assertions:
    /// `{` `}` `[` `]` for containers, scalar text (or `~` for null) joined
    /// with spaces.
    fn shape(input: &str) -> String {
        let events = parse_events(input).unwrap();
        let mut out = Vec::new();
        for ev in events {
            out.push(match ev {
                Ev::MapStart { .. } => "{".to_owned(),
                Ev::MapEnd { .. } => "}".to_owned(),
                Ev::SeqStart { .. } => "[".to_owned(),
                Ev::SeqEnd { .. } => "]".to_owned(),
                Ev::Scalar { text, kind, .. } => {
                    if kind == ScalarKind::Null {
                        "~".to_owned()
                    } else {
                        text
                    }
                }
            });
        }
        out.join(" ")
    }

    #[test]
    fn nested_key_then_sibling_at_root() {
        assert_eq!(
            shape("sub:\n  a: 1\nother: 2"),
            "{ sub { a 1 } other 2 }"
        );
    }

    #[test]
    fn indented_and_flush_sequences_agree() {
        let expected = "{ items [ { x 1 } { x 2 } ] }";
        assert_eq!(shape("items:\n  - x: 1\n  - x: 2"), expected);
        assert_eq!(shape("items:\n- x: 1\n- x: 2"), expected);
    }

    #[test]
    fn integer_keyed_mapping() {
        assert_eq!(
            shape("lookup:\n  2:\n    x: 42\n  3:\n    x: 101"),
            "{ lookup { 2 { x 42 } 3 { x 101 } } }"
        );
    }

    #[test]
    fn bare_scalar_sequence() {
        assert_eq!(
            shape("integers:\n  - 0\n  - 00\n  - -20\n"),
            "{ integers [ 0 00 -20 ] }"
        );
    }

    #[test]
    fn key_with_empty_value_block_is_null() {
        assert_eq!(shape("sub:\nother: 2"), "{ sub ~ other 2 }");
        assert_eq!(shape("sub:"), "{ sub ~ }");
    }

    #[test]
    fn blank_lines_and_comments_are_ignored() {
        assert_eq!(
            shape("a: 1\n\n# note\n   \nb: 2"),
            "{ a 1 b 2 }"
        );
    }

    #[test]
    fn element_fields_after_inline_first_field() {
        assert_eq!(
            shape("boats:\n  - id: a\n    name: 'b'\n  - id: c"),
            "{ boats [ { id a name b } { id c } ] }"
        );
    }

    #[test]
    fn nested_flush_sequence_inside_element() {
        let text = "boats:\n  - id: x\n    seats:\n    - id: s1\n    - id: s2\n  - id: y\n";
        assert_eq!(
            shape(text),
            "{ boats [ { id x seats [ { id s1 } { id s2 } ] } { id y } ] }"
        );
    }

    #[test]
    fn root_sequence() {
        assert_eq!(shape("- a: 1\n- a: 2"), "[ { a 1 } { a 2 } ]");
    }

    #[test]
    fn lone_dash_opens_element_on_following_lines() {
        assert_eq!(shape("items:\n  -\n    x: 1"), "{ items [ { x 1 } ] }");
        assert_eq!(shape("items:\n  -\n    - 1\n    - 2"), "{ items [ [ 1 2 ] ] }");
    }

    #[test]
    fn inline_nested_dashes() {
        assert_eq!(shape("grid:\n  - - 1\n    - 2"), "{ grid [ [ 1 2 ] ] }");
    }

    #[test]
    fn dedent_must_match_a_recorded_level() {
        let err = parse_events("a:\n  b:\n      c: 1").unwrap_err();
        assert!(matches!(err, Error::Indentation { .. }));
    }

    #[test]
    fn inconsistent_hyphen_indent_is_fatal() {
        let err = parse_events("items:\n  - x: 1\n- x: 2").unwrap_err();
        assert!(matches!(err, Error::Indentation { .. }));
        let err = parse_events("items:\n- x: 1\n  - x: 2").unwrap_err();
        assert!(matches!(err, Error::Indentation { .. }));
    }

    #[test]
    fn odd_indent_is_reported_with_line() {
        let err = parse_events("a: 1\n b: 2").unwrap_err();
        assert!(matches!(err, Error::Indentation { .. }));
        assert_eq!(err.location().unwrap().line(), 2);
    }

    #[test]
    fn empty_document_is_null() {
        assert_eq!(shape(""), "~");
        assert_eq!(shape("# only a comment\n"), "~");
    }

    #[test]
    fn root_scalar() {
        assert_eq!(shape("42"), "42");
    }

    #[test]
    fn hyphen_inside_mapping_without_owner_is_fatal() {
        let err = parse_events("a: 1\n- b").unwrap_err();
        assert!(matches!(err, Error::Structural { .. }));
    }
}
