//! Line tokenizer: indentation measurement and token classification.
//!
//! Each physical line is split into an indentation run and a remainder. The
//! remainder yields a short run of tokens: optional `-` sequence markers, an
//! optional `key:`, and at most one scalar. Comments and blank remainders
//! yield nothing.

use smallvec::SmallVec;

use crate::error::{Error, Location};

/// Lexical classification of a scalar, recorded for untyped deserialization.
///
/// Typed deserialization re-parses the raw text against the requested type,
/// so a quoted `'99'` still coerces into a numeric field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Str,
    Int,
    Hex,
    Float,
    Bool,
    /// Synthesized for keys whose value block turned out to be empty.
    /// Never produced by the tokenizer itself.
    Null,
}

/// One semantic token on a line, with its 1-based starting column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    /// `- `, denotes a sequence element and raises the effective indent by one.
    Hyphen { col: usize },
    /// `identifier:`, optionally with spaces before the colon.
    Key { name: String, col: usize },
    /// Everything else: a classified scalar, quote-stripped when quoted.
    Scalar {
        text: String,
        kind: ScalarKind,
        col: usize,
    },
}

impl Token {
    pub(crate) fn col(&self) -> usize {
        match self {
            Token::Hyphen { col } | Token::Key { col, .. } | Token::Scalar { col, .. } => *col,
        }
    }
}

/// All tokens of one physical line. `tokens` is empty for blank and
/// comment-only lines.
#[derive(Debug)]
pub(crate) struct LineTokens {
    /// 1-based line number.
    pub(crate) line: usize,
    /// Count of 2-space indentation units.
    pub(crate) indent: usize,
    pub(crate) tokens: SmallVec<[Token; 3]>,
}

/// Tokenize one physical line.
///
/// The number of leading spaces must be even (`indent = spaces / 2`); odd
/// counts and tab indentation are fatal.
pub(crate) fn tokenize_line(raw: &str, line_no: usize) -> Result<LineTokens, Error> {
    let line = raw.strip_suffix('\r').unwrap_or(raw);

    let spaces = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[spaces..];

    let mut tokens: SmallVec<[Token; 3]> = SmallVec::new();
    if rest.trim().is_empty() {
        return Ok(LineTokens {
            line: line_no,
            indent: 0,
            tokens,
        });
    }
    if rest.starts_with('\t') {
        return Err(Error::indentation(
            "tab characters are not allowed in indentation",
            Location::new(line_no, spaces + 1),
        ));
    }
    if spaces % 2 != 0 {
        return Err(Error::indentation(
            format!("the number of leading spaces must be even, found {spaces}"),
            Location::new(line_no, spaces + 1),
        ));
    }

    let mut i = spaces;

    // Sequence markers. Each `- ` consumes one logical indent level; the
    // spaces after the dash are not counted by the leading-space measurement.
    while line[i..].starts_with("- ") || &line[i..] == "-" {
        tokens.push(Token::Hyphen { col: i + 1 });
        i += 1;
        i += line[i..].len() - line[i..].trim_start_matches(' ').len();
    }

    if line[i..].trim().is_empty() {
        return Ok(LineTokens {
            line: line_no,
            indent: spaces / 2,
            tokens,
        });
    }

    // At most one `identifier:` per line; the text after the colon is never
    // re-scanned for further keys.
    if let Some((name, value_at)) = match_key(&line[i..]) {
        tokens.push(Token::Key {
            name: name.to_owned(),
            col: i + 1,
        });
        i += value_at;
    }

    let value = &line[i..];
    let lead = value.len() - value.trim_start_matches(' ').len();
    let value = value.trim();
    if !value.is_empty() && !value.starts_with('#') {
        tokens.push(classify_scalar(value, line_no, i + lead + 1)?);
    }

    Ok(LineTokens {
        line: line_no,
        indent: spaces / 2,
        tokens,
    })
}

/// Match `identifier` + optional spaces + `:` at the start of `rest`.
///
/// Returns the identifier and the byte offset just past the colon.
fn match_key(rest: &str) -> Option<(&str, usize)> {
    let bytes = rest.as_bytes();
    let mut end = 0;
    while end < bytes.len()
        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'$')
    {
        end += 1;
    }
    if end == 0 {
        return None;
    }
    let mut colon = end;
    while colon < bytes.len() && bytes[colon] == b' ' {
        colon += 1;
    }
    if colon < bytes.len() && bytes[colon] == b':' {
        Some((&rest[..end], colon + 1))
    } else {
        None
    }
}

/// Classify a trimmed, non-empty scalar by priority: quoted string, hex,
/// float, signed integer, boolean, plain string.
fn classify_scalar(value: &str, line_no: usize, col: usize) -> Result<Token, Error> {
    let location = Location::new(line_no, col);

    if let Some(quote) = leading_quote(value) {
        let text = unquote(value, quote, location)?;
        return Ok(Token::Scalar {
            text,
            kind: ScalarKind::Str,
            col,
        });
    }

    // Plain scalars may carry a trailing comment; ` #` ends the value.
    let value = match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    };

    let kind = if is_hex(value) {
        ScalarKind::Hex
    } else if is_float(value) {
        ScalarKind::Float
    } else if is_int(value) {
        ScalarKind::Int
    } else if value == "true" || value == "false" {
        ScalarKind::Bool
    } else {
        ScalarKind::Str
    };

    Ok(Token::Scalar {
        text: value.to_owned(),
        kind,
        col,
    })
}

fn leading_quote(value: &str) -> Option<char> {
    match value.as_bytes().first() {
        Some(b'\'') => Some('\''),
        Some(b'"') => Some('"'),
        _ => None,
    }
}

/// Strip matching quotes. Inside single quotes, `''` is an escaped quote.
/// Text after the closing quote may only be a comment.
fn unquote(value: &str, quote: char, location: Location) -> Result<String, Error> {
    let body = &value[1..];
    let mut text = String::new();
    let mut rest = body;
    loop {
        let Some(pos) = rest.find(quote) else {
            return Err(Error::structural("unterminated quoted scalar", location));
        };
        text.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        if quote == '\'' && rest.starts_with('\'') {
            text.push('\'');
            rest = &rest[1..];
            continue;
        }
        break;
    }
    let trailing = rest.trim();
    if !trailing.is_empty() && !trailing.starts_with('#') {
        return Err(Error::structural(
            "unexpected text after a quoted scalar",
            location,
        ));
    }
    Ok(text)
}

fn is_hex(value: &str) -> bool {
    let digits = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(d) => d,
        None => return false,
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_int(value: &str) -> bool {
    let digits = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `sign? digits '.' digits (e sign? digits)?` - the dot is mandatory.
fn is_float(value: &str) -> bool {
    let rest = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    let Some(dot) = rest.find('.') else {
        return false;
    };
    let (int_part, after_dot) = (&rest[..dot], &rest[dot + 1..]);
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (frac, exp) = match after_dot.find(['e', 'E']) {
        Some(e) => (&after_dot[..e], Some(&after_dot[e + 1..])),
        None => (after_dot, None),
    };
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match exp {
        None => true,
        Some(exp) => {
            let digits = exp
                .strip_prefix('-')
                .or_else(|| exp.strip_prefix('+'))
                .unwrap_or(exp);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
    }
}
