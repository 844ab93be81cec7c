//! Error type and its source location.

use std::fmt;

use serde::{de, ser};

/// Line/column location within the source document (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// 1-indexed line number in the input.
    pub(crate) line: u32,
    /// 1-indexed column number in the input.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not yet available at error creation time.
    pub const UNKNOWN: Self = Self { line: 0, column: 0 };

    /// Create a new location record from 1-indexed coordinates.
    pub(crate) const fn new(line: usize, column: usize) -> Self {
        // Documents this subset is made for are small; u32 is plenty for
        // error reporting.
        Self {
            line: line as u32,
            column: column as u32,
        }
    }

    /// 1-indexed line number.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// 1-indexed column number.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }
}

/// Error type compatible with `serde::de::Error` and `serde::ser::Error`.
///
/// Every failure is fatal for the whole (de)serialization call: there is no
/// recovery, no retry and no partially materialized value.
#[derive(Debug)]
pub enum Error {
    /// Free-form error with optional source location.
    ///
    /// Unknown struct fields and unknown flags-enum members reported by the
    /// serde layer surface through this variant.
    Message { msg: String, location: Location },
    /// Odd leading spaces, a dedent that lands between recorded levels, or an
    /// inconsistently indented sequence entry.
    Indentation { msg: String, location: Location },
    /// Internal container invariant violation, e.g. a value where only a
    /// `key:` is possible, or a container end with no matching start.
    Structural { msg: String, location: Location },
    /// Scalar text does not fit the requested type.
    Coercion {
        expected: &'static str,
        text: String,
        location: Location,
    },
    /// Something other than the expected kind of value was found.
    Unexpected {
        expected: &'static str,
        found: &'static str,
        location: Location,
    },
    /// Text other than `[]` / `{}` where an inline collection literal is
    /// required.
    MalformedCollectionLiteral { text: String, location: Location },
    /// Unexpected end of input.
    Eof { location: Location },
}

impl Error {
    /// Construct a `Message` error with no known location.
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct an `Indentation` error at the given location.
    pub(crate) fn indentation<S: Into<String>>(s: S, location: Location) -> Self {
        Error::Indentation {
            msg: s.into(),
            location,
        }
    }

    /// Construct a `Structural` error at the given location.
    pub(crate) fn structural<S: Into<String>>(s: S, location: Location) -> Self {
        Error::Structural {
            msg: s.into(),
            location,
        }
    }

    /// Construct a `Coercion` error for scalar text that does not fit the
    /// requested type.
    pub(crate) fn coercion(expected: &'static str, text: &str, location: Location) -> Self {
        Error::Coercion {
            expected,
            text: text.to_owned(),
            location,
        }
    }

    /// Convenience for an `Unexpected` error pre-filled with human phrases.
    pub(crate) fn unexpected(
        expected: &'static str,
        found: &'static str,
        location: Location,
    ) -> Self {
        Error::Unexpected {
            expected,
            found,
            location,
        }
    }

    /// Construct an unexpected end-of-input error.
    pub(crate) fn eof(location: Location) -> Self {
        Error::Eof { location }
    }

    /// Attach/override a concrete location to this error and return it.
    ///
    /// Called once the position of the offending token becomes known.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Message { location, .. }
            | Error::Indentation { location, .. }
            | Error::Structural { location, .. }
            | Error::Coercion { location, .. }
            | Error::Unexpected { location, .. }
            | Error::MalformedCollectionLiteral { location, .. }
            | Error::Eof { location } => {
                *location = set_location;
            }
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Message { location, .. }
            | Error::Indentation { location, .. }
            | Error::Structural { location, .. }
            | Error::Coercion { location, .. }
            | Error::Unexpected { location, .. }
            | Error::MalformedCollectionLiteral { location, .. }
            | Error::Eof { location } => {
                if location != &Location::UNKNOWN {
                    Some(*location)
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::Indentation { msg, location } => fmt_with_location(f, msg, location),
            Error::Structural { msg, location } => fmt_with_location(f, msg, location),
            Error::Coercion {
                expected,
                text,
                location,
            } => fmt_with_location(
                f,
                &format!("cannot parse `{text}` as {expected}"),
                location,
            ),
            Error::Unexpected {
                expected,
                found,
                location,
            } => fmt_with_location(f, &format!("expected {expected}, found {found}"), location),
            Error::MalformedCollectionLiteral { text, location } => fmt_with_location(
                f,
                &format!("`{text}` is not a valid inline collection literal (only `[]` and `{{}}` are)"),
                location,
            ),
            Error::Eof { location } => fmt_with_location(f, "unexpected end of input", location),
        }
    }
}

impl std::error::Error for Error {}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::msg(msg.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::msg(msg.to_string())
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location != &Location::UNKNOWN {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.line, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}
