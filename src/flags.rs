//! Error type for parsing combined flag values, see [`crate::flags!`].

use std::fmt;

/// A flag name that does not match any declared member or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsParseError {
    member: String,
}

impl FlagsParseError {
    #[doc(hidden)]
    pub fn unknown_member(member: &str) -> Self {
        Self {
            member: member.to_owned(),
        }
    }

    /// The offending name as it appeared in the input, trimmed.
    pub fn member(&self) -> &str {
        &self.member
    }
}

impl fmt::Display for FlagsParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown flag member `{}`", self.member)
    }
}

impl std::error::Error for FlagsParseError {}
