//! Serde support for a small indentation-based configuration format, a strict
//! subset of YAML's block style.
//!
//! Documents are built from three shapes: records (`key: value` lines mapping
//! onto struct fields), sequences (`- ` entries) and keyed mappings with typed
//! keys. Indentation is always two spaces per level, scalars may be plain or
//! quoted, and `#` starts a comment. There are no anchors, no flow
//! collections beyond the empty `[]`/`{}` literals, no multi-line strings and
//! no documents streams.
//!
//! Reading is strict: odd indentation, dedents that land between levels,
//! inconsistently indented sequence entries and unknown coercions all fail
//! with a fatal error carrying a 1-based line and column.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Boat {
//!     name: String,
//!     seats: Vec<u8>,
//! }
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Harbor {
//!     boats: Vec<Boat>,
//! }
//!
//! let text = "\
//! boats:
//!   - name: 'dinghy'
//!     seats:
//!       - 2
//!   - name: 'sloop'
//!     seats:
//!       - 4
//!       - 2
//! ";
//!
//! let harbor: Harbor = serde_piyaml::from_str(text)?;
//! assert_eq!(harbor.boats[1].seats, vec![4, 2]);
//! assert_eq!(serde_piyaml::to_string(&harbor)?, text);
//! # Ok::<(), serde_piyaml::Error>(())
//! ```
//!
//! Bit-flag values that read and write as `Name | Other` lists are declared
//! with the [`flags!`] macro.

mod de;
mod error;
mod event;
mod flags;
mod macros;
mod parse_scalars;
mod parser;
mod ser;
mod tokenizer;

pub use crate::de::from_str;
pub use crate::error::{Error, Location};
pub use crate::flags::FlagsParseError;
pub use crate::ser::to_string;

// Support for macro-generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use serde;
}
