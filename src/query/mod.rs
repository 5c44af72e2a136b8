//! Query-string stamp settings.
//!
//! Parses strings like `?yy=24&mm=5&dd=17&scale=0.04&margin=120` into
//! [`Instructions`] that layer over a [`LayoutParams`](crate::LayoutParams).
//! This is the settings surface shared by the CLI (`--params`) and hosts
//! that keep slider state in a URL.
//!
//! # Example
//!
//! ```
//! use zenstamp::{LayoutParams, Margins, query};
//!
//! let result = query::parse("yy=24&mm=5&dd=17&scale=0.04&margin=120&bounds=on");
//! assert!(result.warnings.is_empty());
//!
//! let params = result.instructions.apply(LayoutParams::landscape());
//! assert_eq!(params.scale, 0.04);
//! assert_eq!(params.margins, Margins::uniform_pixels(120.0));
//! assert!(params.show_bounds);
//!
//! let date = result.instructions.date(Default::default());
//! assert_eq!((date.year(), date.month(), date.day()), (24, 5, 17));
//! ```
//!
//! # Keys
//!
//! | key | value |
//! |-----|-------|
//! | `yy`, `year` / `mm`, `month` / `dd`, `day` | integers, clamped on use |
//! | `scale` | glyph height fraction |
//! | `margin` | pixels, both edges |
//! | `margin.right`, `margin.bottom` | pixels, one edge |
//! | `marginx`, `marginy` | fraction of width / height |
//! | `space`, `spaceratio` | gap width ratio |
//! | `gap` | `paired` or `widened` |
//! | `firstspace` | wide-gap multiplier |
//! | `bounds` | `true|false|1|0|yes|no|on|off` |
//! | `format` | `png`, `jpeg`, `jpg` |

mod convert;
pub mod instructions;
mod parse;

pub use instructions::Instructions;

use alloc::string::String;
use alloc::vec::Vec;

/// Result of parsing a settings query string.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed settings.
    pub instructions: Instructions,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from query string parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A key appeared more than once (last value wins).
    DuplicateKey { key: String, value: String },
    /// A key was not recognized.
    KeyNotRecognized { key: String, value: String },
    /// A key was recognized but its value could not be parsed.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl core::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateKey { key, value } => {
                write!(f, "duplicate key {key:?} (using {value:?})")
            }
            Self::KeyNotRecognized { key, .. } => write!(f, "unrecognized key {key:?}"),
            Self::ValueInvalid { key, value, reason } => {
                write!(f, "invalid value {value:?} for {key}: {reason}")
            }
        }
    }
}

/// Parse a settings query string (with or without leading `?`).
pub fn parse(query: &str) -> ParseResult {
    let (instructions, warnings) = parse::parse_query(query);
    ParseResult {
        instructions,
        warnings,
    }
}
