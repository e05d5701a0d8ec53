//! Tolerant BibTeX parsing and formatting
//!
//! This crate turns BibTeX-like bibliographic text into [`Entry`] values and
//! renders them back in a canonical aligned form:
//! - Line comments (an unescaped `%` to end of line) are stripped first
//! - Entry bodies are sliced with a quote-aware brace scanner
//! - Field values may be braced (nested braces allowed), quoted, or bare
//! - Document parsing skips malformed entries; single-entry parsing is
//!   strict and reports why text was rejected

pub mod entry;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod scanner;

pub use entry::{Entry, Field};
pub use error::ParseError;
pub use formatter::{format_document, format_entry};
pub use parser::{parse_document, parse_entry};
pub use scanner::{find_matching_brace, strip_comments};
