//! Error types for BibTeX parsing.

/// Error type for parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No `@kind{key,` head was found anywhere in the input.
    #[error("no entry found")]
    NoEntry,

    /// An entry head was found but its body brace never closes.
    #[error("entry '{key}' has no closing brace")]
    UnterminatedEntry { key: String },

    /// A field value opened with `{` or `"` that never closes.
    #[error("field '{field}' has an unterminated value")]
    UnterminatedValue { field: String },
}
