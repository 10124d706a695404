//! Error types for the stub-parser crate

use thiserror::Error;

/// Result type alias for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that abort parsing of a single unit. Other units are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `class`/`module` body was still open at the end of the unit
    #[error("line {line}: namespace `{name}` is never closed")]
    UnterminatedNamespace { name: String, line: u32 },

    /// A `def` body was still open at the end of the unit
    #[error("line {line}: method `{name}` is never closed")]
    UnterminatedMethod { name: String, line: u32 },

    /// An `end` with no matching open namespace
    #[error("line {line}: `end` without an open namespace")]
    UnmatchedEnd { line: u32 },

    /// A declaration that only makes sense inside a namespace body
    #[error("line {line}: `{keyword}` outside of a namespace body")]
    OutsideNamespace { keyword: String, line: u32 },

    /// A line that looks like a declaration but does not parse
    #[error("line {line}: malformed declaration: `{text}`")]
    Malformed { text: String, line: u32 },

    /// A method parameter list that does not parse
    #[error("line {line}: malformed parameter list: `{text}`")]
    MalformedParams { text: String, line: u32 },
}

impl ParseError {
    /// Line number the error was detected on (1-based).
    pub fn line(&self) -> u32 {
        match self {
            ParseError::UnterminatedNamespace { line, .. }
            | ParseError::UnterminatedMethod { line, .. }
            | ParseError::UnmatchedEnd { line }
            | ParseError::OutsideNamespace { line, .. }
            | ParseError::Malformed { line, .. }
            | ParseError::MalformedParams { line, .. } => *line,
        }
    }
}
