//! Error types for parsing and format operations
//!
//! Parsing failures are fatal: the partially built document is discarded and a
//! [`ParseError`] names the offending construct together with the document it
//! originated from. Format-level failures wrap parse errors and add the
//! registry and serialization cases.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while parsing a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An `@include`, `@import` or code-fence include target could not be read
    #[error("{origin}: cannot read included file '{}'", path.display())]
    FileNotFound { path: PathBuf, origin: String },

    /// An `@name` directive that is not part of the directive set
    #[error("{origin}: unknown directive '@{name}'")]
    UnknownDirective { name: String, origin: String },

    /// A file that is already being included or imported further up the chain
    #[error("{origin}: circular include of '{}'", path.display())]
    CircularInclude { path: PathBuf, origin: String },

    /// A `"` row-span marker with no cell above it
    #[error("row-span marker at row {row}, column {column} has no cell above it")]
    InvalidRowSpan { row: usize, column: usize },

    /// A `^` column-span marker with no cell before it
    #[error("column-span marker at the start of row {row}")]
    InvalidColumnSpan { row: usize },
}

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// A construct the target dialect cannot express under a strict policy
    #[error("{dialect} cannot represent {construct}")]
    Unsupported {
        construct: &'static str,
        dialect: &'static str,
    },

    /// Reading auxiliary input (stylesheets, included files) failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::Io(err.to_string())
    }
}
