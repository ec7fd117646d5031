//! Format trait definition
//!
//! This module defines the core Format trait that all format implementations must implement.
//! The trait provides a uniform interface for parsing and serializing documents.

use crate::error::FormatError;
use crate::model::Document;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Serialized output produced by a [`Format`] implementation.
#[derive(Debug)]
pub enum SerializedDocument {
    /// UTF-8 text output (e.g., owiki, markdown, HTML)
    Text(String),
    /// Binary output
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }
}

/// Inputs that shape a parse beyond the source text itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Directory that relative includes, imports and image sources resolve against
    pub base_dir: Option<PathBuf>,
    /// Path of the document being parsed, used for cycle detection and error messages
    pub source_path: Option<PathBuf>,
    /// Names tested by `@if`
    pub defines: BTreeSet<String>,
    /// Values substituted for `$name`
    pub variables: BTreeMap<String, String>,
}

impl ParseOptions {
    /// Options for parsing the file at `path`: relative paths resolve against
    /// its directory.
    pub fn for_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            base_dir: path.parent().map(Path::to_path_buf),
            source_path: Some(path.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn with_define(mut self, name: impl Into<String>) -> Self {
        self.defines.insert(name.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// Trait for document formats
///
/// Implementors provide bidirectional conversion between string representation and Document.
/// Formats can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_parsing(&self) -> bool {
///         true
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn parse(&self, source: &str) -> Result<Document, FormatError> {
///         // Parse source to Document
///         todo!()
///     }
///
///     fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
///         // Serialize Document to string
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "owiki", "markdown", "html")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format (e.g., ["owiki"], ["md", "markdown"])
    ///
    /// Returns a slice of file extensions without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (source → Document)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Document → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a Document
    ///
    /// Default implementation returns NotSupported error.
    /// Formats that support parsing should override this method.
    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Parse source text with directives, defines and a base directory.
    ///
    /// Formats without a notion of includes or variables can rely on the
    /// default implementation, which ignores the options.
    fn parse_with_options(
        &self,
        source: &str,
        _options: &ParseOptions,
    ) -> Result<Document, FormatError> {
        self.parse(source)
    }

    /// Serialize a Document into source text
    ///
    /// Default implementation returns NotSupported error.
    /// Formats that support serialization should override this method.
    fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize a Document, optionally using extra parameters.
    ///
    /// Formats that take no parameters can rely on the default implementation,
    /// which delegates to [`Format::serialize`] and rejects any parameter.
    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        if options.is_empty() {
            self.serialize(doc).map(SerializedDocument::Text)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}
