//! Format registry for format discovery and selection
//!
//! This module provides a centralized registry for all available formats.
//! Formats can be registered and retrieved by name, by file extension, or by
//! the `@syntax` line a document may start with.

use crate::error::FormatError;
use crate::format::{Format, ParseOptions, SerializedDocument};
use crate::model::Document;
use std::collections::HashMap;

/// Split a leading `@syntax <name>` line (after any blank lines) off `source`.
///
/// Returns the declared name, if any, and the rest of the document.
pub fn split_syntax_line(source: &str) -> (Option<&str>, &str) {
    let trimmed = source.trim_start();
    let Some(rest) = trimmed.strip_prefix("@syntax") else {
        return (None, source);
    };
    if !rest.starts_with([' ', '\t']) {
        return (None, source);
    }
    let (line, body) = rest.split_once('\n').unwrap_or((rest, ""));
    match line.trim() {
        "" => (None, source),
        name => (Some(name), body),
    }
}

/// Registry of document formats
///
/// Provides a centralized registry for all available formats.
/// Formats can be registered and retrieved by name.
///
/// # Examples
///
/// ```ignore
/// let mut registry = FormatRegistry::new();
/// registry.register(MyFormat);
///
/// let format = registry.get("my-format")?;
/// let doc = format.parse("source text")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Format named by a leading `@syntax` line
    ///
    /// The name may be a format name or one of its file extensions, so
    /// `@syntax md` selects markdown. Unknown names are ignored.
    pub fn detect_syntax(&self, source: &str) -> Option<String> {
        let (name, _) = split_syntax_line(source);
        let name = name?.to_lowercase();
        if self.has(&name) {
            tracing::debug!(syntax = %name, "syntax line selects format");
            return Some(name);
        }
        let found = self
            .formats
            .values()
            .find(|format| format.file_extensions().contains(&name.as_str()))
            .map(|format| format.name().to_string());
        if found.is_none() {
            tracing::debug!(syntax = %name, "ignoring unknown syntax line");
        }
        found
    }

    /// Detect format from filename based on file extension
    ///
    /// Returns the format name if a matching extension is found, or None otherwise.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let registry = FormatRegistry::default();
    /// assert_eq!(registry.detect_format_from_filename("doc.owiki"), Some("owiki".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("doc.md"), Some("markdown".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("doc.unknown"), None);
    /// ```
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        // Extract extension from filename
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        // Search for a format that supports this extension
        for format in self.formats.values() {
            if format.file_extensions().contains(&extension) {
                return Some(format.name().to_string());
            }
        }

        None
    }

    /// Parse source text using the specified format
    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        self.parse_with_options(source, format, &ParseOptions::default())
    }

    /// Parse source text with directives, defines and a base directory
    ///
    /// A leading `@syntax` line is removed before the format sees the source.
    pub fn parse_with_options(
        &self,
        source: &str,
        format: &str,
        options: &ParseOptions,
    ) -> Result<Document, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        let (_, body) = split_syntax_line(source);
        fmt.parse_with_options(body, options)
    }

    /// Serialize a document using the specified format
    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, FormatError> {
        let empty = HashMap::new();
        match self.serialize_with_options(doc, format, &empty)? {
            SerializedDocument::Text(text) => Ok(text),
            SerializedDocument::Binary(_) => Err(FormatError::SerializationError(format!(
                "Format '{format}' produced binary output when text was expected"
            ))),
        }
    }

    /// Serialize a document using the specified format and options
    pub fn serialize_with_options(
        &self,
        doc: &Document,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize_with_options(doc, options)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Register built-in formats
        registry.register(crate::formats::owiki::OwikiFormat::default());
        registry.register(crate::formats::creole::CreoleFormat::default());
        registry.register(crate::formats::markdown::MarkdownFormat);
        registry.register(crate::formats::html::HtmlFormat::default());
        registry.register(crate::formats::tag::TagFormat);
        registry.register(crate::formats::json::JsonFormat);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
