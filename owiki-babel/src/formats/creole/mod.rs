//! Creole format implementation
//!
//! Creole 1.0 with the common extensions: `>` quotes and `|=` header cells.
//! Anything the model has beyond that (sections, anchors, spans, equations,
//! image links, cell spans, table of contents) goes through the
//! [`UnsupportedPolicy`] on export.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::model::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use serializer::CreoleSerializer;

/// What the writer does with constructs Creole cannot express.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedPolicy {
    /// Drop the construct with a warning, keeping its content where it has any
    #[default]
    Lenient,
    /// Fail with [`FormatError::Unsupported`]
    Strict,
}

/// Format implementation for Creole markup
#[derive(Default)]
pub struct CreoleFormat {
    policy: UnsupportedPolicy,
}

impl CreoleFormat {
    pub fn new(policy: UnsupportedPolicy) -> Self {
        Self { policy }
    }

    pub fn strict() -> Self {
        Self::new(UnsupportedPolicy::Strict)
    }
}

impl Format for CreoleFormat {
    fn name(&self) -> &str {
        "creole"
    }

    fn description(&self) -> &str {
        "Creole 1.0 wiki markup"
    }

    fn file_extensions(&self) -> &[&str] {
        &["creole"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parser::parse_creole(source))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        CreoleSerializer::new(self.policy).serialize(doc)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let mut policy = self.policy;
        for (key, value) in options {
            match key.as_str() {
                "strict" => {
                    policy = match value.as_str() {
                        "true" | "yes" | "on" | "1" => UnsupportedPolicy::Strict,
                        "false" | "no" | "off" | "0" => UnsupportedPolicy::Lenient,
                        _ => {
                            return Err(FormatError::SerializationError(format!(
                                "Invalid value '{value}' for '{key}': expected true or false"
                            )))
                        }
                    }
                }
                _ => tracing::warn!(option = %key, "ignoring unknown creole option"),
            }
        }
        CreoleSerializer::new(policy)
            .serialize(doc)
            .map(SerializedDocument::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Inline, Section};

    fn sectioned() -> Document {
        Document::with_blocks(vec![Block::Section(Section {
            class: "note".into(),
            blocks: vec![Block::Paragraph(vec![Inline::run("inside")])],
        })])
    }

    #[test]
    fn test_capabilities() {
        let format = CreoleFormat::default();
        assert_eq!(format.name(), "creole");
        assert_eq!(format.file_extensions(), &["creole"]);
        assert!(format.supports_parsing());
        assert!(format.supports_serialization());
    }

    #[test]
    fn test_round_trip() {
        let source = "= Notes\n\nSome **bold** and //italic// with [[http://x.org|a link]]\n\n* one\n** two\n\n|=A|=B|\n|1|2|\n";
        let format = CreoleFormat::default();
        let doc = format.parse(source).unwrap();
        let written = format.serialize(&doc).unwrap();
        assert_eq!(written, source);
    }

    #[test]
    fn test_strict_parameter() {
        let format = CreoleFormat::default();
        assert_eq!(format.serialize(&sectioned()).unwrap(), "inside\n");

        let mut params = HashMap::new();
        params.insert("strict".to_string(), "true".to_string());
        let err = format
            .serialize_with_options(&sectioned(), &params)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            FormatError::Unsupported {
                construct: "section",
                ..
            }
        ));

        params.insert("strict".to_string(), "maybe".to_string());
        assert!(format.serialize_with_options(&sectioned(), &params).is_err());
    }

    #[test]
    fn test_strict_constructor() {
        assert!(CreoleFormat::strict().serialize(&sectioned()).is_err());
    }
}
