//! OWiki format implementation
//!
//! OWiki is the native dialect: it is the only format with directives
//! (`@include`, `@import`, `@if`, metadata), variables and symbol tokens, and
//! the writer is built to round-trip through the parser.

use crate::error::FormatError;
use crate::format::{Format, ParseOptions, SerializedDocument};
use crate::model::Document;
use std::collections::HashMap;

pub mod formatting_rules;
pub mod parser;
pub mod serializer;

use formatting_rules::FormattingRules;
use serializer::OwikiSerializer;

/// Format implementation for OWiki markup
#[derive(Default)]
pub struct OwikiFormat {
    rules: FormattingRules,
}

impl OwikiFormat {
    pub fn new(rules: FormattingRules) -> Self {
        Self { rules }
    }

    /// Writer rules with `--extra-*` style overrides applied.
    fn rules_with_options(
        &self,
        options: &HashMap<String, String>,
    ) -> Result<FormattingRules, FormatError> {
        let mut rules = self.rules.clone();
        for (key, value) in options {
            match key.as_str() {
                "encode-characters" => rules.encode_characters = parse_flag(key, value)?,
                "break-after-line-break" => rules.break_after_line_break = parse_flag(key, value)?,
                "blank-lines" => {
                    rules.blank_lines_between_blocks = value.parse().map_err(|_| {
                        FormatError::SerializationError(format!(
                            "Invalid value '{value}' for '{key}': expected a number"
                        ))
                    })?
                }
                _ => tracing::warn!(option = %key, "ignoring unknown owiki option"),
            }
        }
        Ok(rules)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, FormatError> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(FormatError::SerializationError(format!(
            "Invalid value '{value}' for '{key}': expected true or false"
        ))),
    }
}

impl Format for OwikiFormat {
    fn name(&self) -> &str {
        "owiki"
    }

    fn description(&self) -> &str {
        "OWiki markup with directives, variables and symbols"
    }

    fn file_extensions(&self) -> &[&str] {
        &["owiki", "wiki"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        self.parse_with_options(source, &ParseOptions::default())
    }

    fn parse_with_options(
        &self,
        source: &str,
        options: &ParseOptions,
    ) -> Result<Document, FormatError> {
        parser::parse_owiki(source, options).map_err(FormatError::from)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        OwikiSerializer::new(self.rules.clone()).serialize(doc)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let rules = self.rules_with_options(options)?;
        OwikiSerializer::new(rules)
            .serialize(doc)
            .map(SerializedDocument::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::model::{Block, Inline};

    #[test]
    fn test_owiki_format_capabilities() {
        let format = OwikiFormat::default();
        assert_eq!(format.name(), "owiki");
        assert!(format.supports_parsing());
        assert!(format.supports_serialization());
        assert_eq!(format.file_extensions(), &["owiki", "wiki"]);
    }

    #[test]
    fn test_parse_errors_become_format_errors() {
        let format = OwikiFormat::default();
        let err = format.parse("@frobnicate now").unwrap_err();
        assert!(matches!(
            err,
            FormatError::ParseError(ParseError::UnknownDirective { ref name, .. }) if name == "frobnicate"
        ));
    }

    #[test]
    fn test_parse_with_defines() {
        let format = OwikiFormat::default();
        let source = "@if draft\nHidden\n@endif\nShown";

        let doc = format.parse(source).unwrap();
        assert_eq!(doc.blocks, vec![Block::Paragraph(vec![Inline::run("Shown")])]);

        let options = ParseOptions::default().with_define("draft");
        let doc = format.parse_with_options(source, &options).unwrap();
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn test_round_trip() {
        let format = OwikiFormat::default();
        let source = "@title Guide\n\n\
                      = Intro\n\n\
                      Some **bold** and *italic* text -> done (C) :)\n\n\
                      * one\n*# first\n* two\n\n\
                      > quoted\n\n\
                      ||H1||H2|\n|a|b|\n\n\
                      [[note:\nInside [http://x.org|a link] and `code`\n]]\n\n\
                      @toc 2\n";
        let doc = format.parse(source).unwrap();
        let written = format.serialize(&doc).unwrap();
        let reparsed = format.parse(&written).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_serialize_with_options() {
        let format = OwikiFormat::default();
        let doc = format.parse("= A\nB").unwrap();

        let mut options = HashMap::new();
        options.insert("blank-lines".to_string(), "2".to_string());
        let out = format.serialize_with_options(&doc, &options).unwrap();
        assert_eq!(
            String::from_utf8(out.into_bytes()).unwrap(),
            "= A\n\n\nB\n"
        );

        options.insert("encode-characters".to_string(), "maybe".to_string());
        assert!(format.serialize_with_options(&doc, &options).is_err());
    }
}
