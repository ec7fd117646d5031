//! JSON document model dump
//!
//! Serializes the document model as pretty-printed JSON through its serde
//! derives. Enum variants are tagged with their snake-case names, so a
//! paragraph reads `{"paragraph": [{"run": "Hello"}]}`.

use crate::error::FormatError;
use crate::format::Format;
use crate::model::Document;

/// Format implementation for the JSON dump
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "JSON dump of the document model"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serde_json::to_string_pretty(doc)
            .map_err(|e| FormatError::SerializationError(format!("JSON serialization failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Header, Inline};
    use serde_json::json;

    #[test]
    fn test_blocks_are_tagged() {
        let doc = Document::with_blocks(vec![
            Block::Header(Header::new(1, vec![Inline::run("Title")])),
            Block::Paragraph(vec![Inline::run("Hello"), Inline::LineBreak]),
            Block::HorizontalRuler,
        ]);
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormat.serialize(&doc).unwrap()).unwrap();

        assert_eq!(
            value["blocks"],
            json!([
                {"header": {"level": 1, "content": [{"run": "Title"}]}},
                {"paragraph": [{"run": "Hello"}, "line_break"]},
                "horizontal_ruler",
            ])
        );
    }

    #[test]
    fn test_metadata_is_included() {
        let mut doc = Document::new();
        doc.metadata.title = Some("Notes".into());
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormat.serialize(&doc).unwrap()).unwrap();
        assert_eq!(value["metadata"]["title"], json!("Notes"));
        assert!(value["metadata"]["date"].is_null());
    }
}
