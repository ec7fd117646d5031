//! Markdown format implementation
//!
//! This module implements bidirectional conversion between the document model
//! and CommonMark Markdown.
//!
//! # Library Choice
//!
//! We use the `comrak` crate for Markdown parsing and serialization. This choice is based on:
//! - Single crate for both parsing and serialization
//! - Feature-rich with CommonMark compliance
//! - Supports extensions (tables, strikethrough, front matter)
//!
//! # Element Mapping Table
//!
//! | Model Element    | Markdown Equivalent     | Export Notes                         | Import Notes                       |
//! |------------------|-------------------------|--------------------------------------|------------------------------------|
//! | Metadata         | YAML front matter       | `key: value` lines                   | Known keys only                    |
//! | Header           | Heading (# ## ###)      | Direct                               | Levels beyond 5 are clamped        |
//! | Paragraph        | Paragraph               | Direct                               | Soft breaks become spaces          |
//! | List / ListItem  | List (- or 1.)          | Tight lists, nested lists kept       | Extra blocks in items dropped      |
//! | Quote            | Block quote             | One paragraph                        | Paragraphs joined by a space       |
//! | CodeBlock        | Fenced code block       | Language → info string               | First info word → language         |
//! | HorizontalRuler  | Thematic break          | Direct                               | Direct                             |
//! | Table            | GFM table               | Spans padded with empty cells        | First row is the header row        |
//! | Section          | (none)                  | Content only                         | n/a                                |
//! | TableOfContents  | (none)                  | Dropped                              | n/a                                |
//! | Span             | (none)                  | Content only                         | n/a                                |
//! | Anchor           | `<a id="x"></a>`        | Inline HTML                          | Parsed back from inline HTML       |
//! | Symbol           | Token text (`:)`)       | Plain text                           | Plain text                         |
//! | Equation         | `$$…$$` text            | Plain text                           | Plain text                         |
//! | Image with link  | `[![alt](src)](link)`   | Link around the image                | Link around a lone image           |

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::model::Document;
use comrak::ComrakOptions;

pub(crate) fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    // Allow inline HTML output for anchors
    options.render.unsafe_ = true;
    options
}

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown format"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parser::parse_from_markdown(source)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serializer::serialize_to_markdown(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_round_trip() {
        let source = "## Notes\n\nSome **bold** text and a [link](http://x.org)\n\n- one\n- two\n";
        let doc = MarkdownFormat.parse(source).unwrap();
        let written = MarkdownFormat.serialize(&doc).unwrap();
        assert_eq!(MarkdownFormat.parse(&written).unwrap(), doc);
    }
}
