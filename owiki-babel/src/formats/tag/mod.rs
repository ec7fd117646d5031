//! XML-like document model dump
//!
//! Serializes the document model directly to an XML-like format, one node per
//! line. Useful for inspecting what a parser produced.
//!
//! ## Format
//!
//! - Node kind → tag name
//! - Leaf text (runs, code, equations) → text content
//! - Identifying properties (levels, urls, classes) → attributes
//! - Children → nested tags (no wrapper)
//!
//! ## Example
//!
//! ```text
//! <document>
//!   <header level="1">
//!     <run>Introduction</run>
//!   </header>
//!   <paragraph>
//!     <run>Welcome to the </run>
//!     <strong>
//!       <run>guide</run>
//!     </strong>
//!   </paragraph>
//! </document>
//! ```

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::formatter::{FormatResult, Formatter};
use crate::model::{
    CellAlignment, CodeBlock, CodeLanguage, Document, Header, Inline, List, ListKind, Section,
    Table, TableCell, TableRow,
};
use std::collections::HashMap;

pub struct TagFormatter {
    output: String,
    depth: usize,
    full: bool,
}

impl TagFormatter {
    /// `full` adds metadata and per-cell layout details.
    pub fn new(full: bool) -> Self {
        Self {
            output: String::new(),
            depth: 0,
            full,
        }
    }

    pub fn serialize(mut self, doc: &Document) -> Result<String, FormatError> {
        self.write_document(doc)?;
        Ok(self.output)
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }

    fn leaf(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> FormatResult {
        let line = format!(
            "{}<{tag}{}>{}</{tag}>\n",
            self.indent(),
            attributes(attrs),
            escape_xml(text)
        );
        self.output.push_str(&line);
        Ok(())
    }

    /// Write `tag` around whatever `children` writes. A node without children
    /// is closed on the same line.
    fn node<F>(&mut self, tag: &str, attrs: &[(&str, &str)], children: F) -> FormatResult
    where
        F: FnOnce(&mut Self) -> FormatResult,
    {
        let open = format!("{}<{tag}{}>\n", self.indent(), attributes(attrs));
        self.output.push_str(&open);
        let mark = self.output.len();

        self.depth += 1;
        let result = children(self);
        self.depth -= 1;
        result?;

        if self.output.len() == mark {
            self.output.pop();
            self.output.push_str(&format!("</{tag}>\n"));
        } else {
            self.output.push_str(&format!("{}</{tag}>\n", self.indent()));
        }
        Ok(())
    }
}

fn attributes(attrs: &[(&str, &str)]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!(" {name}=\"{}\"", escape_xml(value)))
        .collect()
}

/// Escape XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&apos;")
}

fn alignment_name(align: CellAlignment) -> &'static str {
    match align {
        CellAlignment::None => "none",
        CellAlignment::Left => "left",
        CellAlignment::Center => "center",
        CellAlignment::Right => "right",
    }
}

impl Formatter for TagFormatter {
    fn dialect(&self) -> &'static str {
        "tag"
    }

    fn write_document(&mut self, doc: &Document) -> FormatResult {
        self.output.push_str("<document>\n");
        self.depth = 1;
        if self.full && !doc.metadata.is_empty() {
            self.node("metadata", &[], |f| {
                for (name, value) in doc.metadata.entries() {
                    f.leaf(name, &[], value)?;
                }
                Ok(())
            })?;
        }
        self.write_blocks(&doc.blocks)?;
        self.depth = 0;
        self.output.push_str("</document>");
        Ok(())
    }

    fn write_header(&mut self, header: &Header) -> FormatResult {
        let level = header.level.to_string();
        self.node("header", &[("level", level.as_str())], |f| {
            f.write_inlines(&header.content)
        })
    }

    fn write_paragraph(&mut self, content: &[Inline]) -> FormatResult {
        self.node("paragraph", &[], |f| f.write_inlines(content))
    }

    fn write_list(&mut self, list: &List) -> FormatResult {
        let tag = match list.kind {
            ListKind::Unordered => "unordered-list",
            ListKind::Ordered => "ordered-list",
        };
        self.node(tag, &[], |f| {
            for item in &list.items {
                f.node("item", &[], |f| {
                    f.write_inlines(&item.content)?;
                    match &item.nested {
                        Some(nested) => f.write_list(nested),
                        None => Ok(()),
                    }
                })?;
            }
            Ok(())
        })
    }

    fn write_quote(&mut self, content: &[Inline]) -> FormatResult {
        self.node("quote", &[], |f| f.write_inlines(content))
    }

    fn write_code_block(&mut self, code: &CodeBlock) -> FormatResult {
        self.leaf(
            "code-block",
            &[("language", code.language.as_str())],
            &code.code,
        )
    }

    fn write_horizontal_ruler(&mut self) -> FormatResult {
        self.node("horizontal-ruler", &[], |_| Ok(()))
    }

    fn write_table(&mut self, table: &Table) -> FormatResult {
        self.node("table", &[], |f| {
            for row in &table.rows {
                f.write_table_row(row)?;
            }
            Ok(())
        })
    }

    fn write_table_row(&mut self, row: &TableRow) -> FormatResult {
        self.node("row", &[], |f| {
            for cell in &row.cells {
                f.write_table_cell(cell)?;
            }
            Ok(())
        })
    }

    fn write_table_cell(&mut self, cell: &TableCell) -> FormatResult {
        let tag = if cell.is_header() { "header-cell" } else { "cell" };
        let columns = cell.column_span.to_string();
        let rows = cell.row_span.to_string();
        let mut attrs = Vec::new();
        if self.full {
            attrs.push(("align", alignment_name(cell.align)));
            attrs.push(("colspan", columns.as_str()));
            attrs.push(("rowspan", rows.as_str()));
        }
        self.node(tag, &attrs, |f| f.write_blocks(&cell.content))
    }

    fn write_section(&mut self, section: &Section) -> FormatResult {
        self.node("section", &[("class", section.class.as_str())], |f| {
            f.write_blocks(&section.blocks)
        })
    }

    fn write_table_of_contents(&mut self, levels: u8) -> FormatResult {
        let levels = levels.to_string();
        self.node("table-of-contents", &[("levels", levels.as_str())], |_| Ok(()))
    }

    fn write_run(&mut self, text: &str) -> FormatResult {
        self.leaf("run", &[], text)
    }

    fn write_strong(&mut self, content: &[Inline]) -> FormatResult {
        self.node("strong", &[], |f| f.write_inlines(content))
    }

    fn write_emphasized(&mut self, content: &[Inline]) -> FormatResult {
        self.node("emphasized", &[], |f| f.write_inlines(content))
    }

    fn write_span(&mut self, class: &str, content: &[Inline]) -> FormatResult {
        self.node("span", &[("class", class)], |f| f.write_inlines(content))
    }

    fn write_line_break(&mut self) -> FormatResult {
        self.node("line-break", &[], |_| Ok(()))
    }

    fn write_inline_code(&mut self, code: &str, language: Option<&CodeLanguage>) -> FormatResult {
        match language {
            Some(language) => self.leaf("code", &[("language", language.as_str())], code),
            None => self.leaf("code", &[], code),
        }
    }

    fn write_hyperlink(
        &mut self,
        url: &str,
        title: Option<&str>,
        content: &[Inline],
    ) -> FormatResult {
        let mut attrs = vec![("url", url)];
        if let Some(title) = title {
            attrs.push(("title", title));
        }
        self.node("hyperlink", &attrs, |f| f.write_inlines(content))
    }

    fn write_image(&mut self, source: &str, alt: Option<&str>, link: Option<&str>) -> FormatResult {
        let mut attrs = vec![("source", source)];
        if let Some(link) = link {
            attrs.push(("link", link));
        }
        self.leaf("image", &attrs, alt.unwrap_or_default())
    }

    fn write_symbol(&mut self, file: &str) -> FormatResult {
        self.leaf("symbol", &[], file)
    }

    fn write_anchor(&mut self, name: &str) -> FormatResult {
        self.leaf("anchor", &[], name)
    }

    fn write_equation(&mut self, equation: &str) -> FormatResult {
        self.leaf("equation", &[], equation)
    }

    fn write_non_breaking_space(&mut self) -> FormatResult {
        self.node("non-breaking-space", &[], |_| Ok(()))
    }
}

/// Serialize a document to the tag format
pub fn serialize_document(doc: &Document) -> Result<String, FormatError> {
    serialize_document_with_params(doc, &HashMap::new())
}

/// Serialize a document to the tag format with optional parameters
///
/// # Parameters
///
/// - `"ast-full"`: When set to `"true"`, also dumps the document metadata and
///   the alignment and spans of every table cell.
pub fn serialize_document_with_params(
    doc: &Document,
    params: &HashMap<String, String>,
) -> Result<String, FormatError> {
    let full = params
        .get("ast-full")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);
    TagFormatter::new(full).serialize(doc)
}

/// Format implementation for XML-like tag format
pub struct TagFormat;

impl Format for TagFormat {
    fn name(&self) -> &str {
        "tag"
    }

    fn description(&self) -> &str {
        "XML-like dump of the document model"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tag", "xml"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serialize_document(doc)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        serialize_document_with_params(doc, options).map(SerializedDocument::Text)
    }
}
