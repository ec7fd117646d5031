//! Markdown serialization (Document → Markdown export)
//!
//! Converts documents to CommonMark Markdown with the GFM table extension.
//! Pipeline: Document → Formatter → Comrak AST → Markdown string
//!
//! Markdown has no sections, spans or tables of contents: sections and spans
//! keep their content, the TOC is dropped. Table spans are padded with empty
//! cells so the grid stays rectangular.

use super::default_comrak_options;
use crate::error::FormatError;
use crate::formatter::{FormatResult, Formatter};
use crate::model::{
    Block, CellAlignment, CodeBlock, CodeLanguage, Document, Header, Inline, List, Metadata,
    Section, Table, TableCell,
};
use crate::tables::SymbolTable;
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeLink,
    NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Serialize a document to Markdown
pub fn serialize_to_markdown(doc: &Document) -> Result<String, FormatError> {
    let arena = Arena::new();
    let mut formatter = MarkdownFormatter::new(&arena);
    formatter.write_document(doc)?;

    let mut output = Vec::new();
    let options = default_comrak_options();
    format_commonmark(formatter.root, &options, &mut output).map_err(|e| {
        FormatError::SerializationError(format!("Comrak serialization failed: {e}"))
    })?;

    let markdown = String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))?;

    // Remove Comrak's "end list" HTML comments which appear between consecutive lists
    Ok(markdown.replace("<!-- end list -->\n\n", ""))
}

fn new_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn list_node(ordered: bool) -> NodeList {
    NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: 1,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: true, // Use tight lists to avoid blank lines between items
    }
}

/// YAML front matter holding the populated metadata fields.
fn front_matter(metadata: &Metadata) -> Option<String> {
    let entries = metadata.entries();
    if entries.is_empty() {
        return None;
    }
    let mut yaml = String::from("---\n");
    for (key, value) in entries {
        yaml.push_str(&format!("{key}: {value}\n"));
    }
    yaml.push_str("---\n\n");
    Some(yaml)
}

/// Builds a comrak AST in an arena owned by the caller.
pub struct MarkdownFormatter<'a> {
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
    stack: Vec<&'a AstNode<'a>>,
    symbols: &'static SymbolTable,
}

impl<'a> MarkdownFormatter<'a> {
    pub fn new(arena: &'a Arena<AstNode<'a>>) -> Self {
        Self {
            arena,
            root: new_node(arena, NodeValue::Document),
            stack: Vec::new(),
            symbols: SymbolTable::standard(),
        }
    }

    fn current(&self) -> &'a AstNode<'a> {
        self.stack.last().copied().unwrap_or(self.root)
    }

    fn append(&self, value: NodeValue) -> &'a AstNode<'a> {
        let node = new_node(self.arena, value);
        self.current().append(node);
        node
    }

    fn text(&self, text: &str) {
        if !text.is_empty() {
            self.append(NodeValue::Text(text.replace('\n', " ")));
        }
    }

    /// Append a node and write into it until `body` returns.
    fn within(
        &mut self,
        value: NodeValue,
        body: impl FnOnce(&mut Self) -> FormatResult,
    ) -> FormatResult {
        let node = self.append(value);
        self.stack.push(node);
        let result = body(self);
        self.stack.pop();
        result
    }

    fn write_cell_content(&mut self, cell: &TableCell) -> FormatResult {
        match cell.inline_content() {
            Some(content) => self.write_inlines(&content),
            None => {
                for block in &cell.content {
                    match block {
                        Block::Paragraph(content) => self.write_inlines(content)?,
                        other => tracing::warn!(
                            block = other.kind_name(),
                            "markdown table cells hold inline content only, dropping block"
                        ),
                    }
                }
                Ok(())
            }
        }
    }
}

impl<'a> Formatter for MarkdownFormatter<'a> {
    fn dialect(&self) -> &'static str {
        "markdown"
    }

    fn write_document(&mut self, doc: &Document) -> FormatResult {
        if let Some(yaml) = front_matter(&doc.metadata) {
            self.append(NodeValue::FrontMatter(yaml));
        }
        self.write_blocks(&doc.blocks)
    }

    fn write_header(&mut self, header: &Header) -> FormatResult {
        let heading = NodeHeading {
            level: header.level,
            setext: false,
        };
        self.within(NodeValue::Heading(heading), |f| {
            f.write_inlines(&header.content)
        })
    }

    fn write_paragraph(&mut self, content: &[Inline]) -> FormatResult {
        self.within(NodeValue::Paragraph, |f| f.write_inlines(content))
    }

    fn write_list(&mut self, list: &List) -> FormatResult {
        let ordered = list.is_ordered();
        self.within(NodeValue::List(list_node(ordered)), |f| {
            for item in &list.items {
                f.within(NodeValue::Item(list_node(ordered)), |f| {
                    f.within(NodeValue::Paragraph, |f| f.write_inlines(&item.content))?;
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
        self.within(NodeValue::BlockQuote, |f| {
            f.within(NodeValue::Paragraph, |f| f.write_inlines(content))
        })
    }

    fn write_code_block(&mut self, code: &CodeBlock) -> FormatResult {
        let info = if code.language.is_plain() {
            String::new()
        } else {
            code.language.as_str().to_string()
        };
        let mut literal = code.code.clone();
        if !literal.ends_with('\n') {
            literal.push('\n');
        }
        self.append(NodeValue::CodeBlock(NodeCodeBlock {
            fenced: true,
            fence_char: b'`',
            fence_length: 3,
            fence_offset: 0,
            info,
            literal,
        }));
        Ok(())
    }

    fn write_horizontal_ruler(&mut self) -> FormatResult {
        self.append(NodeValue::ThematicBreak);
        Ok(())
    }

    fn write_table(&mut self, table: &Table) -> FormatResult {
        let columns = table.column_count();
        if columns == 0 {
            return Ok(());
        }

        let mut alignments = vec![TableAlignment::None; columns];
        if let Some(first) = table.rows.first() {
            let mut column = 0;
            for cell in &first.cells {
                if let Some(slot) = alignments.get_mut(column) {
                    *slot = match cell.align {
                        CellAlignment::Left => TableAlignment::Left,
                        CellAlignment::Right => TableAlignment::Right,
                        CellAlignment::Center => TableAlignment::Center,
                        CellAlignment::None => TableAlignment::None,
                    };
                }
                column += cell.column_span.max(1) as usize;
            }
        }

        let node = NodeTable {
            alignments,
            num_columns: columns,
            num_rows: table.rows.len(),
            num_nonempty_cells: 0,
        };
        self.within(NodeValue::Table(node), |f| {
            // logical column -> (rows still covered, columns covered)
            let mut covers: BTreeMap<usize, (u32, usize)> = BTreeMap::new();

            for (index, row) in table.rows.iter().enumerate() {
                // GFM tables always have a header row
                f.within(NodeValue::TableRow(index == 0), |f| {
                    let mut column = 0usize;
                    let mut cells = row.cells.iter();
                    while column < columns {
                        if let Some((remaining, width)) = covers.get_mut(&column) {
                            if *remaining > 0 {
                                *remaining -= 1;
                                let width = *width;
                                for _ in 0..width {
                                    f.append(NodeValue::TableCell);
                                }
                                column += width;
                                continue;
                            }
                        }
                        let Some(cell) = cells.next() else {
                            f.append(NodeValue::TableCell);
                            column += 1;
                            continue;
                        };
                        let width = cell.column_span.max(1) as usize;
                        if cell.row_span > 1 {
                            covers.insert(column, (cell.row_span - 1, width));
                        }
                        f.within(NodeValue::TableCell, |f| f.write_cell_content(cell))?;
                        for _ in 1..width {
                            f.append(NodeValue::TableCell);
                        }
                        column += width;
                    }
                    Ok(())
                })?;
                covers.retain(|_, (remaining, _)| *remaining > 0);
            }
            Ok(())
        })
    }

    fn write_section(&mut self, section: &Section) -> FormatResult {
        self.write_blocks(&section.blocks)
    }

    fn write_table_of_contents(&mut self, _levels: u8) -> FormatResult {
        tracing::debug!("markdown has no table of contents, dropping it");
        Ok(())
    }

    fn write_run(&mut self, text: &str) -> FormatResult {
        self.text(text);
        Ok(())
    }

    fn write_strong(&mut self, content: &[Inline]) -> FormatResult {
        self.within(NodeValue::Strong, |f| f.write_inlines(content))
    }

    fn write_emphasized(&mut self, content: &[Inline]) -> FormatResult {
        self.within(NodeValue::Emph, |f| f.write_inlines(content))
    }

    fn write_span(&mut self, _class: &str, content: &[Inline]) -> FormatResult {
        self.write_inlines(content)
    }

    fn write_line_break(&mut self) -> FormatResult {
        self.append(NodeValue::LineBreak);
        Ok(())
    }

    fn write_inline_code(&mut self, code: &str, _language: Option<&CodeLanguage>) -> FormatResult {
        self.append(NodeValue::Code(NodeCode {
            num_backticks: 1,
            literal: code.to_string(),
        }));
        Ok(())
    }

    fn write_hyperlink(
        &mut self,
        url: &str,
        title: Option<&str>,
        content: &[Inline],
    ) -> FormatResult {
        let link = NodeLink {
            url: url.to_string(),
            title: title.unwrap_or_default().to_string(),
        };
        self.within(NodeValue::Link(link), |f| f.write_inlines(content))
    }

    fn write_image(&mut self, source: &str, alt: Option<&str>, link: Option<&str>) -> FormatResult {
        let image = NodeLink {
            url: source.to_string(),
            title: String::new(),
        };
        let alt = alt.unwrap_or_default();
        let write_image = |f: &mut Self| {
            f.within(NodeValue::Image(image), |f| {
                f.text(alt);
                Ok(())
            })
        };
        match link {
            Some(href) => {
                let wrapper = NodeLink {
                    url: href.to_string(),
                    title: String::new(),
                };
                self.within(NodeValue::Link(wrapper), write_image)
            }
            None => write_image(self),
        }
    }

    fn write_symbol(&mut self, file: &str) -> FormatResult {
        let symbols = self.symbols;
        self.text(symbols.encode(file).unwrap_or(file));
        Ok(())
    }

    fn write_anchor(&mut self, name: &str) -> FormatResult {
        self.append(NodeValue::HtmlInline(format!("<a id=\"{name}\"></a>")));
        Ok(())
    }

    fn write_equation(&mut self, equation: &str) -> FormatResult {
        self.text(&format!("$${equation}$$"));
        Ok(())
    }

    fn write_non_breaking_space(&mut self) -> FormatResult {
        self.text("\u{a0}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellKind, ListItem, ListKind, TableRow};

    fn paragraph(content: Vec<Inline>) -> Document {
        Document::with_blocks(vec![Block::Paragraph(content)])
    }

    fn cell(text: &str) -> TableCell {
        TableCell::new(
            CellKind::Data,
            CellAlignment::None,
            vec![Block::Paragraph(vec![Inline::run(text)])],
        )
    }

    #[test]
    fn test_header_and_inlines() {
        let doc = Document::with_blocks(vec![
            Block::Header(Header::new(2, vec![Inline::run("Title")])),
            Block::Paragraph(vec![
                Inline::run("Some "),
                Inline::Strong(vec![Inline::run("bold")]),
                Inline::run(" and "),
                Inline::Emphasized(vec![Inline::run("italic")]),
                Inline::run(" "),
                Inline::InlineCode {
                    code: "x".into(),
                    language: None,
                },
            ]),
        ]);
        assert_eq!(
            serialize_to_markdown(&doc).unwrap(),
            "## Title\n\nSome **bold** and *italic* `x`\n"
        );
    }

    #[test]
    fn test_nested_list() {
        let mut nested = List::new(ListKind::Ordered);
        nested.items.push(ListItem::new(vec![Inline::run("b")]));
        let mut list = List::new(ListKind::Unordered);
        list.items.push(ListItem {
            content: vec![Inline::run("a")],
            nested: Some(nested),
        });
        let md = serialize_to_markdown(&Document::with_blocks(vec![Block::List(list)])).unwrap();
        assert_eq!(md, "- a\n  1. b\n");
    }

    #[test]
    fn test_code_block() {
        let doc = Document::with_blocks(vec![Block::CodeBlock(CodeBlock {
            language: CodeLanguage::Rust,
            code: "fn main() {}".into(),
        })]);
        let md = serialize_to_markdown(&doc).unwrap();
        assert!(md.starts_with("```"));
        assert!(md.contains("rust\nfn main() {}\n```"));
    }

    #[test]
    fn test_links_and_images() {
        let doc = paragraph(vec![
            Inline::Hyperlink {
                url: "http://x.org".into(),
                title: None,
                content: vec![Inline::run("site")],
            },
            Inline::run(" "),
            Inline::Image {
                source: "a.png".into(),
                alt: Some("A".into()),
                link: None,
            },
        ]);
        assert_eq!(
            serialize_to_markdown(&doc).unwrap(),
            "[site](http://x.org) ![A](a.png)\n"
        );
    }

    #[test]
    fn test_dropped_constructs_keep_content() {
        let doc = Document::with_blocks(vec![
            Block::TableOfContents { levels: 3 },
            Block::Section(Section {
                class: "note".into(),
                blocks: vec![Block::Paragraph(vec![Inline::Span {
                    class: "red".into(),
                    content: vec![Inline::run("kept")],
                }])],
            }),
        ]);
        assert_eq!(serialize_to_markdown(&doc).unwrap(), "kept\n");
    }

    #[test]
    fn test_metadata_front_matter() {
        let mut doc = paragraph(vec![Inline::run("Body")]);
        doc.metadata.title = Some("Notes".into());
        let md = serialize_to_markdown(&doc).unwrap();
        assert!(md.starts_with("---\ntitle: Notes\n---\n"));
        assert!(md.ends_with("Body\n"));
    }

    #[test]
    fn test_table_spans_are_padded() {
        let mut wide = cell("Wide");
        wide.kind = CellKind::Header;
        wide.column_span = 2;
        let table = Table {
            rows: vec![
                TableRow { cells: vec![wide] },
                TableRow {
                    cells: vec![cell("a"), cell("b")],
                },
            ],
        };
        let md = serialize_to_markdown(&Document::with_blocks(vec![Block::Table(table)])).unwrap();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| Wide"));
        assert_eq!(lines[2].matches('|').count(), 3);
    }
}
