//! Markdown parsing (Markdown → Document import)
//!
//! Converts CommonMark Markdown to documents.
//! Pipeline: Markdown string → Comrak AST → Document
//!
//! The mapping is lossy: raw HTML is dropped except for `<a id>` anchors,
//! headings deeper than the model allows are clamped, and list items keep only
//! their inline content and one nested list.

use super::default_comrak_options;
use crate::error::FormatError;
use crate::model::{
    extend_inlines, push_text, Block, CellAlignment, CellKind, CodeBlock, CodeLanguage, Document,
    Header, Inline, List, ListItem, ListKind, Metadata, Table, TableCell, TableRow,
};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena};
use once_cell::sync::Lazy;
use regex::Regex;

static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^<a\s+id="([^"]+)"\s*/?>$"#).unwrap());

/// Parse Markdown string to a document
pub fn parse_from_markdown(source: &str) -> Result<Document, FormatError> {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, source, &options);

    let mut doc = Document::new();
    for child in root.children() {
        collect_block(child, &mut doc.blocks, &mut doc.metadata);
    }
    Ok(doc)
}

fn collect_block<'a>(node: &'a AstNode<'a>, blocks: &mut Vec<Block>, metadata: &mut Metadata) {
    let node_data = node.data.borrow();

    match &node_data.value {
        NodeValue::Heading(heading) => {
            let content = collect_inlines(node);
            blocks.push(Block::Header(Header::new(heading.level as usize, content)));
        }

        NodeValue::Paragraph => {
            let content = collect_inlines(node);
            if !content.is_empty() {
                blocks.push(Block::Paragraph(content));
            }
        }

        NodeValue::List(list) => {
            blocks.push(Block::List(collect_list(node, list.list_type)));
        }

        NodeValue::CodeBlock(code_block) => {
            let tag = code_block.info.split_whitespace().next().unwrap_or("");
            let code = code_block
                .literal
                .strip_suffix('\n')
                .unwrap_or(&code_block.literal);
            blocks.push(Block::CodeBlock(CodeBlock {
                language: CodeLanguage::from_tag(tag),
                code: code.to_string(),
            }));
        }

        NodeValue::BlockQuote => {
            let mut content = Vec::new();
            collect_quote(node, &mut content);
            blocks.push(Block::Quote(content));
        }

        NodeValue::ThematicBreak => blocks.push(Block::HorizontalRuler),

        NodeValue::Table(table) => {
            blocks.push(Block::Table(collect_table(node, &table.alignments)));
        }

        NodeValue::FrontMatter(content) => parse_front_matter(content, metadata),

        NodeValue::HtmlBlock(_) => {
            tracing::debug!("dropping raw HTML block");
        }

        other => {
            tracing::debug!(node = ?other, "skipping unsupported markdown block");
        }
    }
}

/// Simple `key: value` front matter into metadata fields.
fn parse_front_matter(content: &str, metadata: &mut Metadata) {
    let yaml = content
        .trim()
        .trim_start_matches("---")
        .trim_end_matches("---")
        .trim();
    for line in yaml.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !metadata.set(key.trim(), value.to_string()) {
                tracing::debug!(key = key.trim(), "ignoring unknown front matter key");
            }
        }
    }
}

fn collect_list<'a>(node: &'a AstNode<'a>, list_type: ListType) -> List {
    let kind = match list_type {
        ListType::Ordered => ListKind::Ordered,
        ListType::Bullet => ListKind::Unordered,
    };
    let mut list = List::new(kind);

    for item in node.children() {
        let mut entry = ListItem::new(Vec::new());
        for child in item.children() {
            let child_data = child.data.borrow();
            match &child_data.value {
                NodeValue::Paragraph => {
                    if !entry.content.is_empty() {
                        entry.content.push(Inline::LineBreak);
                    }
                    extend_inlines(&mut entry.content, collect_inlines(child));
                }
                NodeValue::List(nested) if entry.nested.is_none() => {
                    entry.nested = Some(collect_list(child, nested.list_type));
                }
                other => {
                    tracing::debug!(node = ?other, "dropping block inside list item");
                }
            }
        }
        list.items.push(entry);
    }
    list
}

/// Quote paragraphs joined by a space; nested blocks contribute their inlines.
fn collect_quote<'a>(node: &'a AstNode<'a>, content: &mut Vec<Inline>) {
    for child in node.children() {
        let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
        if is_paragraph {
            if !content.is_empty() {
                push_text(content, " ");
            }
            extend_inlines(content, collect_inlines(child));
        } else {
            collect_quote(child, content);
        }
    }
}

fn collect_table<'a>(node: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Table {
    let mut table = Table::default();

    for row_node in node.children() {
        let header = matches!(row_node.data.borrow().value, NodeValue::TableRow(true));
        let kind = if header {
            CellKind::Header
        } else {
            CellKind::Data
        };

        let mut row = TableRow::default();
        for (column, cell_node) in row_node.children().enumerate() {
            let align = match alignments.get(column) {
                Some(TableAlignment::Left) => CellAlignment::Left,
                Some(TableAlignment::Right) => CellAlignment::Right,
                Some(TableAlignment::Center) => CellAlignment::Center,
                _ => CellAlignment::None,
            };
            let inlines = collect_inlines(cell_node);
            let content = if inlines.is_empty() {
                Vec::new()
            } else {
                vec![Block::Paragraph(inlines)]
            };
            row.cells.push(TableCell::new(kind, align, content));
        }
        table.rows.push(row);
    }
    table
}

/// Inline children of `node` with adjacent runs merged.
fn collect_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Inline> {
    let mut content = Vec::new();
    for child in node.children() {
        collect_inline(child, &mut content);
    }
    trim_trailing_space(&mut content);
    content
}

fn trim_trailing_space(content: &mut Vec<Inline>) {
    if let Some(Inline::Run(text)) = content.last_mut() {
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        if text.is_empty() {
            content.pop();
        }
    }
}

fn collect_inline<'a>(node: &'a AstNode<'a>, content: &mut Vec<Inline>) {
    let node_data = node.data.borrow();

    match &node_data.value {
        NodeValue::Text(text) => push_text(content, text),

        NodeValue::SoftBreak => push_text(content, " "),

        NodeValue::LineBreak => content.push(Inline::LineBreak),

        NodeValue::Strong => content.push(Inline::Strong(collect_inlines(node))),

        NodeValue::Emph => content.push(Inline::Emphasized(collect_inlines(node))),

        NodeValue::Code(code) => content.push(Inline::InlineCode {
            code: code.literal.clone(),
            language: None,
        }),

        NodeValue::Link(link) => {
            // a link around a lone image is an image with a link target
            let mut children = node.children();
            if let (Some(only), None) = (children.next(), children.next()) {
                if let NodeValue::Image(image) = &only.data.borrow().value {
                    content.push(Inline::Image {
                        source: image.url.clone(),
                        alt: non_empty(collect_text(only)),
                        link: Some(link.url.clone()),
                    });
                    return;
                }
            }
            content.push(Inline::Hyperlink {
                url: link.url.clone(),
                title: non_empty(link.title.clone()),
                content: collect_inlines(node),
            });
        }

        NodeValue::Image(image) => content.push(Inline::Image {
            source: image.url.clone(),
            alt: non_empty(collect_text(node)),
            link: None,
        }),

        NodeValue::HtmlInline(html) => match ANCHOR.captures(html.trim()) {
            Some(captures) => content.push(Inline::Anchor(captures[1].to_string())),
            None => tracing::debug!(html = %html, "dropping inline HTML"),
        },

        // strikethrough, superscript and friends keep their text
        _ => {
            for child in node.children() {
                collect_inline(child, content);
            }
        }
    }
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text_content(node, &mut text);
    text
}

fn collect_text_content<'a>(node: &'a AstNode<'a>, output: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => output.push_str(text),
            NodeValue::Code(code) => output.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
            _ => collect_text_content(child, output),
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Document {
        parse_from_markdown(source).unwrap()
    }

    #[test]
    fn test_heading_and_paragraph() {
        let doc = parse("# Title\n\nSome **bold** and *italic* text\n");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Header(Header::new(1, vec![Inline::run("Title")])),
                Block::Paragraph(vec![
                    Inline::run("Some "),
                    Inline::Strong(vec![Inline::run("bold")]),
                    Inline::run(" and "),
                    Inline::Emphasized(vec![Inline::run("italic")]),
                    Inline::run(" text"),
                ]),
            ]
        );
    }

    #[test]
    fn test_deep_heading_is_clamped() {
        let doc = parse("###### Deep\n");
        assert_eq!(
            doc.blocks,
            vec![Block::Header(Header::new(5, vec![Inline::run("Deep")]))]
        );
    }

    #[test]
    fn test_soft_breaks_become_spaces() {
        let doc = parse("one\ntwo\n");
        assert_eq!(doc.blocks, vec![Block::Paragraph(vec![Inline::run("one two")])]);
    }

    #[test]
    fn test_nested_lists() {
        let doc = parse("- a\n  1. b\n  2. c\n- d\n");
        let Block::List(list) = &doc.blocks[0] else {
            panic!("expected a list");
        };
        assert_eq!(list.kind, ListKind::Unordered);
        assert_eq!(list.items.len(), 2);
        let nested = list.items[0].nested.as_ref().unwrap();
        assert_eq!(nested.kind, ListKind::Ordered);
        assert_eq!(nested.items[1].content, vec![Inline::run("c")]);
    }

    #[test]
    fn test_code_block_language() {
        let doc = parse("```rust\nfn main() {}\n```\n");
        assert_eq!(
            doc.blocks,
            vec![Block::CodeBlock(CodeBlock {
                language: CodeLanguage::Rust,
                code: "fn main() {}".into(),
            })]
        );
    }

    #[test]
    fn test_links_images_and_anchors() {
        let doc = parse("[site](http://x.org \"Home\") [![A](a.png)](http://y.org) <a id=\"top\"></a>\n");
        let Block::Paragraph(content) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(
            content[0],
            Inline::Hyperlink {
                url: "http://x.org".into(),
                title: Some("Home".into()),
                content: vec![Inline::run("site")],
            }
        );
        assert_eq!(
            content[2],
            Inline::Image {
                source: "a.png".into(),
                alt: Some("A".into()),
                link: Some("http://y.org".into()),
            }
        );
        assert!(content.contains(&Inline::Anchor("top".into())));
    }

    #[test]
    fn test_table() {
        let doc = parse("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        let Block::Table(table) = &doc.blocks[0] else {
            panic!("expected a table");
        };
        assert!(table.has_header_row());
        assert_eq!(table.rows[1].cells[0].align, CellAlignment::Left);
        assert_eq!(table.rows[1].cells[1].align, CellAlignment::Right);
        assert_eq!(
            table.rows[1].cells[1].inline_content(),
            Some(vec![Inline::run("2")])
        );
    }

    #[test]
    fn test_quote_and_rule() {
        let doc = parse("> quoted\n> text\n\n---\n");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Quote(vec![Inline::run("quoted text")]),
                Block::HorizontalRuler,
            ]
        );
    }

    #[test]
    fn test_front_matter_sets_metadata() {
        let doc = parse("---\ntitle: Notes\nauthor: nobody\n---\n\nBody\n");
        assert_eq!(doc.metadata.title.as_deref(), Some("Notes"));
        assert_eq!(doc.blocks, vec![Block::Paragraph(vec![Inline::run("Body")])]);
    }
}
