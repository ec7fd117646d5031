//! Block and inline markup as seen through the registry.

use crate::common::parse_owiki;
use owiki_babel::model::{Block, Inline, ListKind};

fn paragraph_content(source: &str) -> Vec<Inline> {
    match parse_owiki(source).blocks.into_iter().next() {
        Some(Block::Paragraph(content)) => content,
        other => panic!("expected a paragraph, got {other:?}"),
    }
}

#[test]
fn test_escaped_markers_are_literal() {
    assert_eq!(paragraph_content(r"\*a\*"), vec![Inline::run("*a*")]);
    assert_eq!(paragraph_content(r"\`code\`"), vec![Inline::run("`code`")]);
    assert_eq!(paragraph_content(r"\[not a link]"), vec![Inline::run("[not a link]")]);
    assert_eq!(paragraph_content(r"\{not an image}"), vec![Inline::run("{not an image}")]);
    assert_eq!(paragraph_content(r"two\\\here"), vec![Inline::run(r"two\\here")]);
}

#[test]
fn test_header_levels() {
    let source = "= One\n== Two\n=== Three\n==== Four\n===== Five\n";
    let levels: Vec<u8> = parse_owiki(source)
        .blocks
        .iter()
        .map(|block| match block {
            Block::Header(header) => header.level,
            other => panic!("expected a header, got {other:?}"),
        })
        .collect();
    assert_eq!(levels, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_list_returns_to_outer_level() {
    let doc = parse_owiki("* a\n** a1\n*** a1x\n* b\n# c\n");
    assert_eq!(doc.blocks.len(), 1);
    let Block::List(list) = &doc.blocks[0] else {
        panic!("expected a list");
    };
    assert_eq!(list.kind, ListKind::Unordered);
    let contents: Vec<_> = list.items.iter().map(|item| item.content.clone()).collect();
    assert_eq!(
        contents,
        vec![
            vec![Inline::run("a")],
            vec![Inline::run("b")],
            vec![Inline::run("c")],
        ]
    );
    let nested = list.items[0].nested.as_ref().expect("a has a nested list");
    assert!(nested.items[0].nested.is_some());
}

#[test]
fn test_bare_link_text() {
    assert_eq!(
        paragraph_content("[http://www.google.com]"),
        vec![Inline::Hyperlink {
            url: "http://www.google.com".to_string(),
            title: None,
            content: vec![Inline::run("www.google.com")],
        }]
    );
}

#[test]
fn test_column_span_table() {
    let doc = parse_owiki("|Cell1|^|\n|Cell3|Cell4|");
    let Block::Table(table) = &doc.blocks[0] else {
        panic!("expected a table");
    };
    assert_eq!(table.rows[0].cells.len(), 1);
    assert_eq!(table.rows[0].cells[0].column_span, 2);
    assert_eq!(
        table.rows[0].cells[0].inline_content(),
        Some(vec![Inline::run("Cell1")])
    );
    assert_eq!(table.rows[1].cells.len(), 2);
}

#[test]
fn test_mixed_document_structure() {
    let source = "= Guide\n\
                  @toc 2\n\
                  Intro with `code`.\n\n\
                  > A quote\n\n\
                  ---\n\
                  [[aside:\n\
                  ```python\n\
                  print(1)\n\
                  ```\n\
                  ]]\n";
    let kinds: Vec<&str> = parse_owiki(source)
        .blocks
        .iter()
        .map(Block::kind_name)
        .collect();
    assert_eq!(
        kinds,
        vec![
            "header",
            "table of contents",
            "paragraph",
            "quote",
            "horizontal ruler",
            "section",
        ]
    );
}
