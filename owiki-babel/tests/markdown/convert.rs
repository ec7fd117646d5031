//! Conversions between Markdown and OWiki.

use crate::common::convert;
use insta::assert_snapshot;
use owiki_babel::model::{Block, Inline};
use owiki_babel::FormatRegistry;

#[test]
fn test_owiki_to_markdown() {
    let source = "= Title\nSome **bold** and *em* text\n\n* a\n* b\n";
    assert_snapshot!(convert(source, "owiki", "markdown"), @r"
    # Title

    Some **bold** and *em* text

    - a
    - b
    ");
}

#[test]
fn test_markdown_to_owiki() {
    let source = "## Notes\n\nSome **bold** text with [a link](http://x.org)\n\n1. first\n2. second\n";
    assert_snapshot!(convert(source, "markdown", "owiki"), @r"
    == Notes

    Some **bold** text with [http://x.org|a link]

    # first
    # second
    ");
}

#[test]
fn test_owiki_only_constructs_keep_their_content() {
    let source = "@toc\n[[aside:\n{{red:kept}} text\n]]";
    assert_eq!(convert(source, "owiki", "markdown"), "kept text\n");
}

#[test]
fn test_markdown_round_trip_through_owiki() {
    let registry = FormatRegistry::default();
    let source = "# Title\n\nA *b* **c** `d`\n\n> quoted\n\n---\n";
    let doc = registry.parse(source, "markdown").unwrap();
    let owiki = registry.serialize(&doc, "owiki").unwrap();
    let back = registry.parse(&owiki, "owiki").unwrap();
    assert_eq!(back.blocks, doc.blocks);
    assert_eq!(
        back.blocks[2],
        Block::Quote(vec![Inline::run("quoted")])
    );
}
