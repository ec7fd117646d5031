//! Directives that depend on parse options or the file system.

use crate::common::{parse_owiki, parse_owiki_with, write_fixture};
use owiki_babel::error::ParseError;
use owiki_babel::format::ParseOptions;
use owiki_babel::model::{Block, Inline};
use owiki_babel::{FormatError, FormatRegistry};

fn paragraph(text: &str) -> Block {
    Block::Paragraph(vec![Inline::run(text)])
}

fn parse_file(path: &std::path::Path) -> Result<owiki_babel::Document, FormatError> {
    let source = std::fs::read_to_string(path).expect("fixture should be readable");
    FormatRegistry::default().parse_with_options(&source, "owiki", &ParseOptions::for_file(path))
}

#[test]
fn test_if_follows_defines() {
    let source = "@if web\nOnline only\n@endif\nEverywhere";
    assert_eq!(parse_owiki(source).blocks, vec![paragraph("Everywhere")]);

    let options = ParseOptions::default().with_define("web");
    assert_eq!(
        parse_owiki_with(source, &options).blocks,
        vec![paragraph("Online only"), paragraph("Everywhere")]
    );
}

#[test]
fn test_variables_and_metadata() {
    let options = ParseOptions::default()
        .with_variable("product", "Widget")
        .with_variable("version", "2.1");
    let doc = parse_owiki_with(
        "@title $product manual\n@version $version\n\nAbout $product.",
        &options,
    );
    assert_eq!(doc.metadata.title.as_deref(), Some("Widget manual"));
    assert_eq!(doc.metadata.get("version"), Some("2.1"));
    assert_eq!(doc.blocks, vec![paragraph("About Widget.")]);
}

#[test]
fn test_syntax_line_is_ignored() {
    let doc = parse_owiki("@syntax owiki\n= Title\n");
    assert!(matches!(&doc.blocks[..], [Block::Header(_)]));
}

#[test]
fn test_include_and_import_chain() {
    // spliced text resolves paths against the including document
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "parts/intro.owiki", "Intro text\n\n@import parts/deeper/more.owiki\n");
    write_fixture(dir.path(), "parts/deeper/more.owiki", "@title Ignored\nMore text\n");
    let main = write_fixture(
        dir.path(),
        "main.owiki",
        "@title Main\n= Start\n@include parts/intro.owiki\nEnd\n",
    );

    let doc = parse_file(&main).unwrap();
    assert_eq!(doc.metadata.title.as_deref(), Some("Main"));
    assert_eq!(doc.blocks.len(), 4);
    assert_eq!(doc.blocks[1], paragraph("Intro text"));
    assert_eq!(doc.blocks[2], paragraph("More text"));
    assert_eq!(doc.blocks[3], paragraph("End"));
}

#[test]
fn test_circular_include_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a.owiki", "A\n\n@include b.owiki\n");
    write_fixture(dir.path(), "b.owiki", "B\n\n@include c.owiki\n");
    write_fixture(dir.path(), "c.owiki", "C\n\n@include a.owiki\n");

    let err = parse_file(&dir.path().join("a.owiki")).unwrap_err();
    assert!(
        matches!(err, FormatError::ParseError(ParseError::CircularInclude { .. })),
        "{err:?}"
    );
}

#[test]
fn test_missing_include_fails() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_fixture(dir.path(), "main.owiki", "@include gone.owiki\n");

    let err = parse_file(&main).unwrap_err();
    assert!(matches!(
        err,
        FormatError::ParseError(ParseError::FileNotFound { ref path, .. }) if path.ends_with("gone.owiki")
    ));
}

#[test]
fn test_unknown_directive_fails() {
    let err = FormatRegistry::default()
        .parse("Text\n\n@nonsense here\n", "owiki")
        .unwrap_err();
    assert!(matches!(
        err,
        FormatError::ParseError(ParseError::UnknownDirective { ref name, .. }) if name == "nonsense"
    ));
}
