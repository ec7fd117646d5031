//! HTML export of OWiki documents.

use crate::common::{html_fragment, parse_owiki};
use insta::assert_snapshot;
use owiki_babel::format::Format;
use owiki_babel::formats::html::{HtmlFormat, HtmlOptions};
use owiki_babel::FormatRegistry;

#[test]
fn test_inline_markup() {
    assert_snapshot!(
        html_fragment("This is **strong** text"),
        @"<p>This is <strong>strong</strong> text</p>"
    );
    assert_snapshot!(
        html_fragment("*em* and `code` and {{hot:span}}"),
        @r#"<p><em>em</em> and <code>code</code> and <span class="hot">span</span></p>"#
    );
}

#[test]
fn test_line_break_and_nbsp() {
    assert_snapshot!(html_fragment(r"one\\two&nbsp;three"), @"<p>one<br>two&nbsp;three</p>");
}

#[test]
fn test_nested_lists() {
    assert_snapshot!(
        html_fragment("* a\n*# b\n* c"),
        @"<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>"
    );
}

#[test]
fn test_table_with_column_span() {
    assert_snapshot!(
        html_fragment("|Cell1|^|\n|Cell3|Cell4|"),
        @r#"<table><tr><td colspan="2">Cell1</td></tr><tr><td>Cell3</td><td>Cell4</td></tr></table>"#
    );
}

#[test]
fn test_links_and_symbols() {
    assert_snapshot!(
        html_fragment("[http://www.google.com] :)"),
        @r#"<p><a href="http://www.google.com">www.google.com</a> <img class="symbol" src="symbols/smile.png" alt=":)"></p>"#
    );
}

#[test]
fn test_section_with_code() {
    assert_snapshot!(
        html_fragment("[[note:\n```rust\nlet x = 1 < 2;\n```\n]]"),
        @r#"<div class="note"><pre><code class="language-rust">let x = 1 &lt; 2;</code></pre></div>"#
    );
}

#[test]
fn test_toc_from_owiki_source() {
    let html = html_fragment("@toc 1\n= One\n== Two");
    assert_snapshot!(html, @r##"
    <nav class="toc"><ul><li><a href="#toc-1">One</a></li></ul></nav>
    <h1 id="toc-1">One</h1>
    <h2 id="toc-2">Two</h2>
    "##);
}

#[test]
fn test_standalone_output_uses_metadata() {
    let doc = parse_owiki("@title Release <2>\n@keywords wiki, notes\n\nBody");
    let html = FormatRegistry::default().serialize(&doc, "html").unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Release &lt;2&gt;</title>"));
    assert!(html.contains("<meta name=\"keywords\" content=\"wiki, notes\">"));
    assert!(html.contains("<p>Body</p>"));
}

#[test]
fn test_symbol_path_option() {
    let options = HtmlOptions {
        symbol_path: "https://cdn.example/icons/".to_string(),
        ..HtmlOptions::fragment()
    };
    let html = HtmlFormat::with_options(options)
        .serialize(&parse_owiki("(!)"))
        .unwrap();
    assert_eq!(
        html,
        "<p><img class=\"symbol\" src=\"https://cdn.example/icons/warning.png\" alt=\"(!)\"></p>"
    );
}
