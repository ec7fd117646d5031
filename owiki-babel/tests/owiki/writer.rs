//! OWiki writer output and round trips through the parser.

use crate::common::{convert, parse_owiki};
use insta::assert_snapshot;
use owiki_babel::FormatRegistry;
use std::collections::HashMap;

#[test]
fn test_normalized_output() {
    let source = "@title Guide\n= Intro\nSome **bold** and *italic* -> done\n\n* a\n** b\n\n|a|b|\n";
    assert_snapshot!(convert(source, "owiki", "owiki"), @r"
    @title Guide

    = Intro

    Some **bold** and *italic* -> done

    * a
    ** b

    |a|b|
    ");
}

#[test]
fn test_literal_text_is_escaped() {
    let source = r"Price: \$5 \* 2 and a\->b";
    assert_snapshot!(convert(source, "owiki", "owiki"), @r"Price: \$5 \* 2 and a-\>b");
}

#[test]
fn test_round_trip_preserves_document() {
    let source = "@title Notes\n@creator Ada\n\n\
                  = Top\n\n\
                  @toc 2\n\n\
                  == Details\n\n\
                  Text with a [http://x.org|link|Home], {img.png|Alt} and :) too.\\\\\n\
                  Second line with {{warn:a span}} and $$e=mc^2$$ {#here}\n\n\
                  # one\n## nested\n# two\n\n\
                  ||Name||Value|\n| a |b|\n|\"|c|\n\n\
                  ```rust\nfn main() {}\n```\n";
    let registry = FormatRegistry::default();
    let doc = parse_owiki(source);
    let written = registry.serialize(&doc, "owiki").unwrap();
    assert_eq!(parse_owiki(&written), doc);
}

#[test]
fn test_blank_lines_option() {
    let registry = FormatRegistry::default();
    let doc = parse_owiki("= A\nB");
    let mut options = HashMap::new();
    options.insert("blank-lines".to_string(), "2".to_string());
    let out = registry.serialize_with_options(&doc, "owiki", &options).unwrap();
    assert_eq!(String::from_utf8(out.into_bytes()).unwrap(), "= A\n\n\nB\n");
}
