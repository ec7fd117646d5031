//! Conversions between Creole and OWiki.

use crate::common::{convert, parse_owiki};
use owiki_babel::{FormatError, FormatRegistry};
use std::collections::HashMap;

#[test]
fn test_creole_to_owiki() {
    let source = "== Notes\n**bold** and //it//\n* one\n** two\n";
    assert_eq!(
        convert(source, "creole", "owiki"),
        "== Notes\n\n**bold** and *it*\n\n* one\n** two\n"
    );
}

#[test]
fn test_owiki_to_creole() {
    let source = "= T\nSome *em* -> x with [http://x.org|a site]\n";
    assert_eq!(
        convert(source, "owiki", "creole"),
        "= T\n\nSome //em// -> x with [[http://x.org|a site]]\n"
    );
}

#[test]
fn test_strict_export_rejects_owiki_only_constructs() {
    let registry = FormatRegistry::default();
    let doc = parse_owiki("Text with $$x^2$$");

    let lenient = registry.serialize(&doc, "creole").unwrap();
    assert_eq!(lenient, "Text with {{{x^2}}}\n");

    let mut options = HashMap::new();
    options.insert("strict".to_string(), "true".to_string());
    let err = registry
        .serialize_with_options(&doc, "creole", &options)
        .unwrap_err();
    assert!(matches!(
        err,
        FormatError::Unsupported {
            construct: "equation",
            ..
        }
    ));
}

#[test]
fn test_creole_document_survives_owiki() {
    let registry = FormatRegistry::default();
    let source = "= Intro\n\n|=A|=B|\n|1|2|\n\n{{{\ncode\n}}}\n";
    let doc = registry.parse(source, "creole").unwrap();
    let owiki = registry.serialize(&doc, "owiki").unwrap();
    let back = registry.parse(&owiki, "owiki").unwrap();
    assert_eq!(registry.serialize(&back, "creole").unwrap(), source);
}
