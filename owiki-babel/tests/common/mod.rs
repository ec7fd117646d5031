//! Helpers shared by the integration tests.

#![allow(dead_code)]

use owiki_babel::format::{Format, ParseOptions};
use owiki_babel::formats::html::{HtmlFormat, HtmlOptions};
use owiki_babel::{Document, FormatRegistry};
use std::path::{Path, PathBuf};

/// Parse OWiki source without includes, defines or variables.
pub fn parse_owiki(source: &str) -> Document {
    FormatRegistry::default()
        .parse(source, "owiki")
        .expect("owiki source should parse")
}

/// Parse OWiki source with the given options.
pub fn parse_owiki_with(source: &str, options: &ParseOptions) -> Document {
    FormatRegistry::default()
        .parse_with_options(source, "owiki", options)
        .expect("owiki source should parse")
}

/// Convert between two registered formats.
pub fn convert(source: &str, from: &str, to: &str) -> String {
    let registry = FormatRegistry::default();
    let doc = registry.parse(source, from).expect("source should parse");
    registry.serialize(&doc, to).expect("document should serialize")
}

/// Body markup of the HTML rendering of OWiki source.
pub fn html_fragment(source: &str) -> String {
    HtmlFormat::with_options(HtmlOptions::fragment())
        .serialize(&parse_owiki(source))
        .expect("document should serialize to HTML")
}

/// Write `content` to `name` under `dir` and return the full path.
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("fixture directory should be creatable");
    }
    std::fs::write(&path, content).expect("fixture should be writable");
    path
}
