//! HTML format implementation
//!
//! This module implements export from the document model to HTML5. Import is
//! not supported.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` pair for serialization: the
//! formatter builds an `RcDom` tree node by node and html5ever's serializer
//! handles escaping and void elements.
//!
//! # Element Mapping Table
//!
//! | Model Element      | HTML Equivalent                                      |
//! |--------------------|------------------------------------------------------|
//! | Header             | `<h1>`..`<h5>`, with `id="toc-N"` when the document has a TOC |
//! | Paragraph          | `<p>`                                                |
//! | List / ListItem    | `<ul>`/`<ol>` and `<li>`, nested lists inside the item |
//! | Quote              | `<blockquote><p>`                                    |
//! | CodeBlock          | `<pre><code class="language-x">`                     |
//! | HorizontalRuler    | `<hr>`                                               |
//! | Table              | `<table>`, `<th>`/`<td>` with colspan, rowspan and text-align |
//! | Section            | `<div class="{class}">`                              |
//! | TableOfContents    | `<nav class="toc">` with nested `<ul>` links         |
//! | Strong / Emphasized| `<strong>` / `<em>`                                  |
//! | Span               | `<span class="{class}">`                             |
//! | LineBreak          | `<br>`                                               |
//! | InlineCode         | `<code>`                                             |
//! | Hyperlink          | `<a href title>`                                     |
//! | Image              | `<img src alt>`, wrapped in `<a>` when it has a link |
//! | Symbol             | `<img class="symbol" src="{symbol_path}/{file}">`    |
//! | Anchor             | `<a id>`                                             |
//! | Equation           | `<span class="equation">`                            |
//! | NonBreakingSpace   | `&nbsp;`                                             |
//!
//! # CSS and Theming
//!
//! Standalone output embeds CSS from:
//! - `css/baseline.css`: Browser reset + default modern presentation (always included)
//! - `css/themes/theme-*.css`: Optional overrides layered on top of the baseline
//!
//! The default theme (`HtmlTheme::Modern`) injects an empty stylesheet so the
//! baseline alone controls rendering. Fancy Serif only adds typography overrides.
//!
//! # Output Modes
//!
//! - Standalone (default): a complete HTML5 document whose title and meta tags
//!   come from the document metadata.
//! - Fragment: only the body markup, one top-level block per line.

mod serializer;

pub use serializer::{serialize_to_html, HtmlFormatter};

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::model::Document;
use std::collections::HashMap;
use std::path::PathBuf;

/// The baseline stylesheet embedded in standalone output.
pub fn get_default_css() -> &'static str {
    include_str!("../../../css/baseline.css")
}

/// Available CSS themes for HTML export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HtmlTheme {
    /// Serif typography override (fonts only, layout comes from baseline)
    FancySerif,
    /// Baseline modern theme (no-op; relies on baseline.css)
    #[default]
    Modern,
}

impl HtmlTheme {
    /// Theme by its configuration name. Unknown names fall back to Modern.
    pub fn from_name(name: &str) -> Self {
        match name {
            "fancy-serif" => HtmlTheme::FancySerif,
            "modern" | "default" => HtmlTheme::Modern,
            other => {
                tracing::warn!(theme = other, "unknown HTML theme, using modern");
                HtmlTheme::Modern
            }
        }
    }
}

/// Options for HTML serialization
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlOptions {
    /// CSS theme to use
    pub theme: HtmlTheme,
    /// Optional custom CSS to append after the baseline and theme CSS
    pub custom_css: Option<String>,
    /// Emit a complete document instead of a fragment
    pub standalone: bool,
    /// Directory (or URL prefix) holding the symbol images
    pub symbol_path: String,
    /// Directory the output is written to; absolute image paths are made relative to it
    pub output_dir: Option<PathBuf>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            theme: HtmlTheme::Modern,
            custom_css: None,
            standalone: true,
            symbol_path: "symbols".to_string(),
            output_dir: None,
        }
    }
}

impl HtmlOptions {
    pub fn new(theme: HtmlTheme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    /// Options for body markup only.
    pub fn fragment() -> Self {
        Self {
            standalone: false,
            ..Self::default()
        }
    }

    pub fn with_custom_css(mut self, css: String) -> Self {
        self.custom_css = Some(css);
        self
    }
}

/// Format implementation for HTML
#[derive(Default)]
pub struct HtmlFormat {
    options: HtmlOptions,
}

impl HtmlFormat {
    /// Create a new HTML format with the specified theme
    pub fn new(theme: HtmlTheme) -> Self {
        Self::with_options(HtmlOptions::new(theme))
    }

    pub fn with_options(options: HtmlOptions) -> Self {
        Self { options }
    }

    /// Create HTML format with fancy serif theme
    pub fn with_fancy_serif() -> Self {
        Self::new(HtmlTheme::FancySerif)
    }

    /// Apply `--extra-*` style parameters on top of the configured options.
    fn options_with(&self, params: &HashMap<String, String>) -> Result<HtmlOptions, FormatError> {
        let mut options = self.options.clone();
        if let Some(theme) = params.get("theme") {
            options.theme = HtmlTheme::from_name(theme);
        }
        if let Some(path) = params.get("css-path") {
            let css = std::fs::read_to_string(path).map_err(|e| {
                FormatError::Io(format!("cannot read stylesheet '{path}': {e}"))
            })?;
            options.custom_css = Some(css);
        }
        if let Some(value) = params.get("standalone") {
            options.standalone = !matches!(value.as_str(), "false" | "no" | "off" | "0");
        }
        if let Some(path) = params.get("symbol-path") {
            options.symbol_path = path.clone();
        }
        if let Some(dir) = params.get("output-dir") {
            options.output_dir = Some(PathBuf::from(dir));
        }
        Ok(options)
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML5 format with embedded CSS"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(FormatError::NotSupported(
            "HTML import is not supported".to_string(),
        ))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serialize_to_html(doc, &self.options)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let options = self.options_with(options)?;
        serialize_to_html(doc, &options).map(SerializedDocument::Text)
    }
}
