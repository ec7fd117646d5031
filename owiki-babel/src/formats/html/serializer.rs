//! HTML serialization (Document → HTML export)
//!
//! Converts documents to semantic HTML5 with embedded CSS.
//! Pipeline: Document → Formatter → RcDom → HTML string

use super::{HtmlOptions, HtmlTheme};
use crate::common::links;
use crate::error::FormatError;
use crate::formatter::{FormatResult, Formatter};
use crate::model::{
    header_anchor, CellAlignment, CodeBlock, CodeLanguage, Document, Header, Inline, List,
    Outline, OutlineNode, Section, Table, TableCell, TableRow,
};
use crate::tables::SymbolTable;
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Serialize a document to HTML with the given options
pub fn serialize_to_html(doc: &Document, options: &HtmlOptions) -> Result<String, FormatError> {
    let mut formatter = HtmlFormatter::new(options);
    formatter.write_document(doc)?;
    let body = serialize_children(&formatter.root)?;

    if !options.standalone {
        return Ok(body);
    }
    Ok(wrap_in_document(&body, doc, options))
}

/// Builds an RcDom under a detached container element.
pub struct HtmlFormatter<'o> {
    options: &'o HtmlOptions,
    symbols: &'static SymbolTable,
    root: Handle,
    stack: Vec<Handle>,
    outline: Outline,
    headers_seen: usize,
    has_toc: bool,
}

impl<'o> HtmlFormatter<'o> {
    pub fn new(options: &'o HtmlOptions) -> Self {
        Self {
            options,
            symbols: SymbolTable::standard(),
            root: create_element("div", vec![("class", "owiki-document")]),
            stack: Vec::new(),
            outline: Outline::default(),
            headers_seen: 0,
            has_toc: false,
        }
    }

    fn current(&self) -> &Handle {
        self.stack.last().unwrap_or(&self.root)
    }

    fn append(&self, node: Handle) {
        self.current().children.borrow_mut().push(node);
    }

    fn text(&self, text: &str) {
        if !text.is_empty() {
            self.append(create_text(text));
        }
    }

    /// Append `node` and write into it until `body` returns.
    fn within(
        &mut self,
        node: Handle,
        body: impl FnOnce(&mut Self) -> FormatResult,
    ) -> FormatResult {
        self.append(node.clone());
        self.stack.push(node);
        let result = body(self);
        self.stack.pop();
        result
    }

    fn image_source(&self, source: &str) -> String {
        match &self.options.output_dir {
            Some(dir) => links::relativize(source, dir),
            None => source.to_string(),
        }
    }

    fn write_outline(&mut self, nodes: &[OutlineNode]) -> FormatResult {
        self.within(create_element("ul", vec![]), |f| {
            for node in nodes {
                f.within(create_element("li", vec![]), |f| {
                    let href = format!("#{}", node.entry.anchor);
                    f.within(create_element("a", vec![("href", &href)]), |f| {
                        f.write_inlines(&node.entry.content)
                    })?;
                    if !node.children.is_empty() {
                        f.write_outline(&node.children)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
    }
}

impl Formatter for HtmlFormatter<'_> {
    fn dialect(&self) -> &'static str {
        "html"
    }

    fn write_document(&mut self, doc: &Document) -> FormatResult {
        self.has_toc = doc.has_table_of_contents();
        if self.has_toc {
            self.outline = doc.outline();
        }
        self.write_blocks(&doc.blocks)
    }

    fn write_header(&mut self, header: &Header) -> FormatResult {
        let tag = format!("h{}", header.level);
        let anchor = header_anchor(self.headers_seen);
        self.headers_seen += 1;

        let attrs = if self.has_toc {
            vec![("id", anchor.as_str())]
        } else {
            vec![]
        };
        self.within(create_element(&tag, attrs), |f| {
            f.write_inlines(&header.content)
        })
    }

    fn write_paragraph(&mut self, content: &[Inline]) -> FormatResult {
        self.within(create_element("p", vec![]), |f| f.write_inlines(content))
    }

    fn write_list(&mut self, list: &List) -> FormatResult {
        let tag = if list.is_ordered() { "ol" } else { "ul" };
        self.within(create_element(tag, vec![]), |f| {
            for item in &list.items {
                f.within(create_element("li", vec![]), |f| {
                    f.write_inlines(&item.content)?;
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
        self.within(create_element("blockquote", vec![]), |f| {
            f.within(create_element("p", vec![]), |f| f.write_inlines(content))
        })
    }

    fn write_code_block(&mut self, code: &CodeBlock) -> FormatResult {
        let class = format!("language-{}", code.language);
        let attrs = if code.language.is_plain() {
            vec![]
        } else {
            vec![("class", class.as_str())]
        };
        self.within(create_element("pre", vec![]), |f| {
            f.within(create_element("code", attrs), |f| {
                f.text(&code.code);
                Ok(())
            })
        })
    }

    fn write_horizontal_ruler(&mut self) -> FormatResult {
        self.append(create_element("hr", vec![]));
        Ok(())
    }

    fn write_table(&mut self, table: &Table) -> FormatResult {
        self.within(create_element("table", vec![]), |f| {
            for row in &table.rows {
                f.write_table_row(row)?;
            }
            Ok(())
        })
    }

    fn write_table_row(&mut self, row: &TableRow) -> FormatResult {
        self.within(create_element("tr", vec![]), |f| {
            for cell in &row.cells {
                f.write_table_cell(cell)?;
            }
            Ok(())
        })
    }

    fn write_table_cell(&mut self, cell: &TableCell) -> FormatResult {
        let tag = if cell.is_header() { "th" } else { "td" };
        let column_span = cell.column_span.to_string();
        let row_span = cell.row_span.to_string();

        let mut attrs = vec![];
        if cell.column_span > 1 {
            attrs.push(("colspan", column_span.as_str()));
        }
        if cell.row_span > 1 {
            attrs.push(("rowspan", row_span.as_str()));
        }
        match cell.align {
            CellAlignment::Left => attrs.push(("style", "text-align: left")),
            CellAlignment::Right => attrs.push(("style", "text-align: right")),
            CellAlignment::Center => attrs.push(("style", "text-align: center")),
            CellAlignment::None => {}
        }

        self.within(create_element(tag, attrs), |f| match cell.inline_content() {
            Some(content) => f.write_inlines(&content),
            None => f.write_blocks(&cell.content),
        })
    }

    fn write_section(&mut self, section: &Section) -> FormatResult {
        let attrs = if section.class.is_empty() {
            vec![]
        } else {
            vec![("class", section.class.as_str())]
        };
        self.within(create_element("div", attrs), |f| f.write_blocks(&section.blocks))
    }

    fn write_table_of_contents(&mut self, levels: u8) -> FormatResult {
        let outline = self.outline.nested(levels);
        self.within(create_element("nav", vec![("class", "toc")]), |f| {
            if outline.is_empty() {
                return Ok(());
            }
            f.write_outline(&outline)
        })
    }

    fn write_run(&mut self, text: &str) -> FormatResult {
        self.text(text);
        Ok(())
    }

    fn write_strong(&mut self, content: &[Inline]) -> FormatResult {
        self.within(create_element("strong", vec![]), |f| f.write_inlines(content))
    }

    fn write_emphasized(&mut self, content: &[Inline]) -> FormatResult {
        self.within(create_element("em", vec![]), |f| f.write_inlines(content))
    }

    fn write_span(&mut self, class: &str, content: &[Inline]) -> FormatResult {
        self.within(create_element("span", vec![("class", class)]), |f| {
            f.write_inlines(content)
        })
    }

    fn write_line_break(&mut self) -> FormatResult {
        self.append(create_element("br", vec![]));
        Ok(())
    }

    fn write_inline_code(&mut self, code: &str, language: Option<&CodeLanguage>) -> FormatResult {
        let class = language.map(|lang| format!("language-{lang}"));
        let attrs = match &class {
            Some(class) => vec![("class", class.as_str())],
            None => vec![],
        };
        self.within(create_element("code", attrs), |f| {
            f.text(code);
            Ok(())
        })
    }

    fn write_hyperlink(
        &mut self,
        url: &str,
        title: Option<&str>,
        content: &[Inline],
    ) -> FormatResult {
        let mut attrs = vec![("href", url)];
        if let Some(title) = title {
            attrs.push(("title", title));
        }
        self.within(create_element("a", attrs), |f| f.write_inlines(content))
    }

    fn write_image(&mut self, source: &str, alt: Option<&str>, link: Option<&str>) -> FormatResult {
        let source = self.image_source(source);
        let img = create_element(
            "img",
            vec![("src", source.as_str()), ("alt", alt.unwrap_or_default())],
        );
        match link {
            Some(href) => self.within(create_element("a", vec![("href", href)]), |f| {
                f.append(img);
                Ok(())
            }),
            None => {
                self.append(img);
                Ok(())
            }
        }
    }

    fn write_symbol(&mut self, file: &str) -> FormatResult {
        let src = format!("{}/{file}", self.options.symbol_path.trim_end_matches('/'));
        let alt = self.symbols.encode(file).unwrap_or_default();
        self.append(create_element(
            "img",
            vec![("class", "symbol"), ("src", &src), ("alt", alt)],
        ));
        Ok(())
    }

    fn write_anchor(&mut self, name: &str) -> FormatResult {
        self.append(create_element("a", vec![("id", name)]));
        Ok(())
    }

    fn write_equation(&mut self, equation: &str) -> FormatResult {
        self.within(create_element("span", vec![("class", "equation")]), |f| {
            f.text(equation);
            Ok(())
        })
    }

    fn write_non_breaking_space(&mut self) -> FormatResult {
        self.text("\u{a0}");
        Ok(())
    }
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize the children of the container, one top-level block per line
fn serialize_children(container: &Handle) -> Result<String, FormatError> {
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    let mut blocks = Vec::new();
    for child in container.children.borrow().iter() {
        let mut output = Vec::new();
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
        let html = String::from_utf8(output).map_err(|e| {
            FormatError::SerializationError(format!("UTF-8 conversion failed: {e}"))
        })?;
        blocks.push(html);
    }
    Ok(blocks.join("\n"))
}

/// Wrap the content in a complete HTML document with embedded CSS
fn wrap_in_document(body_html: &str, doc: &Document, options: &HtmlOptions) -> String {
    let baseline_css = super::get_default_css();
    let theme_css = match options.theme {
        HtmlTheme::FancySerif => include_str!("../../../css/themes/theme-fancy-serif.css"),
        HtmlTheme::Modern => include_str!("../../../css/themes/theme-modern.css"),
    };

    // Custom CSS is appended after baseline and theme
    let custom_css = options.custom_css.as_deref().unwrap_or("");

    let title = html_escape(doc.metadata.title.as_deref().unwrap_or("OWiki Document"));

    let mut meta = String::new();
    for (name, field) in [
        ("description", &doc.metadata.description),
        ("keywords", &doc.metadata.keywords),
        ("author", &doc.metadata.creator),
        ("date", &doc.metadata.date),
    ] {
        if let Some(value) = field {
            meta.push_str(&format!(
                "  <meta name=\"{name}\" content=\"{}\">\n",
                html_escape(value)
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="owiki-babel">
{meta}  <title>{title}</title>
  <style>
{baseline_css}
{theme_css}
{custom_css}
  </style>
</head>
<body>
<div class="owiki-document">
{body_html}
</div>
</body>
</html>
"#
    )
}

/// Escape HTML special characters in text
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, CellKind, ListItem, ListKind};
    use std::path::PathBuf;

    fn fragment(doc: &Document) -> String {
        serialize_to_html(doc, &HtmlOptions::fragment()).unwrap()
    }

    fn paragraph(content: Vec<Inline>) -> Document {
        Document::with_blocks(vec![Block::Paragraph(content)])
    }

    #[test]
    fn test_strong_paragraph() {
        let doc = paragraph(vec![
            Inline::run("This is "),
            Inline::Strong(vec![Inline::run("strong")]),
            Inline::run(" text"),
        ]);
        assert_eq!(fragment(&doc), "<p>This is <strong>strong</strong> text</p>");
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = paragraph(vec![Inline::run("a < b & c"), Inline::NonBreakingSpace]);
        assert_eq!(fragment(&doc), "<p>a &lt; b &amp; c&nbsp;</p>");
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
        let doc = Document::with_blocks(vec![Block::List(list)]);
        assert_eq!(fragment(&doc), "<ul><li>a<ol><li>b</li></ol></li></ul>");
    }

    #[test]
    fn test_table_spans_and_alignment() {
        let mut wide = TableCell::new(
            CellKind::Header,
            CellAlignment::Center,
            vec![Block::Paragraph(vec![Inline::run("H")])],
        );
        wide.column_span = 2;
        let doc = Document::with_blocks(vec![Block::Table(Table {
            rows: vec![TableRow { cells: vec![wide] }],
        })]);
        assert_eq!(
            fragment(&doc),
            "<table><tr><th colspan=\"2\" style=\"text-align: center\">H</th></tr></table>"
        );
    }

    #[test]
    fn test_toc_links_to_header_ids() {
        let doc = Document::with_blocks(vec![
            Block::TableOfContents { levels: 2 },
            Block::Header(Header::new(1, vec![Inline::run("One")])),
            Block::Header(Header::new(2, vec![Inline::run("Two")])),
            Block::Header(Header::new(3, vec![Inline::run("Deep")])),
        ]);
        assert_eq!(
            fragment(&doc),
            "<nav class=\"toc\"><ul><li><a href=\"#toc-1\">One</a><ul><li><a href=\"#toc-2\">Two</a></li></ul></li></ul></nav>\n\
             <h1 id=\"toc-1\">One</h1>\n\
             <h2 id=\"toc-2\">Two</h2>\n\
             <h3 id=\"toc-3\">Deep</h3>"
        );
    }

    #[test]
    fn test_headers_without_toc_have_no_ids() {
        let doc = Document::with_blocks(vec![Block::Header(Header::new(
            2,
            vec![Inline::run("Plain")],
        ))]);
        assert_eq!(fragment(&doc), "<h2>Plain</h2>");
    }

    #[test]
    fn test_symbols_and_images() {
        let doc = paragraph(vec![
            Inline::Symbol("smile.png".into()),
            Inline::Image {
                source: "/site/img/a.png".into(),
                alt: Some("A".into()),
                link: Some("http://x.org".into()),
            },
        ]);
        let options = HtmlOptions {
            output_dir: Some(PathBuf::from("/site")),
            ..HtmlOptions::fragment()
        };
        assert_eq!(
            serialize_to_html(&doc, &options).unwrap(),
            "<p><img class=\"symbol\" src=\"symbols/smile.png\" alt=\":)\">\
             <a href=\"http://x.org\"><img src=\"img/a.png\" alt=\"A\"></a></p>"
        );
    }

    #[test]
    fn test_code_block_language_class() {
        let doc = Document::with_blocks(vec![Block::CodeBlock(CodeBlock {
            language: CodeLanguage::Rust,
            code: "let x = 1 < 2;".into(),
        })]);
        assert_eq!(
            fragment(&doc),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;</code></pre>"
        );
    }

    #[test]
    fn test_standalone_document() {
        let mut doc = paragraph(vec![Inline::run("Body")]);
        doc.metadata.title = Some("My <Notes>".into());
        doc.metadata.creator = Some("Ada".into());

        let html = serialize_to_html(&doc, &HtmlOptions::default()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>My &lt;Notes&gt;</title>"));
        assert!(html.contains("<meta name=\"author\" content=\"Ada\">"));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains(".owiki-document"));
    }

    #[test]
    fn test_fancy_serif_theme() {
        let doc = paragraph(vec![Inline::run("Body")]);
        let html = serialize_to_html(&doc, &HtmlOptions::new(HtmlTheme::FancySerif)).unwrap();
        assert!(html.contains("Cormorant"));
    }

    #[test]
    fn test_custom_css_appended() {
        let doc = paragraph(vec![Inline::run("Body")]);
        let custom_css = ".my-custom-class { color: red; }";
        let options = HtmlOptions::new(HtmlTheme::Modern).with_custom_css(custom_css.to_string());
        let html = serialize_to_html(&doc, &options).unwrap();

        assert!(html.contains(".my-custom-class { color: red; }"));
        assert!(html.contains(".owiki-document"));
    }
}
