//! Core data structures of the document model.

use super::language::CodeLanguage;
use serde::Serialize;

/// The root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub metadata: Metadata,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            metadata: Metadata::default(),
            blocks,
        }
    }

    /// Whether any block, at any depth, is a table of contents.
    pub fn has_table_of_contents(&self) -> bool {
        fn scan(blocks: &[Block]) -> bool {
            blocks.iter().any(|block| match block {
                Block::TableOfContents { .. } => true,
                Block::Section(section) => scan(&section.blocks),
                Block::Table(table) => table
                    .rows
                    .iter()
                    .flat_map(|row| row.cells.iter())
                    .any(|cell| scan(&cell.content)),
                _ => false,
            })
        }
        scan(&self.blocks)
    }
}

/// Document-level properties set by the metadata directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
    pub version: Option<String>,
    pub revision: Option<String>,
    pub date: Option<String>,
}

impl Metadata {
    /// Directive names, in the order writers emit them.
    pub const FIELDS: [&'static str; 9] = [
        "title",
        "description",
        "keywords",
        "creator",
        "subject",
        "category",
        "version",
        "revision",
        "date",
    ];

    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "title" => &self.title,
            "description" => &self.description,
            "keywords" => &self.keywords,
            "creator" => &self.creator,
            "subject" => &self.subject,
            "category" => &self.category,
            "version" => &self.version,
            "revision" => &self.revision,
            "date" => &self.date,
            _ => return None,
        };
        value.as_deref()
    }

    /// Set a field by directive name. Returns false for names that are not metadata.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "keywords" => &mut self.keywords,
            "creator" => &mut self.creator,
            "subject" => &mut self.subject,
            "category" => &mut self.category,
            "version" => &mut self.version,
            "revision" => &mut self.revision,
            "date" => &mut self.date,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Populated fields as `(name, value)` pairs in [`Metadata::FIELDS`] order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        Self::FIELDS
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Block-level nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Header(Header),
    Paragraph(Vec<Inline>),
    List(List),
    Quote(Vec<Inline>),
    CodeBlock(CodeBlock),
    HorizontalRuler,
    Table(Table),
    Section(Section),
    TableOfContents { levels: u8 },
}

impl Block {
    /// Short lowercase name used in diagnostics and unsupported-construct errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Header(_) => "header",
            Block::Paragraph(_) => "paragraph",
            Block::List(list) => match list.kind {
                ListKind::Unordered => "unordered list",
                ListKind::Ordered => "ordered list",
            },
            Block::Quote(_) => "quote",
            Block::CodeBlock(_) => "code block",
            Block::HorizontalRuler => "horizontal ruler",
            Block::Table(_) => "table",
            Block::Section(_) => "section",
            Block::TableOfContents { .. } => "table of contents",
        }
    }
}

/// A heading with a level in `1..=5`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub level: u8,
    pub content: Vec<Inline>,
}

impl Header {
    pub const MAX_LEVEL: u8 = 5;

    /// Build a header, clamping the level into the supported range.
    pub fn new(level: usize, content: Vec<Inline>) -> Self {
        let level = level.clamp(1, Self::MAX_LEVEL as usize) as u8;
        Self { level, content }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// A list of items, either bulleted or numbered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.kind == ListKind::Ordered
    }
}

/// An item in a list, optionally owning a list one level deeper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub content: Vec<Inline>,
    pub nested: Option<List>,
}

impl ListItem {
    pub fn new(content: Vec<Inline>) -> Self {
        Self {
            content,
            nested: None,
        }
    }
}

/// A fenced block of raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlock {
    pub language: CodeLanguage,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Number of logical columns, counting column spans.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| cell.column_span as usize)
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0)
    }

    /// Whether every cell of the first row is a header cell.
    pub fn has_header_row(&self) -> bool {
        self.rows.first().is_some_and(|row| {
            !row.cells.is_empty() && row.cells.iter().all(|c| c.kind == CellKind::Header)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Data,
    Header,
}

/// Horizontal alignment of a table cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub kind: CellKind,
    pub content: Vec<Block>,
    pub column_span: u32,
    pub row_span: u32,
    pub align: CellAlignment,
}

impl TableCell {
    pub fn new(kind: CellKind, align: CellAlignment, content: Vec<Block>) -> Self {
        Self {
            kind,
            content,
            column_span: 1,
            row_span: 1,
            align,
        }
    }

    pub fn is_header(&self) -> bool {
        self.kind == CellKind::Header
    }

    /// The cell's inline content when it consists only of paragraphs.
    ///
    /// Consecutive paragraphs are joined with a line break. Returns `None` when
    /// the cell holds any other kind of block.
    pub fn inline_content(&self) -> Option<Vec<Inline>> {
        let mut inlines = Vec::new();
        for (i, block) in self.content.iter().enumerate() {
            let Block::Paragraph(content) = block else {
                return None;
            };
            if i > 0 {
                inlines.push(Inline::LineBreak);
            }
            inlines.extend(content.iter().cloned());
        }
        Some(inlines)
    }
}

/// A classed container of nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub class: String,
    pub blocks: Vec<Block>,
}

/// Inline-level nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    Run(String),
    Strong(Vec<Inline>),
    Emphasized(Vec<Inline>),
    Span {
        class: String,
        content: Vec<Inline>,
    },
    LineBreak,
    InlineCode {
        code: String,
        language: Option<CodeLanguage>,
    },
    Hyperlink {
        url: String,
        title: Option<String>,
        content: Vec<Inline>,
    },
    Image {
        source: String,
        alt: Option<String>,
        link: Option<String>,
    },
    /// Image file name of a symbol token, already resolved through the symbol table
    Symbol(String),
    Anchor(String),
    Equation(String),
    NonBreakingSpace,
}

impl Inline {
    pub fn run(text: impl Into<String>) -> Self {
        Inline::Run(text.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Inline::Run(_) => "run",
            Inline::Strong(_) => "strong",
            Inline::Emphasized(_) => "emphasized",
            Inline::Span { .. } => "span",
            Inline::LineBreak => "line break",
            Inline::InlineCode { .. } => "inline code",
            Inline::Hyperlink { .. } => "hyperlink",
            Inline::Image { .. } => "image",
            Inline::Symbol(_) => "symbol",
            Inline::Anchor(_) => "anchor",
            Inline::Equation(_) => "equation",
            Inline::NonBreakingSpace => "non-breaking space",
        }
    }
}

/// Flatten inline content to its visible text.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    collect_text(inlines, &mut out);
    out
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Run(text) => out.push_str(text),
            Inline::Strong(children)
            | Inline::Emphasized(children)
            | Inline::Span {
                content: children, ..
            }
            | Inline::Hyperlink {
                content: children, ..
            } => collect_text(children, out),
            Inline::LineBreak => out.push(' '),
            Inline::InlineCode { code, .. } => out.push_str(code),
            Inline::Image { alt, .. } => out.push_str(alt.as_deref().unwrap_or("")),
            Inline::Equation(expr) => out.push_str(expr),
            Inline::NonBreakingSpace => out.push('\u{a0}'),
            Inline::Symbol(_) | Inline::Anchor(_) => {}
        }
    }
}

/// Append `text` to `inlines`, merging with a trailing run.
pub fn push_text(inlines: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Run(last)) = inlines.last_mut() {
        last.push_str(text);
    } else {
        inlines.push(Inline::Run(text.to_string()));
    }
}

/// Append inlines, merging adjacent runs at the seam.
pub fn extend_inlines(target: &mut Vec<Inline>, items: Vec<Inline>) {
    for item in items {
        match item {
            Inline::Run(text) => push_text(target, &text),
            other => target.push(other),
        }
    }
}
