//! Formatter dispatch framework
//!
//!     A formatter walks a [`Document`] in document order, depth first, and calls exactly one
//!     handler per node. Dispatch is an exhaustive `match` over the closed [`Block`] and
//!     [`Inline`] enums in [`Formatter::write_block`] and [`Formatter::write_inline`], so adding a
//!     variant to the model fails to compile until every formatter handles it.
//!
//!     Concrete formatters own their output state (a `String`, a DOM under construction, a
//!     comrak arena) and implement the per-variant handlers. Composite traversal that is the
//!     same for every dialect (block sequences, inline sequences, table rows and cells) comes
//!     with default implementations that formatters override when their output needs wrapping.
//!
//!     Constructs a dialect cannot express are a per-formatter policy: drop them (usually
//!     keeping their content) or fail with [`Formatter::unsupported`].

use crate::error::FormatError;
use crate::model::{
    Block, CodeBlock, CodeLanguage, Document, Header, Inline, List, Section, Table, TableCell,
    TableRow,
};

pub type FormatResult = Result<(), FormatError>;

pub trait Formatter {
    /// Dialect name used in error messages.
    fn dialect(&self) -> &'static str;

    fn write_document(&mut self, doc: &Document) -> FormatResult {
        self.write_blocks(&doc.blocks)
    }

    fn write_blocks(&mut self, blocks: &[Block]) -> FormatResult {
        for block in blocks {
            self.write_block(block)?;
        }
        Ok(())
    }

    fn write_block(&mut self, block: &Block) -> FormatResult {
        match block {
            Block::Header(header) => self.write_header(header),
            Block::Paragraph(content) => self.write_paragraph(content),
            Block::List(list) => self.write_list(list),
            Block::Quote(content) => self.write_quote(content),
            Block::CodeBlock(code) => self.write_code_block(code),
            Block::HorizontalRuler => self.write_horizontal_ruler(),
            Block::Table(table) => self.write_table(table),
            Block::Section(section) => self.write_section(section),
            Block::TableOfContents { levels } => self.write_table_of_contents(*levels),
        }
    }

    fn write_inlines(&mut self, inlines: &[Inline]) -> FormatResult {
        for inline in inlines {
            self.write_inline(inline)?;
        }
        Ok(())
    }

    fn write_inline(&mut self, inline: &Inline) -> FormatResult {
        match inline {
            Inline::Run(text) => self.write_run(text),
            Inline::Strong(content) => self.write_strong(content),
            Inline::Emphasized(content) => self.write_emphasized(content),
            Inline::Span { class, content } => self.write_span(class, content),
            Inline::LineBreak => self.write_line_break(),
            Inline::InlineCode { code, language } => {
                self.write_inline_code(code, language.as_ref())
            }
            Inline::Hyperlink {
                url,
                title,
                content,
            } => self.write_hyperlink(url, title.as_deref(), content),
            Inline::Image {
                source,
                alt,
                link,
            } => self.write_image(source, alt.as_deref(), link.as_deref()),
            Inline::Symbol(file) => self.write_symbol(file),
            Inline::Anchor(name) => self.write_anchor(name),
            Inline::Equation(equation) => self.write_equation(equation),
            Inline::NonBreakingSpace => self.write_non_breaking_space(),
        }
    }

    fn write_table(&mut self, table: &Table) -> FormatResult {
        for row in &table.rows {
            self.write_table_row(row)?;
        }
        Ok(())
    }

    fn write_table_row(&mut self, row: &TableRow) -> FormatResult {
        for cell in &row.cells {
            self.write_table_cell(cell)?;
        }
        Ok(())
    }

    /// Cells holding only paragraphs are written as inline content, anything
    /// else as blocks.
    fn write_table_cell(&mut self, cell: &TableCell) -> FormatResult {
        match cell.inline_content() {
            Some(content) => self.write_inlines(&content),
            None => self.write_blocks(&cell.content),
        }
    }

    /// The error for a construct this dialect refuses to drop.
    fn unsupported(&self, construct: &'static str) -> FormatError {
        FormatError::Unsupported {
            construct,
            dialect: self.dialect(),
        }
    }

    fn write_header(&mut self, header: &Header) -> FormatResult;
    fn write_paragraph(&mut self, content: &[Inline]) -> FormatResult;
    fn write_list(&mut self, list: &List) -> FormatResult;
    fn write_quote(&mut self, content: &[Inline]) -> FormatResult;
    fn write_code_block(&mut self, code: &CodeBlock) -> FormatResult;
    fn write_horizontal_ruler(&mut self) -> FormatResult;
    fn write_section(&mut self, section: &Section) -> FormatResult;
    fn write_table_of_contents(&mut self, levels: u8) -> FormatResult;

    fn write_run(&mut self, text: &str) -> FormatResult;
    fn write_strong(&mut self, content: &[Inline]) -> FormatResult;
    fn write_emphasized(&mut self, content: &[Inline]) -> FormatResult;
    fn write_span(&mut self, class: &str, content: &[Inline]) -> FormatResult;
    fn write_line_break(&mut self) -> FormatResult;
    fn write_inline_code(&mut self, code: &str, language: Option<&CodeLanguage>) -> FormatResult;
    fn write_hyperlink(
        &mut self,
        url: &str,
        title: Option<&str>,
        content: &[Inline],
    ) -> FormatResult;
    fn write_image(&mut self, source: &str, alt: Option<&str>, link: Option<&str>)
        -> FormatResult;
    fn write_symbol(&mut self, file: &str) -> FormatResult;
    fn write_anchor(&mut self, name: &str) -> FormatResult;
    fn write_equation(&mut self, equation: &str) -> FormatResult;
    fn write_non_breaking_space(&mut self) -> FormatResult;
}
