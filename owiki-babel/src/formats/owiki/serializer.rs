//! OWiki writer
//!
//! Produces markup that parses back into the same document. Runs are written
//! through the character table, markup characters are backslash-escaped, and
//! characters that would start a block are escaped at the start of a line.
//!
//! Some text has no exact spelling: a single backslash reads back as a pair,
//! newlines inside runs become spaces, and code containing its own fence
//! delimiter cannot be written.

use super::formatting_rules::FormattingRules;
use crate::common::links;
use crate::error::FormatError;
use crate::formatter::{FormatResult, Formatter};
use crate::model::{
    CellAlignment, CodeBlock, CodeLanguage, Document, Header, Inline, List, ListKind, Section,
    Table, TableCell,
};
use crate::tables::{CharacterTable, SymbolTable};
use std::collections::BTreeMap;

/// Escaped wherever they appear in text.
const MARKUP: &[char] = &['*', '`', '[', ']', '{', '}', '$', '|', '&'];

/// Escaped as the first character of a line.
const LINE_START: &[char] = &['=', '>', '@', '#', '-', '|', '*', '[', '`'];

const SPAN_MARKERS: &[&str] = &["^", "\""];

pub struct OwikiSerializer<'t> {
    rules: FormattingRules,
    characters: &'t CharacterTable,
    symbols: &'t SymbolTable,
    output: String,
    consecutive_newlines: usize,
    at_line_start: bool,
    in_paragraph: bool,
    list_prefix: String,
}

impl OwikiSerializer<'static> {
    pub fn new(rules: FormattingRules) -> Self {
        Self::with_tables(rules, CharacterTable::standard(), SymbolTable::standard())
    }
}

impl<'t> OwikiSerializer<'t> {
    pub fn with_tables(
        rules: FormattingRules,
        characters: &'t CharacterTable,
        symbols: &'t SymbolTable,
    ) -> Self {
        Self {
            rules,
            characters,
            symbols,
            output: String::new(),
            consecutive_newlines: 2, // Start as if we have blank lines
            at_line_start: true,
            in_paragraph: false,
            list_prefix: String::new(),
        }
    }

    pub fn serialize(mut self, doc: &Document) -> Result<String, FormatError> {
        self.write_document(doc)?;
        Ok(self.output)
    }

    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.output.push_str(text);
        self.consecutive_newlines = 0;
        self.at_line_start = false;
    }

    /// Push an opener that does not count as text at the start of a line.
    fn push_opener(&mut self, opener: &str) {
        let at_line_start = self.at_line_start;
        self.push(opener);
        self.at_line_start = at_line_start;
    }

    fn end_line(&mut self) {
        self.output.push('\n');
        self.consecutive_newlines += 1;
        self.at_line_start = true;
    }

    fn ensure_blank_lines(&mut self, count: usize) {
        let target_newlines = count + 1;
        while self.consecutive_newlines < target_newlines {
            self.end_line();
        }
    }

    fn begin_block(&mut self) {
        if self.output.is_empty() {
            return;
        }
        self.ensure_blank_lines(self.rules.blank_lines_between_blocks.max(1));
    }

    fn encode(&self, text: &str) -> String {
        if self.rules.encode_characters {
            self.characters.encode(text)
        } else {
            self.characters.escape(text)
        }
    }

    fn write_text(&mut self, text: &str) {
        let mut segment = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let mut run = 1usize;
                    while chars.next_if_eq(&'\\').is_some() {
                        run += 1;
                    }
                    self.flush_segment(&mut segment);
                    for _ in 0..run.div_ceil(2) {
                        self.push(r"\\\");
                    }
                }
                '\n' => segment.push(' '),
                c if MARKUP.contains(&c) => {
                    self.flush_segment(&mut segment);
                    let mut escaped = String::from('\\');
                    escaped.push(c);
                    self.push(&escaped);
                }
                c => segment.push(c),
            }
        }
        self.flush_segment(&mut segment);
    }

    fn flush_segment(&mut self, segment: &mut String) {
        let Some(first) = segment.chars().next() else {
            return;
        };
        let mut encoded = self.encode(segment);

        if self.at_line_start {
            match encoded.chars().next() {
                Some(c) if c == first && (LINE_START.contains(&c) || c.is_whitespace()) => {
                    encoded.insert(0, '\\');
                }
                // shorthand for the first symbol would start a block: keep the symbol
                Some(c) if c != first && LINE_START.contains(&c) => {
                    let rest = &segment[first.len_utf8()..];
                    encoded = format!("{first}{}", self.encode(rest));
                }
                _ => {}
            }
        }

        let encoded = self.escape_symbol_tokens(&encoded);
        self.push(&encoded);
        segment.clear();
    }

    /// Escape the first character of anything that would read back as a symbol.
    fn escape_symbol_tokens(&self, encoded: &str) -> String {
        let chars: Vec<char> = encoded.chars().collect();
        let mut out = String::with_capacity(encoded.len());
        for (i, c) in chars.iter().enumerate() {
            let escaped = i > 0 && chars[i - 1] == '\\';
            if !escaped && self.symbols.starts_at(&chars, i) {
                out.push('\\');
            }
            out.push(*c);
        }
        out
    }

    fn write_list_items(&mut self, list: &List) -> FormatResult {
        let marker = match list.kind {
            ListKind::Unordered => '*',
            ListKind::Ordered => '#',
        };
        let prefix = format!("{}{marker}", self.list_prefix);

        for item in &list.items {
            self.push(&prefix);
            self.push(" ");
            self.write_inlines(&item.content)?;
            self.end_line();

            if let Some(nested) = &item.nested {
                let outer = std::mem::replace(&mut self.list_prefix, prefix.clone());
                self.write_list_items(nested)?;
                self.list_prefix = outer;
            }
        }
        Ok(())
    }

    fn write_cell(&mut self, cell: &TableCell) -> FormatResult {
        self.push(if cell.is_header() { "||" } else { "|" });
        if matches!(cell.align, CellAlignment::Center | CellAlignment::Right) {
            self.push(" ");
        }

        match cell.inline_content() {
            Some(content) => match content.as_slice() {
                [Inline::Run(text)] if SPAN_MARKERS.contains(&text.trim()) => {
                    self.push(&format!("\\{}", text.trim()));
                }
                _ => {
                    self.at_line_start = true;
                    self.write_inlines(&content)?;
                }
            },
            None => {
                let mut nested = OwikiSerializer::with_tables(
                    self.rules.clone(),
                    self.characters,
                    self.symbols,
                );
                nested.write_blocks(&cell.content)?;
                self.push(nested.output.trim_end());
            }
        }

        if matches!(cell.align, CellAlignment::Center | CellAlignment::Left) {
            self.push(" ");
        }
        for _ in 1..cell.column_span {
            self.push("|^");
        }
        Ok(())
    }
}

impl Formatter for OwikiSerializer<'_> {
    fn dialect(&self) -> &'static str {
        "owiki"
    }

    fn write_document(&mut self, doc: &Document) -> FormatResult {
        for (name, value) in doc.metadata.entries() {
            self.push(&format!("@{name} {value}"));
            self.end_line();
        }
        self.write_blocks(&doc.blocks)
    }

    fn write_header(&mut self, header: &Header) -> FormatResult {
        self.begin_block();
        self.push(&"=".repeat(header.level as usize));
        self.push(" ");
        self.write_inlines(&header.content)?;
        self.end_line();
        Ok(())
    }

    fn write_paragraph(&mut self, content: &[Inline]) -> FormatResult {
        self.begin_block();
        self.in_paragraph = true;
        let result = self.write_inlines(content);
        self.in_paragraph = false;
        result?;
        self.end_line();
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> FormatResult {
        self.begin_block();
        self.write_list_items(list)
    }

    fn write_quote(&mut self, content: &[Inline]) -> FormatResult {
        self.begin_block();
        self.push("> ");
        self.write_inlines(content)?;
        self.end_line();
        Ok(())
    }

    fn write_code_block(&mut self, code: &CodeBlock) -> FormatResult {
        self.begin_block();
        self.push(&format!("```{}", code.language));
        self.end_line();
        self.push(&code.code);
        self.end_line();
        self.push("```");
        self.end_line();
        Ok(())
    }

    fn write_horizontal_ruler(&mut self) -> FormatResult {
        self.begin_block();
        self.push("----");
        self.end_line();
        Ok(())
    }

    fn write_table(&mut self, table: &Table) -> FormatResult {
        self.begin_block();
        // logical column -> (rows still covered, columns covered)
        let mut covers: BTreeMap<usize, (u32, u32)> = BTreeMap::new();

        for row in &table.rows {
            let mut column = 0usize;
            let mut cells = row.cells.iter();
            loop {
                if let Some((remaining, width)) = covers.get_mut(&column) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        let width = (*width).max(1) as usize;
                        self.push("|\"");
                        column += width;
                        continue;
                    }
                }
                let Some(cell) = cells.next() else {
                    break;
                };
                if cell.row_span > 1 {
                    covers.insert(column, (cell.row_span - 1, cell.column_span));
                }
                self.write_cell(cell)?;
                column += cell.column_span.max(1) as usize;
            }
            covers.retain(|_, (remaining, _)| *remaining > 0);
            self.push("|");
            self.end_line();
        }
        Ok(())
    }

    fn write_section(&mut self, section: &Section) -> FormatResult {
        self.begin_block();
        self.push(&format!("[[{}:", section.class));
        self.end_line();
        self.write_blocks(&section.blocks)?;
        if !self.at_line_start {
            self.end_line();
        }
        self.push("]]");
        self.end_line();
        Ok(())
    }

    fn write_table_of_contents(&mut self, levels: u8) -> FormatResult {
        self.begin_block();
        self.push(&format!("@toc {levels}"));
        self.end_line();
        Ok(())
    }

    fn write_run(&mut self, text: &str) -> FormatResult {
        self.write_text(text);
        Ok(())
    }

    fn write_strong(&mut self, content: &[Inline]) -> FormatResult {
        self.push_opener("**");
        self.write_inlines(content)?;
        self.push("**");
        Ok(())
    }

    fn write_emphasized(&mut self, content: &[Inline]) -> FormatResult {
        self.push_opener("*");
        self.write_inlines(content)?;
        self.push("*");
        Ok(())
    }

    fn write_span(&mut self, class: &str, content: &[Inline]) -> FormatResult {
        self.push_opener(&format!("{{{{{class}:"));
        self.write_inlines(content)?;
        self.push("}}");
        Ok(())
    }

    fn write_line_break(&mut self) -> FormatResult {
        self.push(r"\\");
        if self.in_paragraph && self.rules.break_after_line_break {
            self.end_line();
        }
        Ok(())
    }

    fn write_inline_code(&mut self, code: &str, _language: Option<&CodeLanguage>) -> FormatResult {
        self.push(&format!("`{code}`"));
        Ok(())
    }

    fn write_hyperlink(
        &mut self,
        url: &str,
        title: Option<&str>,
        content: &[Inline],
    ) -> FormatResult {
        let default_text = [Inline::run(links::default_link_text(url))];
        if title.is_none() && content == default_text.as_slice() {
            self.push(&format!("[{url}]"));
            return Ok(());
        }

        self.push(&format!("[{url}|"));
        self.write_inlines(content)?;
        if let Some(title) = title {
            self.push(&format!("|{title}"));
        }
        self.push("]");
        Ok(())
    }

    fn write_image(&mut self, source: &str, alt: Option<&str>, link: Option<&str>) -> FormatResult {
        let mut markup = format!("{{{source}");
        if alt.is_some() || link.is_some() {
            markup.push('|');
            markup.push_str(alt.unwrap_or_default());
        }
        if let Some(link) = link {
            markup.push('|');
            markup.push_str(link);
        }
        markup.push('}');
        self.push(&markup);
        Ok(())
    }

    fn write_symbol(&mut self, file: &str) -> FormatResult {
        let after_word = self.output.chars().last().is_some_and(char::is_alphanumeric);
        let symbols = self.symbols;
        match symbols.encode(file) {
            Some(token) if !after_word => {
                self.push(token);
                Ok(())
            }
            _ => self.write_image(file, None, None),
        }
    }

    fn write_anchor(&mut self, name: &str) -> FormatResult {
        self.push(&format!("{{#{name}}}"));
        Ok(())
    }

    fn write_equation(&mut self, equation: &str) -> FormatResult {
        self.push(&format!("$${equation}$$"));
        Ok(())
    }

    fn write_non_breaking_space(&mut self) -> FormatResult {
        self.push("&nbsp;");
        Ok(())
    }
}
