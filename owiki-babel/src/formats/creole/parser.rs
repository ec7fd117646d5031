//! Creole 1.0 parser
//!
//! Blocks are recognised line by line. The text of each block is then handed to
//! an inline scanner over a [`Cursor`]. Runs go through the character table
//! like OWiki runs do, but the escape character is `~` and a backslash is an
//! ordinary character.

use crate::common::cursor::Cursor;
use crate::common::links;
use crate::common::runs::RunBuilder;
use crate::model::{
    Block, CellAlignment, CellKind, CodeBlock, CodeLanguage, Document, Header, Inline, List,
    ListItem, ListKind, Table, TableCell, TableRow,
};
use crate::tables::CharacterTable;
use std::cmp::Reverse;

/// Parse Creole markup with the standard character table.
pub fn parse_creole(source: &str) -> Document {
    CreoleParser::new(CharacterTable::standard()).parse(source)
}

pub struct CreoleParser<'t> {
    characters: &'t CharacterTable,
}

impl<'t> CreoleParser<'t> {
    pub fn new(characters: &'t CharacterTable) -> Self {
        Self { characters }
    }

    pub fn parse(&self, source: &str) -> Document {
        let source = source.replace("\r\n", "\n");
        let lines: Vec<&str> = source.lines().collect();
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();
            if line.is_empty() {
                i += 1;
                continue;
            }
            tracing::trace!(line = i + 1, "creole block");

            if line == "{{{" {
                i = self.parse_code_block(&lines, i + 1, &mut blocks);
            } else if is_ruler(line) {
                blocks.push(Block::HorizontalRuler);
                i += 1;
            } else if line.starts_with('=') {
                blocks.push(Block::Header(self.parse_header(line)));
                i += 1;
            } else if list_marker(line).is_some() {
                i = self.parse_list(&lines, i, &mut blocks);
            } else if line.starts_with('|') {
                i = self.parse_table(&lines, i, &mut blocks);
            } else if line.starts_with('>') {
                i = self.parse_quote(&lines, i, &mut blocks);
            } else {
                i = self.parse_paragraph(&lines, i, &mut blocks);
            }
        }

        Document::with_blocks(blocks)
    }

    fn parse_code_block(&self, lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
        let end = (start..lines.len())
            .find(|&i| lines[i].trim() == "}}}")
            .unwrap_or(lines.len());
        blocks.push(Block::CodeBlock(CodeBlock {
            language: CodeLanguage::Plain,
            code: lines[start..end].join("\n"),
        }));
        end + 1
    }

    fn parse_header(&self, line: &str) -> Header {
        let level = line.chars().take_while(|&c| c == '=').count();
        let mut text = line.trim_start_matches('=').trim();
        // closing run is optional, and `~=` keeps a trailing equals sign
        while text.ends_with('=') && !text.ends_with("~=") {
            text = text[..text.len() - 1].trim_end();
        }
        Header::new(level, self.parse_inlines(text))
    }

    fn parse_list(&self, lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
        let mut items = Vec::new();
        let mut i = start;
        while let Some(line) = lines.get(i).map(|l| l.trim()) {
            let Some((depth, kind, text)) = list_marker(line) else {
                break;
            };
            items.push((depth, kind, self.parse_inlines(text)));
            i += 1;
        }

        let mut next = 0;
        let depth = items[0].0;
        blocks.push(Block::List(build_list(&mut items, &mut next, depth)));
        i
    }

    fn parse_table(&self, lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
        let mut table = Table::default();
        let mut i = start;
        while let Some(line) = lines.get(i).map(|l| l.trim()) {
            if !line.starts_with('|') {
                break;
            }
            let cells = split_cells(&line[1..])
                .into_iter()
                .map(|raw| self.parse_cell(raw))
                .collect();
            table.rows.push(TableRow { cells });
            i += 1;
        }
        blocks.push(Block::Table(table));
        i
    }

    fn parse_cell(&self, raw: &str) -> TableCell {
        let (kind, text) = match raw.strip_prefix('=') {
            Some(rest) => (CellKind::Header, rest),
            None => (CellKind::Data, raw),
        };
        let content = self.parse_inlines(text.trim());
        let blocks = if content.is_empty() {
            Vec::new()
        } else {
            vec![Block::Paragraph(content)]
        };
        TableCell::new(kind, CellAlignment::None, blocks)
    }

    fn parse_quote(&self, lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
        let mut text = Vec::new();
        let mut i = start;
        while let Some(line) = lines.get(i).map(|l| l.trim()) {
            let Some(rest) = line.strip_prefix('>') else {
                break;
            };
            text.push(rest.trim());
            i += 1;
        }
        blocks.push(Block::Quote(self.parse_inlines(&text.join("\n"))));
        i
    }

    fn parse_paragraph(&self, lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
        let mut text = vec![lines[start].trim()];
        let mut i = start + 1;
        while let Some(line) = lines.get(i).map(|l| l.trim()) {
            if line.is_empty() || starts_block(line) {
                break;
            }
            text.push(line);
            i += 1;
        }
        let content = self.parse_inlines(&text.join("\n"));
        if !content.is_empty() {
            blocks.push(Block::Paragraph(content));
        }
        i
    }

    fn parse_inlines(&self, text: &str) -> Vec<Inline> {
        let mut scanner = InlineScanner {
            cursor: Cursor::new(text),
            characters: self.characters,
        };
        scanner.parse_inlines(&[]).0
    }
}

fn is_ruler(line: &str) -> bool {
    line.len() >= 4 && line.chars().all(|c| c == '-')
}

/// Depth, kind and text of a list item line such as `** item`.
fn list_marker(line: &str) -> Option<(usize, ListKind, &str)> {
    let depth = line.chars().take_while(|c| matches!(c, '*' | '#')).count();
    if depth == 0 {
        return None;
    }
    let rest = &line[depth..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let kind = match line[..depth].chars().last() {
        Some('#') => ListKind::Ordered,
        _ => ListKind::Unordered,
    };
    Some((depth, kind, rest.trim()))
}

fn starts_block(line: &str) -> bool {
    line == "{{{"
        || is_ruler(line)
        || line.starts_with(['=', '|', '>'])
        || list_marker(line).is_some()
}

fn build_list(items: &mut [(usize, ListKind, Vec<Inline>)], next: &mut usize, depth: usize) -> List {
    let mut list = List::new(items[*next].1);

    while *next < items.len() {
        let item_depth = items[*next].0;
        if item_depth < depth {
            break;
        }
        if item_depth == depth {
            list.items
                .push(ListItem::new(std::mem::take(&mut items[*next].2)));
            *next += 1;
            continue;
        }

        let nested = build_list(items, next, item_depth);
        match list.items.last_mut() {
            Some(item) => match &mut item.nested {
                Some(existing) => existing.items.extend(nested.items),
                None => item.nested = Some(nested),
            },
            None => list.items.push(ListItem {
                content: Vec::new(),
                nested: Some(nested),
            }),
        }
    }
    list
}

/// Split a table row (without its leading `|`) into raw cell texts. Pipes
/// inside links, images and after `~` do not split.
fn split_cells(row: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut chars = row.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '~' => {
                chars.next();
            }
            '[' | '{' if chars.peek().map(|(_, n)| *n) == Some(c) => {
                chars.next();
                depth += 1;
            }
            ']' | '}' if depth > 0 && chars.peek().map(|(_, n)| *n) == Some(c) => {
                chars.next();
                depth -= 1;
            }
            '|' if depth == 0 => {
                cells.push(&row[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = &row[start..];
    if !last.trim().is_empty() {
        cells.push(last);
    }
    cells
}

struct InlineScanner<'t> {
    cursor: Cursor,
    characters: &'t CharacterTable,
}

impl InlineScanner<'_> {
    fn parse_inlines(&mut self, terminators: &[&'static str]) -> (Vec<Inline>, Option<usize>) {
        let table = self.characters;
        let mut run = RunBuilder::default();

        loop {
            let Some(c) = self.cursor.peek() else {
                return (run.finish(table), None);
            };
            if c == '~' {
                self.parse_escape(&mut run);
                continue;
            }
            if let Some(which) = self.terminator_at(self.cursor.pos(), terminators) {
                return (run.finish(table), Some(which));
            }
            self.parse_inline(c, terminators, &mut run);
        }
    }

    fn parse_inline(&mut self, c: char, terminators: &[&'static str], run: &mut RunBuilder) {
        let table = self.characters;

        match c {
            '\\' if self.cursor.match_literal("\\\\") => run.push(table, Inline::LineBreak),
            '\\' => {
                self.cursor.advance(1);
                run.push_literal(table, "\\");
            }
            '*' if self.cursor.matches("**") => {
                self.parse_styled("**", terminators, run, Inline::Strong);
            }
            '/' if self.cursor.matches("//") && self.cursor.previous() != Some(':') => {
                self.parse_styled("//", terminators, run, Inline::Emphasized);
            }
            '{' if self.cursor.matches("{{{") => match self.read_raw(3, "}}}", terminators) {
                Some(code) => run.push(
                    table,
                    Inline::InlineCode {
                        code,
                        language: None,
                    },
                ),
                None => self.literal(run, 3),
            },
            '{' if self.cursor.matches("{{") => self.parse_image(terminators, run),
            '[' if self.cursor.matches("[[") => self.parse_link(terminators, run),
            'h' if self.at_free_url() => self.parse_free_url(terminators, run),
            '\n' => {
                self.cursor.advance(1);
                run.push_char(' ');
            }
            c => {
                self.cursor.advance(1);
                run.push_char(c);
            }
        }
    }

    /// `~` makes the next character literal; a trailing or space-followed `~`
    /// is itself literal.
    fn parse_escape(&mut self, run: &mut RunBuilder) {
        self.cursor.advance(1);
        match self.cursor.peek() {
            Some(c) if !c.is_whitespace() => {
                self.cursor.advance(1);
                run.push_literal(self.characters, &c.to_string());
            }
            _ => run.push_char('~'),
        }
    }

    fn parse_styled(
        &mut self,
        marker: &'static str,
        terminators: &[&'static str],
        run: &mut RunBuilder,
        wrap: fn(Vec<Inline>) -> Inline,
    ) {
        let table = self.characters;
        self.cursor.advance(2);
        let stops: Vec<&'static str> = std::iter::once(marker)
            .chain(terminators.iter().copied())
            .collect();
        let (children, which) = self.parse_inlines(&stops);

        if which == Some(0) {
            self.cursor.advance(2);
            run.push(table, wrap(children));
        } else {
            run.push_literal(table, marker);
            run.extend(table, children);
        }
    }

    fn parse_link(&mut self, terminators: &[&'static str], run: &mut RunBuilder) {
        let table = self.characters;
        let start = self.cursor.pos();
        self.cursor.advance(2);

        let limit = self.terminator_limit(terminators);
        let url_end = (self.cursor.pos()..limit)
            .find(|&i| self.cursor.matches_at(i, "|") || self.cursor.matches_at(i, "]]"));
        let Some(url_end) = url_end else {
            self.cursor.set_pos(start);
            self.literal(run, 2);
            return;
        };
        let url = self.cursor.slice(self.cursor.pos(), url_end).trim().to_string();
        self.cursor.set_pos(url_end);

        if self.cursor.match_literal("]]") {
            let text = links::default_link_text(&url).to_string();
            run.push(table, hyperlink(url, vec![Inline::run(text)]));
            return;
        }

        self.cursor.advance(1);
        let stops: Vec<&'static str> = std::iter::once("]]")
            .chain(terminators.iter().copied())
            .collect();
        let (content, which) = self.parse_inlines(&stops);
        if which == Some(0) {
            self.cursor.advance(2);
            run.push(table, hyperlink(url, content));
        } else {
            self.cursor.set_pos(start);
            self.literal(run, 2);
        }
    }

    fn parse_image(&mut self, terminators: &[&'static str], run: &mut RunBuilder) {
        let table = self.characters;
        let Some(body) = self.read_raw(2, "}}", terminators) else {
            self.literal(run, 2);
            return;
        };
        let (source, alt) = match body.split_once('|') {
            Some((source, alt)) => (source, Some(alt.trim().to_string())),
            None => (body.as_str(), None),
        };
        run.push(
            table,
            Inline::Image {
                source: source.trim().to_string(),
                alt: alt.filter(|a| !a.is_empty()),
                link: None,
            },
        );
    }

    fn at_free_url(&self) -> bool {
        (self.cursor.matches("http://") || self.cursor.matches("https://"))
            && !self.cursor.previous().is_some_and(char::is_alphanumeric)
    }

    fn parse_free_url(&mut self, terminators: &[&'static str], run: &mut RunBuilder) {
        let start = self.cursor.pos();
        let limit = self.terminator_limit(terminators);
        let mut end = (start..limit)
            .find(|&i| {
                self.cursor.chars()[i].is_whitespace()
                    || self.cursor.matches_at(i, "|")
                    || self.cursor.matches_at(i, "]]")
            })
            .unwrap_or(limit);
        while end > start && matches!(self.cursor.chars()[end - 1], '.' | ',' | ';' | ':' | '!' | '?' | ')') {
            end -= 1;
        }

        let url = self.cursor.slice(start, end);
        self.cursor.set_pos(end);
        let text = links::default_link_text(&url).to_string();
        run.push(self.characters, hyperlink(url, vec![Inline::run(text)]));
    }

    /// Raw text between an opener of `open` characters and `closer`, which must
    /// show up before any enclosing terminator.
    fn read_raw(&mut self, open: usize, closer: &str, terminators: &[&'static str]) -> Option<String> {
        let start = self.cursor.pos();
        self.cursor.advance(open);
        let limit = self.terminator_limit(terminators);
        match self.cursor.find(closer, limit) {
            Some(end) => {
                let text = self.cursor.slice(self.cursor.pos(), end);
                self.cursor.set_pos(end + closer.chars().count());
                Some(text)
            }
            None => {
                self.cursor.set_pos(start);
                None
            }
        }
    }

    /// Take `count` characters at the cursor as literal text.
    fn literal(&mut self, run: &mut RunBuilder, count: usize) {
        let start = self.cursor.pos();
        self.cursor.advance(count);
        let text = self.cursor.slice(start, self.cursor.pos());
        run.push_literal(self.characters, &text);
    }

    fn terminator_at(&self, pos: usize, terminators: &[&'static str]) -> Option<usize> {
        terminators
            .iter()
            .enumerate()
            .filter(|(_, t)| self.cursor.matches_at(pos, t))
            .max_by_key(|(i, t)| (t.len(), Reverse(*i)))
            .map(|(i, _)| i)
    }

    fn terminator_limit(&self, terminators: &[&'static str]) -> usize {
        (self.cursor.pos()..self.cursor.len())
            .find(|&i| self.terminator_at(i, terminators).is_some())
            .unwrap_or(self.cursor.len())
    }
}

fn hyperlink(url: String, content: Vec<Inline>) -> Inline {
    Inline::Hyperlink {
        url,
        title: None,
        content,
    }
}
