//! Creole writer
//!
//! Runs go through the character table and every escape it produces is
//! rewritten with Creole's `~`. Constructs Creole has no markup for are
//! handled by [`UnsupportedPolicy`]: dropped with a warning (keeping their
//! content where they have any) or rejected.

use super::UnsupportedPolicy;
use crate::common::links;
use crate::error::FormatError;
use crate::formatter::{FormatResult, Formatter};
use crate::model::{
    Block, CodeBlock, CodeLanguage, Document, Header, Inline, List, ListKind, Section, Table,
    TableCell,
};
use crate::tables::{CharacterTable, SymbolTable};

/// Escaped wherever they appear in text.
const MARKUP: &[char] = &['*', '[', ']', '{', '}', '|'];

/// Escaped as the first character of a block.
const LINE_START: &[char] = &['=', '#', '>', '-'];

pub struct CreoleSerializer<'t> {
    policy: UnsupportedPolicy,
    characters: &'t CharacterTable,
    output: String,
    at_content_start: bool,
    list_depth: usize,
}

impl CreoleSerializer<'static> {
    pub fn new(policy: UnsupportedPolicy) -> Self {
        Self::with_characters(policy, CharacterTable::standard())
    }
}

impl<'t> CreoleSerializer<'t> {
    pub fn with_characters(policy: UnsupportedPolicy, characters: &'t CharacterTable) -> Self {
        Self {
            policy,
            characters,
            output: String::new(),
            at_content_start: true,
            list_depth: 0,
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
        self.at_content_start = false;
    }

    fn begin_block(&mut self) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
    }

    fn end_line(&mut self) {
        self.output.push('\n');
    }

    /// Start of inline content whose first character could read as block markup.
    fn begin_content(&mut self) {
        self.at_content_start = true;
    }

    /// Apply the policy to a construct Creole cannot express.
    fn drop_construct(&self, construct: &'static str) -> FormatResult {
        match self.policy {
            UnsupportedPolicy::Strict => Err(self.unsupported(construct)),
            UnsupportedPolicy::Lenient => {
                tracing::warn!(construct, "creole cannot represent construct, dropping it");
                Ok(())
            }
        }
    }

    fn write_text(&mut self, text: &str) {
        let Some(first) = text.chars().next() else {
            return;
        };
        let mut encoded = self.characters.encode(text);

        if self.at_content_start {
            if let Some(c) = encoded.chars().next() {
                // keep a symbol whose shorthand would start a block
                if c != first && LINE_START.contains(&c) {
                    let rest = &text[first.len_utf8()..];
                    encoded = format!("{first}{}", self.characters.encode(rest));
                }
            }
        }

        let escaped = self.escape(&encoded);
        self.push(&escaped);
    }

    /// Rewrite character-table escapes as `~` escapes and escape Creole markup.
    fn escape(&self, encoded: &str) -> String {
        let chars: Vec<char> = encoded.chars().collect();
        let mut out = String::with_capacity(encoded.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let at_start = i == 0 && self.at_content_start;
            match c {
                '\\' => match chars.get(i + 1) {
                    Some(next) => {
                        out.push('~');
                        out.push(*next);
                        i += 1;
                    }
                    None => out.push_str("~\\"),
                },
                '~' => out.push_str("~~"),
                '\n' => out.push(' '),
                // `://` never opens emphasis
                '/' if chars.get(i + 1) == Some(&'/') && (i == 0 || chars[i - 1] != ':') => {
                    out.push_str("~/")
                }
                'h' if starts_url(&chars, i) => out.push_str("~h"),
                c if MARKUP.contains(&c) || (at_start && LINE_START.contains(&c)) => {
                    out.push('~');
                    out.push(c);
                }
                c => out.push(c),
            }
            i += 1;
        }
        out
    }

    fn write_list_items(&mut self, list: &List) -> FormatResult {
        self.list_depth += 1;
        let marker = match list.kind {
            ListKind::Unordered => "*",
            ListKind::Ordered => "#",
        };
        let prefix = marker.repeat(self.list_depth);

        for item in &list.items {
            self.push(&prefix);
            self.push(" ");
            self.begin_content();
            self.write_inlines(&item.content)?;
            self.end_line();
            if let Some(nested) = &item.nested {
                self.write_list_items(nested)?;
            }
        }
        self.list_depth -= 1;
        Ok(())
    }
}

fn starts_url(chars: &[char], i: usize) -> bool {
    let rest: String = chars[i..].iter().take(8).collect();
    let after_word = i > 0 && chars[i - 1].is_alphanumeric();
    !after_word && (rest.starts_with("http://") || rest.starts_with("https://"))
}

impl Formatter for CreoleSerializer<'_> {
    fn dialect(&self) -> &'static str {
        "creole"
    }

    fn write_document(&mut self, doc: &Document) -> FormatResult {
        if !doc.metadata.is_empty() {
            tracing::debug!("creole has no metadata, skipping it");
        }
        self.write_blocks(&doc.blocks)
    }

    fn write_header(&mut self, header: &Header) -> FormatResult {
        self.begin_block();
        self.push(&"=".repeat(header.level as usize));
        self.push(" ");
        self.write_inlines(&header.content)?;
        // a trailing `=` would be read as part of the closing run
        if self.output.ends_with('=') {
            self.output.pop();
            self.output.push_str("~=");
        }
        self.end_line();
        Ok(())
    }

    fn write_paragraph(&mut self, content: &[Inline]) -> FormatResult {
        self.begin_block();
        self.begin_content();
        self.write_inlines(content)?;
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
        if !code.language.is_plain() {
            tracing::debug!(language = %code.language, "creole code blocks carry no language");
        }
        self.begin_block();
        self.push("{{{");
        self.end_line();
        self.push(&code.code);
        self.end_line();
        self.push("}}}");
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
        for row in &table.rows {
            for cell in &row.cells {
                self.write_table_cell(cell)?;
            }
            self.push("|");
            self.end_line();
        }
        Ok(())
    }

    fn write_table_cell(&mut self, cell: &TableCell) -> FormatResult {
        if cell.column_span > 1 || cell.row_span > 1 {
            self.drop_construct("table span")?;
        }
        self.push(if cell.is_header() { "|=" } else { "|" });
        self.begin_content();

        let content = match cell.inline_content() {
            Some(content) => content,
            None => {
                self.drop_construct("block inside table cell")?;
                cell.content
                    .iter()
                    .filter_map(|block| match block {
                        Block::Paragraph(content) => Some(content.clone()),
                        _ => None,
                    })
                    .flatten()
                    .collect()
            }
        };
        self.write_inlines(&content)
    }

    fn write_section(&mut self, section: &Section) -> FormatResult {
        self.drop_construct("section")?;
        self.write_blocks(&section.blocks)
    }

    fn write_table_of_contents(&mut self, _levels: u8) -> FormatResult {
        self.drop_construct("table of contents")
    }

    fn write_run(&mut self, text: &str) -> FormatResult {
        self.write_text(text);
        Ok(())
    }

    fn write_strong(&mut self, content: &[Inline]) -> FormatResult {
        self.push("**");
        self.write_inlines(content)?;
        self.push("**");
        Ok(())
    }

    fn write_emphasized(&mut self, content: &[Inline]) -> FormatResult {
        self.push("//");
        self.write_inlines(content)?;
        self.push("//");
        Ok(())
    }

    fn write_span(&mut self, _class: &str, content: &[Inline]) -> FormatResult {
        self.drop_construct("span")?;
        self.write_inlines(content)
    }

    fn write_line_break(&mut self) -> FormatResult {
        self.push(r"\\");
        Ok(())
    }

    fn write_inline_code(&mut self, code: &str, _language: Option<&CodeLanguage>) -> FormatResult {
        self.push(&format!("{{{{{{{code}}}}}}}"));
        Ok(())
    }

    fn write_hyperlink(
        &mut self,
        url: &str,
        _title: Option<&str>,
        content: &[Inline],
    ) -> FormatResult {
        let default_text = [Inline::run(links::default_link_text(url))];
        if content == default_text.as_slice() {
            self.push(&format!("[[{url}]]"));
            return Ok(());
        }
        self.push(&format!("[[{url}|"));
        self.write_inlines(content)?;
        self.push("]]");
        Ok(())
    }

    fn write_image(&mut self, source: &str, alt: Option<&str>, link: Option<&str>) -> FormatResult {
        if link.is_some() {
            self.drop_construct("image link")?;
        }
        match alt {
            Some(alt) => self.push(&format!("{{{{{source}|{alt}}}}}")),
            None => self.push(&format!("{{{{{source}}}}}")),
        }
        Ok(())
    }

    fn write_symbol(&mut self, file: &str) -> FormatResult {
        let token = SymbolTable::standard()
            .encode(file)
            .unwrap_or(file);
        self.write_text(token);
        Ok(())
    }

    fn write_anchor(&mut self, _name: &str) -> FormatResult {
        self.drop_construct("anchor")
    }

    fn write_equation(&mut self, equation: &str) -> FormatResult {
        self.drop_construct("equation")?;
        self.write_inline_code(equation, None)
    }

    fn write_non_breaking_space(&mut self) -> FormatResult {
        self.push("\u{a0}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::creole::parser::parse_creole;
    use crate::model::{CellAlignment, CellKind, ListItem, TableRow};

    fn serialize(doc: &Document) -> String {
        CreoleSerializer::new(UnsupportedPolicy::Lenient)
            .serialize(doc)
            .unwrap()
    }

    fn paragraph(content: Vec<Inline>) -> Document {
        Document::with_blocks(vec![Block::Paragraph(content)])
    }

    #[test]
    fn test_header_and_styles() {
        let doc = Document::with_blocks(vec![
            Block::Header(Header::new(2, vec![Inline::run("Title")])),
            Block::Paragraph(vec![
                Inline::Strong(vec![Inline::run("bold")]),
                Inline::run(" and "),
                Inline::Emphasized(vec![Inline::run("italic")]),
            ]),
        ]);
        assert_eq!(serialize(&doc), "== Title\n\n**bold** and //italic//\n");
    }

    #[test]
    fn test_markup_characters_are_tilde_escaped() {
        let doc = paragraph(vec![Inline::run("a * b | c // d ~ e")]);
        let written = serialize(&doc);
        assert_eq!(written, "a ~* b ~| c ~// d ~~ e\n");
        assert_eq!(parse_creole(&written), doc);
    }

    #[test]
    fn test_character_table_escapes_become_tilde() {
        let doc = paragraph(vec![Inline::run("a → b but a -> c")]);
        let written = serialize(&doc);
        assert_eq!(written, "a -> b but a -~> c\n");
        assert_eq!(parse_creole(&written), doc);
    }

    #[test]
    fn test_block_markers_are_escaped_at_content_start() {
        let doc = paragraph(vec![Inline::run("= not a header")]);
        assert_eq!(serialize(&doc), "~= not a header\n");
        assert_eq!(parse_creole(&serialize(&doc)), doc);
    }

    #[test]
    fn test_links_and_free_urls() {
        let doc = paragraph(vec![
            Inline::Hyperlink {
                url: "http://x.org".into(),
                title: None,
                content: vec![Inline::run("x.org")],
            },
            Inline::run(" see http://y.org"),
        ]);
        let written = serialize(&doc);
        assert_eq!(written, "[[http://x.org]] see ~http://y.org\n");
        assert_eq!(parse_creole(&written), doc);
    }

    #[test]
    fn test_nested_list_markers() {
        let mut nested = List::new(ListKind::Ordered);
        nested.items.push(ListItem::new(vec![Inline::run("one")]));
        let mut list = List::new(ListKind::Unordered);
        list.items.push(ListItem {
            content: vec![Inline::run("a")],
            nested: Some(nested),
        });
        list.items.push(ListItem::new(vec![Inline::run("b")]));

        let doc = Document::with_blocks(vec![Block::List(list)]);
        let written = serialize(&doc);
        assert_eq!(written, "* a\n## one\n* b\n");
        assert_eq!(parse_creole(&written), doc);
    }

    #[test]
    fn test_table_with_header_row() {
        let cell = |kind, text: &str| {
            TableCell::new(
                kind,
                CellAlignment::None,
                vec![Block::Paragraph(vec![Inline::run(text)])],
            )
        };
        let table = Table {
            rows: vec![
                TableRow {
                    cells: vec![cell(CellKind::Header, "A"), cell(CellKind::Header, "B")],
                },
                TableRow {
                    cells: vec![cell(CellKind::Data, "1"), cell(CellKind::Data, "2")],
                },
            ],
        };
        let doc = Document::with_blocks(vec![Block::Table(table)]);
        let written = serialize(&doc);
        assert_eq!(written, "|=A|=B|\n|1|2|\n");
        assert_eq!(parse_creole(&written), doc);
    }

    #[test]
    fn test_lenient_policy_keeps_content() {
        let doc = Document::with_blocks(vec![
            Block::TableOfContents { levels: 2 },
            Block::Section(Section {
                class: "note".into(),
                blocks: vec![Block::Paragraph(vec![
                    Inline::Anchor("here".into()),
                    Inline::Span {
                        class: "red".into(),
                        content: vec![Inline::run("kept")],
                    },
                    Inline::run(" "),
                    Inline::Equation("x^2".into()),
                ])],
            }),
        ]);
        assert_eq!(serialize(&doc), "kept {{{x^2}}}\n");
    }

    #[test]
    fn test_strict_policy_rejects() {
        let doc = paragraph(vec![Inline::Image {
            source: "a.png".into(),
            alt: None,
            link: Some("http://x.org".into()),
        }]);
        let err = CreoleSerializer::new(UnsupportedPolicy::Strict)
            .serialize(&doc)
            .unwrap_err();
        assert_eq!(
            err,
            FormatError::Unsupported {
                construct: "image link",
                dialect: "creole"
            }
        );
    }

    #[test]
    fn test_code_and_line_breaks() {
        let doc = Document::with_blocks(vec![
            Block::Paragraph(vec![
                Inline::run("a"),
                Inline::LineBreak,
                Inline::InlineCode {
                    code: "x**y".into(),
                    language: None,
                },
            ]),
            Block::CodeBlock(CodeBlock {
                language: CodeLanguage::Plain,
                code: "line 1\nline 2".into(),
            }),
        ]);
        let written = serialize(&doc);
        assert_eq!(written, "a\\\\{{{x**y}}}\n\n{{{\nline 1\nline 2\n}}}\n");
        assert_eq!(parse_creole(&written), doc);
    }
}
