//! Headers, code blocks, lists, sections, quotes and paragraphs.

use super::{terminators, OwikiParser, CELL_END};
use crate::error::ParseError;
use crate::model::{
    extend_inlines, push_text, Block, CodeBlock, CodeLanguage, Header, Inline, List, ListItem,
    ListKind, Section,
};

impl OwikiParser<'_> {
    pub(super) fn parse_header(
        &mut self,
        terminator: Option<&'static str>,
    ) -> Result<Block, ParseError> {
        let level = self.cursor.count_run('=');
        self.cursor.advance(level);
        self.cursor.match_literal(" ");

        let content = self.parse_line(terminator)?;
        Ok(Block::Header(Header::new(level, content)))
    }

    pub(super) fn parse_code_block(&mut self) -> Result<Block, ParseError> {
        self.cursor.advance(3);
        let tag_line = self.cursor.read_line();

        // ```code``` on a single line
        if let Some(end) = tag_line.find("```") {
            return Ok(Block::CodeBlock(CodeBlock {
                language: CodeLanguage::Plain,
                code: tag_line[..end].to_string(),
            }));
        }
        self.cursor.match_literal("\n");

        let language = CodeLanguage::from_tag(&tag_line);
        let mut body = self.cursor.read_until("```");
        self.cursor.match_literal("```");
        if body.ends_with('\n') {
            body.pop();
        }

        let code = match body.trim().strip_prefix("@include ") {
            Some(target) => {
                let target = self.substitute_variables(target.trim());
                let path = self.resolve_path(&target);
                tracing::debug!(path = %path.display(), "code block include");
                self.read_file(&path)?
            }
            None => body,
        };

        Ok(Block::CodeBlock(CodeBlock { language, code }))
    }

    /// The run of `*`/`#` at the cursor, if it is followed by a space.
    pub(super) fn list_prefix(&self) -> Option<String> {
        let chars = self.cursor.chars();
        let start = self.cursor.pos();
        let len = chars[start..]
            .iter()
            .take_while(|c| **c == '*' || **c == '#')
            .count();
        if len == 0 {
            return None;
        }
        match chars.get(start + len) {
            Some(' ') | Some('\t') => Some(chars[start..start + len].iter().collect()),
            _ => None,
        }
    }

    pub(super) fn parse_list(
        &mut self,
        terminator: Option<&'static str>,
    ) -> Result<Block, ParseError> {
        let prefix = self.list_prefix().unwrap_or_default();
        let depth = prefix.chars().count();
        let list = self.parse_list_level(depth, list_kind(&prefix), terminator)?;
        Ok(Block::List(list))
    }

    fn parse_list_level(
        &mut self,
        depth: usize,
        kind: ListKind,
        terminator: Option<&'static str>,
    ) -> Result<List, ParseError> {
        let mut list = List::new(kind);

        loop {
            let line_start = self.cursor.pos();
            self.cursor.skip_while(|c| c == ' ' || c == '\t');
            let Some(prefix) = self.list_prefix() else {
                self.cursor.set_pos(line_start);
                break;
            };
            let len = prefix.chars().count();

            if len < depth {
                self.cursor.set_pos(line_start);
                break;
            }

            if len > depth {
                let nested = self.parse_list_level(len, list_kind(&prefix), terminator)?;
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
                continue;
            }

            self.cursor.advance(len + 1);
            let content = self.parse_inline_line(terminator)?;
            list.items.push(ListItem::new(content));
            if !self.cursor.match_literal("\n") {
                break;
            }
        }
        Ok(list)
    }

    pub(super) fn parse_section(&mut self) -> Result<Block, ParseError> {
        self.cursor.advance(2);

        let chars = self.cursor.chars();
        let colon = (self.cursor.pos()..chars.len())
            .take_while(|&i| chars[i] != '\n' && !self.cursor.matches_at(i, "]]"))
            .find(|&i| chars[i] == ':');
        let class = match colon {
            Some(colon) => {
                let class = self.cursor.slice(self.cursor.pos(), colon);
                self.cursor.set_pos(colon + 1);
                class.trim().to_string()
            }
            None => String::new(),
        };

        self.depth += 1;
        let blocks = self.parse_blocks(Some("]]"));
        self.depth -= 1;
        let blocks = blocks?;
        self.cursor.match_literal("]]");
        Ok(Block::Section(Section { class, blocks }))
    }

    pub(super) fn parse_quote(
        &mut self,
        terminator: Option<&'static str>,
    ) -> Result<Block, ParseError> {
        let mut content = Vec::new();

        while self.cursor.match_literal(">") {
            self.cursor.match_literal(" ");
            let line = self.parse_inline_line(terminator)?;
            if !content.is_empty() && !line.is_empty() {
                push_text(&mut content, " ");
            }
            extend_inlines(&mut content, line);
            if !self.cursor.match_literal("\n") {
                break;
            }
        }
        Ok(Block::Quote(content))
    }

    pub(super) fn parse_paragraph(
        &mut self,
        terminator: Option<&'static str>,
    ) -> Result<Option<Block>, ParseError> {
        // a paragraph in a table cell ends with its line
        let own: &[&'static str] = if terminator == Some(CELL_END) {
            &["\n"]
        } else {
            &["\n\n", "\n@"]
        };
        let stops = terminators(own, terminator);
        let (mut content, _) = self.parse_inlines(&stops)?;
        trim_trailing_whitespace(&mut content);
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(Block::Paragraph(content)))
    }

    /// Inline content up to the end of the line, with trailing whitespace
    /// trimmed. The newline is not consumed.
    fn parse_inline_line(
        &mut self,
        terminator: Option<&'static str>,
    ) -> Result<Vec<Inline>, ParseError> {
        let stops = terminators(&["\n"], terminator);
        let (mut content, _) = self.parse_inlines(&stops)?;
        trim_trailing_whitespace(&mut content);
        Ok(content)
    }

    /// Like [`Self::parse_inline_line`], consuming the newline.
    fn parse_line(&mut self, terminator: Option<&'static str>) -> Result<Vec<Inline>, ParseError> {
        let content = self.parse_inline_line(terminator)?;
        self.cursor.match_literal("\n");
        Ok(content)
    }
}

fn list_kind(prefix: &str) -> ListKind {
    if prefix.ends_with('#') {
        ListKind::Ordered
    } else {
        ListKind::Unordered
    }
}

pub(super) fn trim_trailing_whitespace(content: &mut Vec<Inline>) {
    if let Some(Inline::Run(text)) = content.last_mut() {
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
        if text.is_empty() {
            content.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::format::ParseOptions;
    use crate::formats::owiki::parser::parse_owiki;
    use crate::formats::owiki::parser::MAX_NESTING;
    use crate::model::{Block, CodeLanguage, Document, Inline, ListKind, Section};

    fn parse(text: &str) -> Document {
        parse_owiki(text, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn header_levels_one_to_five() {
        for level in 1..=5usize {
            let doc = parse(&format!("{} Title", "=".repeat(level)));
            assert_eq!(doc.blocks.len(), 1);
            let Block::Header(header) = &doc.blocks[0] else {
                panic!("expected header, got {:?}", doc.blocks[0]);
            };
            assert_eq!(header.level as usize, level);
            assert_eq!(header.content, vec![Inline::run("Title")]);
        }
    }

    #[test]
    fn header_level_is_clamped_to_five() {
        let doc = parse("======= Deep");
        let Block::Header(header) = &doc.blocks[0] else {
            panic!("expected header");
        };
        assert_eq!(header.level, 5);
    }

    #[test]
    fn code_block_keeps_raw_text() {
        let doc = parse("```rust\nlet x = **1** -> 2;\n```\nafter");
        assert_eq!(doc.blocks.len(), 2);
        let Block::CodeBlock(code) = &doc.blocks[0] else {
            panic!("expected code block");
        };
        assert_eq!(code.language, CodeLanguage::Rust);
        assert_eq!(code.code, "let x = **1** -> 2;");
    }

    #[test]
    fn unterminated_code_block_runs_to_end() {
        let doc = parse("```\nline one\nline two");
        let Block::CodeBlock(code) = &doc.blocks[0] else {
            panic!("expected code block");
        };
        assert_eq!(code.language, CodeLanguage::Plain);
        assert_eq!(code.code, "line one\nline two");
    }

    #[test]
    fn horizontal_ruler_consumes_dashes() {
        let doc = parse("-----\ntext");
        assert_eq!(
            doc.blocks,
            vec![
                Block::HorizontalRuler,
                Block::Paragraph(vec![Inline::run("text")])
            ]
        );
    }

    #[test]
    fn list_kind_comes_from_first_prefix() {
        let doc = parse("# one\n# two\n");
        let Block::List(list) = &doc.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(list.kind, ListKind::Ordered);
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn nested_lists_attach_to_previous_item() {
        let doc = parse("* a\n** a1\n** a2\n*** a2x\n* b\n");
        assert_eq!(doc.blocks.len(), 1);
        let Block::List(list) = &doc.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].content, vec![Inline::run("a")]);

        let nested = list.items[0].nested.as_ref().expect("nested list");
        assert_eq!(nested.items.len(), 2);
        assert_eq!(nested.items[1].content, vec![Inline::run("a2")]);
        let deeper = nested.items[1].nested.as_ref().expect("deeper list");
        assert_eq!(deeper.items.len(), 1);

        assert_eq!(list.items[1].content, vec![Inline::run("b")]);
        assert!(list.items[1].nested.is_none());
    }

    #[test]
    fn star_without_space_is_emphasis() {
        let doc = parse("*word* here");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                Inline::Emphasized(vec![Inline::run("word")]),
                Inline::run(" here"),
            ])]
        );
    }

    #[test]
    fn section_with_class_and_nested_blocks() {
        let doc = parse("[[note:\n= Inside\n\nBody text\n]]\nAfter");
        assert_eq!(doc.blocks.len(), 2);
        let Block::Section(section) = &doc.blocks[0] else {
            panic!("expected section");
        };
        assert_eq!(section.class, "note");
        assert_eq!(section.blocks.len(), 2);
        assert_eq!(
            doc.blocks[1],
            Block::Paragraph(vec![Inline::run("After")])
        );
    }

    #[test]
    fn sections_nest() {
        let doc = parse("[[outer:[[inner:x]] y]]");
        let Block::Section(outer) = &doc.blocks[0] else {
            panic!("expected section");
        };
        assert_eq!(outer.class, "outer");
        assert!(matches!(&outer.blocks[0], Block::Section(inner) if inner.class == "inner"));
        assert_eq!(outer.blocks[1], Block::Paragraph(vec![Inline::run("y")]));
    }

    #[test]
    fn quote_lines_are_joined() {
        let doc = parse("> first\n> second\n\nnext");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Quote(vec![Inline::run("first second")]),
                Block::Paragraph(vec![Inline::run("next")]),
            ]
        );
    }

    #[test]
    fn link_closes_right_before_section_end() {
        let doc = parse("[[note:see [http://x.org]]]");
        assert_eq!(
            doc.blocks,
            vec![Block::Section(Section {
                class: "note".to_string(),
                blocks: vec![Block::Paragraph(vec![
                    Inline::run("see "),
                    Inline::Hyperlink {
                        url: "http://x.org".to_string(),
                        title: None,
                        content: vec![Inline::run("x.org")],
                    },
                ])],
            })]
        );
    }

    #[test]
    fn deep_sections_stop_nesting() {
        let doc = parse(&"[[a:".repeat(3000));
        let mut depth = 0;
        let mut blocks = &doc.blocks;
        while let [Block::Section(section)] = blocks.as_slice() {
            depth += 1;
            blocks = &section.blocks;
        }
        assert_eq!(depth, MAX_NESTING);
        assert!(matches!(blocks.as_slice(), [Block::Paragraph(_)]));
    }
}
