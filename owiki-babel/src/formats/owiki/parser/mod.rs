//! OWiki markup parser
//!
//! A single-pass recursive-descent scanner over one in-memory buffer. Blocks
//! are dispatched on the character at the cursor; inline content is scanned by
//! literal matching with explicit terminator sets, so nested constructs stop
//! where their own closer or any enclosing closer appears.
//!
//!     parse_blocks(terminator)            # skips whitespace, dispatches:
//!         @      directives               # directives.rs
//!         =      header                   # blocks.rs
//!         ```    code block
//!         ---    horizontal ruler
//!         * #    list (prefix + space)
//!         [[     section, nested blocks up to ]]
//!         >      quote
//!         |      table                    # table.rs
//!         else   paragraph up to a blank line
//!     parse_inlines(terminators)          # inlines.rs
//!
//! Textual includes are spliced into the buffer in place, which is why the
//! cursor owns its characters. Imports run a fresh parser on the target file
//! and append its blocks.

mod blocks;
mod directives;
mod inlines;
mod table;

use crate::common::cursor::Cursor;
use crate::error::ParseError;
use crate::format::ParseOptions;
use crate::model::{Block, Document};
use crate::tables::{CharacterTable, SymbolTable};
use inlines::MAX_NESTING;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A textual include whose spliced text ends at `end` in the buffer.
#[derive(Debug, Clone)]
struct IncludeFrame {
    path: PathBuf,
    end: usize,
}

/// Parser for the OWiki dialect. One instance parses one document.
pub struct OwikiParser<'t> {
    options: ParseOptions,
    characters: &'t CharacterTable,
    symbols: &'t SymbolTable,
    cursor: Cursor,
    document: Document,
    /// Canonical paths of the documents that imported this one, and this one
    ancestors: Vec<PathBuf>,
    includes: Vec<IncludeFrame>,
    /// Last forward scan per literal set: where it started and what it found
    scans: HashMap<Vec<&'static str>, (usize, usize)>,
    /// Sections and inline constructs currently open
    depth: usize,
}

impl OwikiParser<'static> {
    /// Create a parser using the standard replacement tables.
    pub fn new(options: &ParseOptions) -> Self {
        Self::with_tables(options, CharacterTable::standard(), SymbolTable::standard())
    }
}

impl<'t> OwikiParser<'t> {
    pub fn with_tables(
        options: &ParseOptions,
        characters: &'t CharacterTable,
        symbols: &'t SymbolTable,
    ) -> Self {
        Self {
            options: options.clone(),
            characters,
            symbols,
            cursor: Cursor::default(),
            document: Document::new(),
            ancestors: Vec::new(),
            includes: Vec::new(),
            scans: HashMap::new(),
            depth: 0,
        }
    }

    /// Parse `text` into a document. Any error discards the partial document.
    pub fn parse(mut self, text: &str) -> Result<Document, ParseError> {
        if let Some(path) = self.options.source_path.clone() {
            self.ancestors.push(canonical(&path));
        }
        self.run(text)
    }

    fn run(mut self, text: &str) -> Result<Document, ParseError> {
        self.cursor = Cursor::new(&normalize_newlines(text));
        let blocks = self.parse_blocks(None)?;
        self.document.blocks = blocks;
        Ok(self.document)
    }

    /// Parse blocks until the end of input or until `terminator` is at the
    /// cursor. The terminator is left for the caller to consume.
    fn parse_blocks(&mut self, terminator: Option<&'static str>) -> Result<Vec<Block>, ParseError> {
        let mut blocks = Vec::new();
        loop {
            self.cursor.skip_while(char::is_whitespace);
            self.leave_finished_includes();
            if self.cursor.at_end() {
                break;
            }
            if terminator.is_some_and(|t| self.cursor.matches(t)) {
                break;
            }

            // an include leaves the cursor in place but pushes a frame
            let before = (self.cursor.pos(), self.includes.len());
            self.parse_block(terminator, &mut blocks)?;
            // never stall on input no rule consumes
            if (self.cursor.pos(), self.includes.len()) == before && !self.cursor.at_end() {
                self.cursor.advance(1);
            }
        }
        Ok(blocks)
    }

    fn parse_block(
        &mut self,
        terminator: Option<&'static str>,
        blocks: &mut Vec<Block>,
    ) -> Result<(), ParseError> {
        let c = match self.cursor.peek() {
            Some(c) => c,
            None => return Ok(()),
        };
        tracing::trace!(pos = self.cursor.pos(), ch = %c, "block dispatch");

        match c {
            '@' => self.parse_directive(blocks)?,
            '=' => blocks.push(self.parse_header(terminator)?),
            '`' if self.cursor.matches("```") => blocks.push(self.parse_code_block()?),
            '-' if self.cursor.matches("---") => {
                self.cursor.skip_while(|c| c == '-');
                blocks.push(Block::HorizontalRuler);
            }
            '*' | '#' if self.list_prefix().is_some() => blocks.push(self.parse_list(terminator)?),
            '[' if self.cursor.matches("[[") && self.depth < MAX_NESTING => {
                blocks.push(self.parse_section()?)
            }
            '>' => blocks.push(self.parse_quote(terminator)?),
            '|' => {
                if let Some(table) = self.parse_table()? {
                    blocks.push(table);
                }
            }
            _ => {
                if let Some(paragraph) = self.parse_paragraph(terminator)? {
                    blocks.push(paragraph);
                }
            }
        }
        Ok(())
    }

    /// Name of the document being parsed, for error messages.
    fn origin(&self) -> String {
        match &self.options.source_path {
            Some(path) => path.display().to_string(),
            None => "<input>".to_string(),
        }
    }

    /// Resolve a directive path against the document directory.
    fn resolve_path(&self, target: &str) -> PathBuf {
        let path = Path::new(target);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.options.base_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    fn read_file(&self, path: &Path) -> Result<String, ParseError> {
        std::fs::read_to_string(path)
            .map(|text| normalize_newlines(&text))
            .map_err(|_| ParseError::FileNotFound {
                path: path.to_path_buf(),
                origin: self.origin(),
            })
    }

    /// Pop include frames whose text the cursor has moved past.
    fn leave_finished_includes(&mut self) {
        while self
            .includes
            .last()
            .is_some_and(|frame| frame.end <= self.cursor.pos())
        {
            self.includes.pop();
        }
    }

    /// Every document currently being expanded, innermost last.
    fn active_chain(&self) -> Vec<PathBuf> {
        self.ancestors
            .iter()
            .cloned()
            .chain(self.includes.iter().map(|frame| frame.path.clone()))
            .collect()
    }
}

/// Parse OWiki text with the standard tables.
pub fn parse_owiki(text: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    OwikiParser::new(options).parse(text)
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Closes a table cell.
const CELL_END: &str = "|";

/// Own terminators first, then the enclosing block's.
fn terminators(own: &[&'static str], block: Option<&'static str>) -> Vec<&'static str> {
    own.iter().copied().chain(block).collect()
}
