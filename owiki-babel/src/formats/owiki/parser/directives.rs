//! `@name argument` lines: metadata, includes, imports, toc and conditionals.

use super::{canonical, IncludeFrame, OwikiParser};
use crate::error::ParseError;
use crate::format::ParseOptions;
use crate::model::{Block, Header, Metadata};
use std::path::Path;

const DEFAULT_TOC_LEVELS: u8 = 3;

impl OwikiParser<'_> {
    pub(super) fn parse_directive(&mut self, blocks: &mut Vec<Block>) -> Result<(), ParseError> {
        let start = self.cursor.pos();
        self.cursor.advance(1);
        let name: String = self.cursor.chars()[self.cursor.pos()..]
            .iter()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        self.cursor.advance(name.len());

        let argument = self.cursor.read_line();
        self.cursor.match_literal("\n");
        let argument = self.substitute_variables(argument.trim());
        tracing::trace!(directive = %name, %argument, "directive");

        match name.as_str() {
            "include" => self.include(start, &argument)?,
            "import" => self.import(&argument, blocks)?,
            "toc" => {
                let levels = argument
                    .parse::<u8>()
                    .unwrap_or(DEFAULT_TOC_LEVELS)
                    .clamp(1, Header::MAX_LEVEL);
                blocks.push(Block::TableOfContents { levels });
            }
            "syntax" => tracing::debug!(syntax = %argument, "syntax hint"),
            "if" => {
                if !self.options.defines.contains(&argument) {
                    self.skip_to_endif();
                }
            }
            "endif" => {}
            field if Metadata::FIELDS.contains(&field) => {
                self.document.metadata.set(field, argument);
            }
            _ => {
                return Err(ParseError::UnknownDirective {
                    name,
                    origin: self.origin(),
                })
            }
        }
        Ok(())
    }

    /// Replace registered `$name` references; anything else is left as is.
    pub(super) fn substitute_variables(&self, text: &str) -> String {
        if self.options.variables.is_empty() || !text.contains('$') {
            return text.to_string();
        }
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '$' {
                let name: String = chars[i + 1..]
                    .iter()
                    .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
                    .collect();
                if let Some(value) = self.options.variables.get(&name) {
                    out.push_str(value);
                    i += name.chars().count() + 1;
                    continue;
                }
            }
            out.push(chars[i]);
            i += 1;
        }
        out
    }

    /// Skip past the first `@endif` line, or to the end of input.
    fn skip_to_endif(&mut self) {
        match self.cursor.find("@endif", self.cursor.len()) {
            Some(pos) => {
                self.cursor.set_pos(pos);
                self.cursor.read_line();
                self.cursor.match_literal("\n");
            }
            None => self.cursor.set_pos(self.cursor.len()),
        }
    }

    /// Replace the directive line starting at `start` with the file's text.
    fn include(&mut self, start: usize, target: &str) -> Result<(), ParseError> {
        let path = self.resolve_path(target);
        let key = canonical(&path);
        if self.active_chain().contains(&key) {
            return Err(ParseError::CircularInclude {
                path,
                origin: self.origin(),
            });
        }

        let mut text = self.read_file(&path)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        tracing::debug!(path = %path.display(), "include");

        let end = self.cursor.pos();
        let delta = self.cursor.splice(start, end, &text);
        self.scans.clear();
        for frame in &mut self.includes {
            frame.end = frame.end.saturating_add_signed(delta);
        }
        self.includes.push(IncludeFrame {
            path: key,
            end: start + text.chars().count(),
        });
        self.cursor.set_pos(start);
        Ok(())
    }

    /// Parse the file as its own document and append its blocks.
    fn import(&mut self, target: &str, blocks: &mut Vec<Block>) -> Result<(), ParseError> {
        let path = self.resolve_path(target);
        let key = canonical(&path);
        let mut chain = self.active_chain();
        if chain.contains(&key) {
            return Err(ParseError::CircularInclude {
                path,
                origin: self.origin(),
            });
        }

        let text = self.read_file(&path)?;
        tracing::debug!(path = %path.display(), "import");

        let options = ParseOptions {
            base_dir: path.parent().map(Path::to_path_buf),
            source_path: Some(path.clone()),
            ..self.options.clone()
        };
        let mut child = OwikiParser::with_tables(&options, self.characters, self.symbols);
        chain.push(key);
        child.ancestors = chain;

        let document = child.run(&text)?;
        blocks.extend(document.blocks);
        Ok(())
    }
}
