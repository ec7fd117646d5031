//! Inline markup.
//!
//! `parse_inlines` stops on the first of its terminators and leaves the cursor
//! there. Constructs whose closer never shows up before an enclosing terminator
//! fall back to literal text. Nesting deeper than [`MAX_NESTING`] reads the
//! opener as text.

use super::OwikiParser;
use crate::common::links;
use crate::common::runs::RunBuilder;
use crate::error::ParseError;
use crate::model::Inline;
use std::cmp::Reverse;

/// Deepest nesting of inline constructs.
pub(super) const MAX_NESTING: usize = 64;

impl OwikiParser<'_> {
    /// Parse inline content up to the first terminator, returning the content
    /// and the index of the terminator that stopped it (`None` at end of input).
    pub(super) fn parse_inlines(
        &mut self,
        terminators: &[&'static str],
    ) -> Result<(Vec<Inline>, Option<usize>), ParseError> {
        let table = self.characters;
        let mut run = RunBuilder::default();

        loop {
            let Some(c) = self.cursor.peek() else {
                return Ok((run.finish(table), None));
            };
            if c == '\\' {
                self.parse_escape(&mut run);
                continue;
            }
            if let Some(which) = self.terminator_at(self.cursor.pos(), terminators) {
                return Ok((run.finish(table), Some(which)));
            }
            self.parse_inline(c, terminators, &mut run)?;
        }
    }

    fn parse_inline(
        &mut self,
        c: char,
        terminators: &[&'static str],
        run: &mut RunBuilder,
    ) -> Result<(), ParseError> {
        let table = self.characters;

        match c {
            '$' if self.cursor.matches("$$") => match self.read_raw(2, "$$", terminators) {
                Some(equation) => run.push(table, Inline::Equation(equation)),
                None => {
                    run.push_char('$');
                    run.push_char('$');
                    self.cursor.advance(2);
                }
            },
            '$' => self.parse_variable(run),
            '&' if self.cursor.match_literal("&nbsp;") => run.push(table, Inline::NonBreakingSpace),
            '*' if self.cursor.matches("**") => {
                self.cursor.advance(2);
                let (children, closed) = self.parse_enclosed("**", terminators)?;
                if closed {
                    run.push(table, Inline::Strong(children));
                } else {
                    run.push_literal(table, "**");
                    run.extend(table, children);
                }
            }
            '*' => {
                self.cursor.advance(1);
                let (children, closed) = self.parse_enclosed("*", terminators)?;
                if closed {
                    run.push(table, Inline::Emphasized(children));
                } else {
                    run.push_literal(table, "*");
                    run.extend(table, children);
                }
            }
            '`' => match self.read_raw(1, "`", terminators) {
                Some(code) => run.push(
                    table,
                    Inline::InlineCode {
                        code,
                        language: None,
                    },
                ),
                None => self.literal(run),
            },
            '[' => self.parse_link(terminators, run)?,
            '{' if self.cursor.matches("{{") => self.parse_span(terminators, run)?,
            '{' if self.cursor.matches("{#") => match self.read_raw(2, "}", terminators) {
                Some(name) => run.push(table, Inline::Anchor(name.trim().to_string())),
                None => self.literal(run),
            },
            '{' => self.parse_image(terminators, run),
            '\n' => {
                if !run.ends_with_line_break() {
                    run.push_char(' ');
                }
                run.flush_pending(table);
                self.cursor.advance(1);
            }
            _ => {
                let after_word = self.cursor.previous().is_some_and(char::is_alphanumeric);
                let symbol = if after_word {
                    None
                } else {
                    self.symbols.match_at(self.cursor.chars(), self.cursor.pos())
                };
                match symbol {
                    Some((len, file)) => {
                        run.push(table, Inline::Symbol(file.to_string()));
                        self.cursor.advance(len);
                    }
                    None => self.literal(run),
                }
            }
        }
        Ok(())
    }

    /// `\\\` is a literal backslash pair, `\\` a line break and `\c` the
    /// character `c`, bypassing every other rule.
    fn parse_escape(&mut self, run: &mut RunBuilder) {
        let table = self.characters;
        if self.cursor.match_literal("\\\\\\") {
            run.push_literal(table, "\\\\");
        } else if self.cursor.match_literal("\\\\") {
            run.push(table, Inline::LineBreak);
        } else {
            self.cursor.advance(1);
            match self.cursor.bump() {
                Some(c) => run.push_literal(table, c.encode_utf8(&mut [0; 4])),
                None => run.push_literal(table, "\\"),
            }
        }
    }

    fn parse_variable(&mut self, run: &mut RunBuilder) {
        let name: String = self.cursor.chars()[self.cursor.pos() + 1..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
            .collect();

        match self.options.variables.get(&name).cloned() {
            Some(value) if !name.is_empty() => {
                run.push_literal(self.characters, &value);
                self.cursor.advance(name.chars().count() + 1);
            }
            _ => self.literal(run),
        }
    }

    /// Nested inlines up to `closer`. Returns the children and whether the
    /// closer was found and consumed.
    fn parse_enclosed(
        &mut self,
        closer: &'static str,
        outer: &[&'static str],
    ) -> Result<(Vec<Inline>, bool), ParseError> {
        let stops: Vec<&'static str> = std::iter::once(closer)
            .chain(outer.iter().copied().filter(|t| *t != closer))
            .collect();
        let Some((children, which)) = self.parse_nested(&stops)? else {
            return Ok((Vec::new(), false));
        };
        if which == Some(0) {
            self.cursor.advance(closer.chars().count());
            return Ok((children, true));
        }
        Ok((children, false))
    }

    /// [`Self::parse_inlines`] one level deeper, or `None` at [`MAX_NESTING`].
    fn parse_nested(
        &mut self,
        stops: &[&'static str],
    ) -> Result<Option<(Vec<Inline>, Option<usize>)>, ParseError> {
        if self.depth >= MAX_NESTING {
            return Ok(None);
        }
        self.depth += 1;
        let parsed = self.parse_inlines(stops);
        self.depth -= 1;
        parsed.map(Some)
    }

    fn parse_link(
        &mut self,
        terminators: &[&'static str],
        run: &mut RunBuilder,
    ) -> Result<(), ParseError> {
        let table = self.characters;
        let start = self.cursor.pos();
        self.cursor.advance(1);

        // a link may sit in a table cell, whose `|` closer it shares
        let outer = without_pipe(terminators);
        let limit = self.terminator_limit(&outer);
        let url_end = self.find_closer(&["|", "]"], limit, &outer);
        let url = url_end.map(|end| self.cursor.slice(self.cursor.pos(), end));
        let (Some(url_end), Some(url)) = (url_end, url) else {
            self.cursor.set_pos(start);
            self.literal(run);
            return Ok(());
        };
        if url.trim().is_empty() {
            self.cursor.set_pos(start);
            self.literal(run);
            return Ok(());
        }
        self.cursor.set_pos(url_end);

        if self.cursor.match_literal("]") {
            let content = vec![Inline::run(links::default_link_text(&url))];
            run.push(
                table,
                Inline::Hyperlink {
                    url,
                    title: None,
                    content,
                },
            );
            return Ok(());
        }
        self.cursor.advance(1);

        let stops: Vec<&'static str> = ["|", "]"]
            .into_iter()
            .chain(terminators.iter().copied().filter(|t| !matches!(*t, "|" | "]")))
            .collect();
        let (content, which) = self.parse_nested(&stops)?.unwrap_or_default();
        match which {
            Some(1) => {
                self.cursor.advance(1);
                run.push(
                    table,
                    Inline::Hyperlink {
                        url,
                        title: None,
                        content,
                    },
                );
            }
            Some(0) => {
                self.cursor.advance(1);
                let limit = self.terminator_limit(terminators);
                match self.find_closer(&["]"], limit, terminators) {
                    Some(end) => {
                        let title = self.cursor.slice(self.cursor.pos(), end);
                        self.cursor.set_pos(end + 1);
                        run.push(
                            table,
                            Inline::Hyperlink {
                                url,
                                title: Some(title),
                                content,
                            },
                        );
                    }
                    None => {
                        run.push_literal(table, &format!("[{url}|"));
                        run.extend(table, content);
                        run.push_literal(table, "|");
                    }
                }
            }
            _ => {
                run.push_literal(table, &format!("[{url}|"));
                run.extend(table, content);
            }
        }
        Ok(())
    }

    fn parse_span(
        &mut self,
        terminators: &[&'static str],
        run: &mut RunBuilder,
    ) -> Result<(), ParseError> {
        let table = self.characters;
        let start = self.cursor.pos();
        self.cursor.advance(2);

        let limit = self.terminator_limit(terminators);
        let chars = self.cursor.chars();
        let colon = (self.cursor.pos()..limit)
            .take_while(|&i| chars[i] != '\n' && !self.cursor.matches_at(i, "}}"))
            .find(|&i| chars[i] == ':');
        let Some(colon) = colon else {
            self.cursor.set_pos(start);
            self.literal(run);
            self.literal(run);
            return Ok(());
        };
        let class = self.cursor.slice(self.cursor.pos(), colon).trim().to_string();
        self.cursor.set_pos(colon + 1);

        let (content, closed) = self.parse_enclosed("}}", terminators)?;
        if closed {
            run.push(table, Inline::Span { class, content });
        } else {
            run.push_literal(table, &format!("{{{{{class}:"));
            run.extend(table, content);
        }
        Ok(())
    }

    fn parse_image(&mut self, terminators: &[&'static str], run: &mut RunBuilder) {
        let start = self.cursor.pos();
        let Some(inner) = self.read_raw(1, "}", &without_pipe(terminators)) else {
            self.literal(run);
            return;
        };

        let mut parts = inner.split('|').map(str::trim);
        let source = parts.next().unwrap_or_default();
        if source.is_empty() {
            self.cursor.set_pos(start);
            self.literal(run);
            return;
        }
        let alt = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
        let link = parts.next().filter(|s| !s.is_empty()).map(str::to_string);

        let source = links::resolve_source(source, self.options.base_dir.as_deref());
        run.push(self.characters, Inline::Image { source, alt, link });
    }

    /// Append the character at the cursor to the pending run.
    fn literal(&mut self, run: &mut RunBuilder) {
        if let Some(c) = self.cursor.bump() {
            run.push_char(c);
        }
    }

    /// Read raw text between an opener of `opener_len` chars and `closer`,
    /// searching only up to the next terminator. On failure the cursor is
    /// left on the opener.
    fn read_raw(
        &mut self,
        opener_len: usize,
        closer: &'static str,
        terminators: &[&'static str],
    ) -> Option<String> {
        let start = self.cursor.pos();
        self.cursor.advance(opener_len);
        let limit = self.terminator_limit(terminators);
        match self.find_closer(&[closer], limit, terminators) {
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

    /// Position of the first of `closers` before `limit`. A closer sitting
    /// right at `limit` also counts when a terminator still matches after it,
    /// so `]]]` ends a link and then a section.
    fn find_closer(
        &mut self,
        closers: &[&'static str],
        limit: usize,
        terminators: &[&'static str],
    ) -> Option<usize> {
        let end = self.next_of(closers);
        if end < limit {
            return Some(end);
        }
        if end > limit || end >= self.cursor.len() {
            return None;
        }
        let which = self.terminator_at(end, closers)?;
        let after = end + closers[which].chars().count();
        self.terminator_at(after, terminators).map(|_| end)
    }

    /// Index of the terminator matching at `pos`. The longest match wins, and
    /// a single `*` does not close at a `**` unless `**` is a terminator too.
    /// An earlier terminator that is a prefix of the winner closes first if
    /// the winner still matches right after it.
    fn terminator_at(&self, pos: usize, terminators: &[&'static str]) -> Option<usize> {
        let strong_active = terminators.contains(&"**");
        let (which, longest) = terminators
            .iter()
            .enumerate()
            .filter(|(_, t)| self.cursor.matches_at(pos, t))
            .filter(|(_, t)| strong_active || **t != "*" || !self.cursor.matches_at(pos, "**"))
            .max_by_key(|(i, t)| (t.len(), Reverse(*i)))?;
        let inner = terminators[..which].iter().position(|t| {
            longest.starts_with(t) && self.cursor.matches_at(pos + t.chars().count(), longest)
        });
        Some(inner.unwrap_or(which))
    }

    /// Position of the next terminator, or the end of input.
    fn terminator_limit(&mut self, terminators: &[&'static str]) -> usize {
        self.next_of(terminators)
    }

    /// Position of the next match of any of `literals` at or after the
    /// cursor, or the end of input. A scan stays valid for every cursor
    /// position between its start and its result until the buffer changes.
    fn next_of(&mut self, literals: &[&'static str]) -> usize {
        let pos = self.cursor.pos();
        if let Some(&(from, found)) = self.scans.get(literals) {
            if from <= pos && pos <= found {
                return found;
            }
        }
        let found = (pos..self.cursor.len())
            .find(|&i| self.terminator_at(i, literals).is_some())
            .unwrap_or(self.cursor.len());
        self.scans.insert(literals.to_vec(), (pos, found));
        found
    }
}

fn without_pipe(terminators: &[&'static str]) -> Vec<&'static str> {
    terminators.iter().copied().filter(|t| *t != "|").collect()
}
