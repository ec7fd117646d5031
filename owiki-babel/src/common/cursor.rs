//! A cursor over a buffer of Unicode scalar values.
//!
//! Parsers in this crate scan text by literal matching at the cursor rather than
//! by regular expressions. The buffer is owned so that textual includes can be
//! spliced in while scanning.

#[derive(Debug, Clone, Default)]
pub struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.chars.len());
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// The character just before the cursor.
    pub fn previous(&self) -> Option<char> {
        self.pos.checked_sub(1).and_then(|i| self.chars.get(i).copied())
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Whether `literal` occurs at the cursor.
    pub fn matches(&self, literal: &str) -> bool {
        self.matches_at(self.pos, literal)
    }

    pub fn matches_at(&self, pos: usize, literal: &str) -> bool {
        let mut i = pos;
        for c in literal.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Consume `literal` if it occurs at the cursor.
    pub fn match_literal(&mut self, literal: &str) -> bool {
        if self.matches(literal) {
            self.pos += literal.chars().count();
            true
        } else {
            false
        }
    }

    /// Position of the next `literal` at or after the cursor, if it occurs
    /// before `limit`.
    pub fn find(&self, literal: &str, limit: usize) -> Option<usize> {
        let limit = limit.min(self.chars.len());
        (self.pos..limit).find(|&i| self.matches_at(i, literal))
    }

    /// Read up to (not including) `literal`, or to the end of the buffer.
    pub fn read_until(&mut self, literal: &str) -> String {
        let end = self.find(literal, self.chars.len()).unwrap_or(self.chars.len());
        self.take_to(end)
    }

    /// Read up to the first of `literals`; returns the text and which literal stopped it.
    pub fn read_until_any(&mut self, literals: &[&str]) -> (String, Option<usize>) {
        let start = self.pos;
        for i in start..self.chars.len() {
            if let Some(which) = literals.iter().position(|lit| self.matches_at(i, lit)) {
                return (self.take_to(i), Some(which));
            }
        }
        (self.take_to(self.chars.len()), None)
    }

    /// Read the rest of the current line, leaving the cursor on the `\n`.
    pub fn read_line(&mut self) -> String {
        self.read_until("\n")
    }

    pub fn skip_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Count how many times `c` repeats at the cursor without consuming.
    pub fn count_run(&self, c: char) -> usize {
        self.chars[self.pos..].iter().take_while(|&&x| x == c).count()
    }

    /// Whether the cursor sits at the start of a line.
    pub fn at_line_start(&self) -> bool {
        self.pos == 0 || self.previous() == Some('\n')
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Replace `start..end` with `text`. Returns the change in length.
    pub fn splice(&mut self, start: usize, end: usize, text: &str) -> isize {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        let inserted: Vec<char> = text.chars().collect();
        let delta = inserted.len() as isize - (end - start) as isize;
        self.chars.splice(start..end, inserted);
        if self.pos > end {
            self.pos = (self.pos as isize + delta) as usize;
        } else if self.pos > start {
            self.pos = start;
        }
        delta
    }

    fn take_to(&mut self, end: usize) -> String {
        let text = self.slice(self.pos, end);
        self.pos = end;
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_matching_consumes_only_on_success() {
        let mut cursor = Cursor::new("**bold**");
        assert!(!cursor.match_literal("*x"));
        assert_eq!(cursor.pos(), 0);
        assert!(cursor.match_literal("**"));
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn read_until_stops_before_literal() {
        let mut cursor = Cursor::new("name: value");
        assert_eq!(cursor.read_until(":"), "name");
        assert_eq!(cursor.peek(), Some(':'));
        assert_eq!(cursor.read_until("missing"), ": value");
        assert!(cursor.at_end());
    }

    #[test]
    fn read_until_any_reports_the_stopper() {
        let mut cursor = Cursor::new("url|text]");
        let (text, which) = cursor.read_until_any(&["|", "]"]);
        assert_eq!(text, "url");
        assert_eq!(which, Some(0));
    }

    #[test]
    fn find_respects_limit() {
        let cursor = Cursor::new("abc`def");
        assert_eq!(cursor.find("`", 7), Some(3));
        assert_eq!(cursor.find("`", 3), None);
    }

    #[test]
    fn splice_replaces_text_at_cursor() {
        let mut cursor = Cursor::new("a@include x\nb");
        cursor.set_pos(1);
        let delta = cursor.splice(1, 11, "INCLUDED");
        assert_eq!(delta, -2);
        assert_eq!(cursor.pos(), 1);
        assert_eq!(cursor.slice(0, cursor.len()), "aINCLUDED\nb");
    }

    #[test]
    fn skip_while_counts_skipped() {
        let mut cursor = Cursor::new("   x");
        assert_eq!(cursor.skip_while(char::is_whitespace), 3);
        assert_eq!(cursor.peek(), Some('x'));
        assert_eq!(cursor.count_run('x'), 1);
    }
}
