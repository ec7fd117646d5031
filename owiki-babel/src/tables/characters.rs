//! Typed-shorthand ↔ Unicode replacement table
//!
//! Decoding scans left to right and replaces the first entry (in table order)
//! whose shorthand matches at the cursor, so longer overlapping shorthands are
//! listed before their prefixes (`---` before `--`). A backslash escapes the
//! next character, which is emitted verbatim. Unescaped text additionally gets
//! the dimension rewrite `12 x 34` → `12 × 34`.
//!
//! Encoding is the inverse and is verified against decoding one character at a
//! time, so `decode(encode(s)) == s` holds for any input.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::iter::{Peekable, Rev};
use std::str::CharIndices;

static DIMENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)(\s*)x(\s*)(\d)").unwrap());

static STANDARD: Lazy<CharacterTable> = Lazy::new(|| {
    CharacterTable::new(&[
        ("<=>", "⇔"),
        ("<->", "↔"),
        ("---", "—"),
        ("--", "–"),
        ("->", "→"),
        ("<-", "←"),
        ("=>", "⇒"),
        ("<=", "≤"),
        (">=", "≥"),
        ("!=", "≠"),
        ("+-", "±"),
        ("...", "…"),
        ("(C)", "©"),
        ("(R)", "®"),
        ("(TM)", "™"),
    ])
});

#[derive(Debug, Clone)]
struct Entry {
    shorthand: Vec<char>,
    symbol: Vec<char>,
}

/// An ordered shorthand → symbol table.
#[derive(Debug, Clone)]
pub struct CharacterTable {
    entries: Vec<Entry>,
    /// Characters whose presence means encoding has to be verified
    triggers: Vec<char>,
    /// Length of the longest shorthand, in characters
    longest: usize,
}

/// Encoder output: the encoded text, the text it must decode to, and where
/// each emitted unit (a character, an escape pair or a shorthand) starts in
/// both, as byte offsets.
struct Encoded {
    text: String,
    expected: String,
    units: Vec<(usize, usize)>,
}

impl Encoded {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            expected: String::with_capacity(capacity),
            units: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, encoded: &str, decoded: &str) {
        self.units.push((self.text.len(), self.expected.len()));
        self.text.push_str(encoded);
        self.expected.push_str(decoded);
    }
}

impl CharacterTable {
    /// Build a table from `(shorthand, symbol)` pairs in match order.
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let entries: Vec<Entry> = pairs
            .iter()
            .filter(|(shorthand, _)| !shorthand.is_empty())
            .map(|(shorthand, symbol)| Entry {
                shorthand: shorthand.chars().collect(),
                symbol: symbol.chars().collect(),
            })
            .collect();

        let mut triggers: Vec<char> = entries
            .iter()
            .flat_map(|e| e.shorthand.iter().chain(e.symbol.iter()).copied())
            .chain(['\\', 'x'])
            .collect();
        triggers.sort_unstable();
        triggers.dedup();
        let longest = entries.iter().map(|e| e.shorthand.len()).max().unwrap_or(0);

        Self {
            entries,
            triggers,
            longest,
        }
    }

    /// The default table shared by every parser and formatter.
    pub fn standard() -> &'static CharacterTable {
        &STANDARD
    }

    /// `(shorthand, symbol)` pairs in match order.
    pub fn pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.entries.iter().map(|e| {
            (
                e.shorthand.iter().collect::<String>(),
                e.symbol.iter().collect::<String>(),
            )
        })
    }

    /// Replace every shorthand in `text` by its symbol.
    pub fn decode(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut segment = String::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] == '\\' && i + 1 < chars.len() {
                out.push_str(&rewrite_dimensions(&segment));
                segment.clear();
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            match self.shorthand_at(&chars, i) {
                Some(entry) => {
                    segment.extend(entry.symbol.iter());
                    i += entry.shorthand.len();
                }
                None => {
                    segment.push(chars[i]);
                    i += 1;
                }
            }
        }
        out.push_str(&rewrite_dimensions(&segment));
        out
    }

    /// Produce text that decodes back to `text`, preferring shorthand.
    pub fn encode(&self, text: &str) -> String {
        self.encode_with(text, true)
    }

    /// Like [`CharacterTable::encode`], but symbols are kept as they are and
    /// only text that would be rewritten on decode gets escaped.
    pub fn escape(&self, text: &str) -> String {
        self.encode_with(text, false)
    }

    fn encode_with(&self, text: &str, shorthand: bool) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Encoded::with_capacity(text.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if let Some(entry) = self.symbol_at(&chars, i).filter(|_| shorthand) {
                let symbol: String = entry.symbol.iter().collect();
                let shorthand: String = entry.shorthand.iter().collect();
                if self.decodes_to(&out, &shorthand, &symbol) {
                    out.push(&shorthand, &symbol);
                    i += entry.symbol.len();
                    continue;
                }
            }

            let plain = c.to_string();
            let needs_check = out.text.ends_with('\\')
                || c.is_numeric()
                || self.triggers.binary_search(&c).is_ok();
            if !needs_check || self.decodes_to(&out, &plain, &plain) {
                out.push(&plain, &plain);
            } else {
                out.push(&format!("\\{c}"), &plain);
            }
            i += 1;
        }
        out.text
    }

    /// Whether appending `piece` to `out` reads back as `decoded`.
    ///
    /// Only the trailing units are decoded again: enough of them to hold the
    /// longest shorthand, widened to any `NxM` context reaching the new text.
    fn decodes_to(&self, out: &Encoded, piece: &str, decoded: &str) -> bool {
        let min_units = self.longest + 2;
        let mut unit = out.units.len().saturating_sub(min_units);
        let context = dimension_context_start(&out.text);
        while unit > 0 && out.units[unit].0 > context {
            unit -= 1;
        }
        let (text_from, expected_from) = out.units.get(unit).copied().unwrap_or((0, 0));

        let window = format!("{}{piece}", &out.text[text_from..]);
        self.decode(&window) == format!("{}{decoded}", &out.expected[expected_from..])
    }

    fn shorthand_at(&self, chars: &[char], pos: usize) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| chars[pos..].starts_with(&e.shorthand))
    }

    fn symbol_at(&self, chars: &[char], pos: usize) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| !e.symbol.is_empty() && chars[pos..].starts_with(&e.symbol))
    }
}

impl Default for CharacterTable {
    fn default() -> Self {
        STANDARD.clone()
    }
}

/// Byte offset where a dimension match ending in text appended to `text`
/// could start: trailing whitespace, an `x`, more whitespace and a digit.
fn dimension_context_start(text: &str) -> usize {
    let mut chars = text.char_indices().rev().peekable();
    let mut start = text.len();

    skip_whitespace(&mut chars, &mut start);
    if let Some(&(i, 'x')) = chars.peek() {
        start = i;
        chars.next();
        skip_whitespace(&mut chars, &mut start);
    }
    if let Some(&(i, c)) = chars.peek() {
        if c.is_numeric() {
            start = i;
        }
    }
    start
}

fn skip_whitespace(chars: &mut Peekable<Rev<CharIndices<'_>>>, start: &mut usize) {
    while let Some(&(i, c)) = chars.peek() {
        if !c.is_whitespace() {
            break;
        }
        *start = i;
        chars.next();
    }
}

/// Apply the dimension rewrite until no `NxM` pattern is left.
///
/// Repeating handles chains such as `1x2x3`, whose middle digit belongs to two
/// overlapping matches.
fn rewrite_dimensions(segment: &str) -> String {
    let mut current = segment.to_string();
    loop {
        let next = match DIMENSION.replace_all(&current, "${1}${2}×${3}${4}") {
            Cow::Owned(next) => next,
            Cow::Borrowed(_) => break,
        };
        current = next;
    }
    current
}
