//! Emoticon and icon tokens ↔ image file names

use once_cell::sync::Lazy;

static STANDARD: Lazy<SymbolTable> = Lazy::new(|| {
    SymbolTable::new(&[
        (":)", "smile.png"),
        (":(", "sad.png"),
        (";)", "wink.png"),
        (":D", "grin.png"),
        (":P", "tongue.png"),
        ("(i)", "information.png"),
        ("(!)", "warning.png"),
        ("(?)", "question.png"),
        ("(/)", "check.png"),
        ("(x)", "error.png"),
        ("(+)", "plus.png"),
        ("(-)", "minus.png"),
        ("(on)", "lightbulb-on.png"),
        ("(off)", "lightbulb-off.png"),
        ("(*)", "star.png"),
        ("(*r)", "star-red.png"),
        ("(*g)", "star-green.png"),
        ("(*b)", "star-blue.png"),
        ("(*y)", "star-yellow.png"),
    ])
});

/// A fixed bijection between symbol tokens and image file names.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// `(token, file)` pairs sorted by descending token length
    entries: Vec<(Vec<char>, String, String)>,
}

impl SymbolTable {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let mut entries: Vec<_> = pairs
            .iter()
            .filter(|(token, _)| !token.is_empty())
            .map(|(token, file)| (token.chars().collect::<Vec<_>>(), token.to_string(), file.to_string()))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    pub fn standard() -> &'static SymbolTable {
        &STANDARD
    }

    /// File name for a token, or `None` for unknown tokens.
    pub fn decode(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, t, _)| t == token)
            .map(|(_, _, file)| file.as_str())
    }

    /// Token for a file name, or `None` for unknown files.
    pub fn encode(&self, file: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, _, f)| f == file)
            .map(|(_, token, _)| token.as_str())
    }

    /// Longest token starting at `pos`, with its length in chars and its file.
    pub fn match_at(&self, chars: &[char], pos: usize) -> Option<(usize, &str)> {
        let rest = chars.get(pos..)?;
        self.entries
            .iter()
            .find(|(token, _, _)| rest.starts_with(token))
            .map(|(token, _, file)| (token.len(), file.as_str()))
    }

    /// Whether any token starts at `pos`.
    pub fn starts_at(&self, chars: &[char], pos: usize) -> bool {
        self.match_at(chars, pos).is_some()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        STANDARD.clone()
    }
}
