use serde::{Deserialize, Serialize};

/// Configuration for the OWiki writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingRules {
    /// Write typed shorthand (`->`, `(C)`) instead of the symbols they stand for
    pub encode_characters: bool,

    /// Number of blank lines between blocks (at least one is always written)
    pub blank_lines_between_blocks: usize,

    /// Continue on a new source line after a line break inside a paragraph
    pub break_after_line_break: bool,
}

impl Default for FormattingRules {
    fn default() -> Self {
        Self {
            encode_characters: true,
            blank_lines_between_blocks: 1,
            break_after_line_break: true,
        }
    }
}
