//! Run accumulation shared by the dialect parsers.

use crate::model::{extend_inlines, push_text, Inline};
use crate::tables::CharacterTable;

/// Text of the run being built. `pending` still goes through the character
/// table when flushed, `text` is final.
#[derive(Debug, Default)]
pub(crate) struct RunBuilder {
    inlines: Vec<Inline>,
    text: String,
    pending: String,
}

impl RunBuilder {
    pub(crate) fn push_char(&mut self, c: char) {
        self.pending.push(c);
    }

    pub(crate) fn push_literal(&mut self, table: &CharacterTable, literal: &str) {
        self.flush_pending(table);
        self.text.push_str(literal);
    }

    pub(crate) fn flush_pending(&mut self, table: &CharacterTable) {
        if !self.pending.is_empty() {
            self.text.push_str(&table.decode(&self.pending));
            self.pending.clear();
        }
    }

    pub(crate) fn flush(&mut self, table: &CharacterTable) {
        self.flush_pending(table);
        if !self.text.is_empty() {
            push_text(&mut self.inlines, &self.text);
            self.text.clear();
        }
    }

    pub(crate) fn push(&mut self, table: &CharacterTable, inline: Inline) {
        self.flush(table);
        self.inlines.push(inline);
    }

    pub(crate) fn extend(&mut self, table: &CharacterTable, inlines: Vec<Inline>) {
        self.flush(table);
        extend_inlines(&mut self.inlines, inlines);
    }

    pub(crate) fn ends_with_line_break(&self) -> bool {
        self.text.is_empty()
            && self.pending.is_empty()
            && matches!(self.inlines.last(), Some(Inline::LineBreak))
    }

    pub(crate) fn finish(mut self, table: &CharacterTable) -> Vec<Inline> {
        self.flush(table);
        self.inlines
    }
}
