//! Tables.
//!
//! Each line starting with `|` is a row. `||` opens a header cell. A cell whose
//! text is `^` widens the cell to its left; a cell whose text is `"` extends the
//! cell above it down by one row. Span owners are found through a per-row map
//! from logical column to cell, so spans stack across rows and columns.

use super::{OwikiParser, CELL_END};
use crate::error::ParseError;
use crate::model::{Block, CellAlignment, CellKind, Table, TableCell, TableRow};

const COLUMN_SPAN: &str = "^";
const ROW_SPAN: &str = "\"";

/// Where a cell lives in the table being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRef {
    row: usize,
    index: usize,
}

impl OwikiParser<'_> {
    pub(super) fn parse_table(&mut self) -> Result<Option<Block>, ParseError> {
        let mut table = Table::default();
        let mut grid: Vec<Vec<CellRef>> = Vec::new();

        loop {
            let line_start = self.cursor.pos();
            self.cursor.skip_while(is_horizontal_space);
            if self.cursor.peek() != Some('|') {
                self.cursor.set_pos(line_start);
                break;
            }

            let row_index = table.rows.len();
            let mut row = TableRow::default();
            let mut columns: Vec<CellRef> = Vec::new();

            while self.cursor.match_literal("|") {
                if self.rest_of_line_is_blank() {
                    break;
                }
                let kind = if self.cursor.match_literal("|") {
                    CellKind::Header
                } else {
                    CellKind::Data
                };
                if self.rest_of_line_is_blank() {
                    break;
                }

                let raw = self.peek_cell_text();
                match raw.trim() {
                    COLUMN_SPAN => {
                        let owner = columns
                            .last()
                            .copied()
                            .filter(|owner| owner.row == row_index)
                            .ok_or(ParseError::InvalidColumnSpan { row: row_index })?;
                        row.cells[owner.index].column_span += 1;
                        columns.push(owner);
                        self.cursor.advance(raw.chars().count());
                    }
                    ROW_SPAN => {
                        let column = columns.len();
                        let owner = row_index
                            .checked_sub(1)
                            .and_then(|previous| grid.get(previous))
                            .and_then(|previous| previous.get(column))
                            .copied()
                            .ok_or(ParseError::InvalidRowSpan {
                                row: row_index,
                                column,
                            })?;
                        let cell = &mut table.rows[owner.row].cells[owner.index];
                        cell.row_span += 1;
                        for _ in 0..cell.column_span.max(1) {
                            columns.push(owner);
                        }
                        self.cursor.advance(raw.chars().count());
                    }
                    _ => {
                        let align = alignment(&raw);
                        let content = self.parse_blocks(Some(CELL_END))?;
                        columns.push(CellRef {
                            row: row_index,
                            index: row.cells.len(),
                        });
                        row.cells.push(TableCell::new(kind, align, content));
                        // a cell left open at the end of its line ends the row
                        if self.after_line_break() {
                            break;
                        }
                    }
                }
            }

            self.cursor.skip_while(is_horizontal_space);
            self.cursor.match_literal("\n");
            if row.cells.is_empty() && columns.is_empty() {
                continue;
            }
            table.rows.push(row);
            grid.push(columns);
        }

        tracing::trace!(rows = table.rows.len(), "table");
        if table.rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(Block::Table(table)))
    }

    fn rest_of_line_is_blank(&self) -> bool {
        self.cursor.chars()[self.cursor.pos()..]
            .iter()
            .take_while(|c| **c != '\n')
            .all(|c| c.is_whitespace())
    }

    /// Whether the whitespace just before the cursor holds a newline.
    fn after_line_break(&self) -> bool {
        self.cursor.chars()[..self.cursor.pos()]
            .iter()
            .rev()
            .take_while(|c| c.is_whitespace())
            .any(|c| *c == '\n')
    }

    /// Raw text of the cell at the cursor, up to the next unescaped `|` or the
    /// end of the line. Does not move the cursor.
    fn peek_cell_text(&self) -> String {
        let chars = self.cursor.chars();
        let mut end = self.cursor.pos();
        while let Some(&c) = chars.get(end) {
            match c {
                '|' | '\n' => break,
                '\\' => end += 2,
                _ => end += 1,
            }
        }
        self.cursor.slice(self.cursor.pos(), end)
    }
}

fn is_horizontal_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Alignment from the padding around the raw cell text.
fn alignment(raw: &str) -> CellAlignment {
    if raw.trim().is_empty() {
        return CellAlignment::None;
    }
    let leading = raw.starts_with(char::is_whitespace);
    let trailing = raw.ends_with(char::is_whitespace);
    match (leading, trailing) {
        (true, true) => CellAlignment::Center,
        (true, false) => CellAlignment::Right,
        (false, true) => CellAlignment::Left,
        (false, false) => CellAlignment::None,
    }
}
