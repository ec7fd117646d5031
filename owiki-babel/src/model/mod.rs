//! The document model shared by every parser and formatter.
//!
//! Parsers build a [`Document`] in a single pass; formatters only read it.
//! Ownership is strictly top-down (a document owns blocks, blocks own inlines
//! and nested blocks) and every content sequence is a plain `Vec`, possibly
//! empty, never optional.
//!
//! Run text is stored decoded: typed shorthand such as `(C)` has already been
//! replaced by its symbol. Formatters for wiki dialects re-encode on output.

pub mod language;
pub mod nodes;
pub mod outline;

pub use language::CodeLanguage;
pub use nodes::{
    extend_inlines, plain_text, push_text, Block, CellAlignment, CellKind, CodeBlock, Document,
    Header, Inline, List, ListItem, ListKind, Metadata, Section, Table, TableCell, TableRow,
};
pub use outline::{header_anchor, Outline, OutlineEntry, OutlineNode};
