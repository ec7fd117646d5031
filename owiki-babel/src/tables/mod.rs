//! Replacement tables shared by parsers (decode) and formatters (encode).
//!
//! Both tables are immutable values. The standard tables are built once per
//! process; custom tables can be handed to parsers and writers through their
//! constructors.

pub mod characters;
pub mod symbols;

pub use characters::CharacterTable;
pub use symbols::SymbolTable;
