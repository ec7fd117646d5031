//! Scanning and link helpers shared by the dialect parsers and writers.

pub mod cursor;
pub mod links;
pub(crate) mod runs;
