//! Library half of the `owiki` binary.
//!
//! Only the inspect transforms live here so integration tests and the build
//! script's mirror of their names can be checked against one list.

pub mod transforms;
