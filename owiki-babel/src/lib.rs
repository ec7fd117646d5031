//! Parsers, document model and formatters for the OWiki markup family
//!
//!     This crate converts wiki-style markup into one shared document model and renders that
//!     model into other representations. OWiki is the native dialect; Creole and Markdown are
//!     read and written as well, HTML is export only, and the tag and JSON dumps exist to
//!     inspect what a parser produced.
//!
//!     This is a pure lib, that is, it powers owiki-cli but is shell agnostic: no code here
//!     supposes a shell environment, be it std printing, env vars or process exit codes. The only
//!     files it reads are the ones a document includes or imports, and stylesheets it is told to.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # ParseError and FormatError
//!     ├── format.rs               # Format trait definition, ParseOptions
//!     ├── formatter               # Formatter trait: one handler per node kind
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── model                   # Document, blocks, inlines, outline
//!     ├── tables                  # Character and symbol replacement tables
//!     ├── common                  # Cursor, link helpers, run accumulation
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Parser implementation
//!     │   │   ├── serializer.rs   # Serializer implementation
//!     │   │   └── mod.rs
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Core Algorithms
//!
//!     The most involved part is the OWiki parser (./formats/owiki/parser): a recursive-descent
//!     parser over a character cursor where every nested construct is parsed with an explicit
//!     list of terminators, and constructs whose closer never shows up fall back to literal text.
//!     Directives splice text into the buffer (`@include`) or run a child parser (`@import`), with
//!     a guard over canonical paths against include cycles.
//!
//!     The other half is the formatter framework (./formatter): formatters implement one handler
//!     per node kind and the trait provides the exhaustive dispatch, so a new node kind does not
//!     compile until every formatter handles it.
//!
//! Formats
//!
//!     Format specific capabilities are implemented with the Format trait. formats should have a
//!     parse() and serialize() method, a name and file extensions. See the trait def [./format.rs ]
//!     - Format trait: Uniform interface for all formats (parsing and/or serialization)
//!     - FormatRegistry: Centralized discovery and selection of formats
//!     - Format implementations: Concrete implementations for each supported format
//!
//!     Conversions between dialects are lossy wherever the target lacks a construct. What each
//!     writer does with such constructs is documented in its module; Creole lets the caller choose
//!     between dropping them and failing.
//!
//! Library Choices
//!
//!     Where a format has a good crate, we adapt to its AST instead of writing text by hand:
//!     Markdown goes through comrak in both directions and HTML is built as an html5ever DOM.
//!     OWiki and Creole have no such crates, so their parsers and writers live here.
//!
pub mod error;
pub mod format;
pub mod formats;
pub mod formatter;
pub mod registry;

pub mod common;
pub mod model;
pub mod tables;

pub use error::{FormatError, ParseError};
pub use format::{Format, ParseOptions, SerializedDocument};
pub use formatter::{FormatResult, Formatter};
pub use model::Document;
pub use registry::FormatRegistry;
