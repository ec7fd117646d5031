//! Format implementations
//!
//! This module contains all format implementations that convert between
//! the document model and various text representations.

pub mod creole;
pub mod html;
pub mod json;
pub mod markdown;
pub mod owiki;
pub mod tag;

pub use creole::{CreoleFormat, UnsupportedPolicy};
pub use html::{get_default_css, HtmlFormat, HtmlOptions, HtmlTheme};
pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
pub use owiki::formatting_rules::FormattingRules;
pub use owiki::OwikiFormat;
pub use tag::TagFormat;
