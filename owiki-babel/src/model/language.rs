//! Languages recognised on code fences and inline code.

use serde::{Serialize, Serializer};
use std::fmt;

/// Language tag of a code block.
///
/// Known languages are matched case-insensitively, including common aliases.
/// Anything else is preserved verbatim in [`CodeLanguage::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CodeLanguage {
    #[default]
    Plain,
    Rust,
    CSharp,
    C,
    Cpp,
    Java,
    JavaScript,
    TypeScript,
    Python,
    Html,
    Xml,
    Css,
    Json,
    Sql,
    Shell,
    Toml,
    Yaml,
    Other(String),
}

impl CodeLanguage {
    /// Resolve a fence tag. An empty tag is [`CodeLanguage::Plain`].
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_ascii_lowercase().as_str() {
            "" | "plain" | "text" | "txt" => CodeLanguage::Plain,
            "rust" | "rs" => CodeLanguage::Rust,
            "csharp" | "cs" | "c#" => CodeLanguage::CSharp,
            "c" => CodeLanguage::C,
            "cpp" | "c++" | "cxx" => CodeLanguage::Cpp,
            "java" => CodeLanguage::Java,
            "javascript" | "js" => CodeLanguage::JavaScript,
            "typescript" | "ts" => CodeLanguage::TypeScript,
            "python" | "py" => CodeLanguage::Python,
            "html" | "htm" => CodeLanguage::Html,
            "xml" => CodeLanguage::Xml,
            "css" => CodeLanguage::Css,
            "json" => CodeLanguage::Json,
            "sql" => CodeLanguage::Sql,
            "shell" | "sh" | "bash" => CodeLanguage::Shell,
            "toml" => CodeLanguage::Toml,
            "yaml" | "yml" => CodeLanguage::Yaml,
            _ => CodeLanguage::Other(tag.to_string()),
        }
    }

    /// Canonical tag, as written back onto fences. Plain text has an empty tag.
    pub fn as_str(&self) -> &str {
        match self {
            CodeLanguage::Plain => "",
            CodeLanguage::Rust => "rust",
            CodeLanguage::CSharp => "csharp",
            CodeLanguage::C => "c",
            CodeLanguage::Cpp => "cpp",
            CodeLanguage::Java => "java",
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::TypeScript => "typescript",
            CodeLanguage::Python => "python",
            CodeLanguage::Html => "html",
            CodeLanguage::Xml => "xml",
            CodeLanguage::Css => "css",
            CodeLanguage::Json => "json",
            CodeLanguage::Sql => "sql",
            CodeLanguage::Shell => "shell",
            CodeLanguage::Toml => "toml",
            CodeLanguage::Yaml => "yaml",
            CodeLanguage::Other(tag) => tag,
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == CodeLanguage::Plain
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CodeLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
