//! CLI-specific transforms
//!
//! This module defines the views `owiki inspect` can print for a parsed
//! document. Parsing happens before a transform runs, so every view sees the
//! document after includes, imports, `@if` blocks and variables were resolved.
//!
//! - `ast-tag`: XML-like tag format (default)
//! - `ast-json`: JSON representation of the document model
//! - `outline`: numbered header outline, one header per line
//!
//! ## Extra Parameters
//!
//! Transforms can accept extra parameters via `--extra-<name> [value]`:
//!
//! - `ast-full`: When set to "true", `ast-tag` also dumps the metadata and the
//!   alignment and spans of table cells.
//! - `levels`: Deepest header level `outline` lists (1 to 5, default 5).
//!
//! Example: `owiki inspect notes.owiki ast-tag --extra-ast-full`

use owiki_babel::formats::json::JsonFormat;
use owiki_babel::formats::tag::serialize_document_with_params as serialize_ast_tag_with_params;
use owiki_babel::model::{plain_text, Header, OutlineNode};
use owiki_babel::{Document, Format};
use std::collections::HashMap;

/// All available CLI transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["ast-tag", "ast-json", "outline"];

/// Transform used when `inspect` is given none.
pub const DEFAULT_TRANSFORM: &str = "ast-tag";

/// Execute a named transform on a parsed document with optional extra parameters
///
/// # Returns
///
/// The transformed output as a string, or an error message
pub fn execute_transform(
    doc: &Document,
    transform_name: &str,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    match transform_name {
        "ast-tag" => {
            let mut tags = serialize_ast_tag_with_params(doc, extra_params)
                .map_err(|e| format!("Transform failed: {e}"))?;
            tags.push('\n');
            Ok(tags)
        }
        "ast-json" => {
            let mut json = JsonFormat
                .serialize(doc)
                .map_err(|e| format!("Transform failed: {e}"))?;
            json.push('\n');
            Ok(json)
        }
        "outline" => {
            let levels = match extra_params.get("levels") {
                Some(raw) => raw
                    .parse::<u8>()
                    .map_err(|_| format!("Invalid value '{raw}' for levels: expected 1 to 5"))?
                    .clamp(1, Header::MAX_LEVEL),
                None => Header::MAX_LEVEL,
            };
            Ok(outline_to_text(&doc.outline().nested(levels)))
        }
        _ => Err(format!("Unknown transform: {transform_name}")),
    }
}

/// Numbered outline, children indented by two spaces per level.
fn outline_to_text(nodes: &[OutlineNode]) -> String {
    let mut out = String::new();
    write_outline(nodes, "", 0, &mut out);
    out
}

fn write_outline(nodes: &[OutlineNode], prefix: &str, depth: usize, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let number = format!("{prefix}{}", i + 1);
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{number} {}\n", plain_text(&node.entry.content)));
        write_outline(&node.children, &format!("{number}."), depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use owiki_babel::FormatRegistry;

    fn parse(source: &str) -> Document {
        FormatRegistry::default().parse(source, "owiki").unwrap()
    }

    #[test]
    fn test_outline_numbers_headers() {
        let doc = parse("= Intro\n== Scope\n== Terms\n= Usage\n=== Deep");
        let output = execute_transform(&doc, "outline", &HashMap::new()).unwrap();
        assert_eq!(
            output,
            "1 Intro\n  1.1 Scope\n  1.2 Terms\n2 Usage\n  2.1 Deep\n"
        );
    }

    #[test]
    fn test_outline_levels_parameter() {
        let doc = parse("= Intro\n== Scope\n= Usage");
        let mut params = HashMap::new();
        params.insert("levels".to_string(), "1".to_string());
        let output = execute_transform(&doc, "outline", &params).unwrap();
        assert_eq!(output, "1 Intro\n2 Usage\n");

        params.insert("levels".to_string(), "deep".to_string());
        assert!(execute_transform(&doc, "outline", &params).is_err());
    }

    #[test]
    fn test_ast_tag_and_json() {
        let doc = parse("Hello");
        let tags = execute_transform(&doc, "ast-tag", &HashMap::new()).unwrap();
        assert!(tags.starts_with("<document>"));
        assert!(tags.contains("<run>Hello</run>"));

        let json = execute_transform(&doc, "ast-json", &HashMap::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["blocks"][0]["paragraph"][0]["run"], "Hello");
    }

    #[test]
    fn test_unknown_transform() {
        let err = execute_transform(&parse("x"), "token-json", &HashMap::new()).unwrap_err();
        assert_eq!(err, "Unknown transform: token-json");
    }
}
