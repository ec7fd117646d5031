//! Helpers for link targets and image sources.
//!
//! Parsers resolve relative image sources against the directory of the
//! document being parsed. Writers that place output in another directory can
//! turn those paths back into relative ones.

use std::path::Path;
use url::Url;

/// Whether `target` is an absolute URL such as `http://host/x.png` or `mailto:me`.
///
/// Windows drive paths (`C:\x`) parse as URLs with a one-letter scheme and are
/// not treated as URLs.
pub fn is_url(target: &str) -> bool {
    match Url::parse(target) {
        Ok(url) => url.scheme().len() > 1,
        Err(_) => false,
    }
}

/// Link text shown when a hyperlink has none: the url without its http(s) scheme.
pub fn default_link_text(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

/// Resolve an image source against `base_dir` unless it is a URL or already absolute.
pub fn resolve_source(source: &str, base_dir: Option<&Path>) -> String {
    if source.is_empty() || is_url(source) || Path::new(source).is_absolute() {
        return source.to_string();
    }
    match base_dir {
        Some(dir) => dir.join(source).to_string_lossy().into_owned(),
        None => source.to_string(),
    }
}

/// Express a resolved file path relative to `output_dir`, for writers whose
/// output lives somewhere else than the source document.
pub fn relativize(source: &str, output_dir: &Path) -> String {
    if is_url(source) || !Path::new(source).is_absolute() {
        return source.to_string();
    }
    match pathdiff::diff_paths(source, output_dir) {
        Some(relative) => to_forward_slashes(&relative),
        None => source.to_string(),
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_urls() {
        assert!(is_url("http://example.com/a.png"));
        assert!(is_url("mailto:someone@example.com"));
        assert!(!is_url("images/a.png"));
        assert!(!is_url("/abs/a.png"));
    }

    #[test]
    fn strips_scheme_for_default_text() {
        assert_eq!(default_link_text("http://www.google.com"), "www.google.com");
        assert_eq!(default_link_text("https://rust-lang.org"), "rust-lang.org");
        assert_eq!(default_link_text("ftp://files"), "ftp://files");
    }

    #[test]
    fn resolves_relative_sources_only() {
        let base = Path::new("/docs");
        assert_eq!(resolve_source("img/a.png", Some(base)), "/docs/img/a.png");
        assert_eq!(resolve_source("/abs/a.png", Some(base)), "/abs/a.png");
        assert_eq!(
            resolve_source("http://x.org/a.png", Some(base)),
            "http://x.org/a.png"
        );
        assert_eq!(resolve_source("img/a.png", None), "img/a.png");
    }

    #[test]
    fn relativizes_against_output_dir() {
        assert_eq!(
            relativize("/docs/img/a.png", Path::new("/docs/out")),
            "../img/a.png"
        );
        assert_eq!(relativize("img/a.png", Path::new("/docs")), "img/a.png");
    }
}
