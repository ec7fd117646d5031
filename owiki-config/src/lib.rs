//! Shared configuration loader for the owiki toolchain.
//!
//! `defaults/owiki.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`OwikiConfig`].
//!
//! Keys are case-insensitive in the `config` crate, so variable names read
//! from files arrive lowercased.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use owiki_babel::format::ParseOptions;
use owiki_babel::formats::creole::UnsupportedPolicy;
use owiki_babel::formats::html::{HtmlOptions, HtmlTheme};
use owiki_babel::formats::owiki::formatting_rules::FormattingRules;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/owiki.default.toml");

/// Top-level configuration consumed by owiki applications.
#[derive(Debug, Clone, Deserialize)]
pub struct OwikiConfig {
    pub parse: ParseConfig,
    pub formatting: FormattingConfig,
    pub convert: ConvertConfig,
}

/// Inputs every parse starts from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl From<&ParseConfig> for ParseOptions {
    fn from(config: &ParseConfig) -> Self {
        ParseOptions {
            defines: config.defines.iter().cloned().collect(),
            variables: config.variables.clone(),
            ..ParseOptions::default()
        }
    }
}

/// Formatting-related configuration groups.
#[derive(Debug, Clone, Deserialize)]
pub struct FormattingConfig {
    pub rules: FormattingRulesConfig,
}

/// Mirrors the knobs exposed by the OWiki writer.
#[derive(Debug, Clone, Deserialize)]
pub struct FormattingRulesConfig {
    pub encode_characters: bool,
    pub blank_lines_between_blocks: usize,
    pub break_after_line_break: bool,
}

impl From<FormattingRulesConfig> for FormattingRules {
    fn from(config: FormattingRulesConfig) -> Self {
        FormattingRules::from(&config)
    }
}

impl From<&FormattingRulesConfig> for FormattingRules {
    fn from(config: &FormattingRulesConfig) -> Self {
        FormattingRules {
            encode_characters: config.encode_characters,
            blank_lines_between_blocks: config.blank_lines_between_blocks,
            break_after_line_break: config.break_after_line_break,
        }
    }
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub default_from: String,
    pub html: HtmlConfig,
    pub creole: CreoleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    pub theme: String,
    pub standalone: bool,
    pub symbol_path: String,
    pub custom_css: Option<String>,
}

impl From<&HtmlConfig> for HtmlOptions {
    fn from(config: &HtmlConfig) -> Self {
        HtmlOptions {
            theme: HtmlTheme::from_name(&config.theme),
            custom_css: config.custom_css.clone(),
            standalone: config.standalone,
            symbol_path: config.symbol_path.clone(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreoleConfig {
    pub strict: bool,
}

impl From<&CreoleConfig> for UnsupportedPolicy {
    fn from(config: &CreoleConfig) -> Self {
        if config.strict {
            UnsupportedPolicy::Strict
        } else {
            UnsupportedPolicy::Lenient
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<OwikiConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<OwikiConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.parse.defines.is_empty());
        assert!(config.parse.variables.is_empty());
        assert_eq!(config.convert.default_from, "owiki");
        assert_eq!(config.convert.html.theme, "modern");
        assert!(config.convert.html.custom_css.is_none());
        assert!(!config.convert.creole.strict);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("convert.html.theme", "fancy-serif")
            .expect("override to apply")
            .set_override("convert.creole.strict", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        let options = HtmlOptions::from(&config.convert.html);
        assert_eq!(options.theme, HtmlTheme::FancySerif);
        assert_eq!(
            UnsupportedPolicy::from(&config.convert.creole),
            UnsupportedPolicy::Strict
        );
    }

    #[test]
    fn formatting_rules_config_converts_to_formatting_rules() {
        let config = load_defaults().expect("defaults to deserialize");
        let rules: FormattingRules = config.formatting.rules.into();
        assert_eq!(rules, FormattingRules::default());
    }

    #[test]
    fn user_file_layers_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "[parse]\ndefines = [\"draft\"]\n\n[parse.variables]\nversion = \"2.0\"\n\n\
             [formatting.rules]\nblank_lines_between_blocks = 2\n"
        )
        .expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.formatting.rules.blank_lines_between_blocks, 2);
        assert!(config.formatting.rules.encode_characters);

        let options = ParseOptions::from(&config.parse);
        assert!(options.defines.contains("draft"));
        assert_eq!(options.variables.get("version").map(String::as_str), Some("2.0"));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        assert!(Loader::new().with_file(&missing).build().is_err());
        assert!(Loader::new().with_optional_file(&missing).build().is_ok());
    }
}
