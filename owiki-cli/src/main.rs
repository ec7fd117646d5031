// Command-line interface for owiki
//
// This binary provides commands for inspecting and converting OWiki, Creole and Markdown files.
//
// The core capabilities use the owiki-babel crate; this binary owns everything that touches the
// shell: arguments, configuration files, environment variables, stdout and exit codes.
//
// Converting:
//
// The conversion needs a to and from pair. The from is taken, in order, from an explicit --from
// flag, a leading `@syntax` line, the file extension, and finally the configured default.
// Usage:
//  owiki <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  owiki convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  owiki inspect <path> [<transform>]    - Dump the parsed document (defaults to "ast-tag")
//  owiki generate-css                    - Print the baseline CSS used for HTML export
//  owiki --list-formats                  - List formats and inspect transforms
//
// Parse inputs:
//
//  --define <NAME>        enables `@if NAME` blocks (repeatable)
//  --var <NAME=VALUE>     substitutes `$NAME` (repeatable)
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format/transform.
// Example:
//  owiki notes.owiki --to html --extra-theme fancy-serif --extra-standalone false

use owiki_cli::transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use owiki_babel::format::{Format, ParseOptions};
use owiki_babel::formats::creole::{CreoleFormat, UnsupportedPolicy};
use owiki_babel::formats::html::{HtmlFormat, HtmlOptions};
use owiki_babel::formats::owiki::formatting_rules::FormattingRules;
use owiki_babel::formats::OwikiFormat;
use owiki_babel::{Document, FormatRegistry, SerializedDocument};
use owiki_config::{Loader, OwikiConfig};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "OWIKI_LOG";

/// Configuration file picked up from the working directory.
const LOCAL_CONFIG: &str = "owiki.toml";

const SUBCOMMANDS: &[&str] = &["inspect", "convert", "generate-css", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            // A following argument that is not a flag is the value
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("owiki")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and inspecting OWiki documents")
        .long_about(
            "owiki is a command-line tool for working with OWiki markup and its\n\
            sibling dialects.\n\n\
            Commands:\n  \
            - convert: Transform between document formats (owiki, creole, markdown, HTML, ...)\n  \
            - inspect: View the parsed document model\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Logging:\n  \
            Set OWIKI_LOG (e.g. OWIKI_LOG=debug) or pass -v to see what the parser does.\n\n\
            Examples:\n  \
            owiki notes.owiki --to html -o notes.html    # Convert to an HTML file\n  \
            owiki notes.owiki --to markdown --define web # Include `@if web` blocks\n  \
            owiki inspect notes.owiki outline            # Print the header outline"
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and inspect transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an owiki.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("define")
                .long("define")
                .short('D')
                .value_name("NAME")
                .help("Define a name tested by @if (repeatable)")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("var")
                .long("var")
                .value_name("NAME=VALUE")
                .help("Set a variable substituted for $NAME (repeatable)")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log parser and formatter activity to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the parsed document model")
                .long_about(
                    "View the document model a file parses into.\n\n\
                    Transforms:\n  \
                    - ast-tag:   Document model as XML-like tags (default)\n  \
                    - ast-json:  Document model as JSON\n  \
                    - outline:   Numbered header outline\n\n\
                    Extra Parameters:\n  \
                    --extra-ast-full      Include metadata and table cell details in ast-tag\n  \
                    --extra-levels <N>    Deepest header level listed by outline\n\n\
                    Examples:\n  \
                    owiki inspect notes.owiki                    # Tag dump (default)\n  \
                    owiki inspect notes.owiki ast-json           # JSON dump\n  \
                    owiki inspect notes.owiki outline --extra-levels 2"
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the document")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'ast-tag'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - owiki:    OWiki markup (.owiki, .wiki)\n  \
                    - creole:   Creole 1.0 (.creole)\n  \
                    - markdown: Markdown (.md)\n  \
                    - html:     HTML with optional themes (.html), export only\n  \
                    - tag:      XML-like dump of the document model, export only\n  \
                    - json:     JSON dump of the document model, export only\n\n\
                    The source format comes from --from, a leading `@syntax` line, the file\n\
                    extension or the configured default, in that order.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    owiki convert notes.owiki --to markdown         # Convert to markdown (stdout)\n  \
                    owiki convert page.md --to owiki -o page.owiki  # Markdown to OWiki file\n  \
                    owiki convert notes.owiki --to creole --extra-strict\n  \
                    owiki notes.owiki --to html                     # 'convert' is optional"
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .long_help(
                            "Target format to convert to.\n\n\
                            Available formats: owiki, creole, markdown, html, tag, json\n\
                            Use the format name, not the file extension."
                        )
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("generate-css")
                .about("Output the default CSS used for HTML export")
                .long_about(
                    "Outputs the default baseline CSS used when converting to HTML.\n\n\
                    Use this as a starting point for custom styling. The output can be\n\
                    saved to a file and customized, then passed via --extra-css-path to the\n\
                    convert command to extend the default styles.\n\n\
                    Examples:\n  \
                    owiki generate-css                    # Print CSS to stdout\n  \
                    owiki generate-css > custom.css       # Save to file for editing"
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A first argument that is not a flag or subcommand is an input file
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_flag("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            let from = sub_matches.get_one::<String>("from").map(|s| s.as_str());
            let options = parse_options(&matches, path, &config);
            handle_inspect_command(path, from, transform, &options, &extra_params, &config);
        }
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let from = sub_matches.get_one::<String>("from").map(|s| s.as_str());
            let to = sub_matches.get_one::<String>("to").expect("to is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let options = parse_options(&matches, input, &config);
            handle_convert_command(input, from, to, output, &options, &extra_params, &config);
        }
        Some(("generate-css", _)) => {
            handle_generate_css_command();
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Install the stderr subscriber. `OWIKI_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    from: Option<&str>,
    transform: &str,
    options: &ParseOptions,
    extra_params: &HashMap<String, String>,
    config: &OwikiConfig,
) {
    let registry = FormatRegistry::default();
    let source = read_source(path);
    let from = resolve_source_format(&registry, path, &source, from, config);
    let doc = parse_document(&registry, &source, &from, options);
    tracing::debug!(path, from = %from, transform, blocks = doc.blocks.len(), "inspecting");

    let output = transforms::execute_transform(&doc, transform, extra_params).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });

    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: Option<&str>,
    to: &str,
    output: Option<&str>,
    options: &ParseOptions,
    extra_params: &HashMap<String, String>,
    config: &OwikiConfig,
) {
    let registry = FormatRegistry::default();

    match registry.get(to) {
        Ok(format) if !format.supports_serialization() => {
            eprintln!("Error: format '{to}' does not support serialization");
            std::process::exit(1);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    let source = read_source(input);
    let from = resolve_source_format(&registry, input, &source, from, config);
    tracing::debug!(input, from = %from, to, "converting");
    let doc = parse_document(&registry, &source, &from, options);

    let result = serialize_document(&registry, &doc, to, output, extra_params, config)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });

    match (output, result) {
        (Some(path), data) => {
            fs::write(path, data.into_bytes()).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        (None, SerializedDocument::Text(text)) => {
            print!("{text}");
        }
        (None, SerializedDocument::Binary(_)) => {
            eprintln!("Binary output requires an output file. Use -o <path>.");
            std::process::exit(1);
        }
    }
}

/// Serialize with the configured writer for owiki, html and creole, and the
/// registry's defaults for everything else.
fn serialize_document(
    registry: &FormatRegistry,
    doc: &Document,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &OwikiConfig,
) -> Result<SerializedDocument, owiki_babel::FormatError> {
    let configured: Option<Box<dyn Format>> = match to {
        "owiki" => Some(Box::new(OwikiFormat::new(formatting_rules_from_config(config)))),
        "creole" => Some(Box::new(CreoleFormat::new(UnsupportedPolicy::from(
            &config.convert.creole,
        )))),
        "html" => {
            let mut options = HtmlOptions::from(&config.convert.html);
            options.output_dir = output
                .map(Path::new)
                .and_then(Path::parent)
                .map(Path::to_path_buf);
            Some(Box::new(HtmlFormat::with_options(options)))
        }
        _ => None,
    };

    match configured {
        Some(format) => format.serialize_with_options(doc, extra_params),
        None => registry.serialize_with_options(doc, to, extra_params),
    }
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn parse_document(
    registry: &FormatRegistry,
    source: &str,
    from: &str,
    options: &ParseOptions,
) -> Document {
    registry
        .parse_with_options(source, from, options)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        })
}

/// Pick the source format: explicit flag, `@syntax` line, extension, config.
fn resolve_source_format(
    registry: &FormatRegistry,
    path: &str,
    source: &str,
    explicit: Option<&str>,
    config: &OwikiConfig,
) -> String {
    let from = explicit
        .map(str::to_string)
        .or_else(|| registry.detect_syntax(source))
        .or_else(|| registry.detect_format_from_filename(path))
        .unwrap_or_else(|| config.convert.default_from.clone());

    match registry.get(&from) {
        Ok(format) if format.supports_parsing() => from,
        Ok(_) => {
            eprintln!("Error: format '{from}' does not support parsing");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Parse options for `path`: configured defines and variables, then the
/// command line ones on top.
fn parse_options(matches: &ArgMatches, path: &str, config: &OwikiConfig) -> ParseOptions {
    let configured = ParseOptions::from(&config.parse);
    let mut options = ParseOptions {
        defines: configured.defines,
        variables: configured.variables,
        ..ParseOptions::for_file(path)
    };

    if let Some(defines) = matches.get_many::<String>("define") {
        options.defines.extend(defines.cloned());
    }
    if let Some(vars) = matches.get_many::<String>("var") {
        for raw in vars {
            let (name, value) = parse_var_arg(raw).unwrap_or_else(|e| {
                eprintln!("{e}");
                std::process::exit(1);
            });
            options.variables.insert(name, value);
        }
    }
    options
}

fn parse_var_arg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid --var '{raw}': expected NAME=VALUE")),
    }
}

/// Handle the generate-css command
fn handle_generate_css_command() {
    print!("{}", owiki_babel::formats::get_default_css());
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Conversion formats:");
    for format_name in registry.list_formats() {
        let Ok(format) = registry.get(&format_name) else {
            continue;
        };
        let direction = match (format.supports_parsing(), format.supports_serialization()) {
            (true, true) => "read/write",
            (true, false) => "read",
            (false, true) => "write",
            (false, false) => "",
        };
        println!(
            "  {format_name:<10} {direction:<11} {}",
            format.description()
        );
    }

    println!("\nInspect transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> OwikiConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn formatting_rules_from_config(config: &OwikiConfig) -> FormattingRules {
    FormattingRules::from(&config.formatting.rules)
}

/// Move `--extra-*` values that have a configuration key into the config.
/// Everything else stays for the format or transform.
fn apply_config_overrides(config: &mut OwikiConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("encode-characters") {
        config.formatting.rules.encode_characters = parse_bool_arg("encode-characters", &raw);
    }
    if let Some(raw) = extra_params.remove("break-after-line-break") {
        config.formatting.rules.break_after_line_break =
            parse_bool_arg("break-after-line-break", &raw);
    }
    if let Some(raw) = extra_params.remove("blank-lines") {
        config.formatting.rules.blank_lines_between_blocks = raw.parse().unwrap_or_else(|_| {
            eprintln!("Invalid number '{raw}' for --extra-blank-lines");
            std::process::exit(1);
        });
    }

    if let Some(raw) = take_override(extra_params, &["theme"]) {
        config.convert.html.theme = raw;
    }
    if let Some(raw) = extra_params.remove("standalone") {
        config.convert.html.standalone = parse_bool_arg("standalone", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["symbol-path", "symbols"]) {
        config.convert.html.symbol_path = raw;
    }

    if let Some(raw) = extra_params.remove("strict") {
        config.convert.creole.strict = parse_bool_arg("strict", &raw);
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
