//! Command-line interface for quill
//! This binary converts documents between the syntaxes known to quill-babel, expanding macros on the way.
//!
//! Usage:
//!   quill convert `<path>` [--from `<syntax>`] [--to `<syntax>`] [--config `<file>`] [--no-transform]
//!   quill list-syntaxes                                       - List parsers and renderers
//!   quill list-macros                                         - List the built-in macros
//!   quill reference `<raw>` [--config `<file>`]                 - Parse a resource reference
//!
//! Logging goes to stderr and is controlled by `QUILL_LOG` (e.g. `QUILL_LOG=quill_babel=debug`).

use clap::{Arg, ArgAction, ArgMatches, Command};
use quill_babel::reference::ResourceReferenceParser;
use quill_babel::{convert, ConvertRequest, MacroRegistry, MacroTransformation, Syntax, SyntaxRegistry};
use quill_config::{Loader, QuillConfig};
use std::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in configuration");

    Command::new("quill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documents between markup syntaxes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("convert")
                .about("Convert a document, expanding macros unless told otherwise")
                .arg(
                    Arg::new("path")
                        .help("Path to the source document")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .short('f')
                        .help("Source syntax, as type/version")
                        .default_value("plain/1.0"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .help("Target syntax, as type/version (default: render.default_syntax)"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("no-transform")
                        .long("no-transform")
                        .help("Stream straight from parser to renderer, leaving macros as they are")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list-syntaxes").about("List available parsers and renderers"))
        .subcommand(Command::new("list-macros").about("List the built-in macros"))
        .subcommand(
            Command::new("reference")
                .about("Parse a resource reference and print it back")
                .arg(
                    Arg::new("raw")
                        .help("Reference as written in a document, e.g. doc:Main.WebHome")
                        .required(true)
                        .index(1),
                )
                .arg(config_arg),
        )
}

fn main() {
    init_logging();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("convert", sub)) => handle_convert_command(sub),
        Some(("list-syntaxes", _)) => {
            handle_list_syntaxes_command();
            Ok(())
        }
        Some(("list-macros", _)) => {
            handle_list_macros_command();
            Ok(())
        }
        Some(("reference", sub)) => handle_reference_command(sub),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

/// Logs to stderr, filtered by `QUILL_LOG`; warnings only by default.
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<QuillConfig, String> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        tracing::debug!(%path, "Layering configuration file");
        loader = loader.with_file(path);
    }
    loader
        .build()
        .map_err(|e| format!("Invalid configuration: {}", e))
}

fn parse_syntax(id: &str) -> Result<Syntax, String> {
    id.parse::<Syntax>().map_err(|e| e.to_string())
}

/// Handle the convert command
fn handle_convert_command(matches: &ArgMatches) -> Result<(), String> {
    let config = load_config(matches)?;
    let path = matches
        .get_one::<String>("path")
        .ok_or("a source path is required")?;
    let from = parse_syntax(
        matches
            .get_one::<String>("from")
            .map_or("plain/1.0", String::as_str),
    )?;
    let to = match matches.get_one::<String>("to") {
        Some(id) => parse_syntax(id)?,
        None => config.render.default_syntax.clone(),
    };
    let source = fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))?;

    let registry = SyntaxRegistry::with_defaults();
    let macros = MacroRegistry::with_defaults();
    let transformation = MacroTransformation::new(&macros)
        .with_config(config.transform.engine_config())
        .with_syntaxes(&registry);

    let mut request = ConvertRequest::new(&source, &from, &to);
    if config.transform.enabled && !matches.get_flag("no-transform") {
        request = request.with_transformation(&transformation);
    }
    let conversion = convert(&registry, request).map_err(|e| e.to_string())?;

    for error in &conversion.errors {
        eprintln!("warning: {}", error);
    }
    if let Some(report) = &conversion.report {
        tracing::debug!(
            passes = report.passes,
            executed = report.executed,
            filtered = report.filtered,
            "Transformation finished"
        );
    }

    print!("{}", conversion.output);
    if !conversion.output.is_empty() && !conversion.output.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Handle the list-syntaxes command
fn handle_list_syntaxes_command() {
    let registry = SyntaxRegistry::with_defaults();
    println!("Available syntaxes:\n");

    for support in registry.list_syntaxes() {
        let mut abilities = Vec::new();
        if support.parse {
            abilities.push("parse");
        }
        if support.render {
            abilities.push("render");
        }
        println!("  {:<16}{}", support.syntax.to_string(), abilities.join(", "));
    }
}

/// Handle the list-macros command
fn handle_list_macros_command() {
    let macros = MacroRegistry::with_defaults();
    println!("Available macros:\n");

    for descriptor in macros.descriptors() {
        println!("  {}", descriptor.id);
        println!("    {}", descriptor.description);
        println!();
    }
}

/// Handle the reference command
fn handle_reference_command(matches: &ArgMatches) -> Result<(), String> {
    let config = load_config(matches)?;
    let raw = matches
        .get_one::<String>("raw")
        .ok_or("a reference is required")?;

    let parser = ResourceReferenceParser::with_defaults();
    let reference = parser.parse(raw, &config.references.context());
    println!("{}", reference);
    println!("{}", parser.serialize(&reference));
    Ok(())
}
