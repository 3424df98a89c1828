//! Command-line interface for nice-kbd
//! This binary runs the shortcut recognizer over files, for inspecting what a
//! given set of settings would decorate.
//!
//! Usage:
//!   nice-kbd combos `<path>` [--json] [--mode live|static]   - List recognized combos
//!   nice-kbd render `<path>` [--text]                        - Static-render HTML (or a text run)
//!   nice-kbd scan `<tree.json>` [--selection FROM..TO]...     - Live-scan a syntax tree
//!   nice-kbd config [--save `<path>`]                         - Print or save effective settings
//!
//! `<path>` may be `-` to read standard input. Every command accepts
//! `--config <file>` and repeated `--set key=value` overrides.

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::debug;
use nice_kbd_config::{Loader, Settings};
use nice_kbd_html::StaticRenderer;
use nice_kbd_parser::kbd::{
    scan, walk, KeyMatcher, PatternMode, SyntaxTree, SyntaxTreeFile,
};
use std::io::Read;
use std::ops::Range;

fn build_cli() -> Command {
    Command::new("nice-kbd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Finds keyboard shortcut notation in text and renders it as <kbd> keys")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Settings file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .global(true)
                .action(ArgAction::Append)
                .value_name("KEY=VALUE")
                .help("Override one setting, e.g. --set keys.words=ctrl,alt"),
        )
        .subcommand(
            Command::new("combos")
                .about("List recognized combos and their keys")
                .arg(input_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print combos as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .help("Grammar variant: live (escaped formatting) or static (rendered text)")
                        .value_parser(["live", "static"])
                        .default_value("live"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render shortcut notation in an HTML fragment as <kbd> elements")
                .arg(input_arg())
                .arg(
                    Arg::new("text")
                        .long("text")
                        .help("Treat the input as a single plain text run instead of HTML")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Run the live-editing scan over a JSON syntax tree")
                .arg(
                    Arg::new("tree")
                        .help("Syntax tree JSON file ({source, view_mode, nodes})")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("selection")
                        .long("selection")
                        .short('s')
                        .action(ArgAction::Append)
                        .value_name("FROM..TO")
                        .help("Selected byte range; a single offset is a caret"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective settings as TOML")
                .arg(
                    Arg::new("save")
                        .long("save")
                        .value_name("FILE")
                        .help("Write the effective settings to FILE"),
                ),
        )
}

fn input_arg() -> Arg {
    Arg::new("path")
        .help("Input file, or - for standard input")
        .required(true)
        .index(1)
}

fn main() {
    env_logger::init();

    let matches = build_cli().get_matches();
    let settings = load_settings(&matches).unwrap_or_else(|e| {
        eprintln!("Error loading settings: {}", e);
        std::process::exit(1);
    });

    let result = match matches.subcommand() {
        Some(("combos", sub)) => handle_combos_command(sub, &settings),
        Some(("render", sub)) => handle_render_command(sub, &settings),
        Some(("scan", sub)) => handle_scan_command(sub, &settings),
        Some(("config", sub)) => handle_config_command(sub, &settings),
        _ => unreachable!("clap enforces a subcommand"),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_settings(matches: &ArgMatches) -> Result<Settings, String> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        debug!("layering settings from {}", path);
        loader = loader.with_file(path);
    }
    for assignment in matches.get_many::<String>("set").into_iter().flatten() {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("override '{}' is not KEY=VALUE", assignment))?;
        loader = loader
            .set_override(key.trim(), value)
            .map_err(|e| e.to_string())?;
    }
    loader.build().map_err(|e| e.to_string())
}

fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("cannot read standard input: {}", e))?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))
}

/// Handle the combos command
fn handle_combos_command(matches: &ArgMatches, settings: &Settings) -> Result<String, String> {
    let text = read_input(required(matches, "path"))?;
    let mode = match required(matches, "mode") {
        "static" => PatternMode::Static,
        _ => PatternMode::LivePreview,
    };
    let matcher =
        KeyMatcher::build(&settings.to_kbd_config(), mode).map_err(|e| e.to_string())?;
    let combos: Vec<_> = walk(&text, &matcher).collect();

    if matches.get_flag("json") {
        let mut json = serde_json::to_string_pretty(&combos).map_err(|e| e.to_string())?;
        json.push('\n');
        return Ok(json);
    }

    let mut out = String::new();
    for combo in &combos {
        out.push_str(&format!("{}..{} {:?}\n", combo.from(), combo.to(), combo.text));
        for key in &combo.keys {
            out.push_str(&format!(
                "  {}..{} {:?} sep={:?}\n",
                key.span.start, key.span.end, key.trimmed_text, key.separator
            ));
        }
    }
    Ok(out)
}

/// Handle the render command
fn handle_render_command(matches: &ArgMatches, settings: &Settings) -> Result<String, String> {
    let input = read_input(required(matches, "path"))?;
    let renderer = StaticRenderer::new(settings.to_kbd_config()).map_err(|e| e.to_string())?;

    if matches.get_flag("text") {
        return Ok(renderer.render_text(&input));
    }
    renderer.render_html(&input).map_err(|e| e.to_string())
}

/// Handle the scan command
fn handle_scan_command(matches: &ArgMatches, settings: &Settings) -> Result<String, String> {
    let json = read_input(required(matches, "tree"))?;
    let file: SyntaxTreeFile =
        serde_json::from_str(&json).map_err(|e| format!("invalid syntax tree: {}", e))?;
    let tree = SyntaxTree::from(file);

    let selection = matches
        .get_many::<String>("selection")
        .into_iter()
        .flatten()
        .map(String::as_str)
        .map(parse_selection)
        .collect::<Result<Vec<_>, _>>()?;

    let config = settings.to_kbd_config();
    let decorations = scan(&tree, &config, &selection).map_err(|e| e.to_string())?;
    let mut out = serde_json::to_string_pretty(&decorations).map_err(|e| e.to_string())?;
    out.push('\n');
    Ok(out)
}

/// Handle the config command
fn handle_config_command(matches: &ArgMatches, settings: &Settings) -> Result<String, String> {
    if let Some(path) = matches.get_one::<String>("save") {
        settings.save(path).map_err(|e| e.to_string())?;
        return Ok(format!("Saved settings to {}\n", path));
    }
    settings.to_toml().map_err(|e| e.to_string())
}

/// `FROM..TO`, or a single offset for a caret.
fn parse_selection(value: &str) -> Result<Range<usize>, String> {
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid selection '{}', expected FROM..TO", value))
    };
    match value.split_once("..") {
        Some((from, to)) => {
            let (from, to) = (parse(from)?, parse(to)?);
            if from > to {
                return Err(format!("invalid selection '{}', FROM is after TO", value));
            }
            Ok(from..to)
        }
        None => {
            let caret = parse(value)?;
            Ok(caret..caret)
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn parses_selections() {
        assert_eq!(parse_selection("3..7"), Ok(3..7));
        assert_eq!(parse_selection("5"), Ok(5..5));
        assert!(parse_selection("7..3").is_err());
        assert!(parse_selection("a..b").is_err());
    }
}
