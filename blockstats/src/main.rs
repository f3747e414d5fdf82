//! # blockstats
//!
//! A CLI tool for counting block and block-entity types in regions of a
//! voxel world.
//!
//! ## Overview
//!
//! blockstats is built on top of blockstatslib. It loads a world from a JSON
//! description and runs a script of commands against it. Every requester
//! (`@name` at the start of a line, or `--as NAME`) gets its own session, and
//! counts keep adding up until the session is reset.
//!
//! ## Features
//!
//! - **Exact region scans**: boxes, ranges around a point, chunk radii and
//!   all loaded chunks
//! - **Block entities**: `-e` switches any command to the block entity session
//! - **Multiple output formats**: ascii-table (default), compact-table, csv,
//!   simple
//! - **Timestamped dumps**: `dump` and `dump-csv` never overwrite earlier files
//!
//! ## Usage
//!
//! ```bash
//! # One command from the command line
//! blockstats --world world.json count box 0 0 0 15 63 15 \; query
//!
//! # A script on stdin
//! blockstats --world world.json --output-dir dumps <<'EOF'
//! count range 32 16 32
//! @steve count -e all-loaded-chunks
//! @steve query -e --format compact-table
//! dump-csv minecraft:stone minecraft:wool
//! EOF
//! ```

mod script;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use blockstatslib::{Dimensions, Format, ReportOptions, Requester};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::Style;
use tracing::info;
use tracing_subscriber::EnvFilter;

use script::{stdin_lines, ScriptRunner};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("blockstats")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Count block and block entity types in regions of a voxel world")
        .after_help(
            "Commands (one per line on stdin, or separated by ';' on the command line):\n  \
             count [-e] all-loaded-chunks [dim]\n  \
             count [-e] chunk-radius <r> [dim] [x y z]\n  \
             count [-e] range <rx> <ry> <rz> [dim] [x y z]\n  \
             count [-e] box <x1> <y1> <z1> <x2> <y2> <z2> [dim]\n  \
             query [-e] [--format F] [--log] [filters...]\n  \
             dump [-e] [--format F] [filters...]\n  \
             dump-csv [-e] [filters...]\n  \
             reset [-e]\n\
             Prefix a line with @name to run it as that player.",
        )
        .arg(
            Arg::new("world")
                .short('w')
                .long("world")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON world description to scan"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Directory for dump files"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .default_value("ascii-table")
                .value_parser(|s: &str| s.parse::<Format>())
                .help("Default output format: ascii-table, compact-table, csv or simple"),
        )
        .arg(
            Arg::new("as")
                .long("as")
                .help("Player name for lines without an @name prefix (defaults to the console)"),
        )
        .arg(
            Arg::new("command")
                .action(ArgAction::Append)
                .num_args(1..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help("Commands to run; read from stdin when omitted"),
        )
}

/// Install the stderr log subscriber (`RUST_LOG`, default `info`)
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

/// Split trailing command-line words into script lines on `;`.
fn command_lines(words: &[String]) -> Vec<String> {
    words
        .join(" ")
        .split(';')
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let world_path = matches
        .get_one::<PathBuf>("world")
        .context("missing --world")?;
    let output_dir = matches
        .get_one::<PathBuf>("output-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let format = matches
        .get_one::<Format>("format")
        .copied()
        .unwrap_or_default();
    let requester = Requester::from_name(matches.get_one::<String>("as").map(String::as_str));

    let dimensions = Dimensions::from_path(world_path)
        .with_context(|| format!("could not load world '{}'", world_path.display()))?;
    info!(
        world = %world_path.display(),
        dimensions = ?dimensions.ids(),
        "loaded world"
    );

    let options = ReportOptions::new().format(format).output_dir(output_dir);
    let mut runner = ScriptRunner::new(dimensions, options, requester);

    let words: Vec<String> = matches
        .get_many::<String>("command")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let lines = if words.is_empty() {
        stdin_lines().context("failed to read commands from stdin")?
    } else {
        command_lines(&words)
    };

    let summary = runner.run(&lines);
    if summary.failed > 0 {
        eprintln!(
            "{}",
            Style::new().yellow().apply_to(format!(
                "{} of {} commands failed",
                summary.failed,
                summary.failed + summary.succeeded
            ))
        );
    }
    Ok(summary.failed == 0)
}

fn main() -> ExitCode {
    init_tracing();
    let matches = build_command().get_matches();

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", Style::new().red().bold().apply_to("Error:"), e);
            ExitCode::FAILURE
        }
    }
}
