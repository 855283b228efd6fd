//! Plxt CLI - the ergonomic front end of the plx generator.
//!
//! This is the main entry point for the plxt CLI application. It uses
//! clap for argument parsing and dispatches to the command handlers:
//! `gen` compiles specifications into artefacts, `parse` drives the
//! runtime over a source text.

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::gen::{run_gen, GenArgs};
use commands::parse::{run_parse, ParseArgs};
use config::Config;
use error::Result;

/// Plxt - lexer and parser generator tool
///
/// Plxt compiles a lexical specification into a minimised DFA and a
/// grammar into SLR(1) tables, then drives a shift-reduce parser over
/// source texts with the generated artefacts.
#[derive(Parser, Debug)]
#[command(name = "plxt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A CLI tool for the plx lexer-and-parser generator", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "PLXT_VERBOSE")]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PLXT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the plxt CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate lexer and parser artefacts from specifications
    ///
    /// Compiles a lexical specification into a minimised DFA and,
    /// when a grammar is given, the grammar into SLR(1) tables.
    Gen(GenArgs),

    /// Parse a source text with generated artefacts
    ///
    /// Runs the shift-reduce simulator and reports the trace and the
    /// ACCEPT/ERROR verdict. Exit status 1 on a rejected input.
    Parse(ParseArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("PLXT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match dispatch(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(2)
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.verbose = config.verbose || cli.verbose;

    match cli.command {
        Commands::Gen(args) => {
            run_gen(args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Parse(args) => {
            let accepted = run_parse(args, &config)?;
            Ok(if accepted {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}
