//! The `parse` subcommand: drive the runtime over a source text.
//!
//! Takes the three driver inputs (grammar spec, source text, DFA
//! artefact), runs the shift-reduce simulator and prints the trace and
//! the verdict. The caller turns the returned verdict into the exit
//! code.

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

/// Arguments for the parse subcommand.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Grammar specification
    pub grammar: PathBuf,

    /// Source text to parse
    pub source: PathBuf,

    /// DFA artefact from a previous `plxt gen`
    pub dfa: PathBuf,

    /// Output directory for the trace dump (default: from config)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Suppress the step-by-step trace
    #[arg(long)]
    pub no_trace: bool,

    /// Wrap a `general`/`p` start symbol into a list grammar
    #[arg(long)]
    pub wrap_listy_start: bool,

    /// Extend the error-recovery sync set with FOLLOW of the stacked
    /// non-terminals
    #[arg(long)]
    pub follow_sync: bool,
}

/// Runs the parse. Returns whether the input was accepted.
pub fn run_parse(args: ParseArgs, config: &Config) -> Result<bool> {
    let output_dir = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));

    let session = plx_drv::Session::new(plx_drv::Config {
        grammar_spec: Some(args.grammar.clone()),
        source: Some(args.source.clone()),
        dfa_artifact: Some(args.dfa.clone()),
        output_dir: Some(output_dir),
        verbose: config.verbose,
        wrap_listy_start: args.wrap_listy_start || config.gen.wrap_listy_start,
        follow_sync: args.follow_sync || config.parse.follow_sync,
        ..plx_drv::Config::default()
    });

    info!(source = %args.source.display(), "parsing");
    let report = session.run()?;

    if config.parse.trace && !args.no_trace {
        for step in &report.trace {
            println!("{}", step.display());
        }
    }
    for diagnostic in session.diagnostics.diagnostics() {
        eprintln!("{diagnostic}");
    }

    if report.accepted {
        println!("ACCEPT");
    } else {
        println!(
            "ERROR: {}",
            report
                .error
                .unwrap_or_else(|| "input rejected".to_string())
        );
    }
    Ok(report.accepted)
}
