//! The `gen` subcommand: run the generator side of the pipeline.
//!
//! Generates the minimised DFA from a lexical specification and, when a
//! grammar is given, the SLR(1) tables as well. Artefacts and the
//! human-readable dumps land in the output directory.

use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;

/// Arguments for the gen subcommand.
#[derive(Args, Debug)]
pub struct GenArgs {
    /// Lexical specification (.yal) to compile
    pub lexer_spec: PathBuf,

    /// Grammar specification to compile alongside the lexer
    #[arg(short, long)]
    pub grammar: Option<PathBuf>,

    /// Output directory (default: from config)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Wrap a `general`/`p` start symbol into a list grammar
    #[arg(long)]
    pub wrap_listy_start: bool,
}

/// Runs lexer (and optionally parser) generation.
pub fn run_gen(args: GenArgs, config: &Config) -> Result<()> {
    let output_dir = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));

    let session = plx_drv::Session::new(plx_drv::Config {
        lexer_spec: Some(args.lexer_spec.clone()),
        grammar_spec: args.grammar.clone(),
        output_dir: Some(output_dir.clone()),
        verbose: config.verbose,
        wrap_listy_start: args.wrap_listy_start || config.gen.wrap_listy_start,
        ..plx_drv::Config::default()
    });

    info!(spec = %args.lexer_spec.display(), "generating DFA");
    let dfa = session.generate_lexer()?;
    info!(
        states = dfa.state_count(),
        accepting = dfa.accepting.len(),
        "DFA written to {}",
        output_dir.join("lexer-dfa.json").display()
    );

    if args.grammar.is_some() {
        let parser = session.generate_parser(&dfa)?;
        info!(
            states = parser.collection.states.len(),
            productions = parser.tables.productions.len(),
            conflicts = parser.tables.table.conflicts.len(),
            "SLR tables written to {}",
            output_dir.join("slr-tables.json").display()
        );
        for conflict in &parser.tables.table.conflicts {
            warn!("{conflict}");
        }
    } else {
        debug!("no grammar given; skipping table generation");
    }

    for diagnostic in session.diagnostics.diagnostics() {
        debug!("{diagnostic}");
    }
    Ok(())
}
