//! The `plx` driver binary.
//!
//! Three positional inputs: the grammar spec, the source text, and the
//! DFA artefact produced by a previous generation run. Exit status 0 for
//! ACCEPT, 1 for a syntactic failure, 2 for an internal error, 3 for a
//! command line error.

use anyhow::Context;
use plx_drv::{Config, Session};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("usage: plx <grammar-spec> <source-text> <dfa-artifact> [output-dir]");
        return ExitCode::from(3);
    }

    let config = Config {
        grammar_spec: Some(PathBuf::from(&args[0])),
        source: Some(PathBuf::from(&args[1])),
        dfa_artifact: Some(PathBuf::from(&args[2])),
        output_dir: args.get(3).map(PathBuf::from),
        verbose: std::env::var("PLX_VERBOSE").is_ok(),
        ..Config::default()
    };

    let session = Session::new(config);
    match session.run().context("driver run failed") {
        Ok(report) => {
            for step in &report.trace {
                println!("{}", step.display());
            }
            for diagnostic in session.diagnostics.diagnostics() {
                eprintln!("{diagnostic}");
            }
            if report.accepted {
                println!("ACCEPT");
                ExitCode::SUCCESS
            } else {
                println!(
                    "ERROR: {}",
                    report.error.unwrap_or_else(|| "input rejected".to_string())
                );
                ExitCode::from(1)
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}
