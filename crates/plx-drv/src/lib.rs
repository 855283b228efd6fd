//! plx-drv - Generator Driver
//!
//! ============================================================================
//! DRIVER OVERVIEW
//! ============================================================================
//!
//! The driver is the orchestrator for the whole generator pipeline. It is
//! responsible for:
//!
//! 1. FILE MANAGEMENT
//!    - Read the lexical spec, grammar spec and source text
//!    - Manage the output directory for artefacts and dumps
//!
//! 2. PIPELINE ORCHESTRATION
//!    - Lexer side: spec → normalised regex → syntax tree → DFA → minimise
//!    - Parser side: grammar → LR(0) collection → FIRST/FOLLOW → SLR table
//!    - Runtime: scan the source, drive the shift-reduce simulator
//!
//! 3. DIAGNOSTICS
//!    - Aggregate table conflicts and lexical errors as warnings
//!    - Decide the final exit code from the parse verdict
//!
//! ```text
//! lexer spec (.yal) ──▶ [plx-lex] ──▶ DFA artefact (JSON)
//!                                          │
//! grammar spec ──▶ [plx-par] ──▶ SLR tables┤
//!                                          ▼
//! source text ─────────────▶ [simulator] ──▶ trace + ACCEPT/ERROR
//! ```
//!
//! Exit codes follow the usual scheme: 0 success, 1 syntactic failure,
//! 2 internal error, 3 command line error.

pub mod artifact;

pub use artifact::{load_dfa, load_tables, save_dfa, save_tables, ArtifactError, TablesArtifact};

use plx_lex::{Dfa, LexSpec, Scanned, Scanner, SpecError, TokenClass};
use plx_par::grammar::literal_token_map;
use plx_par::{
    sim, AugmentedGrammar, Collection, FirstFollow, Grammar, GrammarError, LoadOptions,
    ParseReport,
};
use plx_util::{Handler, Span};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Driver configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Lexical specification (`.yal`) to generate the DFA from.
    pub lexer_spec: Option<PathBuf>,

    /// Grammar specification to generate the tables from.
    pub grammar_spec: Option<PathBuf>,

    /// Source text to parse.
    pub source: Option<PathBuf>,

    /// Previously generated DFA artefact to load instead of generating.
    pub dfa_artifact: Option<PathBuf>,

    /// Where artefacts and dumps go (no files written when `None`).
    pub output_dir: Option<PathBuf>,

    /// Verbose phase-by-phase narration.
    pub verbose: bool,

    /// Opt-in `general`/`p` list wrapping in the grammar loader.
    pub wrap_listy_start: bool,

    /// Opt-in FOLLOW-derived extension of the panic-mode sync set.
    pub follow_sync: bool,
}

/// Errors the driver can surface.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("IO error for {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("missing input: {0}")]
    MissingInput(&'static str),
}

/// Result type alias using DriverError.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Everything the parser generator produced for one grammar.
pub struct GeneratedParser {
    pub grammar: AugmentedGrammar,
    pub collection: Collection,
    pub sets: FirstFollow,
    pub tables: TablesArtifact,
}

/// One driver invocation.
///
/// The session owns the diagnostic handler; conflicts and lexical errors
/// are collected as warnings so a run reports all of them.
pub struct Session {
    /// Configuration
    pub config: Config,

    /// Diagnostic handler
    pub diagnostics: Handler,
}

impl Session {
    /// Create a new session.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            diagnostics: Handler::new(),
        }
    }

    /// Lexer side: load the spec, generate and minimise the DFA, persist
    /// it when an output directory is configured.
    pub fn generate_lexer(&self) -> Result<Dfa> {
        let path = self
            .config
            .lexer_spec
            .as_ref()
            .ok_or(DriverError::MissingInput("lexer specification"))?;
        if self.config.verbose {
            eprintln!("Loading lexer spec: {}", path.display());
        }
        let text = self.read(path)?;
        let spec = LexSpec::parse(&text)?;

        if self.config.verbose {
            eprintln!(
                "Generating DFA from {} rules, {} definitions",
                spec.rules.len(),
                spec.definitions.len()
            );
        }
        let dfa = plx_lex::generate(&spec)?;
        if self.config.verbose {
            eprintln!("DFA has {} states, {} accepting", dfa.state_count(), dfa.accepting.len());
        }

        if let Some(dir) = &self.config.output_dir {
            save_dfa(&dir.join("lexer-dfa.json"), &dfa)?;
        }
        Ok(dfa)
    }

    /// Parser side: load the grammar, normalise literal symbols through
    /// the DFA's literal map, build the LR(0) collection, the sets and
    /// the SLR table. Conflicts become warnings on the session handler.
    pub fn generate_parser(&self, dfa: &Dfa) -> Result<GeneratedParser> {
        let path = self
            .config
            .grammar_spec
            .as_ref()
            .ok_or(DriverError::MissingInput("grammar specification"))?;
        if self.config.verbose {
            eprintln!("Loading grammar: {}", path.display());
        }
        let text = self.read(path)?;
        let mut grammar = Grammar::parse_with(
            &text,
            LoadOptions {
                wrap_listy_start: self.config.wrap_listy_start,
            },
        )?;

        let literal_map = literal_token_map(dfa, &grammar.terminals);
        grammar.normalize_literals(&literal_map);
        let augmented = grammar.augment()?;

        if self.config.verbose {
            eprintln!(
                "Grammar: {} terminals, {} productions",
                augmented.terminals.len(),
                augmented.productions.len()
            );
        }

        let collection = plx_par::lr0::canonical_collection(&augmented);
        let sets = FirstFollow::compute(&augmented);
        let table = plx_par::slr::build_table(&augmented, &collection, &sets);

        for conflict in &table.conflicts {
            self.diagnostics.warning(conflict.to_string(), Span::DUMMY);
        }
        if self.config.verbose {
            eprintln!(
                "SLR table: {} states, {} conflicts",
                collection.states.len(),
                table.conflicts.len()
            );
        }

        let tables = TablesArtifact {
            table,
            productions: augmented.productions.clone(),
        };

        if let Some(dir) = &self.config.output_dir {
            save_tables(&dir.join("slr-tables.json"), &tables)?;
            self.write_dumps(dir, &augmented, &collection, &sets, &tables)?;
        }

        Ok(GeneratedParser {
            grammar: augmented,
            collection,
            sets,
            tables,
        })
    }

    /// Runtime: obtain the DFA (artefact or fresh), generate the parser,
    /// scan the source and simulate. Lexical errors become warnings; the
    /// verdict is the report's.
    pub fn run(&self) -> Result<ParseReport> {
        let dfa = match &self.config.dfa_artifact {
            Some(path) => {
                if self.config.verbose {
                    eprintln!("Loading DFA artefact: {}", path.display());
                }
                load_dfa(path)?
            }
            None => self.generate_lexer()?,
        };

        let parser = self.generate_parser(&dfa)?;

        let source_path = self
            .config
            .source
            .as_ref()
            .ok_or(DriverError::MissingInput("source text"))?;
        let source = self.read(source_path)?;

        let scanned: Vec<Scanned> = Scanner::new(&dfa, source.trim().as_bytes()).collect();
        for token in &scanned {
            if token.class == TokenClass::Error {
                self.diagnostics.warning(
                    format!("lexical error: no rule accepts `{}`", token.lexeme),
                    Span::point(token.offset, 0, 0),
                );
            }
        }
        if self.config.verbose {
            eprintln!("Scanned {} lexemes", scanned.len());
        }

        let report = sim::simulate_with(
            &parser.tables.table,
            &parser.grammar,
            &parser.sets,
            sim::terminal_stream(scanned.into_iter()),
            sim::SimOptions {
                follow_sync: self.config.follow_sync,
            },
        );

        if let Some(dir) = &self.config.output_dir {
            let mut lines: Vec<String> = report.trace.iter().map(|s| s.display()).collect();
            lines.push(String::new());
            lines.push(if report.accepted {
                "ACCEPT".to_string()
            } else {
                format!(
                    "ERROR: {}",
                    report.error.clone().unwrap_or_else(|| "rejected".to_string())
                )
            });
            self.write_lines(&dir.join("parse-trace.txt"), &lines)?;
        }

        Ok(report)
    }

    fn read(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| DriverError::Io(path.to_path_buf(), e))
    }

    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DriverError::Io(parent.to_path_buf(), e))?;
            }
        }
        std::fs::write(path, lines.join("\n") + "\n")
            .map_err(|e| DriverError::Io(path.to_path_buf(), e))
    }

    /// Human-readable dumps: FOLLOW sets, enumerated productions, the
    /// ACTION and GOTO rows.
    fn write_dumps(
        &self,
        dir: &Path,
        grammar: &AugmentedGrammar,
        collection: &Collection,
        sets: &FirstFollow,
        tables: &TablesArtifact,
    ) -> Result<()> {
        let follow_lines: Vec<String> = sets
            .follow
            .iter()
            .map(|(nt, set)| {
                let items: Vec<&str> = set.iter().map(String::as_str).collect();
                format!("FOLLOW({nt}) = {{{}}}", items.join(", "))
            })
            .collect();
        self.write_lines(&dir.join("follow.txt"), &follow_lines)?;

        let production_lines: Vec<String> = tables
            .productions
            .iter()
            .map(|p| format!("{}: {}", p.index, p.display()))
            .collect();
        self.write_lines(&dir.join("productions.txt"), &production_lines)?;

        let mut action_lines = Vec::new();
        for (state, row) in &tables.table.action {
            for (terminal, action) in row {
                action_lines.push(format!("STATE {state:>3}  TOKEN {terminal:<12} → {action}"));
            }
        }
        self.write_lines(&dir.join("slr-action.txt"), &action_lines)?;

        let mut goto_lines = Vec::new();
        for (state, row) in &tables.table.goto {
            for (nonterminal, target) in row {
                goto_lines.push(format!("STATE {state:>3}  GOTO {nonterminal:<12} → {target}"));
            }
        }
        self.write_lines(&dir.join("slr-goto.txt"), &goto_lines)?;

        let state_lines: Vec<String> = collection
            .states
            .iter()
            .enumerate()
            .map(|(id, items)| {
                let rendered: Vec<String> =
                    items.iter().map(|item| item.display(grammar)).collect();
                format!("I{id}:\n  {}", rendered.join("\n  "))
            })
            .collect();
        self.write_lines(&dir.join("lr0-states.txt"), &state_lines)?;

        Ok(())
    }
}
