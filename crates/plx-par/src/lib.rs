//! plx-par - Parser Generator (SLR(1))
//!
//! ============================================================================
//! PARSER GENERATION PIPELINE
//! ============================================================================
//!
//! This crate turns a declared context-free grammar into SLR(1) parse
//! tables and provides the shift-reduce simulator that drives them.
//!
//! ```text
//! Grammar spec (.yalp)
//!        │
//!        ▼
//!   [Grammar loader] ──▶ terminals / productions / start symbol
//!        │
//!        ▼
//!   [Augmentation] ──▶ Start' → Start at production index 0
//!        │
//!        ▼
//!   [LR(0) builder] ──▶ canonical collection of item sets + goto edges
//!        │
//!        ▼
//!   [FIRST / FOLLOW] ──▶ fixed-point terminal sets
//!        │
//!        ▼
//!   [SLR(1) table] ──▶ ACTION / GOTO with conflict records
//!        │
//!        ▼
//!   [Simulator] ──▶ shift-reduce run with panic-mode recovery
//! ```
//!
//! DETERMINISM:
//! ------------
//! State discovery is a breadth-first worklist over goto edges, iterating
//! terminals first and non-terminals second, both in declaration order.
//! Two runs over the same grammar number their states identically; this is
//! a tested property, not an accident.
//!
//! CONFLICTS:
//! ----------
//! A second write to an ACTION cell that disagrees with the first is
//! recorded as a conflict and wins. Generation keeps going so one run
//! reports every conflict in the grammar.

pub mod first_follow;
pub mod grammar;
pub mod lr0;
pub mod sim;
pub mod slr;

pub use first_follow::FirstFollow;
pub use grammar::{AugmentedGrammar, Grammar, LoadOptions, Production};
pub use lr0::{Collection, Item, ItemSet};
pub use sim::{ParseReport, SimOptions, TraceStep};
pub use slr::{Action, Conflict, SlrTable};

use thiserror::Error;

/// Errors raised while turning a grammar specification into parse tables.
#[derive(Error, Debug)]
pub enum GrammarError {
    /// The same terminal was declared twice in `%token` lines.
    #[error("duplicate %token declaration `{name}`")]
    DuplicateToken { name: String },

    /// A production body uses a symbol that is neither a non-terminal,
    /// a declared terminal, nor a mappable literal character.
    #[error("unknown symbol `{symbol}` in a body of `{lhs}`")]
    UnknownSymbol { symbol: String, lhs: String },

    /// The grammar declared no productions.
    #[error("grammar has no productions")]
    EmptyGrammar,

    /// The grammar file deviated from the expected layout.
    #[error("syntax error in grammar line {line}: {detail}")]
    Syntax { detail: String, line: usize },
}

/// Result type alias using GrammarError.
pub type Result<T> = std::result::Result<T, GrammarError>;

/// End-of-input terminal.
pub const END_MARKER: &str = "$";

/// The λ entry used inside FIRST sets for nullable symbols.
pub const EPSILON: &str = "λ";
