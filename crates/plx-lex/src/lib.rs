//! plx-lex - Lexer Generator (Regex to DFA)
//!
//! ============================================================================
//! LEXER GENERATION PIPELINE
//! ============================================================================
//!
//! This crate turns a lexical specification (token rules written as regular
//! expressions with actions) into a deterministic finite automaton, and
//! provides the runtime that tokenises input text with it.
//!
//! ```text
//! Lexical spec (.yal)
//!        │
//!        ▼
//!   [Spec loader] ──▶ header / trailer / definitions / token rules
//!        │
//!        ▼
//!   [Normaliser] ──▶ one combined regex, one accepting marker per rule
//!        │
//!        ▼
//!   [Postfix] ──▶ typed token stream in reverse Polish order
//!        │
//!        ▼
//!   [Syntax tree] ──▶ nullable / firstpos / lastpos annotations
//!        │
//!        ▼
//!   [DFA constructor] ──▶ states, transitions, token actions (followpos)
//!        │
//!        ▼
//!   [Minimiser] ──▶ partition-refined DFA, token identity preserved
//!        │
//!        ▼
//!   [Scanner] ──▶ longest-match token stream over input text
//! ```
//!
//! THE REGEX ALPHABET:
//! -------------------
//! After normalisation the regex ranges over a mixed alphabet: input bytes
//! (written as decimal ASCII codes), opaque byte classes (complements and
//! set differences, kept atomic), the empty string `λ`, and integer markers
//! >= 1000 that tag which rule alternative accepted. The typed form is
//! [`Symbol`]; the decimal string form exists only at the text boundary.
//!
//! MARKERS AND TIE-BREAKING:
//! -------------------------
//! Every rule alternative gets a unique marker appended to it. A DFA state
//! is accepting iff it contains a marker position; when several markers
//! share a state the lowest id (earliest rule in the spec) names the token.
//! The scanner applies longest match first and the marker rule second.
//!
//! DIRECT CONSTRUCTION:
//! --------------------
//! No NFA is built. The DFA comes straight out of the annotated syntax tree
//! via `followpos` (the Aho/Sethi/Ullman direct construction), with an
//! ε-closure pass that lets `λ` leaves introduced by the `?` rewriting flow
//! through without becoming transitions.

pub mod cursor;
pub mod dfa;
pub mod minimize;
pub mod normalize;
pub mod postfix;
pub mod scan;
pub mod spec;
pub mod symbol;
pub mod tree;

pub use dfa::{Dfa, StateId};
pub use normalize::{MarkerAction, NormalizedRegex};
pub use scan::{Scanned, Scanner, TokenClass};
pub use spec::{LexSpec, TokenRule};
pub use symbol::Symbol;
pub use tree::SyntaxTree;

use plx_util::Span;
use thiserror::Error;

/// Errors raised while turning a lexical specification into a DFA.
///
/// All of these are fatal at generation time; runtime lexical errors are
/// ordinary [`TokenClass::Error`] tokens, not `Err` values.
#[derive(Error, Debug)]
pub enum SpecError {
    /// A delimiter pair in the spec file never closed.
    #[error("unbalanced `{delimiter}` at {span}")]
    Unbalanced { delimiter: char, span: Span },

    /// The same `let` name was bound twice.
    #[error("duplicate definition `{name}` at {span}")]
    DuplicateDefinition { name: String, span: Span },

    /// An identifier survived definition expansion.
    #[error("undefined identifier `{name}` in regex")]
    UndefinedIdentifier { name: String },

    /// Definition expansion failed to reach a fixpoint.
    #[error("definition expansion did not terminate (cycle through `{name}`?)")]
    CyclicDefinition { name: String },

    /// A decimal code outside the byte domain that is not a marker.
    #[error("symbol code {code} is outside the byte domain 0..=255")]
    CodeOutOfRange { code: u32 },

    /// The regex text failed to parse or rewrite.
    #[error("malformed regex: {detail}")]
    MalformedRegex { detail: String },

    /// The spec file deviated from the expected layout.
    #[error("syntax error in specification at {span}: {detail}")]
    Syntax { detail: String, span: Span },

    /// The spec declared no token rules, or a rule with no alternatives.
    #[error("specification has no token rules")]
    EmptyRuleSet,

    /// The combined regex denotes the empty language.
    #[error("regex denotes the empty language; no DFA states to build")]
    EmptyLanguage,
}

/// Result type alias using SpecError.
pub type Result<T> = std::result::Result<T, SpecError>;

/// Run the whole lexer-side pipeline on a loaded specification.
///
/// Normalises the rules, builds the syntax tree, constructs the DFA and
/// minimises it. The returned automaton is the one artefact the scanner
/// and the parser generator consume.
pub fn generate(spec: &LexSpec) -> Result<Dfa> {
    let normalized = normalize::normalize(&spec.rules, &spec.definitions)?;
    let tokens = postfix::tokenize(&normalized.text)?;
    let tokens = postfix::insert_concat(tokens);
    let rpn = postfix::to_postfix(tokens);
    let tree = SyntaxTree::build(&rpn)?;
    let dfa = dfa::construct(&tree, &normalized.markers)?;
    Ok(minimize::minimize(&dfa))
}
