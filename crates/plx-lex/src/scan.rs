//! Scanner runtime.
//!
//! Longest-match tokenisation driven by a generated DFA. The scanner is a
//! lazy, finite, non-restartable iterator: each step walks transitions
//! until they stall, backs up to the last accepting position, and reports
//! the token of the lowest marker at that state. When no accepting state
//! was seen at all, the single offending byte becomes an error token and
//! scanning resumes right after it.

use crate::dfa::Dfa;

/// Classification of one scanned lexeme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenClass {
    /// A recognised token: its declared name and, for single-literal
    /// rules, the literal character.
    Token {
        name: String,
        literal: Option<char>,
    },
    /// A byte no rule accepts.
    Error,
}

impl TokenClass {
    /// The terminal name the parser sees: the token name, or `ERROR`.
    pub fn terminal(&self) -> &str {
        match self {
            TokenClass::Token { name, .. } => name,
            TokenClass::Error => "ERROR",
        }
    }
}

/// One scanned lexeme with its byte offset in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scanned {
    pub class: TokenClass,
    pub lexeme: String,
    pub offset: usize,
}

/// Longest-match scanner over a byte input.
///
/// # Example
///
/// ```no_run
/// use plx_lex::{Scanner, Dfa};
///
/// fn tokens(dfa: &Dfa, text: &str) {
///     for scanned in Scanner::new(dfa, text.as_bytes()) {
///         println!("{}: {:?}", scanned.lexeme, scanned.class);
///     }
/// }
/// ```
pub struct Scanner<'a> {
    dfa: &'a Dfa,
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner at the start of `input`.
    pub fn new(dfa: &'a Dfa, input: &'a [u8]) -> Self {
        Self {
            dfa,
            input,
            pos: 0,
        }
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for Scanner<'_> {
    type Item = Scanned;

    fn next(&mut self) -> Option<Scanned> {
        if self.pos >= self.input.len() {
            return None;
        }

        let start = self.pos;
        let mut state = self.dfa.initial;
        let mut last_accept: Option<(u32, usize)> = None;

        let mut j = start;
        while j < self.input.len() {
            match self.dfa.step(state, self.input[j]) {
                Some(next) => {
                    state = next;
                    if self.dfa.accepting.contains(&state) {
                        last_accept = Some((state, j));
                    }
                    j += 1;
                }
                None => break,
            }
        }

        match last_accept {
            Some((accept_state, end)) => {
                let lexeme = String::from_utf8_lossy(&self.input[start..=end]).into_owned();
                self.pos = end + 1;
                let action = self.dfa.winning_action(accept_state)?;
                Some(Scanned {
                    class: TokenClass::Token {
                        name: action.token.clone(),
                        literal: action.literal,
                    },
                    lexeme,
                    offset: start,
                })
            }
            None => {
                let lexeme =
                    String::from_utf8_lossy(&self.input[start..start + 1]).into_owned();
                self.pos = start + 1;
                Some(Scanned {
                    class: TokenClass::Error,
                    lexeme,
                    offset: start,
                })
            }
        }
    }
}
