//! Grammar model and loader.
//!
//! Parses the textual grammar layout into declared terminals, declaration-
//! ordered productions and the start symbol, then augments it for the
//! LR(0) construction:
//!
//! ```text
//! %token T1 T2 …
//! NonTerm : body1 | body2
//!         | body3 ;
//! ```
//!
//! Lines beginning with `/*` or `IGNORE` are comments. A body written as
//! `λ` loads as the empty body. The original system silently wrapped a
//! start symbol named `general` or `p` into a list grammar; here that is
//! opt-in through [`LoadOptions::wrap_listy_start`].

use crate::{GrammarError, Result, EPSILON};
use indexmap::IndexMap;
use plx_lex::Dfa;
use std::collections::{BTreeMap, BTreeSet};

/// Loader options.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions {
    /// When the first-defined start symbol is `general` or `p`, inject
    /// `S → S start | start` and make `S` the start. Off by default.
    pub wrap_listy_start: bool,
}

/// A declared grammar: terminals, productions and start symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grammar {
    /// Declared terminals, in declaration order.
    pub terminals: Vec<String>,
    /// Productions per non-terminal, declaration order both ways.
    /// The empty body stands for λ.
    pub productions: IndexMap<String, Vec<Vec<String>>>,
    /// The user's start non-terminal.
    pub start: String,
}

/// One enumerated production. Index 0 is always the augmented
/// `Start' → Start`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Production {
    pub index: u32,
    pub lhs: String,
    pub rhs: Vec<String>,
}

impl Production {
    /// `E → T E'`, with `λ` for the empty body.
    pub fn display(&self) -> String {
        if self.rhs.is_empty() {
            format!("{} → {}", self.lhs, EPSILON)
        } else {
            format!("{} → {}", self.lhs, self.rhs.join(" "))
        }
    }
}

/// The augmented grammar every later stage works on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AugmentedGrammar {
    /// The augmented start symbol (`Start'`, primes until fresh).
    pub start: String,
    /// The user's start non-terminal.
    pub base_start: String,
    /// Declared terminals in declaration order.
    pub terminals: Vec<String>,
    /// Non-terminals in declaration order; the augmented start is last.
    pub nonterminals: Vec<String>,
    /// Enumerated productions; index 0 is the augmented one.
    pub productions: Vec<Production>,
    /// lhs → production indices, for closure.
    by_lhs: BTreeMap<String, Vec<u32>>,
}

impl Grammar {
    /// Parses a grammar source with default options.
    pub fn parse(source: &str) -> Result<Grammar> {
        Self::parse_with(source, LoadOptions::default())
    }

    /// Parses a grammar source.
    pub fn parse_with(source: &str, options: LoadOptions) -> Result<Grammar> {
        let mut grammar = Grammar::default();
        let mut current_lhs: Option<String> = None;
        let mut alternatives: Vec<Vec<String>> = Vec::new();

        for (number, raw_line) in source.lines().enumerate() {
            let line = raw_line.trim();
            let line_no = number + 1;

            if line.is_empty() || line.starts_with("/*") || line.starts_with("IGNORE") {
                continue;
            }

            if let Some(rest) = line.strip_prefix("%token") {
                for name in rest.split_whitespace() {
                    if grammar.terminals.iter().any(|t| t == name) {
                        return Err(GrammarError::DuplicateToken {
                            name: name.to_string(),
                        });
                    }
                    grammar.terminals.push(name.to_string());
                }
                continue;
            }

            if let Some(colon) = line.find(':') {
                flush(&mut grammar, &mut current_lhs, &mut alternatives);

                let lhs = line[..colon].trim().to_string();
                if lhs.is_empty() {
                    return Err(GrammarError::Syntax {
                        detail: "production with empty left-hand side".to_string(),
                        line: line_no,
                    });
                }
                if grammar.start.is_empty() {
                    grammar.start = lhs.clone();
                }
                current_lhs = Some(lhs);

                let rhs = line[colon + 1..].trim().trim_end_matches(';').trim();
                if !rhs.is_empty() {
                    for alt in rhs.split('|') {
                        push_alternative(&mut alternatives, alt, line_no)?;
                    }
                }
                if line.ends_with(';') {
                    flush(&mut grammar, &mut current_lhs, &mut alternatives);
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix('|') {
                if current_lhs.is_none() {
                    return Err(GrammarError::Syntax {
                        detail: "alternative outside a production".to_string(),
                        line: line_no,
                    });
                }
                let rest = rest.trim().trim_end_matches(';').trim();
                push_alternative(&mut alternatives, rest, line_no)?;
                if line.ends_with(';') {
                    flush(&mut grammar, &mut current_lhs, &mut alternatives);
                }
                continue;
            }

            if line.starts_with(';') {
                flush(&mut grammar, &mut current_lhs, &mut alternatives);
                continue;
            }

            if current_lhs.is_some() {
                let rest = line.trim_end_matches(';').trim();
                push_alternative(&mut alternatives, rest, line_no)?;
                if line.ends_with(';') {
                    flush(&mut grammar, &mut current_lhs, &mut alternatives);
                }
                continue;
            }

            return Err(GrammarError::Syntax {
                detail: format!("unexpected line `{line}`"),
                line: line_no,
            });
        }
        flush(&mut grammar, &mut current_lhs, &mut alternatives);

        if grammar.productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        if options.wrap_listy_start && (grammar.start == "general" || grammar.start == "p") {
            let mut wrapper = "S".to_string();
            while grammar.productions.contains_key(&wrapper) {
                wrapper.push('\'');
            }
            let base = grammar.start.clone();
            grammar.productions.insert(
                wrapper.clone(),
                vec![vec![wrapper.clone(), base.clone()], vec![base]],
            );
            grammar.start = wrapper;
        }

        Ok(grammar)
    }

    /// Whether `symbol` names a non-terminal.
    #[inline]
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.productions.contains_key(symbol)
    }

    /// Whether `symbol` is a declared terminal.
    #[inline]
    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.iter().any(|t| t == symbol)
    }

    /// Replaces literal characters in production bodies by their token
    /// names, using the map derived from the DFA's literal symbols.
    pub fn normalize_literals(&mut self, literal_map: &BTreeMap<char, String>) {
        let nonterminals: BTreeSet<String> = self.productions.keys().cloned().collect();
        for bodies in self.productions.values_mut() {
            for body in bodies.iter_mut() {
                for symbol in body.iter_mut() {
                    if nonterminals.contains(symbol.as_str())
                        || self.terminals.iter().any(|t| t == symbol)
                    {
                        continue;
                    }
                    let mut chars = symbol.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        if let Some(token) = literal_map.get(&c) {
                            *symbol = token.clone();
                        }
                    }
                }
            }
        }
    }

    /// Augments the grammar (`Start' → Start` at index 0), enumerates the
    /// productions and validates every body symbol.
    pub fn augment(&self) -> Result<AugmentedGrammar> {
        if self.productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let mut augmented_start = format!("{}'", self.start);
        while self.productions.contains_key(&augmented_start) {
            augmented_start.push('\'');
        }

        let mut productions = vec![Production {
            index: 0,
            lhs: augmented_start.clone(),
            rhs: vec![self.start.clone()],
        }];
        for (lhs, bodies) in &self.productions {
            for body in bodies {
                for symbol in body {
                    if !self.is_nonterminal(symbol) && !self.is_terminal(symbol) {
                        return Err(GrammarError::UnknownSymbol {
                            symbol: symbol.clone(),
                            lhs: lhs.clone(),
                        });
                    }
                }
                productions.push(Production {
                    index: productions.len() as u32,
                    lhs: lhs.clone(),
                    rhs: body.clone(),
                });
            }
        }

        let mut nonterminals: Vec<String> = self.productions.keys().cloned().collect();
        nonterminals.push(augmented_start.clone());

        let mut by_lhs: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for production in &productions {
            by_lhs
                .entry(production.lhs.clone())
                .or_default()
                .push(production.index);
        }

        Ok(AugmentedGrammar {
            start: augmented_start,
            base_start: self.start.clone(),
            terminals: self.terminals.clone(),
            nonterminals,
            productions,
            by_lhs,
        })
    }
}

fn push_alternative(alternatives: &mut Vec<Vec<String>>, text: &str, line: usize) -> Result<()> {
    let symbols: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if symbols.is_empty() {
        return Ok(());
    }
    if symbols.iter().any(|s| s == EPSILON) {
        if symbols.len() != 1 {
            return Err(GrammarError::Syntax {
                detail: format!("`{EPSILON}` must stand alone in a body"),
                line,
            });
        }
        alternatives.push(Vec::new());
        return Ok(());
    }
    alternatives.push(symbols);
    Ok(())
}

fn flush(
    grammar: &mut Grammar,
    current_lhs: &mut Option<String>,
    alternatives: &mut Vec<Vec<String>>,
) {
    if let Some(lhs) = current_lhs.take() {
        if !alternatives.is_empty() {
            grammar
                .productions
                .entry(lhs)
                .or_default()
                .append(alternatives);
        }
    }
    alternatives.clear();
}

impl AugmentedGrammar {
    /// Whether `symbol` names a non-terminal.
    #[inline]
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.by_lhs.contains_key(symbol)
    }

    /// Whether `symbol` is a declared terminal.
    #[inline]
    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.iter().any(|t| t == symbol)
    }

    /// Production indices with the given left-hand side.
    pub fn productions_of(&self, lhs: &str) -> &[u32] {
        self.by_lhs.get(lhs).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The production at an index.
    #[inline]
    pub fn production(&self, index: u32) -> &Production {
        &self.productions[index as usize]
    }
}

/// Derives the `char → token_name` map from the DFA's accepting-state
/// literal symbols, restricted to the declared terminals. The first
/// occurrence of a token name wins.
pub fn literal_token_map(dfa: &Dfa, declared: &[String]) -> BTreeMap<char, String> {
    let mut map: BTreeMap<char, String> = BTreeMap::new();
    let mut used: BTreeSet<&str> = BTreeSet::new();
    for actions in dfa.actions.values() {
        for action in actions.values() {
            let Some(ch) = action.literal else { continue };
            if !declared.iter().any(|t| t == &action.token) {
                continue;
            }
            if used.insert(action.token.as_str()) {
                map.entry(ch).or_insert_with(|| action.token.clone());
            }
        }
    }
    map
}
