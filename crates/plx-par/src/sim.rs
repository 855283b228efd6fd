//! Shift-reduce simulator.
//!
//! An LR stack machine over the generated tables. The stack alternates
//! state ids and grammar symbols (modelled as frames); the lookahead
//! comes through a skip filter for whitespace-class tokens; end of input
//! is `$`.
//!
//! The machine has four phases: Running, Recovering, Accepted, Failed.
//! On an empty ACTION cell it enters panic-mode recovery: discard
//! lookaheads until one is in the synchronisation set, then pop frames
//! until some state can consume it with a non-reduce action. The sync
//! set is the base `{SEMICOLON, ID, LPAREN, $}`; [`SimOptions`] can opt
//! into extending it with the FOLLOW sets of every non-terminal
//! currently on the stack, which resynchronises earlier but discards a
//! different amount of input than the base behaviour.
//!
//! A bounded consecutive-reduction counter per lookahead guards against
//! ε-reduce loops: every iteration either shifts or runs the counter
//! down.

use crate::first_follow::FirstFollow;
use crate::grammar::AugmentedGrammar;
use crate::slr::{Action, SlrTable};
use crate::END_MARKER;
use plx_lex::Scanned;
use std::collections::BTreeSet;

/// Token names filtered out of the lookahead stream, compared
/// case-insensitively.
const SKIP_NAMES: &[&str] = &["whitespace", "ws", "tab", "enter"];

/// Base synchronisation set for panic-mode recovery.
const BASE_SYNC: &[&str] = &["SEMICOLON", "ID", "LPAREN", END_MARKER];

/// Reductions allowed on one lookahead before the run is declared stuck.
const MAX_REDUCTIONS_PER_LOOKAHEAD: u32 = 10_000;

/// Simulator options.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimOptions {
    /// Extend the panic-mode sync set with the FOLLOW sets of the
    /// non-terminals on the stack. Off by default: the base set alone
    /// skips to the next statement boundary, while the extension can
    /// resynchronise on the offending token itself.
    pub follow_sync: bool,
}

/// One record of the user-visible trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceStep {
    Shift {
        state: u32,
        terminal: String,
        next: u32,
    },
    Reduce {
        state: u32,
        production: u32,
        display: String,
    },
    Accept {
        state: u32,
    },
    Error {
        state: u32,
        terminal: String,
        message: String,
    },
    Discard {
        terminal: String,
    },
    Resync {
        state: u32,
        terminal: String,
    },
    Fatal {
        state: u32,
        terminal: String,
        message: String,
    },
}

impl TraceStep {
    /// One-line rendering for the trace dump.
    pub fn display(&self) -> String {
        match self {
            TraceStep::Shift {
                state,
                terminal,
                next,
            } => format!("shift   state {state} on `{terminal}` → {next}"),
            TraceStep::Reduce {
                state, display, ..
            } => format!("reduce  state {state} by {display}"),
            TraceStep::Accept { state } => format!("accept  state {state}"),
            TraceStep::Error {
                state,
                terminal,
                message,
            } => format!("error   state {state} on `{terminal}`: {message}"),
            TraceStep::Discard { terminal } => format!("discard `{terminal}`"),
            TraceStep::Resync { state, terminal } => {
                format!("resync  state {state} on `{terminal}`")
            }
            TraceStep::Fatal {
                state,
                terminal,
                message,
            } => format!("fatal   state {state} on `{terminal}`: {message}"),
        }
    }
}

/// The machine's phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    Recovering,
    Accepted,
    Failed,
}

/// Outcome of one simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseReport {
    /// The final verdict.
    pub accepted: bool,
    /// Every action the machine took.
    pub trace: Vec<TraceStep>,
    /// Description of the failure, when not accepted.
    pub error: Option<String>,
}

/// One stack frame: a state and the symbol that led into it. The bottom
/// frame carries no symbol.
#[derive(Clone, Debug)]
struct Frame {
    state: u32,
    symbol: Option<String>,
}

/// Adapts scanner output to the `(terminal, lexeme)` pairs the simulator
/// consumes. Lexical error tokens flow through as the `ERROR` terminal
/// and trip ordinary recovery.
pub fn terminal_stream(
    scanned: impl Iterator<Item = Scanned>,
) -> impl Iterator<Item = (String, String)> {
    scanned.map(|s| (s.class.terminal().to_string(), s.lexeme))
}

/// Runs the LR stack machine over a token stream with default options.
pub fn simulate(
    table: &SlrTable,
    grammar: &AugmentedGrammar,
    sets: &FirstFollow,
    tokens: impl IntoIterator<Item = (String, String)>,
) -> ParseReport {
    simulate_with(table, grammar, sets, tokens, SimOptions::default())
}

/// Runs the LR stack machine over a token stream.
pub fn simulate_with(
    table: &SlrTable,
    grammar: &AugmentedGrammar,
    sets: &FirstFollow,
    tokens: impl IntoIterator<Item = (String, String)>,
    options: SimOptions,
) -> ParseReport {
    let mut tokens = tokens.into_iter().filter(|(name, _)| !is_skipped(name));
    let mut next_token = move || -> (String, String) {
        tokens
            .next()
            .unwrap_or_else(|| (END_MARKER.to_string(), String::new()))
    };

    let mut stack = vec![Frame {
        state: 0,
        symbol: None,
    }];
    let mut trace: Vec<TraceStep> = Vec::new();
    let mut error: Option<String> = None;
    let mut phase = Phase::Running;
    let (mut lookahead, mut _lexeme) = next_token();
    let mut reductions: u32 = 0;

    loop {
        match phase {
            Phase::Running => {
                let state = top_state(&stack);
                match table.action_of(state, &lookahead) {
                    Some(Action::Shift(next)) => {
                        trace.push(TraceStep::Shift {
                            state,
                            terminal: lookahead.clone(),
                            next,
                        });
                        stack.push(Frame {
                            state: next,
                            symbol: Some(lookahead.clone()),
                        });
                        let token = next_token();
                        lookahead = token.0;
                        _lexeme = token.1;
                        reductions = 0;
                    }
                    Some(Action::Reduce(index)) => {
                        reductions += 1;
                        if reductions > MAX_REDUCTIONS_PER_LOOKAHEAD {
                            let message =
                                "reduction loop without consuming input".to_string();
                            trace.push(TraceStep::Fatal {
                                state,
                                terminal: lookahead.clone(),
                                message: message.clone(),
                            });
                            error = Some(message);
                            phase = Phase::Failed;
                            continue;
                        }

                        let production = grammar.production(index);
                        for _ in 0..production.rhs.len() {
                            stack.pop();
                        }
                        let uncovered = top_state(&stack);
                        match table.goto_of(uncovered, &production.lhs) {
                            Some(target) => {
                                trace.push(TraceStep::Reduce {
                                    state,
                                    production: index,
                                    display: production.display(),
                                });
                                stack.push(Frame {
                                    state: target,
                                    symbol: Some(production.lhs.clone()),
                                });
                            }
                            None => {
                                let message = format!(
                                    "no goto from state {uncovered} on `{}`",
                                    production.lhs
                                );
                                trace.push(TraceStep::Fatal {
                                    state,
                                    terminal: lookahead.clone(),
                                    message: message.clone(),
                                });
                                error = Some(message);
                                phase = Phase::Failed;
                            }
                        }
                    }
                    Some(Action::Accept) => {
                        trace.push(TraceStep::Accept { state });
                        phase = Phase::Accepted;
                    }
                    None => {
                        let message = format!(
                            "no action in state {state} on `{lookahead}`"
                        );
                        trace.push(TraceStep::Error {
                            state,
                            terminal: lookahead.clone(),
                            message: message.clone(),
                        });
                        error.get_or_insert(message);
                        phase = Phase::Recovering;
                    }
                }
            }

            Phase::Recovering => {
                let sync = sync_set(&stack, grammar, sets, options.follow_sync);

                while !sync.contains(lookahead.as_str()) {
                    let token = next_token();
                    trace.push(TraceStep::Discard {
                        terminal: lookahead.clone(),
                    });
                    lookahead = token.0;
                    _lexeme = token.1;
                }

                // pop frames until some state consumes the lookahead with
                // a non-reduce action
                let recovery = stack.iter().rposition(|frame| {
                    matches!(
                        table.action_of(frame.state, &lookahead),
                        Some(Action::Shift(_)) | Some(Action::Accept)
                    )
                });
                match recovery {
                    Some(at) => {
                        stack.truncate(at + 1);
                        trace.push(TraceStep::Resync {
                            state: top_state(&stack),
                            terminal: lookahead.clone(),
                        });
                        reductions = 0;
                        phase = Phase::Running;
                    }
                    None => {
                        let state = top_state(&stack);
                        let message = format!(
                            "no recovery state consumes `{lookahead}`"
                        );
                        trace.push(TraceStep::Fatal {
                            state,
                            terminal: lookahead.clone(),
                            message: message.clone(),
                        });
                        error.get_or_insert(message);
                        phase = Phase::Failed;
                    }
                }
            }

            Phase::Accepted => {
                return ParseReport {
                    accepted: true,
                    trace,
                    error: None,
                };
            }

            Phase::Failed => {
                return ParseReport {
                    accepted: false,
                    trace,
                    error,
                };
            }
        }
    }
}

fn is_skipped(name: &str) -> bool {
    SKIP_NAMES.iter().any(|skip| name.eq_ignore_ascii_case(skip))
}

#[inline]
fn top_state(stack: &[Frame]) -> u32 {
    stack.last().map(|f| f.state).unwrap_or(0)
}

/// The synchronisation set: the hard base, plus (opt-in) the FOLLOW
/// sets of every non-terminal on the stack.
fn sync_set<'a>(
    stack: &'a [Frame],
    grammar: &AugmentedGrammar,
    sets: &'a FirstFollow,
    follow_sync: bool,
) -> BTreeSet<&'a str> {
    let mut sync: BTreeSet<&str> = BASE_SYNC.iter().copied().collect();
    if !follow_sync {
        return sync;
    }
    for frame in stack {
        if let Some(symbol) = &frame.symbol {
            if grammar.is_nonterminal(symbol) {
                if let Some(follow) = sets.follow.get(symbol.as_str()) {
                    sync.extend(follow.iter().map(String::as_str));
                }
            }
        }
    }
    sync
}
