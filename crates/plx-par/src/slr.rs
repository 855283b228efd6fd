//! SLR(1) table construction.
//!
//! Fills ACTION and GOTO from the canonical LR(0) collection and the
//! FOLLOW sets. A disagreeing second write to a cell is recorded as a
//! conflict and wins, so one run surfaces every conflict in the grammar.

use crate::first_follow::FirstFollow;
use crate::grammar::AugmentedGrammar;
use crate::lr0::Collection;
use crate::END_MARKER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One ACTION cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Shift and move to a state.
    Shift(u32),
    /// Reduce by a production index.
    Reduce(u32),
    /// Accept the input.
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{state}"),
            Action::Reduce(production) => write!(f, "r{production}"),
            Action::Accept => write!(f, "acc"),
        }
    }
}

/// A disagreement between two writes to the same ACTION cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub state: u32,
    pub terminal: String,
    /// What the cell held.
    pub existing: Action,
    /// What won.
    pub replacement: Action,
}

impl Conflict {
    /// `shift/reduce` or `reduce/reduce`.
    pub fn kind(&self) -> &'static str {
        match (&self.existing, &self.replacement) {
            (Action::Reduce(_), Action::Reduce(_)) => "reduce/reduce",
            _ => "shift/reduce",
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conflict in state {} on `{}`: {} vs {}",
            self.kind(),
            self.state,
            self.terminal,
            self.existing,
            self.replacement
        )
    }
}

/// The SLR(1) parse tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlrTable {
    /// `ACTION[state][terminal]`; missing cells are errors.
    pub action: BTreeMap<u32, BTreeMap<String, Action>>,
    /// `GOTO[state][non_terminal]`.
    pub goto: BTreeMap<u32, BTreeMap<String, u32>>,
    /// Every disagreeing cell write, in fill order.
    pub conflicts: Vec<Conflict>,
}

impl SlrTable {
    /// The ACTION entry for `(state, terminal)`, if any.
    #[inline]
    pub fn action_of(&self, state: u32, terminal: &str) -> Option<Action> {
        self.action.get(&state)?.get(terminal).copied()
    }

    /// The GOTO entry for `(state, non_terminal)`, if any.
    #[inline]
    pub fn goto_of(&self, state: u32, nonterminal: &str) -> Option<u32> {
        self.goto.get(&state)?.get(nonterminal).copied()
    }
}

/// Builds the tables.
///
/// For each state and item: a terminal after the dot with a goto edge
/// writes a shift; a complete item writes reduces over FOLLOW(lhs), or
/// the accept for production 0 on `$`. GOTO copies the non-terminal
/// edges.
pub fn build_table(
    grammar: &AugmentedGrammar,
    collection: &Collection,
    sets: &FirstFollow,
) -> SlrTable {
    let mut table = SlrTable::default();

    for (id, items) in collection.states.iter().enumerate() {
        let id = id as u32;
        for item in items {
            if let Some(symbol) = item.next_symbol(grammar) {
                if grammar.is_terminal(symbol) {
                    if let Some(&target) =
                        collection.transitions.get(&(id, symbol.to_string()))
                    {
                        write_action(&mut table, id, symbol, Action::Shift(target));
                    }
                }
                continue;
            }

            // complete item
            if item.prod == 0 {
                write_action(&mut table, id, END_MARKER, Action::Accept);
                continue;
            }
            let lhs = &grammar.production(item.prod).lhs;
            if let Some(follow) = sets.follow.get(lhs) {
                for terminal in follow {
                    write_action(&mut table, id, terminal, Action::Reduce(item.prod));
                }
            }
        }

        for nonterminal in &grammar.nonterminals {
            if let Some(&target) = collection.transitions.get(&(id, nonterminal.clone())) {
                table
                    .goto
                    .entry(id)
                    .or_default()
                    .insert(nonterminal.clone(), target);
            }
        }
    }

    table
}

/// Writes a cell; a disagreeing overwrite is recorded and wins.
fn write_action(table: &mut SlrTable, state: u32, terminal: &str, action: Action) {
    let existing = table
        .action
        .get(&state)
        .and_then(|row| row.get(terminal))
        .copied();
    match existing {
        Some(current) if current != action => {
            table.conflicts.push(Conflict {
                state,
                terminal: terminal.to_string(),
                existing: current,
                replacement: action,
            });
            table
                .action
                .entry(state)
                .or_default()
                .insert(terminal.to_string(), action);
        }
        Some(_) => {}
        None => {
            table
                .action
                .entry(state)
                .or_default()
                .insert(terminal.to_string(), action);
        }
    }
}
