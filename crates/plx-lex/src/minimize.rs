//! DFA minimisation.
//!
//! Partition refinement with one hard requirement on the initial
//! partition: accepting states are grouped by their token-action mapping,
//! not lumped together. Two states that accept different tokens are never
//! equivalent, no matter how their transitions line up.
//!
//! Surviving blocks are ordered by their smallest member, which makes the
//! pass idempotent and keeps the block holding the old initial state in
//! front.

use crate::dfa::{state_name, Dfa, StateId};
use crate::normalize::MarkerAction;
use crate::tree::PositionSet;
use std::collections::{BTreeMap, BTreeSet};

/// Minimises the automaton, preserving token identity.
pub fn minimize(dfa: &Dfa) -> Dfa {
    let all_states: BTreeSet<StateId> = (0..dfa.state_count() as StateId).collect();

    // Initial partition: one block per distinct token-action mapping,
    // plus the non-accepting block.
    let mut accepting_blocks: BTreeMap<Vec<(u32, MarkerAction)>, BTreeSet<StateId>> =
        BTreeMap::new();
    for &state in &dfa.accepting {
        let key: Vec<(u32, MarkerAction)> = dfa
            .actions
            .get(&state)
            .map(|m| m.iter().map(|(k, v)| (*k, v.clone())).collect())
            .unwrap_or_default();
        accepting_blocks.entry(key).or_default().insert(state);
    }
    let non_accepting: BTreeSet<StateId> = all_states
        .iter()
        .filter(|s| !dfa.accepting.contains(s))
        .copied()
        .collect();

    let mut partition: Vec<BTreeSet<StateId>> = accepting_blocks.into_values().collect();
    if !non_accepting.is_empty() {
        partition.push(non_accepting);
    }
    let mut worklist: Vec<BTreeSet<StateId>> = partition.clone();

    // Every byte that labels a transition anywhere.
    let alphabet: BTreeSet<u8> = dfa
        .transitions
        .values()
        .flat_map(|row| row.keys().copied())
        .collect();

    // Refinement: split any block that a splitter separates.
    while let Some(splitter) = worklist.pop() {
        for &byte in &alphabet {
            let predecessors: BTreeSet<StateId> = all_states
                .iter()
                .filter(|&&s| matches!(dfa.step(s, byte), Some(t) if splitter.contains(&t)))
                .copied()
                .collect();
            if predecessors.is_empty() {
                continue;
            }

            let mut next_partition = Vec::with_capacity(partition.len());
            for block in partition.drain(..) {
                let inside: BTreeSet<StateId> =
                    block.intersection(&predecessors).copied().collect();
                let outside: BTreeSet<StateId> = block.difference(&predecessors).copied().collect();
                if inside.is_empty() || outside.is_empty() {
                    next_partition.push(block);
                    continue;
                }
                if let Some(at) = worklist.iter().position(|w| *w == block) {
                    worklist.remove(at);
                    worklist.push(inside.clone());
                    worklist.push(outside.clone());
                } else if inside.len() <= outside.len() {
                    worklist.push(inside.clone());
                } else {
                    worklist.push(outside.clone());
                }
                next_partition.push(inside);
                next_partition.push(outside);
            }
            partition = next_partition;
        }
    }

    // Deterministic renaming: blocks ordered by smallest member. The block
    // holding old state 0 therefore becomes the new initial state.
    partition.sort_by_key(|block| block.iter().next().copied().unwrap_or(StateId::MAX));

    let mut rename: BTreeMap<StateId, StateId> = BTreeMap::new();
    for (new_id, block) in partition.iter().enumerate() {
        for &old in block {
            rename.insert(old, new_id as StateId);
        }
    }

    let mut states: Vec<PositionSet> = Vec::with_capacity(partition.len());
    let mut accepting = BTreeSet::new();
    let mut actions: BTreeMap<StateId, BTreeMap<u32, MarkerAction>> = BTreeMap::new();
    let mut provenance: BTreeMap<StateId, BTreeMap<String, BTreeMap<u32, MarkerAction>>> =
        BTreeMap::new();

    for (new_id, block) in partition.iter().enumerate() {
        let new_id = new_id as StateId;
        let mut positions = PositionSet::new();
        let mut merged: BTreeMap<u32, MarkerAction> = BTreeMap::new();
        let mut orig: BTreeMap<String, BTreeMap<u32, MarkerAction>> = BTreeMap::new();
        for &old in block {
            positions.extend(dfa.states[old as usize].iter().copied());
            if let Some(map) = dfa.actions.get(&old) {
                merged.extend(map.iter().map(|(k, v)| (*k, v.clone())));
                orig.insert(state_name(old), map.clone());
            }
            if dfa.accepting.contains(&old) {
                accepting.insert(new_id);
            }
        }
        states.push(positions);
        if !merged.is_empty() {
            actions.insert(new_id, merged);
            provenance.insert(new_id, orig);
        }
    }

    let mut transitions: BTreeMap<StateId, BTreeMap<u8, StateId>> = BTreeMap::new();
    for (from, row) in &dfa.transitions {
        for (byte, to) in row {
            if let (Some(&new_from), Some(&new_to)) = (rename.get(from), rename.get(to)) {
                transitions.entry(new_from).or_default().insert(*byte, new_to);
            }
        }
    }

    Dfa {
        states,
        initial: rename.get(&dfa.initial).copied().unwrap_or(0),
        accepting,
        transitions,
        actions,
        provenance,
    }
}
