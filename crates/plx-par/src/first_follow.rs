//! FIRST and FOLLOW sets.
//!
//! Both are least fixed points over the grammar. FIRST walks each body's
//! prefix, carrying λ through nullable symbols; FOLLOW uses the trailer
//! formulation: per production, a trailer set initialised to FOLLOW(lhs)
//! sweeps the body right to left.

use crate::grammar::AugmentedGrammar;
use crate::{END_MARKER, EPSILON};
use std::collections::{BTreeMap, BTreeSet};

/// The two set families, keyed by non-terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirstFollow {
    /// FIRST(A): terminals (and possibly λ) that can begin a derivation
    /// of A.
    pub first: BTreeMap<String, BTreeSet<String>>,
    /// FOLLOW(A): terminals (and possibly `$`) that can appear right
    /// after A.
    pub follow: BTreeMap<String, BTreeSet<String>>,
}

impl FirstFollow {
    /// Computes both families for an augmented grammar.
    pub fn compute(grammar: &AugmentedGrammar) -> FirstFollow {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        FirstFollow { first, follow }
    }

    /// FIRST of a single symbol: `{symbol}` for a terminal, the computed
    /// set for a non-terminal.
    pub fn first_of<'a>(&'a self, symbol: &'a str) -> BTreeSet<String> {
        match self.first.get(symbol) {
            Some(set) => set.clone(),
            None => [symbol.to_string()].into_iter().collect(),
        }
    }
}

/// FIRST as a least fixed point over the productions.
fn compute_first(grammar: &AugmentedGrammar) -> BTreeMap<String, BTreeSet<String>> {
    let mut first: BTreeMap<String, BTreeSet<String>> = grammar
        .nonterminals
        .iter()
        .map(|nt| (nt.clone(), BTreeSet::new()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            let lhs = &production.lhs;

            // the empty body derives λ
            if production.rhs.is_empty() {
                if first.get_mut(lhs).is_some_and(|s| s.insert(EPSILON.to_string())) {
                    changed = true;
                }
                continue;
            }

            let mut all_nullable = true;
            for symbol in &production.rhs {
                if !grammar.is_nonterminal(symbol) {
                    // terminal: contributes itself, stops the walk
                    if first.get_mut(lhs).is_some_and(|s| s.insert(symbol.clone())) {
                        changed = true;
                    }
                    all_nullable = false;
                    break;
                }
                let symbol_first: Vec<String> = first[symbol]
                    .iter()
                    .filter(|t| *t != EPSILON)
                    .cloned()
                    .collect();
                let nullable = first[symbol].contains(EPSILON);
                if let Some(target) = first.get_mut(lhs) {
                    for t in symbol_first {
                        if target.insert(t) {
                            changed = true;
                        }
                    }
                }
                if !nullable {
                    all_nullable = false;
                    break;
                }
            }

            if all_nullable && first.get_mut(lhs).is_some_and(|s| s.insert(EPSILON.to_string()))
            {
                changed = true;
            }
        }
    }
    first
}

/// FOLLOW with the trailer formulation, iterated to a fixpoint.
///
/// `FOLLOW(Start) ⊇ {$}`. For each production `A → α`, the trailer starts
/// as FOLLOW(A) and sweeps α right to left: a non-terminal X absorbs the
/// trailer, then the trailer becomes FIRST(X)\{λ}, keeping the old
/// trailer too when X is nullable; a terminal resets the trailer to
/// itself.
fn compute_follow(
    grammar: &AugmentedGrammar,
    first: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut follow: BTreeMap<String, BTreeSet<String>> = grammar
        .nonterminals
        .iter()
        .map(|nt| (nt.clone(), BTreeSet::new()))
        .collect();
    follow
        .entry(grammar.base_start.clone())
        .or_default()
        .insert(END_MARKER.to_string());

    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            let mut trailer: BTreeSet<String> =
                follow.get(&production.lhs).cloned().unwrap_or_default();

            for symbol in production.rhs.iter().rev() {
                if !grammar.is_nonterminal(symbol) {
                    trailer = [symbol.clone()].into_iter().collect();
                    continue;
                }

                if let Some(target) = follow.get_mut(symbol) {
                    for t in &trailer {
                        if target.insert(t.clone()) {
                            changed = true;
                        }
                    }
                }

                let symbol_first = &first[symbol];
                let without_epsilon: BTreeSet<String> = symbol_first
                    .iter()
                    .filter(|t| *t != EPSILON)
                    .cloned()
                    .collect();
                if symbol_first.contains(EPSILON) {
                    trailer.extend(without_epsilon);
                } else {
                    trailer = without_epsilon;
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    /// The classroom grammar:
    /// E → T E'; E' → + T E' | λ; T → F T'; T' → * F T' | λ;
    /// F → ( E ) | id
    fn classroom() -> AugmentedGrammar {
        Grammar::parse(
            "%token + * ( ) id\n\
             E : T E' ;\n\
             E' : + T E' | λ ;\n\
             T : F T' ;\n\
             T' : * F T' | λ ;\n\
             F : ( E ) | id ;\n",
        )
        .unwrap()
        .augment()
        .unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_sets_classroom() {
        let ff = FirstFollow::compute(&classroom());
        assert_eq!(ff.first["E"], set(&["(", "id"]));
        assert_eq!(ff.first["T"], set(&["(", "id"]));
        assert_eq!(ff.first["F"], set(&["(", "id"]));
        assert_eq!(ff.first["E'"], set(&["+", "λ"]));
        assert_eq!(ff.first["T'"], set(&["*", "λ"]));
    }

    #[test]
    fn test_follow_sets_classroom() {
        let ff = FirstFollow::compute(&classroom());
        assert_eq!(ff.follow["E"], set(&["$", ")"]));
        assert_eq!(ff.follow["E'"], set(&["$", ")"]));
        assert_eq!(ff.follow["T"], set(&["$", ")", "+"]));
        assert_eq!(ff.follow["T'"], set(&["$", ")", "+"]));
        assert_eq!(ff.follow["F"], set(&["$", ")", "+", "*"]));
    }

    #[test]
    fn test_empty_body_contributes_epsilon() {
        let grammar = Grammar::parse("%token x\nA : x | λ ;\n")
            .unwrap()
            .augment()
            .unwrap();
        let ff = FirstFollow::compute(&grammar);
        assert!(ff.first["A"].contains("λ"));
        assert!(ff.first["A"].contains("x"));
    }

    #[test]
    fn test_nullable_propagates_follow_left() {
        // B precedes a nullable A: FOLLOW(lhs) flows into FOLLOW(B).
        let grammar = Grammar::parse(
            "%token x y\n\
             S : B A y ;\n\
             A : λ | x ;\n\
             B : x ;\n",
        )
        .unwrap()
        .augment()
        .unwrap();
        let ff = FirstFollow::compute(&grammar);
        // A nullable: FOLLOW(B) picks up FIRST(A)\{λ} and what follows A.
        assert_eq!(ff.follow["B"], set(&["x", "y"]));
        assert_eq!(ff.follow["A"], set(&["y"]));
    }

    #[test]
    fn test_trailing_nullable_inherits_lhs_follow() {
        let grammar = Grammar::parse(
            "%token x z\n\
             S : x A z ;\n\
             R : S A ;\n\
             A : λ | x ;\n",
        )
        .unwrap()
        .augment()
        .unwrap();
        let ff = FirstFollow::compute(&grammar);
        // In R → S A, the trailing A inherits FOLLOW(R); S also sees
        // through the nullable A.
        assert!(ff.follow["A"].contains("z"));
        for t in &ff.follow["R"] {
            assert!(ff.follow["A"].contains(t));
            assert!(ff.follow["S"].contains(t));
        }
    }

    #[test]
    fn test_first_of_terminal_is_itself() {
        let ff = FirstFollow::compute(&classroom());
        assert_eq!(ff.first_of("id"), set(&["id"]));
    }
}
