//! LR items, item sets and the automaton graph.
//!
//! An item is a production with a marked position, plus a lookahead
//! terminal in the canonical-LR(1) construction. A state is the closure of
//! a set of items; states are identified by their closed content, so
//! building the same grammar twice yields the same states. State numbering
//! follows discovery order, with goto exploration walking symbols in
//! canonical order, which makes the numbering itself reproducible.

use crate::errors::GrammarError;
use crate::grammar::sets::FirstSets;
use crate::grammar::{Grammar, RuleId, SymId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Which table construction to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableKind {
    /// LR(0) item sets with follow-set reduce actions.
    #[default]
    Slr,
    /// Canonical LR(1): lookaheads carried per item.
    Lr1,
}

/// A production with a marked position and an optional lookahead.
///
/// The lookahead is `None` in the LR(0)/SLR construction and always
/// `Some` terminal in the canonical LR(1) construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Item {
    pub rule: RuleId,
    pub pos: usize,
    pub lookahead: Option<SymId>,
}

impl Item {
    pub fn start(rule: RuleId, lookahead: Option<SymId>) -> Self {
        Item {
            rule,
            pos: 0,
            lookahead,
        }
    }

    /// The symbol after the marker, or `None` for a completed item.
    pub fn next_sym(&self, grammar: &Grammar) -> Option<SymId> {
        grammar.rule(self.rule).rhs.get(self.pos).copied()
    }

    pub fn advanced(&self) -> Item {
        Item {
            rule: self.rule,
            pos: self.pos + 1,
            lookahead: self.lookahead,
        }
    }
}

/// One automaton state: a closed set of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSet {
    pub id: usize,
    pub items: BTreeSet<Item>,
}

/// The full automaton: states plus goto transitions per symbol.
#[derive(Debug, Clone, Serialize)]
pub struct ItemGraph {
    pub kind: TableKind,
    pub sets: Vec<ItemSet>,
    /// Per state, the successor state for each transition symbol.
    pub transitions: Vec<BTreeMap<SymId, usize>>,
}

impl ItemGraph {
    /// Build the automaton for an augmented grammar.
    pub fn build(
        grammar: &Grammar,
        first: &FirstSets,
        kind: TableKind,
    ) -> Result<ItemGraph, GrammarError> {
        let (_, start_rule) = grammar
            .augmented_rule()
            .ok_or(GrammarError::MissingStartSymbol)?;
        let start_lookahead = match kind {
            TableKind::Slr => None,
            TableKind::Lr1 => Some(grammar.eof()),
        };
        let start_set = close(
            grammar,
            first,
            kind,
            [Item::start(start_rule, start_lookahead)].into_iter().collect(),
        );

        // Canonical rank for deterministic goto exploration order.
        let rank: HashMap<SymId, usize> = grammar
            .sorted_symbols()
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s, i))
            .collect();

        let mut sets: Vec<ItemSet> = Vec::new();
        let mut transitions: Vec<BTreeMap<SymId, usize>> = Vec::new();
        let mut interned: HashMap<BTreeSet<Item>, usize> = HashMap::new();
        let mut work = VecDeque::new();

        interned.insert(start_set.clone(), 0);
        sets.push(ItemSet {
            id: 0,
            items: start_set,
        });
        transitions.push(BTreeMap::new());
        work.push_back(0);

        while let Some(state) = work.pop_front() {
            let mut by_symbol: BTreeMap<SymId, BTreeSet<Item>> = BTreeMap::new();
            for item in &sets[state].items {
                if let Some(sym) = item.next_sym(grammar) {
                    by_symbol.entry(sym).or_default().insert(item.advanced());
                }
            }
            let mut symbols: Vec<SymId> = by_symbol.keys().copied().collect();
            symbols.sort_by_key(|s| rank[s]);
            for sym in symbols {
                let kernel = by_symbol.remove(&sym).unwrap_or_default();
                let closed = close(grammar, first, kind, kernel);
                let target = match interned.get(&closed) {
                    Some(&id) => id,
                    None => {
                        let id = sets.len();
                        interned.insert(closed.clone(), id);
                        sets.push(ItemSet { id, items: closed });
                        transitions.push(BTreeMap::new());
                        work.push_back(id);
                        id
                    }
                };
                transitions[state].insert(sym, target);
            }
        }

        Ok(ItemGraph {
            kind,
            sets,
            transitions,
        })
    }

    pub fn state_count(&self) -> usize {
        self.sets.len()
    }
}

/// Close an item set under non-terminal expansion.
fn close(
    grammar: &Grammar,
    first: &FirstSets,
    kind: TableKind,
    kernel: BTreeSet<Item>,
) -> BTreeSet<Item> {
    let mut closed = kernel;
    let mut work: VecDeque<Item> = closed.iter().copied().collect();
    while let Some(item) = work.pop_front() {
        let Some(sym) = item.next_sym(grammar) else {
            continue;
        };
        if grammar.sym(sym).terminal {
            continue;
        }
        match kind {
            TableKind::Slr => {
                for &rule in grammar.rules_for(sym) {
                    let new = Item::start(rule, None);
                    if closed.insert(new) {
                        work.push_back(new);
                    }
                }
            }
            TableKind::Lr1 => {
                let rule = grammar.rule(item.rule);
                let beta = &rule.rhs[item.pos + 1..];
                let tail: BTreeSet<SymId> = item.lookahead.into_iter().collect();
                let lookaheads = first.of_seq(beta, &tail);
                for &rule in grammar.rules_for(sym) {
                    for &la in &lookaheads {
                        let new = Item::start(rule, Some(la));
                        if closed.insert(new) {
                            work.push_back(new);
                        }
                    }
                }
            }
        }
    }
    closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::sets::FirstSets;
    use crate::testing::expr_grammar;

    #[test]
    fn test_start_state_closes_over_start_symbol() {
        let g = expr_grammar();
        let first = FirstSets::compute(&g);
        let graph = ItemGraph::build(&g, &first, TableKind::Slr).unwrap();
        // $accept -> .expr plus every expr and term production at pos 0.
        assert_eq!(graph.sets[0].items.len(), 4);
        assert!(graph.sets[0]
            .items
            .iter()
            .all(|item| item.pos == 0 && item.lookahead.is_none()));
    }

    #[test]
    fn test_slr_automaton_shape_for_expr_grammar() {
        let g = expr_grammar();
        let first = FirstSets::compute(&g);
        let graph = ItemGraph::build(&g, &first, TableKind::Slr).unwrap();
        // The classic automaton for this grammar has 6 states.
        assert_eq!(graph.state_count(), 6);
        let num = g.by_name("NUMBER").unwrap().id;
        let e = g.by_name("expr").unwrap().id;
        // State 0 shifts NUMBER and gotos on expr.
        assert!(graph.transitions[0].contains_key(&num));
        assert!(graph.transitions[0].contains_key(&e));
    }

    #[test]
    fn test_build_is_deterministic() {
        let build = || {
            let g = expr_grammar();
            let first = FirstSets::compute(&g);
            ItemGraph::build(&g, &first, TableKind::Lr1).unwrap()
        };
        let a = build();
        let b = build();
        assert_eq!(a.sets, b.sets);
        assert_eq!(a.transitions, b.transitions);
    }

    #[test]
    fn test_lr1_items_carry_lookaheads() {
        let g = expr_grammar();
        let first = FirstSets::compute(&g);
        let graph = ItemGraph::build(&g, &first, TableKind::Lr1).unwrap();
        assert!(graph
            .sets
            .iter()
            .flat_map(|s| s.items.iter())
            .all(|item| item.lookahead.is_some()));
        // term -> .NUMBER appears with both '+' and $end lookaheads.
        let t = g.by_name("term").unwrap().id;
        let term_rule = g.rules_for(t)[0];
        let lookaheads: BTreeSet<Option<SymId>> = graph.sets[0]
            .items
            .iter()
            .filter(|i| i.rule == term_rule)
            .map(|i| i.lookahead)
            .collect();
        let plus = g.by_name("'+'").unwrap().id;
        assert_eq!(
            lookaheads,
            [Some(g.eof()), Some(plus)].into_iter().collect()
        );
    }
}
