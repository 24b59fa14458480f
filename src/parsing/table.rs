//! The action/goto table and its conflict policy.
//!
//! Cells are filled from the automaton graph: transitions become shift
//! (terminal) or goto (non-terminal) actions, completed items become
//! reduce actions on their lookahead terminals — the production's FOLLOW
//! set in the SLR construction, the item's own lookahead in canonical
//! LR(1) — and the completed augmented production becomes accept on end of
//! input.
//!
//! When two actions land in one cell, exactly one survives: shift beats
//! reduce, accept beats reduce, and of two reduces the earliest-declared
//! production wins. Every resolution is recorded as a [`Conflict`] so a
//! grammar author can see the ambiguity instead of silently shipping it.

use crate::errors::GrammarError;
use crate::grammar::sets::{FirstSets, FollowSets};
use crate::grammar::{Grammar, RuleId, SymId};
use crate::parsing::items::{ItemGraph, TableKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// One resolved table action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Shift(usize),
    Goto(usize),
    Reduce(RuleId),
    Accept,
}

/// A cell where two actions competed, with the resolution that was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub state: usize,
    pub sym: SymId,
    pub kept: Action,
    pub dropped: Action,
}

/// The compiled, deterministic parse table.
///
/// Immutable after construction; safe to share read-only across parses.
#[derive(Debug, Clone, Serialize)]
pub struct ParseTable {
    pub kind: TableKind,
    /// Per state, the action for each symbol. At most one action per cell.
    pub states: Vec<BTreeMap<SymId, Action>>,
    /// Every conflict that resolution suppressed, in discovery order.
    pub conflicts: Vec<Conflict>,
}

impl ParseTable {
    /// Fill the table from an automaton graph.
    pub fn build(
        grammar: &Grammar,
        graph: &ItemGraph,
        first: &FirstSets,
    ) -> Result<ParseTable, GrammarError> {
        let (_, accept_rule) = grammar
            .augmented_rule()
            .ok_or(GrammarError::MissingStartSymbol)?;
        let follow = match graph.kind {
            TableKind::Slr => Some(FollowSets::compute(grammar, first)),
            TableKind::Lr1 => None,
        };
        let mut states: Vec<BTreeMap<SymId, Action>> = vec![BTreeMap::new(); graph.state_count()];
        let mut conflicts = Vec::new();

        for (state, set) in graph.sets.iter().enumerate() {
            for (&sym, &target) in &graph.transitions[state] {
                let action = if grammar.sym(sym).terminal {
                    Action::Shift(target)
                } else {
                    Action::Goto(target)
                };
                insert(&mut states[state], state, sym, action, &mut conflicts);
            }
            for item in &set.items {
                if item.next_sym(grammar).is_some() {
                    continue;
                }
                if item.rule == accept_rule {
                    insert(
                        &mut states[state],
                        state,
                        grammar.eof(),
                        Action::Accept,
                        &mut conflicts,
                    );
                    continue;
                }
                match (&follow, item.lookahead) {
                    (Some(follow), _) => {
                        for &la in follow.of(grammar.rule(item.rule).lhs) {
                            insert(
                                &mut states[state],
                                state,
                                la,
                                Action::Reduce(item.rule),
                                &mut conflicts,
                            );
                        }
                    }
                    (None, Some(la)) => {
                        insert(
                            &mut states[state],
                            state,
                            la,
                            Action::Reduce(item.rule),
                            &mut conflicts,
                        );
                    }
                    (None, None) => {}
                }
            }
        }

        Ok(ParseTable {
            kind: graph.kind,
            states,
            conflicts,
        })
    }

    pub fn action(&self, state: usize, sym: SymId) -> Option<Action> {
        self.states.get(state).and_then(|cells| cells.get(&sym)).copied()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Terminal names with a valid action in `state`, in canonical order.
    /// This is the expected-symbol set syntax errors report.
    pub fn expected_terminals(&self, grammar: &Grammar, state: usize) -> Vec<String> {
        grammar
            .sorted_symbols()
            .into_iter()
            .filter(|&id| grammar.sym(id).terminal)
            .filter(|&id| self.action(state, id).is_some())
            .map(|id| grammar.sym(id).name.clone())
            .collect()
    }
}

/// Place `action` into a cell, resolving against any occupant.
fn insert(
    cells: &mut BTreeMap<SymId, Action>,
    state: usize,
    sym: SymId,
    action: Action,
    conflicts: &mut Vec<Conflict>,
) {
    let Some(&existing) = cells.get(&sym) else {
        cells.insert(sym, action);
        return;
    };
    if existing == action {
        return;
    }
    let keep_new = match (existing, action) {
        // Shift and accept win over reduce.
        (Action::Reduce(_), Action::Shift(_) | Action::Accept) => true,
        (Action::Shift(_) | Action::Accept, Action::Reduce(_)) => false,
        // Earliest-declared production wins a reduce/reduce tie.
        (Action::Reduce(a), Action::Reduce(b)) => b < a,
        // Transitions are deterministic by construction; anything else
        // staying put keeps the table stable.
        _ => false,
    };
    let (kept, dropped) = if keep_new {
        cells.insert(sym, action);
        (action, existing)
    } else {
        (existing, action)
    };
    conflicts.push(Conflict {
        state,
        sym,
        kept,
        dropped,
    });
}
