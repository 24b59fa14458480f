//! Nullable, FIRST and FOLLOW computations.
//!
//! All three are least fixed points over the productions. Sets are keyed
//! and stored in `BTree*` collections so iteration order, and therefore
//! everything derived from these sets (follow-based reduce actions, item
//! lookaheads), is deterministic.

use crate::grammar::{Grammar, SymId};
use std::collections::{BTreeMap, BTreeSet};

/// The non-terminals that can derive the empty string.
#[derive(Debug, Clone)]
pub struct NullableSet {
    nullable: BTreeSet<SymId>,
}

impl NullableSet {
    pub fn compute(grammar: &Grammar) -> Self {
        let mut nullable = BTreeSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for rule in grammar.rules() {
                if nullable.contains(&rule.lhs) {
                    continue;
                }
                if rule.rhs.iter().all(|s| nullable.contains(s)) {
                    nullable.insert(rule.lhs);
                    changed = true;
                }
            }
        }
        NullableSet { nullable }
    }

    pub fn contains(&self, sym: SymId) -> bool {
        self.nullable.contains(&sym)
    }

    pub fn seq_nullable(&self, seq: &[SymId]) -> bool {
        seq.iter().all(|&s| self.contains(s))
    }
}

/// FIRST sets: the terminals that can begin a derivation of each symbol.
#[derive(Debug, Clone)]
pub struct FirstSets {
    first: BTreeMap<SymId, BTreeSet<SymId>>,
    nullable: NullableSet,
}

impl FirstSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let nullable = NullableSet::compute(grammar);
        let mut first: BTreeMap<SymId, BTreeSet<SymId>> = BTreeMap::new();
        for sym in grammar.symbols() {
            let mut set = BTreeSet::new();
            if sym.terminal {
                set.insert(sym.id);
            }
            first.insert(sym.id, set);
        }
        let mut changed = true;
        while changed {
            changed = false;
            for rule in grammar.rules() {
                let mut addition = BTreeSet::new();
                for &s in &rule.rhs {
                    addition.extend(first[&s].iter().copied());
                    if !nullable.contains(s) {
                        break;
                    }
                }
                let target = first.entry(rule.lhs).or_default();
                let before = target.len();
                target.extend(addition);
                changed |= target.len() != before;
            }
        }
        FirstSets { first, nullable }
    }

    pub fn of(&self, sym: SymId) -> &BTreeSet<SymId> {
        &self.first[&sym]
    }

    pub fn nullable(&self) -> &NullableSet {
        &self.nullable
    }

    /// FIRST of a symbol sequence followed by `tail` lookaheads: terminals
    /// that can begin `seq`, plus `tail` when the whole sequence is
    /// nullable.
    pub fn of_seq(&self, seq: &[SymId], tail: &BTreeSet<SymId>) -> BTreeSet<SymId> {
        let mut out = BTreeSet::new();
        for &s in seq {
            out.extend(self.first[&s].iter().copied());
            if !self.nullable.contains(s) {
                return out;
            }
        }
        out.extend(tail.iter().copied());
        out
    }
}

/// FOLLOW sets: the terminals that can appear after each non-terminal.
#[derive(Debug, Clone)]
pub struct FollowSets {
    follow: BTreeMap<SymId, BTreeSet<SymId>>,
}

impl FollowSets {
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut follow: BTreeMap<SymId, BTreeSet<SymId>> = grammar
            .symbols()
            .iter()
            .filter(|s| !s.terminal)
            .map(|s| (s.id, BTreeSet::new()))
            .collect();
        let anchor = grammar
            .augmented_rule()
            .map(|(accept, _)| accept)
            .or(grammar.start());
        if let Some(set) = anchor.and_then(|a| follow.get_mut(&a)) {
            set.insert(grammar.eof());
        }
        let mut changed = true;
        while changed {
            changed = false;
            for rule in grammar.rules() {
                for (i, &sym) in rule.rhs.iter().enumerate() {
                    if grammar.sym(sym).terminal {
                        continue;
                    }
                    let beta = &rule.rhs[i + 1..];
                    let mut addition = first.of_seq(beta, &BTreeSet::new());
                    if first.nullable().seq_nullable(beta) {
                        addition.extend(follow[&rule.lhs].iter().copied());
                    }
                    let target = follow.entry(sym).or_default();
                    let before = target.len();
                    target.extend(addition);
                    changed |= target.len() != before;
                }
            }
        }
        FollowSets { follow }
    }

    pub fn of(&self, sym: SymId) -> &BTreeSet<SymId> {
        &self.follow[&sym]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::testing::expr_grammar;

    #[test]
    fn test_nothing_nullable_in_expr_grammar() {
        let g = expr_grammar();
        let nullable = NullableSet::compute(&g);
        assert!(g.symbols().iter().all(|s| !nullable.contains(s.id)));
    }

    #[test]
    fn test_first_flows_through_non_terminals() {
        let g = expr_grammar();
        let first = FirstSets::compute(&g);
        let e = g.by_name("expr").unwrap().id;
        let num = g.by_name("NUMBER").unwrap().id;
        assert_eq!(first.of(e).iter().copied().collect::<Vec<_>>(), vec![num]);
    }

    #[test]
    fn test_follow_includes_eof_and_trailing_terminals() {
        let g = expr_grammar();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);
        let e = g.by_name("expr").unwrap().id;
        let plus = g.by_name("'+'").unwrap().id;
        let expected: BTreeSet<SymId> = [g.eof(), plus].into_iter().collect();
        assert_eq!(follow.of(e), &expected);
    }

    #[test]
    fn test_nullable_prefix_propagates_first_and_follow() {
        // a -> b c ; b -> X | ε ; c -> Y
        let mut g = Grammar::new();
        let a = g.non_terminal("a").unwrap();
        let b = g.non_terminal("b").unwrap();
        let c = g.non_terminal("c").unwrap();
        let x = g.terminal("X").unwrap();
        let y = g.terminal("Y").unwrap();
        g.add_rule(a, vec![b, c]).unwrap();
        g.add_rule(b, vec![x]).unwrap();
        g.add_rule(b, vec![]).unwrap();
        g.add_rule(c, vec![y]).unwrap();
        g.augment().unwrap();
        let first = FirstSets::compute(&g);
        assert!(first.nullable().contains(b));
        let first_a: Vec<SymId> = first.of(a).iter().copied().collect();
        assert_eq!(first_a, vec![x, y]);
        let follow = FollowSets::compute(&g, &first);
        let follow_b: Vec<SymId> = follow.of(b).iter().copied().collect();
        assert_eq!(follow_b, vec![y]);
    }

    #[test]
    fn test_first_of_seq_falls_through_to_tail() {
        let mut g = Grammar::new();
        let b = g.non_terminal("b").unwrap();
        let x = g.terminal("X").unwrap();
        g.add_rule(b, vec![x]).unwrap();
        g.add_rule(b, vec![]).unwrap();
        let first = FirstSets::compute(&g);
        let tail: BTreeSet<SymId> = [g.eof()].into_iter().collect();
        let out = first.of_seq(&[b], &tail);
        let expected: BTreeSet<SymId> = [g.eof(), x].into_iter().collect();
        assert_eq!(out, expected);
    }
}
