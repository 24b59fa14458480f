//! Deterministic text and JSON renderings of grammars, automata and tables.
//!
//! These are the diagnostics surface: what a grammar author reads to
//! understand conflicts, and what external tooling consumes as JSON. All
//! output walks symbols in canonical order and states in discovery order,
//! so the same grammar always renders byte-for-byte identically.

use crate::grammar::Grammar;
use crate::parsing::items::{Item, ItemGraph, ItemSet};
use crate::parsing::table::{Action, ParseTable};
use serde_json::{json, Value};

/// All productions, one per line, in declaration order.
pub fn grammar_text(grammar: &Grammar) -> String {
    let mut out = String::new();
    for rule in grammar.rules() {
        out.push_str(grammar.describe_rule(rule.id).trim_end());
        out.push('\n');
    }
    out
}

/// One item: the production with a `.` marker, plus its lookahead.
pub fn item_text(grammar: &Grammar, item: &Item) -> String {
    let rule = grammar.rule(item.rule);
    let mut parts: Vec<&str> = Vec::with_capacity(rule.rhs.len() + 1);
    for (i, &sym) in rule.rhs.iter().enumerate() {
        if i == item.pos {
            parts.push(".");
        }
        parts.push(&grammar.sym(sym).name);
    }
    if item.pos == rule.rhs.len() {
        parts.push(".");
    }
    let mut out = format!("{} -> {}", grammar.sym(rule.lhs).name, parts.join(" "));
    if let Some(la) = item.lookahead {
        out.push_str(", ");
        out.push_str(&grammar.sym(la).name);
    }
    out
}

pub fn item_set_text(grammar: &Grammar, set: &ItemSet) -> String {
    let mut out = format!("state {}:\n", set.id);
    for item in &set.items {
        out.push_str("  ");
        out.push_str(&item_text(grammar, item));
        out.push('\n');
    }
    out
}

/// Every state's items and transitions.
pub fn graph_text(grammar: &Grammar, graph: &ItemGraph) -> String {
    let mut out = String::new();
    for set in &graph.sets {
        out.push_str(&item_set_text(grammar, set));
        for (&sym, &target) in &graph.transitions[set.id] {
            out.push_str(&format!("  {} => {}\n", grammar.sym(sym).name, target));
        }
    }
    out
}

fn action_text(action: Action) -> String {
    match action {
        Action::Shift(s) => format!("s{}", s),
        Action::Goto(s) => format!("g{}", s),
        Action::Reduce(r) => format!("r{}", r.0),
        Action::Accept => "acc".to_string(),
    }
}

/// The action/goto table, cells in canonical symbol order.
pub fn table_text(grammar: &Grammar, table: &ParseTable) -> String {
    let symbols = grammar.sorted_symbols();
    let mut out = String::new();
    for state in 0..table.state_count() {
        out.push_str(&format!("state {}:\n", state));
        for &sym in &symbols {
            if let Some(action) = table.action(state, sym) {
                out.push_str(&format!(
                    "  {} -> {}\n",
                    grammar.sym(sym).name,
                    action_text(action)
                ));
            }
        }
    }
    out
}

/// Resolved conflicts, one per line.
pub fn conflicts_text(grammar: &Grammar, table: &ParseTable) -> String {
    let mut out = String::new();
    for c in &table.conflicts {
        out.push_str(&format!(
            "state {}, on {}: kept {}, dropped {}\n",
            c.state,
            grammar.sym(c.sym).name,
            action_text(c.kept),
            action_text(c.dropped)
        ));
    }
    out
}

/// JSON value describing a grammar's symbols and productions.
pub fn grammar_debug_value(grammar: &Grammar) -> Value {
    let symbols: Vec<Value> = grammar
        .sorted_symbols()
        .into_iter()
        .map(|id| {
            let sym = grammar.sym(id);
            json!({
                "id": sym.id.0,
                "name": sym.name,
                "terminal": sym.terminal,
                "aux": sym.aux,
            })
        })
        .collect();
    let rules: Vec<Value> = grammar
        .rules()
        .iter()
        .map(|rule| json!({ "id": rule.id.0, "rule": grammar.describe_rule(rule.id) }))
        .collect();
    json!({ "symbols": symbols, "rules": rules })
}

/// JSON value describing a compiled table, keyed by symbol name.
pub fn table_debug_value(grammar: &Grammar, table: &ParseTable) -> Value {
    let states: Vec<Value> = (0..table.state_count())
        .map(|state| {
            let cells: serde_json::Map<String, Value> = grammar
                .sorted_symbols()
                .into_iter()
                .filter_map(|sym| {
                    table
                        .action(state, sym)
                        .map(|a| (grammar.sym(sym).name.clone(), json!(action_text(a))))
                })
                .collect();
            json!(cells)
        })
        .collect();
    let conflicts: Vec<Value> = table
        .conflicts
        .iter()
        .map(|c| {
            json!({
                "state": c.state,
                "sym": grammar.sym(c.sym).name,
                "kept": action_text(c.kept),
                "dropped": action_text(c.dropped),
            })
        })
        .collect();
    json!({ "kind": table.kind, "states": states, "conflicts": conflicts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::sets::FirstSets;
    use crate::parsing::items::TableKind;
    use crate::testing::expr_grammar;

    #[test]
    fn test_grammar_text_lists_rules_in_declaration_order() {
        insta::assert_snapshot!(grammar_text(&expr_grammar()), @r###"
        expr -> expr '+' term
        expr -> term
        term -> NUMBER
        $accept -> expr
        "###);
    }

    #[test]
    fn test_item_text_places_the_marker() {
        let g = expr_grammar();
        let e = g.by_name("expr").unwrap().id;
        let rule = g.rules_for(e)[0];
        assert_eq!(
            item_text(&g, &Item { rule, pos: 0, lookahead: None }),
            "expr -> . expr '+' term"
        );
        assert_eq!(
            item_text(&g, &Item { rule, pos: 3, lookahead: Some(g.eof()) }),
            "expr -> expr '+' term ., $end"
        );
    }

    #[test]
    fn test_table_text_walks_canonical_order() {
        let g = expr_grammar();
        let first = FirstSets::compute(&g);
        let graph = ItemGraph::build(&g, &first, TableKind::Slr).unwrap();
        let table = ParseTable::build(&g, &graph, &first).unwrap();
        insta::assert_snapshot!(table_text(&g, &table), @r###"
        state 0:
          NUMBER -> s1
          expr -> g2
          term -> g3
        state 1:
          $end -> r2
          '+' -> r2
        state 2:
          $end -> acc
          '+' -> s4
        state 3:
          $end -> r1
          '+' -> r1
        state 4:
          NUMBER -> s1
          term -> g5
        state 5:
          $end -> r0
          '+' -> r0
        "###);
    }

    #[test]
    fn test_debug_values_are_stable() {
        let g = expr_grammar();
        let first = FirstSets::compute(&g);
        let graph = ItemGraph::build(&g, &first, TableKind::Slr).unwrap();
        let table = ParseTable::build(&g, &graph, &first).unwrap();
        let a = serde_json::to_string(&table_debug_value(&g, &table)).unwrap();
        let b = serde_json::to_string(&table_debug_value(&g, &table)).unwrap();
        assert_eq!(a, b);
        assert_eq!(grammar_debug_value(&g)["rules"][0]["rule"], "expr -> expr '+' term");
    }
}
