//! Test fixtures shared by unit and integration tests.
//!
//! # Grammar Testing Guidelines
//!
//! Tests against the engine should use the curated fixtures here rather
//! than re-declaring grammars inline. Two reasons:
//!
//! 1. Hand-written grammar definitions drift: a stray semicolon or a
//!    renamed terminal makes a test pass for the wrong reason. The fixtures
//!    below are the vetted forms, and tests across the crate agree on them.
//! 2. Assertions about automaton shape (state counts, conflict cells) are
//!    only meaningful against a fixed grammar; sharing the fixture pins the
//!    expectation in one place.
//!
//! `expr_grammar` is the canonical left-recursive arithmetic grammar used
//! throughout: `expr -> expr '+' term | term ; term -> NUMBER ;`. Its SLR
//! automaton has 6 states and no conflicts. `AMBIGUOUS_DSL` is the classic
//! shift/reduce fixture.

use crate::grammar::Grammar;

/// The canonical arithmetic fixture in definition form.
pub const EXPR_DSL: &str = r"
    %token NUMBER /\d+/
    %skip /\s+/
    expr -> expr '+' term | term ;
    term -> NUMBER ;
";

/// `e -> e '+' e | NUM` — inherently ambiguous, every table build reports
/// shift/reduce conflicts.
pub const AMBIGUOUS_DSL: &str = r"
    %token NUM /\d+/
    e -> e '+' e | NUM ;
";

/// The arithmetic fixture built directly against the grammar API,
/// augmented and ready for automaton construction. Terminal names match
/// the hand-built convention: `NUMBER` and `'+'`.
pub fn expr_grammar() -> Grammar {
    let mut g = Grammar::new();
    let e = g.non_terminal("expr").unwrap();
    let t = g.non_terminal("term").unwrap();
    let plus = g.terminal("'+'").unwrap();
    let num = g.terminal("NUMBER").unwrap();
    g.add_rule(e, vec![e, plus, t]).unwrap();
    g.add_rule(e, vec![t]).unwrap();
    g.add_rule(t, vec![num]).unwrap();
    g.augment().unwrap();
    g
}
