//! The table-driven parser loop.
//!
//! The runtime keeps two parallel stacks, automaton states and partially
//! built subtrees, and consults one table cell per step: shift pushes the
//! lookahead as a leaf, reduce pops one production's worth of subtrees into
//! an interior node and follows the goto for its non-terminal, accept
//! returns the finished tree. A token with no action in the current state
//! is a syntax error carrying the offending position and the terminals the
//! state would have accepted; there is no recovery.

use crate::errors::{EngineError, SyntaxError};
use crate::grammar::{Grammar, RuleAction, SymId};
use crate::lexing::token::{Token, TokenValue};
use crate::parsing::table::{Action, ParseTable};
use crate::parsing::tree::{Node, ParseTree};

/// A parser over one compiled table.
///
/// Holds only shared references; one `Parser` can run any number of
/// sequential parses, and separate parsers over the same table can run
/// concurrently.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        Parser { grammar, table }
    }

    /// Drive the table over a token stream until accept or error.
    ///
    /// Tokens arrive tagged with the grammar's terminal ids; `source` is
    /// the text the token spans index into.
    pub fn parse<I>(&self, source: &str, tokens: I) -> Result<ParseTree, EngineError>
    where
        I: IntoIterator<Item = Result<Token<SymId>, crate::errors::LexicalError>>,
    {
        let mut tokens = tokens.into_iter();
        let mut states: Vec<usize> = vec![0];
        let mut nodes: Vec<Node> = Vec::new();
        let mut lookahead: Option<Token<SymId>> = tokens.next().transpose()?;

        loop {
            // Unreachable only if the state stack underflows, which the
            // table's goto discipline rules out; fall back to state 0.
            let state = states.last().copied().unwrap_or(0);
            let sym = lookahead
                .as_ref()
                .map(|tok| tok.tag)
                .unwrap_or_else(|| self.grammar.eof());
            match (self.table.action(state, sym), lookahead.take()) {
                (Some(Action::Shift(next)), Some(tok)) => {
                    states.push(next);
                    nodes.push(Node::leaf(tok.tag, tok.value, tok.span));
                    lookahead = tokens.next().transpose()?;
                }
                (Some(Action::Reduce(rule_id)), la) => {
                    lookahead = la;
                    let rule = self.grammar.rule(rule_id);
                    let keep = nodes.len().saturating_sub(rule.rhs.len());
                    states.truncate(states.len().saturating_sub(rule.rhs.len()));
                    let children: Vec<Node> = nodes.drain(keep..).collect();
                    let value = match &rule.action {
                        Some(RuleAction::ChildPos(n)) => children
                            .get(n.saturating_sub(1))
                            .map(|c| c.value.clone())
                            .unwrap_or(TokenValue::Empty),
                        _ => TokenValue::Empty,
                    };
                    let node = Node::interior(rule.lhs, rule_id, value, children);
                    let state = states.last().copied().unwrap_or(0);
                    match self.table.action(state, rule.lhs) {
                        Some(Action::Goto(next)) => {
                            states.push(next);
                            nodes.push(node);
                        }
                        _ => return Err(self.syntax_error(source, state, &lookahead).into()),
                    }
                }
                (Some(Action::Accept), _) => {
                    let root = match nodes.pop() {
                        Some(root) => root,
                        None => return Err(self.syntax_error(source, state, &None).into()),
                    };
                    return Ok(ParseTree::new(source, root));
                }
                (Some(Action::Goto(_)), la) | (None, la) | (Some(Action::Shift(_)), la) => {
                    return Err(self.syntax_error(source, state, &la).into());
                }
            }
        }
    }

    fn syntax_error(
        &self,
        source: &str,
        state: usize,
        lookahead: &Option<Token<SymId>>,
    ) -> SyntaxError {
        let (offset, found) = match lookahead {
            Some(tok) => (tok.span.start, self.grammar.sym(tok.tag).name.clone()),
            None => (source.len(), "end of input".to_string()),
        };
        SyntaxError {
            offset,
            found,
            expected: self.table.expected_terminals(self.grammar, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::sets::FirstSets;
    use crate::parsing::items::{ItemGraph, TableKind};

    struct Fixture {
        grammar: Grammar,
        table: ParseTable,
    }

    fn expr_fixture() -> Fixture {
        let mut g = Grammar::new();
        let e = g.non_terminal("expr").unwrap();
        let t = g.non_terminal("term").unwrap();
        let plus = g.terminal("'+'").unwrap();
        let num = g.terminal("NUMBER").unwrap();
        g.add_rule(e, vec![e, plus, t]).unwrap();
        g.add_rule(e, vec![t]).unwrap();
        g.add_rule(t, vec![num]).unwrap();
        g.augment().unwrap();
        let first = FirstSets::compute(&g);
        let graph = ItemGraph::build(&g, &first, TableKind::Slr).unwrap();
        let table = ParseTable::build(&g, &graph, &first).unwrap();
        Fixture { grammar: g, table }
    }

    /// Hand-lex a string of single-char digit/plus tokens.
    fn lex(f: &Fixture, input: &str) -> Vec<Result<Token<SymId>, crate::errors::LexicalError>> {
        let num = f.grammar.by_name("NUMBER").unwrap().id;
        let plus = f.grammar.by_name("'+'").unwrap().id;
        input
            .char_indices()
            .map(|(i, ch)| {
                Ok(if ch == '+' {
                    Token::new(plus, TokenValue::Text("+".to_string()), i..i + 1)
                } else {
                    Token::new(num, TokenValue::Num(ch as i64 - '0' as i64), i..i + 1)
                })
            })
            .collect()
    }

    #[test]
    fn test_left_associative_parse_of_a_sum() {
        let f = expr_fixture();
        let parser = Parser::new(&f.grammar, &f.table);
        let tree = parser.parse("1+2+3", lex(&f, "1+2+3")).unwrap();
        let leaf_text: Vec<String> = tree
            .leaves()
            .iter()
            .map(|n| n.value.to_string())
            .collect();
        assert_eq!(leaf_text, vec!["1", "+", "2", "+", "3"]);
        // Left associativity: the first child of the root expr covers 1+2.
        assert_eq!(tree.root.children[0].source_text(&tree.source), "1+2");
        assert_eq!(tree.source_text(), "1+2+3");
    }

    #[test]
    fn test_unexpected_token_reports_expected_set() {
        let f = expr_fixture();
        let parser = Parser::new(&f.grammar, &f.table);
        let err = parser.parse("+1", lex(&f, "+1")).unwrap_err();
        match err {
            EngineError::Syntax(e) => {
                assert_eq!(e.offset, 0);
                assert_eq!(e.found, "'+'");
                assert_eq!(e.expected, vec!["NUMBER".to_string()]);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_input_reports_end_of_input() {
        let f = expr_fixture();
        let parser = Parser::new(&f.grammar, &f.table);
        let err = parser.parse("1+", lex(&f, "1+")).unwrap_err();
        match err {
            EngineError::Syntax(e) => {
                assert_eq!(e.offset, 2);
                assert_eq!(e.found, "end of input");
                assert_eq!(e.expected, vec!["NUMBER".to_string()]);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_lexical_errors_pass_through() {
        let f = expr_fixture();
        let parser = Parser::new(&f.grammar, &f.table);
        let err = parser
            .parse(
                "~",
                vec![Err(crate::errors::LexicalError {
                    offset: 0,
                    message: "invalid character: [~]".to_string(),
                })],
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Lexical(_)));
    }
}
