//! Compiling a grammar definition into a reusable engine.
//!
//! [`compile`] runs the whole front half once: load the definition, validate
//! it (every referenced terminal has a lexer rule, every production is
//! reachable, a start symbol exists), augment, build the automaton and fill
//! the table. The result is an immutable [`Compiled`] artifact exposing the
//! tokenizer and the parser as a pair, so a caller can tokenize an input
//! without parsing it, or drive a full parse.
//!
//! Compilation is the expensive step; a `Compiled` is cheap to share and
//! safe to use from many threads at once, so callers parsing the same
//! grammar repeatedly should build it once and reuse it.

use crate::errors::{EngineError, GrammarError, LexicalError};
use crate::grammar::sets::FirstSets;
use crate::grammar::{Grammar, SymId};
use crate::lexing::token::Token;
use crate::loader::{self, LexerRules};
use crate::parsing::items::{ItemGraph, TableKind};
use crate::parsing::runtime::Parser;
use crate::parsing::table::ParseTable;
use crate::parsing::tree::ParseTree;
use serde::{Deserialize, Serialize};

/// Knobs for [`compile_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Table construction to use.
    pub table: TableKind,
    /// Expansion direction for `*` and `+` quantifiers.
    pub left_recursive: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            table: TableKind::Slr,
            left_recursive: true,
        }
    }
}

/// A fully compiled grammar: lexer rules, parse table and automaton.
///
/// Immutable after construction. All accessors hand out shared references;
/// parses never mutate the artifact, so one instance can back concurrent
/// parses on separate threads.
#[derive(Debug, Clone)]
pub struct Compiled {
    grammar: Grammar,
    lexer: LexerRules,
    graph: ItemGraph,
    table: ParseTable,
}

impl Compiled {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn lexer(&self) -> &LexerRules {
        &self.lexer
    }

    pub fn graph(&self) -> &ItemGraph {
        &self.graph
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// Token stream over `input`, tagged with the grammar's terminal ids.
    pub fn tokenizer<'a>(
        &'a self,
        input: &'a str,
    ) -> impl Iterator<Item = Result<Token<SymId>, LexicalError>> + 'a {
        self.lexer.tokenizer(input).map(|result| {
            let tok = result?;
            match self.grammar.by_name(&tok.tag) {
                Some(sym) => Ok(Token::new(sym.id, tok.value, tok.span)),
                None => Err(LexicalError {
                    offset: tok.span.start,
                    message: format!("token '{}' has no grammar symbol", tok.tag),
                }),
            }
        })
    }

    /// Tokenize and parse `input` against the compiled table.
    pub fn parse(&self, input: &str) -> Result<ParseTree, EngineError> {
        Parser::new(&self.grammar, &self.table).parse(input, self.tokenizer(input))
    }
}

/// Compile with the default options: SLR table, left-recursive expansion.
pub fn compile(input: &str) -> Result<Compiled, EngineError> {
    compile_with(input, CompileOptions::default())
}

pub fn compile_with(input: &str, options: CompileOptions) -> Result<Compiled, EngineError> {
    let (mut grammar, lexer) = loader::load_with(input, options.left_recursive)?;
    check_terminals_declared(&grammar, &lexer)?;
    grammar.augment()?;
    grammar.check_reachability()?;
    let first = FirstSets::compute(&grammar);
    let graph = ItemGraph::build(&grammar, &first, options.table)?;
    let table = ParseTable::build(&grammar, &graph, &first)?;
    Ok(Compiled {
        grammar,
        lexer,
        graph,
        table,
    })
}

/// Every non-synthetic terminal must have a lexer rule, or no input could
/// ever produce it.
fn check_terminals_declared(grammar: &Grammar, lexer: &LexerRules) -> Result<(), GrammarError> {
    for sym in grammar.symbols() {
        if sym.terminal && !sym.aux && !lexer.has_label(&sym.name) {
            return Err(GrammarError::UndeclaredSymbol {
                name: sym.name.clone(),
            });
        }
    }
    Ok(())
}
