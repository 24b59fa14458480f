//! # lrkit
//!
//! A grammar-driven parsing engine: grammars are written in an EBNF-like
//! notation, compiled into a deterministic LR parse table, and executed by
//! a table-driven runtime that turns input text into a parse tree.
//!
//! The pieces, leaf first:
//!
//! - [`lexing`] — the forward-only [`lexing::Tape`], the ordered matcher
//!   framework and the notation's own lexer.
//! - [`grammar`] — symbols, productions, EBNF expansion and the
//!   nullable/FIRST/FOLLOW computations.
//! - [`parsing`] — item-set automaton construction, the action/goto table
//!   with explicit conflict resolution, the parse tree and the runtime.
//! - [`loader`] — reads a grammar definition, producing the grammar and
//!   the generated lexer rules.
//! - [`compile`] — the one-call entry point tying it all together.
//! - [`printers`] — deterministic text and JSON renderings for
//!   diagnostics.
//!
//! ## Quick start
//!
//! ```
//! let compiled = lrkit::compile(r"
//!     %token NUMBER /\d+/
//!     %skip /\s+/
//!     expr -> expr '+' term | term ;
//!     term -> NUMBER ;
//! ").unwrap();
//! let tree = compiled.parse("1 + 2 + 3").unwrap();
//! assert_eq!(tree.source_text(), "1 + 2 + 3");
//! ```
//!
//! A [`compile::Compiled`] artifact is immutable and can back any number
//! of parses, including concurrently from several threads.

pub mod compile;
pub mod errors;
pub mod grammar;
pub mod lexing;
pub mod loader;
pub mod parsing;
pub mod printers;
pub mod testing;

pub use compile::{compile, compile_with, CompileOptions, Compiled};
pub use errors::{EngineError, GrammarError, LexicalError, SyntaxError};
pub use grammar::Grammar;
pub use loader::{load, load_with, LexerRules};
pub use parsing::{ParseTable, ParseTree, Parser, TableKind};
