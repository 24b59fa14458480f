//! Parsing layer.
//!
//! The automaton construction ([`items`]), the deterministic action/goto
//! table ([`table`]), the parse tree ([`tree`]) and the runtime loop
//! ([`runtime`]). Everything here operates on an augmented [`Grammar`] and
//! is deterministic: the same grammar always compiles to the same states,
//! the same table and the same conflict diagnostics.
//!
//! [`Grammar`]: crate::grammar::Grammar

pub mod items;
pub mod runtime;
pub mod table;
pub mod tree;

pub use items::{Item, ItemGraph, ItemSet, TableKind};
pub use runtime::Parser;
pub use table::{Action, Conflict, ParseTable};
pub use tree::{Node, ParseTree};
