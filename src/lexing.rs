//! Lexing layer.
//!
//! Everything between raw text and a token stream lives here: the [`Tape`]
//! cursor, the [`Token`] shape, the ordered [`Matcher`] framework with its
//! [`Tokenizer`] pipeline, and the concrete lexer for the grammar notation.
//! Generated lexers for target languages are assembled from the same
//! matchers by the grammar loader.

pub mod matcher;
pub mod notation;
pub mod tape;
pub mod token;

pub use matcher::{Matcher, MatcherEntry, Tokenizer};
pub use notation::{notation_tokenizer, NotationToken};
pub use tape::Tape;
pub use token::{Token, TokenBuffer, TokenValue};
