//! Token types shared by the matcher framework, the DSL loader and the
//! parser runtime.
//!
//! A token couples a tag (the terminal classification), a typed value and
//! the byte span it was read from. The tag type is generic: the grammar
//! notation's own tokenizer uses a closed enum, while tokenizers generated
//! from a grammar definition tag tokens with terminal labels.

use crate::errors::{LexicalError, SyntaxError};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// The payload carried by a token.
///
/// Structural tokens (punctuation, delimiters) carry `Empty`; most matchers
/// carry the matched text; the number matcher carries the parsed integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenValue {
    Empty,
    Text(String),
    Num(i64),
}

impl TokenValue {
    /// The textual payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TokenValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<i64> {
        match self {
            TokenValue::Num(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Empty => Ok(()),
            TokenValue::Text(s) => write!(f, "{}", s),
            TokenValue::Num(n) => write!(f, "{}", n),
        }
    }
}

/// A single token: tag, value and source span.
///
/// Tokens are created by a matcher at the moment of a successful match and
/// are immutable afterwards. Within one stream, spans are non-decreasing
/// and non-overlapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token<T> {
    pub tag: T,
    pub value: TokenValue,
    pub span: Range<usize>,
}

impl<T> Token<T> {
    pub fn new(tag: T, value: TokenValue, span: Range<usize>) -> Self {
        Token { tag, value, span }
    }
}

impl<T: PartialEq> Token<T> {
    pub fn is_one_of(&self, expected: &[T]) -> bool {
        expected.iter().any(|t| *t == self.tag)
    }
}

/// A lookahead buffer over a fallible token source.
///
/// Wraps a `next_token`-style source with k-token peeking, conditional
/// consumption and expectation enforcement. The DSL loader drives its
/// recursive descent through this buffer.
pub struct TokenBuffer<T, F>
where
    F: FnMut() -> Result<Option<Token<T>>, LexicalError>,
{
    next_token: F,
    buffer: Vec<Token<T>>,
    /// True once the underlying source has reported end of input.
    done: bool,
    /// End offset of the furthest token seen, for end-of-input diagnostics.
    last_end: usize,
}

impl<T, F> TokenBuffer<T, F>
where
    T: Clone + PartialEq + fmt::Debug,
    F: FnMut() -> Result<Option<Token<T>>, LexicalError>,
{
    pub fn new(next_token: F) -> Self {
        TokenBuffer {
            next_token,
            buffer: Vec::new(),
            done: false,
            last_end: 0,
        }
    }

    /// Peek at the nth token ahead without consuming anything.
    pub fn peek(&mut self, nth: usize) -> Result<Option<&Token<T>>, LexicalError> {
        while self.buffer.len() <= nth && !self.done {
            match (self.next_token)()? {
                Some(tok) => {
                    self.last_end = tok.span.end;
                    self.buffer.push(tok);
                }
                None => self.done = true,
            }
        }
        Ok(self.buffer.get(nth))
    }

    pub fn next(&mut self) -> Result<Option<Token<T>>, LexicalError> {
        self.peek(0)?;
        if self.buffer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.buffer.remove(0)))
        }
    }

    /// Consume the next token if its tag is one of `expected`.
    pub fn consume_if(&mut self, expected: &[T]) -> Result<Option<Token<T>>, LexicalError> {
        match self.peek(0)? {
            Some(tok) if tok.is_one_of(expected) => self.next(),
            _ => Ok(None),
        }
    }

    /// Peek at the next token if its tag is one of `expected`.
    pub fn next_matches(&mut self, expected: &[T]) -> Result<bool, LexicalError> {
        Ok(matches!(self.peek(0)?, Some(tok) if tok.is_one_of(expected)))
    }

    /// Consume the next token, failing with a syntax error when its tag is
    /// not one of `expected`.
    pub fn expect(&mut self, expected: &[T]) -> Result<Token<T>, SyntaxError> {
        let expected_names = || expected.iter().map(|t| format!("{:?}", t)).collect();
        let found = self.peek(0).map_err(|e| SyntaxError {
            offset: e.offset,
            found: e.message.clone(),
            expected: expected_names(),
        })?;
        let mismatch = match found {
            Some(tok) if tok.is_one_of(expected) => None,
            Some(tok) => Some(SyntaxError {
                offset: tok.span.start,
                found: format!("{:?}", tok.tag),
                expected: expected_names(),
            }),
            None => Some(SyntaxError {
                offset: self.last_end,
                found: "end of input".to_string(),
                expected: expected_names(),
            }),
        };
        match mismatch {
            Some(err) => Err(err),
            // The peek above filled the buffer, so this cannot miss.
            None => Ok(self.buffer.remove(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_of(tags: Vec<u8>) -> impl FnMut() -> Result<Option<Token<u8>>, LexicalError> {
        let mut pos = 0usize;
        let mut tags = tags.into_iter();
        move || {
            Ok(tags.next().map(|t| {
                let tok = Token::new(t, TokenValue::Empty, pos..pos + 1);
                pos += 1;
                tok
            }))
        }
    }

    #[test]
    fn test_peek_is_stable_until_consumed() {
        let mut buf = TokenBuffer::new(source_of(vec![1, 2]));
        assert_eq!(buf.peek(0).unwrap().unwrap().tag, 1);
        assert_eq!(buf.peek(1).unwrap().unwrap().tag, 2);
        assert_eq!(buf.peek(0).unwrap().unwrap().tag, 1);
        assert_eq!(buf.next().unwrap().unwrap().tag, 1);
        assert_eq!(buf.peek(0).unwrap().unwrap().tag, 2);
    }

    #[test]
    fn test_consume_if_only_takes_matching_tags() {
        let mut buf = TokenBuffer::new(source_of(vec![1, 2]));
        assert!(buf.consume_if(&[2]).unwrap().is_none());
        assert!(buf.consume_if(&[1]).unwrap().is_some());
        assert!(buf.consume_if(&[2]).unwrap().is_some());
        assert!(buf.consume_if(&[2]).unwrap().is_none());
    }

    #[test]
    fn test_expect_reports_position_and_expected_set() {
        let mut buf = TokenBuffer::new(source_of(vec![7]));
        let err = buf.expect(&[1, 2]).unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(err.expected, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_expect_at_end_of_input() {
        let mut buf = TokenBuffer::new(source_of(vec![]));
        let err = buf.expect(&[1]).unwrap_err();
        assert_eq!(err.found, "end of input");
    }
}
