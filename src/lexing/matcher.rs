//! The ordered matcher framework.
//!
//! A tokenizer is a prioritized pipeline of matchers tried in registration
//! order at the current tape position; the first matcher to succeed wins.
//! This is a greedy, non-backtracking, ordered-alternative strategy, not
//! longest-match-wins, which makes registration order semantically
//! significant: skip matchers (whitespace, comments) go first so nothing
//! else has to special-case leading trivia, delimited matchers go before
//! identifier/number matchers, and multi-character literals go before any
//! single-character fallback.
//!
//! Matchers are descriptors, not closures, so an assembled pipeline can be
//! inspected and tested in isolation. The framework itself restores the
//! tape position after a failed attempt: no matcher can partially consume
//! input on failure.

use crate::errors::LexicalError;
use crate::lexing::tape::Tape;
use crate::lexing::token::{Token, TokenValue};
use regex::Regex;

/// A single recognizer in a tokenizer pipeline.
#[derive(Debug, Clone)]
pub enum Matcher<T> {
    /// Longest run of whitespace characters.
    Spaces { tag: T },
    /// From `start` to the end of the line (newline consumed).
    LineComment { tag: T, start: String },
    /// From `start` delimiter to `end` delimiter; the token value is the
    /// text strictly between them. Fails without consuming when no
    /// unescaped end delimiter follows.
    StartStop { tag: T, start: String, end: String },
    /// An exact string.
    Literal { tag: T, text: String },
    /// Longest run of decimal digits, carried as an integer value.
    Number { tag: T },
    /// Identifier run, optionally prefixed with a `%` sigil (which yields
    /// `pct_tag` instead). `excluded` lists the characters that can never
    /// appear in an identifier; whitespace and leading digits are always
    /// excluded.
    Ident { tag: T, pct_tag: T, excluded: String },
    /// An anchored regex applied at the current position.
    Pattern { tag: T, regex: Regex },
    /// One-character table lookup.
    SingleChar { table: Vec<(char, T)> },
}

impl<T: Clone> Matcher<T> {
    /// Attempt this matcher at the current tape position.
    ///
    /// On success the tape has advanced past the match; on failure the
    /// caller restores the tape to `pos`.
    fn try_match(&self, tape: &mut Tape<'_>, pos: usize) -> Option<(T, TokenValue)> {
        match self {
            Matcher::Spaces { tag } => {
                while matches!(tape.peek(), Some(ch) if ch.is_whitespace()) {
                    tape.next_ch();
                }
                if tape.index() == pos {
                    return None;
                }
                Some((tag.clone(), TokenValue::Text(tape.substring(pos, tape.index()).to_string())))
            }
            Matcher::LineComment { tag, start } => {
                if !tape.matches(start) {
                    return None;
                }
                while matches!(tape.peek(), Some(ch) if ch != '\n') {
                    tape.next_ch();
                }
                tape.next_ch(); // consume the newline, if any
                let text = tape.substring(pos + start.len(), tape.index());
                Some((tag.clone(), TokenValue::Text(text.to_string())))
            }
            Matcher::StartStop { tag, start, end } => {
                if !tape.matches(start) {
                    return None;
                }
                tape.advance_after(end)?;
                let inner = tape.substring(pos + start.len(), tape.index() - end.len());
                Some((tag.clone(), TokenValue::Text(inner.to_string())))
            }
            Matcher::Literal { tag, text } => {
                if tape.matches(text) {
                    Some((tag.clone(), TokenValue::Text(text.clone())))
                } else {
                    None
                }
            }
            Matcher::Number { tag } => {
                while matches!(tape.peek(), Some(ch) if ch.is_ascii_digit()) {
                    tape.next_ch();
                }
                if tape.index() == pos {
                    return None;
                }
                let digits = tape.substring(pos, tape.index());
                Some((tag.clone(), TokenValue::Num(digits.parse().ok()?)))
            }
            Matcher::Ident { tag, pct_tag, excluded } => {
                let is_ident_char =
                    |ch: char| !ch.is_whitespace() && !ch.is_ascii_digit() && !excluded.contains(ch);
                let pct = tape.peek() == Some('%');
                if pct {
                    tape.next_ch();
                }
                match tape.peek() {
                    Some(ch) if is_ident_char(ch) => {}
                    // A bare sigil is an empty-valued directive token.
                    _ if pct => return Some((pct_tag.clone(), TokenValue::Text(String::new()))),
                    _ => return None,
                }
                while matches!(tape.peek(), Some(ch) if is_ident_char(ch) || ch.is_ascii_digit()) {
                    tape.next_ch();
                }
                let start = if pct { pos + 1 } else { pos };
                let text = tape.substring(start, tape.index()).to_string();
                let tag = if pct { pct_tag.clone() } else { tag.clone() };
                Some((tag, TokenValue::Text(text)))
            }
            Matcher::Pattern { tag, regex } => {
                let m = regex.find(tape.rest())?;
                if m.start() != 0 || m.is_empty() {
                    return None;
                }
                let text = m.as_str().to_string();
                tape.advance(m.end());
                Some((tag.clone(), TokenValue::Text(text)))
            }
            Matcher::SingleChar { table } => {
                let ch = tape.peek()?;
                let tag = table.iter().find(|(c, _)| *c == ch)?.1.clone();
                tape.next_ch();
                Some((tag, TokenValue::Text(ch.to_string())))
            }
        }
    }
}

/// One pipeline entry: a matcher and whether its tokens are surfaced.
///
/// Skip entries (whitespace, comments) consume input but never emit.
#[derive(Debug, Clone)]
pub struct MatcherEntry<T> {
    pub matcher: Matcher<T>,
    pub skip: bool,
}

/// An ordered matcher pipeline over one tape.
///
/// Tokenization is lazy, synchronous and pull-based: each `next_token` call
/// produces the next significant token, `Ok(None)` at end of input, or a
/// lexical error when no matcher accepts the input. A tokenizer is one-shot;
/// re-tokenizing the same text requires a fresh tokenizer.
pub struct Tokenizer<'a, T> {
    tape: Tape<'a>,
    matchers: Vec<MatcherEntry<T>>,
}

impl<'a, T: Clone> Tokenizer<'a, T> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            tape: Tape::new(input),
            matchers: Vec::new(),
        }
    }

    /// Register a significant matcher. Order of registration is the order
    /// of matching.
    pub fn matcher(mut self, matcher: Matcher<T>) -> Self {
        self.matchers.push(MatcherEntry { matcher, skip: false });
        self
    }

    /// Register a skip matcher: recognized spans are consumed but never
    /// surfaced.
    pub fn skip_matcher(mut self, matcher: Matcher<T>) -> Self {
        self.matchers.push(MatcherEntry { matcher, skip: true });
        self
    }

    /// The assembled pipeline, for inspection.
    pub fn entries(&self) -> &[MatcherEntry<T>] {
        &self.matchers
    }

    /// Current position in the underlying tape.
    pub fn position(&self) -> usize {
        self.tape.index()
    }

    /// Produce the next significant token.
    pub fn next_token(&mut self) -> Result<Option<Token<T>>, LexicalError> {
        loop {
            if !self.tape.has_more() {
                return Ok(None);
            }
            let pos = self.tape.index();
            let mut matched = None;
            for entry in &self.matchers {
                match entry.matcher.try_match(&mut self.tape, pos) {
                    Some((tag, value)) => {
                        matched = Some((entry.skip, tag, value));
                        break;
                    }
                    None => self.tape.rewind_to(pos),
                }
            }
            match matched {
                Some((true, _, _)) => continue,
                Some((false, tag, value)) => {
                    return Ok(Some(Token::new(tag, value, pos..self.tape.index())));
                }
                None => {
                    let ch = self.tape.peek().unwrap_or_default();
                    return Err(LexicalError {
                        offset: pos,
                        message: format!("invalid character: [{}]", ch),
                    });
                }
            }
        }
    }
}

impl<T: Clone> Iterator for Tokenizer<'_, T> {
    type Item = Result<Token<T>, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Tag {
        Str,
        Word,
        Num,
        Comment,
        Ws,
    }

    fn word_matcher() -> Matcher<Tag> {
        Matcher::Ident {
            tag: Tag::Word,
            pct_tag: Tag::Word,
            excluded: "'".to_string(),
        }
    }

    #[test]
    fn test_first_match_wins_over_later_matchers() {
        // The string matcher is registered before the number matcher, so a
        // quoted digit run lexes as a string.
        let mut t = Tokenizer::new("'123'")
            .matcher(Matcher::StartStop {
                tag: Tag::Str,
                start: "'".to_string(),
                end: "'".to_string(),
            })
            .matcher(Matcher::Number { tag: Tag::Num });
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, Tag::Str);
        assert_eq!(tok.value, TokenValue::Text("123".to_string()));
        assert_eq!(tok.span, 0..5);
    }

    #[test]
    fn test_start_stop_fails_unterminated_without_consuming() {
        let mut t = Tokenizer::new("'unterminated")
            .matcher(Matcher::StartStop {
                tag: Tag::Str,
                start: "'".to_string(),
                end: "'".to_string(),
            })
            .matcher(word_matcher());
        // The string matcher fails; the quote is not an identifier char
        // either, so the tokenizer reports a lexical error at offset 0.
        let err = t.next_token().unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn test_skip_matchers_surface_nothing() {
        let mut t = Tokenizer::new("// comment\nabc")
            .skip_matcher(Matcher::Spaces { tag: Tag::Ws })
            .skip_matcher(Matcher::LineComment {
                tag: Tag::Comment,
                start: "//".to_string(),
            })
            .matcher(word_matcher());
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, Tag::Word);
        assert_eq!(tok.value, TokenValue::Text("abc".to_string()));
        assert_eq!(t.next_token().unwrap(), None);
    }

    #[test]
    fn test_spans_are_contiguous_over_skips() {
        let mut t = Tokenizer::new("ab  cd")
            .skip_matcher(Matcher::Spaces { tag: Tag::Ws })
            .matcher(word_matcher());
        let first = t.next_token().unwrap().unwrap();
        let second = t.next_token().unwrap().unwrap();
        assert_eq!(first.span, 0..2);
        assert_eq!(second.span, 4..6);
    }

    #[test]
    fn test_number_matcher_longest_digit_run() {
        let mut t = Tokenizer::new("123abc")
            .matcher(Matcher::Number { tag: Tag::Num })
            .matcher(word_matcher());
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.value, TokenValue::Num(123));
        assert_eq!(tok.span, 0..3);
    }

    #[test]
    fn test_pattern_matcher_anchors_at_position() {
        let mut t = Tokenizer::new("abc123").matcher(Matcher::Pattern {
            tag: Tag::Word,
            regex: Regex::new(r"[a-z]+").unwrap(),
        });
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.value, TokenValue::Text("abc".to_string()));
        // "123" matches nowhere at position 3
        assert!(t.next_token().is_err());
    }

    #[test]
    fn test_no_matcher_reports_offending_position() {
        let mut t = Tokenizer::new("ab~cd").matcher(word_matcher());
        t.next_token().unwrap();
        let err = t.next_token().unwrap_err();
        assert_eq!(err.offset, 2);
        assert!(err.message.contains("~"));
    }
}
