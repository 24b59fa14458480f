//! The lexer for the grammar notation itself.
//!
//! Grammar definitions arrive as text in an EBNF-like notation; this module
//! fixes the token set and assembles the matcher pipeline that reads it.
//! The pipeline order is load-bearing: comments and whitespace first (as
//! skips), delimited tokens (strings, regexes) before identifiers and
//! numbers, and the two-character arrow before the single-character table so
//! `->` never splits into two tokens.

use crate::lexing::matcher::{Matcher, Tokenizer};
use once_cell::sync::Lazy;

/// Characters reserved by the notation for future or structural use.
/// None of them may appear inside an identifier.
pub const RESERVED_CHARS: &str = "#&%@:!*~`'.^|?<>$";

/// Token types of the grammar notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotationToken {
    Str,
    Regex,
    Number,
    Spaces,
    Ident,
    PctIdent,
    Star,
    Plus,
    QMark,
    Pipe,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenSq,
    CloseSq,
    Comment,
    Arrow,
    SemiColon,
}

/// Single-character structural tokens.
pub static SINGLE_CH_TOKENS: Lazy<Vec<(char, NotationToken)>> = Lazy::new(|| {
    vec![
        ('[', NotationToken::OpenSq),
        (']', NotationToken::CloseSq),
        ('(', NotationToken::OpenParen),
        (')', NotationToken::CloseParen),
        ('{', NotationToken::OpenBrace),
        ('}', NotationToken::CloseBrace),
        ('*', NotationToken::Star),
        ('+', NotationToken::Plus),
        ('?', NotationToken::QMark),
        ('|', NotationToken::Pipe),
        (';', NotationToken::SemiColon),
    ]
});

/// Characters that can never appear in a notation identifier: the reserved
/// set plus the structural single characters.
static IDENT_EXCLUDED: Lazy<String> = Lazy::new(|| {
    let mut out = String::from(RESERVED_CHARS);
    for (ch, _) in SINGLE_CH_TOKENS.iter() {
        if !out.contains(*ch) {
            out.push(*ch);
        }
    }
    out
});

pub fn is_ident_char(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_ascii_digit() && !IDENT_EXCLUDED.contains(ch)
}

/// Assemble the notation tokenizer over `input`.
pub fn notation_tokenizer(input: &str) -> Tokenizer<'_, NotationToken> {
    Tokenizer::new(input)
        .skip_matcher(Matcher::Spaces {
            tag: NotationToken::Spaces,
        })
        .skip_matcher(Matcher::StartStop {
            tag: NotationToken::Comment,
            start: "/*".to_string(),
            end: "*/".to_string(),
        })
        .skip_matcher(Matcher::LineComment {
            tag: NotationToken::Comment,
            start: "//".to_string(),
        })
        .matcher(Matcher::StartStop {
            tag: NotationToken::Str,
            start: "'".to_string(),
            end: "'".to_string(),
        })
        .matcher(Matcher::StartStop {
            tag: NotationToken::Str,
            start: "\"".to_string(),
            end: "\"".to_string(),
        })
        .matcher(Matcher::StartStop {
            tag: NotationToken::Regex,
            start: "/".to_string(),
            end: "/".to_string(),
        })
        .matcher(Matcher::Literal {
            tag: NotationToken::Arrow,
            text: "->".to_string(),
        })
        .matcher(Matcher::Number {
            tag: NotationToken::Number,
        })
        .matcher(Matcher::Ident {
            tag: NotationToken::Ident,
            pct_tag: NotationToken::PctIdent,
            excluded: IDENT_EXCLUDED.clone(),
        })
        .matcher(Matcher::SingleChar {
            table: SINGLE_CH_TOKENS.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::token::TokenValue;

    fn tags_of(input: &str) -> Vec<NotationToken> {
        notation_tokenizer(input)
            .map(|r| r.unwrap().tag)
            .collect()
    }

    #[test]
    fn test_arrow_is_one_token() {
        let mut t = notation_tokenizer("->");
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, NotationToken::Arrow);
        assert_eq!(tok.span, 0..2);
        assert_eq!(t.next_token().unwrap(), None);
    }

    #[test]
    fn test_comments_contribute_no_tokens() {
        let mut t = notation_tokenizer("// comment\nabc");
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, NotationToken::Ident);
        assert_eq!(tok.value, TokenValue::Text("abc".to_string()));
        assert_eq!(t.next_token().unwrap(), None);
    }

    #[test]
    fn test_block_comment_skipped_before_regex() {
        // "/*" must be tried before the "/" regex delimiter.
        assert_eq!(
            tags_of("/* note */ x /y/"),
            vec![NotationToken::Ident, NotationToken::Regex]
        );
    }

    #[test]
    fn test_string_value_strips_delimiters() {
        let mut t = notation_tokenizer("'hello'");
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, NotationToken::Str);
        assert_eq!(tok.value, TokenValue::Text("hello".to_string()));
        assert_eq!(tok.span, 0..7);
    }

    #[test]
    fn test_unterminated_string_is_a_lexical_error() {
        let mut t = notation_tokenizer("'unterminated");
        let err = t.next_token().unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn test_directive_identifiers() {
        let mut t = notation_tokenizer("%start expr");
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, NotationToken::PctIdent);
        assert_eq!(tok.value, TokenValue::Text("start".to_string()));
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, NotationToken::Ident);
    }

    #[test]
    fn test_bare_sigil_is_an_empty_directive() {
        let mut t = notation_tokenizer("% ");
        let tok = t.next_token().unwrap().unwrap();
        assert_eq!(tok.tag, NotationToken::PctIdent);
        assert_eq!(tok.value, TokenValue::Text(String::new()));
    }

    #[test]
    fn test_full_production_line() {
        assert_eq!(
            tags_of("expr -> expr '+' term | term ;"),
            vec![
                NotationToken::Ident,
                NotationToken::Arrow,
                NotationToken::Ident,
                NotationToken::Str,
                NotationToken::Ident,
                NotationToken::Pipe,
                NotationToken::Ident,
                NotationToken::SemiColon,
            ]
        );
    }

    #[test]
    fn test_quantifiers_and_grouping() {
        assert_eq!(
            tags_of("( a ) * + ? [ b ]"),
            vec![
                NotationToken::OpenParen,
                NotationToken::Ident,
                NotationToken::CloseParen,
                NotationToken::Star,
                NotationToken::Plus,
                NotationToken::QMark,
                NotationToken::OpenSq,
                NotationToken::Ident,
                NotationToken::CloseSq,
            ]
        );
    }

    #[test]
    fn test_tokenizing_twice_is_identical() {
        let src = "a -> 'x' /y+/ 12 ;";
        let first: Vec<_> = notation_tokenizer(src).map(|r| r.unwrap()).collect();
        let second: Vec<_> = notation_tokenizer(src).map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
    }
}
