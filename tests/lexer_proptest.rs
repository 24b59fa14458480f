//! Property-based tests for the notation tokenizer and generated lexers.
//!
//! These pin the framework-level guarantees: tokenizing is deterministic,
//! spans are in-bounds and non-overlapping, and failure never leaves the
//! tokenizer mid-token.

use lrkit::lexing::notation::{notation_tokenizer, NotationToken};
use lrkit::lexing::token::{Token, TokenValue};
use lrkit::LexicalError;
use proptest::prelude::*;

fn collect(input: &str) -> Result<Vec<Token<NotationToken>>, LexicalError> {
    notation_tokenizer(input).collect()
}

/// Identifier-shaped text: no reserved characters, no leading digit.
fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,10}"
}

/// Definition fragments that always tokenize cleanly.
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        ident_strategy(),
        "[1-9][0-9]{0,6}",
        "'[a-z ]{0,8}'",
        "/[a-z]{1,6}/",
        Just("->".to_string()),
        Just(";".to_string()),
        Just("|".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("*".to_string()),
    ]
}

fn definition_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 1..20).prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn test_tokenizing_is_deterministic(input in definition_strategy()) {
        prop_assert_eq!(collect(&input), collect(&input));
    }

    #[test]
    fn test_spans_are_in_bounds_and_ordered(input in definition_strategy()) {
        let tokens = collect(&input).unwrap();
        let mut last_end = 0;
        for tok in &tokens {
            prop_assert!(tok.span.start >= last_end);
            prop_assert!(tok.span.end > tok.span.start);
            prop_assert!(tok.span.end <= input.len());
            last_end = tok.span.end;
        }
    }

    #[test]
    fn test_identifiers_tokenize_whole(input in ident_strategy()) {
        let tokens = collect(&input).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].tag, NotationToken::Ident);
        prop_assert_eq!(tokens[0].value.as_text(), Some(input.as_str()));
        prop_assert_eq!(tokens[0].span.clone(), 0..input.len());
    }

    #[test]
    fn test_numbers_carry_their_integer_value(input in "[1-9][0-9]{0,7}") {
        let tokens = collect(&input).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].tag, NotationToken::Number);
        let expected: i64 = input.parse().unwrap();
        prop_assert_eq!(tokens[0].value.as_num(), Some(expected));
    }

    #[test]
    fn test_string_values_strip_delimiters(inner in "[a-z ]{0,10}") {
        let quoted = format!("'{}'", inner);
        let tokens = collect(&quoted).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].tag, NotationToken::Str);
        prop_assert_eq!(tokens[0].value.clone(), TokenValue::Text(inner));
        prop_assert_eq!(tokens[0].span.clone(), 0..quoted.len());
    }

    #[test]
    fn test_whitespace_shape_never_changes_the_tags(
        parts in prop::collection::vec(fragment_strategy(), 1..10),
        seps in prop::collection::vec(prop_oneof![" ", "  ", "\n", "\t"], 10),
    ) {
        let spaced: String = parts
            .iter()
            .zip(seps.iter().cycle())
            .flat_map(|(p, s)| [p.as_str(), s.as_str()])
            .collect();
        let plain = parts.join(" ");
        let spaced_tags: Vec<NotationToken> =
            collect(&spaced).unwrap().into_iter().map(|t| t.tag).collect();
        let plain_tags: Vec<NotationToken> =
            collect(&plain).unwrap().into_iter().map(|t| t.tag).collect();
        prop_assert_eq!(spaced_tags, plain_tags);
    }

    #[test]
    fn test_single_rule_definitions_round_trip(
        lhs in ident_strategy(),
        lit in "[a-z]{1,5}",
    ) {
        let definition = format!("{} -> '{}' ;", lhs, lit);
        let compiled = lrkit::compile(&definition).unwrap();
        let tree = compiled.parse(&lit).unwrap();
        prop_assert_eq!(tree.source_text(), lit.as_str());
    }
}
