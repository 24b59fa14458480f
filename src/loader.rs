//! The grammar-definition loader.
//!
//! Reads a grammar written in the EBNF-like notation and produces two
//! artifacts: the [`Grammar`] itself and the [`LexerRules`] for the target
//! language's tokenizer. Productions look like
//!
//! ```text
//! %token NUMBER /\d+/
//! %skip /\s+/
//! expr -> expr '+' term { add } | term { 1 } ;
//! term -> NUMBER ;
//! ```
//!
//! Quoted strings and regex literals in production position implicitly
//! declare terminals along with their lexer rules; `?`, `*`, `+`, `(...)`
//! groups and `[...]` optional groups expand into auxiliary non-terminals.
//! Directives: `%start` overrides the start symbol, `%skip` adds a no-emit
//! lexer rule, `%token` names a terminal and gives it a rule. An identifier
//! first seen on a right-hand side is assumed terminal until a declaration
//! for it appears.
//!
//! Generated lexer rules carry priorities so the assembled pipeline tries
//! skips first, then literal tokens, then regex tokens, regardless of the
//! order they appeared in the definition.

use crate::errors::{EngineError, GrammarError, LexicalError, SyntaxError};
use crate::grammar::{Grammar, RuleAction, SymId};
use crate::lexing::matcher::{Matcher, Tokenizer};
use crate::lexing::notation::{notation_tokenizer, NotationToken};
use crate::lexing::token::{Token, TokenBuffer, TokenValue};
use regex::Regex;

/// One generated lexer rule: a matcher tagged with the terminal's label.
#[derive(Debug, Clone)]
pub struct LexerRule {
    pub label: String,
    pub matcher: Matcher<String>,
    pub priority: u32,
    pub skip: bool,
    /// Name of a caller-registered token handler, when one was declared.
    pub handler: Option<String>,
}

/// The lexer specification a grammar definition produces.
///
/// Rules accumulate during loading and are assembled into a [`Tokenizer`]
/// per input, ordered by descending priority (ties keep declaration
/// order).
#[derive(Debug, Clone, Default)]
pub struct LexerRules {
    rules: Vec<LexerRule>,
}

impl LexerRules {
    /// Register a rule. A label already present is left untouched, so a
    /// literal used in several productions yields one rule.
    pub fn add(&mut self, rule: LexerRule) {
        if !self.has_label(&rule.label) {
            self.rules.push(rule);
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.rules.iter().any(|r| r.label == label)
    }

    pub fn rules(&self) -> &[LexerRule] {
        &self.rules
    }

    /// Assemble the matcher pipeline over one input.
    pub fn tokenizer<'a>(&self, input: &'a str) -> Tokenizer<'a, String> {
        let mut ordered: Vec<&LexerRule> = self.rules.iter().collect();
        ordered.sort_by_key(|r| std::cmp::Reverse(r.priority));
        let mut tokenizer = Tokenizer::new(input);
        for rule in ordered {
            tokenizer = if rule.skip {
                tokenizer.skip_matcher(rule.matcher.clone())
            } else {
                tokenizer.matcher(rule.matcher.clone())
            };
        }
        tokenizer
    }
}

/// Load a grammar definition with left-recursive quantifier expansion.
pub fn load(input: &str) -> Result<(Grammar, LexerRules), EngineError> {
    load_with(input, true)
}

/// Load a grammar definition; `left_recursive` picks the expansion
/// direction for `*` and `+`.
pub fn load_with(input: &str, left_recursive: bool) -> Result<(Grammar, LexerRules), EngineError> {
    let mut source = notation_tokenizer(input);
    let mut loader = Loader {
        grammar: Grammar::new(),
        lexer: LexerRules::default(),
        left_recursive,
        toks: TokenBuffer::new(Box::new(move || source.next_token())),
    };
    loader.parse_grammar()?;
    Ok((loader.grammar, loader.lexer))
}

type NotationSource<'a> =
    Box<dyn FnMut() -> Result<Option<Token<NotationToken>>, LexicalError> + 'a>;

struct Loader<'a> {
    grammar: Grammar,
    lexer: LexerRules,
    left_recursive: bool,
    toks: TokenBuffer<NotationToken, NotationSource<'a>>,
}

use NotationToken as T;

impl Loader<'_> {
    fn parse_grammar(&mut self) -> Result<(), EngineError> {
        loop {
            let tag = match self.toks.peek(0)? {
                Some(tok) => tok.tag,
                None => return Ok(()),
            };
            match tag {
                T::Ident => self.parse_decl()?,
                T::PctIdent => {
                    let tok = self.toks.expect(&[T::PctIdent])?;
                    let directive = tok.value.to_string();
                    self.parse_directive(&directive)?;
                }
                _ => {
                    self.toks.expect(&[T::Ident, T::PctIdent])?;
                }
            }
        }
    }

    fn parse_directive(&mut self, directive: &str) -> Result<(), EngineError> {
        match directive {
            "start" => {
                let name = self.toks.expect(&[T::Ident])?.value.to_string();
                let sym = self.ensure_symbol(&name, false)?;
                self.grammar.set_start(sym);
                Ok(())
            }
            "skip" => {
                let mut rule = self.parse_lexer_rule(None, 30, true)?;
                rule.handler = self.parse_token_handler()?;
                self.lexer.add(rule);
                Ok(())
            }
            "token" => {
                let name = self.toks.expect(&[T::Ident, T::Str])?;
                let label = match name.tag {
                    T::Str => format!("\"{}\"", name.value),
                    _ => name.value.to_string(),
                };
                let mut rule = self.parse_lexer_rule(Some(label.clone()), 0, false)?;
                rule.handler = self.parse_token_handler()?;
                self.lexer.add(rule);
                self.ensure_symbol(&label, true)?;
                Ok(())
            }
            other => Err(GrammarError::InvalidDirective {
                name: other.to_string(),
            }
            .into()),
        }
    }

    /// The regex-or-literal part of a `%token`/`%skip` directive.
    ///
    /// Literal patterns sit above regex patterns within the same priority
    /// band; `base` lifts skip rules above both token bands.
    fn parse_lexer_rule(
        &mut self,
        label: Option<String>,
        base: u32,
        skip: bool,
    ) -> Result<LexerRule, EngineError> {
        let tok = self.toks.expect(&[T::Str, T::Number, T::Regex])?;
        let (label, matcher, priority) = match (tok.tag, &tok.value) {
            (T::Regex, TokenValue::Text(pattern)) => {
                let label = label.unwrap_or_else(|| format!("/{}/", pattern));
                let regex = compile_pattern(pattern)?;
                (
                    label.clone(),
                    Matcher::Pattern { tag: label, regex },
                    base + 10,
                )
            }
            (_, value) => {
                let text = value.to_string();
                let label = label.unwrap_or_else(|| format!("\"{}\"", text));
                (
                    label.clone(),
                    Matcher::Literal {
                        tag: label,
                        text,
                    },
                    base + 20,
                )
            }
        };
        Ok(LexerRule {
            label,
            matcher,
            priority,
            skip,
            handler: None,
        })
    }

    /// An optional `{ name }` handler reference after a lexer rule.
    fn parse_token_handler(&mut self) -> Result<Option<String>, EngineError> {
        if self.toks.consume_if(&[T::OpenBrace])?.is_none() {
            return Ok(None);
        }
        let name = self.toks.expect(&[T::Ident])?.value.to_string();
        self.toks.expect(&[T::CloseBrace])?;
        Ok(Some(name))
    }

    fn parse_decl(&mut self) -> Result<(), EngineError> {
        let name = self.toks.expect(&[T::Ident])?.value.to_string();
        self.toks.expect(&[T::Arrow])?;
        let lhs = match self.grammar.by_name(&name) {
            Some(sym) if sym.terminal => {
                let id = sym.id;
                self.grammar.make_non_terminal(id);
                id
            }
            Some(sym) => sym.id,
            None => self.grammar.non_terminal(&name)?,
        };
        for (rhs, action) in self.parse_productions()? {
            self.grammar.add_rule_with_action(lhs, rhs, action)?;
        }
        self.toks.expect(&[T::SemiColon])?;
        Ok(())
    }

    /// A `|`-separated list of productions, each with an optional action.
    fn parse_productions(
        &mut self,
    ) -> Result<Vec<(Vec<SymId>, Option<RuleAction>)>, EngineError> {
        let mut out = Vec::new();
        loop {
            out.push(self.parse_prod()?);
            if self.toks.consume_if(&[T::Pipe])?.is_none() {
                return Ok(out);
            }
        }
    }

    /// One production: a symbol sequence, then an optional `{ ... }` action.
    fn parse_prod(&mut self) -> Result<(Vec<SymId>, Option<RuleAction>), EngineError> {
        let mut out: Vec<SymId> = Vec::new();
        loop {
            let ends_prod = self.toks.next_matches(&[
                T::CloseParen,
                T::CloseSq,
                T::SemiColon,
                T::Pipe,
                T::OpenBrace,
            ])?;
            if ends_prod || self.toks.peek(0)?.is_none() {
                break;
            }

            let mut seq: Vec<SymId>;
            if self.toks.consume_if(&[T::OpenParen])?.is_some() {
                let alternatives = self.parse_productions()?;
                self.toks.expect(&[T::CloseParen])?;
                seq = self.group_symbol(alternatives, false)?;
            } else if self.toks.consume_if(&[T::OpenSq])?.is_some() {
                let alternatives = self.parse_productions()?;
                self.toks.expect(&[T::CloseSq])?;
                seq = self.group_symbol(alternatives, true)?;
            } else {
                let tok = self
                    .toks
                    .expect(&[T::Ident, T::Str, T::Number, T::Regex, T::OpenParen, T::OpenSq])?;
                seq = vec![self.production_atom(tok)?];
            }

            if self.toks.consume_if(&[T::Star])?.is_some() {
                let sym = self.seq_symbol(seq)?;
                seq = sym
                    .map(|s| self.grammar.at_least_zero(s, self.left_recursive))
                    .transpose()?
                    .into_iter()
                    .collect();
            } else if self.toks.consume_if(&[T::Plus])?.is_some() {
                let sym = self.seq_symbol(seq)?;
                seq = sym
                    .map(|s| self.grammar.at_least_one(s, self.left_recursive))
                    .transpose()?
                    .into_iter()
                    .collect();
            } else if self.toks.consume_if(&[T::QMark])?.is_some() {
                let sym = self.seq_symbol(seq)?;
                seq = sym
                    .map(|s| self.grammar.opt(s))
                    .transpose()?
                    .into_iter()
                    .collect();
            }
            out.extend(seq);
        }

        let mut action = None;
        if self.toks.consume_if(&[T::OpenBrace])?.is_some() {
            let tok = self.toks.expect(&[T::Number, T::Ident])?;
            action = Some(match &tok.value {
                TokenValue::Num(n) => RuleAction::ChildPos(*n as usize),
                value => RuleAction::Name(value.to_string()),
            });
            self.toks.expect(&[T::CloseBrace])?;
        }
        Ok((out, action))
    }

    /// A single terminal-or-non-terminal occurrence in a production.
    ///
    /// Strings, numbers and regexes also register their lexer rule.
    fn production_atom(&mut self, tok: Token<NotationToken>) -> Result<SymId, EngineError> {
        let label = match tok.tag {
            T::Str | T::Number => {
                let text = tok.value.to_string();
                let label = format!("\"{}\"", text);
                self.lexer.add(LexerRule {
                    label: label.clone(),
                    matcher: Matcher::Literal {
                        tag: label.clone(),
                        text,
                    },
                    priority: 20,
                    skip: false,
                    handler: None,
                });
                label
            }
            T::Regex => {
                let pattern = tok.value.to_string();
                let label = format!("/{}/", pattern);
                let regex = compile_pattern(&pattern)?;
                self.lexer.add(LexerRule {
                    label: label.clone(),
                    matcher: Matcher::Pattern {
                        tag: label.clone(),
                        regex,
                    },
                    priority: 10,
                    skip: false,
                    handler: None,
                });
                label
            }
            _ => tok.value.to_string(),
        };
        Ok(self.ensure_symbol(&label, true)?)
    }

    /// Collapse a parenthesized or bracketed group into symbols.
    fn group_symbol(
        &mut self,
        alternatives: Vec<(Vec<SymId>, Option<RuleAction>)>,
        optional: bool,
    ) -> Result<Vec<SymId>, EngineError> {
        let mut seqs: Vec<Vec<SymId>> = alternatives.into_iter().map(|(seq, _)| seq).collect();
        seqs.retain(|seq| !seq.is_empty());
        let inner = match seqs.len() {
            0 => return Ok(Vec::new()),
            1 if !optional => return Ok(seqs.remove(0)),
            1 => self.seq_symbol(seqs.remove(0))?,
            _ => Some(self.grammar.any_of(seqs)?),
        };
        match (inner, optional) {
            (Some(sym), true) => Ok(vec![self.grammar.opt(sym)?]),
            (Some(sym), false) => Ok(vec![sym]),
            (None, _) => Ok(Vec::new()),
        }
    }

    /// A single symbol standing for a sequence, so a quantifier or an
    /// optional wrapper has something to apply to.
    fn seq_symbol(&mut self, seq: Vec<SymId>) -> Result<Option<SymId>, GrammarError> {
        match seq.len() {
            0 => Ok(None),
            1 => Ok(Some(seq[0])),
            _ => Ok(Some(self.grammar.any_of(vec![seq])?)),
        }
    }

    fn ensure_symbol(&mut self, label: &str, assumed_terminal: bool) -> Result<SymId, GrammarError> {
        if let Some(sym) = self.grammar.by_name(label) {
            return Ok(sym.id);
        }
        if assumed_terminal {
            self.grammar.terminal(label)
        } else {
            self.grammar.non_terminal(label)
        }
    }
}

/// Compile a rule pattern anchored to the match position.
fn compile_pattern(pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(&format!(r"\A(?:{})", pattern)).map_err(|e| GrammarError::InvalidRegex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
