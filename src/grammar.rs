//! The grammar model: symbols, productions and the builder that owns them.
//!
//! A [`Grammar`] hands out symbol and rule identifiers as elements are
//! registered; identifiers are insertion indices, so identity and ordering
//! are properties of one grammar value, not of any process-wide state.
//! The canonical symbol order used for every deterministic output is:
//! terminals before non-terminals, then ascending creation order.
//!
//! EBNF sugar (`?`, `*`, `+`, grouped alternatives) is expanded here into
//! auxiliary non-terminals with plain productions, so the table builders
//! only ever see a BNF grammar. Auxiliary expansions are cached by shape:
//! writing `x*` twice yields one auxiliary symbol, not two.

pub mod sets;

use crate::errors::GrammarError;
use serde::Serialize;
use std::collections::HashMap;

/// Identifier of a symbol within one grammar. Also its creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SymId(pub usize);

/// Identifier of a production within one grammar. Also its declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RuleId(pub usize);

/// A terminal or non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub id: SymId,
    pub name: String,
    pub terminal: bool,
    /// True for synthesized symbols: EBNF expansion helpers, the end
    /// marker and the augmented start symbol.
    pub aux: bool,
}

/// Semantic value attached to a production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RuleAction {
    /// A named action resolved by the embedding application.
    Name(String),
    /// Propagate the value of the nth child (1-based).
    ChildPos(usize),
}

/// One production: a non-terminal and a (possibly empty) symbol sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub id: RuleId,
    pub lhs: SymId,
    pub rhs: Vec<SymId>,
    pub action: Option<RuleAction>,
}

/// Name of the synthetic end-of-input terminal.
pub const EOF_NAME: &str = "$end";
/// Name of the augmented start symbol.
pub const ACCEPT_NAME: &str = "$accept";

#[derive(Debug, Clone, Default)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymId>,
    rules: Vec<Rule>,
    rules_by_lhs: HashMap<SymId, Vec<RuleId>>,
    /// Auxiliary expansions keyed by shape, for deduplication.
    aux_cache: HashMap<String, SymId>,
    aux_counter: usize,
    start: Option<SymId>,
    augmented: Option<(SymId, RuleId)>,
}

impl Grammar {
    /// A fresh grammar containing only the end-of-input terminal.
    pub fn new() -> Self {
        let mut g = Grammar::default();
        g.intern(EOF_NAME, true, true);
        g
    }

    fn intern(&mut self, name: &str, terminal: bool, aux: bool) -> SymId {
        let id = SymId(self.symbols.len());
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            terminal,
            aux,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// The end-of-input terminal.
    pub fn eof(&self) -> SymId {
        SymId(0)
    }

    pub fn start(&self) -> Option<SymId> {
        self.start
    }

    pub fn set_start(&mut self, id: SymId) {
        self.start = Some(id);
    }

    /// Look up or create a terminal.
    pub fn terminal(&mut self, name: &str) -> Result<SymId, GrammarError> {
        match self.by_name.get(name) {
            Some(&id) if self.symbols[id.0].terminal => Ok(id),
            Some(_) => Err(GrammarError::SymbolKindMismatch {
                name: name.to_string(),
            }),
            None => Ok(self.intern(name, true, false)),
        }
    }

    /// Look up or create a non-terminal. The first non-auxiliary
    /// non-terminal becomes the default start symbol.
    pub fn non_terminal(&mut self, name: &str) -> Result<SymId, GrammarError> {
        match self.by_name.get(name) {
            Some(&id) if !self.symbols[id.0].terminal => Ok(id),
            Some(_) => Err(GrammarError::SymbolKindMismatch {
                name: name.to_string(),
            }),
            None => {
                let id = self.intern(name, false, false);
                if self.start.is_none() {
                    self.start = Some(id);
                }
                Ok(id)
            }
        }
    }

    /// Re-classify a symbol as a non-terminal.
    ///
    /// The grammar loader assumes an identifier first seen in production
    /// position is a terminal; a later declaration for the same name
    /// corrects that here.
    pub fn make_non_terminal(&mut self, id: SymId) {
        let sym = &mut self.symbols[id.0];
        if sym.terminal {
            sym.terminal = false;
            if self.start.is_none() {
                self.start = Some(id);
            }
        }
    }

    pub fn sym(&self, id: SymId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|&id| &self.symbols[id.0])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    /// Productions for a non-terminal, in declaration order.
    pub fn rules_for(&self, lhs: SymId) -> &[RuleId] {
        self.rules_by_lhs.get(&lhs).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_rule(&mut self, lhs: SymId, rhs: Vec<SymId>) -> Result<RuleId, GrammarError> {
        self.add_rule_with_action(lhs, rhs, None)
    }

    pub fn add_rule_with_action(
        &mut self,
        lhs: SymId,
        rhs: Vec<SymId>,
        action: Option<RuleAction>,
    ) -> Result<RuleId, GrammarError> {
        if let Some(ids) = self.rules_by_lhs.get(&lhs) {
            if ids.iter().any(|&id| self.rules[id.0].rhs == rhs) {
                return Err(GrammarError::DuplicateRule {
                    rule: self.describe_production(lhs, &rhs),
                });
            }
        }
        let id = RuleId(self.rules.len());
        self.rules.push(Rule {
            id,
            lhs,
            rhs,
            action,
        });
        self.rules_by_lhs.entry(lhs).or_default().push(id);
        Ok(id)
    }

    /// Human-readable form of one production, used in diagnostics.
    pub fn describe_production(&self, lhs: SymId, rhs: &[SymId]) -> String {
        let rhs_names: Vec<&str> = rhs.iter().map(|&s| self.sym(s).name.as_str()).collect();
        format!("{} -> {}", self.sym(lhs).name, rhs_names.join(" "))
    }

    pub fn describe_rule(&self, id: RuleId) -> String {
        let rule = &self.rules[id.0];
        self.describe_production(rule.lhs, &rule.rhs)
    }

    fn aux_non_terminal(&mut self, key: String) -> SymId {
        let name = format!("${}", self.aux_counter);
        self.aux_counter += 1;
        let id = self.intern(&name, false, true);
        self.aux_cache.insert(key, id);
        id
    }

    fn aux_cached(&self, key: &str) -> Option<SymId> {
        self.aux_cache.get(key).copied()
    }

    /// `x?` — an auxiliary non-terminal deriving `x` or nothing.
    pub fn opt(&mut self, sym: SymId) -> Result<SymId, GrammarError> {
        let key = format!("opt:{}", sym.0);
        if let Some(id) = self.aux_cached(&key) {
            return Ok(id);
        }
        let aux = self.aux_non_terminal(key);
        self.add_rule(aux, vec![sym])?;
        self.add_rule(aux, vec![])?;
        Ok(aux)
    }

    /// Grouped alternatives — one auxiliary production per alternative.
    pub fn any_of(&mut self, alternatives: Vec<Vec<SymId>>) -> Result<SymId, GrammarError> {
        let mut parts: Vec<String> = alternatives
            .iter()
            .map(|alt| {
                alt.iter()
                    .map(|s| s.0.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        parts.sort();
        let key = format!("anyof:{}", parts.join("|"));
        if let Some(id) = self.aux_cached(&key) {
            return Ok(id);
        }
        let aux = self.aux_non_terminal(key);
        for alt in alternatives {
            self.add_rule(aux, alt)?;
        }
        Ok(aux)
    }

    /// `x*` — zero or more, left- or right-recursive.
    pub fn at_least_zero(&mut self, sym: SymId, left: bool) -> Result<SymId, GrammarError> {
        let key = format!("atleast0:{}:{}", sym.0, left);
        if let Some(id) = self.aux_cached(&key) {
            return Ok(id);
        }
        let aux = self.aux_non_terminal(key);
        if left {
            self.add_rule(aux, vec![aux, sym])?;
        } else {
            self.add_rule(aux, vec![sym, aux])?;
        }
        self.add_rule(aux, vec![])?;
        Ok(aux)
    }

    /// `x+` — one or more, left- or right-recursive.
    pub fn at_least_one(&mut self, sym: SymId, left: bool) -> Result<SymId, GrammarError> {
        let key = format!("atleast1:{}:{}", sym.0, left);
        if let Some(id) = self.aux_cached(&key) {
            return Ok(id);
        }
        let aux = self.aux_non_terminal(key);
        if left {
            self.add_rule(aux, vec![aux, sym])?;
        } else {
            self.add_rule(aux, vec![sym, aux])?;
        }
        self.add_rule(aux, vec![sym])?;
        Ok(aux)
    }

    /// Add the `$accept -> start` production. Idempotent.
    pub fn augment(&mut self) -> Result<(), GrammarError> {
        if self.augmented.is_some() {
            return Ok(());
        }
        let start = self.start.ok_or(GrammarError::MissingStartSymbol)?;
        let accept = self.intern(ACCEPT_NAME, false, true);
        let rule = self.add_rule(accept, vec![start])?;
        self.augmented = Some((accept, rule));
        Ok(())
    }

    /// The `($accept, rule)` pair, once augmented.
    pub fn augmented_rule(&self) -> Option<(SymId, RuleId)> {
        self.augmented
    }

    /// All symbols in canonical order: terminals first, then non-terminals,
    /// each group by ascending creation id.
    pub fn sorted_symbols(&self) -> Vec<SymId> {
        let mut ids: Vec<SymId> = self.symbols.iter().map(|s| s.id).collect();
        ids.sort_by_key(|&id| (!self.symbols[id.0].terminal, id));
        ids
    }

    /// Check that every non-terminal with productions is reachable from the
    /// start symbol.
    pub fn check_reachability(&self) -> Result<(), GrammarError> {
        let start = self.start.ok_or(GrammarError::MissingStartSymbol)?;
        let mut reachable = vec![false; self.symbols.len()];
        let mut work = vec![start];
        reachable[start.0] = true;
        while let Some(sym) = work.pop() {
            for &rid in self.rules_for(sym) {
                for &s in &self.rules[rid.0].rhs {
                    if !reachable[s.0] {
                        reachable[s.0] = true;
                        if !self.symbols[s.0].terminal {
                            work.push(s);
                        }
                    }
                }
            }
        }
        if let Some((accept, _)) = self.augmented {
            reachable[accept.0] = true;
        }
        for rule in &self.rules {
            if !reachable[rule.lhs.0] {
                return Err(GrammarError::UnreachableRule {
                    rule: self.describe_rule(rule.id),
                });
            }
        }
        Ok(())
    }
}
