//! Parse trees.
//!
//! A node is either a leaf (a shifted token) or an interior node labeled by
//! the non-terminal of the production that reduced it. Every node carries
//! the byte-span hull of the input it covers, so a node's source text is a
//! direct slice of the original input; a node produced by an empty
//! production covers nothing and has no span.

use crate::grammar::{Grammar, RuleId, SymId};
use crate::lexing::token::TokenValue;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub sym: SymId,
    /// The production that built this node; `None` for leaves.
    pub rule: Option<RuleId>,
    /// The token value for leaves; for interior nodes, whatever the
    /// production's action propagated (empty when there is none).
    pub value: TokenValue,
    pub span: Option<Range<usize>>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(sym: SymId, value: TokenValue, span: Range<usize>) -> Node {
        Node {
            sym,
            rule: None,
            value,
            span: Some(span),
            children: Vec::new(),
        }
    }

    pub fn interior(sym: SymId, rule: RuleId, value: TokenValue, children: Vec<Node>) -> Node {
        let span = span_hull(&children);
        Node {
            sym,
            rule: Some(rule),
            value,
            span,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.rule.is_none()
    }

    /// The slice of the original input this node covers.
    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        match &self.span {
            Some(span) => &source[span.clone()],
            None => "",
        }
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Node>) {
        if self.is_leaf() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Recursive indented dump, depth-unbounded.
    pub fn debug_string(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        self.debug_into(grammar, 0, &mut out);
        out
    }

    fn debug_into(&self, grammar: &Grammar, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&grammar.sym(self.sym).name);
        match &self.value {
            TokenValue::Empty => {}
            value => {
                out.push_str(" - ");
                out.push_str(&value.to_string());
            }
        }
        out.push('\n');
        for child in &self.children {
            child.debug_into(grammar, depth + 1, out);
        }
    }
}

/// The covering span of a node sequence, ignoring empty nodes.
fn span_hull(children: &[Node]) -> Option<Range<usize>> {
    let start = children.iter().find_map(|c| c.span.as_ref())?.start;
    let end = children.iter().rev().find_map(|c| c.span.as_ref())?.end;
    Some(start..end)
}

/// A completed parse: the input text and the root node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseTree {
    pub source: String,
    pub root: Node,
}

impl ParseTree {
    pub fn new(source: &str, root: Node) -> Self {
        ParseTree {
            source: source.to_string(),
            root,
        }
    }

    /// The source text covered by the root node.
    pub fn source_text(&self) -> &str {
        self.root.source_text(&self.source)
    }

    /// The semantic value attached at the root.
    pub fn value(&self) -> &TokenValue {
        &self.root.value
    }

    pub fn leaves(&self) -> Vec<&Node> {
        self.root.leaves()
    }

    pub fn debug_string(&self, grammar: &Grammar) -> String {
        self.root.debug_string(grammar)
    }
}
