//! Structured error taxonomy for the engine.
//!
//! Three failure domains exist, matching the three phases a grammar goes
//! through: definition (compiling the grammar itself), tokenization of an
//! input, and parsing of an input. Each domain has its own type carrying the
//! position and context needed to act on the failure; `EngineError` is the
//! aggregate the public entry points return.
//!
//! None of these are ever logged-and-swallowed internally: every failure
//! propagates to the immediate caller as a value.

use std::fmt;

/// Errors detected while building a grammar or its parse table.
///
/// These are always fatal to compilation: the compiler never hands out a
/// partially built table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A terminal is referenced by productions but has no lexer rule, so no
    /// input could ever produce it.
    UndeclaredSymbol { name: String },
    /// A production can never be reached from the start symbol.
    UnreachableRule { rule: String },
    /// The same production was declared twice for one non-terminal.
    DuplicateRule { rule: String },
    /// A name was used both as a terminal and as a non-terminal.
    SymbolKindMismatch { name: String },
    /// An unknown `%`-directive appeared in the grammar definition.
    InvalidDirective { name: String },
    /// A regex literal in the grammar definition failed to compile.
    InvalidRegex { pattern: String, message: String },
    /// The grammar declares no start symbol (no non-auxiliary non-terminal
    /// and no `%start` directive).
    MissingStartSymbol,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UndeclaredSymbol { name } => {
                write!(f, "undeclared symbol '{}': no token rule produces it", name)
            }
            GrammarError::UnreachableRule { rule } => {
                write!(f, "unreachable production: {}", rule)
            }
            GrammarError::DuplicateRule { rule } => {
                write!(f, "duplicate production: {}", rule)
            }
            GrammarError::SymbolKindMismatch { name } => {
                write!(f, "symbol '{}' used as both terminal and non-terminal", name)
            }
            GrammarError::InvalidDirective { name } => {
                write!(f, "invalid directive: %{}", name)
            }
            GrammarError::InvalidRegex { pattern, message } => {
                write!(f, "invalid regex /{}/: {}", pattern, message)
            }
            GrammarError::MissingStartSymbol => {
                write!(f, "grammar has no start symbol")
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// No matcher accepted the input at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lexical error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for LexicalError {}

/// A token had no valid table action in the current parser state.
///
/// `expected` lists the terminals that would have been accepted, in the
/// grammar's canonical symbol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub found: String,
    pub expected: Vec<String>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syntax error at offset {}: found {}, expected one of [{}]",
            self.offset,
            self.found,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Aggregate error returned by the public compile/tokenize/parse surface.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Grammar(GrammarError),
    Lexical(LexicalError),
    Syntax(SyntaxError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Grammar(e) => write!(f, "{}", e),
            EngineError::Lexical(e) => write!(f, "{}", e),
            EngineError::Syntax(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<GrammarError> for EngineError {
    fn from(e: GrammarError) -> Self {
        EngineError::Grammar(e)
    }
}

impl From<LexicalError> for EngineError {
    fn from(e: LexicalError) -> Self {
        EngineError::Lexical(e)
    }
}

impl From<SyntaxError> for EngineError {
    fn from(e: SyntaxError) -> Self {
        EngineError::Syntax(e)
    }
}
