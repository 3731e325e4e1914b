//! Error types shared across compilation phases.
//!
//! Each phase has its own error carrying `(line, column, message)` plus an
//! optional context excerpt; [`CompileError`] is the union the driver hands
//! back to its host. The first error aborts compilation — no partial output
//! ever crosses a phase boundary.

use thiserror::Error;

/// Lexical error: unterminated string or template, unknown character,
/// malformed number exponent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lex error at line {line}, column {column}: {message}")]
pub struct LexError {
    /// Line where the offending byte was found (1-based).
    pub line: u32,
    /// Column where the offending byte was found (1-based).
    pub column: u32,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// A short window of surrounding source with a caret, when available.
    pub context: Option<String>,
}

impl LexError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }

    /// Renders the error with its context excerpt appended, if any.
    pub fn render(&self) -> String {
        match &self.context {
            Some(ctx) => format!("{self}\n{ctx}"),
            None => self.to_string(),
        }
    }
}

/// Syntactic error: unexpected token, missing expected token, or a
/// structural rule violation (`break` outside a loop, `const` without an
/// initializer, rest element not in last position, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Line of the offending token (1-based).
    pub line: u32,
    /// Column of the offending token (1-based).
    pub column: u32,
    /// Message embedding the expected kind, received kind, and lexeme.
    pub message: String,
    /// Optional surrounding-source excerpt.
    pub context: Option<String>,
}

impl ParseError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            context: None,
        }
    }

    pub fn render(&self) -> String {
        match &self.context {
            Some(ctx) => format!("{self}\n{ctx}"),
            None => self.to_string(),
        }
    }
}

/// Internal generator invariant violation. Unreachable on ASTs the parser
/// produces; treated as a bug when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Gen error in {node} node: {message}")]
pub struct GenError {
    /// Kind of the malformed AST node.
    pub node: &'static str,
    /// Description of the violated invariant.
    pub message: String,
}

impl GenError {
    pub fn new(node: &'static str, message: impl Into<String>) -> Self {
        Self {
            node,
            message: message.into(),
        }
    }
}

/// Union of the three phase errors, returned by the driver unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Gen(#[from] GenError),
}

impl CompileError {
    /// Renders the error with its context excerpt appended, if any.
    pub fn render(&self) -> String {
        match self {
            CompileError::Lex(e) => e.render(),
            CompileError::Parse(e) => e.render(),
            CompileError::Gen(e) => e.to_string(),
        }
    }
}
