//! mscc-lex - Lexical analysis for MathScript.
//!
//! The lexer turns a UTF-8 source buffer into a flat token list the parser
//! indexes with arbitrary positive lookahead. Token categories:
//!
//! 1. Literals: numbers, strings, and the template-literal family
//!    (`TemplateString` for `` `plain` ``, or a `TemplateStart` /
//!    `TemplateExpr` / `TemplateMiddle` / `TemplateEnd` run when `${}`
//!    interpolations are present).
//! 2. Mathematical Unicode: the constants π ℯ φ ∞ and the operator set
//!    (× ÷ − ± √ arrows comparisons set-theory calculus), plus superscript
//!    and subscript digits, classified before ordinary digits.
//! 3. Keywords: the JavaScript core set, the MathScript extensions
//!    (`fast` and friends), and the numeric type names.
//! 4. ASCII operators and punctuation, longest-match first
//!    (`===` before `==` before `=`).
//! 5. `Newline` (a statement terminator) and the final `Eof`.
//!
//! Errors carry `(line, column)` and a ±20-character context window with a
//! caret. The first error aborts the scan.

pub mod cursor;
pub mod lexer;
pub mod token;
pub mod unicode;

pub use lexer::Lexer;
pub use token::{keyword_from_ident, Token, TokenKind};

use mscc_util::LexError;

/// Tokenizes MathScript source.
///
/// Returns the full token list terminated by [`TokenKind::Eof`], or the
/// first [`LexError`].
///
/// # Example
///
/// ```
/// use mscc_lex::{tokenize, TokenKind};
///
/// let tokens = tokenize("let a = π;").unwrap();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Let,
///         TokenKind::Identifier,
///         TokenKind::Assign,
///         TokenKind::MathPi,
///         TokenKind::Semicolon,
///         TokenKind::Eof,
///     ]
/// );
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}
