//! mscc-par - Recursive-descent parser for MathScript.
//!
//! The parser consumes the lexer's token list with one-token lookahead by
//! default and bounded positional peeks for the three ambiguities the
//! grammar admits:
//!
//! 1. Arrow function vs. parenthesized expression: scan to the matching
//!    `)` and look for `=>`.
//! 2. Mathematical function `f(x) = expr` vs. expression statement: scan
//!    past the parameter list and look for `=`.
//! 3. `for (init; ...; ...)` vs. `for (x of ...)`: skip an optional
//!    `let`/`const`/`var` and look for `of` after the identifier.
//!
//! All three probes are pure `&self` predicates over the token vector —
//! they never move the cursor, so a failed probe trivially leaves the
//! parser state unchanged.
//!
//! Statement terminators (`;`, newline, EOF) are interchangeable and
//! consumed opportunistically after each statement. Newlines are also
//! skipped inside bracketed constructs and after consumed operators, so
//! multi-line literals and call chains parse.
//!
//! The parser does not recover: the first error terminates compilation.

pub mod ast;
mod expr;
mod pattern;
mod stmt;

pub use ast::*;

use mscc_lex::{Token, TokenKind};
use mscc_util::{ParseError, Span};

/// Parses a token list into a [`Program`].
///
/// # Example
///
/// ```
/// let tokens = mscc_lex::tokenize("let x = 1;").unwrap();
/// let program = mscc_par::parse(tokens).unwrap();
/// assert_eq!(program.statements.len(), 1);
/// ```
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

/// Recursive-descent parser state.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// True while parsing a function body; gates `return`.
    in_function: bool,
    /// True while parsing a loop body; gates `break`/`continue`.
    in_loop: bool,
    /// True while parsing a class body.
    in_class: bool,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // The lexer always terminates the stream with Eof; guard anyway so
        // position clamping below stays trivially safe.
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column))
                .unwrap_or((1, 1));
            tokens.push(Token::eof(line, column));
        }
        Self {
            tokens,
            position: 0,
            in_function: false,
            in_loop: false,
            in_class: false,
        }
    }

    /// Parses the complete program.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if self.match_kind(TokenKind::Newline) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    // -----------------------------------------------------------------------
    // Lookahead predicates — pure, cursor untouched
    // -----------------------------------------------------------------------

    /// `IDENTIFIER (` ... `) =` at the current position.
    pub(crate) fn is_mathematical_function(&self) -> bool {
        if !self.check(TokenKind::Identifier) {
            return false;
        }
        if self.kind_at(self.position + 1) != Some(TokenKind::LParen) {
            return false;
        }
        let mut i = self.position + 2;
        let mut depth = 1usize;
        while i < self.tokens.len() && depth > 0 {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        depth == 0 && self.kind_at(i) == Some(TokenKind::Assign)
    }

    /// `(` ... `) =>` at the current position.
    pub(crate) fn is_arrow_ahead(&self) -> bool {
        if !self.check(TokenKind::LParen) {
            return false;
        }
        let mut i = self.position + 1;
        let mut depth = 1usize;
        while i < self.tokens.len() && depth > 0 {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        depth == 0 && self.kind_at(i) == Some(TokenKind::Arrow)
    }

    /// `[let|const|var] IDENTIFIER of` at the current position.
    pub(crate) fn is_for_of_pattern(&self) -> bool {
        let mut i = self.position;
        if matches!(
            self.kind_at(i),
            Some(TokenKind::Let | TokenKind::Const | TokenKind::Var)
        ) {
            i += 1;
        }
        if self.kind_at(i) != Some(TokenKind::Identifier) {
            return false;
        }
        self.kind_at(i + 1) == Some(TokenKind::Of)
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    // -----------------------------------------------------------------------
    // Token-stream helpers
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, distance: usize) -> Option<&Token> {
        self.tokens.get(self.position + distance)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Consumes and returns the current token. At EOF returns the Eof token
    /// without moving.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_any(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        let kind = self.peek().kind;
        if kinds.contains(&kind) {
            self.advance();
            Some(kind)
        } else {
            None
        }
    }

    /// Consumes a token of the expected kind or reports what was found.
    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(ParseError::new(
                token.line,
                token.column,
                format!("{}. Got {:?}: '{}'", message, token.kind, token.lexeme),
            ))
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    pub(crate) fn check_statement_terminator(&self) -> bool {
        self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) || self.is_at_end()
    }

    /// Consumes one `;` or newline if present. Terminators are optional.
    pub(crate) fn consume_statement_terminator(&mut self) {
        if !self.match_kind(TokenKind::Semicolon) {
            self.match_kind(TokenKind::Newline);
        }
    }

    pub(crate) fn span_here(&self) -> Span {
        self.peek().span()
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        let token = self.peek();
        ParseError::new(token.line, token.column, message)
    }

    /// Type annotation: a base name with optional `<...>` generic
    /// arguments, kept as text (annotations are parsed, never enforced).
    pub(crate) fn parse_type_annotation(&mut self) -> Result<String, ParseError> {
        let base = if self.check(TokenKind::Identifier) || self.peek().kind.is_type_keyword() {
            self.advance().lexeme
        } else {
            return Err(self.error_here("Expected type in type annotation"));
        };
        if self.match_kind(TokenKind::Less) {
            let mut args = vec![self.parse_type_annotation()?];
            while self.match_kind(TokenKind::Comma) {
                args.push(self.parse_type_annotation()?);
            }
            self.consume(
                TokenKind::Greater,
                "Expected '>' after generic type arguments",
            )?;
            Ok(format!("{}<{}>", base, args.join(", ")))
        } else {
            Ok(base)
        }
    }

    /// Function parameter list, stopping before the closing `)`.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            if self.match_kind(TokenKind::DotDotDot) {
                let name = self
                    .consume(TokenKind::Identifier, "Expected parameter name after '...'")?
                    .lexeme;
                params.push(Param {
                    name,
                    type_annotation: None,
                    default: None,
                    is_rest: true,
                });
                self.skip_newlines();
                break;
            }
            let name = self
                .consume(TokenKind::Identifier, "Expected parameter name")?
                .lexeme;
            let type_annotation = if self.match_kind(TokenKind::Colon) {
                Some(self.parse_type_annotation()?)
            } else {
                None
            };
            let default = if self.match_kind(TokenKind::Assign) {
                self.skip_newlines();
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            params.push(Param {
                name,
                type_annotation,
                default,
                is_rest: false,
            });
            self.skip_newlines();
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_newlines();
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_src(source: &str) -> Result<Program, ParseError> {
        parse(mscc_lex::tokenize(source).unwrap())
    }

    #[test]
    fn empty_program() {
        let program = parse_src("").unwrap();
        assert!(program.statements.is_empty());
    }

    #[test]
    fn newlines_are_skipped_at_top_level() {
        let program = parse_src("\n\nlet x = 1;\n\nlet y = 2;\n").unwrap();
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn math_function_lookahead() {
        let parser = Parser::new(mscc_lex::tokenize("f(x) = x + 1;").unwrap());
        assert!(parser.is_mathematical_function());
        // Lookahead never moves the cursor.
        assert_eq!(parser.position, 0);

        let parser = Parser::new(mscc_lex::tokenize("f(x) + 1;").unwrap());
        assert!(!parser.is_mathematical_function());
        assert_eq!(parser.position, 0);
    }

    #[test]
    fn math_function_lookahead_handles_nested_parens() {
        let parser = Parser::new(mscc_lex::tokenize("f(g(x)) + 1").unwrap());
        assert!(!parser.is_mathematical_function());
    }

    #[test]
    fn arrow_lookahead() {
        let parser = Parser::new(mscc_lex::tokenize("(a, b) => a").unwrap());
        assert!(parser.is_arrow_ahead());
        assert_eq!(parser.position, 0);

        let parser = Parser::new(mscc_lex::tokenize("(a + b) * c").unwrap());
        assert!(!parser.is_arrow_ahead());
        assert_eq!(parser.position, 0);
    }

    #[test]
    fn arrow_lookahead_unclosed_paren() {
        let parser = Parser::new(mscc_lex::tokenize("(a, b").unwrap());
        assert!(!parser.is_arrow_ahead());
    }

    #[test]
    fn for_of_lookahead() {
        for source in ["n of xs", "let n of xs", "const n of xs", "var n of xs"] {
            let parser = Parser::new(mscc_lex::tokenize(source).unwrap());
            assert!(parser.is_for_of_pattern(), "{}", source);
            assert_eq!(parser.position, 0);
        }
        let parser = Parser::new(mscc_lex::tokenize("let n = 0").unwrap());
        assert!(!parser.is_for_of_pattern());
    }

    #[test]
    fn type_annotations_parse() {
        let program = parse_src("let x: int32 = 1; let m: Array<float64> = [];").unwrap();
        match (&program.statements[0], &program.statements[1]) {
            (Stmt::VarDecl(a), Stmt::VarDecl(b)) => {
                assert_eq!(a.declarators[0].type_annotation.as_deref(), Some("int32"));
                assert_eq!(
                    b.declarators[0].type_annotation.as_deref(),
                    Some("Array<float64>")
                );
            }
            other => panic!("unexpected statements: {:?}", other),
        }
    }

    #[test]
    fn first_error_terminates() {
        let err = parse_src("let = 5;").unwrap_err();
        assert!(err.message.contains("Expected identifier"), "{}", err.message);
    }

    #[test]
    fn statement_terminators_are_interchangeable() {
        assert!(parse_src("let a = 1; let b = 2").is_ok());
        assert!(parse_src("let a = 1\nlet b = 2").is_ok());
        assert!(parse_src("let a = 1").is_ok());
    }

    #[test]
    fn node_spans_are_nondecreasing() {
        let program = parse_src("let a = 1;\nlet b = 2;\nf(x) = x;").unwrap();
        let spans: Vec<u32> = program
            .statements
            .iter()
            .map(|s| match s {
                Stmt::VarDecl(d) => d.span.line,
                Stmt::FunctionDecl(f) => f.span.line,
                other => panic!("unexpected statement {:?}", other),
            })
            .collect();
        let mut sorted = spans.clone();
        sorted.sort_unstable();
        assert_eq!(spans, sorted);
    }
}
