//! The MathScript lexer.
//!
//! Transforms a UTF-8 source buffer into an ordered token list terminated
//! by `Eof`. Whitespace is skipped, `\n` becomes a `Newline` token (it is a
//! statement terminator), comments are discarded, and template literals are
//! decomposed in-line into `TemplateStart` / `TemplateExpr` /
//! `TemplateMiddle` / `TemplateEnd` sequences, with each `${...}` body
//! captured as raw source text for the parser to re-parse.
//!
//! Mathematical Unicode codepoints are classified through the fixed tables
//! in [`crate::unicode`], checked before digit classification so
//! superscript and subscript digits are caught first.

use mscc_util::{excerpt, LexError};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};
use crate::unicode::{is_ident_continue, is_ident_start, is_mathematical, math_constant, math_operator};

/// Radius of the context window attached to lex errors.
const CONTEXT_RADIUS: usize = 20;

/// The lexer state machine.
///
/// Owns a [`Cursor`] for position tracking and accumulates tokens into a
/// vector; a template literal pushes several tokens from one scan.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    token_start: usize,
    token_start_line: u32,
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Tokenizes the entire source.
    ///
    /// Returns a list whose last element is always `Eof`, or the first
    /// [`LexError`] encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        while !self.cursor.is_at_end() {
            self.token_start = self.cursor.position();
            self.token_start_line = self.cursor.line();
            self.token_start_column = self.cursor.column();
            self.scan_token()?;
        }
        self.tokens
            .push(Token::eof(self.cursor.line(), self.cursor.column()));
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let c = self.cursor.current_char();
        match c {
            ' ' | '\r' | '\t' => {
                self.cursor.advance();
                Ok(())
            }
            '\n' => {
                self.cursor.advance();
                self.add_token(TokenKind::Newline);
                Ok(())
            }
            '/' => self.scan_slash(),
            '`' => self.scan_template(),
            '"' | '\'' => self.scan_string(c),
            _ if is_mathematical(c) => {
                self.scan_mathematical(c);
                Ok(())
            }
            _ if c.is_ascii_digit() => self.scan_number(),
            '|' => {
                self.cursor.advance();
                if self.cursor.match_char('>') {
                    self.add_token(TokenKind::Pipeline);
                } else if self.cursor.match_char('|') {
                    self.add_token(TokenKind::OrOr);
                } else {
                    // Lone | folds into logical or downstream.
                    self.add_token(TokenKind::Or);
                }
                Ok(())
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('|') {
                    self.add_token(TokenKind::ReversePipeline);
                } else if self.cursor.match_char('=') {
                    self.add_token(TokenKind::LessEq);
                } else {
                    self.add_token(TokenKind::Less);
                }
                Ok(())
            }
            '.' => {
                self.cursor.advance();
                if self.cursor.match_char('.') {
                    if self.cursor.match_char('.') {
                        self.add_token(TokenKind::DotDotDot);
                    } else {
                        self.add_token(TokenKind::DotDot);
                    }
                } else {
                    self.add_token(TokenKind::Dot);
                }
                Ok(())
            }
            '=' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    if self.cursor.match_char('=') {
                        self.add_token(TokenKind::StrictEq);
                    } else {
                        self.add_token(TokenKind::EqEq);
                    }
                } else if self.cursor.match_char('>') {
                    self.add_token(TokenKind::Arrow);
                } else {
                    self.add_token(TokenKind::Assign);
                }
                Ok(())
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    if self.cursor.match_char('=') {
                        self.add_token(TokenKind::StrictNotEq);
                    } else {
                        self.add_token(TokenKind::NotEq);
                    }
                } else {
                    self.add_token(TokenKind::Not);
                }
                Ok(())
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    self.add_token(TokenKind::GreaterEq);
                } else {
                    self.add_token(TokenKind::Greater);
                }
                Ok(())
            }
            '+' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    self.add_token(TokenKind::PlusAssign);
                } else if self.cursor.match_char('+') {
                    self.add_token(TokenKind::Increment);
                } else {
                    self.add_token(TokenKind::Plus);
                }
                Ok(())
            }
            '-' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    self.add_token(TokenKind::MinusAssign);
                } else if self.cursor.match_char('-') {
                    self.add_token(TokenKind::Decrement);
                } else {
                    self.add_token(TokenKind::Minus);
                }
                Ok(())
            }
            '*' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    self.add_token(TokenKind::StarAssign);
                } else if self.cursor.match_char('*') {
                    self.add_token(TokenKind::Power);
                } else {
                    self.add_token(TokenKind::Star);
                }
                Ok(())
            }
            '&' => {
                self.cursor.advance();
                if self.cursor.match_char('&') {
                    self.add_token(TokenKind::AndAnd);
                } else {
                    self.add_token(TokenKind::And);
                }
                Ok(())
            }
            '%' => {
                self.cursor.advance();
                self.add_token(TokenKind::Percent);
                Ok(())
            }
            '^' => {
                self.cursor.advance();
                self.add_token(TokenKind::Power);
                Ok(())
            }
            '(' => self.punct(TokenKind::LParen),
            ')' => self.punct(TokenKind::RParen),
            '{' => self.punct(TokenKind::LBrace),
            '}' => self.punct(TokenKind::RBrace),
            '[' => self.punct(TokenKind::LBracket),
            ']' => self.punct(TokenKind::RBracket),
            ',' => self.punct(TokenKind::Comma),
            ';' => self.punct(TokenKind::Semicolon),
            ':' => self.punct(TokenKind::Colon),
            '?' => self.punct(TokenKind::Question),
            _ if is_ident_start(c) => {
                self.scan_identifier();
                Ok(())
            }
            _ => {
                let desc = if c.is_ascii() {
                    format!("Unexpected character '{}'", c)
                } else {
                    format!("Unexpected character '{}' (U+{:04X})", c, c as u32)
                };
                Err(self.error(desc))
            }
        }
    }

    fn punct(&mut self, kind: TokenKind) -> Result<(), LexError> {
        self.cursor.advance();
        self.add_token(kind);
        Ok(())
    }

    /// Slash, a comment opener, or slash-equals.
    fn scan_slash(&mut self) -> Result<(), LexError> {
        self.cursor.advance();
        match self.cursor.current_char() {
            '/' => {
                while self.cursor.current_char() != '\n' && !self.cursor.is_at_end() {
                    self.cursor.advance();
                }
                Ok(())
            }
            '*' => {
                self.cursor.advance();
                // Not nested; an unterminated block comment ends silently
                // at EOF.
                while !self.cursor.is_at_end() {
                    if self.cursor.current_char() == '*' && self.cursor.peek_next() == '/' {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
                Ok(())
            }
            '=' => {
                self.cursor.advance();
                self.add_token(TokenKind::SlashAssign);
                Ok(())
            }
            _ => {
                self.add_token(TokenKind::Slash);
                Ok(())
            }
        }
    }

    /// Template literal with `${}` interpolation support.
    ///
    /// `` `a${x}b` `` lexes to `TemplateStart("a") TemplateExpr("x")
    /// TemplateEnd("b")`; without interpolations the whole body is a single
    /// `TemplateString`. Expression bodies are captured as raw source text,
    /// brace-balanced.
    fn scan_template(&mut self) -> Result<(), LexError> {
        self.cursor.advance(); // opening backtick

        let mut value = String::new();
        let mut text_parts = 0usize;
        let mut has_expressions = false;
        let mut piece_line = self.token_start_line;
        let mut piece_column = self.token_start_column;

        while self.cursor.current_char() != '`' && !self.cursor.is_at_end() {
            if self.cursor.current_char() == '$' && self.cursor.peek_next() == '{' {
                let kind = if text_parts == 0 {
                    TokenKind::TemplateStart
                } else {
                    TokenKind::TemplateMiddle
                };
                self.push_token(kind, std::mem::take(&mut value), piece_line, piece_column, None);
                text_parts += 1;

                self.cursor.advance(); // $
                self.cursor.advance(); // {

                let expr_line = self.cursor.line();
                let expr_column = self.cursor.column();
                let expr_start = self.cursor.position();
                let mut depth = 1usize;
                while depth > 0 && !self.cursor.is_at_end() {
                    match self.cursor.bump() {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                }
                if depth > 0 {
                    return Err(self.error("Unterminated template string".to_string()));
                }
                // Everything between `${` and the matching `}`.
                let expr_text =
                    self.cursor.source()[expr_start..self.cursor.position() - 1].to_string();
                self.push_token(TokenKind::TemplateExpr, expr_text, expr_line, expr_column, None);
                has_expressions = true;

                piece_line = self.cursor.line();
                piece_column = self.cursor.column();
            } else if self.cursor.current_char() == '\\' {
                self.cursor.advance();
                let escaped = self.cursor.bump();
                value.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '\\' => '\\',
                    '`' => '`',
                    '$' => '$',
                    other => other,
                });
            } else {
                value.push(self.cursor.bump());
            }
        }

        if self.cursor.is_at_end() {
            return Err(self.error("Unterminated template string".to_string()));
        }
        self.cursor.advance(); // closing backtick

        if has_expressions {
            self.push_token(TokenKind::TemplateEnd, value, piece_line, piece_column, None);
        } else {
            self.push_token(
                TokenKind::TemplateString,
                value,
                self.token_start_line,
                self.token_start_column,
                None,
            );
        }
        Ok(())
    }

    /// Regular string literal with either quote character.
    fn scan_string(&mut self, quote: char) -> Result<(), LexError> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();

        while self.cursor.current_char() != quote && !self.cursor.is_at_end() {
            if self.cursor.current_char() == '\\' {
                self.cursor.advance();
                let escaped = self.cursor.bump();
                value.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    '`' => '`',
                    other => other,
                });
            } else {
                value.push(self.cursor.bump());
            }
        }

        if self.cursor.is_at_end() {
            return Err(self.error("Unterminated string literal".to_string()));
        }
        self.cursor.advance(); // closing quote

        self.push_token(
            TokenKind::String,
            value,
            self.token_start_line,
            self.token_start_column,
            None,
        );
        Ok(())
    }

    /// Number with optional fraction and scientific exponent.
    fn scan_number(&mut self) -> Result<(), LexError> {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        // A stray '.' without a trailing digit is left in the stream.
        if self.cursor.current_char() == '.' && self.cursor.peek_next().is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        if matches!(self.cursor.current_char(), 'e' | 'E') {
            self.cursor.advance();
            if matches!(self.cursor.current_char(), '+' | '-') {
                self.cursor.advance();
            }
            if !self.cursor.current_char().is_ascii_digit() {
                return Err(self.error("Invalid scientific notation".to_string()));
            }
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        self.add_token(TokenKind::Number);
        Ok(())
    }

    /// Mathematical Unicode constant or operator.
    fn scan_mathematical(&mut self, c: char) {
        self.cursor.advance();
        if let Some(symbol) = math_constant(c) {
            self.push_token(
                symbol.kind,
                symbol.glyph.to_string(),
                self.token_start_line,
                self.token_start_column,
                Some(symbol.name),
            );
        } else if let Some(symbol) = math_operator(c) {
            // Superscript/subscript digits swap value and glyph so the
            // parser receives the numeric value in the lexeme.
            if matches!(
                symbol.kind,
                TokenKind::SuperscriptDigit | TokenKind::SubscriptDigit
            ) {
                self.push_token(
                    symbol.kind,
                    symbol.name.to_string(),
                    self.token_start_line,
                    self.token_start_column,
                    Some(symbol.glyph),
                );
            } else {
                self.push_token(
                    symbol.kind,
                    symbol.glyph.to_string(),
                    self.token_start_line,
                    self.token_start_column,
                    Some(symbol.name),
                );
            }
        }
    }

    /// Identifier or keyword.
    fn scan_identifier(&mut self) {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(self.token_start);
        let kind = keyword_from_ident(text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.cursor.slice_from(self.token_start).to_string();
        self.push_token(
            kind,
            lexeme,
            self.token_start_line,
            self.token_start_column,
            None,
        );
    }

    fn push_token(
        &mut self,
        kind: TokenKind,
        lexeme: String,
        line: u32,
        column: u32,
        unicode_name: Option<&'static str>,
    ) {
        self.tokens.push(Token {
            kind,
            lexeme,
            line,
            column,
            unicode_name,
        });
    }

    fn error(&self, message: String) -> LexError {
        LexError::new(self.cursor.line(), self.cursor.column(), message).with_context(excerpt(
            self.cursor.source(),
            self.cursor.position(),
            CONTEXT_RADIUS,
        ))
    }
}
