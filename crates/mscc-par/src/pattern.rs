//! Destructuring pattern parsing.
//!
//! Patterns appear only on the left of a destructuring variable
//! declaration: `let [a, , b = 1, ...rest] = xs;` and
//! `let {x, y: alias, z = 1, ...rest} = obj;`. Holes are allowed in array
//! patterns; a rest element must be last.

use mscc_lex::TokenKind;
use mscc_util::ParseError;

use crate::ast::*;
use crate::Parser;

impl Parser {
    /// `[a, b, ...rest]` — cursor on the `[`.
    pub(crate) fn parse_array_pattern(&mut self) -> Result<ArrayPattern, ParseError> {
        let span = self.span_here();
        self.consume(TokenKind::LBracket, "Expected '['")?;

        let mut elements = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(TokenKind::RBracket) || self.is_at_end() {
                break;
            }
            if self.check(TokenKind::Comma) {
                // Hole: [a, , c]
                elements.push(None);
                self.advance();
                continue;
            }
            if self.match_kind(TokenKind::DotDotDot) {
                let token = self.consume(TokenKind::Identifier, "Expected identifier after '...'")?;
                let token_span = token.span();
                elements.push(Some(ArrayPatternElement::Rest(Identifier::new(
                    token.lexeme,
                    token_span,
                ))));
                self.skip_newlines();
                if !self.check(TokenKind::RBracket) {
                    return Err(
                        self.error_here("Rest element must be last in destructuring pattern")
                    );
                }
                break;
            }

            let target = self.parse_binding_target()?;
            let element = if self.match_kind(TokenKind::Assign) {
                self.skip_newlines();
                let default = self.parse_assignment_expression()?;
                ArrayPatternElement::Assignment { target, default }
            } else {
                ArrayPatternElement::Pattern(target)
            };
            elements.push(Some(element));

            self.skip_newlines();
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }

        self.skip_newlines();
        self.consume(TokenKind::RBracket, "Expected ']'")?;
        Ok(ArrayPattern { elements, span })
    }

    /// `{x, y: alias, ...rest}` — cursor on the `{`.
    pub(crate) fn parse_object_pattern(&mut self) -> Result<ObjectPattern, ParseError> {
        let span = self.span_here();
        self.consume(TokenKind::LBrace, "Expected '{'")?;

        let mut properties = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(TokenKind::RBrace) || self.is_at_end() {
                break;
            }
            if self.match_kind(TokenKind::DotDotDot) {
                let token = self.consume(TokenKind::Identifier, "Expected identifier after '...'")?;
                let token_span = token.span();
                properties.push(ObjectPatternProp::Rest(Identifier::new(
                    token.lexeme,
                    token_span,
                )));
                self.skip_newlines();
                if !self.check(TokenKind::RBrace) {
                    return Err(
                        self.error_here("Rest element must be last in destructuring pattern")
                    );
                }
                break;
            }

            let key_token = self.consume(TokenKind::Identifier, "Expected property name")?;
            let key_span = key_token.span();
            let key = Identifier::new(key_token.lexeme, key_span);

            if self.match_kind(TokenKind::Colon) {
                let target = self.parse_binding_target()?;
                properties.push(ObjectPatternProp::Renamed {
                    key,
                    target: Box::new(target),
                });
            } else if self.match_kind(TokenKind::Assign) {
                self.skip_newlines();
                let default = self.parse_assignment_expression()?;
                properties.push(ObjectPatternProp::Shorthand {
                    name: key,
                    default: Some(default),
                });
            } else {
                properties.push(ObjectPatternProp::Shorthand {
                    name: key,
                    default: None,
                });
            }

            self.skip_newlines();
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }

        self.skip_newlines();
        self.consume(TokenKind::RBrace, "Expected '}'")?;
        Ok(ObjectPattern { properties, span })
    }

    /// A nested binding position: identifier or another pattern.
    fn parse_binding_target(&mut self) -> Result<Pattern, ParseError> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            let token_span = token.span();
            Ok(Pattern::Identifier(Identifier::new(
                token.lexeme,
                token_span,
            )))
        } else if self.check(TokenKind::LBracket) {
            Ok(Pattern::Array(self.parse_array_pattern()?))
        } else if self.check(TokenKind::LBrace) {
            Ok(Pattern::Object(self.parse_object_pattern()?))
        } else {
            Err(self.error_here("Expected identifier or pattern in destructuring"))
        }
    }
}
