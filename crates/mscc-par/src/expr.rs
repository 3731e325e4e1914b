//! Expression parsing.
//!
//! Precedence ladder, low to high: assignment → conditional → logical-or
//! (`||`, lone `|`) → logical-and (`&&`, lone `&`) → equality → relational →
//! additive → multiplicative → exponent (`**`/`^`, right-associative) →
//! unary prefix → postfix (`++`/`--`, trailing superscript digit) →
//! call/member → primary.

use mscc_lex::{Token, TokenKind};
use mscc_util::ParseError;

use crate::ast::*;
use crate::Parser;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment_expression()
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Result<Expr, ParseError> {
        // Arrow functions are detected by pure lookahead; no backtracking.
        if self.is_arrow_ahead() {
            return self.parse_arrow_function();
        }
        if self.check(TokenKind::Identifier)
            && self.peek_ahead(1).map(|t| t.kind) == Some(TokenKind::Arrow)
        {
            return self.parse_arrow_function();
        }

        let expr = self.parse_conditional_expression()?;

        if let Some(kind) = self.match_any(&[
            TokenKind::Assign,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
        ]) {
            let op = match kind {
                TokenKind::PlusAssign => AssignOp::AddAssign,
                TokenKind::MinusAssign => AssignOp::SubAssign,
                TokenKind::StarAssign => AssignOp::MulAssign,
                TokenKind::SlashAssign => AssignOp::DivAssign,
                _ => AssignOp::Assign,
            };
            self.skip_newlines();
            let span = expr.span();
            let value = self.parse_assignment_expression()?;
            return Ok(Expr::Assign(AssignExpr {
                target: Box::new(expr),
                op,
                value: Box::new(value),
                span,
            }));
        }

        Ok(expr)
    }

    fn parse_conditional_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_logical_or_expression()?;

        if self.match_kind(TokenKind::Question) {
            self.skip_newlines();
            let consequent = self.parse_assignment_expression()?;
            self.consume(TokenKind::Colon, "Expected ':' after '?' in ternary")?;
            self.skip_newlines();
            let alternate = self.parse_assignment_expression()?;
            let span = expr.span();
            return Ok(Expr::Conditional(CondExpr {
                test: Box::new(expr),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
                span,
            }));
        }

        Ok(expr)
    }

    fn parse_logical_or_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_logical_and_expression()?;
        while let Some(kind) = self.match_any(&[TokenKind::OrOr, TokenKind::Or]) {
            self.skip_newlines();
            let right = self.parse_logical_and_expression()?;
            expr = binary(expr, kind, right);
        }
        Ok(expr)
    }

    fn parse_logical_and_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_equality_expression()?;
        while let Some(kind) = self.match_any(&[TokenKind::AndAnd, TokenKind::And]) {
            self.skip_newlines();
            let right = self.parse_equality_expression()?;
            expr = binary(expr, kind, right);
        }
        Ok(expr)
    }

    fn parse_equality_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_relational_expression()?;
        while let Some(kind) = self.match_any(&[
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::StrictEq,
            TokenKind::StrictNotEq,
            TokenKind::Ne,
        ]) {
            self.skip_newlines();
            let right = self.parse_relational_expression()?;
            expr = binary(expr, kind, right);
        }
        Ok(expr)
    }

    fn parse_relational_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_additive_expression()?;
        while let Some(kind) = self.match_any(&[
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEq,
            TokenKind::GreaterEq,
            TokenKind::Le,
            TokenKind::Ge,
        ]) {
            self.skip_newlines();
            let right = self.parse_additive_expression()?;
            expr = binary(expr, kind, right);
        }
        Ok(expr)
    }

    fn parse_additive_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_multiplicative_expression()?;
        while let Some(kind) =
            self.match_any(&[TokenKind::Plus, TokenKind::Minus, TokenKind::UMinus])
        {
            self.skip_newlines();
            let right = self.parse_multiplicative_expression()?;
            expr = binary(expr, kind, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_exponent_expression()?;
        while let Some(kind) = self.match_any(&[
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Times,
            TokenKind::Div,
        ]) {
            self.skip_newlines();
            let right = self.parse_exponent_expression()?;
            expr = binary(expr, kind, right);
        }
        Ok(expr)
    }

    /// `**` and `^` bind tighter than `*` and are right-associative.
    fn parse_exponent_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_unary_expression()?;
        if self.match_kind(TokenKind::Power) {
            self.skip_newlines();
            let right = self.parse_exponent_expression()?;
            return Ok(binary(expr, TokenKind::Power, right));
        }
        Ok(expr)
    }

    fn parse_unary_expression(&mut self) -> Result<Expr, ParseError> {
        let span = self.span_here();
        if let Some(kind) = self.match_any(&[
            TokenKind::Not,
            TokenKind::Minus,
            TokenKind::Plus,
            TokenKind::UMinus,
            TokenKind::Sqrt,
        ]) {
            let op = match kind {
                TokenKind::Not => UnaryOp::Not,
                TokenKind::Plus => UnaryOp::Pos,
                TokenKind::Sqrt => UnaryOp::Sqrt,
                _ => UnaryOp::Neg,
            };
            let operand = self.parse_unary_expression()?;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                span,
            }));
        }

        if let Some(kind) = self.match_any(&[TokenKind::Increment, TokenKind::Decrement]) {
            let op = if kind == TokenKind::Increment {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            let operand = self.parse_postfix_expression()?;
            return Ok(Expr::Update(UpdateExpr {
                op,
                operand: Box::new(operand),
                prefix: true,
                span,
            }));
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_call_expression()?;

        if let Some(kind) = self.match_any(&[TokenKind::Increment, TokenKind::Decrement]) {
            let op = if kind == TokenKind::Increment {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            let span = expr.span();
            return Ok(Expr::Update(UpdateExpr {
                op,
                operand: Box::new(expr),
                prefix: false,
                span,
            }));
        }

        // A trailing superscript digit is exponentiation: x² ≡ x ^ 2.
        if self.check(TokenKind::SuperscriptDigit) {
            let digit = self.advance();
            let digit_span = digit.span();
            let span = expr.span();
            return Ok(Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                op: BinOp::Pow,
                right: Box::new(Expr::Literal(Literal {
                    value: LitValue::Number(digit.lexeme),
                    span: digit_span,
                })),
                span,
            }));
        }

        Ok(expr)
    }

    fn parse_call_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            if self.match_kind(TokenKind::LParen) {
                let arguments = self.parse_argument_list()?;
                self.consume(TokenKind::RParen, "Expected ')' after arguments")?;
                let span = expr.span();
                expr = Expr::Call(CallExpr {
                    callee: Box::new(expr),
                    arguments,
                    span,
                });
            } else if self.match_kind(TokenKind::Dot) {
                self.skip_newlines();
                let name = self
                    .consume(TokenKind::Identifier, "Expected property name after '.'")?
                    .lexeme;
                let span = expr.span();
                expr = Expr::Member(MemberExpr {
                    object: Box::new(expr),
                    property: MemberProp::Named(name),
                    span,
                });
            } else if self.match_kind(TokenKind::LBracket) {
                self.skip_newlines();
                let prop = self.parse_expression()?;
                self.skip_newlines();
                self.consume(TokenKind::RBracket, "Expected ']' after computed property")?;
                let span = expr.span();
                expr = Expr::Member(MemberExpr {
                    object: Box::new(expr),
                    property: MemberProp::Computed(Box::new(prop)),
                    span,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    pub(crate) fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            if self.match_kind(TokenKind::DotDotDot) {
                let span = self.previous().span();
                let argument = self.parse_assignment_expression()?;
                args.push(Expr::Spread(SpreadExpr {
                    argument: Box::new(argument),
                    span,
                }));
            } else {
                args.push(self.parse_assignment_expression()?);
            }
            self.skip_newlines();
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_newlines();
        Ok(args)
    }

    fn parse_primary_expression(&mut self) -> Result<Expr, ParseError> {
        let span = self.span_here();
        match self.peek().kind {
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal {
                    value: LitValue::Bool(true),
                    span,
                }))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal {
                    value: LitValue::Bool(false),
                    span,
                }))
            }
            TokenKind::Null | TokenKind::Undefined => {
                self.advance();
                Ok(Expr::Literal(Literal {
                    value: LitValue::Nil,
                    span,
                }))
            }
            TokenKind::Number => {
                let token = self.advance();
                Ok(Expr::Literal(Literal {
                    value: LitValue::Number(token.lexeme),
                    span,
                }))
            }
            TokenKind::String => {
                let token = self.advance();
                Ok(Expr::Literal(Literal {
                    value: LitValue::Str(token.lexeme),
                    span,
                }))
            }
            TokenKind::MathPi | TokenKind::MathE | TokenKind::MathPhi | TokenKind::MathInfinity => {
                let token = self.advance();
                let kind = match token.kind {
                    TokenKind::MathPi => MathConstKind::Pi,
                    TokenKind::MathE => MathConstKind::E,
                    TokenKind::MathPhi => MathConstKind::Phi,
                    _ => MathConstKind::Infinity,
                };
                Ok(Expr::MathConst(MathConst { kind, span }))
            }
            TokenKind::TemplateString | TokenKind::TemplateStart => self.parse_template_literal(),
            TokenKind::This => {
                self.advance();
                Ok(Expr::Identifier(Identifier::new("this", span)))
            }
            TokenKind::Identifier => {
                if self.peek_ahead(1).map(|t| t.kind) == Some(TokenKind::Arrow) {
                    return self.parse_arrow_function();
                }
                let token = self.advance();
                let subscript = if self.check(TokenKind::SubscriptDigit) {
                    Some(self.advance().lexeme)
                } else {
                    None
                };
                Ok(Expr::Identifier(Identifier {
                    name: token.lexeme,
                    subscript,
                    span,
                }))
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_array_expression(span)
            }
            TokenKind::LBrace => {
                self.advance();
                self.parse_object_expression(span)
            }
            TokenKind::LParen => {
                if self.is_arrow_ahead() {
                    return self.parse_arrow_function();
                }
                self.advance();
                self.skip_newlines();
                let expr = self.parse_expression()?;
                self.skip_newlines();
                self.consume(TokenKind::RParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            TokenKind::New => {
                self.advance();
                let callee = self.parse_new_callee()?;
                let arguments = if self.match_kind(TokenKind::LParen) {
                    let args = self.parse_argument_list()?;
                    self.consume(TokenKind::RParen, "Expected ')' after new arguments")?;
                    args
                } else {
                    Vec::new()
                };
                Ok(Expr::New(NewExpr {
                    callee: Box::new(callee),
                    arguments,
                    span,
                }))
            }
            _ => Err(self.error_here(format!("Unexpected token: '{}'", self.peek().lexeme))),
        }
    }

    /// Member chain without calls, for `new` targets.
    fn parse_new_callee(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expression()?;
        loop {
            if self.match_kind(TokenKind::Dot) {
                let name = self
                    .consume(TokenKind::Identifier, "Expected property name")?
                    .lexeme;
                let span = expr.span();
                expr = Expr::Member(MemberExpr {
                    object: Box::new(expr),
                    property: MemberProp::Named(name),
                    span,
                });
            } else if self.match_kind(TokenKind::LBracket) {
                let prop = self.parse_expression()?;
                self.consume(TokenKind::RBracket, "Expected ']'")?;
                let span = expr.span();
                expr = Expr::Member(MemberExpr {
                    object: Box::new(expr),
                    property: MemberProp::Computed(Box::new(prop)),
                    span,
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Template literal from the token run the lexer produced. Each
    /// captured interpolation is fed back through the lexer and an
    /// expression sub-parse, yielding a real expression AST.
    fn parse_template_literal(&mut self) -> Result<Expr, ParseError> {
        let first = self.advance();
        let span = first.span();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        match first.kind {
            TokenKind::TemplateString => {
                quasis.push(TemplateElement {
                    text: first.lexeme,
                    tail: true,
                });
                return Ok(Expr::Template(TemplateLit {
                    quasis,
                    expressions,
                    span,
                }));
            }
            TokenKind::TemplateStart => {
                quasis.push(TemplateElement {
                    text: first.lexeme,
                    tail: false,
                });
            }
            _ => {
                return Err(ParseError::new(
                    first.line,
                    first.column,
                    "Malformed template literal",
                ))
            }
        }

        loop {
            match self.peek().kind {
                TokenKind::TemplateExpr => {
                    let token = self.advance();
                    expressions.push(parse_interpolation(&token)?);
                }
                TokenKind::TemplateMiddle => {
                    let token = self.advance();
                    quasis.push(TemplateElement {
                        text: token.lexeme,
                        tail: false,
                    });
                }
                TokenKind::TemplateEnd => {
                    let token = self.advance();
                    quasis.push(TemplateElement {
                        text: token.lexeme,
                        tail: true,
                    });
                    break;
                }
                _ => return Err(self.error_here("Malformed template literal")),
            }
        }

        Ok(Expr::Template(TemplateLit {
            quasis,
            expressions,
            span,
        }))
    }

    /// Array literal; the `[` has been consumed. Holes come from
    /// consecutive commas.
    fn parse_array_expression(&mut self, span: mscc_util::Span) -> Result<Expr, ParseError> {
        let mut elements = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(TokenKind::RBracket) || self.is_at_end() {
                break;
            }
            if self.check(TokenKind::Comma) {
                elements.push(None);
                self.advance();
                continue;
            }
            let element = if self.match_kind(TokenKind::DotDotDot) {
                let spread_span = self.previous().span();
                let argument = self.parse_assignment_expression()?;
                Expr::Spread(SpreadExpr {
                    argument: Box::new(argument),
                    span: spread_span,
                })
            } else {
                self.parse_assignment_expression()?
            };
            elements.push(Some(element));
            self.skip_newlines();
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.skip_newlines();
        self.consume(TokenKind::RBracket, "Expected ']' after array elements")?;
        Ok(Expr::Array(ArrayLit { elements, span }))
    }

    /// Object literal; the `{` has been consumed.
    fn parse_object_expression(&mut self, span: mscc_util::Span) -> Result<Expr, ParseError> {
        let mut members = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(TokenKind::RBrace) || self.is_at_end() {
                break;
            }
            if self.match_kind(TokenKind::DotDotDot) {
                let argument = self.parse_assignment_expression()?;
                members.push(ObjectMember::Spread(argument));
            } else {
                members.push(self.parse_property()?);
            }
            self.skip_newlines();
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.skip_newlines();
        self.consume(TokenKind::RBrace, "Expected '}' after object properties")?;
        Ok(Expr::Object(ObjectLit { members, span }))
    }

    fn parse_property(&mut self) -> Result<ObjectMember, ParseError> {
        let key_span = self.span_here();
        let key = if self.match_kind(TokenKind::LBracket) {
            let expr = self.parse_expression()?;
            self.consume(TokenKind::RBracket, "Expected ']' after computed property")?;
            PropertyKey::Computed(Box::new(expr))
        } else if self.check(TokenKind::Identifier) {
            PropertyKey::Identifier(self.advance().lexeme)
        } else if self.check(TokenKind::String) {
            PropertyKey::Str(self.advance().lexeme)
        } else if self.check(TokenKind::Number) {
            PropertyKey::Number(self.advance().lexeme)
        } else {
            return Err(self.error_here("Expected property name"));
        };

        // Shorthand: {x} is {x: x}.
        if let PropertyKey::Identifier(name) = &key {
            if !self.check(TokenKind::Colon) && !self.check(TokenKind::LParen) {
                let value = Expr::Identifier(Identifier::new(name.clone(), key_span));
                return Ok(ObjectMember::Property {
                    key,
                    value,
                    shorthand: true,
                });
            }
        }

        // Method shorthand: {name() { ... }}.
        if self.match_kind(TokenKind::LParen) {
            let params = self.parse_parameter_list()?;
            self.consume(TokenKind::RParen, "Expected ')' after method parameters")?;
            self.skip_newlines();
            let was_in_function = self.in_function;
            self.in_function = true;
            let body = self.parse_block_statement();
            self.in_function = was_in_function;
            let name = match &key {
                PropertyKey::Identifier(n) => n.clone(),
                PropertyKey::Str(s) => s.clone(),
                PropertyKey::Number(n) => n.clone(),
                PropertyKey::Computed(_) => String::new(),
            };
            let func = FunctionDecl {
                name,
                params,
                body: body?,
                return_type: None,
                is_mathematical: false,
                span: key_span,
            };
            return Ok(ObjectMember::Method { key, func });
        }

        self.consume(TokenKind::Colon, "Expected ':' after property key")?;
        self.skip_newlines();
        let value = self.parse_assignment_expression()?;
        Ok(ObjectMember::Property {
            key,
            value,
            shorthand: false,
        })
    }

    /// Arrow function starting at `(` or a bare parameter identifier.
    pub(crate) fn parse_arrow_function(&mut self) -> Result<Expr, ParseError> {
        let span = self.span_here();
        let params = if self.check(TokenKind::LParen) {
            self.advance();
            let params = self.parse_parameter_list()?;
            self.consume(
                TokenKind::RParen,
                "Expected ')' after arrow function parameters",
            )?;
            params
        } else {
            let name = self
                .consume(TokenKind::Identifier, "Expected parameter name")?
                .lexeme;
            vec![Param {
                name,
                type_annotation: None,
                default: None,
                is_rest: false,
            }]
        };

        self.consume(TokenKind::Arrow, "Expected '=>' in arrow function")?;
        self.skip_newlines();

        let body = if self.check(TokenKind::LBrace) {
            let was_in_function = self.in_function;
            self.in_function = true;
            let block = self.parse_block_statement();
            self.in_function = was_in_function;
            ArrowBody::Block(block?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment_expression()?))
        };

        Ok(Expr::Arrow(ArrowFn { params, body, span }))
    }
}

fn binary(left: Expr, kind: TokenKind, right: Expr) -> Expr {
    let span = left.span();
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        op: binop_for(kind),
        right: Box::new(right),
        span,
    })
}

fn binop_for(kind: TokenKind) -> BinOp {
    match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus | TokenKind::UMinus => BinOp::Sub,
        TokenKind::Star | TokenKind::Times => BinOp::Mul,
        TokenKind::Slash | TokenKind::Div => BinOp::Div,
        TokenKind::Percent => BinOp::Mod,
        TokenKind::Power => BinOp::Pow,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::StrictEq => BinOp::StrictEq,
        TokenKind::NotEq | TokenKind::Ne => BinOp::Ne,
        TokenKind::StrictNotEq => BinOp::StrictNe,
        TokenKind::Less => BinOp::Lt,
        TokenKind::Greater => BinOp::Gt,
        TokenKind::LessEq | TokenKind::Le => BinOp::Le,
        TokenKind::GreaterEq | TokenKind::Ge => BinOp::Ge,
        TokenKind::AndAnd | TokenKind::And => BinOp::And,
        TokenKind::OrOr | TokenKind::Or => BinOp::Or,
        other => unreachable!("not a binary operator token: {:?}", other),
    }
}

/// Re-parses the raw text of a `${...}` interpolation into an expression.
/// Failures surface as parse errors positioned at the template token.
fn parse_interpolation(token: &Token) -> Result<Expr, ParseError> {
    let text = token.lexeme.trim();
    if text.is_empty() {
        return Err(ParseError::new(
            token.line,
            token.column,
            "Empty template interpolation",
        ));
    }
    let tokens = mscc_lex::tokenize(text).map_err(|e| {
        ParseError::new(
            token.line,
            token.column,
            format!("In template interpolation: {}", e.message),
        )
    })?;
    let mut sub = Parser::new(tokens);
    let expr = sub.parse_expression().map_err(|e| {
        ParseError::new(
            token.line,
            token.column,
            format!("In template interpolation: {}", e.message),
        )
    })?;
    sub.skip_newlines();
    if !sub.is_at_end() {
        return Err(ParseError::new(
            token.line,
            token.column,
            format!(
                "In template interpolation: unexpected trailing input '{}'",
                sub.peek().lexeme
            ),
        ));
    }
    Ok(expr)
}
