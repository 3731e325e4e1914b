//! Statement parsing.

use mscc_lex::TokenKind;
use mscc_util::ParseError;

use crate::ast::*;
use crate::Parser;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span_here();
        match self.peek().kind {
            TokenKind::Let => {
                self.advance();
                self.parse_variable_declaration(DeclKind::Let)
            }
            TokenKind::Const => {
                self.advance();
                self.parse_variable_declaration(DeclKind::Const)
            }
            TokenKind::Var => {
                self.advance();
                self.parse_variable_declaration(DeclKind::Var)
            }
            TokenKind::If => {
                self.advance();
                self.parse_if_statement()
            }
            TokenKind::For => {
                self.advance();
                self.parse_for_statement()
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement()
            }
            TokenKind::Try => {
                self.advance();
                self.parse_try_statement()
            }
            TokenKind::Fast => {
                // Performance hint; parsed and discarded.
                self.advance();
                if self.match_kind(TokenKind::Function) {
                    self.parse_function_declaration()
                } else {
                    Err(self.error_here("Expected 'function' after 'fast'"))
                }
            }
            TokenKind::Function => {
                self.advance();
                self.parse_function_declaration()
            }
            TokenKind::Class => {
                self.advance();
                self.parse_class_declaration()
            }
            TokenKind::Return => {
                self.advance();
                self.parse_return_statement()
            }
            TokenKind::Break => {
                self.advance();
                if !self.in_loop {
                    return Err(ParseError::new(
                        span.line,
                        span.column,
                        "break statement outside loop",
                    ));
                }
                self.consume_statement_terminator();
                Ok(Stmt::Break(BreakStmt { span }))
            }
            TokenKind::Continue => {
                self.advance();
                if !self.in_loop {
                    return Err(ParseError::new(
                        span.line,
                        span.column,
                        "continue statement outside loop",
                    ));
                }
                self.consume_statement_terminator();
                Ok(Stmt::Continue(ContinueStmt { span }))
            }
            TokenKind::Throw => {
                self.advance();
                if self.check_statement_terminator() {
                    return Err(self.error_here("throw statement missing expression"));
                }
                let argument = self.parse_expression()?;
                self.consume_statement_terminator();
                Ok(Stmt::Throw(ThrowStmt { argument, span }))
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block_statement()?)),
            _ if self.is_mathematical_function() => self.parse_mathematical_function(),
            _ => {
                let expression = self.parse_expression()?;
                self.consume_statement_terminator();
                Ok(Stmt::Expr(ExprStmt { expression, span }))
            }
        }
    }

    /// `let x = 5, [a, b] = arr, {x, y} = obj` — the declaration keyword has
    /// already been consumed.
    fn parse_variable_declaration(&mut self, kind: DeclKind) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        let mut declarators = Vec::new();

        loop {
            let mut type_annotation = None;
            let target = if self.check(TokenKind::Identifier) {
                let token = self.advance();
                let token_span = token.span();
                if self.match_kind(TokenKind::Colon) {
                    type_annotation = Some(self.parse_type_annotation()?);
                }
                Pattern::Identifier(Identifier::new(token.lexeme, token_span))
            } else if self.check(TokenKind::LBracket) {
                Pattern::Array(self.parse_array_pattern()?)
            } else if self.check(TokenKind::LBrace) {
                Pattern::Object(self.parse_object_pattern()?)
            } else {
                return Err(self.error_here(format!(
                    "Expected identifier or destructuring pattern in {} declaration",
                    kind.as_str()
                )));
            };

            let init = if self.match_kind(TokenKind::Assign) {
                self.skip_newlines();
                Some(self.parse_assignment_expression()?)
            } else if kind == DeclKind::Const {
                return Err(self.error_here("const declaration must have initializer"));
            } else {
                None
            };

            declarators.push(Declarator {
                target,
                init,
                type_annotation,
            });

            if !self.match_kind(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }

        self.consume_statement_terminator();
        Ok(Stmt::VarDecl(VarDecl {
            kind,
            declarators,
            span,
        }))
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        self.consume(TokenKind::LParen, "Expected '(' after 'if'")?;
        self.skip_newlines();
        let test = self.parse_expression()?;
        self.skip_newlines();
        self.consume(TokenKind::RParen, "Expected ')' after if condition")?;

        self.skip_newlines();
        let consequent = Box::new(self.parse_statement()?);

        self.skip_newlines();
        let alternate = if self.match_kind(TokenKind::Else) {
            self.skip_newlines();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            test,
            consequent,
            alternate,
            span,
        }))
    }

    /// Dispatches between `for-of` and the C-style loop via a pure
    /// lookahead; the opening `for` has been consumed.
    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        self.consume(TokenKind::LParen, "Expected '(' after 'for'")?;
        self.skip_newlines();

        if self.is_for_of_pattern() {
            self.parse_for_of_statement(span)
        } else {
            self.parse_traditional_for_statement(span)
        }
    }

    fn parse_for_of_statement(&mut self, span: mscc_util::Span) -> Result<Stmt, ParseError> {
        let left = if let Some(kind_token) = self.match_any(&[
            TokenKind::Let,
            TokenKind::Const,
            TokenKind::Var,
        ]) {
            let kind = match kind_token {
                TokenKind::Let => DeclKind::Let,
                TokenKind::Const => DeclKind::Const,
                _ => DeclKind::Var,
            };
            let token = self.consume(TokenKind::Identifier, "Expected identifier")?;
            let token_span = token.span();
            ForOfTarget::Decl {
                kind,
                name: Identifier::new(token.lexeme, token_span),
            }
        } else {
            let token = self.consume(TokenKind::Identifier, "Expected identifier")?;
            let token_span = token.span();
            ForOfTarget::Identifier(Identifier::new(token.lexeme, token_span))
        };

        self.consume(TokenKind::Of, "Expected 'of' in for-of loop")?;
        let right = self.parse_expression()?;
        self.skip_newlines();
        self.consume(TokenKind::RParen, "Expected ')' after for-of")?;

        self.skip_newlines();
        let was_in_loop = self.in_loop;
        self.in_loop = true;
        let body = self.parse_statement();
        self.in_loop = was_in_loop;

        Ok(Stmt::ForOf(ForOfStmt {
            left,
            right,
            body: Box::new(body?),
            span,
        }))
    }

    fn parse_traditional_for_statement(
        &mut self,
        span: mscc_util::Span,
    ) -> Result<Stmt, ParseError> {
        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if let Some(kind_token) =
            self.match_any(&[TokenKind::Let, TokenKind::Const, TokenKind::Var])
        {
            // Single-declarator declaration in loop-header position.
            let kind = match kind_token {
                TokenKind::Let => DeclKind::Let,
                TokenKind::Const => DeclKind::Const,
                _ => DeclKind::Var,
            };
            let decl_span = self.previous().span();
            let token = self.consume(TokenKind::Identifier, "Expected variable name")?;
            let token_span = token.span();
            let target = Pattern::Identifier(Identifier::new(token.lexeme, token_span));
            let init = if self.match_kind(TokenKind::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            Some(ForInit::VarDecl(VarDecl {
                kind,
                declarators: vec![Declarator {
                    target,
                    init,
                    type_annotation: None,
                }],
                span: decl_span,
            }))
        } else {
            Some(ForInit::Expr(self.parse_expression()?))
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after for-loop initializer")?;
        self.skip_newlines();

        let test = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after for-loop condition")?;
        self.skip_newlines();

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RParen, "Expected ')' after for-loop clauses")?;

        self.skip_newlines();
        let was_in_loop = self.in_loop;
        self.in_loop = true;
        let body = self.parse_statement();
        self.in_loop = was_in_loop;

        Ok(Stmt::For(ForStmt {
            init,
            test,
            update,
            body: Box::new(body?),
            span,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        self.consume(TokenKind::LParen, "Expected '(' after 'while'")?;
        self.skip_newlines();
        let test = self.parse_expression()?;
        self.skip_newlines();
        self.consume(TokenKind::RParen, "Expected ')' after while condition")?;

        self.skip_newlines();
        let was_in_loop = self.in_loop;
        self.in_loop = true;
        let body = self.parse_statement();
        self.in_loop = was_in_loop;

        Ok(Stmt::While(WhileStmt {
            test,
            body: Box::new(body?),
            span,
        }))
    }

    fn parse_try_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        self.skip_newlines();
        let block = self.parse_block_statement()?;

        self.skip_newlines();
        let handler = if self.match_kind(TokenKind::Catch) {
            let param = if self.match_kind(TokenKind::LParen) {
                let param = if self.check(TokenKind::Identifier) {
                    let token = self.advance();
                    let token_span = token.span();
                    Some(Identifier::new(token.lexeme, token_span))
                } else {
                    None
                };
                self.consume(TokenKind::RParen, "Expected ')' after catch parameter")?;
                param
            } else {
                None
            };
            self.skip_newlines();
            let body = self.parse_block_statement()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        self.skip_newlines();
        let finalizer = if self.match_kind(TokenKind::Finally) {
            self.skip_newlines();
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError::new(
                span.line,
                span.column,
                "Missing catch or finally after try",
            ));
        }

        Ok(Stmt::Try(TryStmt {
            block,
            handler,
            finalizer,
            span,
        }))
    }

    /// `function name(params) { ... }` — the `function` keyword has been
    /// consumed.
    fn parse_function_declaration(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        let name = self
            .consume(TokenKind::Identifier, "Expected function name")?
            .lexeme;

        self.consume(TokenKind::LParen, "Expected '(' after function name")?;
        let params = self.parse_parameter_list()?;
        self.consume(TokenKind::RParen, "Expected ')' after parameters")?;

        let return_type = if self.match_kind(TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        self.skip_newlines();
        let was_in_function = self.in_function;
        self.in_function = true;
        let body = self.parse_block_statement();
        self.in_function = was_in_function;

        Ok(Stmt::FunctionDecl(FunctionDecl {
            name,
            params,
            body: body?,
            return_type,
            is_mathematical: false,
            span,
        }))
    }

    /// Mathematical shorthand `f(x) = expr;`, detected by lookahead. The
    /// body becomes a single `return expr`.
    fn parse_mathematical_function(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span_here();
        let name = self
            .consume(TokenKind::Identifier, "Expected function name")?
            .lexeme;

        self.consume(TokenKind::LParen, "Expected '(' after function name")?;
        let params = self.parse_parameter_list()?;
        self.consume(TokenKind::RParen, "Expected ')' after parameters")?;

        self.consume(TokenKind::Assign, "Expected '=' in mathematical function")?;
        self.skip_newlines();

        let expr = self.parse_expression()?;
        let expr_span = expr.span();
        let body = Block {
            statements: vec![Stmt::Return(ReturnStmt {
                argument: Some(expr),
                span: expr_span,
            })],
            span: expr_span,
        };

        self.consume_statement_terminator();

        Ok(Stmt::FunctionDecl(FunctionDecl {
            name,
            params,
            body,
            return_type: None,
            is_mathematical: true,
            span,
        }))
    }

    fn parse_class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        let name = self
            .consume(TokenKind::Identifier, "Expected class name")?
            .lexeme;

        let superclass = if self.match_kind(TokenKind::Extends) {
            Some(
                self.consume(TokenKind::Identifier, "Expected superclass name")?
                    .lexeme,
            )
        } else {
            None
        };

        self.skip_newlines();
        self.consume(TokenKind::LBrace, "Expected '{' before class body")?;

        let was_in_class = self.in_class;
        self.in_class = true;
        let mut members = Vec::new();
        let result: Result<(), ParseError> = loop {
            if self.match_kind(TokenKind::Newline) {
                continue;
            }
            if self.check(TokenKind::RBrace) || self.is_at_end() {
                break Ok(());
            }
            match self.parse_method_definition() {
                Ok(member) => members.push(member),
                Err(e) => break Err(e),
            }
        };
        self.in_class = was_in_class;
        result?;

        self.consume(TokenKind::RBrace, "Expected '}' after class body")?;

        Ok(Stmt::ClassDecl(ClassDecl {
            name,
            superclass,
            members,
            span,
        }))
    }

    fn parse_method_definition(&mut self) -> Result<MethodDef, ParseError> {
        debug_assert!(self.in_class);
        let is_static = self.match_kind(TokenKind::Static);

        // `get name() {}` / `set name(v) {}`: only when another identifier
        // follows, so a method actually called `get` still parses.
        let mut kind = MethodKind::Method;
        if self.check(TokenKind::Identifier)
            && self.peek_ahead(1).map(|t| t.kind) == Some(TokenKind::Identifier)
        {
            match self.peek().lexeme.as_str() {
                "get" => {
                    self.advance();
                    kind = MethodKind::Get;
                }
                "set" => {
                    self.advance();
                    kind = MethodKind::Set;
                }
                _ => {}
            }
        }

        let key_token = self.consume(TokenKind::Identifier, "Expected method name")?;
        let key = key_token.lexeme.clone();
        if kind == MethodKind::Method && key == "constructor" {
            kind = MethodKind::Constructor;
        }

        self.consume(TokenKind::LParen, "Expected '(' after method name")?;
        let params = self.parse_parameter_list()?;
        self.consume(TokenKind::RParen, "Expected ')' after method parameters")?;

        let return_type = if self.match_kind(TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        self.skip_newlines();
        let was_in_function = self.in_function;
        self.in_function = true;
        let body = self.parse_block_statement();
        self.in_function = was_in_function;

        let func = FunctionDecl {
            name: key.clone(),
            params,
            body: body?,
            return_type,
            is_mathematical: false,
            span: key_token.span(),
        };

        Ok(MethodDef {
            key,
            func,
            kind,
            is_static,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span();
        if !self.in_function {
            return Err(ParseError::new(
                span.line,
                span.column,
                "return statement outside function",
            ));
        }

        let argument = if self.check_statement_terminator() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_statement_terminator();

        Ok(Stmt::Return(ReturnStmt { argument, span }))
    }

    /// `{ statements }`.
    pub(crate) fn parse_block_statement(&mut self) -> Result<Block, ParseError> {
        let span = self.span_here();
        self.consume(TokenKind::LBrace, "Expected '{'")?;

        let mut statements = Vec::new();
        loop {
            if self.match_kind(TokenKind::Newline) {
                continue;
            }
            if self.check(TokenKind::RBrace) || self.is_at_end() {
                break;
            }
            statements.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RBrace, "Expected '}'")?;
        Ok(Block { statements, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn parse_src(source: &str) -> Result<Program, ParseError> {
        parse(mscc_lex::tokenize(source).unwrap())
    }

    fn single(source: &str) -> Stmt {
        let mut program = parse_src(source).unwrap();
        assert_eq!(program.statements.len(), 1, "in {:?}", source);
        program.statements.remove(0)
    }

    #[test]
    fn let_declaration() {
        match single("let x = 5;") {
            Stmt::VarDecl(decl) => {
                assert_eq!(decl.kind, DeclKind::Let);
                assert_eq!(decl.declarators.len(), 1);
                assert!(decl.declarators[0].init.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn multiple_declarators() {
        match single("let a = 1, b, c = 3;") {
            Stmt::VarDecl(decl) => {
                assert_eq!(decl.declarators.len(), 3);
                assert!(decl.declarators[1].init.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn const_requires_initializer() {
        let err = parse_src("const x;").unwrap_err();
        assert!(err.message.contains("const declaration must have initializer"));
        assert!(parse_src("const x = 1;").is_ok());
    }

    #[test]
    fn mathematical_function() {
        match single("f(x) = x × 2;") {
            Stmt::FunctionDecl(func) => {
                assert!(func.is_mathematical);
                assert_eq!(func.name, "f");
                assert_eq!(func.params.len(), 1);
                assert_eq!(func.body.statements.len(), 1);
                assert!(matches!(func.body.statements[0], Stmt::Return(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn call_statement_is_not_mathematical() {
        match single("f(x);") {
            Stmt::Expr(stmt) => assert!(matches!(stmt.expression, Expr::Call(_))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn assignment_to_call_result_is_not_mathematical() {
        // `f(x).y = 1` starts like the shorthand but the `=` is not directly
        // after the parameter list's closing paren.
        match single("f(x).y = 1;") {
            Stmt::Expr(stmt) => assert!(matches!(stmt.expression, Expr::Assign(_))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fast_function_modifier_is_discarded() {
        match single("fast function hot(a) { return a; }") {
            Stmt::FunctionDecl(func) => {
                assert_eq!(func.name, "hot");
                assert!(!func.is_mathematical);
            }
            other => panic!("unexpected {:?}", other),
        }
        let err = parse_src("fast hot() {}").unwrap_err();
        assert!(err.message.contains("Expected 'function' after 'fast'"));
    }

    #[test]
    fn if_else_chain() {
        match single("if (a) { b; } else if (c) { d; } else { e; }") {
            Stmt::If(stmt) => {
                assert!(matches!(stmt.alternate.as_deref(), Some(Stmt::If(_))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn for_of_loop() {
        match single("for (let n of xs) { n; }") {
            Stmt::ForOf(stmt) => match stmt.left {
                ForOfTarget::Decl { kind, ref name } => {
                    assert_eq!(kind, DeclKind::Let);
                    assert_eq!(name.name, "n");
                }
                ref other => panic!("unexpected target {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn for_of_without_declaration() {
        match single("for (n of xs) { n; }") {
            Stmt::ForOf(stmt) => assert!(matches!(stmt.left, ForOfTarget::Identifier(_))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn traditional_for_loop() {
        match single("for (let i = 0; i < 10; i++) { i; }") {
            Stmt::For(stmt) => {
                assert!(matches!(stmt.init, Some(ForInit::VarDecl(_))));
                assert!(stmt.test.is_some());
                assert!(matches!(stmt.update, Some(Expr::Update(_))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn for_loop_with_empty_clauses() {
        match single("for (;;) { break; }") {
            Stmt::For(stmt) => {
                assert!(stmt.init.is_none());
                assert!(stmt.test.is_none());
                assert!(stmt.update.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn while_loop() {
        assert!(matches!(single("while (x > 0) { x--; }"), Stmt::While(_)));
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let err = parse_src("break;").unwrap_err();
        assert!(err.message.contains("break"));
        assert!(err.message.contains("loop"));
    }

    #[test]
    fn continue_outside_loop_is_rejected() {
        let err = parse_src("continue;").unwrap_err();
        assert!(err.message.contains("continue"));
        assert!(err.message.contains("loop"));
    }

    #[test]
    fn return_outside_function_is_rejected() {
        let err = parse_src("return 1;").unwrap_err();
        assert!(err.message.contains("return"));
        assert!(err.message.contains("function"));
    }

    #[test]
    fn break_inside_loop_is_accepted() {
        assert!(parse_src("while (true) { break; }").is_ok());
        assert!(parse_src("for (let n of xs) { continue; }").is_ok());
    }

    #[test]
    fn return_inside_nested_constructs() {
        assert!(parse_src("function f() { if (a) { return 1; } }").is_ok());
        // A loop does not grant return permission.
        assert!(parse_src("while (a) { return 1; }").is_err());
    }

    #[test]
    fn try_requires_catch_or_finally() {
        let err = parse_src("try { a; }").unwrap_err();
        assert!(err.message.contains("Missing catch or finally"));
        assert!(parse_src("try { a; } catch (e) { b; }").is_ok());
        assert!(parse_src("try { a; } finally { b; }").is_ok());
        assert!(parse_src("try { a; } catch { b; } finally { c; }").is_ok());
    }

    #[test]
    fn throw_requires_expression() {
        let err = parse_src("function f() { throw; }").unwrap_err();
        assert!(err.message.contains("throw statement missing expression"));
    }

    #[test]
    fn class_with_members() {
        match single(
            "class V extends Base {\n  constructor(x) { this.x = x; }\n  mag() { return this.x; }\n  static origin() { return 0; }\n  get size() { return 1; }\n}",
        ) {
            Stmt::ClassDecl(class) => {
                assert_eq!(class.name, "V");
                assert_eq!(class.superclass.as_deref(), Some("Base"));
                assert_eq!(class.members.len(), 4);
                assert_eq!(class.members[0].kind, MethodKind::Constructor);
                assert_eq!(class.members[1].kind, MethodKind::Method);
                assert!(class.members[2].is_static);
                assert_eq!(class.members[3].kind, MethodKind::Get);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn method_named_get_still_parses() {
        match single("class C { get() { return 1; } }") {
            Stmt::ClassDecl(class) => {
                assert_eq!(class.members[0].key, "get");
                assert_eq!(class.members[0].kind, MethodKind::Method);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn function_with_defaults_and_rest() {
        match single("function f(a, b = 2, ...rest) { return a; }") {
            Stmt::FunctionDecl(func) => {
                assert_eq!(func.params.len(), 3);
                assert!(func.params[1].default.is_some());
                assert!(func.params[2].is_rest);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn standalone_block() {
        assert!(matches!(single("{ let a = 1; }"), Stmt::Block(_)));
    }

    #[test]
    fn multiline_bodies_parse() {
        let source = "if (a)\n{\n  b;\n}\nelse\n{\n  c;\n}";
        assert!(matches!(single(source), Stmt::If(_)));
    }
}
