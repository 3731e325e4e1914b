//! Statement emission: declarations, control flow, classes, and the
//! destructuring lowering.

use mscc_par::ast::*;
use mscc_util::GenError;

use crate::expr::emit_identifier;
use crate::{indent, Generator};

impl Generator {
    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) -> Result<String, GenError> {
        match stmt {
            Stmt::VarDecl(decl) => self.emit_var_decl(decl),
            Stmt::FunctionDecl(func) => self.emit_function_decl(func),
            Stmt::ClassDecl(class) => self.emit_class_decl(class),
            Stmt::If(stmt) => self.emit_if(stmt),
            Stmt::For(stmt) => self.emit_for(stmt),
            Stmt::ForOf(stmt) => self.emit_for_of(stmt),
            Stmt::While(stmt) => self.emit_while(stmt),
            Stmt::Try(stmt) => self.emit_try(stmt),
            Stmt::Block(block) => self.emit_block(block),
            Stmt::Return(stmt) => match &stmt.argument {
                Some(expr) => Ok(format!("return {}", self.emit_expr(expr)?)),
                None => Ok("return".to_string()),
            },
            Stmt::Break(_) => Ok("break".to_string()),
            Stmt::Continue(_) => Ok("goto continue".to_string()),
            Stmt::Throw(stmt) => Ok(format!("error({})", self.emit_expr(&stmt.argument)?)),
            Stmt::Expr(stmt) => self.emit_statement_expr(&stmt.expression),
        }
    }

    pub(crate) fn emit_block(&mut self, block: &Block) -> Result<String, GenError> {
        let mut lines = Vec::new();
        for stmt in &block.statements {
            let code = self.emit_stmt(stmt)?;
            if !code.trim().is_empty() {
                lines.push(code);
            }
        }
        Ok(lines.join("\n"))
    }

    /// Expression in statement position. Updates take the simple
    /// `x = x + 1` form here; everything else emits as an expression.
    pub(crate) fn emit_statement_expr(&mut self, expr: &Expr) -> Result<String, GenError> {
        match expr {
            Expr::Update(update) => self.emit_update_statement(update),
            other => self.emit_expr(other),
        }
    }

    fn emit_var_decl(&mut self, decl: &VarDecl) -> Result<String, GenError> {
        let mut lines = Vec::new();
        for declarator in &decl.declarators {
            match &declarator.target {
                Pattern::Identifier(id) => {
                    let name = emit_identifier(id);
                    match (decl.kind, &declarator.init) {
                        (DeclKind::Var, Some(init)) => {
                            lines.push(format!("{} = {}", name, self.emit_expr(init)?));
                        }
                        (DeclKind::Var, None) => lines.push(format!("{} = nil", name)),
                        (_, Some(init)) => {
                            lines.push(format!("local {} = {}", name, self.emit_expr(init)?));
                        }
                        (_, None) => lines.push(format!("local {}", name)),
                    }
                }
                pattern => {
                    let init = declarator.init.as_ref().ok_or_else(|| {
                        GenError::new(
                            "VariableDeclaration",
                            "destructuring declaration requires an initializer",
                        )
                    })?;
                    let init_code = self.emit_expr(init)?;
                    let local = decl.kind != DeclKind::Var;
                    let temp = self.next_temp();
                    lines.push(format!("local {} = {}", temp, init_code));
                    self.lower_pattern(pattern, &temp, local, &mut lines)?;
                }
            }
        }
        Ok(lines.join("\n"))
    }

    /// Positional/keyed reads from a destructuring temporary. Array
    /// patterns index 1-based with holes skipping an index; object rest
    /// copies the keys not already taken.
    fn lower_pattern(
        &mut self,
        pattern: &Pattern,
        source: &str,
        local: bool,
        lines: &mut Vec<String>,
    ) -> Result<(), GenError> {
        let prefix = if local { "local " } else { "" };
        match pattern {
            Pattern::Identifier(id) => {
                lines.push(format!("{}{} = {}", prefix, emit_identifier(id), source));
            }
            Pattern::Array(array) => {
                let mut index = 1usize;
                for element in &array.elements {
                    match element {
                        None => index += 1,
                        Some(ArrayPatternElement::Rest(name)) => {
                            lines.push(format!(
                                "{}{} = _LS.slice({}, {})",
                                prefix, name.name, source, index
                            ));
                        }
                        Some(ArrayPatternElement::Pattern(target)) => {
                            self.lower_indexed(target, source, index, local, lines)?;
                            index += 1;
                        }
                        Some(ArrayPatternElement::Assignment { target, default }) => {
                            self.lower_indexed(target, source, index, local, lines)?;
                            if let Pattern::Identifier(id) = target {
                                let name = emit_identifier(id);
                                let default_code = self.emit_expr(default)?;
                                lines.push(format!(
                                    "if {} == nil then {} = {} end",
                                    name, name, default_code
                                ));
                            }
                            index += 1;
                        }
                    }
                }
            }
            Pattern::Object(object) => {
                let mut taken: Vec<String> = Vec::new();
                for prop in &object.properties {
                    match prop {
                        ObjectPatternProp::Shorthand { name, default } => {
                            let target = emit_identifier(name);
                            lines.push(format!(
                                "{}{} = {}.{}",
                                prefix, target, source, name.name
                            ));
                            if let Some(default) = default {
                                let default_code = self.emit_expr(default)?;
                                lines.push(format!(
                                    "if {} == nil then {} = {} end",
                                    target, target, default_code
                                ));
                            }
                            taken.push(name.name.clone());
                        }
                        ObjectPatternProp::Renamed { key, target } => {
                            match target.as_ref() {
                                Pattern::Identifier(id) => {
                                    lines.push(format!(
                                        "{}{} = {}.{}",
                                        prefix,
                                        emit_identifier(id),
                                        source,
                                        key.name
                                    ));
                                }
                                nested => {
                                    let temp = self.next_temp();
                                    lines.push(format!(
                                        "local {} = {}.{}",
                                        temp, source, key.name
                                    ));
                                    self.lower_pattern(nested, &temp, local, lines)?;
                                }
                            }
                            taken.push(key.name.clone());
                        }
                        ObjectPatternProp::Rest(name) => {
                            lines.push(format!("{}{} = {{}}", prefix, name.name));
                            let cond = if taken.is_empty() {
                                "true".to_string()
                            } else {
                                taken
                                    .iter()
                                    .map(|k| format!("k ~= \"{}\"", k))
                                    .collect::<Vec<_>>()
                                    .join(" and ")
                            };
                            lines.push(format!(
                                "for k, v in pairs({}) do if {} then {}[k] = v end end",
                                source, cond, name.name
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn lower_indexed(
        &mut self,
        target: &Pattern,
        source: &str,
        index: usize,
        local: bool,
        lines: &mut Vec<String>,
    ) -> Result<(), GenError> {
        match target {
            Pattern::Identifier(id) => {
                let prefix = if local { "local " } else { "" };
                lines.push(format!(
                    "{}{} = {}[{}]",
                    prefix,
                    emit_identifier(id),
                    source,
                    index
                ));
                Ok(())
            }
            nested => {
                let temp = self.next_temp();
                lines.push(format!("local {} = {}[{}]", temp, source, index));
                self.lower_pattern(nested, &temp, local, lines)
            }
        }
    }

    fn emit_function_decl(&mut self, func: &FunctionDecl) -> Result<String, GenError> {
        let (params, prelude) = self.lower_params(&func.params)?;
        // The mathematical shorthand declares a local.
        let header = if func.is_mathematical {
            format!("local function {}({})", func.name, params)
        } else {
            format!("function {}({})", func.name, params)
        };
        let mut lines = vec![header];
        for line in &prelude {
            lines.push(indent(line));
        }
        let body = self.emit_block(&func.body)?;
        if !body.trim().is_empty() {
            lines.push(indent(&body));
        }
        lines.push("end".to_string());
        Ok(lines.join("\n"))
    }

    fn emit_if(&mut self, stmt: &IfStmt) -> Result<String, GenError> {
        let mut lines = Vec::new();
        let mut current = stmt;
        let mut first = true;
        loop {
            let keyword = if first { "if" } else { "elseif" };
            lines.push(format!("{} {} then", keyword, self.emit_expr(&current.test)?));
            let consequent = self.emit_stmt(&current.consequent)?;
            if !consequent.trim().is_empty() {
                lines.push(indent(&consequent));
            }
            match current.alternate.as_deref() {
                Some(Stmt::If(next)) => {
                    current = next;
                    first = false;
                }
                Some(other) => {
                    lines.push("else".to_string());
                    let alternate = self.emit_stmt(other)?;
                    if !alternate.trim().is_empty() {
                        lines.push(indent(&alternate));
                    }
                    break;
                }
                None => break,
            }
        }
        lines.push("end".to_string());
        Ok(lines.join("\n"))
    }

    /// C-style loop lowered to `while true` with an inverted-test break.
    fn emit_for(&mut self, stmt: &ForStmt) -> Result<String, GenError> {
        let mut lines = Vec::new();
        match &stmt.init {
            Some(ForInit::VarDecl(decl)) => lines.push(self.emit_var_decl(decl)?),
            Some(ForInit::Expr(expr)) => lines.push(self.emit_statement_expr(expr)?),
            None => {}
        }
        lines.push("while true do".to_string());
        if let Some(test) = &stmt.test {
            lines.push(format!("  if not ({}) then break end", self.emit_expr(test)?));
        }
        let body = self.emit_stmt(&stmt.body)?;
        if !body.trim().is_empty() {
            lines.push(indent(&body));
        }
        // The continue label precedes the update so continue still steps
        // the loop variable.
        if stmt_contains_continue(&stmt.body) {
            lines.push("  ::continue::".to_string());
        }
        if let Some(update) = &stmt.update {
            lines.push(format!("  {}", self.emit_statement_expr(update)?));
        }
        lines.push("end".to_string());
        Ok(lines.join("\n"))
    }

    fn emit_for_of(&mut self, stmt: &ForOfStmt) -> Result<String, GenError> {
        let var = match &stmt.left {
            ForOfTarget::Decl { name, .. } => emit_identifier(name),
            ForOfTarget::Identifier(id) => emit_identifier(id),
        };
        let iterable = self.emit_expr(&stmt.right)?;
        let mut lines = vec![format!("for _, {} in ipairs({}) do", var, iterable)];
        let body = self.emit_stmt(&stmt.body)?;
        if !body.trim().is_empty() {
            lines.push(indent(&body));
        }
        if stmt_contains_continue(&stmt.body) {
            lines.push("  ::continue::".to_string());
        }
        lines.push("end".to_string());
        Ok(lines.join("\n"))
    }

    fn emit_while(&mut self, stmt: &WhileStmt) -> Result<String, GenError> {
        let mut lines = vec![format!("while {} do", self.emit_expr(&stmt.test)?)];
        let body = self.emit_stmt(&stmt.body)?;
        if !body.trim().is_empty() {
            lines.push(indent(&body));
        }
        if stmt_contains_continue(&stmt.body) {
            lines.push("  ::continue::".to_string());
        }
        lines.push("end".to_string());
        Ok(lines.join("\n"))
    }

    fn emit_try(&mut self, stmt: &TryStmt) -> Result<String, GenError> {
        let mut lines = vec!["local success, error = pcall(function()".to_string()];
        let block = self.emit_block(&stmt.block)?;
        if !block.trim().is_empty() {
            lines.push(indent(&block));
        }
        lines.push("end)".to_string());

        if let Some(handler) = &stmt.handler {
            lines.push("if not success then".to_string());
            if let Some(param) = &handler.param {
                lines.push(format!("  local {} = error", emit_identifier(param)));
            }
            let body = self.emit_block(&handler.body)?;
            if !body.trim().is_empty() {
                lines.push(indent(&body));
            }
            lines.push("end".to_string());
        }

        if let Some(finalizer) = &stmt.finalizer {
            lines.push("-- Finally block".to_string());
            let body = self.emit_block(finalizer)?;
            if !body.trim().is_empty() {
                lines.push(body);
            }
        }

        Ok(lines.join("\n"))
    }

    fn emit_class_decl(&mut self, class: &ClassDecl) -> Result<String, GenError> {
        let name = &class.name;
        let mut lines = vec![
            format!("local {} = {{}}", name),
            format!("{}.__index = {}", name, name),
        ];
        if let Some(superclass) = &class.superclass {
            lines.push(format!("setmetatable({}, {{ __index = {} }})", name, superclass));
        }

        let mut constructor = None;
        let mut methods = Vec::new();
        for member in &class.members {
            if member.kind == MethodKind::Constructor && !member.is_static {
                constructor = Some(member);
            } else {
                methods.push(member);
            }
        }

        match constructor {
            Some(ctor) => {
                let (params, prelude) = self.lower_params(&ctor.func.params)?;
                lines.push(format!("function {}.new({})", name, params));
                lines.push(format!("  local self = setmetatable({{}}, {})", name));
                for line in &prelude {
                    lines.push(indent(line));
                }
                let body = self.emit_block(&ctor.func.body)?;
                if !body.trim().is_empty() {
                    lines.push(indent(&body));
                }
                lines.push("  return self".to_string());
                lines.push("end".to_string());
            }
            None => {
                lines.push(format!("function {}.new()", name));
                lines.push(format!("  local self = setmetatable({{}}, {})", name));
                lines.push("  return self".to_string());
                lines.push("end".to_string());
            }
        }

        for member in methods {
            let (params, prelude) = self.lower_params(&member.func.params)?;
            // Static members use dot definitions with no implicit self;
            // accessors emit as plain methods.
            let header = if member.is_static {
                format!("function {}.{}({})", name, member.key, params)
            } else {
                format!("function {}:{}({})", name, member.key, params)
            };
            lines.push(header);
            for line in &prelude {
                lines.push(indent(line));
            }
            let body = self.emit_block(&member.func.body)?;
            if !body.trim().is_empty() {
                lines.push(indent(&body));
            }
            lines.push("end".to_string());
        }

        Ok(lines.join("\n"))
    }
}

/// Whether a loop body contains a `continue` belonging to that loop.
/// Descends through blocks, conditionals and try statements but not into
/// nested loops, which own their labels.
fn stmt_contains_continue(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Continue(_) => true,
        Stmt::Block(block) => block.statements.iter().any(stmt_contains_continue),
        Stmt::If(s) => {
            stmt_contains_continue(&s.consequent)
                || s.alternate.as_deref().is_some_and(stmt_contains_continue)
        }
        Stmt::Try(s) => {
            s.block.statements.iter().any(stmt_contains_continue)
                || s.handler
                    .as_ref()
                    .is_some_and(|h| h.body.statements.iter().any(stmt_contains_continue))
                || s.finalizer
                    .as_ref()
                    .is_some_and(|f| f.statements.iter().any(stmt_contains_continue))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::generate;

    fn compile(source: &str) -> String {
        let tokens = mscc_lex::tokenize(source).unwrap();
        let program = mscc_par::parse(tokens).unwrap();
        generate(&program).unwrap()
    }

    #[test]
    fn let_and_const_are_locals() {
        let lua = compile("let a = 1; const b = 2;");
        assert!(lua.contains("local a = 1"));
        assert!(lua.contains("local b = 2"));
    }

    #[test]
    fn var_is_global() {
        let lua = compile("var g = 1; var h;");
        assert!(lua.contains("\ng = 1"));
        assert!(lua.contains("h = nil"));
    }

    #[test]
    fn uninitialized_let() {
        let lua = compile("let a;");
        assert!(lua.contains("local a\n"), "{}", lua);
    }

    #[test]
    fn array_destructuring() {
        let lua = compile("let [a, , b, ...rest] = xs;");
        assert!(lua.contains("local __destructure_1 = xs"), "{}", lua);
        assert!(lua.contains("local a = __destructure_1[1]"), "{}", lua);
        assert!(lua.contains("local b = __destructure_1[3]"), "{}", lua);
        assert!(lua.contains("local rest = _LS.slice(__destructure_1, 4)"), "{}", lua);
    }

    #[test]
    fn array_destructuring_with_default() {
        let lua = compile("let [a = 5] = xs;");
        assert!(lua.contains("local a = __destructure_1[1]"), "{}", lua);
        assert!(lua.contains("if a == nil then a = 5 end"), "{}", lua);
    }

    #[test]
    fn object_destructuring() {
        let lua = compile("let {x, y: alias, ...rest} = obj;");
        assert!(lua.contains("local x = __destructure_1.x"), "{}", lua);
        assert!(lua.contains("local alias = __destructure_1.y"), "{}", lua);
        assert!(
            lua.contains(
                "for k, v in pairs(__destructure_1) do if k ~= \"x\" and k ~= \"y\" then rest[k] = v end end"
            ),
            "{}",
            lua
        );
    }

    #[test]
    fn nested_destructuring() {
        let lua = compile("let [a, [b, c]] = xs;");
        assert!(lua.contains("local __destructure_2 = __destructure_1[2]"), "{}", lua);
        assert!(lua.contains("local b = __destructure_2[1]"), "{}", lua);
    }

    #[test]
    fn var_destructuring_assigns_globals() {
        let lua = compile("var [a, b] = xs;");
        assert!(lua.contains("\na = __destructure_1[1]"), "{}", lua);
        assert!(!lua.contains("local a ="), "{}", lua);
    }

    #[test]
    fn function_declaration() {
        let lua = compile("function add(a, b) { return a + b; }");
        assert!(lua.contains("function add(a, b)"), "{}", lua);
        assert!(lua.contains("return (a + b)"), "{}", lua);
        assert!(lua.contains("\nend"), "{}", lua);
    }

    #[test]
    fn mathematical_function_is_local() {
        let lua = compile("f(x) = x × 2;");
        assert!(lua.contains("local function f(x)"), "{}", lua);
        assert!(lua.contains("return (x * 2)"), "{}", lua);
    }

    #[test]
    fn if_else_chain_uses_elseif() {
        let lua = compile("if (a) { x; } else if (b) { y; } else { z; }");
        assert!(lua.contains("if a then"), "{}", lua);
        assert!(lua.contains("elseif b then"), "{}", lua);
        assert!(lua.contains("else\n"), "{}", lua);
        // One terminating end for the whole chain.
        assert_eq!(lua.matches("\nend").count(), 1, "{}", lua);
    }

    #[test]
    fn while_loop() {
        let lua = compile("while (x > 0) { x--; }");
        assert!(lua.contains("while (x > 0) do"), "{}", lua);
        assert!(lua.contains("x = x - 1"), "{}", lua);
    }

    #[test]
    fn c_style_for_loop() {
        let lua = compile("for (let i = 0; i < 10; i++) { console.log(i); }");
        assert!(lua.contains("local i = 0"), "{}", lua);
        assert!(lua.contains("while true do"), "{}", lua);
        assert!(lua.contains("if not ((i < 10)) then break end"), "{}", lua);
        assert!(lua.contains("print(i)"), "{}", lua);
        assert!(lua.contains("  i = i + 1"), "{}", lua);
    }

    #[test]
    fn for_loop_without_test_has_no_break() {
        let lua = compile("for (;;) { break; }");
        assert!(lua.contains("while true do"), "{}", lua);
        assert!(!lua.contains("if not"), "{}", lua);
    }

    #[test]
    fn for_of_loop() {
        let lua = compile("for (let n of xs) { console.log(n); }");
        assert!(lua.contains("for _, n in ipairs(xs) do"), "{}", lua);
        assert!(lua.contains("print(n)"), "{}", lua);
    }

    #[test]
    fn continue_emits_goto_and_label() {
        let lua = compile("for (let n of xs) { if (n) { continue; } console.log(n); }");
        assert!(lua.contains("goto continue"), "{}", lua);
        assert!(lua.contains("::continue::"), "{}", lua);
    }

    #[test]
    fn continue_label_precedes_update_in_c_style_for() {
        let lua = compile("for (let i = 0; i < 9; i++) { continue; }");
        let label = lua.find("::continue::").unwrap();
        let update = lua.find("i = i + 1").unwrap();
        assert!(label < update, "{}", lua);
    }

    #[test]
    fn loop_without_continue_has_no_label() {
        let lua = compile("while (a) { b; }");
        assert!(!lua.contains("::continue::"), "{}", lua);
    }

    #[test]
    fn nested_loop_owns_its_continue() {
        let lua = compile("while (a) { for (let n of xs) { continue; } }");
        // The label belongs to the inner loop only.
        assert_eq!(lua.matches("::continue::").count(), 1, "{}", lua);
        let label = lua.find("::continue::").unwrap();
        let inner_end = lua.rfind("  end").unwrap();
        assert!(label < inner_end, "{}", lua);
    }

    #[test]
    fn try_catch_uses_pcall() {
        let lua = compile("try { risky(); } catch (e) { console.log(e); }");
        assert!(lua.contains("local success, error = pcall(function()"), "{}", lua);
        assert!(lua.contains("if not success then"), "{}", lua);
        assert!(lua.contains("local e = error"), "{}", lua);
        assert!(lua.contains("print(e)"), "{}", lua);
    }

    #[test]
    fn try_finally_appends_finalizer() {
        let lua = compile("try { a(); } finally { b(); }");
        assert!(lua.contains("-- Finally block"), "{}", lua);
        assert!(lua.contains("b()"), "{}", lua);
    }

    #[test]
    fn throw_becomes_error() {
        let lua = compile("throw \"boom\";");
        assert!(lua.contains("error(\"boom\")"), "{}", lua);
    }

    #[test]
    fn class_emission() {
        let lua = compile(
            "class V { constructor(x, y) { this.x = x; this.y = y; } mag() { return √(this.x² + this.y²); } }",
        );
        assert!(lua.contains("local V = {}"), "{}", lua);
        assert!(lua.contains("V.__index = V"), "{}", lua);
        assert!(lua.contains("function V.new(x, y)"), "{}", lua);
        assert!(lua.contains("local self = setmetatable({}, V)"), "{}", lua);
        assert!(lua.contains("self.x = x"), "{}", lua);
        assert!(lua.contains("return self"), "{}", lua);
        assert!(lua.contains("function V:mag()"), "{}", lua);
        assert!(
            lua.contains("return math.sqrt(((self.x ^ 2) + (self.y ^ 2)))"),
            "{}",
            lua
        );
    }

    #[test]
    fn static_members_use_dot_definitions() {
        let lua = compile("class C { static make() { return new C(); } }");
        assert!(lua.contains("function C.make()"), "{}", lua);
        assert!(!lua.contains("function C:make()"), "{}", lua);
    }

    #[test]
    fn class_without_constructor_gets_default_new() {
        let lua = compile("class C { m() { return 1; } }");
        assert!(lua.contains("function C.new()"), "{}", lua);
        assert!(lua.contains("return self"), "{}", lua);
    }

    #[test]
    fn superclass_links_metatable() {
        let lua = compile("class D extends B { m() { return 1; } }");
        assert!(lua.contains("setmetatable(D, { __index = B })"), "{}", lua);
    }

    #[test]
    fn accessors_emit_as_methods() {
        let lua = compile("class C { get size() { return 1; } set size(v) { this.n = v; } }");
        assert!(lua.contains("function C:size()"), "{}", lua);
    }

    #[test]
    fn standalone_block_statements_flatten() {
        let lua = compile("{ let a = 1; }");
        assert!(lua.contains("local a = 1"), "{}", lua);
    }
}
