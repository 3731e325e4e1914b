//! Expression emission.

use mscc_par::ast::*;
use mscc_util::GenError;

use crate::{array_method, escape_format_text, escape_lua_string, indent, Generator, STRING_METHODS};

impl Generator {
    pub(crate) fn emit_expr(&mut self, expr: &Expr) -> Result<String, GenError> {
        match expr {
            Expr::Literal(lit) => Ok(emit_literal(lit)),
            Expr::MathConst(c) => Ok(math_const_lua(c.kind).to_string()),
            Expr::Identifier(id) => Ok(emit_identifier(id)),
            Expr::Array(array) => self.emit_array(array),
            Expr::Object(object) => self.emit_object(object),
            Expr::Template(template) => self.emit_template(template),
            Expr::Member(member) => self.emit_member(member),
            Expr::Call(call) => self.emit_call(call),
            Expr::New(new) => self.emit_new(new),
            Expr::Assign(assign) => self.emit_assign(assign),
            Expr::Binary(binary) => self.emit_binary(binary),
            Expr::Unary(unary) => self.emit_unary(unary),
            Expr::Update(update) => self.emit_update(update),
            Expr::Conditional(cond) => self.emit_conditional(cond),
            Expr::Arrow(arrow) => self.emit_arrow(arrow),
            Expr::Spread(_) => Ok("-- Unhandled node type: SpreadElement".to_string()),
        }
    }

    pub(crate) fn emit_args(&mut self, args: &[Expr]) -> Result<String, GenError> {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(self.emit_expr(arg)?);
        }
        Ok(parts.join(", "))
    }

    /// Array literals install the runtime method metatable.
    fn emit_array(&mut self, array: &ArrayLit) -> Result<String, GenError> {
        let mut elements = Vec::with_capacity(array.elements.len());
        for element in &array.elements {
            match element {
                Some(expr) => elements.push(self.emit_expr(expr)?),
                None => elements.push("nil".to_string()),
            }
        }
        Ok(format!("_LS.array({{{}}})", elements.join(", ")))
    }

    fn emit_object(&mut self, object: &ObjectLit) -> Result<String, GenError> {
        if object.members.is_empty() {
            return Ok("{}".to_string());
        }
        let mut lines = vec!["{".to_string()];
        for member in &object.members {
            match member {
                ObjectMember::Property { key, value, .. } => {
                    let value_code = self.emit_expr(value)?;
                    match key {
                        PropertyKey::Identifier(name) => {
                            lines.push(format!("  {} = {},", name, value_code));
                        }
                        PropertyKey::Str(s) => {
                            lines.push(format!("  [\"{}\"] = {},", escape_lua_string(s), value_code));
                        }
                        PropertyKey::Number(n) => {
                            lines.push(format!("  [{}] = {},", n, value_code));
                        }
                        PropertyKey::Computed(expr) => {
                            let key_code = self.emit_expr(expr)?;
                            lines.push(format!("  [{}] = {},", key_code, value_code));
                        }
                    }
                }
                ObjectMember::Method { key, func } => {
                    let (params, prelude) = self.lower_params(&func.params)?;
                    let mut body = prelude.join("\n");
                    let block = self.emit_block(&func.body)?;
                    if !block.trim().is_empty() {
                        if !body.is_empty() {
                            body.push('\n');
                        }
                        body.push_str(&block);
                    }
                    let name = match key {
                        PropertyKey::Identifier(n) => n.clone(),
                        PropertyKey::Str(s) => format!("[\"{}\"]", escape_lua_string(s)),
                        PropertyKey::Number(n) => format!("[{}]", n),
                        PropertyKey::Computed(_) => {
                            return Err(GenError::new(
                                "ObjectExpression",
                                "computed method keys are not supported",
                            ))
                        }
                    };
                    lines.push(format!(
                        "  {} = function({})\n{}\n  end,",
                        name,
                        params,
                        indent(&indent(&body))
                    ));
                }
                ObjectMember::Spread(_) => {
                    lines.push("  -- Unhandled node type: SpreadElement".to_string());
                }
            }
        }
        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }

    /// Templates with interpolations become `string.format` with one `%s`
    /// per expression.
    fn emit_template(&mut self, template: &TemplateLit) -> Result<String, GenError> {
        if template.quasis.is_empty() {
            return Err(GenError::new("TemplateLiteral", "template without text parts"));
        }
        if template.expressions.is_empty() {
            return Ok(format!("\"{}\"", escape_lua_string(&template.quasis[0].text)));
        }

        let mut format_str = String::new();
        let mut args = Vec::with_capacity(template.expressions.len());
        for (i, expr) in template.expressions.iter().enumerate() {
            if let Some(quasi) = template.quasis.get(i) {
                format_str.push_str(&escape_format_text(&quasi.text));
            }
            format_str.push_str("%s");
            args.push(self.emit_expr(expr)?);
        }
        if template.quasis.len() > template.expressions.len() {
            format_str.push_str(&escape_format_text(
                &template.quasis[template.quasis.len() - 1].text,
            ));
        }

        Ok(format!(
            "string.format(\"{}\", {})",
            format_str,
            args.join(", ")
        ))
    }

    fn emit_member(&mut self, member: &MemberExpr) -> Result<String, GenError> {
        let object = self.emit_member_object(&member.object)?;
        match &member.property {
            MemberProp::Named(name) => Ok(format!("{}.{}", object, name)),
            MemberProp::Computed(expr) => {
                let prop = self.emit_expr(expr)?;
                Ok(format!("{}[{}]", object, prop))
            }
        }
    }

    /// `Math` maps to Lua's `math` table in receiver position.
    fn emit_member_object(&mut self, object: &Expr) -> Result<String, GenError> {
        if let Expr::Identifier(id) = object {
            if id.name == "Math" {
                return Ok("math".to_string());
            }
        }
        self.emit_expr(object)
    }

    fn emit_call(&mut self, call: &CallExpr) -> Result<String, GenError> {
        if let Expr::Member(member) = call.callee.as_ref() {
            if let MemberProp::Named(method) = &member.property {
                if let Expr::Identifier(receiver) = member.object.as_ref() {
                    // console.log(...) -> print(...)
                    if receiver.name == "console" && method == "log" {
                        return Ok(format!("print({})", self.emit_args(&call.arguments)?));
                    }
                    // Math.<m>(...) -> math.<m>(...), dot dispatch.
                    if receiver.name == "Math" {
                        return Ok(format!(
                            "math.{}({})",
                            method,
                            self.emit_args(&call.arguments)?
                        ));
                    }
                }
                // Array methods route through the runtime table with the
                // receiver as first argument.
                if let Some(runtime_fn) = array_method(method) {
                    let mut args = vec![self.emit_expr(&member.object)?];
                    for arg in &call.arguments {
                        args.push(self.emit_expr(arg)?);
                    }
                    return Ok(format!("{}({})", runtime_fn, args.join(", ")));
                }
                // Everything else is user code: colon dispatch.
                let receiver = self.emit_expr(&member.object)?;
                return Ok(format!(
                    "{}:{}({})",
                    receiver,
                    method,
                    self.emit_args(&call.arguments)?
                ));
            }
        }

        let callee = self.emit_expr(&call.callee)?;
        Ok(format!("{}({})", callee, self.emit_args(&call.arguments)?))
    }

    fn emit_new(&mut self, new: &NewExpr) -> Result<String, GenError> {
        let callee = self.emit_expr(&new.callee)?;
        Ok(format!("{}.new({})", callee, self.emit_args(&new.arguments)?))
    }

    fn emit_assign(&mut self, assign: &AssignExpr) -> Result<String, GenError> {
        let target = self.emit_expr(&assign.target)?;
        let value = self.emit_expr(&assign.value)?;
        Ok(match assign.op {
            AssignOp::Assign => format!("{} = {}", target, value),
            AssignOp::AddAssign => format!("{} = {} + {}", target, target, value),
            AssignOp::SubAssign => format!("{} = {} - {}", target, target, value),
            AssignOp::MulAssign => format!("{} = {} * {}", target, target, value),
            AssignOp::DivAssign => format!("{} = {} / {}", target, target, value),
        })
    }

    fn emit_binary(&mut self, binary: &BinaryExpr) -> Result<String, GenError> {
        let left = self.emit_expr(&binary.left)?;
        let right = self.emit_expr(&binary.right)?;
        let op = match binary.op {
            BinOp::Add => {
                if is_string_concatenation(&binary.left, &binary.right) {
                    ".."
                } else {
                    "+"
                }
            }
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
            BinOp::Eq | BinOp::StrictEq => "==",
            BinOp::Ne | BinOp::StrictNe => "~=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        };
        Ok(format!("({} {} {})", left, op, right))
    }

    fn emit_unary(&mut self, unary: &UnaryExpr) -> Result<String, GenError> {
        let operand = self.emit_expr(&unary.operand)?;
        Ok(match unary.op {
            UnaryOp::Not => format!("not {}", operand),
            UnaryOp::Neg => format!("-{}", operand),
            UnaryOp::Pos => format!("+{}", operand),
            UnaryOp::Sqrt => format!("math.sqrt({})", operand),
        })
    }

    /// Expression-position update. Prefix emits the `(x = x + 1)` form,
    /// legal in Lua only inside a call; postfix needs the old value, hence
    /// the immediately-invoked function. Statement position uses
    /// [`Generator::emit_update_statement`] instead.
    fn emit_update(&mut self, update: &UpdateExpr) -> Result<String, GenError> {
        let target = self.emit_expr(&update.operand)?;
        let op = update_op(update.op);
        if update.prefix {
            Ok(format!("({} = {} {} 1)", target, target, op))
        } else {
            Ok(format!(
                "(function() local temp = {}; {} = {} {} 1; return temp end)()",
                target, target, target, op
            ))
        }
    }

    /// `x++;` in statement position lowers to plain `x = x + 1`.
    pub(crate) fn emit_update_statement(&mut self, update: &UpdateExpr) -> Result<String, GenError> {
        let target = self.emit_expr(&update.operand)?;
        let op = update_op(update.op);
        Ok(format!("{} = {} {} 1", target, target, op))
    }

    /// The `and ... or` idiom; misbehaves when the middle operand is falsy,
    /// a documented limitation.
    fn emit_conditional(&mut self, cond: &CondExpr) -> Result<String, GenError> {
        let test = self.emit_expr(&cond.test)?;
        let consequent = self.emit_expr(&cond.consequent)?;
        let alternate = self.emit_expr(&cond.alternate)?;
        Ok(format!("({} and {} or {})", test, consequent, alternate))
    }

    fn emit_arrow(&mut self, arrow: &ArrowFn) -> Result<String, GenError> {
        let (params, prelude) = self.lower_params(&arrow.params)?;
        match &arrow.body {
            ArrowBody::Expr(expr) => {
                let body = self.emit_expr(expr)?;
                if prelude.is_empty() {
                    Ok(format!("function({}) return {} end", params, body))
                } else {
                    Ok(format!(
                        "function({})\n{}\n  return {}\nend",
                        params,
                        indent(&prelude.join("\n")),
                        body
                    ))
                }
            }
            ArrowBody::Block(block) => {
                let mut body = prelude.join("\n");
                let block_code = self.emit_block(block)?;
                if !block_code.trim().is_empty() {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(&block_code);
                }
                Ok(format!("function({})\n{}\nend", params, indent(&body)))
            }
        }
    }

    /// Lowers a parameter list to its Lua spelling plus prelude lines for
    /// defaults (`if p == nil then p = d end`) and a rest parameter
    /// (varargs collected into a runtime array).
    pub(crate) fn lower_params(
        &mut self,
        params: &[Param],
    ) -> Result<(String, Vec<String>), GenError> {
        let mut names = Vec::with_capacity(params.len());
        let mut prelude = Vec::new();
        for param in params {
            if param.is_rest {
                names.push("...".to_string());
                prelude.push(format!("local {} = _LS.array({{...}})", param.name));
            } else {
                names.push(param.name.clone());
                if let Some(default) = &param.default {
                    let default_code = self.emit_expr(default)?;
                    prelude.push(format!(
                        "if {} == nil then {} = {} end",
                        param.name, param.name, default_code
                    ));
                }
            }
        }
        Ok((names.join(", "), prelude))
    }
}

pub(crate) fn emit_literal(literal: &Literal) -> String {
    match &literal.value {
        LitValue::Number(raw) => raw.clone(),
        LitValue::Str(s) => format!("\"{}\"", escape_lua_string(s)),
        LitValue::Bool(true) => "true".to_string(),
        LitValue::Bool(false) => "false".to_string(),
        LitValue::Nil => "nil".to_string(),
    }
}

/// `this` is rewritten to `self`; a subscript becomes a name suffix
/// (`x₂` -> `x_2`).
pub(crate) fn emit_identifier(id: &Identifier) -> String {
    let base = if id.name == "this" { "self" } else { &id.name };
    match &id.subscript {
        Some(sub) => format!("{}_{}", base, sub),
        None => base.to_string(),
    }
}

pub(crate) fn math_const_lua(kind: MathConstKind) -> &'static str {
    match kind {
        MathConstKind::Pi => "math.pi",
        MathConstKind::E => "math.exp(1)",
        MathConstKind::Phi => "((1 + math.sqrt(5)) / 2)",
        MathConstKind::Infinity => "math.huge",
    }
}

fn update_op(op: UpdateOp) -> &'static str {
    match op {
        UpdateOp::Increment => "+",
        UpdateOp::Decrement => "-",
    }
}

/// Structural classification of `+`: concatenation when either side is
/// string-shaped. Purely syntactic, no type inference.
pub(crate) fn is_string_concatenation(left: &Expr, right: &Expr) -> bool {
    is_string_shaped(left) || is_string_shaped(right)
}

fn is_string_shaped(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(Literal {
            value: LitValue::Str(_),
            ..
        }) => true,
        Expr::Template(_) => true,
        Expr::Call(call) => match call.callee.as_ref() {
            Expr::Member(member) => matches!(
                &member.property,
                MemberProp::Named(name) if STRING_METHODS.contains(&name.as_str())
            ),
            _ => false,
        },
        Expr::Binary(binary) if binary.op == BinOp::Add => {
            is_string_concatenation(&binary.left, &binary.right)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;

    fn compile(source: &str) -> String {
        let tokens = mscc_lex::tokenize(source).unwrap();
        let program = mscc_par::parse(tokens).unwrap();
        generate(&program).unwrap()
    }

    #[test]
    fn mathematical_literal_expression() {
        let lua = compile("let a = π × 2² + √9;");
        assert!(
            lua.contains("local a = ((math.pi * (2 ^ 2)) + math.sqrt(9))"),
            "{}",
            lua
        );
    }

    #[test]
    fn math_constants_lower_to_lua() {
        let lua = compile("let a = ℯ; let b = φ; let c = ∞;");
        assert!(lua.contains("local a = math.exp(1)"));
        assert!(lua.contains("local b = ((1 + math.sqrt(5)) / 2)"));
        assert!(lua.contains("local c = math.huge"));
    }

    #[test]
    fn array_method_chain() {
        let lua = compile("let s = [1,2,3].map(x => x × 2).reduce((a,b) => a + b, 0);");
        assert!(
            lua.contains(
                "_LS.reduce(_LS.map(_LS.array({1, 2, 3}), function(x) return (x * 2) end), function(a, b) return (a + b) end, 0)"
            ),
            "{}",
            lua
        );
    }

    #[test]
    fn console_log_becomes_print() {
        let lua = compile("console.log(x, 2);");
        assert!(lua.contains("print(x, 2)"), "{}", lua);
    }

    #[test]
    fn math_calls_use_dot_dispatch() {
        let lua = compile("let y = Math.floor(x);");
        assert!(lua.contains("math.floor(x)"), "{}", lua);
    }

    #[test]
    fn math_member_access() {
        let lua = compile("let y = Math.pi;");
        assert!(lua.contains("local y = math.pi"), "{}", lua);
    }

    #[test]
    fn user_method_calls_use_colon_dispatch() {
        let lua = compile("v.scale(2);");
        assert!(lua.contains("v:scale(2)"), "{}", lua);
    }

    #[test]
    fn array_method_on_arbitrary_receiver() {
        let lua = compile("xs.forEach(f);");
        assert!(lua.contains("_LS.forEach(xs, f)"), "{}", lua);
    }

    #[test]
    fn computed_member() {
        let lua = compile("let v = t[i + 1];");
        assert!(lua.contains("t[(i + 1)]"), "{}", lua);
    }

    #[test]
    fn string_plus_is_concatenation() {
        let lua = compile("let s = \"a\" + b;");
        assert!(lua.contains("(\"a\" .. b)"), "{}", lua);
        let lua = compile("let s = a + b;");
        assert!(lua.contains("(a + b)"), "{}", lua);
    }

    #[test]
    fn concatenation_propagates_through_plus_subtrees() {
        let lua = compile("let s = \"a\" + b + c;");
        assert!(lua.contains("((\"a\" .. b) .. c)"), "{}", lua);
    }

    #[test]
    fn string_method_calls_are_string_shaped() {
        let lua = compile("let s = x.toString() + y;");
        assert!(lua.contains(".."), "{}", lua);
    }

    #[test]
    fn template_without_interpolation_is_plain_string() {
        let lua = compile("let g = `hi`;");
        assert!(lua.contains("local g = \"hi\""), "{}", lua);
    }

    #[test]
    fn template_with_interpolations() {
        let lua = compile("let g = `Hi ${name}, area=${r²}`;");
        assert!(
            lua.contains("string.format(\"Hi %s, area=%s\", name, (r ^ 2))"),
            "{}",
            lua
        );
    }

    #[test]
    fn template_percent_is_doubled() {
        let lua = compile("let g = `100% of ${x}`;");
        assert!(lua.contains("string.format(\"100%% of %s\", x)"), "{}", lua);
    }

    #[test]
    fn equality_operators() {
        let lua = compile("let t = a === b; let u = a !== b; let v = a != b; let w = a ≠ b;");
        assert!(lua.contains("local t = (a == b)"));
        assert!(lua.contains("local u = (a ~= b)"));
        assert!(lua.contains("local v = (a ~= b)"));
        assert!(lua.contains("local w = (a ~= b)"));
    }

    #[test]
    fn logical_operators() {
        let lua = compile("let t = a && b || c;");
        assert!(lua.contains("((a and b) or c)"), "{}", lua);
    }

    #[test]
    fn unary_operators() {
        let lua = compile("let t = !a; let u = -b; let v = √c;");
        assert!(lua.contains("not a"));
        assert!(lua.contains("-b"));
        assert!(lua.contains("math.sqrt(c)"));
    }

    #[test]
    fn conditional_uses_and_or() {
        let lua = compile("let m = a > b ? a : b;");
        assert!(lua.contains("((a > b) and a or b)"), "{}", lua);
    }

    #[test]
    fn subscript_identifier_maps_to_suffix() {
        let lua = compile("let v = x₂ + 1;");
        assert!(lua.contains("(x_2 + 1)"), "{}", lua);
    }

    #[test]
    fn new_expression_calls_constructor() {
        let lua = compile("let v = new V(3, 4);");
        assert!(lua.contains("local v = V.new(3, 4)"), "{}", lua);
    }

    #[test]
    fn object_literal_emission() {
        let lua = compile("let o = {a: 1, b, \"k\": 2, [x]: 3};");
        assert!(lua.contains("a = 1,"), "{}", lua);
        assert!(lua.contains("b = b,"), "{}", lua);
        assert!(lua.contains("[\"k\"] = 2,"), "{}", lua);
        assert!(lua.contains("[x] = 3,"), "{}", lua);
    }

    #[test]
    fn object_method_is_nested_function() {
        let lua = compile("let o = {m(a) { return a; }};");
        assert!(lua.contains("m = function(a)"), "{}", lua);
    }

    #[test]
    fn empty_object() {
        let lua = compile("let o = {};");
        assert!(lua.contains("local o = {}"), "{}", lua);
    }

    #[test]
    fn compound_assignment_expands() {
        let lua = compile("x += 2; y *= 3;");
        assert!(lua.contains("x = x + 2"));
        assert!(lua.contains("y = y * 3"));
    }

    #[test]
    fn prefix_update_in_expression_position() {
        let lua = compile("let y = f(++x);");
        assert!(lua.contains("(x = x + 1)"), "{}", lua);
    }

    #[test]
    fn postfix_update_in_expression_position_is_iife() {
        let lua = compile("let y = f(x++);");
        assert!(
            lua.contains("(function() local temp = x; x = x + 1; return temp end)()"),
            "{}",
            lua
        );
    }

    #[test]
    fn spread_is_unhandled() {
        let lua = compile("f(...xs);");
        assert!(lua.contains("-- Unhandled node type: SpreadElement"), "{}", lua);
    }

    #[test]
    fn default_parameters_lower_to_nil_checks() {
        let lua = compile("function f(a, b = 2) { return a; }");
        assert!(lua.contains("if b == nil then b = 2 end"), "{}", lua);
    }

    #[test]
    fn rest_parameter_lowers_to_varargs() {
        let lua = compile("function f(a, ...rest) { return a; }");
        assert!(lua.contains("function f(a, ...)"), "{}", lua);
        assert!(lua.contains("local rest = _LS.array({...})"), "{}", lua);
    }
}
