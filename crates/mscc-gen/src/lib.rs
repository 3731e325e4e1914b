//! mscc-gen - Lua code generation for MathScript.
//!
//! A direct, non-optimizing tree walk: each AST node dispatches to a
//! dedicated emitter returning a Lua source fragment, statements are joined
//! with newlines, and nested blocks are indented two spaces. Every output
//! starts with the runtime import line and a two-line banner; the runtime
//! table `_LS` supplies the JavaScript-flavored array methods and the
//! `array` constructor the emitted code references.
//!
//! Deliberately unsupported node kinds (spread) emit a
//! `-- Unhandled node type: ...` comment instead of failing, so partial
//! input stays debuggable. A malformed tree raises [`GenError`].

mod expr;
mod stmt;

use std::sync::OnceLock;

use mscc_par::Program;
use mscc_util::GenError;
use rustc_hash::FxHashMap;

/// Import line prepended to every compilation unit.
const RUNTIME_IMPORT: &str = "local _LS = require(\"runtime/core/enhanced_runtime\")";

/// Generates Lua source for a parsed program.
///
/// # Example
///
/// ```
/// let tokens = mscc_lex::tokenize("let x = 1;").unwrap();
/// let program = mscc_par::parse(tokens).unwrap();
/// let lua = mscc_gen::generate(&program).unwrap();
/// assert!(lua.contains("local x = 1"));
/// ```
pub fn generate(program: &Program) -> Result<String, GenError> {
    Generator::new().emit_program(program)
}

/// Tree-walking emitter. Carries only the counter used to name
/// destructuring temporaries, so output is deterministic.
pub struct Generator {
    temp_counter: usize,
}

impl Generator {
    pub fn new() -> Self {
        Self { temp_counter: 0 }
    }

    pub fn emit_program(&mut self, program: &Program) -> Result<String, GenError> {
        let mut lines = vec![
            RUNTIME_IMPORT.to_string(),
            String::new(),
            "-- Generated by the MathScript compiler".to_string(),
            "-- Mathematical programming with Unicode operator support".to_string(),
            String::new(),
        ];
        for stmt in &program.statements {
            let code = self.emit_stmt(stmt)?;
            if !code.trim().is_empty() {
                lines.push(code);
            }
        }
        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    pub(crate) fn next_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("__destructure_{}", self.temp_counter)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

/// Indents every nonempty line by two spaces.
pub(crate) fn indent(code: &str) -> String {
    code.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("  {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escapes a string for inclusion in a double-quoted Lua literal.
pub(crate) fn escape_lua_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes template text for a `string.format` pattern: Lua string rules
/// plus `%` doubled so literal percents survive formatting.
pub(crate) fn escape_format_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '%' => out.push_str("%%"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

static ARRAY_METHODS: OnceLock<FxHashMap<&'static str, &'static str>> = OnceLock::new();

/// Maps a JavaScript-flavored array method name to its runtime function.
pub(crate) fn array_method(name: &str) -> Option<&'static str> {
    let table = ARRAY_METHODS.get_or_init(|| {
        let mut m = FxHashMap::default();
        m.insert("map", "_LS.map");
        m.insert("filter", "_LS.filter");
        m.insert("reduce", "_LS.reduce");
        m.insert("forEach", "_LS.forEach");
        m.insert("find", "_LS.find");
        m.insert("some", "_LS.some");
        m.insert("every", "_LS.every");
        m.insert("indexOf", "_LS.indexOf");
        m.insert("includes", "_LS.includes");
        m.insert("slice", "_LS.slice");
        m.insert("concat", "_LS.concat");
        m
    });
    table.get(name).copied()
}

/// Method names whose call results are treated as string-shaped when
/// classifying `+`.
pub(crate) const STRING_METHODS: [&str; 4] = ["toString", "substring", "charAt", "slice"];
