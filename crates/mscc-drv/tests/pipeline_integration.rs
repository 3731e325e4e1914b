//! End-to-end compilation scenarios exercising lexer, parser, and
//! generator together.

use mscc_drv::compile;
use mscc_util::CompileError;

fn compile_ok(source: &str) -> String {
    compile(source, None).unwrap_or_else(|e| panic!("compile failed for {:?}: {}", source, e))
}

/// Whitespace-insensitive containment check.
fn squish(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn mathematical_literal() {
    let lua = compile_ok("let a = π × 2² + √9;");
    assert!(
        squish(&lua).contains(&squish("local a = ((math.pi * (2 ^ 2)) + math.sqrt(9))")),
        "{}",
        lua
    );
}

#[test]
fn array_method_chain() {
    let lua = compile_ok("let s = [1,2,3].map(x => x × 2).reduce((a,b) => a + b, 0);");
    assert!(
        lua.contains(
            "_LS.reduce(_LS.map(_LS.array({1, 2, 3}), function(x) return (x * 2) end), function(a, b) return (a + b) end, 0)"
        ),
        "{}",
        lua
    );
}

#[test]
fn template_literal_with_interpolation() {
    let lua = compile_ok("let g = `Hi ${name}, area=${r²}`;");
    assert!(
        lua.contains("string.format(\"Hi %s, area=%s\", name, (r ^ 2))"),
        "{}",
        lua
    );
}

#[test]
fn class_with_constructor_and_method() {
    let lua = compile_ok(
        "class V { constructor(x,y){ this.x=x; this.y=y; } mag(){ return √(this.x² + this.y²); } }\nlet v = new V(3,4);",
    );
    for expected in [
        "local V = {}",
        "V.__index = V",
        "function V.new(x, y)",
        "self.x = x",
        "self.y = y",
        "return self",
        "function V:mag()",
        "return math.sqrt(((self.x ^ 2) + (self.y ^ 2)))",
        "local v = V.new(3, 4)",
    ] {
        assert!(lua.contains(expected), "missing {:?} in:\n{}", expected, lua);
    }
}

#[test]
fn for_of_loop() {
    let lua = compile_ok("for (let n of xs) { console.log(n); }");
    assert!(
        squish(&lua).contains(&squish("for _, n in ipairs(xs) do print(n) end")),
        "{}",
        lua
    );
}

#[test]
fn return_at_top_level_is_rejected() {
    let err = compile("return 1;", None).unwrap_err();
    match err {
        CompileError::Parse(e) => {
            assert!(e.message.contains("return"), "{}", e.message);
            assert!(e.message.contains("function"), "{}", e.message);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn break_at_top_level_is_rejected() {
    let err = compile("break;", None).unwrap_err();
    match err {
        CompileError::Parse(e) => {
            assert!(e.message.contains("break"), "{}", e.message);
            assert!(e.message.contains("loop"), "{}", e.message);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn repeated_compiles_are_byte_identical() {
    let source = r#"
class Circle {
  constructor(r) { this.r = r; }
  area() { return π × this.r²; }
}
let shapes = [new Circle(1), new Circle(2)];
let areas = shapes.map(s => s.area());
for (let a of areas) { console.log(`area=${a}`); }
"#;
    let first = compile_ok(source);
    let second = compile_ok(source);
    assert_eq!(first, second);
}

#[test]
fn prelude_is_unconditional() {
    // Even pure-print programs carry the runtime import.
    let lua = compile_ok("console.log(1);");
    assert!(
        lua.starts_with("local _LS = require(\"runtime/core/enhanced_runtime\")\n"),
        "{}",
        lua
    );
}

#[test]
fn identifier_and_literal_round_trip() {
    let lua = compile_ok("someName;");
    assert!(lua.contains("someName"), "{}", lua);
    let lua = compile_ok("42.5;");
    assert!(lua.contains("42.5"), "{}", lua);
    let lua = compile_ok("1e10;");
    assert!(lua.contains("1e10"), "{}", lua);
    let lua = compile_ok("\"quote\\\"inside\";");
    assert!(lua.contains("\"quote\\\"inside\""), "{}", lua);
}

#[test]
fn full_showcase_compiles() {
    let source = r#"
// Mathematical constants and operations
let radius = 5.0;
let area = π × radius²;
let circumference = 2 × π × radius;

fast function scale(v, k = 2) {
  return v × k;
}

gauss(x) = ℯ ** (-(x²));

class Vector extends Base {
  constructor(x, y) {
    this.x = x;
    this.y = y;
  }
  mag() { return √(this.x² + this.y²); }
  static zero() { return new Vector(0, 0); }
}

let v = new Vector(3, 4);
let values = [1, 2, 3, 4, 5];
let doubled = values.map(x => x × 2);
let sum = doubled.reduce((a, b) => a + b, 0);

for (let i = 0; i < 5; i++) {
  if (i % 2 == 0) { continue; }
  console.log(`odd: ${i}`);
}

try {
  let [first, ...rest] = values;
  console.log(first);
} catch (e) {
  console.log("failed: " + e);
} finally {
  console.log("done");
}
"#;
    let lua = compile_ok(source);
    for expected in [
        "local radius = 5.0",
        "local area = (math.pi * (radius ^ 2))",
        "function scale(v, k)",
        "if k == nil then k = 2 end",
        "local function gauss(x)",
        "return (math.exp(1) ^ -(x ^ 2))",
        "setmetatable(Vector, { __index = Base })",
        "function Vector.new(x, y)",
        "function Vector:mag()",
        "function Vector.zero()",
        "local v = Vector.new(3, 4)",
        "_LS.reduce(_LS.map(",
        "::continue::",
        "string.format(\"odd: %s\", i)",
        "local success, error = pcall(function()",
        "local first = __destructure_1[1]",
        "local rest = _LS.slice(__destructure_1, 2)",
        "(\"failed: \" .. e)",
        "-- Finally block",
    ] {
        assert!(lua.contains(expected), "missing {:?} in:\n{}", expected, lua);
    }
}
