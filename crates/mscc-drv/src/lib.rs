//! mscc-drv - Compiler driver for MathScript.
//!
//! Orchestrates the three phases in sequence:
//!
//! ```text
//! source (.ls)
//!     |
//!     v
//! [mscc-lex]  -> token list
//!     |
//!     v
//! [mscc-par]  -> AST
//!     |
//!     v
//! [mscc-gen]  -> Lua source (.lua)
//! ```
//!
//! A compilation is a pure function of its input: no I/O, no logging, no
//! shared state. The first error from any phase aborts and is returned to
//! the host unchanged inside [`CompileError`]. File handling lives in
//! [`compile_file`], used by the `mscc` binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use mscc_lex::Token;
use mscc_util::CompileError;

/// Tokenizes MathScript source; intended for debug and inspection tools.
///
/// The filename is accepted for symmetry with [`compile`]; diagnostics
/// carry line/column and the host attaches the filename when reporting.
pub fn tokenize(source: &str, _filename: Option<&str>) -> Result<Vec<Token>, CompileError> {
    Ok(mscc_lex::tokenize(source)?)
}

/// Compiles MathScript source to Lua source.
///
/// Equivalent to generate(parse(tokenize(source))) with the runtime-import
/// prelude prepended by the generator.
///
/// # Example
///
/// ```
/// let lua = mscc_drv::compile("let a = π × 2;", None).unwrap();
/// assert!(lua.starts_with("local _LS = require"));
/// assert!(lua.contains("local a = (math.pi * 2)"));
/// ```
pub fn compile(source: &str, _filename: Option<&str>) -> Result<String, CompileError> {
    let tokens = mscc_lex::tokenize(source)?;
    let program = mscc_par::parse(tokens)?;
    let lua = mscc_gen::generate(&program)?;
    Ok(lua)
}

/// Output path for a source file: the same path with the suffix replaced
/// by `.lua`.
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension("lua")
}

/// Reads a `.ls` file, compiles it, and writes the `.lua` sibling.
/// Returns the output path.
pub fn compile_file(source: &Path) -> anyhow::Result<PathBuf> {
    let text = fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    let lua = compile(&text, source.to_str())
        .map_err(|e| anyhow::anyhow!("{}: {}", source.display(), e.render()))?;
    let out = output_path(source);
    fs::write(&out, lua).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_is_deterministic() {
        let source = "let s = [1, 2].map(x => x × 2); f(x) = x²;";
        assert_eq!(compile(source, None).unwrap(), compile(source, None).unwrap());
    }

    #[test]
    fn compile_composes_the_stages() {
        let source = "let a = 1;";
        let tokens = tokenize(source, None).unwrap();
        let program = mscc_par::parse(tokens).unwrap();
        let direct = mscc_gen::generate(&program).unwrap();
        assert_eq!(compile(source, None).unwrap(), direct);
    }

    #[test]
    fn tokenize_exposes_the_stream() {
        let tokens = tokenize("let a = 1;", Some("t.ls")).unwrap();
        assert_eq!(tokens.last().unwrap().kind, mscc_lex::TokenKind::Eof);
    }

    #[test]
    fn lex_errors_pass_through_unchanged() {
        let err = compile("let s = \"abc", None).unwrap_err();
        match err {
            CompileError::Lex(e) => assert!(e.message.contains("Unterminated string")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_errors_pass_through_unchanged() {
        let err = compile("break;", None).unwrap_err();
        match err {
            CompileError::Parse(e) => {
                assert!(e.message.contains("break"));
                assert!(e.message.contains("loop"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn output_path_replaces_suffix() {
        assert_eq!(
            output_path(Path::new("demo/area.ls")),
            PathBuf::from("demo/area.lua")
        );
    }
}
