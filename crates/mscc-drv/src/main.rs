use std::path::Path;
use std::process::ExitCode;

use anyhow::bail;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["compile", path] => compile(Path::new(path)),
        ["tokens", path] => show_tokens(Path::new(path)),
        [path] if !path.starts_with('-') => compile(Path::new(path)),
        _ => bail!("usage: mscc [compile|tokens] <file.ls>"),
    }
}

fn compile(source: &Path) -> anyhow::Result<()> {
    let out = mscc_drv::compile_file(source)?;
    println!("Compiled: {} -> {}", source.display(), out.display());
    Ok(())
}

/// Debug view of the token stream.
fn show_tokens(source: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(source)?;
    let tokens = mscc_drv::tokenize(&text, source.to_str())
        .map_err(|e| anyhow::anyhow!("{}: {}", source.display(), e.render()))?;
    for token in &tokens {
        match token.unicode_name {
            Some(name) => println!(
                "{}:{}\t{:?}\t'{}'\t({})",
                token.line, token.column, token.kind, token.lexeme, name
            ),
            None => println!(
                "{}:{}\t{:?}\t'{}'",
                token.line, token.column, token.kind, token.lexeme
            ),
        }
    }
    Ok(())
}
