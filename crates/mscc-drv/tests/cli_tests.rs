//! CLI round trips for the `mscc` binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn compiles_a_file_next_to_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("area.ls");
    std::fs::write(&source, "let area = π × r²;\n").unwrap();

    Command::cargo_bin("mscc")
        .unwrap()
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled:"));

    let lua = std::fs::read_to_string(dir.path().join("area.lua")).unwrap();
    assert!(lua.contains("local area = (math.pi * (r ^ 2))"), "{}", lua);
}

#[test]
fn explicit_compile_subcommand() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("hello.ls");
    std::fs::write(&source, "console.log(`hi ${name}`);\n").unwrap();

    Command::cargo_bin("mscc")
        .unwrap()
        .args(["compile", source.to_str().unwrap()])
        .assert()
        .success();

    let lua = std::fs::read_to_string(dir.path().join("hello.lua")).unwrap();
    assert!(lua.contains("print(string.format(\"hi %s\", name))"), "{}", lua);
}

#[test]
fn tokens_subcommand_dumps_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("t.ls");
    std::fs::write(&source, "let x = π;\n").unwrap();

    Command::cargo_bin("mscc")
        .unwrap()
        .args(["tokens", source.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("MathPi"))
        .stdout(predicate::str::contains("Eof"));
}

#[test]
fn compile_errors_exit_nonzero_with_position() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("bad.ls");
    std::fs::write(&source, "break;\n").unwrap();

    Command::cargo_bin("mscc")
        .unwrap()
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error at line 1"))
        .stderr(predicate::str::contains("break"));
}

#[test]
fn missing_file_is_reported() {
    Command::cargo_bin("mscc")
        .unwrap()
        .arg("no_such_file.ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn usage_error_without_arguments() {
    Command::cargo_bin("mscc")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage: mscc"));
}
