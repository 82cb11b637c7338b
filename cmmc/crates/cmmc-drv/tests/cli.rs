//! End-to-end tests of the `cmmc` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn cmmc() -> Command {
    Command::cargo_bin("cmmc").expect("binary built")
}

/// Write a source file the commands can point at.
fn source_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(source.as_bytes()).expect("write source");
    file
}

#[test]
fn help_lists_modes() {
    cmmc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lexer"))
        .stdout(predicate::str::contains("execute"));
}

#[test]
fn version_prints() {
    cmmc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cmmc"));
}

#[test]
fn execute_from_file() {
    let file = source_file("void main(void){ write(1+2); }");
    cmmc()
        .arg("execute")
        .arg(file.path())
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn execute_source_from_stdin() {
    cmmc()
        .arg("compile")
        .write_stdin("void main(void){ write(1); }")
        .assert()
        .success()
        .stdout(predicate::str::contains("f="));
}

#[test]
fn execute_reads_program_input_from_stdin() {
    let file = source_file("void main(void){ int x; x = read(); write(x + 1); }");
    cmmc()
        .arg("execute")
        .arg(file.path())
        .write_stdin("41\n")
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn lexer_mode_lists_tokens() {
    let file = source_file("int a;");
    cmmc()
        .arg("lexer")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("<INT: 'int'>"));
}

#[test]
fn parser_mode_prints_tree() {
    let file = source_file("void main(void){ }");
    cmmc()
        .arg("parser")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("|----> ExterStmts"));
}

#[test]
fn semantic_mode_prints_scopes() {
    let file = source_file("int g; void main(void){ }");
    cmmc()
        .arg("semantic")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("int : \"g\""));
}

#[test]
fn semantic_error_fails_with_diagnostic() {
    let file = source_file("void main(void){ int x; real y; x = y; }");
    cmmc()
        .arg("execute")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("type-mismatch 'x'"));
}

#[test]
fn missing_main_fails() {
    let file = source_file("int f(void){ return 1; }");
    cmmc()
        .arg("execute")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-main"));
}

#[test]
fn syntax_error_shows_caret() {
    let file = source_file("void main(void){ x = ; }");
    cmmc()
        .arg("execute")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid token near"))
        .stderr(predicate::str::contains("^"));
}

#[test]
fn runtime_error_fails() {
    let file = source_file("void main(void){ write(1 / 0); }");
    cmmc()
        .arg("execute")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("divide-by-zero"));
}

#[test]
fn missing_file_reports_io_error() {
    cmmc()
        .arg("execute")
        .arg("no/such/file.cmm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
