//! CLI integration tests for plxt.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const LEXER: &str = r#"
let letter = ['a'-'z']

rule tokens =
    letter+      { return ID }
  | '+'          { return PLUS }
  | ';'          { return SEMICOLON }
  | [' ''\n']+   { }
"#;

const GRAMMAR: &str = "\
%token PLUS ID SEMICOLON
statement : E SEMICOLON ;
E : E PLUS T | T ;
T : ID ;
";

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("plxt")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gen"))
        .stdout(predicate::str::contains("parse"));
}

#[test]
fn gen_writes_artifacts() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("lexer.yal"), LEXER).unwrap();
    fs::write(root.join("grammar.yalp"), GRAMMAR).unwrap();

    Command::cargo_bin("plxt")
        .unwrap()
        .arg("gen")
        .arg(root.join("lexer.yal"))
        .arg("--grammar")
        .arg(root.join("grammar.yalp"))
        .arg("--out")
        .arg(root.join("out"))
        .assert()
        .success();

    assert!(root.join("out").join("lexer-dfa.json").exists());
    assert!(root.join("out").join("slr-tables.json").exists());
    assert!(root.join("out").join("follow.txt").exists());
}

#[test]
fn gen_then_parse_accepts() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("lexer.yal"), LEXER).unwrap();
    fs::write(root.join("grammar.yalp"), GRAMMAR).unwrap();
    fs::write(root.join("input.txt"), "a + b ;").unwrap();

    Command::cargo_bin("plxt")
        .unwrap()
        .arg("gen")
        .arg(root.join("lexer.yal"))
        .arg("--out")
        .arg(root.join("out"))
        .assert()
        .success();

    Command::cargo_bin("plxt")
        .unwrap()
        .arg("parse")
        .arg(root.join("grammar.yalp"))
        .arg(root.join("input.txt"))
        .arg(root.join("out").join("lexer-dfa.json"))
        .arg("--out")
        .arg(root.join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ACCEPT"));
}

#[test]
fn parse_rejected_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("lexer.yal"), LEXER).unwrap();
    fs::write(root.join("grammar.yalp"), GRAMMAR).unwrap();
    fs::write(root.join("input.txt"), "+ a").unwrap();

    Command::cargo_bin("plxt")
        .unwrap()
        .arg("gen")
        .arg(root.join("lexer.yal"))
        .arg("--out")
        .arg(root.join("out"))
        .assert()
        .success();

    Command::cargo_bin("plxt")
        .unwrap()
        .arg("parse")
        .arg(root.join("grammar.yalp"))
        .arg(root.join("input.txt"))
        .arg(root.join("out").join("lexer-dfa.json"))
        .arg("--out")
        .arg(root.join("out"))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("ERROR"));
}

#[test]
fn gen_missing_spec_exits_2() {
    Command::cargo_bin("plxt")
        .unwrap()
        .arg("gen")
        .arg("no-such-file.yal")
        .assert()
        .failure()
        .code(2);
}
