//! Driver edge cases: conflicts, missing inputs, λ grammars.

use plx_drv::{Config, DriverError, Session};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write test input");
    path
}

/// Single-letter tokens so the dangling-else grammar can be lexed.
const LETTER_LEXER: &str = r#"
rule tokens =
    'i'        { return i }
  | 't'        { return t }
  | 'e'        { return e }
  | 'a'        { return a }
  | 'b'        { return b }
  | [' ''\n']+ { }
"#;

const DANGLING_ELSE: &str = "\
%token i t e a b
S : i E t S | i E t S e S | a ;
E : b ;
";

#[test]
fn dangling_else_conflict_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let session = Session::new(Config {
        lexer_spec: Some(write(root, "letters.yal", LETTER_LEXER)),
        grammar_spec: Some(write(root, "dangling.yalp", DANGLING_ELSE)),
        source: Some(write(root, "input.txt", "ibtibtaea")),
        ..Config::default()
    });
    let report = session.run().expect("pipeline survives the conflict");
    // shift/reduce on `e`: the shift wins, the conflict is a warning,
    // and the classic dangling-else input still parses.
    assert!(session.diagnostics.warning_count() >= 1);
    let warnings = session.diagnostics.diagnostics();
    assert!(warnings
        .iter()
        .any(|d| d.message.contains("shift/reduce") && d.message.contains('e')));
    assert!(report.accepted, "{:?}", report.trace);
}

#[test]
fn missing_lexer_spec_is_reported() {
    let session = Session::new(Config::default());
    match session.generate_lexer() {
        Err(DriverError::MissingInput(what)) => assert!(what.contains("lexer")),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn unreadable_grammar_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let session = Session::new(Config {
        lexer_spec: Some(write(root, "letters.yal", LETTER_LEXER)),
        grammar_spec: Some(root.join("does-not-exist.yalp")),
        source: Some(write(root, "input.txt", "a")),
        ..Config::default()
    });
    match session.run() {
        Err(DriverError::Io(path, _)) => {
            assert!(path.ends_with("does-not-exist.yalp"));
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn lambda_grammar_parses_empty_and_nonempty() {
    let lexer = r#"
rule tokens =
    'x'        { return x }
  | [' ''\n']+ { }
"#;
    let grammar = "%token x\nA : x A | λ ;\n";
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    for (input, expect) in [("x", true), ("xxx", true), ("", true)] {
        let session = Session::new(Config {
            lexer_spec: Some(write(root, "x.yal", lexer)),
            grammar_spec: Some(write(root, "x.yalp", grammar)),
            source: Some(write(root, "input.txt", input)),
            ..Config::default()
        });
        let report = session.run().expect("pipeline");
        assert_eq!(report.accepted, expect, "input {input:?}: {:?}", report.trace);
    }
}

#[test]
fn listy_start_wrapping_through_the_driver() {
    let lexer = r#"
rule tokens =
    'x'        { return x }
  | [' ''\n']+ { }
"#;
    let grammar = "%token x\ngeneral : x ;\n";
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    // Off by default: a two-statement input does not parse.
    let plain = Session::new(Config {
        lexer_spec: Some(write(root, "x.yal", lexer)),
        grammar_spec: Some(write(root, "x.yalp", grammar)),
        source: Some(write(root, "in.txt", "x x")),
        ..Config::default()
    });
    let report = plain.run().expect("pipeline");
    assert!(!report.accepted);

    // Opted in: the injected list wrapper accepts the sequence.
    let wrapped = Session::new(Config {
        lexer_spec: Some(write(root, "x.yal", lexer)),
        grammar_spec: Some(write(root, "x.yalp", grammar)),
        source: Some(write(root, "in.txt", "x x")),
        wrap_listy_start: true,
        ..Config::default()
    });
    let report = wrapped.run().expect("pipeline");
    assert!(report.accepted, "{:?}", report.trace);
}
