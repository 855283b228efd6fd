//! End-to-end pipeline tests: lexical spec → DFA → tables → verdict.

use plx_drv::{Config, Session};
use plx_par::TraceStep;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ARITH_LEXER: &str = r#"
(* arithmetic tokens *)
let delim = [' ''\t''\n']
let letter = ['a'-'z']
let digit = ['0'-'9']

rule tokens =
    delim+                  { }
  | letter(letter|digit)*  { return ID }
  | digit+                 { return NUMBER }
  | '+'                    { return PLUS }
  | '*'                    { return TIMES }
  | '('                    { return LPAREN }
  | ')'                    { return RPAREN }
  | ';'                    { return SEMICOLON }
"#;

const ARITH_GRAMMAR: &str = "\
%token PLUS TIMES LPAREN RPAREN ID NUMBER SEMICOLON
IGNORE WHITESPACE

program : program statement | statement ;
statement : E SEMICOLON ;
E : E PLUS T | T ;
T : T TIMES F | F ;
F : LPAREN E RPAREN | ID | NUMBER ;
";

/// The same grammar written with literal characters in the bodies; the
/// DFA's literal map must rewrite them to token names.
const LITERAL_GRAMMAR: &str = "\
%token PLUS TIMES LPAREN RPAREN ID NUMBER SEMICOLON

program : program statement | statement ;
statement : E SEMICOLON ;
E : E + T | T ;
T : T * F | F ;
F : ( E ) | ID | NUMBER ;
";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write test input");
    path
}

fn session_for(dir: &TempDir, grammar: &str, source: &str) -> Session {
    let root = dir.path();
    Session::new(Config {
        lexer_spec: Some(write(root, "lexer.yal", ARITH_LEXER)),
        grammar_spec: Some(write(root, "grammar.yalp", grammar)),
        source: Some(write(root, "input.txt", source)),
        output_dir: Some(root.join("out")),
        ..Config::default()
    })
}

#[test]
fn accepts_arithmetic_statement() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "alpha + beta * gamma ;");
    let report = session.run().expect("pipeline");
    assert!(report.accepted, "{:?}", report.trace);
    assert!(!session.diagnostics.has_errors());
}

#[test]
fn literal_grammar_bodies_are_normalised() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, LITERAL_GRAMMAR, "a + b * (c + d) ;");
    let report = session.run().expect("pipeline");
    assert!(report.accepted, "{:?}", report.trace);
}

#[test]
fn rejects_malformed_statement() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "alpha + * beta");
    let report = session.run().expect("pipeline");
    assert!(!report.accepted);
    assert!(report.error.is_some());
}

#[test]
fn panic_recovery_salvages_second_statement() {
    // id + + id ; id + id ;  — one syntactic error at the second `+`,
    // which gets discarded; recovery resynchronises on the next
    // base-sync token and the statement list still accepts.
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "a + + b ; c + d ;");
    let report = session.run().expect("pipeline");
    let errors = report
        .trace
        .iter()
        .filter(|s| matches!(s, TraceStep::Error { .. }))
        .count();
    assert_eq!(errors, 1, "{:?}", report.trace);
    let discards: Vec<&str> = report
        .trace
        .iter()
        .filter_map(|s| match s {
            TraceStep::Discard { terminal } => Some(terminal.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(discards, vec!["PLUS"], "{:?}", report.trace);
    let resync = report
        .trace
        .iter()
        .find_map(|s| match s {
            TraceStep::Resync { terminal, .. } => Some(terminal.as_str()),
            _ => None,
        })
        .expect("recovery must resynchronise");
    assert_ne!(resync, "PLUS", "{:?}", report.trace);
    assert_eq!(resync, "ID", "{:?}", report.trace);
    assert!(report.accepted, "{:?}", report.trace);
}

#[test]
fn dfa_artifact_round_trips() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "a ;");
    let dfa = session.generate_lexer().expect("generate");
    let path = dir.path().join("out").join("lexer-dfa.json");
    assert!(path.exists());
    let loaded = plx_drv::load_dfa(&path).expect("load");
    assert_eq!(dfa, loaded);
}

#[test]
fn tables_artifact_round_trips() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "a ;");
    let dfa = session.generate_lexer().expect("generate");
    let parser = session.generate_parser(&dfa).expect("tables");
    let path = dir.path().join("out").join("slr-tables.json");
    let loaded = plx_drv::load_tables(&path).expect("load");
    assert_eq!(parser.tables, loaded);
}

#[test]
fn run_from_persisted_artifact_matches_fresh_run() {
    let dir = TempDir::new().unwrap();
    let generating = session_for(&dir, ARITH_GRAMMAR, "x + y ;");
    let fresh = generating.run().expect("fresh run");

    let replay = Session::new(Config {
        grammar_spec: Some(dir.path().join("grammar.yalp")),
        source: Some(dir.path().join("input.txt")),
        dfa_artifact: Some(dir.path().join("out").join("lexer-dfa.json")),
        ..Config::default()
    });
    let replayed = replay.run().expect("replayed run");
    assert_eq!(fresh.accepted, replayed.accepted);
    assert_eq!(fresh.trace, replayed.trace);
}

#[test]
fn dumps_are_written() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "a ;");
    session.run().expect("pipeline");
    let out = dir.path().join("out");
    for name in [
        "lexer-dfa.json",
        "slr-tables.json",
        "follow.txt",
        "productions.txt",
        "slr-action.txt",
        "slr-goto.txt",
        "lr0-states.txt",
        "parse-trace.txt",
    ] {
        assert!(out.join(name).exists(), "missing dump {name}");
    }
}

#[test]
fn trace_dump_ends_with_verdict() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "a ;");
    session.run().expect("pipeline");
    let trace = fs::read_to_string(dir.path().join("out").join("parse-trace.txt")).unwrap();
    assert!(trace.trim_end().ends_with("ACCEPT"), "{trace}");
}

#[test]
fn keyword_tiebreak_and_longest_match() {
    // `if` → IF beats ID on an exact match through the lower marker id;
    // `ifx` stays one ID through longest match.
    let lexer = r#"
let letter = ['a'-'z']

rule tokens =
    "if"        { return IF }
  | letter+     { return ID }
  | [' ''\n']+  { }
"#;
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let session = Session::new(Config {
        lexer_spec: Some(write(root, "kw.yal", lexer)),
        ..Config::default()
    });
    let dfa = session.generate_lexer().expect("generate");

    let classify = |input: &str| -> Vec<(String, String)> {
        plx_lex::Scanner::new(&dfa, input.as_bytes())
            .map(|s| (s.class.terminal().to_string(), s.lexeme))
            .collect()
    };
    let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
    assert_eq!(classify("if"), vec![pair("IF", "if")]);
    assert_eq!(classify("ifx"), vec![pair("ID", "ifx")]);
    assert_eq!(
        classify("if x"),
        vec![pair("IF", "if"), pair("WHITESPACE", " "), pair("ID", "x")]
    );
}

#[test]
fn lexical_errors_become_warnings_but_parse_recovers() {
    let dir = TempDir::new().unwrap();
    let session = session_for(&dir, ARITH_GRAMMAR, "a ? b ;");
    let report = session.run().expect("pipeline");
    // `?` matches no rule: it reaches the parser as ERROR, trips
    // recovery, and the statement still closes at the semicolon.
    assert!(session.diagnostics.warning_count() >= 1);
    assert!(report
        .trace
        .iter()
        .any(|s| matches!(s, TraceStep::Error { .. })));
}
