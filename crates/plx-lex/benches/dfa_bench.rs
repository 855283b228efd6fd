//! DFA construction and scanning benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use indexmap::IndexMap;
use plx_lex::normalize::normalize;
use plx_lex::postfix::{insert_concat, to_postfix, tokenize};
use plx_lex::spec::TokenRule;
use plx_lex::tree::SyntaxTree;
use plx_lex::{dfa, minimize::minimize, Dfa, Scanner};

fn arithmetic_rules() -> Vec<TokenRule> {
    let lit = |regex: &str, token: &str, literal: char| TokenRule {
        regex: regex.to_string(),
        token: token.to_string(),
        literal: Some(literal),
    };
    vec![
        TokenRule {
            regex: "['a'-'z']+".to_string(),
            token: "ID".to_string(),
            literal: None,
        },
        TokenRule {
            regex: "['0'-'9']+".to_string(),
            token: "NUMBER".to_string(),
            literal: None,
        },
        lit("'+'", "PLUS", '+'),
        lit("'*'", "TIMES", '*'),
        lit("'('", "LPAREN", '('),
        lit("')'", "RPAREN", ')'),
        lit("';'", "SEMICOLON", ';'),
        TokenRule {
            regex: "[' ''\\t''\\n']+".to_string(),
            token: "WHITESPACE".to_string(),
            literal: None,
        },
    ]
}

fn build_dfa(rules: &[TokenRule]) -> Dfa {
    let normalized = normalize(rules, &IndexMap::new()).expect("normalize");
    let rpn = to_postfix(insert_concat(tokenize(&normalized.text).expect("tokenize")));
    let tree = SyntaxTree::build(&rpn).expect("tree");
    minimize(&dfa::construct(&tree, &normalized.markers).expect("construct"))
}

fn bench_construction(c: &mut Criterion) {
    let rules = arithmetic_rules();
    c.bench_function("dfa_construct_minimize", |b| {
        b.iter(|| build_dfa(black_box(&rules)))
    });
}

fn bench_scanning(c: &mut Criterion) {
    let dfa = build_dfa(&arithmetic_rules());
    let input = "alpha + beta * (gamma + 42); delta * 7;".repeat(64);
    c.bench_function("scan_arithmetic", |b| {
        b.iter(|| {
            let count = Scanner::new(&dfa, black_box(input.as_bytes())).count();
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_construction, bench_scanning);
criterion_main!(benches);
