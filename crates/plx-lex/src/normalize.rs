//! Regex normaliser.
//!
//! Rewrites the token rules of a specification into one combined regular
//! expression over the mixed alphabet of decimal byte codes, `λ`, opaque
//! `$…$` byte classes and accepting markers. Eight textual passes run in a
//! fixed order; each produces a fresh string, and the result is frozen once
//! marker attachment finishes:
//!
//! 1. combine the alternatives as `(R1)|(R2)|…|(Rn)`
//! 2. expand `let` definitions to a fixpoint
//! 3. expand bracket sets, complements (`[^…]`) and differences (`[A]#[B]`)
//! 4. convert quoted characters and strings to decimal codes
//! 5. escape quoted operator characters (`'+'` → `\+`)
//! 6. rewrite `X+` → `X(X)*` and `X?` → `(X|λ)`
//! 7. strip redundant outer parentheses per alternative
//! 8. append one unique marker per alternative (ids from 1000)
//!
//! Complement and difference expansions are emitted between `$` sentinels
//! so later passes treat them as one opaque symbol.

use crate::spec::TokenRule;
use crate::symbol::MARKER_BASE;
use crate::{Result, SpecError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lowest and highest byte of the printable domain a `[^…]` complement
/// ranges over.
const PRINTABLE_MIN: u8 = 32;
const PRINTABLE_MAX: u8 = 126;

/// Quoted characters that collide with regex operators; they are escaped
/// (`'+'` → `\+`) instead of converted to decimal codes.
const QUOTED_METACHARS: &[char] = &['+', '*', '(', ')', '-', '/', '%'];

/// Definition-expansion rounds before the normaliser gives up and reports
/// a cyclic definition.
const MAX_EXPANSION_ROUNDS: usize = 64;

/// What a marker stands for: the token it reports and, for single-literal
/// rules, the literal character itself (the parser generator uses it to
/// map literal grammar symbols back to token names).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerAction {
    /// Literal character for rules whose regex is a single quoted literal.
    pub literal: Option<char>,
    /// Declared token name (`WHITESPACE` for skip rules).
    pub token: String,
}

/// The output of the normaliser: one combined regex string and the marker
/// mapping, ids assigned in source order starting at 1000.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedRegex {
    /// Combined regex over {decimal codes, markers, λ} and `| . * ( )`.
    pub text: String,
    /// marker id → action, one entry per rule alternative.
    pub markers: BTreeMap<u32, MarkerAction>,
}

/// Run the full normalisation pipeline over the token rules.
pub fn normalize(
    rules: &[TokenRule],
    definitions: &IndexMap<String, String>,
) -> Result<NormalizedRegex> {
    if rules.is_empty() {
        return Err(SpecError::EmptyRuleSet);
    }

    let combined = combine(rules);
    let expanded = expand_definitions(&combined, definitions)?;
    let bracketed = expand_brackets(&expanded)?;
    let coded = convert_char_literals(&bracketed)?;
    let escaped = escape_operator_literals(&coded)?;
    let rewritten = rewrite_plus_optional(&escaped)?;
    attach_markers(&rewritten, rules)
}

/// Pass 1: `(R1)|(R2)|…|(Rn)`.
fn combine(rules: &[TokenRule]) -> String {
    let parts: Vec<String> = rules.iter().map(|r| format!("({})", r.regex)).collect();
    parts.join("|")
}

/// Pass 2: substitute named definitions until nothing changes. Identifier
/// occurrences count only as complete tokens (the adjacent characters are
/// non-alphanumeric); each substitution wraps the pattern in parentheses.
fn expand_definitions(text: &str, definitions: &IndexMap<String, String>) -> Result<String> {
    let mut current = text.to_string();
    for _ in 0..MAX_EXPANSION_ROUNDS {
        let next = substitute_once(&current, definitions);
        if next == current {
            check_residual_identifiers(&current)?;
            return Ok(current);
        }
        current = next;
    }
    let name = first_identifier(&current).unwrap_or_else(|| "?".to_string());
    Err(SpecError::CyclicDefinition { name })
}

fn substitute_once(text: &str, definitions: &IndexMap<String, String>) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            i = copy_quoted(&chars, i, &mut out);
        } else if c == '[' {
            i = copy_bracket(&chars, i, &mut out);
        } else if c.is_ascii_alphabetic() {
            let boundary = i == 0 || !chars[i - 1].is_ascii_alphanumeric();
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            match definitions.get(&word) {
                Some(pattern) if boundary => {
                    out.push('(');
                    out.push_str(pattern);
                    out.push(')');
                }
                _ => out.push_str(&word),
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Copies a quoted section (single or double) verbatim, honouring
/// backslash escapes. Returns the index after the closing quote, or the
/// end of input if the quote never closes (the conversion passes report
/// that case properly).
fn copy_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push(quote);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if c == '\\' && i + 1 < chars.len() {
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        i += 1;
        if c == quote {
            return i;
        }
    }
    i
}

/// Copies a `[…]` section verbatim, quote-aware. Bracket bodies are
/// character sets; words inside them are never identifiers.
fn copy_bracket(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push(chars[start]);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            i = copy_quoted(chars, i, out);
            continue;
        }
        out.push(c);
        i += 1;
        if c == ']' {
            return i;
        }
    }
    i
}

/// An identifier left after the fixpoint has no definition.
fn check_residual_identifiers(text: &str) -> Result<()> {
    match first_identifier(text) {
        Some(name) => Err(SpecError::UndefinedIdentifier { name }),
        None => Ok(()),
    }
}

fn first_identifier(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            let mut sink = String::new();
            i = copy_quoted(&chars, i, &mut sink);
        } else if c == '[' {
            let mut sink = String::new();
            i = copy_bracket(&chars, i, &mut sink);
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            return Some(chars[start..i].iter().collect());
        } else {
            i += 1;
        }
    }
    None
}

/// Pass 3: bracket forms.
fn expand_brackets(text: &str) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            i = copy_quoted(&chars, i, &mut out);
        } else if c == '[' {
            let (set, negated, after) = parse_bracket(&chars, i)?;
            i = after;
            if negated {
                let complement: BTreeSet<u8> = (PRINTABLE_MIN..=PRINTABLE_MAX)
                    .filter(|b| !set.contains(b))
                    .collect();
                out.push_str(&render_island(&complement)?);
            } else if i + 1 < chars.len() && chars[i] == '#' && chars[i + 1] == '[' {
                let (subtrahend, neg_b, after_b) = parse_bracket(&chars, i + 1)?;
                if neg_b {
                    return Err(SpecError::MalformedRegex {
                        detail: "complement on the right of a set difference".to_string(),
                    });
                }
                i = after_b;
                let difference: BTreeSet<u8> =
                    set.difference(&subtrahend).copied().collect();
                out.push_str(&render_island(&difference)?);
            } else {
                out.push_str(&render_union(&set)?);
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    Ok(out)
}

/// Parses one `[…]` body into a byte set. Accepts quoted characters,
/// quoted `'a'-'z'` ranges, double-quoted strings (each character joins
/// the set), bare characters and bare ranges.
fn parse_bracket(chars: &[char], open: usize) -> Result<(BTreeSet<u8>, bool, usize)> {
    let unbalanced = || SpecError::Unbalanced {
        delimiter: '[',
        span: plx_util::Span::DUMMY,
    };

    let mut i = open + 1;
    let mut negated = false;
    if i < chars.len() && chars[i] == '^' {
        negated = true;
        i += 1;
    }

    let mut set = BTreeSet::new();
    loop {
        if i >= chars.len() {
            return Err(unbalanced());
        }
        match chars[i] {
            ']' => return Ok((set, negated, i + 1)),
            ' ' | '\t' => i += 1,
            '\'' => {
                let (lo, after) = read_char_literal(chars, i)?;
                i = after;
                if i + 1 < chars.len() && chars[i] == '-' && chars[i + 1] == '\'' {
                    let (hi, after_hi) = read_char_literal(chars, i + 1)?;
                    i = after_hi;
                    add_range(&mut set, lo, hi)?;
                } else {
                    set.insert(byte_code(lo)?);
                }
            }
            '"' => {
                let (string, after) = read_string_literal(chars, i)?;
                i = after;
                for ch in string.chars() {
                    set.insert(byte_code(ch)?);
                }
            }
            lo => {
                i += 1;
                if i + 1 < chars.len() && chars[i] == '-' && chars[i + 1] != ']' {
                    let hi = chars[i + 1];
                    i += 2;
                    add_range(&mut set, lo, hi)?;
                } else {
                    set.insert(byte_code(lo)?);
                }
            }
        }
    }
}

fn add_range(set: &mut BTreeSet<u8>, lo: char, hi: char) -> Result<()> {
    let (lo, hi) = (byte_code(lo)?, byte_code(hi)?);
    if lo > hi {
        return Err(SpecError::MalformedRegex {
            detail: format!("inverted character range {lo}-{hi}"),
        });
    }
    set.extend(lo..=hi);
    Ok(())
}

fn byte_code(c: char) -> Result<u8> {
    let code = c as u32;
    u8::try_from(code).map_err(|_| SpecError::CodeOutOfRange { code })
}

/// `(c1|c2|…)` in ascending order.
fn render_union(set: &BTreeSet<u8>) -> Result<String> {
    if set.is_empty() {
        return Err(SpecError::MalformedRegex {
            detail: "empty character class".to_string(),
        });
    }
    let codes: Vec<String> = set.iter().map(|b| b.to_string()).collect();
    Ok(format!("({})", codes.join("|")))
}

/// `$c1|c2|…$` — an opaque island later passes must not re-parse.
fn render_island(set: &BTreeSet<u8>) -> Result<String> {
    if set.is_empty() {
        return Err(SpecError::MalformedRegex {
            detail: "empty character class".to_string(),
        });
    }
    let codes: Vec<String> = set.iter().map(|b| b.to_string()).collect();
    Ok(format!("${}$", codes.join("|")))
}

/// Reads `'x'` or an escaped `'\n'` form starting at the opening quote.
/// Returns the character and the index after the closing quote.
fn read_char_literal(chars: &[char], open: usize) -> Result<(char, usize)> {
    let unbalanced = || SpecError::Unbalanced {
        delimiter: '\'',
        span: plx_util::Span::DUMMY,
    };
    let mut i = open + 1;
    if i >= chars.len() {
        return Err(unbalanced());
    }
    let c = if chars[i] == '\\' {
        i += 1;
        if i >= chars.len() {
            return Err(unbalanced());
        }
        let decoded = decode_escape(chars[i]);
        i += 1;
        decoded
    } else {
        let raw = chars[i];
        i += 1;
        raw
    };
    if i >= chars.len() || chars[i] != '\'' {
        return Err(unbalanced());
    }
    Ok((c, i + 1))
}

/// Reads a `"…"` literal starting at the opening quote. Returns the
/// decoded contents and the index after the closing quote.
fn read_string_literal(chars: &[char], open: usize) -> Result<(String, usize)> {
    let mut i = open + 1;
    let mut value = String::new();
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((value, i + 1)),
            '\\' if i + 1 < chars.len() => {
                value.push(decode_escape(chars[i + 1]));
                i += 2;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    Err(SpecError::Unbalanced {
        delimiter: '"',
        span: plx_util::Span::DUMMY,
    })
}

fn decode_escape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

/// Pass 4: quoted single characters (and the quoted wildcard `'.'`)
/// become decimal codes; double-quoted strings become parenthesised
/// concatenations of codes. Quoted operator characters are left for the
/// escaping pass.
fn convert_char_literals(text: &str) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\'' => {
                let (c, after) = read_char_literal(&chars, i)?;
                if QUOTED_METACHARS.contains(&c) && chars[i + 1] != '\\' {
                    // untouched for the escaping pass
                    out.extend(&chars[i..after]);
                } else {
                    out.push_str(&byte_code(c)?.to_string());
                }
                i = after;
            }
            '"' => {
                let (string, after) = read_string_literal(&chars, i)?;
                i = after;
                if string.is_empty() {
                    out.push('λ');
                } else {
                    let codes: Result<Vec<String>> = string
                        .chars()
                        .map(|c| byte_code(c).map(|b| b.to_string()))
                        .collect();
                    out.push_str(&format!("({})", codes?.join(".")));
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Pass 5: the surviving quoted operators become backslash escapes.
fn escape_operator_literals(text: &str) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\'' {
            let (c, after) = read_char_literal(&chars, i)?;
            out.push('\\');
            out.push(c);
            i = after;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Pass 6: `X+` → `X(X)*`, `X?` → `(X|λ)`. `\+` and `\?` stay untouched.
fn rewrite_plus_optional(text: &str) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            out.push('\\');
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if c == '+' || c == '?' {
            let operand = pop_operand(&mut out)?;
            if c == '+' {
                out.push_str(&format!("{operand}({operand})*"));
            } else {
                out.push_str(&format!("({operand}|λ)"));
            }
            i += 1;
            continue;
        }
        out.push(c);
        i += 1;
    }
    Ok(out)
}

/// Removes the operand preceding a quantifier from the end of `out` and
/// returns it: a balanced `(…)` group, a `$…$` island, a balanced bracket
/// set, a full decimal code, an escape pair, or a single character.
fn pop_operand(out: &mut String) -> Result<String> {
    let chars: Vec<char> = out.chars().collect();
    let malformed = || SpecError::MalformedRegex {
        detail: "quantifier with no operand".to_string(),
    };
    if chars.is_empty() {
        return Err(malformed());
    }

    let len = chars.len();
    let last = chars[len - 1];
    let start = match last {
        ')' => scan_balanced_back(&chars, '(', ')').ok_or_else(malformed)?,
        ']' => scan_balanced_back(&chars, '[', ']').ok_or_else(malformed)?,
        '$' => {
            let mut j = len - 1;
            loop {
                if j == 0 {
                    return Err(malformed());
                }
                j -= 1;
                if chars[j] == '$' {
                    break j;
                }
            }
        }
        '*' => {
            out.pop();
            let inner = pop_operand(out)?;
            return Ok(format!("{inner}*"));
        }
        d if d.is_ascii_digit() => {
            let mut j = len - 1;
            while j > 0 && chars[j - 1].is_ascii_digit() {
                j -= 1;
            }
            j
        }
        _ => {
            if len >= 2 && chars[len - 2] == '\\' {
                len - 2
            } else {
                len - 1
            }
        }
    };

    let operand: String = chars[start..].iter().collect();
    *out = chars[..start].iter().collect();
    Ok(operand)
}

/// Walks backwards from the closing delimiter at the end of `chars` to
/// its balanced opener, skipping escaped occurrences. Returns the index
/// of the opener.
fn scan_balanced_back(chars: &[char], open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut j = chars.len();
    while j > 0 {
        j -= 1;
        let c = chars[j];
        let escaped = j > 0 && chars[j - 1] == '\\';
        if escaped {
            continue;
        }
        if c == close {
            depth += 1;
        } else if c == open {
            depth -= 1;
            if depth == 0 {
                return Some(j);
            }
        }
    }
    None
}

/// Passes 7 and 8: per top-level alternative, strip redundant outer
/// parentheses, re-parenthesise if a top-level `|` is now exposed, and
/// append the marker.
fn attach_markers(text: &str, rules: &[TokenRule]) -> Result<NormalizedRegex> {
    let parts = split_top_level(text);
    if parts.len() != rules.len() {
        return Err(SpecError::MalformedRegex {
            detail: format!(
                "expected {} top-level alternatives, found {}",
                rules.len(),
                parts.len()
            ),
        });
    }

    let mut markers = BTreeMap::new();
    let mut out_parts = Vec::with_capacity(parts.len());
    for (index, (part, rule)) in parts.iter().zip(rules).enumerate() {
        let stripped = strip_redundant_parens(part);
        let body = if contains_top_level_alt(&stripped) {
            format!("({stripped})")
        } else {
            stripped
        };
        let id = MARKER_BASE + index as u32;
        out_parts.push(format!("{body} {id}"));
        markers.insert(
            id,
            MarkerAction {
                literal: rule.literal,
                token: rule.token.clone(),
            },
        );
    }

    Ok(NormalizedRegex {
        text: out_parts.join("|"),
        markers,
    })
}

/// Splits at unescaped `|` at parenthesis depth zero, islands opaque.
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_island = false;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '$' => {
                current.push(c);
                in_island = !in_island;
            }
            '(' if !in_island => {
                current.push(c);
                depth += 1;
            }
            ')' if !in_island => {
                current.push(c);
                depth -= 1;
            }
            '|' if !in_island && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn contains_top_level_alt(text: &str) -> bool {
    split_top_level(text).len() > 1
}

/// Removes outer parentheses that wrap the entire alternative, repeatedly.
fn strip_redundant_parens(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let chars: Vec<char> = current.chars().collect();
        let len = chars.len();
        if len < 2 || chars[0] != '(' || chars[len - 1] != ')' || chars[len - 2] == '\\' {
            return current;
        }
        let mut depth = 0i32;
        let mut in_island = false;
        let mut escaped = false;
        let mut wraps = true;
        for (j, &c) in chars.iter().enumerate() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '$' => in_island = !in_island,
                '(' if !in_island => depth += 1,
                ')' if !in_island => {
                    depth -= 1;
                    if depth == 0 && j != len - 1 {
                        wraps = false;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !wraps {
            return current;
        }
        current = chars[1..len - 1].iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(regex: &str, token: &str) -> TokenRule {
        TokenRule {
            regex: regex.to_string(),
            token: token.to_string(),
            literal: None,
        }
    }

    #[test]
    fn test_combine_and_markers() {
        let rules = [rule("'a'", "A"), rule("'b'", "B")];
        let normalized = normalize(&rules, &IndexMap::new()).unwrap();
        assert_eq!(normalized.text, "97 1000|98 1001");
        assert_eq!(normalized.markers.len(), 2);
        assert_eq!(normalized.markers[&1000].token, "A");
        assert_eq!(normalized.markers[&1001].token, "B");
    }

    #[test]
    fn test_definition_expansion() {
        let mut defs = IndexMap::new();
        defs.insert("digit".to_string(), "['0'-'2']".to_string());
        let rules = [rule("digit", "NUM")];
        let normalized = normalize(&rules, &defs).unwrap();
        assert_eq!(normalized.text, "(48|49|50) 1000");
    }

    #[test]
    fn test_nested_definitions_reach_fixpoint() {
        let mut defs = IndexMap::new();
        defs.insert("digit".to_string(), "['0'-'1']".to_string());
        defs.insert("number".to_string(), "digit digit".to_string());
        let rules = [rule("number", "NUM")];
        let normalized = normalize(&rules, &defs).unwrap();
        assert_eq!(normalized.text, "((48|49)) ((48|49)) 1000");
    }

    #[test]
    fn test_undefined_identifier() {
        let rules = [rule("nosuchdef", "X")];
        let err = normalize(&rules, &IndexMap::new()).unwrap_err();
        assert!(matches!(err, SpecError::UndefinedIdentifier { name } if name == "nosuchdef"));
    }

    #[test]
    fn test_cyclic_definition() {
        let mut defs = IndexMap::new();
        defs.insert("a".to_string(), "b".to_string());
        defs.insert("b".to_string(), "a".to_string());
        let rules = [rule("a", "X")];
        let err = normalize(&rules, &defs).unwrap_err();
        assert!(matches!(err, SpecError::CyclicDefinition { .. }));
    }

    #[test]
    fn test_bracket_range() {
        assert_eq!(expand_brackets("['a'-'c']").unwrap(), "(97|98|99)");
    }

    #[test]
    fn test_bracket_string_contents() {
        assert_eq!(expand_brackets("[\"+-\"]").unwrap(), "(43|45)");
    }

    #[test]
    fn test_bracket_complement_is_island() {
        let expanded = expand_brackets("[^' ']").unwrap();
        assert!(expanded.starts_with('$') && expanded.ends_with('$'));
        assert!(!expanded.contains("|32|"));
        assert!(expanded.starts_with("$33|34|"));
    }

    #[test]
    fn test_bracket_difference() {
        assert_eq!(expand_brackets("['a'-'d']#['b']").unwrap(), "$97|99|100$");
    }

    #[test]
    fn test_unbalanced_bracket() {
        let err = expand_brackets("['a'").unwrap_err();
        assert!(matches!(err, SpecError::Unbalanced { delimiter: '[', .. }));
    }

    #[test]
    fn test_char_literal_conversion() {
        assert_eq!(convert_char_literals("';'").unwrap(), "59");
        assert_eq!(convert_char_literals("'\\n'").unwrap(), "10");
        assert_eq!(convert_char_literals("\"if\"").unwrap(), "(105.102)");
    }

    #[test]
    fn test_quoted_operator_escaping() {
        let coded = convert_char_literals("'+'").unwrap();
        assert_eq!(coded, "'+'");
        assert_eq!(escape_operator_literals(&coded).unwrap(), "\\+");
    }

    #[test]
    fn test_plus_rewrite() {
        assert_eq!(rewrite_plus_optional("97+").unwrap(), "97(97)*");
        assert_eq!(
            rewrite_plus_optional("(97|98)+").unwrap(),
            "(97|98)((97|98))*"
        );
    }

    #[test]
    fn test_optional_rewrite() {
        assert_eq!(rewrite_plus_optional("97?").unwrap(), "(97|λ)");
    }

    #[test]
    fn test_island_quantifier() {
        assert_eq!(rewrite_plus_optional("$97|98$+").unwrap(), "$97|98$($97|98$)*");
    }

    #[test]
    fn test_escaped_plus_untouched() {
        assert_eq!(rewrite_plus_optional("\\+").unwrap(), "\\+");
        assert_eq!(rewrite_plus_optional("97\\+").unwrap(), "97\\+");
    }

    #[test]
    fn test_escaped_operand_quantified() {
        assert_eq!(rewrite_plus_optional("\\%+").unwrap(), "\\%(\\%)*");
    }

    #[test]
    fn test_redundant_parens_stripped() {
        assert_eq!(strip_redundant_parens("((97))"), "97");
        assert_eq!(strip_redundant_parens("(97)(98)"), "(97)(98)");
    }

    #[test]
    fn test_alternative_with_top_level_alt_rewrapped() {
        let rules = [rule("'a'|'b'", "AB")];
        let normalized = normalize(&rules, &IndexMap::new()).unwrap();
        assert_eq!(normalized.text, "(97|98) 1000");
    }

    #[test]
    fn test_marker_ids_are_dense_from_1000() {
        let rules = [rule("'a'", "A"), rule("'b'", "B"), rule("'c'", "C")];
        let normalized = normalize(&rules, &IndexMap::new()).unwrap();
        let keys: Vec<u32> = normalized.markers.keys().copied().collect();
        assert_eq!(keys, vec![1000, 1001, 1002]);
    }

    #[test]
    fn test_empty_rule_set() {
        let err = normalize(&[], &IndexMap::new()).unwrap_err();
        assert!(matches!(err, SpecError::EmptyRuleSet));
    }
}
