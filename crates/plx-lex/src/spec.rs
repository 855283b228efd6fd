//! Lexical specification loader.
//!
//! Parses the textual `.yal` layout into the data model the normaliser
//! consumes:
//!
//! ```text
//! { header block }
//! let ident = regex
//! rule entrypoint =
//!     regex_1 { return TOKEN1 }
//!   | regex_2 { }
//! { trailer block }
//! ```
//!
//! `(* … *)` comments are stripped first (non-nesting, quote-aware). An
//! alternative with an empty action is a skip rule; its token name becomes
//! the reserved `WHITESPACE`.

use crate::cursor::Cursor;
use crate::{Result, SpecError};
use indexmap::IndexMap;
use plx_util::Span;

/// The reserved token name for skip rules.
pub const SKIP_TOKEN: &str = "WHITESPACE";

/// One token rule: the regex text, the token it reports, and the literal
/// character when the regex is a single quoted literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRule {
    pub regex: String,
    pub token: String,
    pub literal: Option<char>,
}

/// A loaded lexical specification.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LexSpec {
    /// Opaque text block preceding the definitions.
    pub header: String,
    /// Opaque text block after the rules.
    pub trailer: String,
    /// `let` definitions in declaration order.
    pub definitions: IndexMap<String, String>,
    /// Rule alternatives in source order.
    pub rules: Vec<TokenRule>,
    /// The rule name after `rule`.
    pub entrypoint: String,
}

impl LexSpec {
    /// Parses a `.yal` source text.
    pub fn parse(source: &str) -> Result<LexSpec> {
        let stripped = strip_comments(source)?;
        let mut cursor = Cursor::new(&stripped);
        let mut spec = LexSpec::default();
        let mut seen_rule = false;

        loop {
            cursor.skip_whitespace();
            if cursor.is_at_end() {
                break;
            }
            match cursor.current_char() {
                '{' => {
                    let block = read_brace_block(&mut cursor)?;
                    if !seen_rule && spec.header.is_empty() {
                        spec.header = block;
                    } else {
                        spec.trailer = block;
                    }
                }
                _ if cursor.starts_with("let ") || cursor.starts_with("let\t") => {
                    parse_definition(&mut cursor, &mut spec)?;
                }
                _ if cursor.starts_with("rule ") || cursor.starts_with("rule\t") => {
                    seen_rule = true;
                    parse_rule(&mut cursor, &mut spec)?;
                }
                other => {
                    return Err(SpecError::Syntax {
                        detail: format!("unexpected character `{other}`"),
                        span: here(&cursor),
                    });
                }
            }
        }

        if spec.rules.is_empty() {
            return Err(SpecError::EmptyRuleSet);
        }
        Ok(spec)
    }
}

fn here(cursor: &Cursor<'_>) -> Span {
    Span::point(cursor.position(), cursor.line(), cursor.column())
}

/// Removes `(* … *)` comments, leaving quoted text untouched.
fn strip_comments(source: &str) -> Result<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '(' && i + 1 < chars.len() && chars[i + 1] == '*' {
            let mut j = i + 2;
            let mut closed = false;
            while j + 1 < chars.len() {
                if chars[j] == '*' && chars[j + 1] == ')' {
                    closed = true;
                    break;
                }
                j += 1;
            }
            if !closed {
                return Err(SpecError::Unbalanced {
                    delimiter: '(',
                    span: Span::DUMMY,
                });
            }
            i = j + 2;
        } else if c == '\'' || c == '"' {
            let quote = c;
            out.push(c);
            i += 1;
            while i < chars.len() {
                let q = chars[i];
                out.push(q);
                if q == '\\' && i + 1 < chars.len() {
                    out.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                i += 1;
                if q == quote {
                    break;
                }
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    Ok(out)
}

/// Reads a `{ … }` block, balanced, starting at the opening brace.
/// Returns the trimmed contents.
fn read_brace_block(cursor: &mut Cursor<'_>) -> Result<String> {
    let open_span = here(cursor);
    cursor.advance(); // past '{'
    let start = cursor.position();
    let mut depth = 1;
    while !cursor.is_at_end() {
        match cursor.current_char() {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let block = cursor.slice_from(start).trim().to_string();
                    cursor.advance(); // past '}'
                    return Ok(block);
                }
            }
            _ => {}
        }
        cursor.advance();
    }
    Err(SpecError::Unbalanced {
        delimiter: '{',
        span: open_span,
    })
}

/// `let ident = regex` — the regex runs to the end of the line.
fn parse_definition(cursor: &mut Cursor<'_>, spec: &mut LexSpec) -> Result<()> {
    cursor.advance_n(3); // past "let"
    cursor.skip_whitespace();

    let name_span = here(cursor);
    let start = cursor.position();
    cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
    let name = cursor.slice_from(start).to_string();
    if name.is_empty() {
        return Err(SpecError::Syntax {
            detail: "expected definition name after `let`".to_string(),
            span: name_span,
        });
    }

    cursor.advance_while(|c| c == ' ' || c == '\t');
    if cursor.current_char() != '=' {
        return Err(SpecError::Syntax {
            detail: format!("expected `=` after `let {name}`"),
            span: here(cursor),
        });
    }
    cursor.advance();

    let body_start = cursor.position();
    cursor.advance_while(|c| c != '\n');
    let body = cursor.slice_from(body_start).trim().to_string();

    if spec.definitions.contains_key(&name) {
        return Err(SpecError::DuplicateDefinition {
            name,
            span: name_span,
        });
    }
    spec.definitions.insert(name, body);
    Ok(())
}

/// `rule name [args] =` followed by `|`-separated alternatives, each an
/// optional regex with an optional `{ action }` block.
fn parse_rule(cursor: &mut Cursor<'_>, spec: &mut LexSpec) -> Result<()> {
    cursor.advance_n(4); // past "rule"
    cursor.skip_whitespace();

    let start = cursor.position();
    cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
    spec.entrypoint = cursor.slice_from(start).to_string();
    if spec.entrypoint.is_empty() {
        return Err(SpecError::Syntax {
            detail: "expected rule name after `rule`".to_string(),
            span: here(cursor),
        });
    }

    // optional formal arguments before '='
    cursor.advance_while(|c| c != '=' && c != '\n');
    if cursor.current_char() != '=' {
        return Err(SpecError::Syntax {
            detail: format!("expected `=` after `rule {}`", spec.entrypoint),
            span: here(cursor),
        });
    }
    cursor.advance();

    loop {
        cursor.skip_whitespace();
        let regex = read_alternative_regex(cursor)?;

        cursor.skip_whitespace();
        let action = if cursor.current_char() == '{' {
            read_brace_block(cursor)?
        } else {
            String::new()
        };

        let regex = regex.trim().to_string();
        if regex.is_empty() {
            return Err(SpecError::Syntax {
                detail: "rule alternative has no regex".to_string(),
                span: here(cursor),
            });
        }
        let token = action_token(&action);
        let literal = literal_symbol(&regex);
        spec.rules.push(TokenRule {
            regex,
            token,
            literal,
        });

        cursor.skip_whitespace();
        if cursor.current_char() == '|' {
            cursor.advance();
            continue;
        }
        return Ok(());
    }
}

/// Reads one alternative's regex text: everything up to a top-level `|`,
/// `{`, or the end, quote- and paren-aware.
fn read_alternative_regex(cursor: &mut Cursor<'_>) -> Result<String> {
    let start = cursor.position();
    let mut depth = 0i32;
    let mut in_bracket = false;
    while !cursor.is_at_end() {
        match cursor.current_char() {
            '\'' | '"' => skip_quoted(cursor)?,
            '(' => {
                depth += 1;
                cursor.advance();
            }
            ')' => {
                depth -= 1;
                cursor.advance();
            }
            '[' => {
                in_bracket = true;
                cursor.advance();
            }
            ']' => {
                in_bracket = false;
                cursor.advance();
            }
            '|' if depth == 0 && !in_bracket => break,
            '{' if depth == 0 && !in_bracket => break,
            _ => cursor.advance(),
        }
    }
    Ok(cursor.slice_from(start).to_string())
}

fn skip_quoted(cursor: &mut Cursor<'_>) -> Result<()> {
    let quote = cursor.current_char();
    let open_span = here(cursor);
    cursor.advance();
    while !cursor.is_at_end() {
        let c = cursor.current_char();
        if c == '\\' {
            cursor.advance_n(2);
            continue;
        }
        cursor.advance();
        if c == quote {
            return Ok(());
        }
    }
    Err(SpecError::Unbalanced {
        delimiter: quote,
        span: open_span,
    })
}

/// Extracts the token name from an action block: the identifier after
/// `return`, or the skip token for an empty action.
fn action_token(action: &str) -> String {
    let mut words = action.split_whitespace();
    while let Some(word) = words.next() {
        if word == "return" {
            if let Some(name) = words.next() {
                let name: String = name
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect();
                if !name.is_empty() {
                    return name;
                }
            }
        }
    }
    SKIP_TOKEN.to_string()
}

/// `';'` or `'\n'` — a single quoted literal yields its character for the
/// char → token-name map the parser generator builds.
fn literal_symbol(regex: &str) -> Option<char> {
    let chars: Vec<char> = regex.trim().chars().collect();
    match chars.as_slice() {
        ['\'', c, '\''] if *c != '\\' => Some(*c),
        ['\'', '\\', esc, '\''] => Some(match esc {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => *other,
        }),
        _ => None,
    }
}
