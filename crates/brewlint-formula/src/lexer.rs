//! Tokenizer for formula descriptor text.
//!
//! Only the subset of Ruby a formula descriptor uses is recognised:
//! identifiers, straight-quoted strings, bare version-like tokens, a handful
//! of punctuation characters, comments and newlines. A string opened with a
//! typographic quotation mark is not an error at this level; it becomes a
//! [`TokenKind::Malformed`] token so the validator can report the field it
//! belongs to.

use crate::types::SyntaxError;

/// Quotation marks that look like string delimiters but are not.
const NON_ASCII_QUOTES: &[char] = &[
    '\u{201C}', // “
    '\u{201D}', // ”
    '\u{201E}', // „
    '\u{201F}', // ‟
    '\u{2018}', // ‘
    '\u{2019}', // ’
    '\u{201A}', // ‚
    '\u{201B}', // ‛
    '\u{00AB}', // «
    '\u{00BB}', // »
    '\u{2039}', // ‹
    '\u{203A}', // ›
    '\u{300C}', // 「
    '\u{300D}', // 」
    '\u{300E}', // 『
    '\u{300F}', // 』
    '\u{301D}', // 〝
    '\u{301E}', // 〞
    '\u{301F}', // 〟
    '\u{FF02}', // ＂
    '\u{FF07}', // ＇
    '\u{FF62}', // ｢
    '\u{FF63}', // ｣
];

/// Returns `true` for any quotation mark outside ASCII that writers commonly
/// paste in place of `"` or `'`.
pub fn is_non_ascii_quote(c: char) -> bool {
    NON_ASCII_QUOTES.contains(&c)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    /// Version-like token starting with a digit, e.g. `1.0.0`.
    Bare(String),
    /// String delimited by non-ASCII quotes, kept verbatim.
    Malformed(String),
    Punct(char),
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Split descriptor text into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    scan(text, None)
}

/// Lines holding a comment. Canonical printing drops comments, so callers
/// that rewrite files check this first.
pub fn comment_lines(text: &str) -> Result<Vec<usize>, SyntaxError> {
    let mut lines = Vec::new();
    scan(text, Some(&mut lines))?;
    Ok(lines)
}

fn scan(text: &str, mut comments: Option<&mut Vec<usize>>) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                tokens.push(Token {
                    kind: TokenKind::Newline,
                    line,
                });
                line += 1;
            }
            c if c.is_whitespace() => {}
            '#' => {
                if let Some(lines) = comments.as_deref_mut() {
                    lines.push(line);
                }
                // Comment runs to end of line; the newline itself is kept.
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '"' | '\'' => {
                let mut value = String::new();
                let mut closed = false;
                let mut ended_line = false;
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => match chars.peek().copied() {
                            Some(esc) if esc == c || esc == '\\' => {
                                value.push(esc);
                                chars.next();
                            }
                            _ => value.push('\\'),
                        },
                        '\n' => {
                            ended_line = true;
                            break;
                        }
                        n if n == c => {
                            closed = true;
                            break;
                        }
                        n => value.push(n),
                    }
                }
                if !closed {
                    // `"1.0.0”` was meant to be closed by the typographic mark.
                    if !value.chars().any(is_non_ascii_quote) {
                        return Err(SyntaxError::new(line, "unterminated string literal"));
                    }
                    tokens.push(Token {
                        kind: TokenKind::Malformed(format!("{}{}", c, value.trim_end())),
                        line,
                    });
                    if ended_line {
                        tokens.push(Token {
                            kind: TokenKind::Newline,
                            line,
                        });
                        line += 1;
                    }
                    continue;
                }
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    line,
                });
            }
            c if is_non_ascii_quote(c) => {
                let mut raw = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                    raw.push(next);
                    if is_non_ascii_quote(next) || next == '"' || next == '\'' {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Malformed(raw),
                    line,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if let Some(&suffix @ ('?' | '!')) = chars.peek() {
                    ident.push(suffix);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(ident),
                    line,
                });
            }
            c if c.is_ascii_digit() => {
                let mut bare = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || matches!(next, '.' | '_' | '+' | '-') {
                        bare.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Bare(bare),
                    line,
                });
            }
            c if c.is_ascii_punctuation() => tokens.push(Token {
                kind: TokenKind::Punct(c),
                line,
            }),
            other => {
                return Err(SyntaxError::new(
                    line,
                    format!("unexpected character {:?}", other),
                ));
            }
        }
    }

    Ok(tokens)
}
