//! Parse formula descriptor text into a [`RawDescriptor`], and read/write the
//! JSON and TOML export forms of [`PackageDescriptor`].

use tracing::trace;

use crate::lexer::{Token, TokenKind, tokenize};
use crate::types::{
    FormulaError, Literal, PackageDescriptor, RawArg, RawDescriptor, RawStep, RawTest, RawValue,
    SyntaxError,
};

/// Stanzas a descriptor may declare, in canonical order.
pub const STANZAS: &[&str] = &["desc", "homepage", "url", "sha256", "license", "version"];

/// Parse descriptor text.
///
/// The grammar is fixed: a `class <Name> < Formula` header, single-value
/// stanzas, one `def install ... end` block, an optional `test do ... end`
/// block and a closing `end`. Anything else is a [`SyntaxError`].
pub fn parse_descriptor(text: &str) -> Result<RawDescriptor, SyntaxError> {
    let tokens = tokenize(text)?;
    let mut lines = split_lines(&tokens).into_iter();

    let header = lines
        .next()
        .ok_or_else(|| SyntaxError::new(1, "empty descriptor"))?;
    let mut raw = RawDescriptor {
        name: parse_header(header)?,
        ..Default::default()
    };

    let mut closed = false;
    while let Some(line) = lines.next() {
        let line_no = line[0].line;
        if closed {
            return Err(SyntaxError::new(line_no, "unexpected content after final `end`"));
        }
        match &line[0].kind {
            TokenKind::Ident(kw) if kw == "end" && line.len() == 1 => closed = true,
            TokenKind::Ident(kw) if kw == "def" => {
                match line.get(1).map(|t| &t.kind) {
                    Some(TokenKind::Ident(m)) if m == "install" && line.len() == 2 => {}
                    _ => {
                        return Err(SyntaxError::new(
                            line_no,
                            "only `def install` is supported",
                        ));
                    }
                }
                if raw.install.is_some() {
                    return Err(SyntaxError::new(line_no, "duplicate `def install` block"));
                }
                let body = collect_block(&mut lines, line_no)?;
                let steps = body
                    .iter()
                    .map(|l| parse_install_line(l))
                    .collect::<Result<Vec<_>, _>>()?;
                raw.install = Some(steps);
            }
            TokenKind::Ident(kw) if kw == "test" => {
                let is_do_block = matches!(
                    line.get(1).map(|t| &t.kind),
                    Some(TokenKind::Ident(d)) if d == "do"
                ) && line.len() == 2;
                if !is_do_block {
                    return Err(SyntaxError::new(line_no, "expected `test do`"));
                }
                if raw.test.is_some() {
                    return Err(SyntaxError::new(line_no, "duplicate `test do` block"));
                }
                let body = collect_block(&mut lines, line_no)?;
                raw.test = Some(parse_test_block(&body, line_no)?);
            }
            TokenKind::Ident(key) => {
                let value = parse_stanza_value(&line)?;
                let slot = match key.as_str() {
                    "desc" => &mut raw.desc,
                    "homepage" => &mut raw.homepage,
                    "url" => &mut raw.url,
                    "sha256" => &mut raw.sha256,
                    "license" => &mut raw.license,
                    "version" => &mut raw.version,
                    other => {
                        return Err(SyntaxError::new(
                            line_no,
                            format!(
                                "unsupported stanza `{}` (expected one of: {})",
                                other,
                                STANZAS.join(", ")
                            ),
                        ));
                    }
                };
                if slot.is_some() {
                    return Err(SyntaxError::new(
                        line_no,
                        format!("duplicate stanza `{}`", key),
                    ));
                }
                *slot = Some(value);
            }
            _ => return Err(SyntaxError::new(line_no, "expected a stanza or block")),
        }
    }

    if !closed {
        let last = tokens.last().map(|t| t.line).unwrap_or(1);
        return Err(SyntaxError::new(last, "missing final `end`"));
    }

    trace!(name = %raw.name, "parsed descriptor");
    Ok(raw)
}

/// Parse a descriptor from its JSON export form.
pub fn parse_json(content: &str) -> Result<PackageDescriptor, FormulaError> {
    serde_json::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Parse a descriptor from its TOML export form.
pub fn parse_toml(content: &str) -> Result<PackageDescriptor, FormulaError> {
    toml::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Render a descriptor as pretty JSON.
pub fn to_json(descriptor: &PackageDescriptor) -> Result<String, FormulaError> {
    serde_json::to_string_pretty(descriptor).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Render a descriptor as TOML.
pub fn to_toml(descriptor: &PackageDescriptor) -> Result<String, FormulaError> {
    toml::to_string_pretty(descriptor).map_err(|e| FormulaError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Group tokens into non-empty logical lines.
fn split_lines(tokens: &[Token]) -> Vec<Vec<Token>> {
    tokens
        .split(|t| t.kind == TokenKind::Newline)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_vec())
        .collect()
}

fn parse_header(line: Vec<Token>) -> Result<String, SyntaxError> {
    let line_no = line[0].line;
    match line.as_slice() {
        [
            Token {
                kind: TokenKind::Ident(class),
                ..
            },
            Token {
                kind: TokenKind::Ident(name),
                ..
            },
            Token {
                kind: TokenKind::Punct('<'),
                ..
            },
            Token {
                kind: TokenKind::Ident(base),
                ..
            },
        ] if class == "class" && base == "Formula" => {
            if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
                return Err(SyntaxError::new(
                    line_no,
                    format!("class name `{}` must start with an uppercase letter", name),
                ));
            }
            Ok(name.clone())
        }
        _ => Err(SyntaxError::new(line_no, "expected `class <Name> < Formula`")),
    }
}

/// Consume lines up to (and including) the matching `end`.
fn collect_block(
    lines: &mut impl Iterator<Item = Vec<Token>>,
    opened_at: usize,
) -> Result<Vec<Vec<Token>>, SyntaxError> {
    let mut body = Vec::new();
    for line in lines.by_ref() {
        if line.len() == 1 && line[0].kind == TokenKind::Ident("end".into()) {
            return Ok(body);
        }
        body.push(line);
    }
    Err(SyntaxError::new(opened_at, "block is missing its `end`"))
}

fn parse_stanza_value(line: &[Token]) -> Result<RawValue, SyntaxError> {
    let line_no = line[0].line;
    let literal = match &line[1..] {
        [Token { kind, .. }] => match kind {
            TokenKind::Str(s) => Literal::Str(s.clone()),
            TokenKind::Bare(s) => Literal::Bare(s.clone()),
            TokenKind::Malformed(s) => Literal::Malformed(s.clone()),
            _ => return Err(SyntaxError::new(line_no, "expected a literal value")),
        },
        [] => return Err(SyntaxError::new(line_no, "stanza has no value")),
        _ => return Err(SyntaxError::new(line_no, "stanza takes exactly one value")),
    };
    Ok(RawValue {
        literal,
        line: line_no,
    })
}

fn parse_install_line(line: &[Token]) -> Result<RawStep, SyntaxError> {
    let line_no = line[0].line;
    match line {
        [
            Token {
                kind: TokenKind::Ident(kw),
                ..
            },
            rest @ ..,
        ] if kw == "system" => Ok(RawStep::System {
            args: parse_args(rest, line_no)?,
            line: line_no,
        }),
        [
            Token {
                kind: TokenKind::Ident(dir),
                ..
            },
            Token {
                kind: TokenKind::Punct('.'),
                ..
            },
            Token {
                kind: TokenKind::Ident(method),
                ..
            },
            rest @ ..,
        ] if method == "install" => {
            let args = parse_args(rest, line_no)?;
            if args.iter().any(|a| matches!(a, RawArg::Expr(_))) {
                return Err(SyntaxError::new(
                    line_no,
                    "install arguments must be string literals",
                ));
            }
            Ok(RawStep::Install {
                directory: dir.clone(),
                args,
                line: line_no,
            })
        }
        _ => Err(SyntaxError::new(
            line_no,
            "install steps must be `system ...` or `<dir>.install ...`",
        )),
    }
}

/// Parse a comma-separated argument list, optionally wrapped in parentheses.
fn parse_args(tokens: &[Token], line_no: usize) -> Result<Vec<RawArg>, SyntaxError> {
    let tokens = match tokens {
        [
            Token {
                kind: TokenKind::Punct('('),
                ..
            },
            inner @ ..,
            Token {
                kind: TokenKind::Punct(')'),
                ..
            },
        ] => inner,
        _ => tokens,
    };
    if tokens.is_empty() {
        return Err(SyntaxError::new(line_no, "call has no arguments"));
    }

    let mut args = Vec::new();
    for chunk in tokens.split(|t| t.kind == TokenKind::Punct(',')) {
        args.push(parse_arg(chunk, line_no)?);
    }
    Ok(args)
}

fn parse_arg(tokens: &[Token], line_no: usize) -> Result<RawArg, SyntaxError> {
    match tokens {
        [Token { kind, .. }] => match kind {
            TokenKind::Str(s) => Ok(RawArg::Str(s.clone())),
            TokenKind::Malformed(s) => Ok(RawArg::Malformed(s.clone())),
            TokenKind::Ident(s) => Ok(RawArg::Expr(s.clone())),
            _ => Err(SyntaxError::new(line_no, "unsupported argument")),
        },
        // Dotted expression such as `ENV.cc`.
        [first, rest @ ..] if !rest.is_empty() => {
            let mut expr = match &first.kind {
                TokenKind::Ident(s) => s.clone(),
                _ => return Err(SyntaxError::new(line_no, "unsupported argument")),
            };
            for pair in rest.chunks(2) {
                match pair {
                    [
                        Token {
                            kind: TokenKind::Punct('.'),
                            ..
                        },
                        Token {
                            kind: TokenKind::Ident(part),
                            ..
                        },
                    ] => {
                        expr.push('.');
                        expr.push_str(part);
                    }
                    _ => return Err(SyntaxError::new(line_no, "unsupported argument")),
                }
            }
            Ok(RawArg::Expr(expr))
        }
        _ => Err(SyntaxError::new(line_no, "empty argument")),
    }
}

fn parse_test_block(body: &[Vec<Token>], opened_at: usize) -> Result<RawTest, SyntaxError> {
    let line = match body {
        [only] => only,
        [] => return Err(SyntaxError::new(opened_at, "empty `test do` block")),
        [_, second, ..] => {
            return Err(SyntaxError::new(
                second[0].line,
                "test block must contain a single `assert_match`",
            ));
        }
    };
    let line_no = line[0].line;

    let (expected, rest) = match line.as_slice() {
        [
            Token {
                kind: TokenKind::Ident(kw),
                ..
            },
            expected,
            Token {
                kind: TokenKind::Punct(','),
                ..
            },
            rest @ ..,
        ] if kw == "assert_match" => (parse_arg(std::slice::from_ref(expected), line_no)?, rest),
        _ => {
            return Err(SyntaxError::new(
                line_no,
                "expected `assert_match <expected>, shell_output(<command>)`",
            ));
        }
    };

    let command = match rest {
        [
            Token {
                kind: TokenKind::Ident(call),
                ..
            },
            Token {
                kind: TokenKind::Punct('('),
                ..
            },
            command,
            Token {
                kind: TokenKind::Punct(')'),
                ..
            },
        ] if call == "shell_output" => parse_arg(std::slice::from_ref(command), line_no)?,
        _ => {
            return Err(SyntaxError::new(
                line_no,
                "expected `shell_output(<command>)`",
            ));
        }
    };

    Ok(RawTest {
        expected,
        command,
        line: line_no,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOTE: &str = r##"class Dote < Formula
  desc "Full-screen ANSI meteor shower animation (2 spaces = 1 pixel)"
  homepage "https://github.com/Ske-417/homebrew-meteor"
  url "https://raw.githubusercontent.com/Ske-417/homebrew-dote/main/dote.c"
  sha256 "2dfd8b37383019075e4ab9baf70ffc9893659966900f6e055f9d6d830e4d496d"
  license "MIT"
  version "1.0.0"

  def install
    system ENV.cc, "dote.c", "-o", "dote"
    bin.install "dote"
  end

  test do
    assert_match "dote", shell_output("#{bin}/dote --version")
  end
end
"##;

    #[test]
    fn parse_full_descriptor() {
        let raw = parse_descriptor(DOTE).unwrap();
        assert_eq!(raw.name, "Dote");
        assert_eq!(
            raw.version.as_ref().unwrap().literal,
            Literal::Str("1.0.0".into())
        );
        assert_eq!(raw.version.as_ref().unwrap().line, 7);
        assert_eq!(raw.license.unwrap().literal.text(), "MIT");

        let steps = raw.install.unwrap();
        assert_eq!(
            steps,
            vec![
                RawStep::System {
                    args: vec![
                        RawArg::Expr("ENV.cc".into()),
                        RawArg::Str("dote.c".into()),
                        RawArg::Str("-o".into()),
                        RawArg::Str("dote".into()),
                    ],
                    line: 10,
                },
                RawStep::Install {
                    directory: "bin".into(),
                    args: vec![RawArg::Str("dote".into())],
                    line: 11,
                },
            ]
        );

        let test = raw.test.unwrap();
        assert_eq!(test.expected, RawArg::Str("dote".into()));
        assert_eq!(test.command, RawArg::Str("#{bin}/dote --version".into()));
    }

    #[test]
    fn curly_quoted_version_is_kept_as_malformed() {
        let text = DOTE.replace("version \"1.0.0\"", "version \u{201C}1.0.0\u{201D}");
        let raw = parse_descriptor(&text).unwrap();
        assert_eq!(
            raw.version.unwrap().literal,
            Literal::Malformed("\u{201C}1.0.0\u{201D}".into())
        );
    }

    #[test]
    fn missing_stanzas_are_none() {
        let raw = parse_descriptor("class Dote < Formula\nend\n").unwrap();
        assert!(raw.url.is_none());
        assert!(raw.install.is_none());
        assert!(raw.test.is_none());
    }

    #[test]
    fn header_is_required() {
        let err = parse_descriptor("desc \"x\"\nend\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn missing_final_end() {
        let err = parse_descriptor("class Dote < Formula\n  desc \"x\"\n").unwrap_err();
        assert!(err.message.contains("missing final `end`"));
    }

    #[test]
    fn unclosed_install_block() {
        let err =
            parse_descriptor("class Dote < Formula\n  def install\n    bin.install \"x\"\n")
                .unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn duplicate_stanza_rejected() {
        let err = parse_descriptor("class Dote < Formula\n  url \"a\"\n  url \"b\"\nend\n")
            .unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("duplicate stanza `url`"));
    }

    #[test]
    fn unsupported_stanza_rejected() {
        let err = parse_descriptor("class Dote < Formula\n  depends_on \"x\"\nend\n")
            .unwrap_err();
        assert!(err.message.contains("depends_on"));
    }

    #[test]
    fn content_after_end_rejected() {
        let err = parse_descriptor("class A < Formula\nend\nclass B < Formula\nend\n")
            .unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn parenthesised_system_call() {
        let raw = parse_descriptor(
            "class A < Formula\n  def install\n    system(\"make\", \"install\")\n  end\nend\n",
        )
        .unwrap();
        assert_eq!(
            raw.install.unwrap()[0],
            RawStep::System {
                args: vec![RawArg::Str("make".into()), RawArg::Str("install".into())],
                line: 3,
            }
        );
    }

    #[test]
    fn json_export_roundtrip_shape() {
        let json = r#"{
            "name": "Dote",
            "source_url": "https://example.com/dote.c",
            "version": "1.0.0",
            "install_steps": [
                {"step": "install", "directory": "bin", "artifacts": ["dote"]}
            ]
        }"#;
        let d = parse_json(json).unwrap();
        assert_eq!(d.name, "Dote");
        assert_eq!(d.description, "");
        assert!(d.checksum.is_none());
        assert_eq!(d.install_steps.len(), 1);
    }
}
