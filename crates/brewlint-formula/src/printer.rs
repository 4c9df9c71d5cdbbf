//! Canonical descriptor text for a validated [`PackageDescriptor`].
//!
//! Output uses two-space indentation and a fixed stanza order, so printing
//! the result of parsing printed text reproduces it exactly.

use std::fmt::Write as _;

use crate::types::{InstallStep, PackageDescriptor, Word};

/// Render a descriptor as formula text.
pub fn print(descriptor: &PackageDescriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "class {} < Formula", descriptor.name);

    if !descriptor.description.is_empty() {
        stanza(&mut out, "desc", &descriptor.description);
    }
    if let Some(home) = &descriptor.homepage {
        stanza(&mut out, "homepage", home);
    }
    stanza(&mut out, "url", &descriptor.source_url);
    if let Some(sum) = &descriptor.checksum {
        stanza(&mut out, "sha256", sum);
    }
    if let Some(license) = &descriptor.license {
        stanza(&mut out, "license", license);
    }
    stanza(&mut out, "version", &descriptor.version);

    out.push_str("\n  def install\n");
    for step in &descriptor.install_steps {
        let _ = writeln!(out, "    {}", render_step(step));
    }
    out.push_str("  end\n");

    if let Some(test) = &descriptor.test {
        out.push_str("\n  test do\n");
        let _ = writeln!(
            out,
            "    assert_match {}, shell_output({})",
            quote(&test.expected),
            quote(&test.command)
        );
        out.push_str("  end\n");
    }

    out.push_str("end\n");
    out
}

fn stanza(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "  {} {}", key, quote(value));
}

fn render_step(step: &InstallStep) -> String {
    match step {
        InstallStep::Compile { compiler, args } => {
            let mut words = vec![word(compiler)];
            words.extend(args.iter().map(|a| quote(a)));
            format!("system {}", words.join(", "))
        }
        InstallStep::Install {
            directory,
            artifacts,
        } => {
            let args: Vec<String> = artifacts.iter().map(|a| quote(a)).collect();
            format!("{}.install {}", directory, args.join(", "))
        }
        InstallStep::Shell { program, args } => {
            let mut words = vec![word(program)];
            words.extend(args.iter().map(word));
            format!("system {}", words.join(", "))
        }
    }
}

fn word(w: &Word) -> String {
    match w {
        Word::Literal(s) => quote(s),
        Word::Expr(e) => e.clone(),
    }
}

/// Double-quote a string, escaping the characters the lexer unescapes.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
