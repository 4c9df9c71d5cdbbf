//! Ayu color theme and styling functions for brewlint CLI output.
//!
//! Uses the Ayu Dark color palette for consistent terminal styling.
//! Color source: <https://github.com/ayu-theme/ayu-colors>
//!
//! Only failures and warnings get strong color; locations and hints are
//! muted so the error kinds stand out.

use brewlint_formula::{BatchReport, Diagnostic, FileReport};
use owo_colors::OwoColorize;

use crate::terminal::{supports_color, terminal_width};

// ---------------------------------------------------------------------------
// Ayu Dark color palette (RGB values)
// ---------------------------------------------------------------------------

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - bright green
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454 - bright yellow
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - muted gray
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff - bright blue

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

pub const ICON_PASS: &str = "\u{2713}"; // ✓
pub const ICON_WARN: &str = "\u{26A0}"; // ⚠
pub const ICON_FAIL: &str = "\u{2716}"; // ✖

/// Horizontal rule character.
const SEPARATOR_CHAR: char = '\u{2500}'; // ─

/// Widest separator drawn, in columns.
const SEPARATOR_MAX: usize = 42;

// ---------------------------------------------------------------------------
// Helper: apply truecolor only when color is supported
// ---------------------------------------------------------------------------

/// Applies truecolor foreground to a string, falling back to plain text
/// when color is not supported.
fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

fn color_bold_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).bold().to_string()
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Core semantic render helpers
// ---------------------------------------------------------------------------

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

/// Renders text in bold.
pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Renders the light separator line in muted color, no wider than the
/// terminal.
pub fn render_separator() -> String {
    let width = terminal_width().min(SEPARATOR_MAX);
    render_muted(&SEPARATOR_CHAR.to_string().repeat(width))
}

pub fn render_pass_icon() -> String {
    color_str(ICON_PASS, PASS)
}

pub fn render_warn_icon() -> String {
    color_str(ICON_WARN, WARN)
}

pub fn render_fail_icon() -> String {
    color_str(ICON_FAIL, FAIL)
}

// ---------------------------------------------------------------------------
// Report rendering
// ---------------------------------------------------------------------------

/// Renders an error kind. Conflicts are cross-file and get the warning color;
/// everything else is a failure.
pub fn render_kind(kind: &str) -> String {
    let label = format!("[{}]", kind);
    if kind == "ConflictingDescriptors" {
        color_bold_str(&label, WARN)
    } else {
        color_bold_str(&label, FAIL)
    }
}

/// One diagnostic line without its location:
/// `[Kind] field: message (line N)`.
pub fn render_diagnostic(diag: &Diagnostic) -> String {
    let mut line = render_kind(diag.kind);
    line.push(' ');
    if let Some(field) = diag.field {
        line.push_str(&render_accent(field.as_str()));
        line.push_str(": ");
    }
    line.push_str(&diag.message);
    if let Some(n) = diag.line {
        line.push(' ');
        line.push_str(&render_muted(&format!("(line {})", n)));
    }
    line
}

/// A file header plus one indented line per error.
///
/// Valid files render as a single pass line naming the package and version.
pub fn render_file_report(report: &FileReport) -> Vec<String> {
    if let Some(d) = &report.descriptor {
        return vec![format!(
            "{} {} {}",
            render_pass_icon(),
            report.location,
            render_muted(&format!("({} {})", d.name, d.version))
        )];
    }

    let mut lines = vec![format!("{} {}", render_fail_icon(), render_bold(&report.location))];
    lines.extend(
        report
            .errors
            .iter()
            .map(|e| format!("    {}", render_diagnostic(&e.to_diagnostic(None)))),
    );
    lines
}

/// Conflicts follow the per-file section under a separator.
pub fn render_conflicts(report: &BatchReport) -> Vec<String> {
    if report.conflicts.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![render_separator()];
    for conflict in &report.conflicts {
        lines.push(format!(
            "{} {}",
            render_warn_icon(),
            render_diagnostic(&conflict.to_diagnostic(None))
        ));
    }
    lines
}

/// Closing line: `N errors in M files (K valid)`.
pub fn render_summary(report: &BatchReport) -> String {
    let errors = report.error_count();
    let files = report.files.len();
    let valid = report.files.iter().filter(|f| f.is_valid()).count();
    let text = format!(
        "{} {} in {} {} ({} valid)",
        errors,
        plural(errors, "error", "errors"),
        files,
        plural(files, "file", "files"),
        valid
    );
    if report.is_clean() {
        format!("{} {}", render_pass_icon(), render_pass(&text))
    } else {
        format!("{} {}", render_fail_icon(), render_fail(&text))
    }
}

/// The whole human-readable report.
pub fn render_report(report: &BatchReport) -> String {
    let mut lines: Vec<String> = report.files.iter().flat_map(render_file_report).collect();
    lines.extend(render_conflicts(report));
    lines.push(String::new());
    lines.push(render_summary(report));
    lines.join("\n")
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewlint_formula::{SourceFile, ValidationOptions, validate_batch};
    use pretty_assertions::assert_eq;

    const DOTE: &str = r#"class Dote < Formula
  desc "Full-screen ANSI meteor shower animation (2 spaces = 1 pixel)"
  homepage "https://github.com/kmc2400/homebrew-dote"
  url "https://raw.githubusercontent.com/kmc2400/homebrew-dote/main/dote.c"
  sha256 "2dfd8b37383019075e4ab9baf70ffc9893659966900f6e055f9d6d830e4d496d"
  license "MIT"
  version "1.0.0"

  def install
    system ENV.cc, "dote.c", "-o", "dote"
    bin.install "dote"
  end
end
"#;

    fn report_for(texts: &[(&str, String)]) -> BatchReport {
        let sources: Vec<SourceFile> = texts
            .iter()
            .map(|(loc, text)| SourceFile::inline(*loc, text.clone()))
            .collect();
        validate_batch(&sources, &ValidationOptions::default())
    }

    #[test]
    fn valid_file_renders_one_line() {
        let report = report_for(&[("dote.rb", DOTE.to_string())]);
        let lines = render_file_report(&report.files[0]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("dote.rb"));
        assert!(lines[0].contains("Dote 1.0.0"));
    }

    #[test]
    fn invalid_file_lists_each_error() {
        let text = DOTE.replace("2dfd8b37383019075e4ab9baf70ffc9893659966900f6e055f9d6d830e4d496d", "<後で差し替え>");
        let report = report_for(&[("bad.rb", text)]);
        let lines = render_file_report(&report.files[0]);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("[InvalidChecksum]"));
        assert!(lines[1].contains("sha256"));
    }

    #[test]
    fn syntax_errors_show_line() {
        let report = report_for(&[("broken.rb", "class Broken < Formula\n  url \"oops\n".into())]);
        let lines = render_file_report(&report.files[0]);
        assert!(lines[1].contains("[Syntax]"));
        assert!(lines[1].contains("(line 2)"));
    }

    #[test]
    fn conflicts_and_summary() {
        let other = DOTE.replace("kmc2400", "Ske-417");
        let report = report_for(&[("a/dote.rb", DOTE.to_string()), ("b/dote.rb", other)]);

        let conflicts = render_conflicts(&report);
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts[1].contains("[ConflictingDescriptors]"));

        let summary = render_summary(&report);
        assert!(summary.contains("1 error in 2 files (2 valid)"));
    }

    #[test]
    fn clean_report_summary() {
        let report = report_for(&[("dote.rb", DOTE.to_string())]);
        assert!(render_summary(&report).contains("0 errors in 1 file (1 valid)"));
        assert!(render_report(&report).ends_with("(1 valid)"));
    }
}
