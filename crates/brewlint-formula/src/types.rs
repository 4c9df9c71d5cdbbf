//! Descriptor data model.
//!
//! [`RawDescriptor`] is what the parser produces: every stanza exactly as it
//! was written, malformed literals included. [`PackageDescriptor`] is the
//! validated, immutable record handed to a package host.

use serde::{Deserialize, Serialize};

/// Compilers recognised as the first argument of a compile step.
pub const KNOWN_COMPILERS: &[&str] = &["cc", "gcc", "clang", "c++", "g++", "clang++"];

/// A validated package formula descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Class name, e.g. `Dote`.
    pub name: String,

    /// Free-text description (`desc`).
    #[serde(default)]
    pub description: String,

    /// Project homepage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// URL of the single file the host fetches.
    pub source_url: String,

    /// Lowercase hex SHA-256 digest of the fetched file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// SPDX license identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    pub version: String,

    /// Build and install sequence, in order.
    pub install_steps: Vec<InstallStep>,

    /// Optional post-install smoke test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestCommand>,
}

/// Last non-empty path segment of a URL string.
pub(crate) fn url_file_name(url: &str) -> Option<&str> {
    let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
    let (_, after_scheme) = without_suffix.split_once("://")?;
    let (_, path) = after_scheme.split_once('/')?;
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

/// A program or argument word inside a `system` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Word {
    /// A quoted string literal.
    Literal(String),
    /// A host expression such as `ENV.cc`.
    Expr(String),
}

impl Word {
    pub fn as_str(&self) -> &str {
        match self {
            Word::Literal(s) | Word::Expr(s) => s,
        }
    }
}

/// One instruction in the install block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum InstallStep {
    /// `system <compiler>, <args...>` where `args` hold a `"-o", <output>`
    /// pair. Arguments keep their written order, since flags such as
    /// `-framework Cocoa` take the next argument as their value.
    Compile { compiler: Word, args: Vec<String> },
    /// `<directory>.install <artifacts...>`
    Install {
        directory: String,
        artifacts: Vec<String>,
    },
    /// Any other `system` invocation.
    Shell { program: Word, args: Vec<Word> },
}

impl InstallStep {
    /// The file a compile step writes, named by the argument after `-o`.
    pub fn output(&self) -> Option<&str> {
        match self {
            InstallStep::Compile { args, .. } => args
                .iter()
                .position(|a| a == "-o")
                .and_then(|i| args.get(i + 1))
                .map(String::as_str),
            _ => None,
        }
    }

    /// Input files of a compile step: every argument that is neither a flag
    /// nor the output.
    pub fn sources(&self) -> Vec<&str> {
        let InstallStep::Compile { args, .. } = self else {
            return Vec::new();
        };
        let output_at = args.iter().position(|a| a == "-o").map(|i| i + 1);
        args.iter()
            .enumerate()
            .filter(|(i, a)| Some(*i) != output_at && !a.starts_with('-'))
            .map(|(_, a)| a.as_str())
            .collect()
    }
}

/// `assert_match <expected>, shell_output(<command>)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCommand {
    /// Command line, e.g. `#{bin}/dote --version`.
    pub command: String,
    /// Substring the command output must contain.
    pub expected: String,
}

// ---------------------------------------------------------------------------
// Raw (unvalidated) model
// ---------------------------------------------------------------------------

/// A literal exactly as it appeared in the descriptor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Straight-quoted string (escapes resolved).
    Str(String),
    /// Unquoted token such as `1.0.0`.
    Bare(String),
    /// Literal opened with a non-ASCII quotation mark, kept verbatim
    /// including its quotes.
    Malformed(String),
}

impl Literal {
    /// Text of the literal, used for reporting and origin grouping.
    pub fn text(&self) -> &str {
        match self {
            Literal::Str(s) | Literal::Bare(s) | Literal::Malformed(s) => s,
        }
    }
}

/// A stanza value and the line it was written on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub literal: Literal,
    pub line: usize,
}

/// Argument of a `system` / `*.install` / `assert_match` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArg {
    Str(String),
    Expr(String),
    Malformed(String),
}

/// An unvalidated install-block line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStep {
    System { args: Vec<RawArg>, line: usize },
    Install { directory: String, args: Vec<RawArg>, line: usize },
}

/// An unvalidated test block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTest {
    pub expected: RawArg,
    pub command: RawArg,
    pub line: usize,
}

/// Parser output: one formula class with its stanzas as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDescriptor {
    /// Class name.
    pub name: String,
    pub desc: Option<RawValue>,
    pub homepage: Option<RawValue>,
    pub url: Option<RawValue>,
    pub sha256: Option<RawValue>,
    pub license: Option<RawValue>,
    pub version: Option<RawValue>,
    /// `None` when there is no `def install` block at all.
    pub install: Option<Vec<RawStep>>,
    pub test: Option<RawTest>,

    /// Where this descriptor was loaded from (set by the loader).
    pub source: String,
    /// File stem of the containing file, when loaded from disk.
    pub file_stem: Option<String>,
}

/// Errors from loading, parsing and serializing descriptors.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("formula not found: {0}")]
    NotFound(String),

    #[error("descriptor failed validation with {} error(s)", .0.len())]
    Invalid(Vec<crate::validation::ValidationError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A lexical or grammatical problem in descriptor text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error on line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_file_name_takes_last_segment() {
        assert_eq!(
            url_file_name("https://raw.githubusercontent.com/Ske-417/homebrew-dote/main/dote.c"),
            Some("dote.c")
        );
        assert_eq!(
            url_file_name("https://example.com/pkg.tar.gz?raw=1#top"),
            Some("pkg.tar.gz")
        );
        assert_eq!(url_file_name("https://example.com/"), None);
        assert_eq!(url_file_name("https://example.com"), None);
    }
}
