//! Descriptor validation rules.
//!
//! [`validate`] runs every check against a [`RawDescriptor`] and collects all
//! failures instead of stopping at the first one. Checks run in a fixed
//! order: required fields, checksum, version, URLs, install-step
//! consistency, then the class-name / file-name match.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::duplicates::Origin;
use crate::lexer::is_non_ascii_quote;
use crate::parser::parse_descriptor;
use crate::types::{
    InstallStep, KNOWN_COMPILERS, Literal, PackageDescriptor, RawArg, RawDescriptor, RawStep,
    RawValue, SyntaxError, TestCommand, Word,
};

static CHECKSUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("checksum pattern compiles"));

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z][0-9A-Za-z._+\-]*$").expect("version pattern compiles")
});

/// Length of a hex-encoded SHA-256 digest.
pub const CHECKSUM_LEN: usize = 64;

/// A descriptor field, as named in descriptor text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    #[serde(rename = "desc")]
    Description,
    Homepage,
    Url,
    Sha256,
    License,
    Version,
    Install,
    Test,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "desc",
            Field::Homepage => "homepage",
            Field::Url => "url",
            Field::Sha256 => "sha256",
            Field::License => "license",
            Field::Version => "version",
            Field::Install => "install",
            Field::Test => "test",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a checksum literal was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumDefect {
    /// Only lowercase hex digits, but not 64 of them.
    Length(usize),
    /// First character outside `[0-9a-f]`.
    NonHex(char),
}

impl fmt::Display for ChecksumDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumDefect::Length(n) => {
                write!(f, "expected {} hex characters, found {}", CHECKSUM_LEN, n)
            }
            ChecksumDefect::NonHex(c) => write!(f, "{:?} is not a lowercase hex digit", c),
        }
    }
}

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: Field },

    #[error("invalid sha256 {value:?}: {reason}")]
    InvalidChecksum { value: String, reason: ChecksumDefect },

    #[error("malformed literal for `{field}`: {literal} ({reason})")]
    MalformedLiteral {
        field: Field,
        literal: String,
        reason: String,
    },

    #[error("invalid URL for `{field}` {value:?}: {reason}")]
    InvalidUrl {
        field: Field,
        value: String,
        reason: String,
    },

    #[error("inconsistent install steps: {detail}")]
    InconsistentInstallSteps { detail: String },

    #[error("conflicting descriptors for `{name}` from {} origins: {}", .origins.len(), format_origins(.origins))]
    ConflictingDescriptors { name: String, origins: Vec<Origin> },

    #[error("class name `{name}` does not match its file (expected `{expected}`)")]
    NameMismatch { name: String, expected: String },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

fn format_origins(origins: &[Origin]) -> String {
    origins
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Stable name of the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "MissingField",
            Self::InvalidChecksum { .. } => "InvalidChecksum",
            Self::MalformedLiteral { .. } => "MalformedLiteral",
            Self::InvalidUrl { .. } => "InvalidURL",
            Self::InconsistentInstallSteps { .. } => "InconsistentInstallSteps",
            Self::ConflictingDescriptors { .. } => "ConflictingDescriptors",
            Self::NameMismatch { .. } => "NameMismatch",
            Self::Syntax(_) => "Syntax",
        }
    }

    /// The field the error is about, if it concerns a single field.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::MissingField { field }
            | Self::MalformedLiteral { field, .. }
            | Self::InvalidUrl { field, .. } => Some(*field),
            Self::InvalidChecksum { .. } => Some(Field::Sha256),
            Self::InconsistentInstallSteps { .. } => Some(Field::Install),
            Self::ConflictingDescriptors { .. } | Self::NameMismatch { .. } => Some(Field::Name),
            Self::Syntax(_) => None,
        }
    }

    /// Flatten into a serializable report entry.
    pub fn to_diagnostic(&self, location: Option<&str>) -> Diagnostic {
        Diagnostic {
            location: location.map(str::to_owned),
            kind: self.kind(),
            field: self.field(),
            line: match self {
                Self::Syntax(e) => Some(e.line),
                _ => None,
            },
            message: self.to_string(),
        }
    }
}

/// One report entry: error kind, field and message, tagged with the file it
/// came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

/// Tunables for [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Treat a missing `license` stanza as [`ValidationError::MissingField`].
    pub require_license: bool,
    /// URL schemes accepted for `url` and `homepage`.
    pub allowed_schemes: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            require_license: false,
            allowed_schemes: vec!["https".to_string(), "http".to_string()],
        }
    }
}

/// Parse and validate descriptor text in one step.
pub fn validate_source(
    text: &str,
    options: &ValidationOptions,
) -> Result<PackageDescriptor, Vec<ValidationError>> {
    let raw = parse_descriptor(text).map_err(|e| vec![ValidationError::Syntax(e)])?;
    validate(&raw, options)
}

/// Validates a parsed descriptor, collecting every failure.
pub fn validate(
    raw: &RawDescriptor,
    options: &ValidationOptions,
) -> Result<PackageDescriptor, Vec<ValidationError>> {
    let mut errors = Vec::new();

    // 1. Required fields.
    let mut required = vec![
        (Field::Url, raw.url.is_some()),
        (Field::Install, raw.install.as_ref().is_some_and(|s| !s.is_empty())),
        (Field::Version, raw.version.is_some()),
    ];
    if options.require_license {
        required.push((Field::License, raw.license.is_some()));
    }
    for (field, present) in required {
        if !present {
            errors.push(ValidationError::MissingField { field });
        }
    }

    // 2. Checksum.
    let checksum = raw
        .sha256
        .as_ref()
        .and_then(|v| quoted_string(Field::Sha256, v, &mut errors))
        .and_then(|s| match check_checksum(&s) {
            Ok(()) => Some(s),
            Err(reason) => {
                errors.push(ValidationError::InvalidChecksum { value: s, reason });
                None
            }
        });

    // 3. Version.
    let version = raw.version.as_ref().and_then(|v| check_version(v, &mut errors));

    // 4. URLs.
    let source_url = raw
        .url
        .as_ref()
        .and_then(|v| quoted_string(Field::Url, v, &mut errors))
        .and_then(|s| check_url(Field::Url, s, options, &mut errors));
    let homepage = raw
        .homepage
        .as_ref()
        .and_then(|v| quoted_string(Field::Homepage, v, &mut errors))
        .and_then(|s| check_url(Field::Homepage, s, options, &mut errors));

    let description = raw
        .desc
        .as_ref()
        .and_then(|v| quoted_string(Field::Description, v, &mut errors));
    let license = raw
        .license
        .as_ref()
        .and_then(|v| quoted_string(Field::License, v, &mut errors));

    // 5. Install steps.
    let install_steps = raw
        .install
        .as_deref()
        .map(|steps| build_install_steps(steps, &mut errors));
    if let Some(steps) = &install_steps {
        let source_file = source_url.as_deref().and_then(crate::types::url_file_name);
        check_install_consistency(steps, source_file, &mut errors);
    }
    let test = raw.test.as_ref().and_then(|t| {
        let expected = arg_string(Field::Test, &t.expected, &mut errors)?;
        let command = arg_string(Field::Test, &t.command, &mut errors)?;
        Some(TestCommand { command, expected })
    });

    // 6. Class name vs. file name.
    if let Some(stem) = &raw.file_stem {
        let expected = class_name_for(stem);
        if expected != raw.name {
            errors.push(ValidationError::NameMismatch {
                name: raw.name.clone(),
                expected,
            });
        }
    }

    debug!(
        name = %raw.name,
        source = %raw.source,
        errors = errors.len(),
        "validated descriptor"
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every required value is present once `errors` is empty.
    match (source_url, version, install_steps) {
        (Some(source_url), Some(version), Some(install_steps)) => Ok(PackageDescriptor {
            name: raw.name.clone(),
            description: description.unwrap_or_default(),
            homepage,
            source_url,
            checksum,
            license,
            version,
            install_steps,
            test,
        }),
        _ => Err(vec![ValidationError::MissingField { field: Field::Url }]),
    }
}

/// Checks a checksum string against `^[0-9a-f]{64}$`.
pub fn check_checksum(value: &str) -> Result<(), ChecksumDefect> {
    if CHECKSUM_RE.is_match(value) {
        return Ok(());
    }
    if let Some(c) = value.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
        return Err(ChecksumDefect::NonHex(c));
    }
    Err(ChecksumDefect::Length(value.chars().count()))
}

/// Homebrew's file-name to class-name rule: `foo-bar@1.2` -> `FooBarAT12`.
pub fn class_name_for(file_stem: &str) -> String {
    let stem = file_stem.replace('+', "x");
    let mut out = String::with_capacity(stem.len());
    let mut chars = stem.chars().peekable();
    let mut upper_next = true;
    while let Some(c) = chars.next() {
        match c {
            '@' if chars.peek().is_some_and(|n| n.is_ascii_digit()) => {
                out.push_str("AT");
                upper_next = false;
            }
            '-' | '_' | '.' | ' ' if chars.peek().is_some_and(|n| n.is_ascii_alphanumeric()) => {
                upper_next = true;
            }
            c if upper_next => {
                out.extend(c.to_uppercase());
                upper_next = false;
            }
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns the string value of a stanza, or records why it is malformed.
fn quoted_string(
    field: Field,
    value: &RawValue,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match &value.literal {
        Literal::Str(s) => Some(s.clone()),
        Literal::Bare(s) => {
            errors.push(ValidationError::MalformedLiteral {
                field,
                literal: s.clone(),
                reason: "value must be a quoted string".into(),
            });
            None
        }
        Literal::Malformed(s) => {
            errors.push(malformed_quotes(field, s));
            None
        }
    }
}

fn malformed_quotes(field: Field, literal: &str) -> ValidationError {
    ValidationError::MalformedLiteral {
        field,
        literal: literal.to_owned(),
        reason: "quoted with non-ASCII quotation marks".into(),
    }
}

fn check_version(value: &RawValue, errors: &mut Vec<ValidationError>) -> Option<String> {
    let s = quoted_string(Field::Version, value, errors)?;
    if s.chars().any(is_non_ascii_quote) {
        errors.push(malformed_quotes(Field::Version, &s));
        return None;
    }
    if !VERSION_RE.is_match(&s) || !s.chars().any(|c| c.is_ascii_digit()) {
        errors.push(ValidationError::MalformedLiteral {
            field: Field::Version,
            literal: s,
            reason: "not a version token".into(),
        });
        return None;
    }
    Some(s)
}

fn check_url(
    field: Field,
    value: String,
    options: &ValidationOptions,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let reason = match Url::parse(&value) {
        Err(e) => Some(e.to_string()),
        Ok(parsed) if !parsed.has_host() => Some("URL has no host".to_string()),
        Ok(parsed) if !options.allowed_schemes.iter().any(|s| s == parsed.scheme()) => {
            Some(format!("scheme `{}` is not allowed", parsed.scheme()))
        }
        Ok(_) if field == Field::Url && crate::types::url_file_name(&value).is_none() => {
            Some("URL does not name a file".to_string())
        }
        Ok(_) => None,
    };
    match reason {
        Some(reason) => {
            errors.push(ValidationError::InvalidUrl {
                field,
                value,
                reason,
            });
            None
        }
        None => Some(value),
    }
}

fn arg_string(field: Field, arg: &RawArg, errors: &mut Vec<ValidationError>) -> Option<String> {
    match arg {
        RawArg::Str(s) => Some(s.clone()),
        RawArg::Expr(e) => {
            errors.push(ValidationError::MalformedLiteral {
                field,
                literal: e.clone(),
                reason: "expected a string literal".into(),
            });
            None
        }
        RawArg::Malformed(s) => {
            errors.push(malformed_quotes(field, s));
            None
        }
    }
}

fn arg_word(arg: &RawArg, errors: &mut Vec<ValidationError>) -> Option<Word> {
    match arg {
        RawArg::Str(s) => Some(Word::Literal(s.clone())),
        RawArg::Expr(e) => Some(Word::Expr(e.clone())),
        RawArg::Malformed(s) => {
            errors.push(malformed_quotes(Field::Install, s));
            None
        }
    }
}

fn is_compiler(word: &Word) -> bool {
    match word {
        Word::Expr(e) => matches!(e.as_str(), "ENV.cc" | "ENV.cxx"),
        Word::Literal(s) => KNOWN_COMPILERS.contains(&s.as_str()),
    }
}

fn build_install_steps(raw: &[RawStep], errors: &mut Vec<ValidationError>) -> Vec<InstallStep> {
    let mut steps = Vec::with_capacity(raw.len());
    for step in raw {
        match step {
            RawStep::Install {
                directory, args, ..
            } => {
                let artifacts: Option<Vec<String>> = args
                    .iter()
                    .map(|a| arg_string(Field::Install, a, errors))
                    .collect();
                if let Some(artifacts) = artifacts {
                    steps.push(InstallStep::Install {
                        directory: directory.clone(),
                        artifacts,
                    });
                }
            }
            RawStep::System { args, .. } => {
                let words: Option<Vec<Word>> = args.iter().map(|a| arg_word(a, errors)).collect();
                if let Some((program, rest)) = words.as_deref().and_then(<[Word]>::split_first) {
                    steps.push(classify_system(program.clone(), rest.to_vec()));
                }
            }
        }
    }
    steps
}

/// A `system` call is a compile step when it runs a known compiler with
/// literal arguments and a `-o <output>` pair.
fn classify_system(program: Word, args: Vec<Word>) -> InstallStep {
    let literals: Option<Vec<&str>> = args
        .iter()
        .map(|w| match w {
            Word::Literal(s) => Some(s.as_str()),
            Word::Expr(_) => None,
        })
        .collect();

    if let (true, Some(literals)) = (is_compiler(&program), literals) {
        let has_output = literals
            .iter()
            .position(|a| *a == "-o")
            .is_some_and(|pos| pos + 1 < literals.len());
        if has_output {
            return InstallStep::Compile {
                compiler: program,
                args: literals.iter().map(|a| a.to_string()).collect(),
            };
        }
    }

    InstallStep::Shell { program, args }
}

fn check_install_consistency(
    steps: &[InstallStep],
    source_file: Option<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let has_shell = steps.iter().any(|s| matches!(s, InstallStep::Shell { .. }));
    let mut produced: Vec<&str> = Vec::new();
    let mut installed: Vec<&str> = Vec::new();

    for step in steps {
        match step {
            InstallStep::Compile { .. } => {
                let sources = step.sources();
                if let Some(file) = source_file {
                    if !sources.contains(&file) {
                        errors.push(ValidationError::InconsistentInstallSteps {
                            detail: format!(
                                "compile step builds {} but url fetches `{}`",
                                describe_files(&sources),
                                file
                            ),
                        });
                    }
                }
                produced.extend(step.output());
            }
            InstallStep::Install { artifacts, .. } => {
                for artifact in artifacts {
                    if !has_shell && !produced.contains(&artifact.as_str()) {
                        errors.push(ValidationError::InconsistentInstallSteps {
                            detail: format!(
                                "`{}` is installed but no earlier compile step produces it",
                                artifact
                            ),
                        });
                    }
                    installed.push(artifact);
                }
            }
            InstallStep::Shell { .. } => {}
        }
    }

    for output in produced {
        if !installed.contains(&output) {
            errors.push(ValidationError::InconsistentInstallSteps {
                detail: format!("compile output `{}` is never installed", output),
            });
        }
    }
}

fn describe_files(files: &[&str]) -> String {
    if files.is_empty() {
        return "no source files".to_string();
    }
    files
        .iter()
        .map(|f| format!("`{}`", f))
        .collect::<Vec<_>>()
        .join(", ")
}
