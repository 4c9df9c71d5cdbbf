//! Validate a set of descriptor files and aggregate one report.
//!
//! Each file is parsed and validated on its own; a failure in one never stops
//! its siblings. Conflict detection then runs over every file that parsed,
//! valid or not.

use serde::Serialize;
use tracing::debug;

use crate::duplicates::{Candidate, detect_conflicts};
use crate::parser::parse_descriptor;
use crate::types::{PackageDescriptor, RawDescriptor};
use crate::validation::{Diagnostic, ValidationError, ValidationOptions, validate};

/// Descriptor text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path or other label used in reports.
    pub location: String,
    /// File stem, checked against the class name when present.
    pub file_stem: Option<String>,
    pub text: String,
}

impl SourceFile {
    /// A source with no file-name check.
    pub fn inline(location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            file_stem: None,
            text: text.into(),
        }
    }
}

/// Validation outcome for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub location: String,
    /// Declared class name, when the header parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<PackageDescriptor>,
    #[serde(skip)]
    pub errors: Vec<ValidationError>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Full result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    #[serde(skip)]
    pub conflicts: Vec<ValidationError>,
}

impl BatchReport {
    /// Number of errors across files and conflicts.
    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum::<usize>() + self.conflicts.len()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// Every error as a flat, location-tagged list: per-file errors in input
    /// order, then conflicts.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self
            .files
            .iter()
            .flat_map(|f| f.errors.iter().map(|e| e.to_diagnostic(Some(&f.location))))
            .collect();
        out.extend(self.conflicts.iter().map(|e| e.to_diagnostic(None)));
        out
    }

    /// Validated descriptors, in input order.
    pub fn descriptors(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.files.iter().filter_map(|f| f.descriptor.as_ref())
    }
}

/// Validate every source, then detect conflicts among them.
pub fn validate_batch(sources: &[SourceFile], options: &ValidationOptions) -> BatchReport {
    let mut files = Vec::with_capacity(sources.len());
    let mut parsed: Vec<RawDescriptor> = Vec::new();

    for source in sources {
        debug!(location = %source.location, "validating descriptor");
        let report = match parse_descriptor(&source.text) {
            Ok(mut raw) => {
                raw.source = source.location.clone();
                raw.file_stem = source.file_stem.clone();
                let report = match validate(&raw, options) {
                    Ok(descriptor) => FileReport {
                        location: source.location.clone(),
                        name: Some(raw.name.clone()),
                        descriptor: Some(descriptor),
                        errors: Vec::new(),
                    },
                    Err(errors) => FileReport {
                        location: source.location.clone(),
                        name: Some(raw.name.clone()),
                        descriptor: None,
                        errors,
                    },
                };
                parsed.push(raw);
                report
            }
            Err(e) => FileReport {
                location: source.location.clone(),
                name: None,
                descriptor: None,
                errors: vec![ValidationError::Syntax(e)],
            },
        };
        files.push(report);
    }

    let conflicts = find_conflicts(&parsed);
    BatchReport { files, conflicts }
}

/// Parse every source and run only the duplicate detector.
///
/// Sources that fail to parse are skipped; their names are unknown.
pub fn conflicts_in(sources: &[SourceFile]) -> Vec<ValidationError> {
    let parsed: Vec<RawDescriptor> = sources
        .iter()
        .filter_map(|source| {
            parse_descriptor(&source.text).ok().map(|mut raw| {
                raw.source = source.location.clone();
                raw
            })
        })
        .collect();
    find_conflicts(&parsed)
}

fn find_conflicts(parsed: &[RawDescriptor]) -> Vec<ValidationError> {
    detect_conflicts(parsed.iter().map(Candidate::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dote(owner: &str, homepage_repo: &str, sha: &str, version: &str) -> String {
        format!(
            r##"class Dote < Formula
  desc "Full-screen ANSI meteor shower animation (2 spaces = 1 pixel)"
  homepage "https://github.com/{owner}/{homepage_repo}"
  url "https://raw.githubusercontent.com/{owner}/homebrew-dote/main/dote.c"
  sha256 "{sha}"
  license "MIT"
  version {version}

  def install
    system ENV.cc, "dote.c", "-o", "dote"
    bin.install "dote"
  end

  test do
    assert_match "dote", shell_output("#{{bin}}/dote --version")
  end
end
"##
        )
    }

    const GOOD_SHA: &str = "2dfd8b37383019075e4ab9baf70ffc9893659966900f6e055f9d6d830e4d496d";

    /// The four descriptors of the upstream dote tap, each with its own defect.
    fn upstream_tap() -> Vec<SourceFile> {
        vec![
            SourceFile::inline(
                "a/dote.rb",
                dote("Ske-417", "homebrew-meteor", "<後で差し替え>", "\"1.0.0\""),
            ),
            SourceFile::inline(
                "b/dote.rb",
                dote("Ske-417", "homebrew-meteor", &format!("{}0", GOOD_SHA), "\"1.0.0\""),
            ),
            SourceFile::inline(
                "c/dote.rb",
                dote("kmc2400", "homebrew-dote", GOOD_SHA, "\u{201C}1.0.0\u{201D}"),
            ),
            SourceFile::inline(
                "d/dote.rb",
                dote("kmc2400", "homebrew-dote", GOOD_SHA, "\"1.0.0\""),
            ),
        ]
    }

    #[test]
    fn upstream_tap_surfaces_four_independent_diagnostics() {
        let report = validate_batch(&upstream_tap(), &ValidationOptions::default());
        let kinds: Vec<&str> = report.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                "InvalidChecksum",
                "InvalidChecksum",
                "MalformedLiteral",
                "ConflictingDescriptors",
            ]
        );
        assert_eq!(report.error_count(), 4);
        assert_eq!(report.descriptors().count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn diagnostics_carry_locations() {
        let report = validate_batch(&upstream_tap(), &ValidationOptions::default());
        let diags = report.diagnostics();
        assert_eq!(diags[0].location.as_deref(), Some("a/dote.rb"));
        assert_eq!(diags[2].location.as_deref(), Some("c/dote.rb"));
        assert_eq!(diags[3].location, None);
    }

    #[test]
    fn syntax_error_does_not_stop_siblings() {
        let sources = vec![
            SourceFile::inline("broken.rb", "class Broken < Formula\n  url \"oops\n"),
            SourceFile::inline("dote.rb", dote("kmc2400", "homebrew-dote", GOOD_SHA, "\"1.0.0\"")),
        ];
        let report = validate_batch(&sources, &ValidationOptions::default());
        assert_eq!(report.files[0].errors[0].kind(), "Syntax");
        assert_eq!(report.files[0].name, None);
        assert!(report.files[1].is_valid());
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn file_stem_checked_in_batch() {
        let sources = vec![SourceFile {
            location: "Formula/meteor.rb".into(),
            file_stem: Some("meteor".into()),
            text: dote("kmc2400", "homebrew-dote", GOOD_SHA, "\"1.0.0\""),
        }];
        let report = validate_batch(&sources, &ValidationOptions::default());
        assert_eq!(report.files[0].errors[0].kind(), "NameMismatch");
    }

    #[test]
    fn conflicts_only() {
        let conflicts = conflicts_in(&upstream_tap());
        assert_eq!(conflicts.len(), 1);
    }
}
