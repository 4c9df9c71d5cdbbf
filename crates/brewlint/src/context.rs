//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds all the state a command handler needs:
//! the resolved tap root, the merged configuration, and global flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use brewlint_config::{
    BrewlintConfig, find_tap_root_or_error, load_config, load_config_file, resolve_tap_root,
};
use brewlint_formula::loader::{discover_formula_files, find_formula, load_source};
use brewlint_formula::{SourceFile, ValidationOptions};
use tracing::debug;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Working directory, used to shorten paths in reports.
    pub cwd: PathBuf,

    /// Root of the tap being checked.
    pub tap_root: PathBuf,

    /// Merged configuration.
    pub config: BrewlintConfig,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// An explicit `--config` file must exist; otherwise `.brewlint.yaml` at
    /// the tap root is used when present.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let cwd = cwd.canonicalize().unwrap_or(cwd);
        let tap_root = resolve_tap_root(&cwd);

        let config = match &global.config {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file not found: {}", path.display());
                }
                load_config_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            None => load_config(&tap_root)
                .with_context(|| format!("failed to load config for {}", tap_root.display()))?,
        };
        debug!(tap_root = %tap_root.display(), ?config, "resolved runtime context");

        Ok(Self {
            cwd,
            tap_root,
            json: global.json || config.json,
            quiet: global.quiet,
            config,
        })
    }

    /// Validator settings from the configuration.
    pub fn validation_options(&self) -> ValidationOptions {
        self.config.validation_options()
    }

    /// Load descriptor sources for `paths`.
    ///
    /// An empty list means the whole tap, which must exist. Directories are
    /// scanned with the configured formula directories; files are read as
    /// given.
    pub fn collect_sources(&self, paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
        let files = if paths.is_empty() {
            let tap_root = find_tap_root_or_error(&self.cwd)?;
            self.discover(&tap_root)?
        } else {
            let mut files = Vec::new();
            for path in paths {
                let path = self.cwd.join(path);
                if path.is_dir() {
                    files.extend(self.discover(&path)?);
                } else if path.is_file() {
                    files.push(path);
                } else {
                    bail!("no such file or directory: {}", path.display());
                }
            }
            files
        };

        files
            .iter()
            .map(|path| {
                let mut source = load_source(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                source.location = self.display_path(path);
                Ok(source)
            })
            .collect()
    }

    /// Resolve a package name or path to a descriptor file.
    pub fn resolve_formula(&self, name: &str) -> Result<PathBuf> {
        Ok(find_formula(
            name,
            &self.cwd,
            &self.tap_root,
            &self.config.formula_dirs,
        )?)
    }

    /// `path` relative to the working directory when it lies beneath it.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.cwd)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let files = discover_formula_files(root, &self.config.formula_dirs)
            .with_context(|| format!("failed to scan {}", root.display()))?;
        if files.is_empty() {
            bail!("no formula files found under {}", root.display());
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewlint_config::ConfigError;
    use pretty_assertions::assert_eq;

    fn context_at(dir: &Path) -> RuntimeContext {
        let cwd = dir.canonicalize().unwrap();
        RuntimeContext {
            tap_root: cwd.clone(),
            cwd,
            config: BrewlintConfig::default(),
            json: false,
            quiet: false,
        }
    }

    #[test]
    fn collect_whole_tap_uses_relative_locations() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Formula")).unwrap();
        std::fs::write(dir.path().join("Formula/dote.rb"), "class Dote < Formula\nend\n").unwrap();

        let ctx = context_at(dir.path());
        let sources = ctx.collect_sources(&[]).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].location, "Formula/dote.rb");
        assert_eq!(sources[0].file_stem.as_deref(), Some("dote"));
    }

    #[test]
    fn collect_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_at(dir.path());
        let err = ctx.collect_sources(&[PathBuf::from("nope.rb")]).unwrap_err();
        assert!(err.to_string().contains("no such file or directory"));
    }

    #[test]
    fn whole_tap_outside_a_tap_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_at(dir.path());
        let err = ctx.collect_sources(&[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::TapNotFound)
        ));
    }

    #[test]
    fn empty_tap_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Formula")).unwrap();
        let ctx = context_at(dir.path());
        let err = ctx.collect_sources(&[]).unwrap_err();
        assert!(err.to_string().contains("no formula files found"));
    }
}
