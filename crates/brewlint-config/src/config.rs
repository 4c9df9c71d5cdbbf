//! Configuration types and loading for brewlint.
//!
//! The main entry point is [`BrewlintConfig`], which represents the contents
//! of `.brewlint.yaml` at the root of a tap. Settings are layered: built-in
//! defaults, then the YAML file, then `BREWLINT_*` environment variables.
//! Configuration is loaded with [`load_config`] and saved with [`save_config`].

use std::path::Path;

use brewlint_formula::ValidationOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the per-tap configuration.
pub const CONFIG_FILE_NAME: &str = ".brewlint.yaml";

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "BREWLINT_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration file could not be written.
    #[error("failed to write config file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] serde_yaml::Error),

    /// A layer produced a value of the wrong shape.
    #[error("invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// No tap root was found.
    #[error("no tap found (expected Formula/, HomebrewFormula/ or .brewlint.yaml in this or a parent directory)")]
    TapNotFound,

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full brewlint configuration, corresponding to `.brewlint.yaml`.
///
/// A partially-specified file keeps the defaults for everything it omits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrewlintConfig {
    /// Directories, relative to the tap root, scanned for `*.rb` descriptors.
    pub formula_dirs: Vec<String>,

    /// Report a missing `license` stanza as an error.
    pub require_license: bool,

    /// URL schemes accepted for `url` and `homepage`.
    pub allowed_schemes: Vec<String>,

    /// Output JSON instead of human-readable text.
    pub json: bool,
}

impl Default for BrewlintConfig {
    fn default() -> Self {
        let options = ValidationOptions::default();
        Self {
            formula_dirs: vec![
                "Formula".to_string(),
                "HomebrewFormula".to_string(),
                ".".to_string(),
            ],
            require_license: options.require_license,
            allowed_schemes: options.allowed_schemes,
            json: false,
        }
    }
}

impl BrewlintConfig {
    /// Validator settings derived from this configuration.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            require_license: self.require_license,
            allowed_schemes: self.allowed_schemes.clone(),
        }
    }

    /// Reject values no run could use.
    pub fn check(&self) -> Result<()> {
        if self.formula_dirs.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "formula-dirs".into(),
                reason: "at least one directory is required".into(),
            });
        }
        if self.allowed_schemes.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "allowed-schemes".into(),
                reason: "at least one scheme is required".into(),
            });
        }
        if let Some(bad) = self.allowed_schemes.iter().find(|s| !is_scheme(s)) {
            return Err(ConfigError::InvalidValue {
                key: "allowed-schemes".into(),
                reason: format!("'{}' is not a URL scheme", bad),
            });
        }
        Ok(())
    }
}

/// Lowercase scheme as `url` normalizes it: a letter, then letters, digits,
/// `+`, `-` or `.`.
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+-.".contains(c))
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load configuration for the tap rooted at `tap_root`.
///
/// A missing `.brewlint.yaml` is not an error; defaults and environment
/// overrides still apply.
pub fn load_config(tap_root: &Path) -> Result<BrewlintConfig> {
    load_config_file(&tap_root.join(CONFIG_FILE_NAME))
}

/// Load configuration from an explicit file path.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
/// [`ConfigError::Extract`] if a layer has a malformed value, or
/// [`ConfigError::InvalidValue`] if the merged result is unusable.
pub fn load_config_file(path: &Path) -> Result<BrewlintConfig> {
    let mut figment = Figment::from(Serialized::defaults(BrewlintConfig::default()));

    if path.is_file() {
        let content = std::fs::read_to_string(path)?;
        // An empty file is valid and contributes nothing.
        if !content.trim().is_empty() {
            figment = figment.merge(Yaml::string(&content));
        }
    }

    figment = figment.merge(
        Env::prefixed(ENV_PREFIX)
            .ignore(&["tap", "log", "config"])
            .map(|key| key.as_str().replace('_', "-").into()),
    );

    let config: BrewlintConfig = figment.extract().map_err(Box::new)?;
    config.check()?;
    Ok(config)
}

/// Save configuration to `.brewlint.yaml` inside `tap_root`.
///
/// # Errors
///
/// Returns [`ConfigError::WriteError`] on I/O failure or
/// [`ConfigError::SerializeError`] if serialization fails.
pub fn save_config(tap_root: &Path, config: &BrewlintConfig) -> Result<()> {
    std::fs::create_dir_all(tap_root).map_err(ConfigError::WriteError)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(tap_root.join(CONFIG_FILE_NAME), yaml)
        .map_err(ConfigError::WriteError)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let cfg = BrewlintConfig::default();
        assert_eq!(cfg.formula_dirs, vec!["Formula", "HomebrewFormula", "."]);
        assert!(!cfg.require_license);
        assert_eq!(cfg.allowed_schemes, vec!["https", "http"]);
        assert!(!cfg.json);
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn test_load_missing_config_returns_default() {
        Jail::expect_with(|jail| {
            let cfg = load_config(jail.directory()).map_err(|e| e.to_string())?;
            assert_eq!(cfg, BrewlintConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_empty_file_returns_default() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "\n")?;
            let cfg = load_config(jail.directory()).map_err(|e| e.to_string())?;
            assert_eq!(cfg, BrewlintConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "require-license: true\n")?;
            let cfg = load_config(jail.directory()).map_err(|e| e.to_string())?;
            assert!(cfg.require_license);
            assert_eq!(cfg.allowed_schemes, vec!["https", "http"]);
            assert_eq!(cfg.formula_dirs.len(), 3);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                "allowed-schemes: [https, http]\njson: false\n",
            )?;
            jail.set_env("BREWLINT_ALLOWED_SCHEMES", "[https]");
            jail.set_env("BREWLINT_JSON", "true");
            jail.set_env("BREWLINT_TAP", "/somewhere/else");

            let cfg = load_config(jail.directory()).map_err(|e| e.to_string())?;
            assert_eq!(cfg.allowed_schemes, vec!["https"]);
            assert!(cfg.json);
            Ok(())
        });
    }

    #[test]
    fn test_validation_options_follow_config() {
        let cfg = BrewlintConfig {
            require_license: true,
            allowed_schemes: vec!["https".into()],
            ..BrewlintConfig::default()
        };
        let options = cfg.validation_options();
        assert!(options.require_license);
        assert_eq!(options.allowed_schemes, vec!["https"]);
    }

    #[test]
    fn test_rejects_empty_lists() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "formula-dirs: []\n")?;
            let err = load_config(jail.directory()).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "formula-dirs")
            );
            Ok(())
        });
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let cfg = BrewlintConfig {
            allowed_schemes: vec!["HTTPS://".into()],
            ..BrewlintConfig::default()
        };
        match cfg.check() {
            Err(ConfigError::InvalidValue { key, reason }) => {
                assert_eq!(key, "allowed-schemes");
                assert!(reason.contains("HTTPS://"));
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_value_is_extract_error() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "require-license: maybe\n")?;
            let err = load_config(jail.directory()).unwrap_err();
            assert!(matches!(err, ConfigError::Extract(_)));
            Ok(())
        });
    }

    #[test]
    fn test_roundtrip_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BrewlintConfig {
            formula_dirs: vec!["Formula".into()],
            require_license: true,
            ..BrewlintConfig::default()
        };
        save_config(dir.path(), &cfg).unwrap();

        let content = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(content.contains("require-license: true"));
        assert!(content.contains("formula-dirs:"));
    }

    #[test]
    fn test_save_into_file_path_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "").unwrap();

        let err = save_config(&blocker, &BrewlintConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::WriteError(_)));
        assert!(err.to_string().starts_with("failed to write config file"));
    }
}
