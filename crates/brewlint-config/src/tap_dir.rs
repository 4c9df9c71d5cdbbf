//! Discovery of the tap root.
//!
//! A tap is a directory tree holding formula descriptors. Its root is the
//! first directory, walking up from the working directory, that contains a
//! `Formula/` or `HomebrewFormula/` directory or a `.brewlint.yaml` file.

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE_NAME, ConfigError};

/// Directory names that mark a tap root.
const TAP_MARKERS: &[&str] = &["Formula", "HomebrewFormula"];

/// The name of the environment variable that can override the tap root.
const TAP_ENV: &str = "BREWLINT_TAP";

/// Walk up the directory tree from `start` looking for a tap root.
///
/// The `BREWLINT_TAP` environment variable is checked first (highest
/// priority). Returns `None` if the filesystem root is reached without
/// finding one.
///
/// # Examples
///
/// ```no_run
/// use brewlint_config::tap_dir::find_tap_root;
/// use std::path::Path;
///
/// if let Some(root) = find_tap_root(Path::new(".")) {
///     println!("Found tap at {}", root.display());
/// }
/// ```
pub fn find_tap_root(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(TAP_ENV) {
        let env_path = PathBuf::from(&env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    start.ancestors().find(|dir| is_tap_root(dir)).map(Path::to_path_buf)
}

/// Like [`find_tap_root`], but a missing tap is an error.
///
/// # Errors
///
/// Returns [`ConfigError::TapNotFound`] if no tap root is found.
pub fn find_tap_root_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_tap_root(start).ok_or(ConfigError::TapNotFound)
}

/// The tap root above `start`, or `start` itself when there is none.
///
/// Loose descriptor files outside any tap are still checked; their directory
/// acts as the root.
pub fn resolve_tap_root(start: &Path) -> PathBuf {
    find_tap_root(start).unwrap_or_else(|| start.to_path_buf())
}

fn is_tap_root(dir: &Path) -> bool {
    TAP_MARKERS.iter().any(|m| dir.join(m).is_dir()) || dir.join(CONFIG_FILE_NAME).is_file()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
