//! Locate and read descriptor files in a tap.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::batch::SourceFile;
use crate::types::FormulaError;

/// Descriptor file extension.
pub const FORMULA_EXTENSION: &str = "rb";

/// Read one descriptor file.
pub fn load_source(path: &Path) -> Result<SourceFile, FormulaError> {
    let text = std::fs::read_to_string(path)?;
    Ok(SourceFile {
        location: path.display().to_string(),
        file_stem: path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_owned),
        text,
    })
}

/// List descriptor files directly inside each of `dirs` (relative to `root`).
///
/// Missing directories are skipped. The result is sorted and free of
/// duplicates, so a directory listed twice is scanned once.
pub fn discover_formula_files(root: &Path, dirs: &[String]) -> Result<Vec<PathBuf>, FormulaError> {
    let mut files = Vec::new();
    for dir in dirs {
        let path = root.join(dir);
        if !path.is_dir() {
            debug!(dir = %path.display(), "formula directory not present");
            continue;
        }
        for entry in std::fs::read_dir(&path)? {
            let entry_path = entry?.path();
            let is_formula = entry_path.is_file()
                && entry_path.extension().and_then(|e| e.to_str()) == Some(FORMULA_EXTENSION);
            if is_formula {
                files.push(entry_path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Search for a descriptor by package name or path.
///
/// Search order:
/// 1. Exact path (absolute, or relative to `cwd`)
/// 2. `<name>.rb` in each formula directory under `root`
pub fn find_formula(
    name: &str,
    cwd: &Path,
    root: &Path,
    dirs: &[String],
) -> Result<PathBuf, FormulaError> {
    let exact = Path::new(name);
    if exact.is_absolute() && exact.is_file() {
        return Ok(exact.to_path_buf());
    }
    let relative = cwd.join(name);
    if relative.is_file() {
        return Ok(relative);
    }

    let file_name = format!("{}.{}", name.to_lowercase(), FORMULA_EXTENSION);
    for dir in dirs {
        let candidate = root.join(dir).join(&file_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(FormulaError::NotFound(format!(
        "'{}' (searched {} under {})",
        name,
        dirs.join(", "),
        root.display()
    )))
}
