//! `brewlint show` -- print a validated descriptor.
//!
//! Descriptor text (`.rb`) is parsed and validated; JSON and TOML exports are
//! deserialized and then held to the same rules.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use brewlint_formula::loader::FORMULA_EXTENSION;
use brewlint_formula::parser::{parse_json, parse_toml, to_json, to_toml};
use brewlint_formula::printer::print;
use brewlint_formula::{
    PackageDescriptor, SourceFile, ValidationError, ValidationOptions, validate_batch,
    validate_source,
};
use tracing::debug;

use crate::cli::{ShowArgs, ShowFormat};
use crate::context::RuntimeContext;

/// A descriptor file and its validated contents.
pub(crate) struct Loaded {
    pub path: PathBuf,
    pub location: String,
    pub text: String,
    pub descriptor: PackageDescriptor,
}

impl Loaded {
    pub fn is_formula_text(&self) -> bool {
        extension(&self.path) == Some(FORMULA_EXTENSION)
    }
}

/// Execute the `brewlint show` command.
pub fn run(ctx: &RuntimeContext, args: &ShowArgs) -> Result<()> {
    let loaded = load_descriptor(ctx, &args.formula)?;
    let format = if ctx.json { ShowFormat::Json } else { args.format };

    let mut out = match format {
        ShowFormat::Dsl => print(&loaded.descriptor),
        ShowFormat::Json => to_json(&loaded.descriptor)?,
        ShowFormat::Toml => to_toml(&loaded.descriptor)?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    print!("{}", out);
    Ok(())
}

/// Resolve, read and validate one descriptor.
pub(crate) fn load_descriptor(ctx: &RuntimeContext, name: &str) -> Result<Loaded> {
    let path = ctx.resolve_formula(name)?;
    let location = ctx.display_path(&path);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let options = ctx.validation_options();
    debug!(%location, "loading descriptor");

    let descriptor = match extension(&path) {
        Some("json") => imported(parse_json(&text)?, &location, &options)?,
        Some("toml") => imported(parse_toml(&text)?, &location, &options)?,
        _ => {
            let source = SourceFile {
                location: location.clone(),
                file_stem: path.file_stem().and_then(|s| s.to_str()).map(str::to_owned),
                text: text.clone(),
            };
            let mut report = validate_batch(&[source], &options);
            let file = report
                .files
                .pop()
                .ok_or_else(|| anyhow!("no report for {}", location))?;
            match file.descriptor {
                Some(descriptor) => descriptor,
                None => return Err(invalid(&location, &file.errors)),
            }
        }
    };

    Ok(Loaded {
        path,
        location,
        text,
        descriptor,
    })
}

/// Exports skip the text parser; their canonical text is validated instead.
fn imported(
    descriptor: PackageDescriptor,
    location: &str,
    options: &ValidationOptions,
) -> Result<PackageDescriptor> {
    validate_source(&print(&descriptor), options).map_err(|errors| invalid(location, &errors))
}

fn invalid(location: &str, errors: &[ValidationError]) -> anyhow::Error {
    let mut msg = format!("{} failed validation:", location);
    for e in errors {
        msg.push_str(&format!("\n  [{}] {}", e.kind(), e));
    }
    anyhow!(msg)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_error() {
        let errors = vec![
            ValidationError::MissingField {
                field: brewlint_formula::Field::Url,
            },
            ValidationError::MissingField {
                field: brewlint_formula::Field::Version,
            },
        ];
        let msg = invalid("Formula/dote.rb", &errors).to_string();
        assert!(msg.starts_with("Formula/dote.rb failed validation:"));
        assert_eq!(msg.matches("[MissingField]").count(), 2);
    }
}
