//! `brewlint check` -- validate descriptors and report every error.
//!
//! Each file is validated independently, then the whole set is checked for
//! conflicting descriptors. The report lists every error found; the command
//! fails when there is at least one.

use anyhow::{Result, bail};
use brewlint_formula::{Diagnostic, FileReport, validate_batch};
use brewlint_ui::styles::{render_conflicts, render_file_report, render_report};
use serde::Serialize;
use tracing::debug;

use crate::cli::CheckArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_lines};

/// JSON shape of a check run.
#[derive(Serialize)]
struct CheckOutput<'a> {
    files: &'a [FileReport],
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    valid: usize,
}

/// Execute the `brewlint check` command.
pub fn run(ctx: &RuntimeContext, args: &CheckArgs) -> Result<()> {
    let sources = ctx.collect_sources(&args.paths)?;
    let mut options = ctx.validation_options();
    options.require_license |= args.require_license;
    debug!(files = sources.len(), ?options, "checking descriptors");

    let report = validate_batch(&sources, &options);
    let errors = report.error_count();

    if ctx.json {
        output_json(&CheckOutput {
            files: &report.files,
            diagnostics: report.diagnostics(),
            error_count: errors,
            valid: report.files.iter().filter(|f| f.is_valid()).count(),
        });
    } else if ctx.quiet {
        // Failing files and conflicts only.
        let failing = report
            .files
            .iter()
            .filter(|f| !f.is_valid())
            .flat_map(render_file_report);
        output_lines(failing.chain(render_conflicts(&report)));
    } else {
        output_lines([render_report(&report)]);
    }

    if !report.is_clean() {
        bail!(
            "{} error{} found",
            errors,
            if errors == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
