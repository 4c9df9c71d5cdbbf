//! `brewlint duplicates` -- report packages with conflicting descriptors.
//!
//! Runs only the duplicate detector: descriptors that fail validation still
//! count, since a conflict is a property of the tap rather than of one file.

use anyhow::{Result, bail};
use brewlint_formula::Diagnostic;
use brewlint_formula::batch::conflicts_in;
use brewlint_ui::styles::{render_diagnostic, render_pass_icon, render_warn_icon};

use crate::cli::DuplicatesArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_lines};

/// Execute the `brewlint duplicates` command.
pub fn run(ctx: &RuntimeContext, args: &DuplicatesArgs) -> Result<()> {
    let sources = ctx.collect_sources(&args.paths)?;
    let conflicts = conflicts_in(&sources);
    let diagnostics: Vec<Diagnostic> = conflicts.iter().map(|c| c.to_diagnostic(None)).collect();

    if ctx.json {
        output_json(&diagnostics);
    } else if diagnostics.is_empty() {
        if !ctx.quiet {
            println!(
                "{} no conflicting descriptors in {} file{}",
                render_pass_icon(),
                sources.len(),
                if sources.len() == 1 { "" } else { "s" }
            );
        }
    } else {
        output_lines(
            diagnostics
                .iter()
                .map(|d| format!("{} {}", render_warn_icon(), render_diagnostic(d))),
        );
    }

    if !conflicts.is_empty() {
        bail!("{} conflicting package name(s)", conflicts.len());
    }
    Ok(())
}
