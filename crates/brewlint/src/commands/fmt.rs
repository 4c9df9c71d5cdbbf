//! `brewlint fmt` -- print or rewrite a descriptor in canonical form.
//!
//! JSON and TOML exports can be printed as descriptor text but not rewritten
//! in place. Files with comments are never rewritten, since canonical text
//! has none.

use anyhow::{Context, Result, bail};
use brewlint_formula::lexer::comment_lines;
use brewlint_formula::printer::print;

use crate::cli::FmtArgs;
use crate::commands::show::load_descriptor;
use crate::context::RuntimeContext;

/// Execute the `brewlint fmt` command.
pub fn run(ctx: &RuntimeContext, args: &FmtArgs) -> Result<()> {
    let loaded = load_descriptor(ctx, &args.formula)?;
    let canonical = print(&loaded.descriptor);
    let unchanged = loaded.is_formula_text() && loaded.text == canonical;

    if args.check {
        if !unchanged {
            bail!("{} is not canonically formatted", loaded.location);
        }
        if !ctx.quiet {
            println!("{} is canonically formatted", loaded.location);
        }
        return Ok(());
    }

    if args.write {
        if !loaded.is_formula_text() {
            bail!(
                "--write only rewrites descriptor text; {} is an export",
                loaded.location
            );
        }
        if unchanged {
            if !ctx.quiet {
                println!("{} unchanged", loaded.location);
            }
            return Ok(());
        }
        let comments = comment_lines(&loaded.text)?;
        if let Some(first) = comments.first() {
            bail!(
                "{} has comments (line {}) that canonical form would drop; not rewriting",
                loaded.location,
                first
            );
        }
        std::fs::write(&loaded.path, &canonical)
            .with_context(|| format!("failed to write {}", loaded.path.display()))?;
        if !ctx.quiet {
            println!("formatted {}", loaded.location);
        }
        return Ok(());
    }

    print!("{}", canonical);
    Ok(())
}
