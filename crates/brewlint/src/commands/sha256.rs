//! `brewlint sha256` -- digest a source file for a descriptor's `sha256`.

use anyhow::{Context, Result, bail};
use brewlint_formula::checksum::{Verification, sha256_file, verify_file};
use serde_json::json;

use crate::cli::Sha256Args;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `brewlint sha256` command.
pub fn run(ctx: &RuntimeContext, args: &Sha256Args) -> Result<()> {
    let file = ctx.display_path(&ctx.cwd.join(&args.file));

    let Some(expected) = &args.expect else {
        let digest = sha256_file(&args.file)
            .with_context(|| format!("failed to digest {}", args.file.display()))?;
        if ctx.json {
            output_json(&json!({ "file": file, "sha256": digest }));
        } else {
            println!("{}  {}", digest, file);
        }
        return Ok(());
    };

    match verify_file(&args.file, expected)
        .with_context(|| format!("failed to verify {}", args.file.display()))?
    {
        Verification::Match(digest) => {
            if ctx.json {
                output_json(&json!({ "file": file, "sha256": digest, "matches": true }));
            } else if !ctx.quiet {
                println!("{}  {}: OK", digest, file);
            }
            Ok(())
        }
        Verification::Mismatch { expected, actual } => {
            if ctx.json {
                output_json(&json!({
                    "file": file,
                    "sha256": actual,
                    "expected": expected,
                    "matches": false,
                }));
            }
            bail!(
                "checksum mismatch for {}: expected {}, got {}",
                file,
                expected,
                actual
            );
        }
    }
}
