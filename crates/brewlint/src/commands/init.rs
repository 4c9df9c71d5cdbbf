//! `brewlint init` -- turn the current directory into a tap.

use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use brewlint_config::{BrewlintConfig, CONFIG_FILE_NAME, save_config};

use crate::cli::InitArgs;

/// Execute the `brewlint init` command.
///
/// Runs without a loaded configuration so that `--force` can replace a
/// broken `.brewlint.yaml`.
pub fn run(args: &InitArgs, quiet: bool) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let config_path = cwd.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        bail!(
            "{} already exists\n\nUse --force to overwrite it.",
            config_path.display()
        );
    }

    let formula_dir = cwd.join("Formula");
    fs::create_dir_all(&formula_dir)
        .with_context(|| format!("failed to create directory: {}", formula_dir.display()))?;

    let config = BrewlintConfig {
        require_license: args.require_license,
        ..BrewlintConfig::default()
    };
    save_config(&cwd, &config)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    if !quiet {
        println!("wrote {}", CONFIG_FILE_NAME);
        println!("add descriptors under Formula/ and run `brewlint check`");
    }
    Ok(())
}
