//! `brewlint` -- validator for Homebrew tap formula descriptors.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GlobalArgs};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    if let Err(e) = dispatch(cli.command, &cli.global) {
        // For JSON mode, output error as JSON
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn dispatch(command: Option<Commands>, global: &GlobalArgs) -> Result<()> {
    let Some(command) = command else {
        // No subcommand -- print help
        use clap::CommandFactory;
        Cli::command().print_help().ok();
        println!();
        return Ok(());
    };

    match command {
        // These need no tap or loaded configuration.
        Commands::Version => commands::version::run(global.json),
        Commands::Completion(args) => commands::completion::run(&args),
        Commands::Init(args) => commands::init::run(&args, global.quiet),

        Commands::Check(args) => commands::check::run(&context(global)?, &args),
        Commands::Duplicates(args) => commands::duplicates::run(&context(global)?, &args),
        Commands::Show(args) => commands::show::run(&context(global)?, &args),
        Commands::Fmt(args) => commands::fmt::run(&context(global)?, &args),
        Commands::Sha256(args) => commands::sha256::run(&context(global)?, &args),
    }
}

fn context(global: &GlobalArgs) -> Result<RuntimeContext> {
    RuntimeContext::from_global_args(global)
}

/// Debug logging for brewlint crates under `--verbose`; otherwise `RUST_LOG`
/// when set. Logs go to stderr so JSON on stdout stays clean.
fn init_logging(global: &GlobalArgs) {
    let filter = if global.verbose {
        EnvFilter::new("brewlint=debug")
    } else if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
