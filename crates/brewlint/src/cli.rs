//! Clap CLI definitions for the `brewlint` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// brewlint -- Validate Homebrew tap formula descriptors.
///
/// Checks every descriptor in a tap for missing fields, malformed checksums,
/// versions and URLs, inconsistent install steps, and conflicting
/// descriptors that share a package name.
#[derive(Parser, Debug)]
#[command(
    name = "brewlint",
    about = "Validate Homebrew tap formula descriptors",
    long_about = "Checks every descriptor in a tap for missing fields, malformed checksums, versions and URLs, inconsistent install steps, and conflicting descriptors that share a package name.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: .brewlint.yaml at the tap root).
    #[arg(long, global = true, env = "BREWLINT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate descriptors and report every error found.
    #[command(alias = "lint")]
    Check(CheckArgs),

    /// Report packages declared by more than one conflicting descriptor.
    Duplicates(DuplicatesArgs),

    /// Print a validated descriptor.
    Show(ShowArgs),

    /// Print or rewrite a descriptor in canonical form.
    Fmt(FmtArgs),

    /// Compute the SHA-256 checksum of a source file.
    Sha256(Sha256Args),

    /// Create a tap skeleton with a `.brewlint.yaml` in the current directory.
    Init(InitArgs),

    /// Generate shell completion scripts.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

/// Arguments for `brewlint check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Descriptor files or directories (default: the whole tap).
    pub paths: Vec<PathBuf>,

    /// Also require a `license` stanza.
    #[arg(long)]
    pub require_license: bool,
}

/// Arguments for `brewlint duplicates`.
#[derive(Args, Debug)]
pub struct DuplicatesArgs {
    /// Descriptor files or directories (default: the whole tap).
    pub paths: Vec<PathBuf>,
}

/// Output format for `brewlint show`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowFormat {
    /// Canonical descriptor text.
    #[default]
    Dsl,
    Json,
    Toml,
}

/// Arguments for `brewlint show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Package name or path to a descriptor file.
    pub formula: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ShowFormat::Dsl)]
    pub format: ShowFormat,
}

/// Arguments for `brewlint fmt`.
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Package name or path to a descriptor file (`.rb`, `.json` or `.toml`).
    pub formula: String,

    /// Rewrite the `.rb` file in place instead of printing.
    #[arg(long, conflicts_with = "check")]
    pub write: bool,

    /// Exit with an error if the file is not already canonical.
    #[arg(long)]
    pub check: bool,
}

/// Arguments for `brewlint sha256`.
#[derive(Args, Debug)]
pub struct Sha256Args {
    /// File to digest.
    pub file: PathBuf,

    /// Expected checksum; exit with an error on mismatch.
    #[arg(long)]
    pub expect: Option<String>,
}

/// Arguments for `brewlint init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing `.brewlint.yaml`.
    #[arg(long)]
    pub force: bool,

    /// Require a `license` stanza in every descriptor.
    #[arg(long)]
    pub require_license: bool,
}

/// Arguments for `brewlint completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["brewlint", "check", "Formula", "--json", "-q"]).unwrap();
        assert!(cli.global.json);
        assert!(cli.global.quiet);
        match cli.command {
            Some(Commands::Check(args)) => assert_eq!(args.paths, vec![PathBuf::from("Formula")]),
            other => panic!("expected check, got {:?}", other),
        }
    }

    #[test]
    fn show_format_defaults_to_dsl() {
        let cli = Cli::try_parse_from(["brewlint", "show", "dote"]).unwrap();
        match cli.command {
            Some(Commands::Show(args)) => assert_eq!(args.format, ShowFormat::Dsl),
            other => panic!("expected show, got {:?}", other),
        }
    }

    #[test]
    fn init_flags() {
        let cli = Cli::try_parse_from(["brewlint", "init", "--force"]).unwrap();
        match cli.command {
            Some(Commands::Init(args)) => {
                assert!(args.force);
                assert!(!args.require_license);
            }
            other => panic!("expected init, got {:?}", other),
        }
    }

    #[test]
    fn fmt_write_and_check_conflict() {
        assert!(Cli::try_parse_from(["brewlint", "fmt", "dote", "--write", "--check"]).is_err());
    }
}
