//! `brewlint version` -- print the version and the descriptor dialect it
//! understands.

use anyhow::Result;
use brewlint_formula::parser::STANZAS;
use brewlint_formula::types::KNOWN_COMPILERS;
use serde::Serialize;

use crate::output::output_json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Blocks accepted inside a formula class besides the stanzas.
const BLOCKS: &[&str] = &["def install", "test do"];

#[derive(Serialize)]
struct VersionInfo {
    version: &'static str,
    stanzas: &'static [&'static str],
    blocks: &'static [&'static str],
    compilers: &'static [&'static str],
}

fn info() -> VersionInfo {
    VersionInfo {
        version: VERSION,
        stanzas: STANZAS,
        blocks: BLOCKS,
        compilers: KNOWN_COMPILERS,
    }
}

/// Execute the `brewlint version` command.
///
/// Runs before configuration is loaded, so only the `--json` flag applies.
pub fn run(json: bool) -> Result<()> {
    let info = info();
    if json {
        output_json(&info);
    } else {
        for line in render(&info) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn render(info: &VersionInfo) -> Vec<String> {
    vec![
        format!("brewlint {}", info.version),
        format!("stanzas:   {}", info.stanzas.join(", ")),
        format!("blocks:    {}", info.blocks.join(", ")),
        format!("compilers: ENV.cc, ENV.cxx, {}", info.compilers.join(", ")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_the_descriptor_dialect() {
        let lines = render(&info());
        assert_eq!(lines[0], format!("brewlint {}", VERSION));
        assert!(lines[1].contains("sha256"));
        assert!(lines[2].contains("test do"));
        assert!(lines[3].contains("clang"));
    }
}
