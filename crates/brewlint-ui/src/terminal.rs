//! Terminal detection utilities.
//!
//! Provides functions to detect TTY status, terminal width and color support.

use std::env;

/// Fallback width when stdout is not a terminal.
const DEFAULT_WIDTH: usize = 80;

/// Returns `true` if stdout is connected to a terminal (TTY).
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Returns the terminal width in columns, defaulting to 80 if detection fails.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _rows)| cols as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Determines if ANSI color codes should be used.
///
/// Respects standard conventions:
/// - `NO_COLOR` (any value): disables color (<https://no-color.org/>)
/// - `CLICOLOR=0`: disables color
/// - `TERM=dumb`: disables color
/// - `CLICOLOR_FORCE` (any value): forces color even in non-TTY
/// - Falls back to TTY detection
pub fn supports_color() -> bool {
    color_from_env(
        env::var_os("NO_COLOR").is_some(),
        env::var("CLICOLOR").ok().as_deref(),
        env::var("TERM").ok().as_deref(),
        env::var_os("CLICOLOR_FORCE").is_some(),
        is_tty(),
    )
}

fn color_from_env(
    no_color: bool,
    clicolor: Option<&str>,
    term: Option<&str>,
    force: bool,
    tty: bool,
) -> bool {
    if no_color || clicolor == Some("0") || term == Some("dumb") {
        return false;
    }
    force || tty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_width_returns_positive() {
        // Even when not a TTY, we should get the default of 80.
        assert!(terminal_width() > 0);
    }

    #[test]
    fn no_color_wins_over_force() {
        assert!(!color_from_env(true, None, None, true, true));
        assert!(!color_from_env(false, Some("0"), None, true, true));
        assert!(!color_from_env(false, None, Some("dumb"), false, true));
    }

    #[test]
    fn force_enables_color_without_tty() {
        assert!(color_from_env(false, None, Some("xterm"), true, false));
        assert!(!color_from_env(false, Some("1"), None, false, false));
        assert!(color_from_env(false, None, None, false, true));
    }
}
