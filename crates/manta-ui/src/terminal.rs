//! Terminal detection for colored reports.

use std::env;

/// Returns `true` if stdout is connected to a terminal (TTY).
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Determines if ANSI color codes should be used for stdout.
///
/// Honors `NO_COLOR`, `CLICOLOR=0`, `TERM=dumb` and `CLICOLOR_FORCE`, then
/// falls back to TTY detection.
pub fn supports_color() -> bool {
    color_enabled(|key| env::var(key).ok(), is_tty())
}

/// Color decision from an environment lookup and the TTY state.
fn color_enabled(var: impl Fn(&str) -> Option<String>, tty: bool) -> bool {
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CLICOLOR").as_deref() == Some("0") || var("TERM").as_deref() == Some("dumb") {
        return false;
    }
    var("CLICOLOR_FORCE").is_some() || tty
}
