//! ANSI color helpers for REPL output.
//!
//! Colors are on unless `NO_COLOR` is set or the config turns them off.

use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn coloring on or off for the rest of the process.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether `NO_COLOR` asks for plain output.
pub fn no_color_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

fn paint(code: &str, s: &str) -> String {
    if ENABLED.load(Ordering::Relaxed) {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    } else {
        s.to_string()
    }
}

/// Errors and failed statuses.
pub fn error(s: &str) -> String {
    paint("31", s)
}

/// Completed actions.
pub fn success(s: &str) -> String {
    paint("32", s)
}

/// Notices, usage hints and section rules.
pub fn info(s: &str) -> String {
    paint("33", s)
}

/// Output of the user's program.
pub fn output(s: &str) -> String {
    paint("36", s)
}

/// The active snippet name in the prompt.
pub fn snippet(s: &str) -> String {
    paint("35", s)
}

pub fn bold(s: &str) -> String {
    paint("1", s)
}

pub fn gray(s: &str) -> String {
    paint("90", s)
}
