//! Seams to the external Go toolchain: running and formatting programs.

use crate::assemble::program_source;

/// Error returned when the canonical formatter rejects or cannot format a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The formatter ran and reported a syntax error. Kept verbatim.
    #[error("{0}")]
    Syntax(String),

    #[error("formatter `{program}` unavailable: {reason}")]
    Unavailable { program: String, reason: String },
}

/// Error returned when the toolchain could not run the program at all.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("failed to prepare build directory: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a program the toolchain managed to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Combined stdout and stderr, compiler diagnostics included.
    pub output: String,
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl Execution {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Canonical source formatter (`gofmt`).
pub trait SourceFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

impl<F> SourceFormatter for F
where
    F: Fn(&str) -> Result<String, FormatError>,
{
    fn format(&self, source: &str) -> Result<String, FormatError> {
        self(source)
    }
}

/// Compiles and runs a complete program (`go run`).
pub trait Toolchain {
    fn run(&self, source: &str, args: &[String]) -> Result<Execution, ToolchainError>;
}

/// Assemble `lines` into a program and run it with `args`.
pub fn run_lines<S, T>(lines: &[S], toolchain: &T, args: &[String]) -> Result<Execution, ToolchainError>
where
    S: AsRef<str>,
    T: Toolchain + ?Sized,
{
    toolchain.run(&program_source(lines), args)
}
