//! Non-interactive subcommands working on snippet files.

use crate::config::{config_path, GoblinConfig};
use crate::session::{write_program, SessionError};
use crate::store::text_to_lines;
use goblin_core::{
    program_source, run_lines, tidy, Execution, FormatError, SourceFormatter, Toolchain,
    ToolchainError,
};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' already exists, not overwriting", .0.display())]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    Export(#[from] SessionError),
}

/// Result of `goblin tidy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TidyOutcome {
    Unchanged,
    Rewritten,
    /// `--check` found a file that would change.
    WouldChange,
}

fn read_lines(path: &Path) -> Result<Vec<String>, CommandError> {
    let text = std::fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text_to_lines(&text))
}

/// Assemble a snippet file and run it.
pub fn run_file<T: Toolchain + ?Sized>(
    path: &Path,
    toolchain: &T,
    args: &[String],
) -> Result<Execution, CommandError> {
    let lines = read_lines(path)?;
    debug!(path = %path.display(), lines = lines.len(), "running snippet file");
    Ok(run_lines(&lines, toolchain, args)?)
}

/// Reformat a snippet file in place, or only report with `check`.
pub fn tidy_file<F: SourceFormatter + ?Sized>(
    path: &Path,
    formatter: &F,
    check: bool,
) -> Result<TidyOutcome, CommandError> {
    let lines = read_lines(path)?;
    let tidied = tidy(&lines, formatter)?;
    if tidied == lines {
        return Ok(TidyOutcome::Unchanged);
    }
    if check {
        return Ok(TidyOutcome::WouldChange);
    }

    let mut text = tidied.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    std::fs::write(path, text).map_err(|source| CommandError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(TidyOutcome::Rewritten)
}

/// Assemble a snippet file into a complete program, written to `output`
/// when given. Returns the program text.
pub fn export_file(path: &Path, output: Option<&Path>) -> Result<String, CommandError> {
    let source = program_source(&read_lines(path)?);
    if let Some(output) = output {
        write_program(output, &source)?;
    }
    Ok(source)
}

/// Write the commented default `config.toml` into the Goblin home.
pub fn init_config(home: &Path) -> Result<PathBuf, CommandError> {
    let path = config_path(home);
    if path.exists() {
        return Err(CommandError::AlreadyExists(path));
    }
    std::fs::create_dir_all(home)
        .and_then(|()| std::fs::write(&path, GoblinConfig::default_template()))
        .map_err(|source| CommandError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
