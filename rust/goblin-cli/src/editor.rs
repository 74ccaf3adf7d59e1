//! `:edit`: round-trip the buffer through an external editor.

use crate::store::text_to_lines;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("failed to prepare temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("invalid editor command '{0}'")]
    InvalidCommand(String),

    #[error("error opening editor '{editor}': {source}")]
    Launch {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("editor '{editor}' exited with {status}")]
    Failed {
        editor: String,
        status: std::process::ExitStatus,
    },
}

/// Open `lines` in `editor` through a temporary `.go` file and return the
/// edited lines. `editor` may carry arguments, e.g. `code --wait`.
pub fn edit_lines(editor: &str, lines: &[String]) -> Result<Vec<String>, EditorError> {
    let mut file = tempfile::Builder::new()
        .prefix("goblin-")
        .suffix(".go")
        .tempfile()
        .map_err(EditorError::TempFile)?;
    file.write_all(lines.join("\n").as_bytes())
        .map_err(EditorError::TempFile)?;
    file.flush().map_err(EditorError::TempFile)?;

    launch(editor, file.path())?;

    let edited = std::fs::read_to_string(file.path()).map_err(EditorError::TempFile)?;
    Ok(text_to_lines(&edited))
}

fn launch(editor: &str, path: &Path) -> Result<(), EditorError> {
    let argv = shell_words::split(editor)
        .map_err(|_| EditorError::InvalidCommand(editor.to_string()))?;
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| EditorError::InvalidCommand(editor.to_string()))?;

    debug!(%program, path = %path.display(), "launching editor");
    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .map_err(|source| EditorError::Launch {
            editor: editor.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(EditorError::Failed {
            editor: editor.to_string(),
            status,
        });
    }
    Ok(())
}
