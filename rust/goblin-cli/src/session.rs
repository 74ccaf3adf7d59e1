//! Per-REPL session state: the buffer plus the active snippet it is tied to.

use crate::store::{
    ensure_go_extension, file_name_of, snippet_stem, timestamped_name, SnippetStore, StoreError,
};
use chrono::Local;
use goblin_core::{program_source, Buffer};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no code in buffer to {0}")]
    EmptyBuffer(&'static str),

    #[error("no snippet is currently loaded or saved to rename. Use :save first")]
    NoActiveSnippet,

    #[error("cannot determine the home directory for export")]
    NoHomeDir,

    #[error("failed to export to '{}': {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How `:save` picked its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// Given on the command line.
    Named,
    /// The active snippet.
    Current,
    /// A fresh `snippet_<timestamp>.go`.
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub path: PathBuf,
    pub target: SaveTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub path: PathBuf,
    /// No path was given and the home directory was used.
    pub defaulted: bool,
}

#[derive(Debug)]
pub struct Session {
    buffer: Buffer,
    store: SnippetStore,
    /// Active snippet name without `.go`.
    snippet: Option<String>,
    /// Store path of the active snippet.
    active_path: Option<PathBuf>,
}

impl Session {
    pub fn new(store: SnippetStore) -> Self {
        Self {
            buffer: Buffer::new(),
            store,
            snippet: None,
            active_path: None,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    pub fn snippet_name(&self) -> Option<&str> {
        self.snippet.as_deref()
    }

    /// `:save [name]`. Falls back to the active snippet, then a timestamped
    /// name. Writes even an empty buffer.
    pub fn save(&mut self, name: Option<&str>) -> Result<Saved, SessionError> {
        let (file_name, target) = match (name, self.snippet.as_deref()) {
            (Some(name), _) => (ensure_go_extension(name.trim()), SaveTarget::Named),
            (None, Some(current)) => (ensure_go_extension(current), SaveTarget::Current),
            (None, None) => (timestamped_name(Local::now()), SaveTarget::Generated),
        };
        let path = self.store.save(&file_name, &self.buffer.text())?;
        self.activate(&path);
        self.buffer.mark_clean();
        Ok(Saved { path, target })
    }

    /// `:saveas <name>`: save to a new file and make it the active snippet.
    pub fn save_as(&mut self, name: &str) -> Result<PathBuf, SessionError> {
        if self.buffer.is_empty() {
            return Err(SessionError::EmptyBuffer("save"));
        }
        let path = self.store.create(name, &self.buffer.text())?;
        self.activate(&path);
        self.buffer.mark_clean();
        Ok(path)
    }

    /// `:load <name>`: replace the buffer and activate the snippet.
    pub fn load(&mut self, name: &str) -> Result<PathBuf, SessionError> {
        let (path, lines) = self.store.load(name)?;
        self.buffer.load(lines);
        self.activate(&path);
        Ok(path)
    }

    /// `:rename <name>`: move the active snippet's file.
    pub fn rename(&mut self, name: &str) -> Result<PathBuf, SessionError> {
        let from = self
            .active_path
            .clone()
            .ok_or(SessionError::NoActiveSnippet)?;
        let path = self.store.rename(&from, name)?;
        self.activate(&path);
        Ok(path)
    }

    /// `:clear`: empty buffer, no active snippet.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.snippet = None;
        self.active_path = None;
    }

    /// `:export [path]`: write the assembled run program. Without a path the
    /// file goes to `home` named after the active snippet or a timestamp.
    pub fn export(&self, path: Option<&str>, home: Option<&Path>) -> Result<Exported, SessionError> {
        if self.buffer.is_empty() {
            return Err(SessionError::EmptyBuffer("export"));
        }

        let (path, defaulted) = match path {
            Some(path) => (PathBuf::from(ensure_go_extension(path.trim())), false),
            None => {
                let home = home.ok_or(SessionError::NoHomeDir)?;
                let file_name = match self.snippet.as_deref() {
                    Some(current) => ensure_go_extension(current),
                    None => timestamped_name(Local::now()),
                };
                (home.join(file_name), true)
            }
        };

        write_program(&path, &program_source(self.buffer.lines()))?;
        Ok(Exported { path, defaulted })
    }

    /// Prompt for the next line: `%4d> ` while an insert is pending, ` -> `
    /// right after code input, otherwise `go> ` tagged with the snippet.
    pub fn prompt(&self, after_code: bool) -> String {
        if let Some(line) = self.buffer.pending_insert() {
            return format!("{line:4}> ");
        }
        if after_code {
            return " -> ".to_string();
        }
        match self.snippet.as_deref() {
            Some(name) => {
                let dirty = if self.buffer.is_dirty() { "*" } else { "" };
                format!("[{}{}]go> ", crate::colors::snippet(name), dirty)
            }
            None => "go> ".to_string(),
        }
    }

    fn activate(&mut self, path: &Path) {
        let file_name = file_name_of(path);
        self.snippet = Some(snippet_stem(&file_name).to_string());
        self.active_path = Some(path.to_path_buf());
        debug!(snippet = ?self.snippet, "active snippet changed");
    }
}

/// Write an assembled program, creating parent directories.
pub fn write_program(path: &Path, source: &str) -> Result<(), SessionError> {
    let export_err = |source| SessionError::Export {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(export_err)?;
    }
    std::fs::write(path, source).map_err(export_err)
}
