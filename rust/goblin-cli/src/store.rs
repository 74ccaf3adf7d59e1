//! Snippet persistence: `<name>.go` files under the snippets directory.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSION: &str = ".go";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid snippet name '{0}'")]
    InvalidName(String),

    #[error("a snippet named '{0}' already exists. Choose a different name")]
    AlreadyExists(String),

    #[error("snippet '{0}' not found")]
    NotFound(String),

    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A saved snippet as shown by `:list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetEntry {
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct SnippetStore {
    dir: PathBuf,
}

impl SnippetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of snippet `name`, `.go` appended when missing.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed == EXTENSION
            || trimmed.contains(['/', '\\'])
            || trimmed.starts_with("..")
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(ensure_go_extension(trimmed)))
    }

    /// Saved snippets sorted by file name. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<SnippetEntry>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.dir).map_err(|source| self.io("read", &self.dir, source))?;

        let mut snippets = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| self.io("read", &self.dir, source))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.ends_with(EXTENSION) {
                continue;
            }
            let metadata = entry
                .metadata()
                .map_err(|source| self.io("stat", &entry.path(), source))?;
            if metadata.is_file() {
                snippets.push(SnippetEntry {
                    file_name,
                    size: metadata.len(),
                });
            }
        }
        snippets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(snippets)
    }

    /// Write `text` to snippet `name`, replacing any existing file.
    pub fn save(&self, name: &str, text: &str) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir).map_err(|source| self.io("create", &self.dir, source))?;
        fs::write(&path, text).map_err(|source| self.io("write", &path, source))?;
        debug!(path = %path.display(), bytes = text.len(), "snippet saved");
        Ok(path)
    }

    /// Like `save`, but refuses to overwrite.
    pub fn create(&self, name: &str, text: &str) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name)?;
        if path.exists() {
            return Err(StoreError::AlreadyExists(file_name_of(&path)));
        }
        self.save(name, text)
    }

    /// Read snippet `name` as buffer lines. One trailing newline is dropped
    /// and an empty file gives an empty buffer.
    pub fn load(&self, name: &str) -> Result<(PathBuf, Vec<String>), StoreError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StoreError::NotFound(file_name_of(&path)));
        }
        let text = fs::read_to_string(&path).map_err(|source| self.io("read", &path, source))?;
        Ok((path, text_to_lines(&text)))
    }

    /// Move the snippet at `from` to `to_name` inside the store.
    pub fn rename(&self, from: &Path, to_name: &str) -> Result<PathBuf, StoreError> {
        let target = self.path_for(to_name)?;
        if target.exists() {
            return Err(StoreError::AlreadyExists(file_name_of(&target)));
        }
        fs::rename(from, &target).map_err(|source| self.io("rename", from, source))?;
        debug!(from = %from.display(), to = %target.display(), "snippet renamed");
        Ok(target)
    }

    fn io(&self, action: &'static str, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Split file content into buffer lines.
pub fn text_to_lines(text: &str) -> Vec<String> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(str::to_string).collect()
}

pub fn ensure_go_extension(name: &str) -> String {
    if name.ends_with(EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{EXTENSION}")
    }
}

/// Snippet name without its `.go` suffix.
pub fn snippet_stem(file_name: &str) -> &str {
    file_name.strip_suffix(EXTENSION).unwrap_or(file_name)
}

/// `snippet_YYYYMMDD_HHMMSS.go` for unnamed saves and exports.
pub fn timestamped_name(now: DateTime<Local>) -> String {
    format!("snippet_{}{EXTENSION}", now.format("%Y%m%d_%H%M%S"))
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
