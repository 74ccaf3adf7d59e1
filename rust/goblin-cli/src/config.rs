//! Configuration file parsing for `config.toml`.
//!
//! The file lives in the Goblin home: `$GOBLIN_HOME` when set, otherwise
//! `~/.goblin`. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the Goblin home directory.
pub const GOBLIN_HOME_ENV: &str = "GOBLIN_HOME";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct GoblinConfig {
    /// Where snippets are saved; relative paths resolve under the Goblin home.
    pub snippets_dir: Option<PathBuf>,
    /// Readline history file; relative paths resolve under the Goblin home.
    pub history_file: Option<PathBuf>,
    /// Editor for `:edit`, ahead of `$EDITOR`.
    pub editor: Option<String>,
    /// Set to `false` to disable ANSI colors.
    pub color: Option<bool>,
    pub toolchain: ToolchainSection,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ToolchainSection {
    /// The `go` binary used by `:run`.
    pub go: String,
    /// The formatter used by `:tidy`.
    pub gofmt: String,
    /// Extra environment for `go run`, applied after `GOWORK=off`.
    pub env: BTreeMap<String, String>,
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            go: "go".to_string(),
            gofmt: "gofmt".to_string(),
            env: BTreeMap::new(),
        }
    }
}

impl GoblinConfig {
    /// Load `config.toml` from the Goblin home. Falls back to defaults when
    /// the file is missing or unreadable.
    pub fn load(home: &Path) -> Self {
        let path = config_path(home);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!("{err}; using default configuration");
            Self::default()
        })
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a TOML string directly.
    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Whether colored output is wanted, honoring `NO_COLOR`.
    pub fn color_enabled(&self) -> bool {
        self.color.unwrap_or(true) && !crate::colors::no_color_requested()
    }

    /// Editor for `:edit`: config, then `$EDITOR`, then `nano`.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .map(|editor| editor.trim().to_string())
            .filter(|editor| !editor.is_empty())
            .unwrap_or_else(|| "nano".to_string())
    }

    /// Generate a commented default `config.toml`.
    pub fn default_template() -> &'static str {
        r#"# Goblin Configuration

# Where :save and :load keep snippets (relative to the Goblin home)
# snippets_dir = "snippets"

# Readline history (relative to the Goblin home)
# history_file = "history"

# Editor used by :edit (defaults to $EDITOR, then nano)
# editor = "vim"

# color = true

[toolchain]
# go = "go"
# gofmt = "gofmt"

# Extra environment for `go run` (GOWORK=off is always set first)
# [toolchain.env]
# GOFLAGS = "-mod=mod"
"#
    }
}

/// Directories and files derived from the Goblin home and the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoblinPaths {
    pub home: PathBuf,
    pub snippets: PathBuf,
    pub history: PathBuf,
}

impl GoblinPaths {
    pub fn resolve(home: PathBuf, config: &GoblinConfig) -> Self {
        let under_home = |configured: &Option<PathBuf>, default: &str| match configured {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => home.join(path),
            None => home.join(default),
        };
        Self {
            snippets: under_home(&config.snippets_dir, "snippets"),
            history: under_home(&config.history_file, "history"),
            home,
        }
    }

    /// Create the home and snippets directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.home)?;
        std::fs::create_dir_all(&self.snippets)
    }
}

/// Resolve the Goblin home directory.
///
/// Rules:
/// - `GOBLIN_HOME` set to an absolute path: use as-is.
/// - `GOBLIN_HOME` set to `~/...` or a relative path: resolve under HOME.
/// - Otherwise: `${HOME}/.goblin`.
pub fn resolve_goblin_home(home: Option<&Path>, override_path: Option<&str>) -> Option<PathBuf> {
    let home_path = || home.map(Path::to_path_buf);

    if let Some(raw) = override_path
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        if raw == "~" {
            return home_path();
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return home_path().map(|path| path.join(rest));
        }

        let configured = PathBuf::from(raw);
        if configured.is_relative() {
            return home_path().map(|base| base.join(configured));
        }
        return Some(configured);
    }

    home_path().map(|path| path.join(".goblin"))
}

/// `config.toml` inside the Goblin home.
pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

/// The Goblin home for this process.
pub fn goblin_home() -> Option<PathBuf> {
    let home = dirs::home_dir();
    let override_path = std::env::var(GOBLIN_HOME_ENV).ok();
    resolve_goblin_home(home.as_deref(), override_path.as_deref())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
