// Configuration files for the outline store.
//
// Global config: `~/.outline/config.toml`
// Project config: `<project>/.outline/outline.toml` (overrides global)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backend::JsonFileBackend;
use crate::outline::DEFAULT_WINDOW_SIZE;

/// Default document file name, relative to the project root.
pub const DEFAULT_DOCUMENT_FILE: &str = "outline.json";

/// Root directory for global state: `~/.outline/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".outline"))
}

/// Path to the global config file: `~/.outline/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

/// Path to the project config file: `<root>/.outline/outline.toml`.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".outline").join("outline.toml")
}

/// Store configuration. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineConfig {
    /// Outline document, relative paths resolve against the project root.
    pub document_path: PathBuf,
    /// Nested outline used by `migrate` when no source is given.
    pub nested_source_path: Option<PathBuf>,
    /// Neighbours on each side for chapter windows.
    pub window_size: usize,
    /// Pretty-print the document on save.
    pub pretty: bool,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from(DEFAULT_DOCUMENT_FILE),
            nested_source_path: None,
            window_size: DEFAULT_WINDOW_SIZE,
            pretty: true,
            log_filter: None,
        }
    }
}

impl OutlineConfig {
    /// Project config if present, else global config, else defaults.
    pub fn load(project_root: &Path) -> Self {
        Self::load_from(&project_config_path(project_root))
            .ok()
            .or_else(|| global_config_path().and_then(|p| Self::load_from(&p).ok()))
            .unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save to `<root>/.outline/outline.toml`.
    pub fn save(&self, project_root: &Path) -> Result<(), ConfigError> {
        self.save_to(&project_config_path(project_root))
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Absolute document path for a project rooted at `project_root`.
    pub fn resolve_document_path(&self, project_root: &Path) -> PathBuf {
        resolve_against(project_root, &self.document_path)
    }

    pub fn resolve_nested_source(&self, project_root: &Path) -> Option<PathBuf> {
        self.nested_source_path.as_deref().map(|p| resolve_against(project_root, p))
    }

    /// File backend for `document`, written the way this config asks.
    pub fn backend(&self, document: impl Into<PathBuf>) -> JsonFileBackend {
        let backend = JsonFileBackend::new(document);
        if self.pretty {
            backend
        } else {
            backend.compact()
        }
    }
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(std::io::Error),
    #[error("config parse error: {0}")]
    Parse(toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(toml::ser::Error),
}
