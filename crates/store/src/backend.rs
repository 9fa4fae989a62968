// Document backends: read-all / write-all persistence for the outline document.
//
// A backend never hands out partial views. `save` checks the stored revision
// and writes under one exclusive lock, so two writers working from the same
// snapshot cannot silently overwrite each other.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use fs2::FileExt;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::document::OutlineDocument;
use crate::error::PersistError;

/// Whole-document storage.
pub trait DocumentBackend: Send + Sync {
    /// Load the full document. A missing document is an empty one.
    fn load(&self) -> impl Future<Output = Result<OutlineDocument, PersistError>> + Send;

    /// Replace the stored document with `document`.
    ///
    /// Fails with [`PersistError::Conflict`] when the stored revision is not
    /// `expected_revision`, i.e. someone else saved since it was loaded.
    fn save(
        &self,
        document: &OutlineDocument,
        expected_revision: u64,
    ) -> impl Future<Output = Result<(), PersistError>> + Send;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

#[derive(Deserialize)]
struct RevisionOnly {
    #[serde(default)]
    revision: u64,
}

fn stored_revision(content: &str) -> Result<u64, PersistError> {
    let partial: RevisionOnly = serde_json::from_str(content)?;
    Ok(partial.revision)
}

fn check_revision(found: u64, expected: u64) -> Result<(), PersistError> {
    if found == expected {
        Ok(())
    } else {
        Err(PersistError::Conflict { expected, found })
    }
}

// ── JSON file ──────────────────────────────────────────────────────

/// Stores the document as a single JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), pretty: true }
    }

    /// Write compact JSON instead of pretty-printed JSON.
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_existing(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(PersistError::io(&self.path, error)),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "outline.json".to_string())
    }

    /// Sidecar file whose exclusive lock covers check-then-write.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_file_name(format!(".{}.lock", self.file_name()))
    }

    /// Block (off the runtime) until this process holds the document lock.
    /// The lock is released when the returned file is dropped.
    async fn acquire_lock(&self) -> Result<std::fs::File, PersistError> {
        let lock_path = self.lock_path();
        let acquired = tokio::task::spawn_blocking(move || {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)
                .map_err(|e| PersistError::io(&lock_path, e))?;
            file.lock_exclusive().map_err(|e| PersistError::io(&lock_path, e))?;
            Ok(file)
        })
        .await;
        match acquired {
            Ok(result) => result,
            Err(join) => Err(PersistError::io(self.lock_path(), std::io::Error::other(join))),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let name = self.file_name();
        self.path.with_file_name(format!(".{name}.tmp.{}.{nonce}", std::process::id()))
    }
}

impl DocumentBackend for JsonFileBackend {
    async fn load(&self) -> Result<OutlineDocument, PersistError> {
        match self.read_existing().await? {
            Some(content) if !content.trim().is_empty() => {
                let document: OutlineDocument = serde_json::from_str(&content)?;
                debug!(path = %self.path.display(), revision = document.revision, nodes = document.len(), "outline loaded");
                Ok(document)
            }
            _ => {
                debug!(path = %self.path.display(), "outline file missing, starting empty");
                Ok(OutlineDocument::new())
            }
        }
    }

    async fn save(
        &self,
        document: &OutlineDocument,
        expected_revision: u64,
    ) -> Result<(), PersistError> {
        let content = if self.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| PersistError::io(parent, e))?;
        }

        // Held from the revision re-read through the rename.
        let _lock = self.acquire_lock().await?;

        let found = match self.read_existing().await? {
            Some(stored) if !stored.trim().is_empty() => stored_revision(&stored)?,
            _ => 0,
        };
        check_revision(found, expected_revision)?;

        let tmp_path = self.temp_path();
        fs::write(&tmp_path, content).await.map_err(|e| PersistError::io(&tmp_path, e))?;
        if let Err(error) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(PersistError::io(&self.path, error));
        }

        debug!(path = %self.path.display(), revision = document.revision, nodes = document.len(), "outline saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ── In-memory ──────────────────────────────────────────────────────

/// Keeps the serialized document in memory. Clones share the same buffer,
/// so several stores can be pointed at one "file".
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    content: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON, if anything was saved.
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.content.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentBackend for MemoryBackend {
    async fn load(&self) -> Result<OutlineDocument, PersistError> {
        let content = self.lock().clone();
        match content {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Ok(OutlineDocument::new()),
        }
    }

    async fn save(
        &self,
        document: &OutlineDocument,
        expected_revision: u64,
    ) -> Result<(), PersistError> {
        let serialized = serde_json::to_string_pretty(document)?;
        let mut slot = self.lock();
        let found = match slot.as_deref() {
            Some(content) => stored_revision(content)?,
            None => 0,
        };
        check_revision(found, expected_revision)?;
        *slot = Some(serialized);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
