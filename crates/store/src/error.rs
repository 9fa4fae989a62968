// Error taxonomy for the outline store.
//
// Structural problems are `Rejection`s: the operation did nothing and the
// caller gets a "null" outcome. Storage problems are `PersistError`s and
// are the only hard failures.

use std::path::PathBuf;

use outline_common::types::NodeKind;
use thiserror::Error;

/// A recoverable, structural refusal. Nothing was written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("node `{0}` not found")]
    NotFound(String),

    #[error("parent `{0}` does not exist")]
    ParentMissing(String),

    #[error("type mismatch: expected parent {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("chapter `{path}` already exists")]
    DuplicateChapterIndex { path: String },

    #[error("chapter requires an integer `index`")]
    MissingChapterIndex,

    #[error("invalid node type: {0}")]
    InvalidType(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Rejection {
    pub(crate) fn type_mismatch(expected: Option<NodeKind>, found: Option<NodeKind>) -> Self {
        Self::TypeMismatch { expected: kind_label(expected), found: kind_label(found) }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "INVALID_PATH",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ParentMissing(_) => "PARENT_MISSING",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::DuplicateChapterIndex { .. } => "DUPLICATE_CHAPTER_INDEX",
            Self::MissingChapterIndex => "MISSING_CHAPTER_INDEX",
            Self::InvalidType(_) => "INVALID_TYPE",
            Self::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

fn kind_label(kind: Option<NodeKind>) -> String {
    kind.map(|k| k.as_str().to_string()).unwrap_or_else(|| "root".to_string())
}

/// Failure to read or write the backing document.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document changed underneath us: expected revision {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    #[error("nested source `{}` does not exist", .0.display())]
    MissingSource(PathBuf),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "PERSISTENCE_IO",
            Self::Json(_) => "PERSISTENCE_FORMAT",
            Self::Conflict { .. } => "PERSISTENCE_CONFLICT",
            Self::MissingSource(_) => "SOURCE_NOT_FOUND",
        }
    }
}

/// Outcome of a failed mutation.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl OutlineError {
    /// True for structural refusals, which callers treat as a null result.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            Self::Persist(_) => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Rejected(r) => r.code(),
            Self::Persist(p) => p.code(),
        }
    }
}
