// outline-store: whole-document persistence and the path-addressed node store.

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod input;
pub mod outline;

pub use backend::{DocumentBackend, JsonFileBackend, MemoryBackend};
pub use document::OutlineDocument;
pub use error::{OutlineError, PersistError, Rejection};
pub use input::{NewNode, NodePatch};
pub use outline::{MigrationReport, Outline, DEFAULT_WINDOW_SIZE};
