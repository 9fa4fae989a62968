// Path-addressed outline store: node CRUD over a whole-document backend.
//
// Every public operation loads the full document, works on it in memory and,
// for mutations, saves the full document before returning.

mod migrate;
mod query;

pub use migrate::MigrationReport;

use outline_common::path::{grammar, Reference};
use outline_common::types::{ChapterEntry, Entry, Node, NodeKind, PathedNode};
use tracing::{debug, info, warn};

use crate::backend::DocumentBackend;
use crate::document::OutlineDocument;
use crate::error::{OutlineError, PersistError, Rejection};
use crate::input::{NewNode, NodePatch};

/// Default number of neighbours on each side returned by a chapter window.
pub const DEFAULT_WINDOW_SIZE: usize = 2;

/// The outline store. Owns its backend and the last loaded document.
///
/// Operations take `&mut self`, so a single store never interleaves its own
/// writes. Separate stores sharing one backend are guarded by the revision
/// check in [`DocumentBackend::save`].
#[derive(Debug)]
pub struct Outline<B> {
    backend: B,
    document: OutlineDocument,
}

impl<B: DocumentBackend> Outline<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, document: OutlineDocument::new() }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Snapshot from the most recent operation.
    pub fn document(&self) -> &OutlineDocument {
        &self.document
    }

    async fn load(&mut self) -> Result<(), PersistError> {
        self.document = self.backend.load().await?;
        Ok(())
    }

    async fn persist(&mut self) -> Result<(), PersistError> {
        let expected = self.document.revision;
        self.document.revision = expected + 1;
        if let Err(error) = self.backend.save(&self.document, expected).await {
            self.document.revision = expected;
            warn!(backend = %self.backend.describe(), %error, "failed to save outline");
            return Err(error);
        }
        Ok(())
    }

    // ── Resolution ────────────────────────────────────────────────

    /// Resolve a chapter reference (`"51"`, `"c51"` or a chapter path) to
    /// the chapter's canonical path.
    pub async fn resolve_reference(&mut self, reference: &str) -> Result<Option<String>, PersistError> {
        self.load().await?;
        Ok(resolve_chapter(&self.document, &Reference::parse(reference)))
    }

    // ── CRUD ──────────────────────────────────────────────────────

    /// Fetch a node by path, global chapter index or `c`-prefixed index.
    pub async fn get_node(&mut self, reference: &str) -> Result<Option<PathedNode>, PersistError> {
        self.load().await?;
        match locate(&self.document, reference) {
            Ok((path, _)) => Ok(self.document.get(&path).map(|node| PathedNode::new(path, node))),
            Err(rejection) => {
                debug!(reference, %rejection, "node lookup failed");
                Ok(None)
            }
        }
    }

    /// Create a node under `parent` and return its path.
    pub async fn add_node(&mut self, parent: &str, input: NewNode) -> Result<String, OutlineError> {
        self.load().await?;
        let result = self.insert_new(parent, input).await;
        log_rejection("add_node", parent, &result);
        result
    }

    async fn insert_new(&mut self, parent: &str, input: NewNode) -> Result<String, OutlineError> {
        let (parent_path, parent_kind) = if grammar::is_root(parent) {
            (grammar::ROOT.to_string(), None)
        } else {
            match locate(&self.document, parent) {
                Ok((path, kind)) => (path, Some(kind)),
                Err(Rejection::NotFound(_)) => {
                    return Err(Rejection::ParentMissing(parent.to_string()).into())
                }
                Err(other) => return Err(other.into()),
            }
        };

        if input.kind.parent() != parent_kind {
            return Err(Rejection::type_mismatch(input.kind.parent(), parent_kind).into());
        }

        let metadata = input.merged_metadata();
        let (path, node) = match input.kind {
            NodeKind::Chapter => {
                let index = input.index.ok_or(Rejection::MissingChapterIndex)?;
                let path = grammar::child_path(&parent_path, NodeKind::Chapter, index);
                ensure_chapter_slot_free(&self.document, &path, index, None)?;
                let node = Node::Chapter(ChapterEntry { title: input.title, index, metadata });
                (path, node)
            }
            kind => {
                let next = self
                    .document
                    .sibling_ordinals(&parent_path, kind)
                    .max()
                    .unwrap_or(0)
                    + 1;
                let path = grammar::child_path(&parent_path, kind, next);
                let entry = Entry { title: input.title, metadata };
                let node = Node::from_entry(kind, entry)
                    .ok_or_else(|| Rejection::InvalidType(kind.to_string()))?;
                (path, node)
            }
        };

        let kind = node.kind();
        self.document.insert(path.clone(), node);
        self.persist().await?;
        info!(%path, %kind, "node created");
        Ok(path)
    }

    /// Apply `patch` to the node named by `reference` and return its path.
    ///
    /// Title is replaced, metadata is shallow-merged. Changing a chapter's
    /// index moves it to `<plot point>/c<new index>`, so the path and the
    /// stored index always agree. An index on any other kind is rejected.
    pub async fn update_node(
        &mut self,
        reference: &str,
        patch: NodePatch,
    ) -> Result<String, OutlineError> {
        self.load().await?;
        let result = self.apply_patch(reference, patch).await;
        log_rejection("update_node", reference, &result);
        result
    }

    async fn apply_patch(&mut self, reference: &str, patch: NodePatch) -> Result<String, OutlineError> {
        let (path, kind) = locate(&self.document, reference)?;

        let target = match (kind, patch.index) {
            (NodeKind::Chapter, Some(new_index)) => {
                let parent = grammar::parent(&path)
                    .ok_or_else(|| Rejection::InvalidPath(path.clone()))?;
                let target = grammar::child_path(&parent, NodeKind::Chapter, new_index);
                if target != path {
                    ensure_chapter_slot_free(&self.document, &target, new_index, Some(&path))?;
                }
                target
            }
            (kind, Some(_)) => {
                return Err(Rejection::InvalidInput(format!(
                    "`index` only applies to chapters, not to {kind} {path}"
                ))
                .into());
            }
            (_, None) => path.clone(),
        };

        let mut node = self
            .document
            .remove(&path)
            .ok_or_else(|| Rejection::NotFound(path.clone()))?;
        if let Some(title) = &patch.title {
            node.set_title(title.clone());
        }
        if let (Node::Chapter(chapter), Some(new_index)) = (&mut node, patch.index) {
            chapter.index = new_index;
        }
        patch.merge_into(node.metadata_mut());
        self.document.insert(target.clone(), node);

        self.persist().await?;
        if target == path {
            info!(%path, "node updated");
        } else {
            info!(from = %path, to = %target, "chapter re-indexed");
        }
        Ok(target)
    }

    /// Delete a node and everything below it. Returns the number of nodes removed.
    pub async fn delete_node(&mut self, reference: &str) -> Result<usize, OutlineError> {
        self.load().await?;
        let result = self.remove_subtree(reference).await;
        log_rejection("delete_node", reference, &result);
        result
    }

    async fn remove_subtree(&mut self, reference: &str) -> Result<usize, OutlineError> {
        let (path, _) = locate(&self.document, reference)?;
        if self.document.remove(&path).is_none() {
            return Err(Rejection::NotFound(path).into());
        }
        let removed = 1 + self.document.remove_descendants(&path);
        self.persist().await?;
        info!(%path, removed, "node deleted");
        Ok(removed)
    }
}

/// Chapter lookup by global index or exact chapter path.
fn resolve_chapter(document: &OutlineDocument, reference: &Reference) -> Option<String> {
    match reference {
        Reference::GlobalIndex(index) => document
            .chapters
            .iter()
            .find(|(_, chapter)| chapter.index == *index)
            .map(|(path, _)| path.clone()),
        Reference::Path(path) => (grammar::classify(path) == Some(NodeKind::Chapter)
            && document.chapters.contains_key(path))
        .then(|| path.clone()),
    }
}

/// Turn any reference into an existing node's canonical path and kind.
fn locate(document: &OutlineDocument, reference: &str) -> Result<(String, NodeKind), Rejection> {
    match Reference::parse(reference) {
        index @ Reference::GlobalIndex(_) => resolve_chapter(document, &index)
            .map(|path| (path, NodeKind::Chapter))
            .ok_or_else(|| Rejection::NotFound(index.to_string())),
        Reference::Path(path) => {
            let kind =
                grammar::classify(&path).ok_or_else(|| Rejection::InvalidPath(path.clone()))?;
            if document.contains(&path) {
                Ok((path, kind))
            } else {
                Err(Rejection::NotFound(path))
            }
        }
    }
}

/// A chapter may take `path` only if nothing sits there and no other chapter
/// already carries `index`. `moving` is the chapter being re-indexed, if any.
fn ensure_chapter_slot_free(
    document: &OutlineDocument,
    path: &str,
    index: u32,
    moving: Option<&str>,
) -> Result<(), Rejection> {
    if document.chapters.contains_key(path) {
        return Err(Rejection::DuplicateChapterIndex { path: path.to_string() });
    }
    let clash = document
        .chapters
        .iter()
        .find(|(other, chapter)| chapter.index == index && Some(other.as_str()) != moving);
    match clash {
        Some((other, _)) => Err(Rejection::DuplicateChapterIndex { path: other.clone() }),
        None => Ok(()),
    }
}

fn log_rejection<T>(operation: &'static str, reference: &str, result: &Result<T, OutlineError>) {
    if let Err(OutlineError::Rejected(rejection)) = result {
        warn!(operation, reference, code = rejection.code(), %rejection, "operation rejected");
    }
}
