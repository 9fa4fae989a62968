// Read-only queries: children, chapter ordering and windows, typed accessors.

use outline_common::path::{grammar, Reference};
use outline_common::types::{Node, NodeKind, PathedNode};
use tracing::debug;

use super::{resolve_chapter, Outline};
use crate::backend::DocumentBackend;
use crate::document::OutlineDocument;
use crate::error::PersistError;

impl<B: DocumentBackend> Outline<B> {
    /// Direct children of `parent` (`/` for the root), in no particular order.
    pub async fn get_children(&mut self, parent: &str) -> Result<Vec<PathedNode>, PersistError> {
        self.load().await?;
        Ok(direct_children(&self.document, parent))
    }

    /// Direct children ordered by their path ordinal (chapters by index).
    pub async fn get_children_sorted(
        &mut self,
        parent: &str,
    ) -> Result<Vec<PathedNode>, PersistError> {
        self.load().await?;
        let mut children = direct_children(&self.document, parent);
        sort_by_ordinal(&mut children);
        Ok(children)
    }

    /// Every chapter in the outline, ascending by global index.
    pub async fn get_all_chapters_sorted(&mut self) -> Result<Vec<PathedNode>, PersistError> {
        self.load().await?;
        Ok(sorted_chapters(&self.document))
    }

    /// The chapter named by `reference` plus up to `window_size` chapters on
    /// each side, in global index order.
    ///
    /// The window counts positions in the sorted chapter list, so gaps in the
    /// index sequence do not widen it. Unknown references yield an empty list.
    pub async fn get_chapter_window(
        &mut self,
        reference: &str,
        window_size: usize,
    ) -> Result<Vec<PathedNode>, PersistError> {
        self.load().await?;
        let Some(center) = resolve_chapter(&self.document, &Reference::parse(reference)) else {
            debug!(reference, "chapter window centre not found");
            return Ok(Vec::new());
        };

        let chapters = sorted_chapters(&self.document);
        let Some(position) = chapters.iter().position(|c| c.path == center) else {
            return Ok(Vec::new());
        };
        let start = position.saturating_sub(window_size);
        let end = position.saturating_add(window_size).saturating_add(1).min(chapters.len());
        Ok(chapters[start..end].to_vec())
    }

    /// The volume at `path`, or `None` if it is missing or not a volume.
    pub async fn get_volume_info_by_path(
        &mut self,
        path: &str,
    ) -> Result<Option<PathedNode>, PersistError> {
        Ok(self.get_node(path).await?.filter(|n| n.kind() == NodeKind::Volume))
    }

    /// The chapter named by `reference`, or `None` if it is not a chapter.
    pub async fn get_chapter_outline_by_path(
        &mut self,
        reference: &str,
    ) -> Result<Option<PathedNode>, PersistError> {
        Ok(self.get_node(reference).await?.filter(|n| n.kind() == NodeKind::Chapter))
    }

    /// All volumes ordered by ordinal.
    pub async fn list_volumes(&mut self) -> Result<Vec<PathedNode>, PersistError> {
        self.get_children_sorted(grammar::ROOT).await
    }

    /// Reload and borrow the whole document.
    pub async fn snapshot(&mut self) -> Result<&OutlineDocument, PersistError> {
        self.load().await?;
        Ok(&self.document)
    }
}

pub(super) fn direct_children(document: &OutlineDocument, parent: &str) -> Vec<PathedNode> {
    let target_depth = grammar::depth(parent) + 1;
    document
        .nodes()
        .filter(|n| grammar::depth(&n.path) == target_depth && grammar::is_descendant(&n.path, parent))
        .collect()
}

pub(super) fn sort_by_ordinal(nodes: &mut [PathedNode]) {
    nodes.sort_by_key(|n| {
        let ordinal = match &n.node {
            Node::Chapter(chapter) => Some(chapter.index),
            _ => grammar::last_ordinal(&n.path),
        };
        (n.kind(), ordinal.unwrap_or(u32::MAX))
    });
}

/// Chapters ascending by index; ties keep path order.
pub(super) fn sorted_chapters(document: &OutlineDocument) -> Vec<PathedNode> {
    let mut chapters: Vec<PathedNode> = document
        .chapters
        .iter()
        .map(|(path, chapter)| PathedNode::new(path.clone(), Node::Chapter(chapter.clone())))
        .collect();
    chapters.sort_by_key(|c| c.node.chapter_index());
    chapters
}
