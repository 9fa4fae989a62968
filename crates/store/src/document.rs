// The outline document: four path-keyed collections, read and written whole.

use std::collections::BTreeMap;

use outline_common::path::grammar;
use outline_common::types::{ChapterEntry, Entry, Node, NodeKind, PathedNode};
use serde::{Deserialize, Serialize};

/// Full snapshot of the outline, as persisted.
///
/// Each collection maps a canonical path to the node stored there. The
/// collection a path belongs to is implied by its depth, so keys never
/// collide across collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutlineDocument {
    #[serde(default)]
    pub volumes: BTreeMap<String, Entry>,
    #[serde(default)]
    pub acts: BTreeMap<String, Entry>,
    #[serde(default)]
    pub plot_points: BTreeMap<String, Entry>,
    #[serde(default)]
    pub chapters: BTreeMap<String, ChapterEntry>,
    /// Bumped on every save; used to detect concurrent writers.
    #[serde(default)]
    pub revision: u64,
}

impl OutlineDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self, kind: NodeKind) -> Option<&BTreeMap<String, Entry>> {
        match kind {
            NodeKind::Volume => Some(&self.volumes),
            NodeKind::Act => Some(&self.acts),
            NodeKind::PlotPoint => Some(&self.plot_points),
            NodeKind::Chapter => None,
        }
    }

    fn entries_mut(&mut self, kind: NodeKind) -> Option<&mut BTreeMap<String, Entry>> {
        match kind {
            NodeKind::Volume => Some(&mut self.volumes),
            NodeKind::Act => Some(&mut self.acts),
            NodeKind::PlotPoint => Some(&mut self.plot_points),
            NodeKind::Chapter => None,
        }
    }

    /// Look up the node stored at `path`, choosing the collection by depth.
    pub fn get(&self, path: &str) -> Option<Node> {
        let kind = grammar::classify(path)?;
        let key = grammar::normalize(path);
        match kind {
            NodeKind::Chapter => self.chapters.get(&key).cloned().map(Node::Chapter),
            other => {
                let entry = self.entries(other)?.get(&key)?.clone();
                Node::from_entry(other, entry)
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        let Some(kind) = grammar::classify(path) else {
            return false;
        };
        let key = grammar::normalize(path);
        match kind {
            NodeKind::Chapter => self.chapters.contains_key(&key),
            other => self.entries(other).is_some_and(|m| m.contains_key(&key)),
        }
    }

    /// Store `node` under `path`, replacing whatever was there.
    pub fn insert(&mut self, path: impl Into<String>, node: Node) {
        let path = path.into();
        match node {
            Node::Volume(entry) => {
                self.volumes.insert(path, entry);
            }
            Node::Act(entry) => {
                self.acts.insert(path, entry);
            }
            Node::PlotPoint(entry) => {
                self.plot_points.insert(path, entry);
            }
            Node::Chapter(chapter) => {
                self.chapters.insert(path, chapter);
            }
        }
    }

    /// Remove exactly `path`, leaving descendants in place.
    pub fn remove(&mut self, path: &str) -> Option<Node> {
        let kind = grammar::classify(path)?;
        let key = grammar::normalize(path);
        match kind {
            NodeKind::Chapter => self.chapters.remove(&key).map(Node::Chapter),
            other => {
                let entry = self.entries_mut(other)?.remove(&key)?;
                Node::from_entry(other, entry)
            }
        }
    }

    /// Remove every node strictly below `path` across all collections.
    ///
    /// Linear in the size of the document.
    pub fn remove_descendants(&mut self, path: &str) -> usize {
        let before = self.len();
        self.volumes.retain(|key, _| !grammar::is_descendant(key, path));
        self.acts.retain(|key, _| !grammar::is_descendant(key, path));
        self.plot_points.retain(|key, _| !grammar::is_descendant(key, path));
        self.chapters.retain(|key, _| !grammar::is_descendant(key, path));
        before - self.len()
    }

    /// Every node with its path, collection by collection.
    pub fn nodes(&self) -> impl Iterator<Item = PathedNode> + '_ {
        self.volumes
            .iter()
            .map(|(p, e)| PathedNode::new(p.clone(), Node::Volume(e.clone())))
            .chain(self.acts.iter().map(|(p, e)| PathedNode::new(p.clone(), Node::Act(e.clone()))))
            .chain(
                self.plot_points
                    .iter()
                    .map(|(p, e)| PathedNode::new(p.clone(), Node::PlotPoint(e.clone()))),
            )
            .chain(
                self.chapters
                    .iter()
                    .map(|(p, c)| PathedNode::new(p.clone(), Node::Chapter(c.clone()))),
            )
    }

    /// Ordinals already used by children of `kind` under `parent`.
    pub fn sibling_ordinals<'a>(
        &'a self,
        parent: &'a str,
        kind: NodeKind,
    ) -> impl Iterator<Item = u32> + 'a {
        let target_depth = kind.depth();
        let keys: Box<dyn Iterator<Item = &String> + 'a> = match kind {
            NodeKind::Chapter => Box::new(self.chapters.keys()),
            other => match self.entries(other) {
                Some(map) => Box::new(map.keys()),
                None => Box::new(std::iter::empty()),
            },
        };
        keys.filter(move |key| {
            grammar::depth(key) == target_depth && grammar::is_descendant(key, parent)
        })
        .filter_map(move |key| {
            let last = grammar::segments(key).last()?;
            grammar::ordinal(last, kind.prefix())
        })
    }

    pub fn len(&self) -> usize {
        self.volumes.len() + self.acts.len() + self.plot_points.len() + self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
