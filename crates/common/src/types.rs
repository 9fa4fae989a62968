// Core outline types shared across all outline crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Free-form metadata bag carried by every node.
pub type Metadata = Map<String, Value>;

/// The four node types of an outline. Depth in the path tree is fixed per kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Volume,
    Act,
    PlotPoint,
    Chapter,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown node type: {0}")]
pub struct UnknownKind(pub String);

impl NodeKind {
    pub const ALL: [NodeKind; 4] =
        [NodeKind::Volume, NodeKind::Act, NodeKind::PlotPoint, NodeKind::Chapter];

    /// One-letter segment prefix used in paths (`v`, `a`, `p`, `c`).
    pub fn prefix(self) -> char {
        match self {
            Self::Volume => 'v',
            Self::Act => 'a',
            Self::PlotPoint => 'p',
            Self::Chapter => 'c',
        }
    }

    /// Number of path segments for a node of this kind.
    pub fn depth(self) -> usize {
        match self {
            Self::Volume => 1,
            Self::Act => 2,
            Self::PlotPoint => 3,
            Self::Chapter => 4,
        }
    }

    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(Self::Volume),
            2 => Some(Self::Act),
            3 => Some(Self::PlotPoint),
            4 => Some(Self::Chapter),
            _ => None,
        }
    }

    /// Required parent kind. `None` means the node hangs off the implicit root.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Volume => None,
            Self::Act => Some(Self::Volume),
            Self::PlotPoint => Some(Self::Act),
            Self::Chapter => Some(Self::PlotPoint),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Act => "act",
            Self::PlotPoint => "plot_point",
            Self::Chapter => "chapter",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "volume" => Ok(Self::Volume),
            "act" => Ok(Self::Act),
            "plot_point" | "plotPoint" | "plot-point" => Ok(Self::PlotPoint),
            "chapter" => Ok(Self::Chapter),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Stored body of a volume, act or plot point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Stored body of a chapter. `index` is the book-wide chapter number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChapterEntry {
    #[serde(default)]
    pub title: String,
    pub index: u32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One outline entry, tagged by its kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Volume(Entry),
    Act(Entry),
    PlotPoint(Entry),
    Chapter(ChapterEntry),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Volume(_) => NodeKind::Volume,
            Self::Act(_) => NodeKind::Act,
            Self::PlotPoint(_) => NodeKind::PlotPoint,
            Self::Chapter(_) => NodeKind::Chapter,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Volume(e) | Self::Act(e) | Self::PlotPoint(e) => &e.title,
            Self::Chapter(c) => &c.title,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Volume(e) | Self::Act(e) | Self::PlotPoint(e) => &e.metadata,
            Self::Chapter(c) => &c.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Self::Volume(e) | Self::Act(e) | Self::PlotPoint(e) => &mut e.metadata,
            Self::Chapter(c) => &mut c.metadata,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        match self {
            Self::Volume(e) | Self::Act(e) | Self::PlotPoint(e) => e.title = title,
            Self::Chapter(c) => c.title = title,
        }
    }

    /// Global chapter index, `None` for non-chapter nodes.
    pub fn chapter_index(&self) -> Option<u32> {
        match self {
            Self::Chapter(c) => Some(c.index),
            _ => None,
        }
    }

    /// Wrap a plain entry as a non-chapter node. Returns `None` for `Chapter`,
    /// which needs a [`ChapterEntry`].
    pub fn from_entry(kind: NodeKind, entry: Entry) -> Option<Self> {
        match kind {
            NodeKind::Volume => Some(Self::Volume(entry)),
            NodeKind::Act => Some(Self::Act(entry)),
            NodeKind::PlotPoint => Some(Self::PlotPoint(entry)),
            NodeKind::Chapter => None,
        }
    }
}

/// A node together with the path it is stored under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathedNode {
    pub path: String,
    #[serde(flatten)]
    pub node: Node,
}

impl PathedNode {
    pub fn new(path: impl Into<String>, node: Node) -> Self {
        Self { path: path.into(), node }
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn title(&self) -> &str {
        self.node.title()
    }
}
