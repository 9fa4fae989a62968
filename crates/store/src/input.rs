// Loose node input: `{ type, title, index?, metadata?, ...extra }`.
//
// Tool layers hand the store plain JSON objects. Recognised fields are pulled
// out; everything else lands in the node's metadata, after any explicit
// `metadata` object so top-level fields win on key clashes.

use outline_common::types::{Metadata, NodeKind};
use serde_json::Value;
use tracing::warn;

use crate::error::Rejection;

/// Input for creating a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub kind: NodeKind,
    pub title: String,
    /// Global chapter index. Required for chapters, ignored otherwise.
    pub index: Option<u32>,
    pub metadata: Metadata,
    /// Unrecognised top-level fields, merged into metadata last.
    pub extra: Metadata,
}

impl NewNode {
    pub fn new(kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            index: None,
            metadata: Metadata::new(),
            extra: Metadata::new(),
        }
    }

    pub fn volume(title: impl Into<String>) -> Self {
        Self::new(NodeKind::Volume, title)
    }

    pub fn act(title: impl Into<String>) -> Self {
        Self::new(NodeKind::Act, title)
    }

    pub fn plot_point(title: impl Into<String>) -> Self {
        Self::new(NodeKind::PlotPoint, title)
    }

    pub fn chapter(title: impl Into<String>, index: u32) -> Self {
        Self { index: Some(index), ..Self::new(NodeKind::Chapter, title) }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Parse a JSON object of the form `{ type, title, index?, metadata?, ... }`.
    pub fn from_json(value: Value) -> Result<Self, Rejection> {
        let Value::Object(mut fields) = value else {
            return Err(Rejection::InvalidInput("node data must be a JSON object".into()));
        };

        let kind = match fields.remove("type") {
            Some(Value::String(s)) => {
                s.parse::<NodeKind>().map_err(|_| Rejection::InvalidType(s.clone()))?
            }
            Some(other) => return Err(Rejection::InvalidType(other.to_string())),
            None => return Err(Rejection::InvalidType("missing `type`".into())),
        };
        let title = fields.remove("title").map(title_text).unwrap_or_default();
        let index = fields.remove("index").and_then(|v| parse_index(&v));
        let metadata = fields.remove("metadata").map(metadata_object).unwrap_or_default();

        Ok(Self { kind, title, index, metadata, extra: fields })
    }

    /// Explicit metadata overlaid with the extra fields.
    pub(crate) fn merged_metadata(&self) -> Metadata {
        let mut merged = self.metadata.clone();
        for (key, value) in &self.extra {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// A partial update. `type` is never part of a patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub title: Option<String>,
    /// New global index. Only meaningful for chapters.
    pub index: Option<u32>,
    pub metadata: Metadata,
    pub extra: Metadata,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn from_json(value: Value) -> Result<Self, Rejection> {
        let Value::Object(mut fields) = value else {
            return Err(Rejection::InvalidInput("patch must be a JSON object".into()));
        };

        fields.remove("type");
        let title = fields.remove("title").map(title_text);
        let index = match fields.remove("index") {
            Some(raw) => {
                let parsed = parse_index(&raw);
                if parsed.is_none() {
                    warn!(index = %raw, "ignoring non-integer chapter index in patch");
                }
                parsed
            }
            None => None,
        };
        let metadata = fields.remove("metadata").map(metadata_object).unwrap_or_default();

        Ok(Self { title, index, metadata, extra: fields })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.index.is_none()
            && self.metadata.is_empty()
            && self.extra.is_empty()
    }

    /// Shallow-merge this patch's metadata and extras into `target`.
    pub(crate) fn merge_into(&self, target: &mut Metadata) {
        for (key, value) in self.metadata.iter().chain(self.extra.iter()) {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn title_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_index(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix('c').unwrap_or(s);
            digits.parse().ok()
        }
        _ => None,
    }
}

fn metadata_object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        Value::Null => Metadata::new(),
        other => {
            warn!(metadata = %other, "ignoring non-object metadata");
            Metadata::new()
        }
    }
}
