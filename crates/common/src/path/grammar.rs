// Outline path grammar: `/v1/a2/p3/c45`, one typed segment per level.
//
// Depth determines the node kind. Only the last segment's prefix is checked.

use crate::types::NodeKind;

/// The implicit root every volume hangs off.
pub const ROOT: &str = "/";

/// Non-empty segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Number of segments. The root (`/` or the empty string) has depth 0.
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

pub fn is_root(path: &str) -> bool {
    depth(path) == 0
}

/// Canonical spelling: leading slash, no empty segments, no trailing slash.
pub fn normalize(path: &str) -> String {
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

/// Parse a segment of the form `<prefix><digits>` into its ordinal.
pub fn ordinal(segment: &str, prefix: char) -> Option<u32> {
    let digits = segment.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Classify a path by its depth and the prefix of its last segment.
///
/// Returns `None` for the root, for paths deeper than a chapter and for a
/// last segment that does not match the kind implied by the depth.
pub fn classify(path: &str) -> Option<NodeKind> {
    let parts: Vec<&str> = segments(path).collect();
    let kind = NodeKind::from_depth(parts.len())?;
    let last = parts.last()?;
    ordinal(last, kind.prefix()).map(|_| kind)
}

/// Ordinal of the last segment, read with the prefix its depth implies.
pub fn last_ordinal(path: &str) -> Option<u32> {
    let kind = classify(path)?;
    let last = segments(path).last()?;
    ordinal(last, kind.prefix())
}

/// Path with the last segment removed. Volumes yield [`ROOT`]; the root has no parent.
pub fn parent(path: &str) -> Option<String> {
    let parts: Vec<&str> = segments(path).collect();
    let (_, ancestors) = parts.split_last()?;
    Some(format!("/{}", ancestors.join("/")))
}

/// Build the path of a child with the given kind and ordinal under `parent`.
pub fn child_path(parent: &str, kind: NodeKind, ordinal: u32) -> String {
    let base = normalize(parent);
    if base == ROOT {
        format!("/{}{ordinal}", kind.prefix())
    } else {
        format!("{base}/{}{ordinal}", kind.prefix())
    }
}

/// True when `path` lies strictly below `ancestor`.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    let ancestor = normalize(ancestor);
    if ancestor == ROOT {
        return !is_root(path) && path.starts_with('/');
    }
    path.strip_prefix(ancestor.as_str()).is_some_and(|rest| rest.starts_with('/'))
}
