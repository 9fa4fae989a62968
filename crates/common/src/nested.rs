// Nested outline document: volumes → acts → plot_points → chapters.
//
// This is the legacy shape the flat store is migrated from, and the shape the
// flat store can be exported back to. Unknown fields ride along in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::Metadata;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NestedOutline {
    #[serde(default)]
    pub volumes: Vec<NestedVolume>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NestedVolume {
    #[serde(default, deserialize_with = "lenient_title")]
    pub volume: String,
    #[serde(default)]
    pub acts: Vec<NestedAct>,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NestedAct {
    #[serde(default, deserialize_with = "lenient_title")]
    pub act_name: String,
    #[serde(default)]
    pub plot_points: Vec<NestedPlotPoint>,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NestedPlotPoint {
    #[serde(default, deserialize_with = "lenient_title")]
    pub plot_point_name: String,
    #[serde(default)]
    pub chapters: Vec<NestedChapter>,
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NestedChapter {
    #[serde(default, deserialize_with = "lenient_title")]
    pub chapter_name: String,
    /// Book-wide chapter number. Chapters without one cannot be placed.
    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub chapter_index: Option<u32>,
    #[serde(flatten)]
    pub extra: Metadata,
}

/// Either `{ "volumes": [...] }` or a bare array of volumes.
#[derive(Deserialize)]
#[serde(untagged)]
enum NestedSource {
    Volumes(Vec<NestedVolume>),
    Document(NestedOutline),
}

impl NestedOutline {
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        let source: NestedSource = serde_json::from_str(input)?;
        Ok(source.into())
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let source: NestedSource = serde_json::from_value(value)?;
        Ok(source.into())
    }

    pub fn chapter_count(&self) -> usize {
        self.volumes
            .iter()
            .flat_map(|v| &v.acts)
            .flat_map(|a| &a.plot_points)
            .map(|p| p.chapters.len())
            .sum()
    }
}

impl From<NestedSource> for NestedOutline {
    fn from(source: NestedSource) -> Self {
        match source {
            NestedSource::Volumes(volumes) => Self { volumes },
            NestedSource::Document(doc) => doc,
        }
    }
}

/// Titles are usually strings, but hand-edited sources sometimes carry numbers.
fn lenient_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Accept `5` as well as `"5"`; anything else counts as missing.
fn lenient_index<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
