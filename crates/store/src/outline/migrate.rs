// Nested ↔ flat conversion.
//
// Migration flattens a nested outline into path-keyed collections: volumes,
// acts and plot points get 1-based positional ordinals, chapters are keyed
// by their own declared index. Export rebuilds the nested shape.

use std::collections::HashMap;
use std::path::Path;

use outline_common::nested::{NestedAct, NestedChapter, NestedOutline, NestedPlotPoint, NestedVolume};
use outline_common::path::grammar;
use outline_common::types::{ChapterEntry, Entry, Metadata, Node, NodeKind, PathedNode};
use serde::Serialize;
use tokio::fs;
use tracing::{info, warn};

use super::query::{direct_children, sort_by_ordinal};
use super::Outline;
use crate::backend::DocumentBackend;
use crate::document::OutlineDocument;
use crate::error::{OutlineError, PersistError};

/// Keys that carry structure in the nested form and never belong in metadata.
const STRUCTURAL_KEYS: [&str; 8] = [
    "volume",
    "act_name",
    "plot_point_name",
    "chapter_name",
    "chapter_index",
    "acts",
    "plot_points",
    "chapters",
];

/// Counts from a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub volumes: usize,
    pub acts: usize,
    pub plot_points: usize,
    pub chapters: usize,
    /// Chapters dropped because they declared no index.
    pub skipped_chapters: usize,
    /// Chapters whose index was already claimed elsewhere in the source.
    /// The later one replaces the earlier.
    pub overwritten_chapters: usize,
}

impl<B: DocumentBackend> Outline<B> {
    /// Replace the whole store with the flattened form of `nested`.
    ///
    /// Destructive: whatever the store held before is discarded.
    pub async fn migrate_from_nested(
        &mut self,
        nested: &NestedOutline,
    ) -> Result<MigrationReport, OutlineError> {
        self.load().await?;
        let (mut flat, report) = flatten(nested);
        flat.revision = self.document.revision;
        self.document = flat;
        self.persist().await?;
        info!(
            volumes = report.volumes,
            acts = report.acts,
            plot_points = report.plot_points,
            chapters = report.chapters,
            skipped = report.skipped_chapters,
            "nested outline migrated"
        );
        Ok(report)
    }

    /// Read a nested outline from a JSON file and migrate it.
    pub async fn migrate_from_file(
        &mut self,
        source: impl AsRef<Path>,
    ) -> Result<MigrationReport, OutlineError> {
        let source = source.as_ref();
        let content = match fs::read_to_string(source).await {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistError::MissingSource(source.to_path_buf()).into());
            }
            Err(error) => return Err(PersistError::io(source, error).into()),
        };
        let nested = NestedOutline::from_json_str(&content).map_err(PersistError::from)?;
        self.migrate_from_nested(&nested).await
    }

    /// Rebuild the nested view of the store, everything ordered by ordinal.
    pub async fn export_nested(&mut self) -> Result<NestedOutline, PersistError> {
        self.load().await?;
        Ok(unflatten(&self.document))
    }
}

pub(super) fn flatten(nested: &NestedOutline) -> (OutlineDocument, MigrationReport) {
    let mut doc = OutlineDocument::new();
    let mut report = MigrationReport::default();
    // Chapter index -> path. Indices are global, not per plot point.
    let mut claimed: HashMap<u32, String> = HashMap::new();

    for (v, volume) in nested.volumes.iter().enumerate() {
        let volume_path = grammar::child_path(grammar::ROOT, NodeKind::Volume, ordinal(v));
        doc.insert(volume_path.clone(), Node::Volume(entry(&volume.volume, &volume.extra)));
        report.volumes += 1;

        for (a, act) in volume.acts.iter().enumerate() {
            let act_path = grammar::child_path(&volume_path, NodeKind::Act, ordinal(a));
            doc.insert(act_path.clone(), Node::Act(entry(&act.act_name, &act.extra)));
            report.acts += 1;

            for (p, plot_point) in act.plot_points.iter().enumerate() {
                let pp_path = grammar::child_path(&act_path, NodeKind::PlotPoint, ordinal(p));
                doc.insert(
                    pp_path.clone(),
                    Node::PlotPoint(entry(&plot_point.plot_point_name, &plot_point.extra)),
                );
                report.plot_points += 1;

                for chapter in &plot_point.chapters {
                    let Some(index) = chapter.chapter_index else {
                        warn!(plot_point = %pp_path, title = %chapter.chapter_name, "chapter without chapter_index skipped");
                        report.skipped_chapters += 1;
                        continue;
                    };
                    let path = grammar::child_path(&pp_path, NodeKind::Chapter, index);
                    match claimed.insert(index, path.clone()) {
                        Some(earlier) => {
                            warn!(%path, %earlier, index, "duplicate chapter index in nested source, later entry wins");
                            doc.remove(&earlier);
                            report.overwritten_chapters += 1;
                        }
                        None => report.chapters += 1,
                    }
                    doc.insert(
                        path,
                        Node::Chapter(ChapterEntry {
                            title: chapter.chapter_name.clone(),
                            index,
                            metadata: carried_metadata(&chapter.extra),
                        }),
                    );
                }
            }
        }
    }

    (doc, report)
}

pub(super) fn unflatten(document: &OutlineDocument) -> NestedOutline {
    let volumes = ordered_children(document, grammar::ROOT)
        .into_iter()
        .map(|volume| NestedVolume {
            volume: volume.title().to_string(),
            acts: ordered_children(document, &volume.path)
                .into_iter()
                .map(|act| NestedAct {
                    act_name: act.title().to_string(),
                    plot_points: ordered_children(document, &act.path)
                        .into_iter()
                        .map(|pp| NestedPlotPoint {
                            plot_point_name: pp.title().to_string(),
                            chapters: ordered_children(document, &pp.path)
                                .into_iter()
                                .map(|chapter| NestedChapter {
                                    chapter_name: chapter.title().to_string(),
                                    chapter_index: chapter.node.chapter_index(),
                                    extra: carried_metadata(chapter.node.metadata()),
                                })
                                .collect(),
                            extra: carried_metadata(pp.node.metadata()),
                        })
                        .collect(),
                    extra: carried_metadata(act.node.metadata()),
                })
                .collect(),
            extra: carried_metadata(volume.node.metadata()),
        })
        .collect();

    NestedOutline { volumes }
}

fn ordered_children(document: &OutlineDocument, parent: &str) -> Vec<PathedNode> {
    let mut children = direct_children(document, parent);
    sort_by_ordinal(&mut children);
    children
}

fn ordinal(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

fn entry(title: &str, extra: &Metadata) -> Entry {
    Entry { title: title.to_string(), metadata: carried_metadata(extra) }
}

fn carried_metadata(fields: &Metadata) -> Metadata {
    fields
        .iter()
        .filter(|(key, _)| !STRUCTURAL_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
