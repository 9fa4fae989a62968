// `outline migrate`: import a nested outline file, replacing the store.

use std::path::PathBuf;

use clap::Args;
use outline_store::MigrationReport;
use serde::Serialize;

use super::{execute, report, Context};
use crate::exit_code::UsageError;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Nested outline JSON. Defaults to `nested_source_path` from config.
    pub source: Option<PathBuf>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrateResult {
    pub source: String,
    pub document: String,
    #[serde(flatten)]
    pub report: MigrationReport,
}

pub fn run(args: MigrateArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = execute(migrate(ctx, args.source));
    if let Ok(result) = &result {
        if result.report.skipped_chapters > 0 {
            let skipped = result.report.skipped_chapters;
            let message = format!("{skipped} chapter(s) without chapter_index were skipped");
            output::print_warning(format, "CHAPTERS_SKIPPED", &message);
        }
    }
    report(format, result, format_human)
}

async fn migrate(ctx: &Context, source: Option<PathBuf>) -> anyhow::Result<MigrateResult> {
    let source = match source {
        Some(path) if path.is_absolute() => path,
        Some(path) => ctx.root.join(path),
        None => ctx.config.resolve_nested_source(&ctx.root).ok_or_else(|| {
            UsageError("no source given and no nested_source_path configured".into())
        })?,
    };
    let report = ctx.outline().migrate_from_file(&source).await?;
    Ok(MigrateResult {
        source: source.display().to_string(),
        document: ctx.document.display().to_string(),
        report,
    })
}

fn format_human(result: &MigrateResult) -> String {
    let r = &result.report;
    let mut lines = vec![
        format!("Migrated {} into {}", result.source, result.document),
        format!(
            "  {} volume(s), {} act(s), {} plot point(s), {} chapter(s)",
            r.volumes, r.acts, r.plot_points, r.chapters
        ),
    ];
    if r.overwritten_chapters > 0 {
        lines.push(format!("  {} duplicate chapter(s) overwritten", r.overwritten_chapters));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::temp_context;
    use outline_store::{OutlineError, PersistError};

    const LEGACY: &str = r#"[{
        "volume": "Book",
        "acts": [{
            "act_name": "Act",
            "plot_points": [{
                "plot_point_name": "Beat",
                "chapters": [
                    { "chapter_name": "Five", "chapter_index": 5 },
                    { "chapter_name": "Three", "chapter_index": 3 },
                    { "chapter_name": "Loose" }
                ]
            }]
        }]
    }]"#;

    #[tokio::test]
    async fn migrates_relative_source() {
        let (dir, ctx) = temp_context();
        std::fs::write(dir.path().join("legacy.json"), LEGACY).unwrap();

        let result = migrate(&ctx, Some("legacy.json".into())).await.unwrap();
        assert_eq!(result.report.chapters, 2);
        assert_eq!(result.report.skipped_chapters, 1);
        let human = format_human(&result);
        assert!(human.contains("1 volume(s), 1 act(s), 1 plot point(s), 2 chapter(s)"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["chapters"], 2);
        assert!(json["source"].as_str().unwrap().ends_with("legacy.json"));

        let chapters = ctx.outline().get_all_chapters_sorted().await.unwrap();
        assert_eq!(chapters[0].path, "/v1/a1/p1/c3");
    }

    #[tokio::test]
    async fn falls_back_to_configured_source() {
        let (dir, mut ctx) = temp_context();
        std::fs::write(dir.path().join("nested.json"), LEGACY).unwrap();
        ctx.config.nested_source_path = Some("nested.json".into());
        assert!(migrate(&ctx, None).await.is_ok());
    }

    #[tokio::test]
    async fn no_source_anywhere_is_a_usage_error() {
        let (_dir, ctx) = temp_context();
        let err = migrate(&ctx, None).await.unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let (_dir, ctx) = temp_context();
        let err = migrate(&ctx, Some("absent.json".into())).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OutlineError>(),
            Some(OutlineError::Persist(PersistError::MissingSource(_)))
        ));
    }
}
