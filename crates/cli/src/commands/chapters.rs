// `outline chapters`: every chapter, ascending by global index.

use clap::Args;
use outline_common::types::PathedNode;
use serde::Serialize;

use super::{execute, node_line, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct ChaptersArgs {
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChaptersResult {
    pub chapters: Vec<PathedNode>,
}

pub fn run(args: ChaptersArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    report(format, execute(list(ctx)), format_human)
}

async fn list(ctx: &Context) -> anyhow::Result<ChaptersResult> {
    let chapters = ctx.outline().get_all_chapters_sorted().await?;
    Ok(ChaptersResult { chapters })
}

fn format_human(result: &ChaptersResult) -> String {
    if result.chapters.is_empty() {
        return "No chapters in outline.".into();
    }
    let mut lines = vec![format!("{} chapter(s)", result.chapters.len())];
    lines.extend(result.chapters.iter().map(|c| format!("  {}", node_line(c))));
    lines.join("\n")
}
