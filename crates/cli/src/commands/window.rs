// `outline window`: a chapter plus its neighbours in reading order.

use clap::Args;
use outline_common::types::PathedNode;
use serde::Serialize;

use super::{execute, node_line, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct WindowArgs {
    /// Chapter index, `c`-prefixed index or chapter path.
    pub reference: String,

    /// Chapters on each side (defaults to the configured window size).
    #[arg(long)]
    pub size: Option<usize>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowResult {
    pub reference: String,
    pub size: usize,
    pub chapters: Vec<PathedNode>,
}

pub fn run(args: WindowArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let size = args.size.unwrap_or(ctx.config.window_size);
    report(format, execute(window(ctx, args.reference, size)), format_human)
}

async fn window(ctx: &Context, reference: String, size: usize) -> anyhow::Result<WindowResult> {
    let chapters = ctx.outline().get_chapter_window(&reference, size).await?;
    Ok(WindowResult { reference, size, chapters })
}

fn format_human(result: &WindowResult) -> String {
    if result.chapters.is_empty() {
        return format!("No chapter matches {}.", result.reference);
    }
    result.chapters.iter().map(node_line).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::temp_context;
    use outline_store::NewNode;

    #[tokio::test]
    async fn window_clamps_at_the_edges() {
        let (_dir, ctx) = temp_context();
        let mut outline = ctx.outline();
        outline.add_node("/", NewNode::volume("Book")).await.unwrap();
        outline.add_node("/v1", NewNode::act("Act")).await.unwrap();
        outline.add_node("/v1/a1", NewNode::plot_point("Beat")).await.unwrap();
        for index in 1..=6 {
            let chapter = NewNode::chapter(format!("Ch {index}"), index);
            outline.add_node("/v1/a1/p1", chapter).await.unwrap();
        }

        let result = window(&ctx, "c6".into(), 2).await.unwrap();
        let indices: Vec<_> =
            result.chapters.iter().filter_map(|c| c.node.chapter_index()).collect();
        assert_eq!(indices, vec![4, 5, 6]);

        let result = window(&ctx, "3".into(), 1).await.unwrap();
        assert_eq!(result.chapters.len(), 3);
    }

    #[test]
    fn human_format_no_match() {
        let result = WindowResult { reference: "c99".into(), size: 2, chapters: vec![] };
        assert_eq!(format_human(&result), "No chapter matches c99.");
    }
}
