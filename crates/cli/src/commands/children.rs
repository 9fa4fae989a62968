// `outline children`: list the direct children of a node.

use clap::Args;
use outline_common::types::PathedNode;
use serde::Serialize;

use super::{execute, node_line, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct ChildrenArgs {
    /// Parent path; `/` lists volumes.
    #[arg(default_value = "/")]
    pub parent: String,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildrenResult {
    pub parent: String,
    pub children: Vec<PathedNode>,
}

pub fn run(args: ChildrenArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    report(format, execute(list(ctx, args.parent)), format_human)
}

async fn list(ctx: &Context, parent: String) -> anyhow::Result<ChildrenResult> {
    let children = ctx.outline().get_children_sorted(&parent).await?;
    Ok(ChildrenResult { parent, children })
}

fn format_human(result: &ChildrenResult) -> String {
    if result.children.is_empty() {
        return format!("No children under {}.", result.parent);
    }
    result.children.iter().map(node_line).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::temp_context;
    use outline_store::NewNode;

    #[tokio::test]
    async fn lists_in_ordinal_order() {
        let (_dir, ctx) = temp_context();
        let mut outline = ctx.outline();
        outline.add_node("/", NewNode::volume("Book")).await.unwrap();
        for title in ["One", "Two", "Three"] {
            outline.add_node("/v1", NewNode::act(title)).await.unwrap();
        }
        outline.add_node("/v1/a1", NewNode::plot_point("Nested")).await.unwrap();

        let result = list(&ctx, "/v1".into()).await.unwrap();
        let paths: Vec<_> = result.children.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["/v1/a1", "/v1/a2", "/v1/a3"]);
        assert!(format_human(&result).lines().nth(1).unwrap().ends_with("Two"));
    }

    #[test]
    fn human_format_empty() {
        let result = ChildrenResult { parent: "/v2".into(), children: vec![] };
        assert_eq!(format_human(&result), "No children under /v2.");
    }
}
