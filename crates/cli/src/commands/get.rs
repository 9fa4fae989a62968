// `outline get`: show one node.

use clap::Args;
use outline_common::types::PathedNode;
use outline_store::Rejection;

use super::{execute, node_line, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Node path, chapter index (`7`) or `c`-prefixed index (`c7`).
    pub reference: String,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: GetArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    report(format, execute(fetch(ctx, args.reference)), format_human)
}

async fn fetch(ctx: &Context, reference: String) -> anyhow::Result<PathedNode> {
    let mut outline = ctx.outline();
    outline
        .get_node(&reference)
        .await?
        .ok_or_else(|| anyhow::Error::new(Rejection::NotFound(reference)))
}

fn format_human(node: &PathedNode) -> String {
    let mut lines = vec![node_line(node)];
    for (key, value) in node.node.metadata() {
        lines.push(format!("  {key}: {value}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::temp_context;
    use crate::output::{self, OutputFormat};
    use outline_store::NewNode;

    #[tokio::test]
    async fn fetch_by_index_and_path() {
        let (_dir, ctx) = temp_context();
        let mut outline = ctx.outline();
        outline.add_node("/", NewNode::volume("Book")).await.unwrap();
        outline.add_node("/v1", NewNode::act("Act")).await.unwrap();
        outline.add_node("/v1/a1", NewNode::plot_point("Beat")).await.unwrap();
        outline
            .add_node("/v1/a1/p1", NewNode::chapter("Storm", 7).with_metadata("pov", "Mara"))
            .await
            .unwrap();

        let node = fetch(&ctx, "c7".into()).await.unwrap();
        assert_eq!(node.path, "/v1/a1/p1/c7");
        let human = format_human(&node);
        assert!(human.starts_with("/v1/a1/p1/c7  chapter #7  Storm"));
        assert!(human.contains("pov: \"Mara\""));

        let mut buf = Vec::new();
        output::write_output(&mut buf, OutputFormat::Json, &node, format_human).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["path"], "/v1/a1/p1/c7");
        assert_eq!(parsed["type"], "chapter");
        assert_eq!(parsed["index"], 7);
    }

    #[tokio::test]
    async fn missing_node_is_not_found() {
        let (_dir, ctx) = temp_context();
        let err = fetch(&ctx, "/v3".into()).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Rejection>(), Some(&Rejection::NotFound("/v3".into())));
    }
}
