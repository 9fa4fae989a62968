// `outline delete`: remove a node and its subtree.

use clap::Args;
use serde::Serialize;

use super::{execute, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Node path, chapter index or `c`-prefixed index.
    pub reference: String,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub reference: String,
    pub removed: usize,
}

pub fn run(args: DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    report(format, execute(delete(ctx, args.reference)), format_human)
}

async fn delete(ctx: &Context, reference: String) -> anyhow::Result<DeleteResult> {
    let removed = ctx.outline().delete_node(&reference).await?;
    Ok(DeleteResult { reference, removed })
}

fn format_human(result: &DeleteResult) -> String {
    let noun = if result.removed == 1 { "node" } else { "nodes" };
    format!("Deleted {} ({} {noun})", result.reference, result.removed)
}
