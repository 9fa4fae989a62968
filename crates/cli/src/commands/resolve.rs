// `outline resolve`: turn a chapter reference into its canonical path.

use clap::Args;
use outline_store::Rejection;
use serde::Serialize;

use super::{execute, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// `51`, `c51` or a chapter path.
    pub reference: String,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub reference: String,
    pub path: String,
}

pub fn run(args: ResolveArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    report(format, execute(resolve(ctx, args.reference)), |r: &ResolveResult| r.path.clone())
}

async fn resolve(ctx: &Context, reference: String) -> anyhow::Result<ResolveResult> {
    let resolved = ctx.outline().resolve_reference(&reference).await?;
    match resolved {
        Some(path) => Ok(ResolveResult { reference, path }),
        None => Err(Rejection::NotFound(reference).into()),
    }
}
