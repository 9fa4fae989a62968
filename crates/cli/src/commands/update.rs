// `outline update`: patch a node's title, metadata or chapter index.

use clap::Args;
use outline_store::{NodePatch, Rejection};
use serde::Serialize;
use serde_json::Value;

use super::fields::NodeFields;
use super::{execute, report, Context};
use crate::exit_code::UsageError;
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Node path, chapter index or `c`-prefixed index.
    pub reference: String,

    #[command(flatten)]
    pub fields: NodeFields,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub path: String,
    /// Previous path when a chapter index change moved the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_from: Option<String>,
}

pub fn run(args: UpdateArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    report(format, execute(update(ctx, args)), format_human)
}

async fn update(ctx: &Context, args: UpdateArgs) -> anyhow::Result<UpdateResult> {
    let patch = NodePatch::from_json(Value::Object(args.fields.to_object()?))?;
    if patch.is_empty() {
        let message = "nothing to update: pass --title, --index, --meta or --data";
        return Err(UsageError(message.into()).into());
    }

    let mut outline = ctx.outline();
    let before = outline
        .get_node(&args.reference)
        .await?
        .map(|node| node.path)
        .ok_or_else(|| Rejection::NotFound(args.reference.clone()))?;
    let path = outline.update_node(&args.reference, patch).await?;
    let moved_from = (path != before).then_some(before);
    Ok(UpdateResult { path, moved_from })
}

fn format_human(result: &UpdateResult) -> String {
    match &result.moved_from {
        Some(from) => format!("Moved {from} -> {}", result.path),
        None => format!("Updated {}", result.path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::temp_context;
    use outline_store::NewNode;
    use serde_json::json;

    async fn seeded() -> (tempfile::TempDir, Context) {
        let (dir, ctx) = temp_context();
        let mut outline = ctx.outline();
        outline.add_node("/", NewNode::volume("Book")).await.unwrap();
        outline.add_node("/v1", NewNode::act("Act")).await.unwrap();
        outline.add_node("/v1/a1", NewNode::plot_point("Beat")).await.unwrap();
        outline.add_node("/v1/a1/p1", NewNode::chapter("Storm", 3)).await.unwrap();
        (dir, ctx)
    }

    fn args(reference: &str, fields: NodeFields) -> UpdateArgs {
        UpdateArgs { reference: reference.into(), fields, json: true }
    }

    #[tokio::test]
    async fn title_and_meta() {
        let (_dir, ctx) = seeded().await;
        let fields = NodeFields {
            title: Some("Opening".into()),
            meta: vec![("tone".into(), json!("dark"))],
            ..NodeFields::default()
        };
        let result = update(&ctx, args("/v1/a1", fields)).await.unwrap();
        assert_eq!(format_human(&result), "Updated /v1/a1");

        let node = ctx.outline().get_node("/v1/a1").await.unwrap().unwrap();
        assert_eq!(node.title(), "Opening");
        assert_eq!(node.node.metadata()["tone"], "dark");
    }

    #[tokio::test]
    async fn index_change_reports_the_move() {
        let (_dir, ctx) = seeded().await;
        let fields = NodeFields { index: Some(30), ..NodeFields::default() };
        let result = update(&ctx, args("3", fields)).await.unwrap();
        assert_eq!(result.path, "/v1/a1/p1/c30");
        assert_eq!(result.moved_from.as_deref(), Some("/v1/a1/p1/c3"));
        assert_eq!(format_human(&result), "Moved /v1/a1/p1/c3 -> /v1/a1/p1/c30");
    }

    #[tokio::test]
    async fn index_on_a_volume_is_rejected() {
        let (_dir, ctx) = seeded().await;
        let fields = NodeFields { index: Some(5), ..NodeFields::default() };
        let err = update(&ctx, args("/v1", fields)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Rejection>().map(Rejection::code), Some("INVALID_INPUT"));
    }

    #[tokio::test]
    async fn empty_patch_is_a_usage_error() {
        let (_dir, ctx) = seeded().await;
        let err = update(&ctx, args("/v1", NodeFields::default())).await.unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());
    }

    #[tokio::test]
    async fn missing_node_is_not_found() {
        let (_dir, ctx) = seeded().await;
        let fields = NodeFields { title: Some("x".into()), ..NodeFields::default() };
        let err = update(&ctx, args("/v9", fields)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Rejection>(), Some(&Rejection::NotFound("/v9".into())));
    }
}
