// `outline add`: create a node under a parent.

use clap::Args;
use outline_store::NewNode;
use serde::Serialize;
use serde_json::Value;

use super::fields::NodeFields;
use super::{execute, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Parent path; `/` for a new volume.
    pub parent: String,

    /// Node type: volume, act, plot_point or chapter.
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    #[command(flatten)]
    pub fields: NodeFields,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddResult {
    pub path: String,
}

pub fn run(args: AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    report(format, execute(add(ctx, args)), format_human)
}

async fn add(ctx: &Context, args: AddArgs) -> anyhow::Result<AddResult> {
    let mut object = args.fields.to_object()?;
    if let Some(kind) = args.kind {
        object.insert("type".into(), Value::String(kind));
    }
    let input = NewNode::from_json(Value::Object(object))?;
    let path = ctx.outline().add_node(&args.parent, input).await?;
    Ok(AddResult { path })
}

fn format_human(result: &AddResult) -> String {
    format!("Created {}", result.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::temp_context;
    use outline_store::{OutlineError, Rejection};

    fn args(parent: &str, kind: &str, title: &str, index: Option<u32>) -> AddArgs {
        AddArgs {
            parent: parent.into(),
            kind: Some(kind.into()),
            fields: NodeFields { title: Some(title.into()), index, ..NodeFields::default() },
            json: true,
        }
    }

    #[tokio::test]
    async fn builds_a_full_branch() {
        let (_dir, ctx) = temp_context();
        assert_eq!(add(&ctx, args("/", "volume", "Book", None)).await.unwrap().path, "/v1");
        assert_eq!(add(&ctx, args("/v1", "act", "Setup", None)).await.unwrap().path, "/v1/a1");
        assert_eq!(
            add(&ctx, args("/v1/a1", "plot-point", "Hook", None)).await.unwrap().path,
            "/v1/a1/p1"
        );
        let result = add(&ctx, args("/v1/a1/p1", "chapter", "Storm", Some(42))).await.unwrap();
        assert_eq!(result.path, "/v1/a1/p1/c42");
        assert_eq!(format_human(&result), "Created /v1/a1/p1/c42");
        assert!(ctx.document.exists());
    }

    #[tokio::test]
    async fn type_may_come_from_data() {
        let (_dir, ctx) = temp_context();
        let args = AddArgs {
            parent: "/".into(),
            kind: None,
            fields: NodeFields {
                data: Some(r#"{"type":"volume","title":"Book","genre":"fantasy"}"#.into()),
                ..NodeFields::default()
            },
            json: true,
        };
        assert_eq!(add(&ctx, args).await.unwrap().path, "/v1");
        let node = ctx.outline().get_node("/v1").await.unwrap().unwrap();
        assert_eq!(node.node.metadata()["genre"], "fantasy");
    }

    #[tokio::test]
    async fn unknown_type_is_rejected() {
        let (_dir, ctx) = temp_context();
        let err = add(&ctx, args("/", "scene", "x", None)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Rejection>(), Some(&Rejection::InvalidType("scene".into())));
    }

    #[tokio::test]
    async fn act_at_root_is_a_type_mismatch() {
        let (_dir, ctx) = temp_context();
        let err = add(&ctx, args("/", "act", "Orphan", None)).await.unwrap_err();
        let outline_err = err.downcast_ref::<OutlineError>().unwrap();
        assert_eq!(outline_err.code(), "TYPE_MISMATCH");
        assert!(!ctx.document.exists(), "rejections never write");
    }
}
