// `outline tree`: show the outline as a tree with paths.

use std::collections::BTreeMap;

use clap::Args;
use outline_common::nested::NestedOutline;
use outline_common::path::grammar;
use outline_common::types::{Node, NodeKind, PathedNode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{execute, report, Context};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Emit the nested volume/act/plot-point/chapter export instead.
    #[arg(long)]
    nested: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResult {
    #[serde(default)]
    pub volumes: Vec<TreeNode>,
    /// Nodes whose parent is missing from the document.
    #[serde(default)]
    pub orphans: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

pub fn run(args: TreeArgs, ctx: &Context) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    if args.nested {
        return report(format, execute(call_nested(ctx)), |nested: &NestedOutline| {
            serde_json::to_string_pretty(nested).unwrap_or_default()
        });
    }
    report(format, execute(call_tree(ctx)), format_human)
}

async fn call_tree(ctx: &Context) -> anyhow::Result<TreeResult> {
    let mut outline = ctx.outline();
    let nodes: Vec<PathedNode> = outline.snapshot().await?.nodes().collect();
    let result = build_tree(nodes);
    if result.orphans > 0 {
        warn!(orphans = result.orphans, "outline has nodes without a parent");
    }
    Ok(result)
}

async fn call_nested(ctx: &Context) -> anyhow::Result<NestedOutline> {
    Ok(ctx.outline().export_nested().await?)
}

fn build_tree(nodes: Vec<PathedNode>) -> TreeResult {
    let mut by_parent: BTreeMap<String, Vec<PathedNode>> = BTreeMap::new();
    for node in nodes {
        if let Some(parent) = grammar::parent(&node.path) {
            by_parent.entry(parent).or_default().push(node);
        }
    }
    let volumes = attach(grammar::ROOT, &mut by_parent);
    let orphans = by_parent.values().map(Vec::len).sum();
    TreeResult { volumes, orphans }
}

fn attach(parent: &str, by_parent: &mut BTreeMap<String, Vec<PathedNode>>) -> Vec<TreeNode> {
    let mut children = by_parent.remove(parent).unwrap_or_default();
    children.sort_by_key(|n| match &n.node {
        Node::Chapter(chapter) => chapter.index,
        _ => grammar::last_ordinal(&n.path).unwrap_or(u32::MAX),
    });
    children
        .into_iter()
        .map(|n| TreeNode {
            children: attach(&n.path, by_parent),
            kind: n.kind(),
            title: n.title().to_string(),
            index: n.node.chapter_index(),
            path: n.path,
        })
        .collect()
}

fn format_human(result: &TreeResult) -> String {
    if result.volumes.is_empty() {
        return "Outline is empty.".into();
    }
    let mut lines = Vec::new();
    for volume in &result.volumes {
        render_tree_node(&mut lines, volume, 0);
    }
    if result.orphans > 0 {
        lines.push(format!("({} orphaned node(s) not shown)", result.orphans));
    }
    lines.join("\n")
}

fn render_tree_node(lines: &mut Vec<String>, node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let prefix = if depth == 0 { "" } else { "├─ " };
    lines.push(format!("{indent}{prefix}{} [{}]", node.title, node.path));
    for child in &node.children {
        render_tree_node(lines, child, depth + 1);
    }
}
