// CLI subcommand dispatch and the state every command shares.

use std::future::Future;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Subcommand;
use outline_common::types::{Node, PathedNode};
use outline_store::config::OutlineConfig;
use outline_store::{JsonFileBackend, Outline};
use serde::Serialize;

use crate::output::{self, OutputFormat};

pub mod add;
pub mod chapters;
pub mod children;
pub mod delete;
pub mod fields;
pub mod get;
pub mod migrate;
pub mod resolve;
pub mod tree;
pub mod update;
pub mod window;

#[derive(Subcommand)]
pub enum Command {
    /// Show one node by path or chapter reference
    Get(get::GetArgs),
    /// List the direct children of a node
    Children(children::ChildrenArgs),
    /// Create a node under a parent
    Add(add::AddArgs),
    /// Change a node's title, metadata or chapter index
    Update(update::UpdateArgs),
    /// Delete a node and everything below it
    Delete(delete::DeleteArgs),
    /// Show a chapter with its neighbours
    Window(window::WindowArgs),
    /// List every chapter in reading order
    Chapters(chapters::ChaptersArgs),
    /// Resolve a chapter reference to its path
    Resolve(resolve::ResolveArgs),
    /// Import a nested outline, replacing the store
    Migrate(migrate::MigrateArgs),
    /// Show the whole outline as a tree
    Tree(tree::TreeArgs),
}

pub fn run(cmd: Command, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        Command::Get(args) => get::run(args, ctx),
        Command::Children(args) => children::run(args, ctx),
        Command::Add(args) => add::run(args, ctx),
        Command::Update(args) => update::run(args, ctx),
        Command::Delete(args) => delete::run(args, ctx),
        Command::Window(args) => window::run(args, ctx),
        Command::Chapters(args) => chapters::run(args, ctx),
        Command::Resolve(args) => resolve::run(args, ctx),
        Command::Migrate(args) => migrate::run(args, ctx),
        Command::Tree(args) => tree::run(args, ctx),
    }
}

/// Resolved configuration plus the document the command works on.
#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    pub config: OutlineConfig,
    pub document: PathBuf,
}

impl Context {
    /// Project root is the working directory. Flags win over config values.
    pub fn load(document: Option<PathBuf>, config: Option<PathBuf>) -> anyhow::Result<Self> {
        let root = std::env::current_dir().context("cannot determine working directory")?;
        let config = match config {
            Some(path) => OutlineConfig::load_from(&path)
                .with_context(|| format!("loading config `{}`", path.display()))?,
            None => OutlineConfig::load(&root),
        };
        Ok(Self::new(root, config, document))
    }

    pub fn new(root: PathBuf, config: OutlineConfig, document: Option<PathBuf>) -> Self {
        let document = match document {
            Some(path) if path.is_absolute() => path,
            Some(path) => root.join(path),
            None => config.resolve_document_path(&root),
        };
        Self { root, config, document }
    }

    pub fn outline(&self) -> Outline<JsonFileBackend> {
        Outline::new(self.config.backend(&self.document))
    }
}

/// Drive a command future on a current-thread runtime.
pub(crate) fn execute<T>(future: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?
        .block_on(future)
}

/// Print a command's result, or its error with a stable code.
pub(crate) fn report<T, F>(
    format: OutputFormat,
    result: anyhow::Result<T>,
    human_fn: F,
) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match result {
        Ok(value) => {
            output::print_output(format, &value, human_fn)?;
            Ok(())
        }
        Err(e) => {
            output::print_anyhow_error(format, &e);
            Err(e)
        }
    }
}

/// One-line summary: path, kind and title.
pub(crate) fn node_line(node: &PathedNode) -> String {
    match &node.node {
        Node::Chapter(chapter) => {
            format!("{}  chapter #{}  {}", node.path, chapter.index, chapter.title)
        }
        other => format!("{}  {}  {}", node.path, other.kind(), other.title()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// A context whose document lives in a fresh temp dir.
    pub fn temp_context() -> (TempDir, Context) {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(dir.path().to_path_buf(), OutlineConfig::default(), None);
        (dir, ctx)
    }
}
