// outline CLI entry point.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use outline_store::config::OutlineConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_code;
mod output;

use exit_code::ExitCode;
use output::OutputFormat;

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "outline", about = "Path-addressed story outline store")]
struct Cli {
    /// Outline document to operate on (overrides the configured path).
    #[arg(long, global = true, value_name = "PATH")]
    document: Option<PathBuf>,

    /// Config file to use instead of the project/global lookup.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();

    let ctx = match commands::Context::load(cli.document, cli.config) {
        Ok(ctx) => ctx,
        Err(error) => {
            output::print_anyhow_error(OutputFormat::detect(false), &error);
            return ExitCode::from_error(&error).into();
        }
    };
    init_tracing(&ctx.config);

    match commands::run(cli.command, &ctx) {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => ExitCode::from_error(&error).into(),
    }
}

/// Diagnostics go to stderr so stdout stays parseable.
fn init_tracing(config: &OutlineConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
