mod check;
mod cli;
mod create;
mod fs;
mod metrics_runtime;
mod mount;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    match cli.command {
        Command::Mount(args) => mount::run_mount(args).await,
        Command::Create(args) => create::run_create(&args),
        Command::Check(args) => check::run_check(&args),
    }
}
