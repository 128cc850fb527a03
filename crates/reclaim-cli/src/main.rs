//! Reclaim CLI - Compute resource reductions for co-located workloads

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use commands::CliContext;
pub use error::{CliError, CliResult};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = cli.output.unwrap_or_default();
    let context = CliContext::load(
        cli.config.as_deref(),
        cli.catalog.as_deref(),
        cli.profile,
    )?;

    let rendered = match cli.command {
        Commands::Solve {
            lc,
            cpus,
            mem,
            strategy,
            workloads,
        } => commands::solve::run(&context, lc, cpus, mem, strategy, workloads, format)?,
        Commands::Catalog => commands::catalog::run(&context, format)?,
        Commands::Resolve { names } => commands::resolve::run(&context, &names, format)?,
    };

    println!("{rendered}");
    Ok(())
}
