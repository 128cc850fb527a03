//! CLI command definitions using clap

use crate::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use reclaim_kernel::catalog::CatalogProfile;
use std::path::PathBuf;

/// Reclaim CLI - Split LC resource requests across co-located BT workloads
#[derive(Parser)]
#[command(name = "reclaim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<OutputFormat>,

    /// Configuration file path (policy and catalog selection)
    #[arg(short = 'c', long, global = true, env = "RECLAIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalog file, overriding the configured one
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Built-in catalog profile (standard, huge-inputs)
    #[arg(long, global = true)]
    pub profile: Option<CatalogProfile>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Split a reduction target across 2 or 3 BT workloads
    Solve {
        /// Requesting latency-critical workload
        #[arg(long, default_value = "lc")]
        lc: String,

        /// Cores to reclaim
        #[arg(long)]
        cpus: u32,

        /// Memory to reclaim, in MB
        #[arg(long)]
        mem: u64,

        /// Reduction strategy
        #[arg(short, long, value_enum, default_value_t = StrategyArg::Milp)]
        strategy: StrategyArg,

        /// BT workload instance names
        #[arg(required = true, num_args = 1..)]
        workloads: Vec<String>,
    },

    /// List the loaded workload catalog
    Catalog,

    /// Show which catalog type each instance name resolves to
    Resolve {
        /// Instance names
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
}

/// Strategy selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Loss-minimizing MILP
    Milp,
    /// Half of the target from each of two workloads
    EvenSplit,
    /// MILP, falling back to the even split for two workloads
    MilpFallback,
}
