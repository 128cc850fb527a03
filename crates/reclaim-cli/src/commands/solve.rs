//! `reclaim solve` command implementation

use super::CliContext;
use crate::CliResult;
use crate::cli::StrategyArg;
use crate::output::{OutputFormat, table, to_json};
use reclaim_foundation::{BranchAndBoundBackend, ReductionPlanner};
use reclaim_kernel::reduction::{ReductionDecision, ReductionRequest, ReductionStrategy};
use std::sync::Arc;

/// Execute the `reclaim solve` command
pub fn run(
    context: &CliContext,
    lc: String,
    cpus: u32,
    mem: u64,
    strategy: StrategyArg,
    workloads: Vec<String>,
    format: OutputFormat,
) -> CliResult<String> {
    let registry = context.registry();
    registry.register_all(&workloads);

    let planner = ReductionPlanner::new(
        registry,
        Arc::new(BranchAndBoundBackend::new()),
        context.config.policy.clone(),
    );
    let request = ReductionRequest::new(lc, cpus, mem, workloads);

    let decision = match strategy {
        StrategyArg::Milp => planner.plan(&request, ReductionStrategy::Milp)?,
        StrategyArg::EvenSplit => planner.plan(&request, ReductionStrategy::EvenSplit)?,
        StrategyArg::MilpFallback => planner.plan_with_fallback(&request)?,
    };

    match format {
        OutputFormat::Json => to_json(&decision),
        OutputFormat::Text => Ok(render(&decision)),
    }
}

fn render(decision: &ReductionDecision) -> String {
    let mut table = table(&[
        "Workload",
        "Model",
        "Cores",
        "Memory (MB)",
        "Executors",
        "Per-executor MB",
        "Predicted loss",
    ]);
    for r in &decision.reductions {
        table.add_row(vec![
            r.workload.clone(),
            r.model.clone(),
            r.reduced_cores.to_string(),
            r.reduced_mem.to_string(),
            r.reduced_executors.to_string(),
            r.reduced_per_mem.to_string(),
            format!("{:.6}", r.predicted_loss),
        ]);
    }

    format!(
        "Reduction for '{}' ({}): {} cores, {} MB\n{}\nObjective: {:.6}",
        decision.lc_name,
        decision.strategy,
        decision.target_cpus,
        decision.target_mem,
        table,
        decision.objective_value
    )
}
