//! Strategy dispatch with an even-split fallback.

use super::baseline::EvenSplitBaseline;
use super::projector::ResultProjector;
use super::solver::ResourceReductionSolver;
use crate::registry::PerformanceModelRegistry;
use reclaim_kernel::backend::OptimizationBackend;
use reclaim_kernel::reduction::{
    ReductionDecision, ReductionError, ReductionPolicy, ReductionRequest, ReductionStrategy,
};
use std::sync::Arc;

/// Front door for reduction requests.
///
/// Both strategies share one registry and one executor rounding policy.
pub struct ReductionPlanner {
    solver: ResourceReductionSolver,
    baseline: EvenSplitBaseline,
}

impl ReductionPlanner {
    pub fn new(
        registry: Arc<PerformanceModelRegistry>,
        backend: Arc<dyn OptimizationBackend>,
        policy: ReductionPolicy,
    ) -> Self {
        let baseline = EvenSplitBaseline::new(
            Arc::clone(&registry),
            ResultProjector::new(policy.executor_rounding),
        );
        Self {
            solver: ResourceReductionSolver::new(registry, backend, policy),
            baseline,
        }
    }

    pub fn registry(&self) -> &Arc<PerformanceModelRegistry> {
        self.solver.registry()
    }

    pub fn solver(&self) -> &ResourceReductionSolver {
        &self.solver
    }

    pub fn plan(
        &self,
        request: &ReductionRequest,
        strategy: ReductionStrategy,
    ) -> Result<ReductionDecision, ReductionError> {
        match strategy {
            ReductionStrategy::Milp => self.solver.solve(request),
            ReductionStrategy::EvenSplit => self.baseline.split(request),
        }
    }

    /// MILP first; for two workloads a failed solve falls back to the even
    /// split. Validation errors are returned as is.
    pub fn plan_with_fallback(
        &self,
        request: &ReductionRequest,
    ) -> Result<ReductionDecision, ReductionError> {
        match self.solver.solve(request) {
            Err(e) if e.is_retryable() && request.bt_names.len() == 2 => {
                tracing::warn!(
                    "MILP reduction for '{}' failed ({}); falling back to even split",
                    request.lc_name,
                    e
                );
                self.baseline.split(request)
            }
            other => other,
        }
    }
}
