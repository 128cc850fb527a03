//! Loss-minimizing split of a reduction target across 2 or 3 BT workloads.
//!
//! For workloads `i = 1..N` the solver builds
//!
//! ```text
//! minimize   Σ coe_cpu_i * cores_i + coe_mem_i * mem_i + c_i
//! subject to Σ cores_i = target_cpus
//!            Σ mem_i   = target_mem
//!            lower_bound_reduced_cores_i <= cores_i <= cap(N)
//!            lower_bound_reduced_mem_i   <= mem_i
//!            cores_i, mem_i integer
//! ```
//!
//! and hands it to an [`OptimizationBackend`]. `cap(N)` comes from the
//! [`ReductionPolicy`].

use super::projector::ResultProjector;
use crate::registry::PerformanceModelRegistry;
use reclaim_kernel::backend::{
    BackendError, LinearExpr, MipProblem, MipSolution, OptimizationBackend, Relation, Sense,
    VarId,
};
use reclaim_kernel::model::PerformanceModel;
use reclaim_kernel::reduction::{
    MAX_BT_WORKLOADS, MIN_BT_WORKLOADS, ReductionDecision, ReductionError, ReductionPolicy,
    ReductionRequest, ReductionStrategy,
};
use std::sync::Arc;
use uuid::Uuid;

/// Decision variables of one workload.
#[derive(Debug, Clone, Copy)]
struct WorkloadVars {
    cores: VarId,
    mem: VarId,
}

pub struct ResourceReductionSolver {
    registry: Arc<PerformanceModelRegistry>,
    backend: Arc<dyn OptimizationBackend>,
    policy: ReductionPolicy,
    projector: ResultProjector,
}

impl ResourceReductionSolver {
    pub fn new(
        registry: Arc<PerformanceModelRegistry>,
        backend: Arc<dyn OptimizationBackend>,
        policy: ReductionPolicy,
    ) -> Self {
        let projector = ResultProjector::new(policy.executor_rounding);
        Self {
            registry,
            backend,
            policy,
            projector,
        }
    }

    pub fn registry(&self) -> &Arc<PerformanceModelRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> &ReductionPolicy {
        &self.policy
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Split `request` across its BT workloads at minimum predicted loss.
    ///
    /// # Errors
    ///
    /// - [`ReductionError::UnsupportedWorkloadCount`] unless 2 or 3 names
    ///   are given.
    /// - [`ReductionError::DuplicateWorkload`] if a name repeats.
    /// - [`ReductionError::UnknownWorkload`] if a name was never registered.
    /// - [`ReductionError::Unsolved`] if the backend ends without an optimum.
    /// - [`ReductionError::Backend`] if the backend rejects the problem.
    pub fn solve(&self, request: &ReductionRequest) -> Result<ReductionDecision, ReductionError> {
        request.validate_shape(MIN_BT_WORKLOADS..=MAX_BT_WORKLOADS)?;
        let models = self.resolve(request)?;

        let count = models.len();
        let cap = self
            .policy
            .core_cap(count)
            .ok_or(ReductionError::UnsupportedWorkloadCount { count })?;
        let (problem, vars) = self.formulate(request, &models, cap);

        tracing::debug!(
            "Reduction for '{}': {} cores / {} MB across {:?}, core cap {}, backend {}",
            request.lc_name,
            request.target_cpus,
            request.target_mem,
            request.bt_names,
            cap,
            self.backend.name()
        );

        let solution = self
            .backend
            .solve(&problem, &self.policy.solve_options())
            .inspect_err(|e| tracing::warn!("Backend '{}' failed: {}", self.backend.name(), e))?;

        if !solution.status.is_optimal() {
            tracing::info!(
                "No reduction for '{}': backend finished {} after {} nodes",
                request.lc_name,
                solution.status,
                solution.nodes_explored
            );
            return Err(ReductionError::Unsolved {
                status: solution.status,
            });
        }

        let rounded = round_assignment(&problem, &solution)?;
        if !problem.is_feasible(&rounded, FEASIBILITY_TOL) {
            tracing::warn!(
                "Backend '{}' returned {:?}, infeasible once rounded",
                self.backend.name(),
                solution.values
            );
            return Err(
                BackendError::Numerical(format!("rounded assignment {rounded:?} is infeasible"))
                    .into(),
            );
        }

        let mut reductions = Vec::with_capacity(count);
        for ((name, model), v) in request.bt_names.iter().zip(&models).zip(&vars) {
            let cores = rounded[v.cores.index()] as u32;
            let mem = rounded[v.mem.index()] as u64;
            reductions.push(self.projector.record(name, model, cores, mem));
        }

        let mut decision = ReductionDecision {
            id: Uuid::new_v4(),
            lc_name: request.lc_name.clone(),
            strategy: ReductionStrategy::Milp,
            target_cpus: request.target_cpus,
            target_mem: request.target_mem,
            reductions,
            objective_value: 0.0,
        };
        decision.objective_value = decision.aggregate_loss();

        tracing::info!(
            "Reduction {} for '{}': loss {:.6} after {} nodes",
            decision.id,
            decision.lc_name,
            decision.objective_value,
            solution.nodes_explored
        );
        for r in &decision.reductions {
            tracing::debug!(
                "  {} ({}): {} cores, {} MB, {} executors, {} MB per executor",
                r.workload,
                r.model,
                r.reduced_cores,
                r.reduced_mem,
                r.reduced_executors,
                r.reduced_per_mem
            );
        }

        Ok(decision)
    }

    fn resolve(
        &self,
        request: &ReductionRequest,
    ) -> Result<Vec<Arc<PerformanceModel>>, ReductionError> {
        request
            .bt_names
            .iter()
            .map(|name| {
                self.registry.lookup(name).ok_or_else(|| {
                    tracing::warn!(
                        "Reduction for '{}' rejected: workload '{}' is not registered",
                        request.lc_name,
                        name
                    );
                    ReductionError::UnknownWorkload(name.clone())
                })
            })
            .collect()
    }

    fn formulate(
        &self,
        request: &ReductionRequest,
        models: &[Arc<PerformanceModel>],
        cap: u32,
    ) -> (MipProblem, Vec<WorkloadVars>) {
        let mut problem = MipProblem::new();
        let mut objective = LinearExpr::new();

        let vars: Vec<WorkloadVars> = request
            .bt_names
            .iter()
            .zip(models)
            .map(|(name, model)| {
                let cores = problem.add_var(format!("{name}.cores"));
                problem.set_integer(cores);
                problem.set_lower_bound(cores, f64::from(model.lower_bound_reduced_cores()));
                problem.set_upper_bound(cores, f64::from(cap));

                let mem = problem.add_var(format!("{name}.mem"));
                problem.set_integer(mem);
                problem.set_lower_bound(mem, model.lower_bound_reduced_mem() as f64);

                objective = std::mem::take(&mut objective)
                    .term(cores, model.coe_cpu)
                    .term(mem, model.coe_mem)
                    .constant(model.intercept);

                WorkloadVars { cores, mem }
            })
            .collect();

        problem.add_constraint(
            LinearExpr::sum(vars.iter().map(|v| v.cores)),
            Relation::Eq,
            f64::from(request.target_cpus),
        );
        problem.add_constraint(
            LinearExpr::sum(vars.iter().map(|v| v.mem)),
            Relation::Eq,
            request.target_mem as f64,
        );
        problem.set_objective(objective, Sense::Minimize);

        (problem, vars)
    }
}

/// Rounding slack allowed on bounds and equalities after rounding.
const FEASIBILITY_TOL: f64 = 1e-6;

/// Every variable of `problem` rounded to the nearest integer.
fn round_assignment(
    problem: &MipProblem,
    solution: &MipSolution,
) -> Result<Vec<f64>, BackendError> {
    (0..problem.num_vars())
        .map(|index| {
            let value = solution
                .value(VarId(index))
                .ok_or(BackendError::UnknownVariable(index))?;
            if !value.is_finite() {
                return Err(BackendError::Numerical(format!("variable {index} is {value}")));
            }
            Ok(value.round())
        })
        .collect()
}
