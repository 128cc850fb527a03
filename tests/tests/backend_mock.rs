use reclaim_foundation::ResourceReductionSolver;
use reclaim_kernel::backend::{BackendError, MipSolution, SolveStatus};
use reclaim_kernel::reduction::{ReductionError, ReductionPolicy, ReductionRequest};
use reclaim_testing::{MockOptimizationBackend, ScriptedResponse, standard_registry};
use std::sync::Arc;
use std::time::Duration;

fn request() -> ReductionRequest {
    ReductionRequest::new("lc", 20, 12_000, ["TeraSort-job-1", "WordCount-job-2"])
}

#[test]
fn every_non_optimal_status_is_unsolved() {
    for status in [
        SolveStatus::Infeasible,
        SolveStatus::Unbounded,
        SolveStatus::TimedOut,
        SolveStatus::NodeLimit,
    ] {
        let backend = Arc::new(MockOptimizationBackend::with_status(status));
        let solver =
            ResourceReductionSolver::new(standard_registry(), backend, ReductionPolicy::default());
        assert_eq!(
            solver.solve(&request()),
            Err(ReductionError::Unsolved { status })
        );
    }
}

#[test]
fn backend_failure_is_reported() {
    let backend = Arc::new(MockOptimizationBackend::failing(BackendError::Unavailable(
        "solver host unreachable".into(),
    )));
    let solver =
        ResourceReductionSolver::new(standard_registry(), backend, ReductionPolicy::default());

    let err = solver.solve(&request()).unwrap_err();
    assert!(matches!(err, ReductionError::Backend(BackendError::Unavailable(_))));
    assert!(err.to_string().contains("unreachable"));
}

fn scripted(values: Vec<f64>) -> Arc<MockOptimizationBackend> {
    let backend = Arc::new(MockOptimizationBackend::new());
    backend.push_response(ScriptedResponse::Solution(MipSolution {
        status: SolveStatus::Optimal,
        objective_value: -1.0,
        values,
        nodes_explored: 1,
    }));
    backend
}

#[test]
fn near_integral_values_are_rounded() {
    // cores, mem per workload, in request order
    let backend = scripted(vec![10.9999999, 6561.0000002, 9.0000001, 5438.9999998]);
    let solver =
        ResourceReductionSolver::new(standard_registry(), backend, ReductionPolicy::default());

    let decision = solver.solve(&request()).unwrap();
    assert_eq!(decision.reductions[0].reduced_cores, 11);
    assert_eq!(decision.reductions[0].reduced_mem, 6561);
    assert_eq!(decision.reductions[1].reduced_cores, 9);
    assert_eq!(decision.reductions[1].reduced_mem, 5439);
    assert_eq!(decision.total_reduced_cores(), 20);
    assert_eq!(decision.total_reduced_mem(), 12_000);
    // Recomputed from the rounded reductions, not taken from the backend.
    assert_eq!(decision.objective_value, decision.aggregate_loss());
    assert_ne!(decision.objective_value, -1.0);
}

#[test]
fn half_integral_values_breaking_targets_are_rejected() {
    // Each pair sums to the target, but rounding half away from zero adds one.
    let backend = scripted(vec![10.5, 6561.5, 9.5, 5438.5]);
    let solver =
        ResourceReductionSolver::new(standard_registry(), backend, ReductionPolicy::default());

    assert!(matches!(
        solver.solve(&request()),
        Err(ReductionError::Backend(BackendError::Numerical(_)))
    ));
}

#[test]
fn rounded_values_below_lower_bound_are_rejected() {
    // TeraSort must give up at least one 9-core executor.
    let backend = scripted(vec![2.0, 6561.0, 18.0, 5439.0]);
    let solver =
        ResourceReductionSolver::new(standard_registry(), backend, ReductionPolicy::default());

    assert!(matches!(
        solver.solve(&request()),
        Err(ReductionError::Backend(BackendError::Numerical(_)))
    ));
}

#[test]
fn time_limit_reaches_the_backend() {
    let backend = Arc::new(MockOptimizationBackend::new());
    let limit = Some(Duration::from_millis(250));
    let policy = ReductionPolicy::default().with_time_limit(limit);
    let solver = ResourceReductionSolver::new(standard_registry(), backend.clone(), policy);

    solver.solve(&request()).unwrap();
    assert_eq!(backend.last_options().unwrap().time_limit, limit);
}
