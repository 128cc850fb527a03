//! End-to-end reduction scenarios across registry, solver and projector.

use reclaim_foundation::{
    BranchAndBoundBackend, PerformanceModelRegistry, ReductionPlanner, ResourceReductionSolver,
};
use reclaim_kernel::backend::SolveStatus;
use reclaim_kernel::reduction::{
    ExecutorRounding, ReductionError, ReductionPolicy, ReductionRequest, ReductionStrategy,
};
use reclaim_testing::{assert_backend_called, registry_with, standard_registry};
use reclaim_testing::{MockOptimizationBackend, ScriptedResponse};
use std::sync::Arc;

fn planner(registry: Arc<PerformanceModelRegistry>) -> ReductionPlanner {
    ReductionPlanner::new(
        registry,
        Arc::new(BranchAndBoundBackend::new()),
        ReductionPolicy::default(),
    )
}

#[test]
fn terasort_wordcount_small_target_is_infeasible() {
    let planner = planner(registry_with(["TeraSort-job-1", "WordCount-job-2"]));
    let request =
        ReductionRequest::new("memcached", 10, 5000, ["TeraSort-job-1", "WordCount-job-2"]);

    let err = planner.plan(&request, ReductionStrategy::Milp).unwrap_err();
    assert_eq!(
        err,
        ReductionError::Unsolved {
            status: SolveStatus::Infeasible
        }
    );
    assert!(err.is_retryable());
}

#[test]
fn terasort_wordcount_feasible_target() {
    let planner = planner(registry_with(["TeraSort-job-1", "WordCount-job-2"]));
    let request =
        ReductionRequest::new("memcached", 20, 12_000, ["TeraSort-job-1", "WordCount-job-2"]);
    let decision = planner.plan(&request, ReductionStrategy::Milp).unwrap();

    let summary: Vec<_> = decision
        .reductions
        .iter()
        .map(|r| (r.model.as_str(), r.reduced_cores, r.reduced_mem, r.reduced_executors))
        .collect();
    assert_eq!(
        summary,
        vec![("TeraSort", 11, 6561, 2), ("WordCount", 9, 5439, 1)]
    );
    assert!((decision.objective_value - decision.aggregate_loss()).abs() < 1e-9);

    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["reductions"][0]["reduced_per_mem"], -546);
    assert_eq!(json["reductions"][1]["kind"], "word-count");
}

#[test]
fn floor_rounding_changes_only_the_projection() {
    let policy = ReductionPolicy::default().with_executor_rounding(ExecutorRounding::Floor);
    let planner = ReductionPlanner::new(
        registry_with(["TeraSort-job-1", "WordCount-job-2"]),
        Arc::new(BranchAndBoundBackend::new()),
        policy,
    );
    let request =
        ReductionRequest::new("memcached", 20, 12_000, ["TeraSort-job-1", "WordCount-job-2"]);
    let decision = planner.plan(&request, ReductionStrategy::Milp).unwrap();

    let terasort = decision.reduction_for("TeraSort-job-1").unwrap();
    assert_eq!(terasort.reduced_cores, 11);
    assert_eq!(terasort.reduced_executors, 1);
    assert_eq!(terasort.reduced_per_mem, 0);
}

#[test]
fn three_workload_equalities_and_caps_hold() {
    let registry = standard_registry();
    let planner = planner(Arc::clone(&registry));

    for (cpus, mem) in [(11, 8757), (18, 12_000), (30, 20_000), (36, 40_000)] {
        let request = ReductionRequest::new("nginx", cpus, mem, ["LDA-3", "ALS-4", "SVM-5"]);
        let decision = planner.plan(&request, ReductionStrategy::Milp).unwrap();

        assert_eq!(decision.total_reduced_cores(), u64::from(cpus));
        assert_eq!(decision.total_reduced_mem(), mem);
        for r in &decision.reductions {
            let model = registry.lookup(&r.workload).unwrap();
            assert!(r.reduced_cores <= 12, "{} over cap at {cpus}", r.workload);
            assert!(r.reduced_cores >= model.lower_bound_reduced_cores());
            assert!(r.reduced_mem >= model.lower_bound_reduced_mem());
            assert!(r.reduced_executors <= model.overall_executors());
        }
        assert!((decision.objective_value - decision.aggregate_loss()).abs() < 1e-9);
    }
}

#[test]
fn two_workload_milp_beats_every_feasible_integer_split() {
    let registry = standard_registry();
    let planner = planner(Arc::clone(&registry));
    let request = ReductionRequest::new("lc", 14, 9000, ["SVM-5", "ALS-4"]);
    let decision = planner.plan(&request, ReductionStrategy::Milp).unwrap();

    let svm = registry.lookup("SVM-5").unwrap();
    let als = registry.lookup("ALS-4").unwrap();
    let mut best = f64::INFINITY;
    for svm_cores in svm.lower_bound_reduced_cores()..=20 {
        let Some(als_cores) = 14u32.checked_sub(svm_cores) else {
            continue;
        };
        if als_cores < als.lower_bound_reduced_cores() || als_cores > 20 {
            continue;
        }
        // Memory terms are linear, so only the extreme splits matter.
        for svm_mem in [svm.lower_bound_reduced_mem(), 9000 - als.lower_bound_reduced_mem()] {
            let als_mem = 9000 - svm_mem;
            let loss = svm.predicted_loss(f64::from(svm_cores), svm_mem as f64)
                + als.predicted_loss(f64::from(als_cores), als_mem as f64);
            best = best.min(loss);
        }
    }

    assert!((decision.objective_value - best).abs() < 1e-9);
}

#[test]
fn registry_shared_across_planners_is_not_mutated_by_solves() {
    let registry = standard_registry();
    let names_before = registry.names();
    let first = planner(Arc::clone(&registry));
    let second = planner(Arc::clone(&registry));

    let request = ReductionRequest::new("lc", 20, 12_000, ["TeraSort-job-1", "WordCount-job-2"]);
    let a = first.plan(&request, ReductionStrategy::Milp).unwrap();
    let b = second.plan(&request, ReductionStrategy::Milp).unwrap();

    assert_eq!(a.reductions, b.reductions);
    assert_ne!(a.id, b.id);
    assert_eq!(registry.names(), names_before);
    let model = registry.lookup("TeraSort-job-1").unwrap();
    assert_eq!(model.min_reduced_executors, 1);
}

#[test]
fn solver_sends_one_bounded_problem_per_request() {
    let backend = Arc::new(MockOptimizationBackend::new());
    let solver = ResourceReductionSolver::new(
        standard_registry(),
        backend.clone(),
        ReductionPolicy::default(),
    );

    let request = ReductionRequest::new("lc", 18, 12_000, ["LDA-3", "ALS-4", "SVM-5"]);
    solver.solve(&request).unwrap();
    assert_backend_called!(backend, 1);

    let problem = backend.last_problem().unwrap();
    assert_eq!(problem.num_vars(), 6);
    assert_eq!(problem.constraints().len(), 2);
    for var in problem.variables().iter().filter(|v| v.name.ends_with(".cores")) {
        assert_eq!(var.upper, 12.0);
    }
    let lda_cores = problem
        .variables()
        .iter()
        .find(|v| v.name == "LDA-3.cores")
        .unwrap();
    assert_eq!(lda_cores.lower, 5.0);

    let options = backend.last_options().unwrap();
    assert_eq!(options.max_nodes, 10_000);
}

#[test]
fn scripted_timeout_then_fallback() {
    let backend = Arc::new(MockOptimizationBackend::new());
    backend.push_response(ScriptedResponse::Status(SolveStatus::TimedOut));
    let planner = ReductionPlanner::new(
        standard_registry(),
        backend.clone(),
        ReductionPolicy::default(),
    );
    let request = ReductionRequest::new("lc", 20, 12_000, ["TeraSort-job-1", "WordCount-job-2"]);

    let decision = planner.plan_with_fallback(&request).unwrap();
    assert_eq!(decision.strategy, ReductionStrategy::EvenSplit);

    // The script is exhausted; the next call reaches the real solver.
    let decision = planner.plan_with_fallback(&request).unwrap();
    assert_eq!(decision.strategy, ReductionStrategy::Milp);
    assert_backend_called!(backend, 2);
}

#[test]
fn validation_errors_never_reach_the_backend() {
    let backend = Arc::new(MockOptimizationBackend::new());
    let solver = ResourceReductionSolver::new(
        standard_registry(),
        backend.clone(),
        ReductionPolicy::default(),
    );

    for request in [
        ReductionRequest::new("lc", 10, 10, ["LDA-3"]),
        ReductionRequest::new("lc", 10, 10, ["LDA-3", "LDA-3"]),
        ReductionRequest::new("lc", 10, 10, ["LDA-3", "GBT-Gradient-9"]),
    ] {
        assert!(solver.solve(&request).is_err());
    }
    assert_backend_called!(backend, 0);
}
