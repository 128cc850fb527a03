//! Depth-first branch and bound on top of the dense simplex.

use super::simplex::{DenseLp, LpOutcome};
use reclaim_kernel::backend::{
    BackendError, MipProblem, MipSolution, OptimizationBackend, SolveOptions, SolveStatus, VarKind,
};
use std::time::Instant;

/// Distance from the nearest integer still treated as integral.
const INTEGRALITY_TOL: f64 = 1e-6;
/// Bound improvement required before a node is explored further.
const PRUNE_TOL: f64 = 1e-9;

/// One branch-and-bound subproblem: the root bounds tightened by branching.
#[derive(Debug, Clone)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

#[derive(Debug, Clone)]
struct Incumbent {
    cost: f64,
    values: Vec<f64>,
}

/// In-process MILP solver.
///
/// Solves the LP relaxation of every node with a two-phase dense simplex
/// and branches on the first fractional integer variable, exploring the
/// rounded-down child first. Suited to the small problems produced by the
/// reduction solver (a handful of variables and rows).
#[derive(Debug, Clone, Default)]
pub struct BranchAndBoundBackend;

impl BranchAndBoundBackend {
    pub fn new() -> Self {
        Self
    }
}

impl OptimizationBackend for BranchAndBoundBackend {
    fn name(&self) -> &str {
        "branch-and-bound"
    }

    fn solve(
        &self,
        problem: &MipProblem,
        options: &SolveOptions,
    ) -> Result<MipSolution, BackendError> {
        if let Some(var) = problem.variables().iter().find(|v| !v.lower.is_finite()) {
            return Err(BackendError::UnsupportedProblem(format!(
                "variable '{}' has no finite lower bound",
                var.name
            )));
        }

        let lp = DenseLp::from_problem(problem)?;
        let deadline = options
            .time_limit
            .and_then(|limit| Instant::now().checked_add(limit));
        let integers: Vec<usize> = problem
            .variables()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.kind == VarKind::Integer)
            .map(|(j, _)| j)
            .collect();

        let mut stack = vec![Node {
            lower: problem.variables().iter().map(|v| v.lower).collect(),
            upper: problem.variables().iter().map(|v| v.upper).collect(),
        }];
        let mut incumbent: Option<Incumbent> = None;
        let mut nodes = 0usize;

        while let Some(node) = stack.pop() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(finish(problem, SolveStatus::TimedOut, incumbent, nodes));
            }
            if nodes >= options.max_nodes {
                return Ok(finish(problem, SolveStatus::NodeLimit, incumbent, nodes));
            }
            nodes += 1;

            let (values, cost) = match lp.solve(&node.lower, &node.upper, deadline)? {
                LpOutcome::Optimal { values, objective } => (values, objective),
                LpOutcome::Infeasible => continue,
                LpOutcome::Unbounded => {
                    tracing::debug!("LP relaxation unbounded after {} nodes", nodes);
                    return Ok(MipSolution::without_assignment(
                        SolveStatus::Unbounded,
                        nodes,
                    ));
                }
                LpOutcome::TimedOut => {
                    return Ok(finish(problem, SolveStatus::TimedOut, incumbent, nodes));
                }
            };

            if incumbent
                .as_ref()
                .is_some_and(|best| cost >= best.cost - PRUNE_TOL)
            {
                continue;
            }

            let fractional = integers.iter().copied().find(|&j| {
                let x = values[j];
                (x - x.round()).abs() > INTEGRALITY_TOL
            });

            match fractional {
                None => {
                    let mut values = values;
                    for &j in &integers {
                        values[j] = values[j].round();
                    }
                    let cost = lp.cost(&values);
                    incumbent = Some(Incumbent { cost, values });
                }
                Some(j) => {
                    let x = values[j];
                    let mut up = node.clone();
                    up.lower[j] = x.ceil();
                    let mut down = node;
                    down.upper[j] = x.floor();
                    // Popped last-in first-out: down is explored first.
                    stack.push(up);
                    stack.push(down);
                }
            }
        }

        let status = if incumbent.is_some() {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        };
        tracing::debug!(
            "Branch and bound finished: {} after {} nodes",
            status,
            nodes
        );
        Ok(finish(problem, status, incumbent, nodes))
    }
}

fn finish(
    problem: &MipProblem,
    status: SolveStatus,
    incumbent: Option<Incumbent>,
    nodes: usize,
) -> MipSolution {
    match incumbent {
        Some(best) => MipSolution {
            status,
            objective_value: problem.objective().evaluate(&best.values),
            values: best.values,
            nodes_explored: nodes,
        },
        None => MipSolution::without_assignment(status, nodes),
    }
}
