//! Optimization backend contract: problem model, solution and trait.
//!
//! # Architecture
//!
//! - The **problem model** ([`MipProblem`]) and the [`OptimizationBackend`]
//!   trait live here in `reclaim-kernel`.
//! - **Concrete solvers** (`BranchAndBoundBackend`) live in
//!   `reclaim-foundation`.
//!
//! A problem is a mixed-integer linear program: variables with bounds and an
//! integrality flag, linear equality/inequality rows, and a linear objective
//! with a direction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Problem model
// ---------------------------------------------------------------------------

/// Handle to a decision variable inside one [`MipProblem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Continuous,
    Integer,
}

/// A decision variable. Bounds may be infinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: VarKind,
}

/// `Σ coefficient·var + constant`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, var: VarId, coefficient: f64) -> Self {
        self.terms.push((var, coefficient));
        self
    }

    pub fn constant(mut self, value: f64) -> Self {
        self.constant += value;
        self
    }

    /// `Σ vars` with unit coefficients.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// Evaluate against a full assignment indexed by [`VarId`].
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coefficient)| coefficient * values.get(var.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// `expr == rhs`
    Eq,
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Whether `values` satisfies this row within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.relation {
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
            Relation::Le => lhs <= self.rhs + tolerance,
            Relation::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

/// A mixed-integer linear program under construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MipProblem {
    variables: Vec<Variable>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
    sense: Sense,
}

impl MipProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a continuous variable with bounds `[0, +inf)`.
    pub fn add_var(&mut self, name: impl Into<String>) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            lower: 0.0,
            upper: f64::INFINITY,
            kind: VarKind::Continuous,
        });
        VarId(self.variables.len() - 1)
    }

    pub fn set_lower_bound(&mut self, var: VarId, lower: f64) {
        if let Some(v) = self.variables.get_mut(var.0) {
            v.lower = lower;
        }
    }

    pub fn set_upper_bound(&mut self, var: VarId, upper: f64) {
        if let Some(v) = self.variables.get_mut(var.0) {
            v.upper = upper;
        }
    }

    pub fn set_kind(&mut self, var: VarId, kind: VarKind) {
        if let Some(v) = self.variables.get_mut(var.0) {
            v.kind = kind;
        }
    }

    pub fn set_integer(&mut self, var: VarId) {
        self.set_kind(var, VarKind::Integer);
    }

    pub fn add_constraint(&mut self, expr: LinearExpr, relation: Relation, rhs: f64) {
        self.constraints.push(LinearConstraint { expr, relation, rhs });
    }

    pub fn set_objective(&mut self, objective: LinearExpr, sense: Sense) {
        self.objective = objective;
        self.sense = sense;
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> Option<&Variable> {
        self.variables.get(var.0)
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Check bounds, integrality and every row for a candidate assignment.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let within_bounds = self.variables.iter().zip(values).all(|(var, &x)| {
            x >= var.lower - tolerance
                && x <= var.upper + tolerance
                && (var.kind == VarKind::Continuous || (x - x.round()).abs() <= tolerance)
        });
        within_bounds && self.constraints.iter().all(|c| c.is_satisfied(values, tolerance))
    }
}

// ---------------------------------------------------------------------------
// Solution
// ---------------------------------------------------------------------------

/// Final status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal solution found.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective can be improved without limit.
    Unbounded,
    /// The time limit elapsed before optimality was proven.
    TimedOut,
    /// The node or iteration budget ran out before optimality was proven.
    NodeLimit,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal"),
            Self::Infeasible => write!(f, "Infeasible"),
            Self::Unbounded => write!(f, "Unbounded"),
            Self::TimedOut => write!(f, "TimedOut"),
            Self::NodeLimit => write!(f, "NodeLimit"),
        }
    }
}

/// Backend answer. `values` is indexed by [`VarId`] and is empty unless a
/// feasible assignment was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MipSolution {
    pub status: SolveStatus,
    pub objective_value: f64,
    pub values: Vec<f64>,
    pub nodes_explored: usize,
}

impl MipSolution {
    /// A solution without an assignment.
    pub fn without_assignment(status: SolveStatus, nodes_explored: usize) -> Self {
        Self {
            status,
            objective_value: f64::NAN,
            values: Vec::new(),
            nodes_explored,
        }
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.0).copied()
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Per-call solve limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Wall-clock budget; `None` means unbounded.
    pub time_limit: Option<Duration>,
    /// Branch-and-bound node budget.
    pub max_nodes: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_secs(5)),
            max_nodes: 10_000,
        }
    }
}

impl SolveOptions {
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}

/// Errors a backend raises instead of a status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The problem uses a feature this backend cannot handle.
    #[error("Unsupported problem: {0}")]
    UnsupportedProblem(String),

    /// A row or the objective references a variable that was never declared.
    #[error("Unknown variable index {0}")]
    UnknownVariable(usize),

    /// The backend could not be reached or failed internally.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Numerical failure: {0}")]
    Numerical(String),
}

/// A mixed-integer linear programming solver.
///
/// Implementations must be stateless across calls or internally
/// synchronized; one backend instance is shared by every solve.
pub trait OptimizationBackend: Send + Sync {
    /// Short backend identifier for logs.
    fn name(&self) -> &str;

    /// Solve `problem` within `options`.
    ///
    /// Infeasibility, unboundedness and exhausted limits are reported through
    /// [`MipSolution::status`]; `Err` is reserved for problems the backend
    /// cannot process at all.
    fn solve(&self, problem: &MipProblem, options: &SolveOptions)
    -> Result<MipSolution, BackendError>;
}
