//! Dense two-phase primal simplex over bounded variables.
//!
//! Each variable `x_j` with bounds `[l_j, u_j]` is shifted to `y_j = x_j - l_j
//! >= 0`; a finite upper bound becomes an extra `y_j <= u_j - l_j` row. Rows
//! are normalized to a non-negative right-hand side and given slack, surplus
//! and artificial columns. Phase 1 minimizes the artificial sum; phase 2
//! minimizes the real costs with artificial columns barred from entering.
//! Bland's rule picks both the entering and the leaving column, so the method
//! cannot cycle.

use reclaim_kernel::backend::{BackendError, MipProblem, Relation, Sense};
use std::time::Instant;

/// Pivot and reduced-cost tolerance.
const EPS: f64 = 1e-9;
/// Phase 1 residual accepted as feasible, scaled by the largest rhs.
const FEAS_TOL: f64 = 1e-7;

/// Result of one LP relaxation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LpOutcome {
    /// `values` is indexed like the problem variables; `objective` is in
    /// minimization form and excludes the objective constant.
    Optimal { values: Vec<f64>, objective: f64 },
    Infeasible,
    Unbounded,
    TimedOut,
}

#[derive(Debug, Clone)]
struct DenseRow {
    coeffs: Vec<f64>,
    relation: Relation,
    rhs: f64,
}

/// A [`MipProblem`] flattened into dense rows with the objective in
/// minimization form. Bounds are supplied per solve so branch and bound can
/// reuse one instance for every node.
#[derive(Debug, Clone)]
pub(crate) struct DenseLp {
    num_vars: usize,
    costs: Vec<f64>,
    rows: Vec<DenseRow>,
}

impl DenseLp {
    pub(crate) fn from_problem(problem: &MipProblem) -> Result<Self, BackendError> {
        let num_vars = problem.num_vars();

        let mut costs = vec![0.0; num_vars];
        for &(var, coefficient) in &problem.objective().terms {
            let slot = costs
                .get_mut(var.index())
                .ok_or(BackendError::UnknownVariable(var.index()))?;
            *slot += coefficient;
        }
        if problem.sense() == Sense::Maximize {
            costs.iter_mut().for_each(|c| *c = -*c);
        }

        let mut rows = Vec::with_capacity(problem.constraints().len());
        for constraint in problem.constraints() {
            let mut coeffs = vec![0.0; num_vars];
            for &(var, coefficient) in &constraint.expr.terms {
                let slot = coeffs
                    .get_mut(var.index())
                    .ok_or(BackendError::UnknownVariable(var.index()))?;
                *slot += coefficient;
            }
            rows.push(DenseRow {
                coeffs,
                relation: constraint.relation,
                rhs: constraint.rhs - constraint.expr.constant,
            });
        }

        let finite = costs.iter().all(|c| c.is_finite())
            && rows
                .iter()
                .all(|r| r.rhs.is_finite() && r.coeffs.iter().all(|a| a.is_finite()));
        if !finite {
            return Err(BackendError::UnsupportedProblem(
                "non-finite coefficient or right-hand side".to_string(),
            ));
        }

        Ok(Self {
            num_vars,
            costs,
            rows,
        })
    }

    pub(crate) fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Minimization-form cost of `values`, without the objective constant.
    pub(crate) fn cost(&self, values: &[f64]) -> f64 {
        self.costs.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Solve the relaxation with variable bounds `[lower, upper]`.
    ///
    /// Lower bounds must be finite.
    pub(crate) fn solve(
        &self,
        lower: &[f64],
        upper: &[f64],
        deadline: Option<Instant>,
    ) -> Result<LpOutcome, BackendError> {
        let n = self.num_vars;

        // Shift to y = x - l and add upper-bound rows.
        let mut rows: Vec<DenseRow> = self
            .rows
            .iter()
            .map(|row| {
                let shift: f64 = row.coeffs.iter().zip(lower).map(|(a, l)| a * l).sum();
                DenseRow {
                    coeffs: row.coeffs.clone(),
                    relation: row.relation,
                    rhs: row.rhs - shift,
                }
            })
            .collect();
        for j in 0..n {
            if upper[j].is_finite() {
                let span = upper[j] - lower[j];
                if span < -FEAS_TOL {
                    return Ok(LpOutcome::Infeasible);
                }
                let mut coeffs = vec![0.0; n];
                coeffs[j] = 1.0;
                rows.push(DenseRow {
                    coeffs,
                    relation: Relation::Le,
                    rhs: span.max(0.0),
                });
            }
        }

        for row in &mut rows {
            if row.rhs < 0.0 {
                row.coeffs.iter_mut().for_each(|a| *a = -*a);
                row.rhs = -row.rhs;
                row.relation = match row.relation {
                    Relation::Le => Relation::Ge,
                    Relation::Ge => Relation::Le,
                    Relation::Eq => Relation::Eq,
                };
            }
        }

        let mut tableau = Tableau::build(n, &rows);
        let first_artificial = tableau.first_artificial;
        let width = tableau.width;
        let max_iterations = 50 * (rows.len() + width) + 1_000;

        // Phase 1
        if first_artificial < width {
            let mut phase_one = vec![0.0; width];
            phase_one[first_artificial..].iter_mut().for_each(|c| *c = 1.0);

            match tableau.optimize(&phase_one, width, deadline, max_iterations)? {
                Phase::Optimal => {}
                Phase::TimedOut => return Ok(LpOutcome::TimedOut),
                // The artificial sum is bounded below by zero.
                Phase::Unbounded => {
                    return Err(BackendError::Numerical(
                        "phase 1 reported an unbounded artificial sum".to_string(),
                    ));
                }
            }

            let scale = 1.0 + rows.iter().map(|r| r.rhs).fold(0.0, f64::max);
            if tableau.objective(&phase_one) > FEAS_TOL * scale {
                return Ok(LpOutcome::Infeasible);
            }
            tableau.drive_out_artificials();
        }

        // Phase 2
        let mut phase_two = vec![0.0; width];
        phase_two[..n].copy_from_slice(&self.costs);
        match tableau.optimize(&phase_two, first_artificial, deadline, max_iterations)? {
            Phase::Optimal => {}
            Phase::Unbounded => return Ok(LpOutcome::Unbounded),
            Phase::TimedOut => return Ok(LpOutcome::TimedOut),
        }

        let mut values = lower.to_vec();
        for (row, &column) in tableau.basis.iter().enumerate() {
            if column < n {
                values[column] += tableau.rhs(row);
            }
        }
        let objective = self.cost(&values);
        Ok(LpOutcome::Optimal { values, objective })
    }
}

// ============================================================================
// Tableau
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Optimal,
    Unbounded,
    TimedOut,
}

/// Dense tableau; the last cell of every row is its right-hand side.
/// Columns are laid out structural, slack/surplus, then artificial.
#[derive(Debug)]
struct Tableau {
    cells: Vec<Vec<f64>>,
    basis: Vec<usize>,
    width: usize,
    first_artificial: usize,
}

impl Tableau {
    fn build(num_vars: usize, rows: &[DenseRow]) -> Self {
        let logicals = rows
            .iter()
            .filter(|r| r.relation != Relation::Eq)
            .count();
        let artificials = rows
            .iter()
            .filter(|r| r.relation != Relation::Le)
            .count();
        let first_artificial = num_vars + logicals;
        let width = first_artificial + artificials;

        let mut cells = Vec::with_capacity(rows.len());
        let mut basis = Vec::with_capacity(rows.len());
        let mut next_logical = num_vars;
        let mut next_artificial = first_artificial;

        for row in rows {
            let mut cell = vec![0.0; width + 1];
            cell[..num_vars].copy_from_slice(&row.coeffs);
            cell[width] = row.rhs;

            match row.relation {
                Relation::Le => {
                    cell[next_logical] = 1.0;
                    basis.push(next_logical);
                    next_logical += 1;
                }
                Relation::Ge => {
                    cell[next_logical] = -1.0;
                    next_logical += 1;
                    cell[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
                Relation::Eq => {
                    cell[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            cells.push(cell);
        }

        Self {
            cells,
            basis,
            width,
            first_artificial,
        }
    }

    fn rhs(&self, row: usize) -> f64 {
        self.cells[row][self.width]
    }

    fn reduced_cost(&self, costs: &[f64], column: usize) -> f64 {
        let basic: f64 = self
            .basis
            .iter()
            .zip(&self.cells)
            .map(|(&b, cell)| costs[b] * cell[column])
            .sum();
        costs[column] - basic
    }

    fn objective(&self, costs: &[f64]) -> f64 {
        self.basis
            .iter()
            .enumerate()
            .map(|(row, &b)| costs[b] * self.rhs(row))
            .sum()
    }

    fn pivot(&mut self, row: usize, column: usize) {
        let pivot = self.cells[row][column];
        self.cells[row].iter_mut().for_each(|v| *v /= pivot);
        let pivot_row = self.cells[row].clone();

        for (i, cell) in self.cells.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = cell[column];
            if factor == 0.0 {
                continue;
            }
            for (v, p) in cell.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            cell[column] = 0.0;
            let rhs = cell.len() - 1;
            if cell[rhs].abs() < EPS {
                cell[rhs] = 0.0;
            }
        }
        self.basis[row] = column;
    }

    /// Minimize `costs` letting only columns below `eligible` enter.
    fn optimize(
        &mut self,
        costs: &[f64],
        eligible: usize,
        deadline: Option<Instant>,
        max_iterations: usize,
    ) -> Result<Phase, BackendError> {
        for _ in 0..max_iterations {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(Phase::TimedOut);
            }

            let entering = (0..eligible).find(|&j| self.reduced_cost(costs, j) < -EPS);
            let Some(column) = entering else {
                return Ok(Phase::Optimal);
            };

            let mut leaving: Option<(usize, f64)> = None;
            for row in 0..self.cells.len() {
                let a = self.cells[row][column];
                if a <= EPS {
                    continue;
                }
                let ratio = self.rhs(row) / a;
                leaving = match leaving {
                    None => Some((row, ratio)),
                    Some((best_row, best)) => {
                        let tie = (ratio - best).abs() <= EPS;
                        if (!tie && ratio < best) || (tie && self.basis[row] < self.basis[best_row])
                        {
                            Some((row, ratio))
                        } else {
                            Some((best_row, best))
                        }
                    }
                };
            }

            let Some((row, _)) = leaving else {
                return Ok(Phase::Unbounded);
            };
            self.pivot(row, column);
        }

        Err(BackendError::Numerical(format!(
            "simplex did not converge within {max_iterations} iterations"
        )))
    }

    /// Pivot basic artificials out after phase 1, dropping rows that turn
    /// out to be redundant.
    fn drive_out_artificials(&mut self) {
        let mut row = 0;
        while row < self.cells.len() {
            if self.basis[row] < self.first_artificial {
                row += 1;
                continue;
            }
            match (0..self.first_artificial).find(|&j| self.cells[row][j].abs() > EPS) {
                Some(column) => {
                    self.pivot(row, column);
                    row += 1;
                }
                None => {
                    self.cells.remove(row);
                    self.basis.remove(row);
                }
            }
        }
    }
}
