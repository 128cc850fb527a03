//! In-process mixed-integer linear programming backend.
//!
//! This module provides [`BranchAndBoundBackend`], a concrete implementation
//! of the `OptimizationBackend` trait from `reclaim-kernel`.
//!
//! # Architecture
//!
//! - `simplex`: dense two-phase primal simplex with Bland's rule over
//!   variables shifted by their lower bounds.
//! - `branch`: depth-first branch and bound over the LP relaxations,
//!   honoring the time limit and node budget of [`SolveOptions`].
//!
//! Variables must have finite lower bounds; upper bounds may be infinite.
//!
//! [`SolveOptions`]: reclaim_kernel::backend::SolveOptions

mod branch;
mod simplex;

pub use branch::BranchAndBoundBackend;
