//! Reduction strategies.
//!
//! - [`ResourceReductionSolver`]: loss-minimizing MILP split across 2 or 3
//!   BT workloads.
//! - [`EvenSplitBaseline`]: naive half-and-half split across 2 workloads.
//! - [`ResultProjector`]: maps reclaimed cores and memory onto executors.
//! - [`ReductionPlanner`]: picks a strategy, optionally falling back from
//!   the MILP to the even split.

mod baseline;
mod planner;
mod projector;
mod solver;

pub use baseline::EvenSplitBaseline;
pub use planner::ReductionPlanner;
pub use projector::{Projection, ResultProjector};
pub use solver::ResourceReductionSolver;
