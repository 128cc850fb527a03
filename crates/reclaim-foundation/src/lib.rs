//! Reclaim Foundation
//!
//! Implementations of the `reclaim-kernel` contracts: the performance model
//! registry, the in-process MILP backend and the reduction strategies.

// registry module
pub mod registry;
pub use registry::PerformanceModelRegistry;

// milp module
pub mod milp;
pub use milp::BranchAndBoundBackend;

// reduction module
pub mod reduction;
pub use reduction::{
    EvenSplitBaseline, Projection, ReductionPlanner, ResourceReductionSolver, ResultProjector,
};
