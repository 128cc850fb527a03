//! Reclaim Kernel
//!
//! Contracts shared by every reclaim crate: workload kinds, performance
//! models and catalogs, the reduction request/decision types, and the
//! optimization backend trait. Implementations live in `reclaim-foundation`.

// workload kind module
pub mod workload;
pub use workload::WorkloadKind;

// performance model module
pub mod model;
pub use model::PerformanceModel;

// catalog module
pub mod catalog;
pub use catalog::{CatalogEntry, CatalogError, CatalogProfile, WorkloadCatalog};

// optimization backend module
pub mod backend;
pub use backend::{
    BackendError, LinearExpr, MipProblem, MipSolution, OptimizationBackend, Relation, Sense,
    SolveOptions, SolveStatus, VarId, VarKind,
};

// reduction contract module
pub mod reduction;
pub use reduction::{
    ExecutorRounding, ReductionDecision, ReductionError, ReductionPolicy, ReductionRequest,
    ReductionStrategy, WorkloadReduction,
};

// config module
#[cfg(feature = "config")]
pub mod config;

// error module
pub mod error;
pub use error::{ReclaimError, ReclaimResult};
