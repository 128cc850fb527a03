//! Crate-level error types for `reclaim-kernel`.
//!
//! Provides a unified [`ReclaimError`] that composes the errors of every
//! sub-module (catalog, config, reduction, backend, IO, serialization)
//! together with [`error_stack::Report`] for context-carrying propagation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reclaim_kernel::error::{ReclaimError, ReclaimResult};
//! use error_stack::ResultExt;
//!
//! fn catalog(path: &str) -> ReclaimResult<WorkloadCatalog> {
//!     reclaim_kernel::config::load_catalog(path)
//!         .map_err(ReclaimError::from)
//!         .map_err(error_stack::Report::new)
//!         .attach(format!("loading catalog {path}"))
//! }
//! ```

use crate::backend::BackendError;
use crate::catalog::CatalogError;
use crate::reduction::ReductionError;
use thiserror::Error;

/// Crate-level error type for `reclaim-kernel`.
///
/// Wraps each sub-module's typed error via `#[from]` so that `?` converts
/// them automatically. Use [`error_stack::Report<ReclaimError>`] (via
/// [`ReclaimResult`]) to attach context as the error propagates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReclaimError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Requires the `config` feature.
    #[cfg(feature = "config")]
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Reduction error: {0}")]
    Reduction(#[from] ReductionError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

/// Convenience result alias using [`error_stack::Report`].
pub type ReclaimResult<T> = Result<T, error_stack::Report<ReclaimError>>;
