//! Reclaim Testing Framework
//!
//! Provides a scripted optimization backend and fixtures for testing the
//! reduction strategies without depending on solver behavior.

pub mod backend;
pub mod fixtures;

pub use backend::{MockOptimizationBackend, ScriptedResponse};
pub use fixtures::{registry_with, standard_registry};

/// Assert how many times a [`MockOptimizationBackend`] was asked to solve.
#[macro_export]
macro_rules! assert_backend_called {
    ($backend:expr, $expected_count:expr) => {
        let count = $backend.call_count();
        assert_eq!(
            count, $expected_count,
            "Expected backend '{}' to be called {} times, but was called {} times",
            $backend.name_str(),
            $expected_count,
            count
        );
    };
}
