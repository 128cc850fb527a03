//! Registries pre-populated with common workload instance names.

use reclaim_foundation::PerformanceModelRegistry;
use std::sync::Arc;

/// Instance names used across the integration tests.
pub const STANDARD_INSTANCES: [&str; 6] = [
    "TeraSort-job-1",
    "WordCount-job-2",
    "LDA-3",
    "ALS-4",
    "SVM-5",
    "DenseKMeans-6",
];

/// A registry over the `standard` catalog with `names` registered.
pub fn registry_with<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Arc<PerformanceModelRegistry> {
    let registry = PerformanceModelRegistry::with_builtin_catalog()
        .unwrap_or_else(|e| panic!("built-in catalog failed to load: {e}"));
    registry.register_all(names);
    Arc::new(registry)
}

/// A registry with every name of [`STANDARD_INSTANCES`] registered.
pub fn standard_registry() -> Arc<PerformanceModelRegistry> {
    registry_with(STANDARD_INSTANCES)
}
