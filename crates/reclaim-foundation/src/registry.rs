//! Performance model registry
//!
//! Maps BT workload instance names to the performance model of their type.
//! Entries are created lazily by [`PerformanceModelRegistry::register`],
//! which resolves the instance name against a [`WorkloadCatalog`]. The map
//! only grows; models are immutable and shared as `Arc`.

use parking_lot::RwLock;
use reclaim_kernel::catalog::{CatalogError, WorkloadCatalog};
use reclaim_kernel::model::PerformanceModel;
use reclaim_kernel::workload::WorkloadKind;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// PerformanceModelRegistry
// ============================================================================

/// Instance name to performance model map over one catalog.
///
/// Registration is a check-then-insert under the write lock, so concurrent
/// `register` calls for the same name produce a single entry.
///
/// # Example
///
/// ```rust,ignore
/// let registry = PerformanceModelRegistry::with_builtin_catalog()?;
/// registry.register("TeraSort-job-1");
/// let model = registry.lookup("TeraSort-job-1").unwrap();
/// assert_eq!(model.overall_executors(), 14);
/// ```
pub struct PerformanceModelRegistry {
    catalog: WorkloadCatalog,
    models: RwLock<HashMap<String, Arc<PerformanceModel>>>,
}

impl PerformanceModelRegistry {
    pub fn new(catalog: WorkloadCatalog) -> Self {
        Self {
            catalog,
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Registry over the `standard` catalog profile.
    pub fn with_builtin_catalog() -> Result<Self, CatalogError> {
        Ok(Self::new(WorkloadCatalog::builtin()?))
    }

    pub fn catalog(&self) -> &WorkloadCatalog {
        &self.catalog
    }

    /// Resolve `name` against the catalog and insert its model.
    ///
    /// Returns the registered model, or `None` when the name matches no
    /// catalog entry. Registering a name twice returns the existing entry.
    pub fn register(&self, name: &str) -> Option<Arc<PerformanceModel>> {
        if let Some(existing) = self.models.read().get(name) {
            return Some(Arc::clone(existing));
        }

        let Some(kind) = WorkloadKind::detect(name) else {
            tracing::warn!("Workload '{}' matches no known workload type", name);
            return None;
        };
        let Some(entry) = self.catalog.get(kind) else {
            tracing::warn!(
                "Workload '{}' is {}, which catalog '{}' does not carry",
                name,
                kind,
                self.catalog.profile()
            );
            return None;
        };

        let candidates = WorkloadKind::matches(name);
        if candidates.len() > 1 {
            tracing::warn!(
                "Workload '{}' matches {:?}; using {}",
                name,
                candidates,
                entry.kind
            );
        }

        let mut models = self.models.write();
        // Another caller may have won the race between the read and write lock.
        if let Some(existing) = models.get(name) {
            return Some(Arc::clone(existing));
        }

        let model = Arc::new(entry.to_model());
        tracing::info!(
            "Registered workload '{}' as {} ({} executors)",
            name,
            model.name,
            model.overall_executors()
        );
        models.insert(name.to_string(), Arc::clone(&model));
        Some(model)
    }

    /// Register every name; returns how many resolved.
    pub fn register_all<I, S>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter(|name| self.register(name.as_ref()).is_some())
            .count()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<PerformanceModel>> {
        self.models.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    /// Registered instance names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for PerformanceModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceModelRegistry")
            .field("catalog", &self.catalog.profile())
            .field("models", &self.names())
            .finish()
    }
}
