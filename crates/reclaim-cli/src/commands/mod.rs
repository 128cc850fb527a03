//! Command implementations

pub mod catalog;
pub mod resolve;
pub mod solve;

use crate::CliResult;
use reclaim_foundation::PerformanceModelRegistry;
use reclaim_kernel::catalog::{CatalogProfile, WorkloadCatalog};
use reclaim_kernel::config::{ReclaimConfig, load_with_env};
use std::path::Path;
use std::sync::Arc;

/// Prefix of environment overrides, e.g. `RECLAIM__POLICY__EXECUTOR_ROUNDING`.
const ENV_PREFIX: &str = "RECLAIM";

/// Configuration and catalog shared by every command.
#[derive(Debug)]
pub struct CliContext {
    pub config: ReclaimConfig,
    pub catalog: WorkloadCatalog,
}

impl CliContext {
    /// Precedence: `--catalog`, then `--profile`, then the config file.
    pub fn load(
        config_path: Option<&Path>,
        catalog_path: Option<&Path>,
        profile: Option<CatalogProfile>,
    ) -> CliResult<Self> {
        let mut config: ReclaimConfig = match config_path {
            Some(path) => load_with_env(path, ENV_PREFIX)?,
            None => ReclaimConfig::default(),
        };

        if let Some(profile) = profile {
            config.profile = profile;
            config.catalog = None;
        }
        if let Some(path) = catalog_path {
            config.catalog = Some(path.to_path_buf());
        }

        let catalog = config.load_catalog()?;
        tracing::debug!(
            "Loaded catalog '{}' with {} workload types",
            catalog.profile(),
            catalog.len()
        );

        Ok(Self { config, catalog })
    }

    /// An empty registry over the loaded catalog.
    pub fn registry(&self) -> Arc<PerformanceModelRegistry> {
        Arc::new(PerformanceModelRegistry::new(self.catalog.clone()))
    }
}
