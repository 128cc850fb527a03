//! Configuration loading
//!
//! Loads the reduction policy and workload catalogs from YAML, TOML or JSON
//! files, with the format taken from the file extension.
//!
//! ## Features
//!
//! - Auto-detection of format from file extension
//! - Environment variable substitution (`${VAR}` and `$VAR` syntax)
//! - Environment overrides with a prefix and `__` nesting
//! - Catalog files validated into a [`WorkloadCatalog`]

use crate::catalog::{CatalogDocument, CatalogError, CatalogProfile, WorkloadCatalog};
use crate::reduction::ReductionPolicy;
use config::{Config as Cfg, Environment, File, FileFormat};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;


pub use config::FileFormat as Format;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)\b")
        .expect("environment variable pattern is a valid regex")
});

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration of a reclaim deployment.
///
/// ```toml
/// profile = "standard"          # built-in catalog used when `catalog` is unset
/// catalog = "catalog/site.toml" # optional external catalog file
///
/// [policy]
/// two_workload_core_cap = 20
/// three_workload_core_cap = 12
/// executor_rounding = "ceil"
/// time_limit_ms = 5000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReclaimConfig {
    #[serde(default)]
    pub policy: ReductionPolicy,
    #[serde(default)]
    pub profile: CatalogProfile,
    /// External catalog file, relative to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
}

impl ReclaimConfig {
    /// The external catalog if one is configured, else the built-in profile.
    pub fn load_catalog(&self) -> ConfigResult<WorkloadCatalog> {
        match &self.catalog {
            Some(path) => load_catalog(path),
            None => Ok(self.profile.load()?),
        }
    }
}

/// Detect configuration format from file extension
///
/// # Supported Extensions
///
/// - YAML: `.yaml`, `.yml`
/// - TOML: `.toml`
/// - JSON: `.json`
pub fn detect_format(path: impl AsRef<Path>) -> ConfigResult<FileFormat> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Substitute environment variables in a string
///
/// Both `${VAR_NAME}` and `$VAR_NAME` are replaced; references to unset
/// variables are left as written.
pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn build<T>(builder: config::ConfigBuilder<config::builder::DefaultState>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let config = builder
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Load configuration from a file
///
/// Detects the format from the extension and substitutes environment
/// variables before parsing.
pub fn load_config<T>(path: impl AsRef<Path>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let format = detect_format(&path)?;
    let content = std::fs::read_to_string(path)?;
    from_str(&content, format)
}

/// Load configuration from a string with explicit format
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let substituted = substitute_env_vars(content);
    build(Cfg::builder().add_source(File::from_str(&substituted, format)))
}

/// Load configuration with environment variable overrides
///
/// Variables are named `<PREFIX>__<SECTION>__<KEY>`, e.g.
/// `RECLAIM__POLICY__EXECUTOR_ROUNDING=floor`.
pub fn load_with_env<T>(path: impl AsRef<Path>, env_prefix: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let format = detect_format(&path)?;
    let content = std::fs::read_to_string(path)?;
    let substituted = substitute_env_vars(&content);

    build(
        Cfg::builder()
            .add_source(File::from_str(&substituted, format))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__"),
            ),
    )
}

/// Load and validate a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> ConfigResult<WorkloadCatalog> {
    let path = path.as_ref();
    let document: CatalogDocument = load_config(path)?;
    let catalog = WorkloadCatalog::from_document(document)?;
    tracing::debug!(
        "Loaded catalog '{}' with {} entries from {}",
        catalog.profile(),
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}
