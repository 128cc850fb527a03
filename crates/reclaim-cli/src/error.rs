use reclaim_kernel::catalog::CatalogError;
use reclaim_kernel::config::ConfigError;
use reclaim_kernel::reduction::ReductionError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Reduction error: {0}")]
    Reduction(#[from] ReductionError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
