//! Workload catalog: the calibrated models of every known workload type.
//!
//! Catalogs are versioned data, not code. The two built-in profiles are
//! embedded from `data/catalog/*.toml`; other catalogs are loaded at runtime
//! through the config loader (`config` feature) or [`WorkloadCatalog::from_toml_str`].

use crate::model::PerformanceModel;
use crate::workload::WorkloadKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const STANDARD_CATALOG: &str = include_str!("../data/catalog/standard.toml");
const HUGE_INPUTS_CATALOG: &str = include_str!("../data/catalog/huge-inputs.toml");

fn default_min_reduced_executors() -> u32 {
    1
}

/// Calibration record of one workload type, as stored in catalog files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub kind: WorkloadKind,
    pub coe_cpu: f64,
    pub coe_mem: f64,
    #[serde(alias = "c")]
    pub intercept: f64,
    pub cores_max: u32,
    pub per_executor_cores: u32,
    pub per_executor_memory: u64,
    #[serde(default = "default_min_reduced_executors")]
    pub min_reduced_executors: u32,
}

impl CatalogEntry {
    /// Build the immutable model for this entry.
    pub fn to_model(&self) -> PerformanceModel {
        PerformanceModel {
            name: self.kind.model_name().to_string(),
            kind: self.kind,
            coe_cpu: self.coe_cpu,
            coe_mem: self.coe_mem,
            intercept: self.intercept,
            cores_max: self.cores_max,
            per_executor_cores: self.per_executor_cores,
            per_executor_memory: self.per_executor_memory,
            min_reduced_executors: self.min_reduced_executors,
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidEntry {
            kind: self.kind,
            reason: reason.to_string(),
        };

        if self.per_executor_cores == 0 {
            return Err(invalid("per_executor_cores must be > 0"));
        }
        if self.per_executor_memory == 0 {
            return Err(invalid("per_executor_memory must be > 0"));
        }
        if self.cores_max < self.per_executor_cores {
            return Err(invalid("cores_max must fit at least one executor"));
        }
        if self.min_reduced_executors == 0 {
            return Err(invalid("min_reduced_executors must be >= 1"));
        }
        if !(self.coe_cpu.is_finite() && self.coe_mem.is_finite() && self.intercept.is_finite()) {
            return Err(invalid("coefficients must be finite"));
        }
        Ok(())
    }
}

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub workloads: Vec<CatalogEntry>,
}

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("Catalog parsing error: {0}")]
    Parse(String),

    #[error("Invalid catalog entry for {kind}: {reason}")]
    InvalidEntry { kind: WorkloadKind, reason: String },

    #[error("Workload kind {0} is listed more than once")]
    DuplicateEntry(WorkloadKind),

    #[error("Catalog '{0}' has no entries")]
    Empty(String),

    #[error("Unknown catalog profile: {0}")]
    UnknownProfile(String),
}

/// Built-in calibration profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogProfile {
    /// All ten workload types, regular-size inputs.
    #[default]
    Standard,
    /// LDA, TeraSort, GBT and ALS on huge inputs.
    HugeInputs,
}

impl CatalogProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::HugeInputs => "huge-inputs",
        }
    }

    /// Parse the embedded catalog for this profile.
    pub fn load(&self) -> Result<WorkloadCatalog, CatalogError> {
        let source = match self {
            Self::Standard => STANDARD_CATALOG,
            Self::HugeInputs => HUGE_INPUTS_CATALOG,
        };
        WorkloadCatalog::from_toml_str(source)
    }
}

impl fmt::Display for CatalogProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogProfile {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "huge-inputs" => Ok(Self::HugeInputs),
            other => Err(CatalogError::UnknownProfile(other.to_string())),
        }
    }
}

/// Validated, ordered set of catalog entries.
///
/// Entries are kept in catalog order (the declaration order of
/// [`WorkloadKind`]), which is also the order name resolution walks.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadCatalog {
    profile: String,
    version: Option<String>,
    entries: BTreeMap<WorkloadKind, CatalogEntry>,
}

impl WorkloadCatalog {
    /// The `standard` profile.
    pub fn builtin() -> Result<Self, CatalogError> {
        CatalogProfile::Standard.load()
    }

    /// Validate a parsed document.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        if document.workloads.is_empty() {
            return Err(CatalogError::Empty(document.profile));
        }

        let mut entries = BTreeMap::new();
        for entry in document.workloads {
            entry.validate()?;
            let kind = entry.kind;
            if entries.insert(kind, entry).is_some() {
                return Err(CatalogError::DuplicateEntry(kind));
            }
        }

        Ok(Self {
            profile: document.profile,
            version: document.version,
            entries,
        })
    }

    /// Parse and validate a TOML catalog.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, kind: WorkloadKind) -> Option<&CatalogEntry> {
        self.entries.get(&kind)
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn model(&self, kind: WorkloadKind) -> Option<PerformanceModel> {
        self.get(kind).map(CatalogEntry::to_model)
    }

    /// Detect the kind of an instance name and return its entry.
    ///
    /// A detected kind this catalog does not carry resolves to `None`; later
    /// patterns are not tried.
    pub fn resolve(&self, instance_name: &str) -> Option<&CatalogEntry> {
        WorkloadKind::detect(instance_name).and_then(|kind| self.get(kind))
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            profile: self.profile.clone(),
            version: self.version.clone(),
            workloads: self.entries.values().cloned().collect(),
        }
    }
}
