//! Known best-effort workload types.
//!
//! Instance names reported by the cluster (e.g. `"TeraSort-job-1"`) are
//! resolved into a [`WorkloadKind`] once, when they are first seen. Everything
//! downstream carries the typed kind instead of re-matching strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A best-effort workload type with a calibrated performance model.
///
/// Variants are declared in catalog order; [`WorkloadKind::detect`] walks them
/// in this order and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    Lda,
    TeraSort,
    Gbt,
    Als,
    Svd,
    DenseKMeans,
    WordCount,
    ScalaSort,
    NaiveBayes,
    Svm,
}

impl WorkloadKind {
    /// Every kind, in catalog order.
    pub const ALL: [WorkloadKind; 10] = [
        Self::Lda,
        Self::TeraSort,
        Self::Gbt,
        Self::Als,
        Self::Svd,
        Self::DenseKMeans,
        Self::WordCount,
        Self::ScalaSort,
        Self::NaiveBayes,
        Self::Svm,
    ];

    /// Substring that identifies an instance of this kind.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Lda => "LDA",
            Self::TeraSort => "TeraSort",
            Self::Gbt => "Gradient",
            Self::Als => "ALS",
            Self::Svd => "SVD",
            Self::DenseKMeans => "DenseKMeans",
            Self::WordCount => "WordCount",
            Self::ScalaSort => "ScalaSort",
            Self::NaiveBayes => "NaiveBayes",
            Self::Svm => "SVM",
        }
    }

    /// Name of the performance model for this kind.
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::Lda => "LDA",
            Self::TeraSort => "TeraSort",
            Self::Gbt => "GBT",
            Self::Als => "ALS",
            Self::Svd => "SVD",
            Self::DenseKMeans => "DenseKMeans",
            Self::WordCount => "WordCount",
            Self::ScalaSort => "ScalaSort",
            Self::NaiveBayes => "NaiveBayes",
            Self::Svm => "SVM",
        }
    }

    /// Resolve an instance name to a kind.
    ///
    /// Matching is a case-sensitive substring search in catalog order, so a
    /// name containing several patterns (e.g. `"ALS-SVD"`) resolves to the
    /// earliest kind. Use [`WorkloadKind::matches`] to see every candidate.
    pub fn detect(instance_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| instance_name.contains(kind.pattern()))
    }

    /// All kinds whose pattern occurs in `instance_name`, in catalog order.
    pub fn matches(instance_name: &str) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|kind| instance_name.contains(kind.pattern()))
            .collect()
    }

    /// Stable identifier used in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lda => "lda",
            Self::TeraSort => "tera-sort",
            Self::Gbt => "gbt",
            Self::Als => "als",
            Self::Svd => "svd",
            Self::DenseKMeans => "dense-k-means",
            Self::WordCount => "word-count",
            Self::ScalaSort => "scala-sort",
            Self::NaiveBayes => "naive-bayes",
            Self::Svm => "svm",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_name())
    }
}

/// Error returned when a string names no known workload kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown workload kind: {0}")]
pub struct ParseWorkloadKindError(pub String);

impl FromStr for WorkloadKind {
    type Err = ParseWorkloadKindError;

    /// Accepts the catalog identifier (`"tera-sort"`) or the model name
    /// (`"TeraSort"`, case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.model_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseWorkloadKindError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kind_from_instance_name() {
        assert_eq!(
            WorkloadKind::detect("TeraSort-job-1"),
            Some(WorkloadKind::TeraSort)
        );
        assert_eq!(
            WorkloadKind::detect("spark-WordCount-2"),
            Some(WorkloadKind::WordCount)
        );
        assert_eq!(
            WorkloadKind::detect("GradientBoostedTrees"),
            Some(WorkloadKind::Gbt)
        );
        assert_eq!(WorkloadKind::detect("repartition"), None);
    }

    #[test]
    fn detection_is_case_sensitive() {
        assert_eq!(WorkloadKind::detect("terasort"), None);
    }

    #[test]
    fn ambiguous_name_resolves_to_first_catalog_entry() {
        assert_eq!(WorkloadKind::detect("ALS-SVD"), Some(WorkloadKind::Als));
        assert_eq!(WorkloadKind::detect("SVD-ALS"), Some(WorkloadKind::Als));
        assert_eq!(
            WorkloadKind::matches("SVD-ALS"),
            vec![WorkloadKind::Als, WorkloadKind::Svd]
        );
    }

    #[test]
    fn parses_identifier_and_model_name() {
        assert_eq!("gbt".parse::<WorkloadKind>(), Ok(WorkloadKind::Gbt));
        assert_eq!("GBT".parse::<WorkloadKind>(), Ok(WorkloadKind::Gbt));
        assert_eq!(
            "dense-k-means".parse::<WorkloadKind>(),
            Ok(WorkloadKind::DenseKMeans)
        );
        assert!("Gradient".parse::<WorkloadKind>().is_err());
    }

    #[test]
    fn serde_identifier_matches_as_str() {
        for kind in WorkloadKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
