//! Resource reduction contract: requests, policy, decisions and errors.
//!
//! A latency-critical (LC) workload asks for `target_cpus` cores and
//! `target_mem` MB back; a reduction strategy splits that target across two
//! or three co-located best-effort (BT) workloads. Every call produces a
//! fresh [`ReductionDecision`] owned by the caller, or a [`ReductionError`].

use crate::backend::{BackendError, SolveOptions, SolveStatus};
use crate::workload::WorkloadKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Fewest BT workloads a reduction may be split across.
pub const MIN_BT_WORKLOADS: usize = 2;
/// Most BT workloads a reduction may be split across.
pub const MAX_BT_WORKLOADS: usize = 3;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// What the LC workload needs released, and from whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionRequest {
    /// Requesting LC workload. Informational only.
    pub lc_name: String,
    /// Cores to reclaim in total.
    pub target_cpus: u32,
    /// Memory to reclaim in total, MB.
    pub target_mem: u64,
    /// BT workload instance names, in the order results are reported.
    pub bt_names: Vec<String>,
}

impl ReductionRequest {
    pub fn new(
        lc_name: impl Into<String>,
        target_cpus: u32,
        target_mem: u64,
        bt_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            lc_name: lc_name.into(),
            target_cpus,
            target_mem,
            bt_names: bt_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Check the workload count and name uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`ReductionError::UnsupportedWorkloadCount`] unless
    /// `allowed` contains the number of BT names, and
    /// [`ReductionError::DuplicateWorkload`] if a name repeats.
    pub fn validate_shape(
        &self,
        allowed: std::ops::RangeInclusive<usize>,
    ) -> Result<(), ReductionError> {
        let count = self.bt_names.len();
        if !allowed.contains(&count) {
            return Err(ReductionError::UnsupportedWorkloadCount { count });
        }
        for (i, name) in self.bt_names.iter().enumerate() {
            if self.bt_names[..i].contains(name) {
                return Err(ReductionError::DuplicateWorkload(name.clone()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// How reclaimed cores translate into whole executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutorRounding {
    /// `ceil(cores / per_executor_cores)`: a partially reclaimed executor is
    /// removed.
    #[default]
    Ceil,
    /// `floor(cores / per_executor_cores)`: only fully reclaimed executors
    /// are removed.
    Floor,
}

fn default_two_workload_core_cap() -> u32 {
    20
}

fn default_three_workload_core_cap() -> u32 {
    12
}

fn default_time_limit_ms() -> Option<u64> {
    Some(5_000)
}

fn default_max_nodes() -> usize {
    10_000
}

/// Tunables of the reduction formulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionPolicy {
    /// Most cores reclaimed from one workload when splitting across two.
    #[serde(default = "default_two_workload_core_cap")]
    pub two_workload_core_cap: u32,
    /// Most cores reclaimed from one workload when splitting across three.
    #[serde(default = "default_three_workload_core_cap")]
    pub three_workload_core_cap: u32,
    #[serde(default)]
    pub executor_rounding: ExecutorRounding,
    /// Backend time budget; `None` disables the limit.
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: Option<u64>,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
}

impl Default for ReductionPolicy {
    fn default() -> Self {
        Self {
            two_workload_core_cap: default_two_workload_core_cap(),
            three_workload_core_cap: default_three_workload_core_cap(),
            executor_rounding: ExecutorRounding::default(),
            time_limit_ms: default_time_limit_ms(),
            max_nodes: default_max_nodes(),
        }
    }
}

impl ReductionPolicy {
    /// Per-workload core cap for a split across `workloads` BT workloads.
    pub fn core_cap(&self, workloads: usize) -> Option<u32> {
        match workloads {
            2 => Some(self.two_workload_core_cap),
            3 => Some(self.three_workload_core_cap),
            _ => None,
        }
    }

    pub fn with_executor_rounding(mut self, rounding: ExecutorRounding) -> Self {
        self.executor_rounding = rounding;
        self
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit_ms = limit.map(|d| d.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            max_nodes: self.max_nodes,
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Which strategy produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReductionStrategy {
    /// Loss-minimizing mixed-integer program.
    Milp,
    /// Naive even split, for comparison.
    EvenSplit,
}

impl fmt::Display for ReductionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Milp => write!(f, "milp"),
            Self::EvenSplit => write!(f, "even-split"),
        }
    }
}

/// What one BT workload gives up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadReduction {
    /// Instance name as supplied in the request.
    pub workload: String,
    /// Model the instance resolved to.
    pub model: String,
    pub kind: WorkloadKind,
    pub reduced_cores: u32,
    /// MB.
    pub reduced_mem: u64,
    /// Whole executors removed.
    pub reduced_executors: u32,
    /// MB trimmed from each remaining executor. Negative when removing
    /// whole executors already reclaims more memory than targeted; the
    /// surplus goes back to the remaining executors.
    pub reduced_per_mem: i64,
    pub predicted_loss: f64,
}

/// The outcome of one reduction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionDecision {
    pub id: Uuid,
    pub lc_name: String,
    pub strategy: ReductionStrategy,
    pub target_cpus: u32,
    pub target_mem: u64,
    /// One record per requested BT workload, in request order.
    pub reductions: Vec<WorkloadReduction>,
    /// Objective value reported by the strategy.
    pub objective_value: f64,
}

impl ReductionDecision {
    /// Sum of per-workload predicted losses.
    pub fn aggregate_loss(&self) -> f64 {
        self.reductions.iter().map(|r| r.predicted_loss).sum()
    }

    pub fn total_reduced_cores(&self) -> u64 {
        self.reductions.iter().map(|r| u64::from(r.reduced_cores)).sum()
    }

    pub fn total_reduced_mem(&self) -> u64 {
        self.reductions.iter().map(|r| r.reduced_mem).sum()
    }

    pub fn reduction_for(&self, workload: &str) -> Option<&WorkloadReduction> {
        self.reductions.iter().find(|r| r.workload == workload)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why no decision was produced. None of these is fatal; callers may retry,
/// fall back to the even split, or escalate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ReductionError {
    /// Only splits across 2 or 3 BT workloads are supported.
    #[error("Cannot split a reduction across {count} workloads")]
    UnsupportedWorkloadCount { count: usize },

    /// The same BT name was listed twice.
    #[error("Workload '{0}' is listed more than once")]
    DuplicateWorkload(String),

    /// A BT name is not in the performance-model registry.
    #[error("Workload '{0}' has no registered performance model")]
    UnknownWorkload(String),

    /// The backend finished without an optimal solution.
    #[error("No optimal reduction found: {status}")]
    Unsolved { status: SolveStatus },

    /// The backend could not process the problem.
    #[error("Optimization backend error: {0}")]
    Backend(#[from] BackendError),
}

impl ReductionError {
    /// Whether the same request may succeed later or with another strategy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unsolved { .. } | Self::Backend(_))
    }
}
