//! Linear performance-loss model for one best-effort workload type.

use crate::workload::WorkloadKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calibrated cost model and executor shape of a workload type.
///
/// Predicted normalized performance loss is linear in the reclaimed
/// resources:
///
/// ```text
/// loss(cores, mem) = coe_cpu * cores + coe_mem * mem + intercept
/// ```
///
/// A model is immutable once built from a catalog entry. Solve results never
/// live here; they are returned as per-call
/// [`WorkloadReduction`](crate::reduction::WorkloadReduction) records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceModel {
    /// Model name, e.g. `"TeraSort"` or `"GBT"`.
    pub name: String,
    pub kind: WorkloadKind,
    /// Loss per reclaimed core.
    pub coe_cpu: f64,
    /// Loss per reclaimed MB of memory.
    pub coe_mem: f64,
    pub intercept: f64,
    /// Most cores this workload type may be allotted.
    pub cores_max: u32,
    pub per_executor_cores: u32,
    /// Memory of one executor in MB.
    pub per_executor_memory: u64,
    /// Whole executors a selected workload must give up at minimum.
    pub min_reduced_executors: u32,
}

impl PerformanceModel {
    /// Executors the workload runs with at full allotment.
    pub fn overall_executors(&self) -> u32 {
        if self.per_executor_cores == 0 {
            return 0;
        }
        self.cores_max / self.per_executor_cores
    }

    /// Fewest cores that may be reclaimed from this workload.
    pub fn lower_bound_reduced_cores(&self) -> u32 {
        self.per_executor_cores * self.min_reduced_executors
    }

    /// Fewest MB that may be reclaimed from this workload.
    pub fn lower_bound_reduced_mem(&self) -> u64 {
        self.per_executor_memory * u64::from(self.min_reduced_executors)
    }

    /// Predicted loss after reclaiming `cores` and `mem` MB.
    pub fn predicted_loss(&self, cores: f64, mem: f64) -> f64 {
        self.coe_cpu * cores + self.coe_mem * mem + self.intercept
    }
}

impl fmt::Display for PerformanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (coe_cpu={}, coe_mem={}, c={}, executors={}x{}c/{}MB)",
            self.name,
            self.coe_cpu,
            self.coe_mem,
            self.intercept,
            self.overall_executors(),
            self.per_executor_cores,
            self.per_executor_memory
        )
    }
}
