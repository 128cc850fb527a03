//! Projection of reclaimed cores and memory onto executors.

use reclaim_kernel::model::PerformanceModel;
use reclaim_kernel::reduction::{ExecutorRounding, WorkloadReduction};
use serde::{Deserialize, Serialize};

/// Executor-level view of one workload's reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Whole executors removed, at most `overall_executors`.
    pub reduced_executors: u32,
    /// MB trimmed from each remaining executor; may be negative.
    pub reduced_per_mem: i64,
}

/// Turns reclaimed `(cores, mem)` into executor removals and per-executor
/// memory trims. One rounding policy applies to every workload of a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultProjector {
    rounding: ExecutorRounding,
}

impl ResultProjector {
    pub fn new(rounding: ExecutorRounding) -> Self {
        Self { rounding }
    }

    pub fn rounding(&self) -> ExecutorRounding {
        self.rounding
    }

    pub fn project(
        &self,
        model: &PerformanceModel,
        reduced_cores: u32,
        reduced_mem: u64,
    ) -> Projection {
        let overall = model.overall_executors();
        let reduced_executors = match (model.per_executor_cores, self.rounding) {
            (0, _) => 0,
            (per, ExecutorRounding::Ceil) => reduced_cores.div_ceil(per),
            (per, ExecutorRounding::Floor) => reduced_cores / per,
        }
        .min(overall);

        let remaining = overall - reduced_executors;
        let reduced_per_mem = if remaining == 0 {
            0
        } else {
            let released = i128::from(model.per_executor_memory) * i128::from(reduced_executors);
            // Integer division truncates toward zero.
            let per_mem = (i128::from(reduced_mem) - released) / i128::from(remaining);
            i64::try_from(per_mem).unwrap_or(if per_mem < 0 { i64::MIN } else { i64::MAX })
        };

        Projection {
            reduced_executors,
            reduced_per_mem,
        }
    }

    /// Full per-workload record: projection plus predicted loss.
    pub fn record(
        &self,
        workload: &str,
        model: &PerformanceModel,
        reduced_cores: u32,
        reduced_mem: u64,
    ) -> WorkloadReduction {
        let projection = self.project(model, reduced_cores, reduced_mem);
        WorkloadReduction {
            workload: workload.to_string(),
            model: model.name.clone(),
            kind: model.kind,
            reduced_cores,
            reduced_mem,
            reduced_executors: projection.reduced_executors,
            reduced_per_mem: projection.reduced_per_mem,
            predicted_loss: model.predicted_loss(f64::from(reduced_cores), reduced_mem as f64),
        }
    }
}
