//! Even-split comparator for two BT workloads.

use super::projector::ResultProjector;
use crate::registry::PerformanceModelRegistry;
use reclaim_kernel::model::PerformanceModel;
use reclaim_kernel::reduction::{
    ReductionDecision, ReductionError, ReductionRequest, ReductionStrategy,
};
use std::sync::Arc;
use uuid::Uuid;

/// Splits the target evenly between two workloads, each giving up
/// `ceil(target / 2)`.
///
/// Lower bounds and caps are not enforced, and the two halves may sum to one
/// more than the target. It exists as a reference point for the MILP.
pub struct EvenSplitBaseline {
    registry: Arc<PerformanceModelRegistry>,
    projector: ResultProjector,
}

impl EvenSplitBaseline {
    pub fn new(registry: Arc<PerformanceModelRegistry>, projector: ResultProjector) -> Self {
        Self {
            registry,
            projector,
        }
    }

    pub fn split(&self, request: &ReductionRequest) -> Result<ReductionDecision, ReductionError> {
        request.validate_shape(2..=2)?;
        let models = request
            .bt_names
            .iter()
            .map(|name| {
                self.registry.lookup(name).ok_or_else(|| {
                    tracing::warn!("Even split skipped: workload '{}' is not registered", name);
                    ReductionError::UnknownWorkload(name.clone())
                })
            })
            .collect::<Result<Vec<Arc<PerformanceModel>>, _>>()?;

        let cores = request.target_cpus.div_ceil(2);
        let mem = request.target_mem.div_ceil(2);

        let reductions: Vec<_> = request
            .bt_names
            .iter()
            .zip(&models)
            .map(|(name, model)| self.projector.record(name, model, cores, mem))
            .collect();
        let objective_value = reductions.iter().map(|r| r.predicted_loss).sum();

        tracing::info!(
            "Even split for '{}': {} cores / {} MB from each of {:?}",
            request.lc_name,
            cores,
            mem,
            request.bt_names
        );

        Ok(ReductionDecision {
            id: Uuid::new_v4(),
            lc_name: request.lc_name.clone(),
            strategy: ReductionStrategy::EvenSplit,
            target_cpus: request.target_cpus,
            target_mem: request.target_mem,
            reductions,
            objective_value,
        })
    }
}
