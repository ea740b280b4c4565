//! Run lifecycle: consistency counters and cleanup-and-redeploy
//!
//! Both execution strategies lean on these helpers so the batch accounting
//! and the between-run reset live in one place.

use std::sync::Arc;
use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::HarnessError;
use crate::models::Workload;

/// History records are deleted in bounded pages to avoid unbounded
/// single-transaction deletes.
const HISTORY_PAGE_SIZE: usize = 100;

/// Before/after counters over the engine's persisted completed-instance
/// history. Valid for a single run only; recomputed every run.
pub struct ConsistencyCheck {
    before: u64,
}

impl ConsistencyCheck {
    /// Snapshots the completed count immediately before a run starts.
    pub fn take(engine: &Arc<dyn Engine>) -> Result<Self, HarnessError> {
        let before = engine.count_completed_instances()?;
        Ok(Self { before })
    }

    pub fn count_before(&self) -> u64 {
        self.before
    }

    /// Re-counts after the run drained and compares against the number of
    /// units of work that were submitted. Only meaningful with history
    /// recording enabled.
    pub fn verify(&self, engine: &Arc<dyn Engine>, expected: u64) -> Result<(), HarnessError> {
        let after = engine.count_completed_instances()?;
        let actual = after.saturating_sub(self.before);
        debug!(
            "verifying completed instances: expected {}, counted {}",
            expected, actual
        );
        if actual != expected {
            return Err(HarnessError::ConsistencyMismatch { expected, actual });
        }
        Ok(())
    }
}

/// Deployment and history reset between runs. Must never overlap with a
/// live batch; the driver only calls it with no workers active.
pub struct EngineLifecycle {
    engine: Arc<dyn Engine>,
    catalog: Vec<Workload>,
}

impl EngineLifecycle {
    pub fn new(engine: Arc<dyn Engine>, catalog: Vec<Workload>) -> Self {
        Self { engine, catalog }
    }

    /// Deploys every catalog workload.
    pub fn deploy_catalog(&self) -> Result<(), HarnessError> {
        info!("deploying {} catalog workloads", self.catalog.len());
        for workload in &self.catalog {
            self.engine.deploy(workload)?;
        }
        Ok(())
    }

    /// Resets the engine to an empty, deterministic baseline: cascade-delete
    /// every deployment, page through completed-instance history deleting
    /// until none remain, assert the count is zero, then redeploy the
    /// catalog fresh.
    pub fn clean_and_redeploy(&self) -> Result<(), HarnessError> {
        let deployments = self.engine.list_deployments()?;
        info!("removing {} deployments", deployments.len());
        for deployment in &deployments {
            self.engine.delete_deployment(&deployment.id, true)?;
        }

        info!(
            "removing {} completed instances",
            self.engine.count_completed_instances()?
        );
        let mut deleted = 0u64;
        loop {
            let page = self
                .engine
                .list_completed_instances(0, HISTORY_PAGE_SIZE)?;
            if page.is_empty() {
                break;
            }
            for instance in &page {
                self.engine.delete_completed_instance(&instance.id)?;
                deleted += 1;
                if deleted % 500 == 0 {
                    debug!("deleted {} completed instances", deleted);
                }
            }
        }

        let remaining = self.engine.count_completed_instances()?;
        if remaining != 0 {
            return Err(HarnessError::CleanupIncomplete { remaining });
        }

        self.deploy_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryMode;
    use crate::engine::SimEngine;

    fn setup() -> (Arc<dyn Engine>, EngineLifecycle) {
        let catalog = vec![Workload::new("a"), Workload::new("b")];
        let engine: Arc<dyn Engine> = Arc::new(SimEngine::new(HistoryMode::Audit));
        let lifecycle = EngineLifecycle::new(Arc::clone(&engine), catalog);
        lifecycle.deploy_catalog().unwrap();
        (engine, lifecycle)
    }

    #[test]
    fn test_verify_passes_on_matching_count() {
        let (engine, _lifecycle) = setup();
        let check = ConsistencyCheck::take(&engine).unwrap();
        engine.start_instance("a").unwrap();
        engine.start_instance("b").unwrap();
        assert!(check.verify(&engine, 2).is_ok());
    }

    #[test]
    fn test_verify_reports_both_counts() {
        let (engine, _lifecycle) = setup();
        let check = ConsistencyCheck::take(&engine).unwrap();
        engine.start_instance("a").unwrap();

        match check.verify(&engine, 3) {
            Err(HarnessError::ConsistencyMismatch { expected, actual }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 1);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_ignores_history_from_earlier_runs() {
        let (engine, _lifecycle) = setup();
        engine.start_instance("a").unwrap();

        // Snapshot taken after pre-existing history: only new work counts.
        let check = ConsistencyCheck::take(&engine).unwrap();
        assert_eq!(check.count_before(), 1);
        engine.start_instance("b").unwrap();
        assert!(check.verify(&engine, 1).is_ok());
    }

    #[test]
    fn test_clean_and_redeploy_is_idempotent() {
        let (engine, lifecycle) = setup();
        // Exceed the page size so paging actually loops.
        for _ in 0..250 {
            engine.start_instance("a").unwrap();
        }

        lifecycle.clean_and_redeploy().unwrap();
        assert_eq!(engine.count_completed_instances().unwrap(), 0);
        assert_eq!(engine.list_deployments().unwrap().len(), 2);

        lifecycle.clean_and_redeploy().unwrap();
        assert_eq!(engine.count_completed_instances().unwrap(), 0);
        assert_eq!(engine.list_deployments().unwrap().len(), 2);
    }
}
