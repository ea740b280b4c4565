//! Single-thread sequential strategy
//!
//! Runs every unit of work back-to-back on the calling thread. Sequential
//! ordering isolates per-workload cost; randomized ordering approximates a
//! mixed workload without thread contention.

use std::sync::Arc;
use tracing::{error, info};

use super::{randomized_sequence, BenchmarkExecution, ConsistencyCheck, EngineLifecycle, UnitOfWork};
use crate::engine::Engine;
use crate::error::HarnessError;
use crate::models::{composite_label, BenchmarkResult, ExecutionOrder, Workload};
use crate::utils::timer::Timer;

pub struct SequentialExecution {
    engine: Arc<dyn Engine>,
    lifecycle: EngineLifecycle,
    seed: u64,
}

impl SequentialExecution {
    pub fn new(engine: Arc<dyn Engine>, catalog: Vec<Workload>, seed: u64) -> Self {
        let lifecycle = EngineLifecycle::new(Arc::clone(&engine), catalog);
        Self {
            engine,
            lifecycle,
            seed,
        }
    }

    /// Cleanup always runs once the work drained, even when verification
    /// failed; the verification error is propagated afterwards.
    fn finish(
        &self,
        check: &ConsistencyCheck,
        expected: u64,
        history_enabled: bool,
    ) -> Result<(), HarnessError> {
        let verification = if history_enabled {
            check.verify(&self.engine, expected)
        } else {
            Ok(())
        };
        if let Err(err) = &verification {
            error!("{err}");
        }
        self.lifecycle.clean_and_redeploy()?;
        verification
    }
}

impl BenchmarkExecution for SequentialExecution {
    fn workers(&self) -> usize {
        1
    }

    fn sequential_execution(
        &self,
        workloads: &[Workload],
        repetitions: u32,
        history_enabled: bool,
    ) -> Result<BenchmarkResult, HarnessError> {
        let check = ConsistencyCheck::take(&self.engine)?;
        let mut result = BenchmarkResult::new(1, ExecutionOrder::Sequential);

        for workload in workloads {
            info!("[seq] starting {} executions of {}", repetitions, workload);
            let batch = Timer::start(format!("batch {workload}"));

            for _ in 0..repetitions {
                let mut unit = UnitOfWork::new(workload.clone(), Arc::clone(&self.engine));
                unit.run()?;
                if let Some(sample) = unit.sample() {
                    result.add_sample(sample);
                }
            }

            result.add_batch_total(workload.id(), repetitions as u64, batch.stop());
        }

        let expected = repetitions as u64 * workloads.len() as u64;
        self.finish(&check, expected, history_enabled)?;
        Ok(result)
    }

    fn random_execution(
        &self,
        workloads: &[Workload],
        total_repetitions: u32,
        history_enabled: bool,
    ) -> Result<BenchmarkResult, HarnessError> {
        let check = ConsistencyCheck::take(&self.engine)?;
        let mut result = BenchmarkResult::new(1, ExecutionOrder::Randomized);

        let sequence = randomized_sequence(workloads, total_repetitions, self.seed);
        info!(
            "[rnd] starting {} randomized executions (seed {})",
            total_repetitions, self.seed
        );
        let batch = Timer::start("randomized batch");

        for workload in &sequence {
            let mut unit = UnitOfWork::new(workload.clone(), Arc::clone(&self.engine));
            unit.run()?;
        }

        result.add_batch_total(
            composite_label(workloads),
            total_repetitions as u64,
            batch.stop(),
        );

        self.finish(&check, total_repetitions as u64, history_enabled)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryMode;
    use crate::engine::SimEngine;

    fn strategy(engine: SimEngine, catalog: &[Workload]) -> SequentialExecution {
        let engine: Arc<dyn Engine> = Arc::new(engine);
        let strategy = SequentialExecution::new(engine, catalog.to_vec(), 42);
        strategy.lifecycle.deploy_catalog().unwrap();
        strategy
    }

    fn catalog_ab() -> Vec<Workload> {
        vec![Workload::new("A"), Workload::new("B")]
    }

    #[test]
    fn test_sequential_scenario_two_workloads_ten_reps() {
        let catalog = catalog_ab();
        let strategy = strategy(SimEngine::new(HistoryMode::Audit), &catalog);

        let result = strategy
            .sequential_execution(&catalog, 10, true)
            .unwrap();

        assert_eq!(result.samples_for("A").len(), 10);
        assert_eq!(result.samples_for("B").len(), 10);
        assert_eq!(result.totals().len(), 2);
        assert_eq!(result.total_instances(), 20);
    }

    #[test]
    fn test_batch_totals_follow_catalog_order() {
        let catalog = vec![Workload::new("zeta"), Workload::new("alpha")];
        let strategy = strategy(SimEngine::new(HistoryMode::Audit), &catalog);

        let result = strategy.sequential_execution(&catalog, 2, true).unwrap();
        let labels: Vec<_> = result.totals().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["zeta", "alpha"]);
    }

    #[test]
    fn test_random_records_single_composite_total() {
        let catalog = catalog_ab();
        let strategy = strategy(SimEngine::new(HistoryMode::Audit), &catalog);

        let result = strategy.random_execution(&catalog, 25, true).unwrap();
        assert_eq!(result.totals().len(), 1);
        assert_eq!(result.totals()[0].label, "A+B");
        assert_eq!(result.totals()[0].instances, 25);
        assert!(result.samples().is_empty());
    }

    #[test]
    fn test_random_zero_repetitions() {
        let catalog = catalog_ab();
        let strategy = strategy(SimEngine::new(HistoryMode::Audit), &catalog);

        let result = strategy.random_execution(&catalog, 0, true).unwrap();
        assert_eq!(result.totals()[0].instances, 0);
        assert_eq!(result.totals()[0].avg_ms(), 0.0);
    }

    #[test]
    fn test_history_disabled_skips_verification() {
        let catalog = catalog_ab();
        let strategy = strategy(SimEngine::new(HistoryMode::None), &catalog);

        // With history off no completed instances are persisted; a
        // verification pass here would report a mismatch.
        strategy.sequential_execution(&catalog, 5, false).unwrap();
    }

    #[test]
    fn test_execution_failure_skips_verify_and_cleanup() {
        let catalog = catalog_ab();
        let engine = SimEngine::new(HistoryMode::Audit).with_failing_workload("B");
        let strategy = strategy(engine, &catalog);

        let err = strategy.sequential_execution(&catalog, 3, true);
        assert!(matches!(err, Err(HarnessError::WorkloadExecution(_))));

        // Cleanup did not run: workload A's history is still present.
        assert_eq!(strategy.engine.count_completed_instances().unwrap(), 3);
    }

    #[test]
    fn test_runs_leave_clean_baseline() {
        let catalog = catalog_ab();
        let strategy = strategy(SimEngine::new(HistoryMode::Audit), &catalog);

        strategy.sequential_execution(&catalog, 4, true).unwrap();
        assert_eq!(strategy.engine.count_completed_instances().unwrap(), 0);

        // Second run starts from the redeployed baseline and verifies cleanly.
        strategy.random_execution(&catalog, 7, true).unwrap();
        assert_eq!(strategy.engine.count_completed_instances().unwrap(), 0);
    }
}
