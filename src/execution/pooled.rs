//! Worker-pool strategy
//!
//! Same contract as the sequential strategy, but work items are submitted
//! to a fixed pool of worker threads. A batch is drained completely before
//! the next one starts; completion order inside a batch is unspecified and
//! only the batch's wall-clock span is meaningful.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

use super::{
    randomized_sequence, BenchmarkExecution, ConsistencyCheck, EngineLifecycle, UnitOfWork,
    WaitGroup, WorkerPool,
};
use crate::engine::Engine;
use crate::error::HarnessError;
use crate::models::{composite_label, BenchmarkResult, ExecutionOrder, ExecutionSample, Workload};
use crate::utils::timer::Timer;

pub struct PooledExecution {
    engine: Arc<dyn Engine>,
    lifecycle: EngineLifecycle,
    workers: usize,
    seed: u64,
}

impl PooledExecution {
    pub fn new(engine: Arc<dyn Engine>, catalog: Vec<Workload>, workers: usize, seed: u64) -> Self {
        let lifecycle = EngineLifecycle::new(Arc::clone(&engine), catalog);
        Self {
            engine,
            lifecycle,
            workers: workers.max(1),
            seed,
        }
    }

    /// Submits one batch and blocks until it drains. The first failure is
    /// kept, later units short-circuit, and the error surfaces only after
    /// the barrier so no unit is left running.
    fn run_batch(
        &self,
        pool: &WorkerPool,
        units: Vec<Workload>,
        collect_samples: bool,
    ) -> Result<(Vec<ExecutionSample>, Duration), HarnessError> {
        let wg = WaitGroup::new(units.len());
        let samples = Arc::new(Mutex::new(Vec::with_capacity(if collect_samples {
            units.len()
        } else {
            0
        })));
        let failure: Arc<Mutex<Option<HarnessError>>> = Arc::new(Mutex::new(None));
        let batch = Timer::start("batch drain");

        for workload in units {
            let engine = Arc::clone(&self.engine);
            let wg = wg.clone();
            let samples = Arc::clone(&samples);
            let failure = Arc::clone(&failure);

            pool.submit(move || {
                let already_failed = failure
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .is_some();
                if !already_failed {
                    let mut unit = UnitOfWork::new(workload, engine);
                    match unit.run() {
                        Ok(()) => {
                            if collect_samples {
                                if let Some(sample) = unit.sample() {
                                    samples
                                        .lock()
                                        .unwrap_or_else(|e| e.into_inner())
                                        .push(sample);
                                }
                            }
                        }
                        Err(err) => {
                            let mut slot = failure.lock().unwrap_or_else(|e| e.into_inner());
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                        }
                    }
                }
                wg.done();
            });
        }

        wg.wait();
        let elapsed = batch.stop();

        if let Some(err) = failure.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(err);
        }

        let samples = std::mem::take(&mut *samples.lock().unwrap_or_else(|e| e.into_inner()));
        Ok((samples, elapsed))
    }

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

impl BenchmarkExecution for PooledExecution {
    fn workers(&self) -> usize {
        self.workers
    }

    fn sequential_execution(
        &self,
        workloads: &[Workload],
        repetitions: u32,
        history_enabled: bool,
    ) -> Result<BenchmarkResult, HarnessError> {
        let check = ConsistencyCheck::take(&self.engine)?;
        let mut result = BenchmarkResult::new(self.workers, ExecutionOrder::Sequential);
        let pool = WorkerPool::new(self.workers);

        for workload in workloads {
            info!(
                "[seq/pool-{}] starting {} executions of {}",
                self.workers, repetitions, workload
            );
            let units = vec![workload.clone(); repetitions as usize];
            let (samples, elapsed) = self.run_batch(&pool, units, true)?;

            for sample in samples {
                result.add_sample(sample);
            }
            result.add_batch_total(workload.id(), repetitions as u64, elapsed);
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
        let mut result = BenchmarkResult::new(self.workers, ExecutionOrder::Randomized);
        let pool = WorkerPool::new(self.workers);

        let sequence = randomized_sequence(workloads, total_repetitions, self.seed);
        info!(
            "[rnd/pool-{}] starting {} randomized executions (seed {})",
            self.workers, total_repetitions, self.seed
        );
        let (_, elapsed) = self.run_batch(&pool, sequence, false)?;

        result.add_batch_total(
            composite_label(workloads),
            total_repetitions as u64,
            elapsed,
        );

        self.finish(&check, total_repetitions as u64, history_enabled)?;
        Ok(result)
    }
}
