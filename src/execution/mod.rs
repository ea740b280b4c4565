//! Execution strategies
//!
//! Turns the workload catalog and a concurrency configuration into timed,
//! verified runs. Two strategies share the contract: single-thread
//! sequential execution and a fixed-size worker pool.

mod lifecycle;
mod pool;
mod pooled;
mod runner;
mod sequential;

pub use lifecycle::{ConsistencyCheck, EngineLifecycle};
pub use pool::{WaitGroup, WorkerPool};
pub use pooled::PooledExecution;
pub use runner::UnitOfWork;
pub use sequential::SequentialExecution;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::HarnessError;
use crate::models::{BenchmarkResult, Workload};

/// One benchmark execution strategy.
///
/// Both operations measure a full pass over the workload set, verify the
/// engine's completed-instance history against the submitted count when
/// history is enabled, and end with a cleanup-and-redeploy cycle so the
/// next run starts from an empty baseline. A workload execution failure
/// aborts the run before verification and cleanup.
pub trait BenchmarkExecution {
    /// Worker count this strategy runs with.
    fn workers(&self) -> usize;

    /// Runs `repetitions` instances of every workload in catalog order,
    /// recording each individual duration plus a batch total per workload.
    fn sequential_execution(
        &self,
        workloads: &[Workload],
        repetitions: u32,
        history_enabled: bool,
    ) -> Result<BenchmarkResult, HarnessError>;

    /// Runs `total_repetitions` uniform random picks over the catalog.
    ///
    /// Deliberately records only one aggregate batch total keyed by the
    /// composite catalog label: randomized mode measures mixed-load
    /// throughput, not per-workload cost, so individual samples are
    /// discarded by design.
    fn random_execution(
        &self,
        workloads: &[Workload],
        total_repetitions: u32,
        history_enabled: bool,
    ) -> Result<BenchmarkResult, HarnessError>;
}

/// Builds the randomized pick sequence: uniform over the catalog, with
/// replacement, reproducible from the seed.
pub fn randomized_sequence(workloads: &[Workload], total: u32, seed: u64) -> Vec<Workload> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..total)
        .map(|_| workloads[rng.random_range(0..workloads.len())].clone())
        .collect()
}
