//! Benchmark driver
//!
//! Walks the concurrency levels: level 1 runs on the single-thread
//! strategy, levels 2..=max_workers on the worker pool. Every level runs
//! sequential ordering first, then randomized ordering, each producing one
//! result. Fatal errors abort the whole benchmark immediately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

use crate::config::{EngineMode, HarnessConfig};
use crate::engine::{Engine, SimEngine};
use crate::error::HarnessError;
use crate::execution::{
    BenchmarkExecution, EngineLifecycle, PooledExecution, SequentialExecution,
};
use crate::models::BenchmarkResult;
use crate::profiling::{ProfileSummary, ProfilingInterceptor, ProfilingLog, ProfilingLogParser};

/// Delay between flushing the profiling writer and reading the log back,
/// so the parser only ever sees an idle, fully flushed file.
const PROFILE_SETTLE: Duration = Duration::from_millis(500);

/// Everything one benchmark invocation produced.
#[derive(Debug, Serialize)]
pub struct HarnessReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seed: u64,
    /// One entry per concurrency level, sequential ordering.
    pub sequential: Vec<BenchmarkResult>,
    /// One entry per concurrency level, randomized ordering.
    pub randomized: Vec<BenchmarkResult>,
    pub profile: Option<ProfileSummary>,
}

pub struct Harness {
    config: HarnessConfig,
    engine: Arc<dyn Engine>,
    profiling_log: Option<Arc<ProfilingLog>>,
}

impl Harness {
    /// Builds the engine per the configured mode and wires the profiling
    /// interceptor when requested. Configuration conflicts surface here,
    /// before any run begins.
    pub fn from_config(config: HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;

        let mut engine = SimEngine::new(config.history)
            .with_instance_delay(Duration::from_millis(config.instance_delay_ms));

        let mut profiling_log = None;
        if config.profiling && config.engine_mode == EngineMode::Embedded {
            let log = Arc::new(ProfilingLog::create(&config.profile_log)?);
            engine = engine.with_interceptor(Arc::new(ProfilingInterceptor::new(Arc::clone(&log))));
            info!("profiling enabled, log at {}", log.path().display());
            profiling_log = Some(log);
        }

        Ok(Self {
            config,
            engine: Arc::new(engine),
            profiling_log,
        })
    }

    /// Drives a caller-provided engine. No interceptor can be injected on
    /// this path, so profiling must be off.
    pub fn with_engine(config: HarnessConfig, engine: Arc<dyn Engine>) -> Result<Self, HarnessError> {
        config.validate()?;
        if config.profiling {
            return Err(HarnessError::ConfigurationConflict(
                "profiling cannot be enabled on a caller-provided engine".to_string(),
            ));
        }
        Ok(Self {
            config,
            engine,
            profiling_log: None,
        })
    }

    pub fn run(&self) -> Result<HarnessReport, HarnessError> {
        let started_at = Utc::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!("randomized ordering seed: {}", seed);

        let catalog = self.config.catalog.clone();
        let history = self.config.history_enabled();
        let repetitions = self.config.repetitions;

        EngineLifecycle::new(Arc::clone(&self.engine), catalog.clone()).deploy_catalog()?;

        let mut sequential = Vec::new();
        let mut randomized = Vec::new();

        info!("benchmarking with one thread");
        let single = SequentialExecution::new(Arc::clone(&self.engine), catalog.clone(), seed);
        sequential.push(single.sequential_execution(&catalog, repetitions, history)?);
        randomized.push(single.random_execution(&catalog, repetitions, history)?);

        for workers in 2..=self.config.max_workers {
            info!("benchmarking with a fixed pool of {} workers", workers);
            let pooled =
                PooledExecution::new(Arc::clone(&self.engine), catalog.clone(), workers, seed);
            sequential.push(pooled.sequential_execution(&catalog, repetitions, history)?);
            randomized.push(pooled.random_execution(&catalog, repetitions, history)?);
        }

        let profile = match &self.profiling_log {
            Some(log) => {
                info!("generating profile report");
                log.flush()?;
                thread::sleep(PROFILE_SETTLE);
                Some(ProfilingLogParser::new(log.path()).execute()?)
            }
            None => None,
        };

        Ok(HarnessReport {
            started_at,
            finished_at: Utc::now(),
            seed,
            sequential,
            randomized,
            profile,
        })
    }
}
