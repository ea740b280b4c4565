//! Unit-of-work runner
//!
//! Executes one workload instance end-to-end and records its wall-clock
//! duration.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::Engine;
use crate::error::HarnessError;
use crate::models::{ExecutionSample, Workload};

/// One instantiation of a workload. `run` blocks until the engine call
/// returns; an engine failure is fatal for the run and never retried.
pub struct UnitOfWork {
    workload: Workload,
    engine: Arc<dyn Engine>,
    started_at: Option<DateTime<Utc>>,
    duration: Option<Duration>,
}

impl UnitOfWork {
    pub fn new(workload: Workload, engine: Arc<dyn Engine>) -> Self {
        Self {
            workload,
            engine,
            started_at: None,
            duration: None,
        }
    }

    pub fn run(&mut self) -> Result<(), HarnessError> {
        self.started_at = Some(Utc::now());
        let timer = Instant::now();
        self.engine.start_instance(self.workload.id())?;
        self.duration = Some(timer.elapsed());
        Ok(())
    }

    /// Wall-clock duration of the engine call; set once `run` returned Ok.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// The execution record for this unit, once it ran to completion.
    pub fn sample(&self) -> Option<ExecutionSample> {
        Some(ExecutionSample {
            workload: self.workload.id().to_string(),
            duration_ms: self.duration?.as_millis() as u64,
            started_at: self.started_at?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryMode;
    use crate::engine::SimEngine;

    #[test]
    fn test_run_records_duration_and_sample() {
        let engine = SimEngine::new(HistoryMode::Audit);
        engine.deploy(&Workload::new("order")).unwrap();
        let engine: Arc<dyn Engine> = Arc::new(engine);

        let mut unit = UnitOfWork::new(Workload::new("order"), engine);
        assert!(unit.duration().is_none());
        assert!(unit.sample().is_none());

        unit.run().unwrap();
        assert!(unit.duration().is_some());
        let sample = unit.sample().expect("sample after run");
        assert_eq!(sample.workload, "order");
    }

    #[test]
    fn test_engine_failure_propagates() {
        let engine: Arc<dyn Engine> = Arc::new(SimEngine::new(HistoryMode::Audit));
        let mut unit = UnitOfWork::new(Workload::new("never-deployed"), engine);

        assert!(matches!(
            unit.run(),
            Err(HarnessError::WorkloadExecution(_))
        ));
        assert!(unit.duration().is_none());
    }
}
