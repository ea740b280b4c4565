//! Benchmark result aggregation
//!
//! One `BenchmarkResult` per (concurrency level, ordering mode) run. It is
//! mutated only by the strategy that produced it and read-only once handed
//! back to the driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Ordering mode a run was executed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOrder {
    /// Workloads in catalog order, one batch per workload.
    Sequential,
    /// A single batch of uniform random picks over the catalog.
    Randomized,
}

impl ExecutionOrder {
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionOrder::Sequential => "sequential",
            ExecutionOrder::Randomized => "randomized",
        }
    }
}

impl fmt::Display for ExecutionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Timing record for one executed unit of work.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionSample {
    pub workload: String,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
}

/// Aggregate wall-clock measurement for one drained batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchTotal {
    pub label: String,
    pub instances: u64,
    pub total_ms: u64,
}

impl BatchTotal {
    pub fn avg_ms(&self) -> f64 {
        if self.instances == 0 {
            0.0
        } else {
            self.total_ms as f64 / self.instances as f64
        }
    }
}

/// Timing results for one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Worker count the run executed with (1 for the single-thread strategy).
    pub workers: usize,
    pub ordering: ExecutionOrder,
    /// Per-workload individual samples (sequential ordering only).
    samples: BTreeMap<String, Vec<ExecutionSample>>,
    /// Batch totals in the order the batches were drained.
    totals: Vec<BatchTotal>,
}

impl BenchmarkResult {
    pub fn new(workers: usize, ordering: ExecutionOrder) -> Self {
        Self {
            workers,
            ordering,
            samples: BTreeMap::new(),
            totals: Vec::new(),
        }
    }

    pub fn add_sample(&mut self, sample: ExecutionSample) {
        self.samples
            .entry(sample.workload.clone())
            .or_default()
            .push(sample);
    }

    pub fn add_batch_total(&mut self, label: impl Into<String>, instances: u64, total: Duration) {
        self.totals.push(BatchTotal {
            label: label.into(),
            instances,
            total_ms: total.as_millis() as u64,
        });
    }

    pub fn samples(&self) -> &BTreeMap<String, Vec<ExecutionSample>> {
        &self.samples
    }

    pub fn samples_for(&self, workload: &str) -> &[ExecutionSample] {
        self.samples.get(workload).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn totals(&self) -> &[BatchTotal] {
        &self.totals
    }

    /// Mean individual duration for a workload, if samples were recorded.
    pub fn avg_sample_ms(&self, workload: &str) -> Option<f64> {
        let samples = self.samples.get(workload)?;
        if samples.is_empty() {
            return None;
        }
        let sum: u64 = samples.iter().map(|s| s.duration_ms).sum();
        Some(sum as f64 / samples.len() as f64)
    }

    /// Number of units of work accounted for across all batches.
    pub fn total_instances(&self) -> u64 {
        self.totals.iter().map(|t| t.instances).sum()
    }

    pub fn total_ms(&self) -> u64 {
        self.totals.iter().map(|t| t.total_ms).sum()
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} workers, {} ordering: {} instances in {}ms",
            self.workers,
            self.ordering,
            self.total_instances(),
            self.total_ms()
        )?;
        for total in &self.totals {
            writeln!(
                f,
                "  {:30} {:>6} x {:>8}ms (avg {:.2}ms)",
                total.label,
                total.instances,
                total.total_ms,
                total.avg_ms()
            )?;
        }
        Ok(())
    }
}
