//! Data models shared across the harness

mod result;
mod workload;

pub use result::{BatchTotal, BenchmarkResult, ExecutionOrder, ExecutionSample};
pub use workload::{composite_label, Workload};
