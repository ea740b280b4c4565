//! Harness error types
//!
//! Every kind here is fatal for the run it occurs in: timing numbers are
//! meaningless once work stopped completing as counted, so there is no
//! partial-result salvage.

use thiserror::Error;

use crate::engine::EngineError;

/// Fatal harness errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// An engine call failed while executing a unit of work.
    #[error("workload execution failed: {0}")]
    WorkloadExecution(#[from] EngineError),

    /// The completed-instance count after a run does not match the number
    /// of units of work that were submitted.
    #[error("completed instance count mismatch: expected {expected}, found {actual}")]
    ConsistencyMismatch { expected: u64, actual: u64 },

    /// Cleanup finished but completed instances are still present.
    #[error("cleanup incomplete: {remaining} completed instances left behind")]
    CleanupIncomplete { remaining: u64 },

    /// An invalid option combination, rejected before any run starts.
    #[error("configuration conflict: {0}")]
    ConfigurationConflict(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
