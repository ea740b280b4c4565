//! Optional profiling pipeline
//!
//! An interceptor that times every engine-internal command into an
//! append-only log, and a parser that reconstructs per-operation statistics
//! from that log after the run.

mod interceptor;
mod parser;

pub use interceptor::{ProfilingInterceptor, ProfilingLog};
pub use parser::{OperationStats, ProfileSummary, ProfilingLogParser};
