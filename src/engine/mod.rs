//! Workflow-engine interface boundary
//!
//! The harness never implements a workflow engine; it drives one through
//! this trait. Every call is blocking and must be safe to issue from
//! multiple worker threads at once. The [`CommandInterceptor`] chain is the
//! injectable hook around engine-internal command execution that the
//! profiling pipeline plugs into.

mod sim;

pub use sim::SimEngine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by engine calls.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("workload `{0}` is not deployed")]
    NotDeployed(String),

    #[error("execution of workload `{workload}` failed: {reason}")]
    Execution { workload: String, reason: String },

    #[error("unknown deployment `{0}`")]
    UnknownDeployment(String),

    #[error("unknown completed instance `{0}`")]
    UnknownInstance(String),

    #[error("engine internal error: {0}")]
    Internal(&'static str),
}

/// A deployed workload artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub workload: String,
    pub deployed_at: DateTime<Utc>,
}

/// A persisted record of a finished process instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletedInstance {
    pub id: String,
    pub workload: String,
    pub ended_at: DateTime<Utc>,
}

/// Engine-internal command types that flow through the interceptor chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    StartInstance,
    Deploy,
    ListDeployments,
    DeleteDeployment,
    CountHistory,
    ListHistory,
    DeleteHistoricInstance,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::StartInstance => "start-instance",
            CommandKind::Deploy => "deploy",
            CommandKind::ListDeployments => "list-deployments",
            CommandKind::DeleteDeployment => "delete-deployment",
            CommandKind::CountHistory => "count-history",
            CommandKind::ListHistory => "list-history",
            CommandKind::DeleteHistoricInstance => "delete-historic-instance",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps engine-internal command execution. Implementations must delegate
/// to `next` exactly once and propagate its outcome unchanged.
pub trait CommandInterceptor: Send + Sync {
    fn execute(
        &self,
        kind: CommandKind,
        next: &mut dyn FnMut() -> Result<(), EngineError>,
    ) -> Result<(), EngineError>;
}

/// Handle to a running workflow engine. Shared read/write across worker
/// threads; the engine provides its own internal concurrency safety.
pub trait Engine: Send + Sync {
    /// Synchronously start one instance of a deployed workload and return
    /// its instance id.
    fn start_instance(&self, workload_id: &str) -> Result<String, EngineError>;

    fn deploy(&self, workload: &crate::models::Workload) -> Result<String, EngineError>;

    fn list_deployments(&self) -> Result<Vec<Deployment>, EngineError>;

    /// Cascading delete: removes the deployment together with the instances
    /// and definitions it owns.
    fn delete_deployment(&self, id: &str, cascade: bool) -> Result<(), EngineError>;

    fn count_completed_instances(&self) -> Result<u64, EngineError>;

    fn list_completed_instances(
        &self,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<CompletedInstance>, EngineError>;

    fn delete_completed_instance(&self, id: &str) -> Result<(), EngineError>;
}

/// Runs `next` through the interceptor chain, first interceptor outermost.
fn run_chain(
    interceptors: &[Arc<dyn CommandInterceptor>],
    kind: CommandKind,
    next: &mut dyn FnMut() -> Result<(), EngineError>,
) -> Result<(), EngineError> {
    match interceptors.split_first() {
        None => next(),
        Some((head, rest)) => head.execute(kind, &mut || run_chain(rest, kind, next)),
    }
}

/// Executes a typed command body inside the interceptor chain.
pub(crate) fn intercepted<T>(
    interceptors: &[Arc<dyn CommandInterceptor>],
    kind: CommandKind,
    body: impl FnOnce() -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    if interceptors.is_empty() {
        return body();
    }

    let mut body = Some(body);
    let mut value = None;
    run_chain(interceptors, kind, &mut || {
        let body = body
            .take()
            .ok_or(EngineError::Internal("command body invoked more than once"))?;
        value = Some(body()?);
        Ok(())
    })?;
    value.ok_or(EngineError::Internal("command body was never invoked"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl CommandInterceptor for Counting {
        fn execute(
            &self,
            _kind: CommandKind,
            next: &mut dyn FnMut() -> Result<(), EngineError>,
        ) -> Result<(), EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            next()
        }
    }

    #[test]
    fn test_intercepted_runs_body_once() {
        let interceptor = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let chain: Vec<Arc<dyn CommandInterceptor>> = vec![interceptor.clone(), interceptor.clone()];

        let mut body_calls = 0;
        let out = intercepted(&chain, CommandKind::StartInstance, || {
            body_calls += 1;
            Ok(42u64)
        });

        assert_eq!(out.ok(), Some(42));
        assert_eq!(body_calls, 1);
        assert_eq!(interceptor.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_intercepted_propagates_errors() {
        let interceptor: Arc<dyn CommandInterceptor> = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let chain = vec![interceptor];

        let out: Result<u64, _> = intercepted(&chain, CommandKind::Deploy, || {
            Err(EngineError::NotDeployed("missing".into()))
        });

        assert!(matches!(out, Err(EngineError::NotDeployed(_))));
    }

    #[test]
    fn test_empty_chain_runs_body_directly() {
        let out = intercepted(&[], CommandKind::CountHistory, || Ok(7u64));
        assert_eq!(out.ok(), Some(7));
    }
}
