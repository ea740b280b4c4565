//! Simulated workflow engine
//!
//! In-process stand-in behind the [`Engine`] trait: instances complete
//! synchronously, deployments and completed-instance history live in memory,
//! and every command runs through the interceptor chain. Used by the binary
//! in embedded mode and throughout the test suite.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tracing::debug;

use super::{
    intercepted, CommandInterceptor, CommandKind, CompletedInstance, Deployment, Engine,
    EngineError,
};
use crate::config::HistoryMode;
use crate::models::Workload;

#[derive(Default)]
struct SimState {
    deployments: Vec<Deployment>,
    completed: Vec<CompletedInstance>,
}

/// Simulated engine. All state sits behind one mutex; the per-instance
/// delay is slept outside the lock so worker threads actually overlap.
pub struct SimEngine {
    history: HistoryMode,
    instance_delay: Duration,
    failing: HashSet<String>,
    interceptors: Vec<Arc<dyn CommandInterceptor>>,
    state: Mutex<SimState>,
    next_id: AtomicU64,
}

impl SimEngine {
    pub fn new(history: HistoryMode) -> Self {
        Self {
            history,
            instance_delay: Duration::ZERO,
            failing: HashSet::new(),
            interceptors: Vec::new(),
            state: Mutex::new(SimState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Fixed latency added to every instance execution.
    pub fn with_instance_delay(mut self, delay: Duration) -> Self {
        self.instance_delay = delay;
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn CommandInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Marks a workload whose instances fail on start. Test hook for the
    /// abort-path behavior.
    pub fn with_failing_workload(mut self, workload_id: impl Into<String>) -> Self {
        self.failing.insert(workload_id.into());
        self
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn run<T>(
        &self,
        kind: CommandKind,
        body: impl FnOnce() -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        intercepted(&self.interceptors, kind, body)
    }
}

impl Engine for SimEngine {
    fn start_instance(&self, workload_id: &str) -> Result<String, EngineError> {
        self.run(CommandKind::StartInstance, || {
            {
                let state = self.state();
                if !state.deployments.iter().any(|d| d.workload == workload_id) {
                    return Err(EngineError::NotDeployed(workload_id.to_string()));
                }
            }

            if self.failing.contains(workload_id) {
                return Err(EngineError::Execution {
                    workload: workload_id.to_string(),
                    reason: "injected failure".to_string(),
                });
            }

            if !self.instance_delay.is_zero() {
                thread::sleep(self.instance_delay);
            }

            let id = self.next_id("instance");
            if self.history.enabled() {
                self.state().completed.push(CompletedInstance {
                    id: id.clone(),
                    workload: workload_id.to_string(),
                    ended_at: Utc::now(),
                });
            }
            Ok(id)
        })
    }

    fn deploy(&self, workload: &Workload) -> Result<String, EngineError> {
        self.run(CommandKind::Deploy, || {
            let id = self.next_id("deployment");
            debug!("deploying {} as {}", workload, id);
            self.state().deployments.push(Deployment {
                id: id.clone(),
                workload: workload.id().to_string(),
                deployed_at: Utc::now(),
            });
            Ok(id)
        })
    }

    fn list_deployments(&self) -> Result<Vec<Deployment>, EngineError> {
        self.run(CommandKind::ListDeployments, || {
            Ok(self.state().deployments.clone())
        })
    }

    fn delete_deployment(&self, id: &str, _cascade: bool) -> Result<(), EngineError> {
        self.run(CommandKind::DeleteDeployment, || {
            let mut state = self.state();
            let before = state.deployments.len();
            state.deployments.retain(|d| d.id != id);
            if state.deployments.len() == before {
                return Err(EngineError::UnknownDeployment(id.to_string()));
            }
            Ok(())
        })
    }

    fn count_completed_instances(&self) -> Result<u64, EngineError> {
        self.run(CommandKind::CountHistory, || {
            Ok(self.state().completed.len() as u64)
        })
    }

    fn list_completed_instances(
        &self,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<CompletedInstance>, EngineError> {
        self.run(CommandKind::ListHistory, || {
            let state = self.state();
            Ok(state
                .completed
                .iter()
                .skip(offset)
                .take(page_size)
                .cloned()
                .collect())
        })
    }

    fn delete_completed_instance(&self, id: &str) -> Result<(), EngineError> {
        self.run(CommandKind::DeleteHistoricInstance, || {
            let mut state = self.state();
            let before = state.completed.len();
            state.completed.retain(|c| c.id != id);
            if state.completed.len() == before {
                return Err(EngineError::UnknownInstance(id.to_string()));
            }
            Ok(())
        })
    }
}
