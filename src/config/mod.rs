//! Harness configuration
//!
//! The configuration bundle handed to the driver, plus YAML file loading
//! and environment-variable overrides.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::HarnessError;
use crate::models::Workload;

/// Engine history recording level. Consistency verification depends on
/// persisted history, so it only runs when the mode is not `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    None,
    Activity,
    #[default]
    Audit,
    Full,
}

impl HistoryMode {
    pub fn enabled(&self) -> bool {
        !matches!(self, HistoryMode::None)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(HistoryMode::None),
            "activity" => Some(HistoryMode::Activity),
            "audit" => Some(HistoryMode::Audit),
            "full" => Some(HistoryMode::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryMode::None => "none",
            HistoryMode::Activity => "activity",
            HistoryMode::Audit => "audit",
            HistoryMode::Full => "full",
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who owns engine construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// The harness bootstraps the engine itself and may inject interceptors.
    #[default]
    Embedded,
    /// The engine is provisioned elsewhere; no interception point available.
    External,
}

impl EngineMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "embedded" => Some(EngineMode::Embedded),
            "external" => Some(EngineMode::External),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Embedded => "embedded",
            EngineMode::External => "external",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full configuration bundle for one harness invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Executions per workload in sequential mode, and the total execution
    /// count in randomized mode.
    pub repetitions: u32,
    /// Highest worker count to benchmark; levels 1..=max_workers each run.
    pub max_workers: usize,
    pub history: HistoryMode,
    pub engine_mode: EngineMode,
    pub profiling: bool,
    /// Seed for the randomized ordering; derived from the clock when absent.
    pub seed: Option<u64>,
    /// Workload catalog; defaults to the stock eight process definitions.
    pub catalog: Vec<Workload>,
    /// Where the profiling interceptor appends its log.
    pub profile_log: PathBuf,
    /// Simulated per-instance engine latency in milliseconds.
    pub instance_delay_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            repetitions: 100,
            max_workers: 4,
            history: HistoryMode::default(),
            engine_mode: EngineMode::default(),
            profiling: false,
            seed: None,
            catalog: Workload::default_catalog(),
            profile_log: PathBuf::from("flowbench-profile.log"),
            instance_delay_ms: 0,
        }
    }
}

impl HarnessConfig {
    /// Rejects invalid option combinations before any run starts.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.profiling && self.engine_mode == EngineMode::External {
            return Err(HarnessError::ConfigurationConflict(
                "profiling requires the embedded engine mode; the interceptor \
                 cannot be injected into an externally provisioned engine"
                    .to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(HarnessError::ConfigurationConflict(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.catalog.is_empty() {
            return Err(HarnessError::ConfigurationConflict(
                "the workload catalog is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn history_enabled(&self) -> bool {
        self.history.enabled()
    }
}
