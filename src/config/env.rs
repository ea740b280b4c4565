//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

#![allow(dead_code)]

use std::env;
use std::path::PathBuf;

use super::{EngineMode, HarnessConfig, HistoryMode};

/// Environment variable prefix
const ENV_PREFIX: &str = "FLOWBENCH";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Executions from FLOWBENCH_EXECUTIONS
    pub executions: Option<u32>,
    /// Worker ceiling from FLOWBENCH_MAX_WORKERS
    pub max_workers: Option<usize>,
    /// History mode from FLOWBENCH_HISTORY
    pub history: Option<HistoryMode>,
    /// Engine mode from FLOWBENCH_ENGINE
    pub engine: Option<EngineMode>,
    /// Profiling from FLOWBENCH_PROFILING
    pub profiling: Option<bool>,
    /// Ordering seed from FLOWBENCH_SEED
    pub seed: Option<u64>,
    /// Per-instance delay from FLOWBENCH_DELAY_MS
    pub delay_ms: Option<u64>,
    /// Profile log path from FLOWBENCH_PROFILE_LOG
    pub profile_log: Option<PathBuf>,
    /// Config file from FLOWBENCH_CONFIG
    pub config_file: Option<String>,
    /// Verbose from FLOWBENCH_VERBOSE
    pub verbose: Option<bool>,
    /// Output format from FLOWBENCH_FORMAT
    pub format: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            executions: get_env_parse("EXECUTIONS"),
            max_workers: get_env_parse("MAX_WORKERS"),
            history: get_env("HISTORY").and_then(|v| HistoryMode::from_str(&v)),
            engine: get_env("ENGINE").and_then(|v| EngineMode::from_str(&v)),
            profiling: get_env_bool("PROFILING"),
            seed: get_env_parse("SEED"),
            delay_ms: get_env_parse("DELAY_MS"),
            profile_log: get_env("PROFILE_LOG").map(PathBuf::from),
            config_file: get_env("CONFIG"),
            verbose: get_env_bool("VERBOSE"),
            format: get_env("FORMAT"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.executions.is_some()
            || self.max_workers.is_some()
            || self.history.is_some()
            || self.engine.is_some()
            || self.profiling.is_some()
            || self.seed.is_some()
            || self.delay_ms.is_some()
            || self.profile_log.is_some()
            || self.config_file.is_some()
            || self.verbose.is_some()
            || self.format.is_some()
    }

    /// Overlay the set variables onto a configuration bundle.
    pub fn apply_to(&self, config: &mut HarnessConfig) {
        if let Some(executions) = self.executions {
            config.repetitions = executions;
        }
        if let Some(max_workers) = self.max_workers {
            config.max_workers = max_workers;
        }
        if let Some(history) = self.history {
            config.history = history;
        }
        if let Some(engine) = self.engine {
            config.engine_mode = engine;
        }
        if let Some(profiling) = self.profiling {
            config.profiling = profiling;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(delay_ms) = self.delay_ms {
            config.instance_delay_ms = delay_ms;
        }
        if let Some(profile_log) = &self.profile_log {
            config.profile_log = profile_log.clone();
        }
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all FLOWBENCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_EXECUTIONS   Executions per workload (sequential) / total (randomized)");
    println!("  {ENV_PREFIX}_MAX_WORKERS  Highest worker count to benchmark");
    println!("  {ENV_PREFIX}_HISTORY      History mode (none, activity, audit, full)");
    println!("  {ENV_PREFIX}_ENGINE       Engine mode (embedded, external)");
    println!("  {ENV_PREFIX}_PROFILING    Enable command profiling (true/false)");
    println!("  {ENV_PREFIX}_SEED         Seed for the randomized ordering");
    println!("  {ENV_PREFIX}_DELAY_MS     Simulated per-instance engine latency");
    println!("  {ENV_PREFIX}_PROFILE_LOG  Path of the profiling log file");
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  {ENV_PREFIX}_VERBOSE      Enable verbose output (true/false)");
    println!("  {ENV_PREFIX}_FORMAT       Output format (table, json, csv)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_EXECUTIONS=500");
    println!("  export {ENV_PREFIX}_PROFILING=true");
    println!("  flowbench run --max-workers 10");
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn executions(mut self, executions: u32) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_EXECUTIONS"), executions.to_string()));
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_MAX_WORKERS"), max_workers.to_string()));
        self
    }

    pub fn history(mut self, history: &str) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_HISTORY"), history.to_string()));
        self
    }

    pub fn profiling(mut self, profiling: bool) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_PROFILING"), profiling.to_string()));
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_SEED"), seed.to_string()));
        self
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}
