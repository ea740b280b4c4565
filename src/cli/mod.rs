//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Workflow engine load-generation and measurement harness
#[derive(Parser, Debug)]
#[command(name = "flowbench")]
#[command(version = "0.1.0")]
#[command(about = "Benchmark workflow execution across concurrency levels")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the benchmark
    Run(RunArgs),

    /// List the workload catalog
    List(ListArgs),

    /// Summarize an existing profiling log
    ParseProfile(ParseProfileArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Executions per workload (sequential) and total executions (randomized)
    #[arg(short, long)]
    pub executions: Option<u32>,

    /// Highest worker count to benchmark
    #[arg(short = 'w', long)]
    pub max_workers: Option<usize>,

    /// History mode (none, activity, audit, full)
    #[arg(long)]
    pub history: Option<String>,

    /// Engine mode (embedded, external)
    #[arg(long)]
    pub engine: Option<String>,

    /// Record per-command timing spans to the profiling log
    #[arg(short, long)]
    pub profiling: bool,

    /// Seed for the randomized ordering
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Simulated per-instance engine latency in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save the report to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Profiling log path
    #[arg(long)]
    pub profile_log: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for parse-profile command
#[derive(Parser, Debug)]
pub struct ParseProfileArgs {
    /// Profiling log to summarize
    pub log: PathBuf,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "flowbench.yaml")]
        path: PathBuf,
    },

    /// Show the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List supported environment variables
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "flowbench",
            "run",
            "--executions",
            "500",
            "--max-workers",
            "10",
            "--profiling",
        ]);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.executions, Some(500));
                assert_eq!(run_args.max_workers, Some(10));
                assert!(run_args.profiling);
                assert_eq!(run_args.format, "table");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_config_init_default_path() {
        let args = Args::parse_from(["flowbench", "config", "init"]);
        match args.command {
            Command::Config(config_args) => match config_args.action {
                ConfigAction::Init { path } => {
                    assert_eq!(path, PathBuf::from("flowbench.yaml"));
                }
                _ => panic!("Expected Init action"),
            },
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_profile_positional() {
        let args = Args::parse_from(["flowbench", "parse-profile", "out.log"]);
        match args.command {
            Command::ParseProfile(parse_args) => {
                assert_eq!(parse_args.log, PathBuf::from("out.log"));
            }
            _ => panic!("Expected ParseProfile command"),
        }
    }

    #[test]
    fn test_global_verbose_flag() {
        let args = Args::parse_from(["flowbench", "list", "--verbose"]);
        assert!(args.verbose);
    }
}
