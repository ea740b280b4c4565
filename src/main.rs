//! flowbench - Workflow Engine Benchmark Harness
//!
//! A CLI tool for load-generating a workflow execution engine and measuring
//! throughput across concurrency levels.
//!
//! ## Features
//!
//! - Sequential and seeded-random workload ordering
//! - Concurrency sweep from one thread up to a fixed worker-pool ceiling
//! - History-based consistency verification after every run
//! - Optional per-command profiling with a parseable timing log
//! - Multiple output formats (Table, JSON, CSV)
//!
//! ## Usage
//!
//! ```bash
//! # Run the default catalog, 100 executions, up to 4 workers
//! flowbench run
//!
//! # Heavier sweep with profiling
//! flowbench run --executions 500 --max-workers 10 --profiling
//!
//! # Reproducible randomized ordering
//! flowbench run --seed 42 --format json --output report.json
//!
//! # Summarize a profiling log from an earlier run
//! flowbench parse-profile flowbench-profile.log
//!
//! # Write an example configuration
//! flowbench config init
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod config;
mod engine;
mod error;
mod execution;
mod harness;
mod models;
mod output;
mod profiling;
mod utils;

use cli::Args;
use config::{ConfigFile, EngineMode, EnvConfig, HarnessConfig, HistoryMode};
use harness::Harness;
use output::{write_report_to_file, OutputFormat, ReportFormatter};
use profiling::ProfilingLogParser;
use utils::logger::{init_logger, LogLevel};

fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let verbose = args.verbose || env.verbose.unwrap_or(false);
    init_logger(if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    match args.command {
        cli::Command::Run(run_args) => {
            run_benchmark(run_args, env)?;
        }
        cli::Command::List(list_args) => {
            list_workloads(list_args, &env)?;
        }
        cli::Command::ParseProfile(parse_args) => {
            parse_profile(parse_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args)?;
        }
    }

    Ok(())
}

/// Resolve the effective configuration: file, then environment variables,
/// then command-line flags, later sources winning.
fn load_config(path: Option<&std::path::Path>, env: &EnvConfig) -> Result<HarnessConfig> {
    let file = match path {
        Some(path) => ConfigFile::load(path)?,
        None => match &env.config_file {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::load_default()?,
        },
    };

    let mut config = file.harness;
    env.apply_to(&mut config);
    Ok(config)
}

fn run_benchmark(args: cli::RunArgs, env: EnvConfig) -> Result<()> {
    let mut config = load_config(args.config.as_deref(), &env)?;

    if let Some(executions) = args.executions {
        config.repetitions = executions;
    }
    if let Some(max_workers) = args.max_workers {
        config.max_workers = max_workers;
    }
    if let Some(history) = &args.history {
        config.history = HistoryMode::from_str(history)
            .ok_or_else(|| anyhow::anyhow!("Unknown history mode: {}", history))?;
    }
    if let Some(engine) = &args.engine {
        config.engine_mode = EngineMode::from_str(engine)
            .ok_or_else(|| anyhow::anyhow!("Unknown engine mode: {}", engine))?;
    }
    if args.profiling {
        config.profiling = true;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(delay_ms) = args.delay_ms {
        config.instance_delay_ms = delay_ms;
    }
    if let Some(profile_log) = &args.profile_log {
        config.profile_log = profile_log.clone();
    }

    let format_name = if args.format == "table" {
        env.format.clone().unwrap_or(args.format)
    } else {
        args.format
    };
    let format = OutputFormat::from_str(&format_name)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", format_name))?;

    info!(
        "benchmarking {} workload(s), {} executions, up to {} workers",
        config.catalog.len(),
        config.repetitions,
        config.max_workers
    );

    let report = Harness::from_config(config)?.run()?;

    let formatter = ReportFormatter::new(format);
    println!("{}", formatter.format_report(&report)?);

    if let Some(path) = &args.output {
        write_report_to_file(path, &report, format)?;
        info!("report written to {}", path.display());
    }

    Ok(())
}

fn list_workloads(args: cli::ListArgs, env: &EnvConfig) -> Result<()> {
    let config = load_config(args.config.as_deref(), env)?;

    println!("Workload catalog ({} entries):", config.catalog.len());
    for (index, workload) in config.catalog.iter().enumerate() {
        println!("  {:2}. {}", index + 1, workload);
    }
    println!();
    println!("History mode: {}", config.history);
    println!("Engine mode:  {}", config.engine_mode);

    Ok(())
}

fn parse_profile(args: cli::ParseProfileArgs) -> Result<()> {
    let summary = ProfilingLogParser::new(&args.log).execute()?;

    println!("{}", summary.render());
    println!("{} records total", summary.total_records());
    if summary.skipped_lines > 0 {
        println!("{} malformed line(s) skipped", summary.skipped_lines);
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { path } => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            ConfigFile::example().save(&path)?;
            println!("Wrote example configuration to {}", path.display());
        }
        cli::ConfigAction::Show { config } => {
            let file = match config {
                Some(path) => ConfigFile::load(path)?,
                None => ConfigFile::load_default()?,
            };
            print!("{}", serde_yaml::to_string(&file)?);
        }
        cli::ConfigAction::Env => {
            config::print_env_help();
        }
    }

    Ok(())
}
