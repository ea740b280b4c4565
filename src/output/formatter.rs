//! Output formatters for benchmark reports
//!
//! Provides table, JSON, and CSV output formats.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::harness::HarnessReport;
use crate::models::BenchmarkResult;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a full benchmark report
    pub fn format_report(&self, report: &HarnessReport) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize report")
            }
            OutputFormat::Csv => self.format_report_csv(report),
        }
    }

    fn format_report_table(&self, report: &HarnessReport) -> String {
        let mut output = String::new();
        let wall_ms = (report.finished_at - report.started_at).num_milliseconds();

        output.push_str(
            "\n╔══════════════════════════════════════════════════════════════════════════╗\n",
        );
        output.push_str(&format!(
            "║  Benchmark Report  (seed {:20}, wall clock {:>9}ms)       ║\n",
            report.seed, wall_ms
        ));
        output.push_str(
            "╚══════════════════════════════════════════════════════════════════════════╝\n",
        );

        output.push_str(
            "\n┌─────────┬────────────┬──────────────────────────┬───────────┬───────────┬───────────┐\n",
        );
        output.push_str(
            "│ Workers │ Ordering   │ Batch                    │ Instances │ Total ms  │ Avg ms    │\n",
        );
        output.push_str(
            "├─────────┼────────────┼──────────────────────────┼───────────┼───────────┼───────────┤\n",
        );

        for result in report.sequential.iter().chain(report.randomized.iter()) {
            for total in result.totals() {
                output.push_str(&format!(
                    "│ {:7} │ {:10} │ {:24} │ {:>9} │ {:>9} │ {:>9.2} │\n",
                    result.workers,
                    result.ordering.name(),
                    truncate(&total.label, 24),
                    total.instances,
                    total.total_ms,
                    total.avg_ms()
                ));
            }
        }

        output.push_str(
            "└─────────┴────────────┴──────────────────────────┴───────────┴───────────┴───────────┘\n",
        );

        if let Some(section) = self.format_sample_averages(&report.sequential) {
            output.push_str(&section);
        }

        if let Some(profile) = &report.profile {
            output.push_str("\nCommand profile:\n");
            output.push_str(&profile.render());
        }

        output
    }

    /// Per-instance averages, one block per concurrency level. Only the
    /// sequential runs record individual samples.
    fn format_sample_averages(&self, results: &[BenchmarkResult]) -> Option<String> {
        if results.iter().all(|r| r.samples().is_empty()) {
            return None;
        }

        let mut output = String::new();
        output.push_str("\nPer-instance averages (sequential ordering):\n");
        for result in results {
            if result.samples().is_empty() {
                continue;
            }
            output.push_str(&format!("  {} worker(s):\n", result.workers));
            for workload in result.samples().keys() {
                if let Some(avg) = result.avg_sample_ms(workload) {
                    output.push_str(&format!("    {:30} {:>9.2}ms\n", workload, avg));
                }
            }
        }
        Some(output)
    }

    fn format_report_csv(&self, report: &HarnessReport) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "workers",
                "ordering",
                "batch",
                "instances",
                "total_ms",
                "avg_ms",
            ])
            .context("Failed to write CSV header")?;

        for result in report.sequential.iter().chain(report.randomized.iter()) {
            for total in result.totals() {
                writer
                    .write_record([
                        result.workers.to_string(),
                        result.ordering.name().to_string(),
                        total.label.clone(),
                        total.instances.to_string(),
                        total.total_ms.to_string(),
                        format!("{:.2}", total.avg_ms()),
                    ])
                    .context("Failed to write CSV record")?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("Failed to flush CSV writer: {err}"))?;
        String::from_utf8(bytes).context("CSV output was not valid UTF-8")
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// Write a report to a file
pub fn write_report_to_file(
    path: impl AsRef<Path>,
    report: &HarnessReport,
    format: OutputFormat,
) -> Result<()> {
    let formatter = ReportFormatter::new(format);
    let content = formatter.format_report(report)?;

    let mut file = std::fs::File::create(path.as_ref())
        .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExecutionOrder, ExecutionSample};
    use chrono::Utc;
    use std::time::Duration;

    fn report() -> HarnessReport {
        let mut sequential = BenchmarkResult::new(1, ExecutionOrder::Sequential);
        sequential.add_sample(ExecutionSample {
            workload: "process-01".to_string(),
            duration_ms: 12,
            started_at: Utc::now(),
        });
        sequential.add_batch_total("process-01", 10, Duration::from_millis(120));

        let mut randomized = BenchmarkResult::new(1, ExecutionOrder::Randomized);
        randomized.add_batch_total("process-01+process-02", 10, Duration::from_millis(95));

        HarnessReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            seed: 42,
            sequential: vec![sequential],
            randomized: vec![randomized],
            profile: None,
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("unknown"), None);
    }

    #[test]
    fn test_table_lists_every_batch() {
        let output = ReportFormatter::new(OutputFormat::Table)
            .format_report(&report())
            .unwrap();
        assert!(output.contains("process-01"));
        assert!(output.contains("process-01+process-02"));
        assert!(output.contains("seed 42"));
        assert!(output.contains("Per-instance averages"));
    }

    #[test]
    fn test_json_round_trips_totals() {
        let output = ReportFormatter::new(OutputFormat::Json)
            .format_report(&report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["seed"], 42);
        assert_eq!(value["sequential"][0]["totals"][0]["instances"], 10);
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let output = ReportFormatter::new(OutputFormat::Csv)
            .format_report(&report())
            .unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "workers,ordering,batch,instances,total_ms,avg_ms");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("1,randomized,process-01+process-02,10,95,"));
    }

    #[test]
    fn test_truncate_long_labels() {
        assert_eq!(truncate("short", 24), "short");
        let long = "x".repeat(40);
        assert_eq!(truncate(&long, 24).chars().count(), 24);
    }
}
