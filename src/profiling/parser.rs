//! Profiling log parser
//!
//! Reads the interceptor's log in full after the run and reconstructs
//! per-operation-type statistics. The log is diagnostic, not
//! correctness-critical: malformed lines are skipped with a warning and
//! surfaced only as a count.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::HarnessError;

/// Aggregate timing for one operation type.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OperationStats {
    pub count: u64,
    pub total_us: u64,
}

impl OperationStats {
    pub fn avg_us(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_us as f64 / self.count as f64
        }
    }
}

/// Per-operation breakdown reconstructed from the log.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileSummary {
    entries: BTreeMap<String, OperationStats>,
    pub skipped_lines: usize,
}

impl ProfileSummary {
    pub fn entries(&self) -> &BTreeMap<String, OperationStats> {
        &self.entries
    }

    /// Total number of records that parsed successfully.
    pub fn total_records(&self) -> u64 {
        self.entries.values().map(|s| s.count).sum()
    }

    /// Renders the report artifact.
    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{:30} {:>10} {:>14} {:>12}\n",
            "Operation", "Count", "Total (us)", "Avg (us)"
        ));
        output.push_str(&format!("{:-<68}\n", ""));
        for (operation, stats) in &self.entries {
            output.push_str(&format!(
                "{:30} {:>10} {:>14} {:>12.1}\n",
                operation,
                stats.count,
                stats.total_us,
                stats.avg_us()
            ));
        }
        if self.skipped_lines > 0 {
            output.push_str(&format!(
                "({} malformed lines skipped)\n",
                self.skipped_lines
            ));
        }
        output
    }
}

/// Parses the append-only log written by the profiling interceptor. The
/// caller must ensure the writer has flushed and is idle before parsing.
pub struct ProfilingLogParser {
    path: PathBuf,
}

impl ProfilingLogParser {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn execute(&self) -> Result<ProfileSummary, HarnessError> {
        let content = fs::read_to_string(&self.path)?;
        let mut summary = ProfileSummary::default();

        for (number, line) in content.lines().enumerate() {
            match parse_line(line) {
                Some((operation, duration_us)) => {
                    let stats = summary.entries.entry(operation.to_string()).or_default();
                    stats.count += 1;
                    stats.total_us += duration_us;
                }
                None => {
                    warn!(
                        "skipping malformed profiling record at line {}: {:?}",
                        number + 1,
                        line
                    );
                    summary.skipped_lines += 1;
                }
            }
        }

        Ok(summary)
    }
}

fn parse_line(line: &str) -> Option<(&str, u64)> {
    let mut fields = line.split('\t');
    let operation = fields.next().filter(|s| !s.is_empty())?;
    let start_us: i64 = fields.next()?.parse().ok()?;
    let end_us: i64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((operation, end_us.saturating_sub(start_us).max(0) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(content: &str) -> ProfileSummary {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.log");
        fs::write(&path, content).unwrap();
        ProfilingLogParser::new(&path).execute().unwrap()
    }

    #[test]
    fn test_groups_by_operation() {
        let summary = parse(
            "start-instance\t100\t250\n\
             start-instance\t300\t350\n\
             deploy\t0\t1000\n",
        );

        assert_eq!(summary.total_records(), 3);
        let start = &summary.entries()["start-instance"];
        assert_eq!(start.count, 2);
        assert_eq!(start.total_us, 200);
        assert_eq!(start.avg_us(), 100.0);
        assert_eq!(summary.entries()["deploy"].total_us, 1000);
    }

    #[test]
    fn test_malformed_lines_are_skipped_not_fatal() {
        let summary = parse(
            "start-instance\t100\t250\n\
             not a record\n\
             deploy\tabc\t200\n\
             deploy\t1\t2\textra\n",
        );

        assert_eq!(summary.total_records(), 1);
        assert_eq!(summary.skipped_lines, 3);
        assert!(summary.render().contains("3 malformed lines skipped"));
    }

    #[test]
    fn test_empty_log() {
        let summary = parse("");
        assert_eq!(summary.total_records(), 0);
        assert_eq!(summary.skipped_lines, 0);
    }

    #[test]
    fn test_render_contains_operations() {
        let summary = parse("count-history\t0\t10\n");
        let report = summary.render();
        assert!(report.contains("count-history"));
        assert!(report.contains("10"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let parser = ProfilingLogParser::new("/nonexistent/flowbench-profile.log");
        assert!(matches!(parser.execute(), Err(HarnessError::Io(_))));
    }
}
