//! Profiling interceptor and its append-only log
//!
//! The log is a flat line-oriented file written by potentially many worker
//! threads; the single writer is serialized behind a mutex so records never
//! corrupt each other. Arrival order across threads is unspecified.

use chrono::Utc;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::engine::{CommandInterceptor, CommandKind, EngineError};

/// Shared append-only profiling log. One record per line:
/// `<operation>\t<start_us>\t<end_us>` (microseconds since epoch).
pub struct ProfilingLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl ProfilingLog {
    /// Creates (truncating) the log file.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record. A write failure is only a diagnostic loss, so it
    /// is logged and swallowed rather than failing the intercepted command.
    pub fn append(&self, kind: CommandKind, start_us: i64, end_us: i64) {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = writeln!(writer, "{}\t{}\t{}", kind.as_str(), start_us, end_us) {
            warn!("failed to append profiling record: {err}");
        }
    }

    /// Flushes buffered records; the parser must only read after this.
    pub fn flush(&self) -> io::Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .flush()
    }
}

/// Wraps each engine-internal command with start/stop timestamps. The span
/// closes on the error path too, and the delegated outcome is returned
/// unchanged.
pub struct ProfilingInterceptor {
    log: Arc<ProfilingLog>,
}

impl ProfilingInterceptor {
    pub fn new(log: Arc<ProfilingLog>) -> Self {
        Self { log }
    }
}

impl CommandInterceptor for ProfilingInterceptor {
    fn execute(
        &self,
        kind: CommandKind,
        next: &mut dyn FnMut() -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        let start_us = Utc::now().timestamp_micros();
        let outcome = next();
        let end_us = Utc::now().timestamp_micros();
        self.log.append(kind, start_us, end_us);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.log");
        let log = ProfilingLog::create(&path).unwrap();

        log.append(CommandKind::StartInstance, 100, 250);
        log.append(CommandKind::Deploy, 300, 400);
        log.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, ["start-instance\t100\t250", "deploy\t300\t400"]);
    }

    #[test]
    fn test_interceptor_records_error_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.log");
        let log = Arc::new(ProfilingLog::create(&path).unwrap());
        let interceptor = ProfilingInterceptor::new(Arc::clone(&log));

        let out = interceptor.execute(CommandKind::StartInstance, &mut || {
            Err(EngineError::NotDeployed("x".into()))
        });
        assert!(out.is_err());

        log.flush().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("start-instance\t"));
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        use std::thread;

        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.log");
        let log = Arc::new(ProfilingLog::create(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..100 {
                        log.append(CommandKind::StartInstance, i, i + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        log.flush().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 800);
        for line in content.lines() {
            assert_eq!(line.split('\t').count(), 3);
        }
    }
}
