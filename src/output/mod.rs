//! Output formatting module
//!
//! Renders a finished benchmark report for the terminal or a file.

mod formatter;

pub use formatter::{write_report_to_file, OutputFormat, ReportFormatter};
