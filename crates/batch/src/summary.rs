//! Per-file outcomes and batch totals.

use std::fmt;
use std::path::{Path, PathBuf};

use pricebook_core::Error;
use tracing::{info, warn};

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The file produced output.
    Converted {
        /// Rows in the resulting series.
        rows: u64,
        /// Rows dropped during extraction or emission.
        dropped: u64,
    },
    /// The file was unusable (missing columns, nothing left after filtering).
    Skipped { reason: String },
    /// Processing the file failed (I/O, CSV decoding, duplicate asset).
    Failed { reason: String },
}

/// Outcome of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn converted(file: &Path, rows: u64, dropped: u64) -> Self {
        Self {
            file: file.to_path_buf(),
            status: FileStatus::Converted { rows, dropped },
        }
    }

    /// Classify an error as a skip or a failure.
    pub fn from_error(file: &Path, error: &Error) -> Self {
        let reason = error.to_string();
        let status = if error.is_skip() {
            FileStatus::Skipped { reason }
        } else {
            FileStatus::Failed { reason }
        };
        Self {
            file: file.to_path_buf(),
            status,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.status, FileStatus::Converted { .. })
    }

    fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            FileStatus::Converted { rows, dropped } => {
                write!(f, "converted {} ({} rows, {} dropped)", self.file_name(), rows, dropped)
            }
            FileStatus::Skipped { reason } => write!(f, "skipped {}: {}", self.file_name(), reason),
            FileStatus::Failed { reason } => write!(f, "failed {}: {}", self.file_name(), reason),
        }
    }
}

/// Outcomes of a batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    /// Record an outcome and log it as it happens.
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome.status {
            FileStatus::Converted { .. } => info!("{}", outcome),
            FileStatus::Skipped { .. } | FileStatus::Failed { .. } => warn!("{}", outcome),
        }
        self.outcomes.push(outcome);
    }

    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// Log the final totals.
    pub fn log_totals(&self) {
        info!(
            "Summary: {} converted, {} skipped, {} failed, {} total",
            self.converted(),
            self.skipped(),
            self.failed(),
            self.total()
        );
    }
}
