//! Result types returned by the batch driver.

use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One input PDF converted successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Pages rasterised and recognised from the input.
    pub source_pages: usize,
    /// Pages in the generated text PDF.
    pub output_pages: usize,
    /// Text lines laid out, blank lines included.
    pub lines: usize,
    pub duration_ms: u64,
}

/// One input PDF that could not be converted.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{}: {}", .input.display(), .error)]
pub struct FileFailure {
    pub input: PathBuf,
    #[source]
    pub error: ConversionError,
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub source_pages: usize,
    pub output_pages: usize,
    pub total_duration_ms: u64,
}

/// Everything a finished batch produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Successful files, in processing order.
    pub files: Vec<FileReport>,
    /// Failed files, in processing order.
    pub failures: Vec<FileFailure>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// Record one file outcome and update the counters.
    pub fn record(&mut self, outcome: Result<FileReport, FileFailure>) {
        self.stats.total_files += 1;
        match outcome {
            Ok(report) => {
                self.stats.succeeded += 1;
                self.stats.source_pages += report.source_pages;
                self.stats.output_pages += report.output_pages;
                self.files.push(report);
            }
            Err(failure) => {
                self.stats.failed += 1;
                self.failures.push(failure);
            }
        }
    }

    /// `true` when no file failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
