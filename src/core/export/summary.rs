//! Export summary and reporting
//!
//! This module defines the report returned by a completed export.

use std::fmt;
use std::time::Duration;

/// How the response body was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// One document rendered straight onto the response
    SingleFile,
    /// Per-chunk documents bundled into a zip archive
    Archive,
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportMode::SingleFile => write!(f, "single-file"),
            ExportMode::Archive => write!(f, "archive"),
        }
    }
}

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Single file or archive
    pub mode: ExportMode,

    /// Number of chunks the bundle partitioned into
    pub chunk_count: usize,

    /// Number of documents rendered (at least one, even for empty bundles)
    pub documents_rendered: usize,

    /// Template candidate that was used
    pub template: String,

    /// Filename offered to the client
    pub attachment_name: String,

    /// `Content-Type` sent with the body
    pub content_type: String,

    /// Body bytes written to the response
    pub bytes_written: u64,

    /// Duration of the export
    pub duration: Duration,
}

impl ExportSummary {
    /// Create a new summary for an export of `mode`
    pub fn new(mode: ExportMode) -> Self {
        Self {
            mode,
            chunk_count: 0,
            documents_rendered: 0,
            template: String::new(),
            attachment_name: String::new(),
            content_type: String::new(),
            bytes_written: 0,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the body is a zip archive
    pub fn is_archive(&self) -> bool {
        self.mode == ExportMode::Archive
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            mode = %self.mode,
            chunk_count = self.chunk_count,
            documents = self.documents_rendered,
            template = %self.template,
            attachment = %self.attachment_name,
            bytes = self.bytes_written,
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );
    }
}
