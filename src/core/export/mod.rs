//! Export orchestration
//!
//! This module provides the export pipeline entry point:
//! - State machine driving single-file and archive exports
//! - Scoped working directory for per-chunk files
//! - Summary and reporting

pub mod orchestrator;
pub mod summary;
pub mod workdir;

pub use orchestrator::{
    ExportOrchestrator, ExportRequest, ExportSettings, ExportState, HEADER_CONTENT_DISPOSITION,
    HEADER_CONTENT_TYPE,
};
pub use summary::{ExportMode, ExportSummary};
pub use workdir::{WorkingDirectory, WORKDIR_PREFIX};
