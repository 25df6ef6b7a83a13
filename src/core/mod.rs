//! Core export pipeline
//!
//! # Modules
//!
//! - [`partition`] - Row-aligned splitting of bundle series into chunks
//! - [`template`] - Template resolution through ordered candidate rules
//! - [`render`] - Per-chunk rendering through the templating engine
//! - [`archive`] - Zip streaming of rendered chunk files
//! - [`attachment`] - `Content-Disposition` naming per client compatibility
//! - [`export`] - Orchestration, working directory, and summary
//!
//! # Export Workflow
//!
//! 1. **Validate**: Check the bundle's split size
//! 2. **Resolve**: Find the template through the candidate chain
//! 3. **Partition**: Cut every series at the same row windows
//! 4. **Render**: One document, or one file per chunk in a working directory
//! 5. **Stream**: Send the document, or zip the working directory onto the response
//!
//! # Example
//!
//! ```rust,no_run
//! use bundle_export::adapters::{BufferedResponse, FsTemplateSource, TextTemplateEngine};
//! use bundle_export::core::export::{ExportOrchestrator, ExportRequest, ExportSettings};
//! use bundle_export::domain::Bundle;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bundle = Bundle::from_json_slice(br#"{"series": {"rows": [{"id": 1}]}}"#)?;
//!
//! let orchestrator = ExportOrchestrator::new(
//!     FsTemplateSource::new("templates"),
//!     TextTemplateEngine::new(),
//!     ExportSettings::default(),
//! );
//!
//! let mut response = BufferedResponse::new();
//! let summary = orchestrator.export(&ExportRequest::new(&bundle, "sales/report"), &mut response)?;
//!
//! println!("{} ({} chunks)", summary.attachment_name, summary.chunk_count);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod attachment;
pub mod export;
pub mod partition;
pub mod render;
pub mod template;
