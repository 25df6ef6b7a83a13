// Bundle Export - Spreadsheet and Archive Export Pipeline
// Copyright (c) 2025 Bundle Export Contributors
// Licensed under the MIT License

//! # Bundle Export
//!
//! Turns a bundle of named tabular series into a downloadable spreadsheet.
//! Bundles larger than their split size are cut into row-aligned chunks,
//! each chunk is rendered through the same template, and the rendered files
//! are streamed back as a single zip archive.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Partitioning, template resolution, rendering, archiving, orchestration
//! - [`adapters`] - Template source, templating engine and response seams
//! - [`domain`] - Bundle, chunk and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bundle_export::adapters::{FileResponse, FsTemplateSource, TextTemplateEngine};
//! use bundle_export::config::load_config;
//! use bundle_export::core::export::{ExportOrchestrator, ExportRequest, ExportSettings};
//! use bundle_export::domain::Bundle;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bundle-export.toml")?;
//!
//!     let orchestrator = ExportOrchestrator::new(
//!         FsTemplateSource::new(&config.templates.root),
//!         TextTemplateEngine::new(),
//!         ExportSettings::from(&config.export),
//!     );
//!
//!     let bundle = Bundle::from_json_slice(&std::fs::read("payload.json")?)?;
//!     let mut response = FileResponse::create("out.bin")?;
//!     let summary = orchestrator.export(&ExportRequest::new(&bundle, "sales/report"), &mut response)?;
//!
//!     println!("{} in {} chunk(s)", summary.attachment_name, summary.chunk_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Partitioning
//!
//! Every sequence or keyed series is cut at the same `[start, end)` windows;
//! scalar series are repeated in every chunk:
//!
//! ```rust
//! use bundle_export::core::partition::partition;
//! use bundle_export::domain::Bundle;
//! use serde_json::json;
//!
//! let bundle = Bundle::builder()
//!     .split_size(10_000)
//!     .series("rows", vec![json!(0); 25_000])
//!     .series("title", json!("Q3"))
//!     .build()
//!     .unwrap();
//!
//! let sizes: Vec<_> = partition(&bundle.series, bundle.split_size)
//!     .iter()
//!     .map(|chunk| chunk.get("rows").and_then(|rows| rows.row_count()))
//!     .collect();
//! assert_eq!(sizes, vec![Some(10_000), Some(10_000), Some(5_000)]);
//! ```
//!
//! ## Error Handling
//!
//! Every failure is a [`domain::BundleError`]; [`domain::BundleError::http_status`]
//! suggests a status code for transports:
//!
//! ```rust
//! use bundle_export::domain::{Bundle, BundleError};
//!
//! let err = Bundle::builder().split_size(70_000).build().unwrap_err();
//! assert!(matches!(err, BundleError::InvalidBundle(_)));
//! assert_eq!(err.http_status(), 400);
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
