//! External collaborators
//!
//! The pipeline's seams ([`TemplateSource`], [`TemplateEngine`],
//! [`ExportResponse`]) and the implementations shipped with the crate:
//!
//! - [`filesystem`] - templates stored under a root directory
//! - [`text_engine`] - `${placeholder}` delimited-text templates
//! - [`response`] - in-memory and file-backed response sinks

pub mod filesystem;
pub mod response;
pub mod text_engine;
pub mod traits;

pub use filesystem::FsTemplateSource;
pub use response::{BufferedResponse, FileResponse};
pub use text_engine::{TextDocument, TextTemplateEngine};
pub use traits::{ExportResponse, RenderedOutput, TemplateEngine, TemplateSource};
