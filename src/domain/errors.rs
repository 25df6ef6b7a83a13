//! Domain error types
//!
//! This module defines the error hierarchy for the export pipeline.
//! Every failure an export can hit maps to exactly one [`BundleError`] kind,
//! so transports can tell permanent input problems from I/O trouble without
//! inspecting messages.

use thiserror::Error;

/// Main export error type
///
/// Validation kinds are raised before any I/O happens. Render and archive
/// kinds are raised mid-export, after which the working directory (if any)
/// has already been cleaned up.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Missing payload, split size out of bounds, or absent series
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    /// Every template candidate was tried and none exists
    #[error("Template not found (tried: {})", .candidates.join(", "))]
    TemplateNotFound {
        /// Candidate names in the order they were checked
        candidates: Vec<String>,
    },

    /// The templating engine rejected a chunk's template or data
    #[error("Failed to render chunk {chunk_index}: {source}")]
    RenderFailure {
        /// Zero-based index of the failing chunk
        chunk_index: usize,
        /// Engine error
        #[source]
        source: RenderError,
    },

    /// I/O failure while streaming the archive
    ///
    /// The response body may already be partially flushed when this is
    /// returned; streamed bytes cannot be recalled.
    #[error("Archive streaming failed: {0}")]
    ArchiveFailure(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors outside archive streaming
    #[error("I/O error: {0}")]
    Io(String),

    /// The caller raised the cancellation signal between chunks
    #[error("Export cancelled after {completed_chunks} chunk(s)")]
    Cancelled {
        /// Number of chunks fully rendered before cancellation was observed
        completed_chunks: usize,
    },
}

impl BundleError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BundleError::Io(_) | BundleError::ArchiveFailure(_))
    }

    /// Suggested HTTP status for transports that surface this error
    pub fn http_status(&self) -> u16 {
        match self {
            BundleError::InvalidBundle(_) => 400,
            BundleError::TemplateNotFound { .. } => 404,
            BundleError::Cancelled { .. } => 499,
            _ => 500,
        }
    }
}

/// Templating engine errors
///
/// Engines return these; the orchestrator wraps them in
/// [`BundleError::RenderFailure`] together with the chunk index.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template bytes could not be parsed
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    /// The template is not valid in the engine's expected encoding
    #[error("Encoding mismatch: {0}")]
    Encoding(String),

    /// The template references data the chunk does not provide
    #[error("Missing data for '{0}'")]
    MissingData(String),
}

impl From<std::io::Error> for BundleError {
    fn from(err: std::io::Error) -> Self {
        BundleError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BundleError {
    fn from(err: serde_json::Error) -> Self {
        BundleError::InvalidBundle(format!("Malformed payload: {err}"))
    }
}

impl From<toml::de::Error> for BundleError {
    fn from(err: toml::de::Error) -> Self {
        BundleError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<zip::result::ZipError> for BundleError {
    fn from(err: zip::result::ZipError) -> Self {
        BundleError::ArchiveFailure(err.to_string())
    }
}
