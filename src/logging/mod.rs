//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output on stderr
//! - Configurable log levels (`RUST_LOG` overrides)
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use bundle_export::logging::init_logging;
//! use bundle_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an export operation
///
/// # Example
///
/// ```no_run
/// use bundle_export::log_export_start;
///
/// log_export_start!("sales/report", 10_000);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($view:expr, $split_size:expr) => {
        tracing::info!(
            view = %$view,
            split_size = $split_size,
            "Starting export"
        );
    };
}

/// Log a pipeline state transition
///
/// # Example
///
/// ```no_run
/// use bundle_export::log_state_transition;
///
/// log_state_transition!("init", "resolving");
/// ```
#[macro_export]
macro_rules! log_state_transition {
    ($from:expr, $to:expr) => {
        tracing::debug!(
            from = %$from,
            to = %$to,
            "Export state transition"
        );
    };
}

/// Log a rendered chunk with progress
///
/// # Example
///
/// ```no_run
/// use bundle_export::log_chunk_rendered;
///
/// log_chunk_rendered!(0, 3, 4096u64);
/// ```
#[macro_export]
macro_rules! log_chunk_rendered {
    ($index:expr, $total:expr, $bytes:expr) => {
        tracing::debug!(
            chunk_index = $index,
            total = $total,
            bytes = $bytes,
            progress_pct = (($index + 1) as f64 / $total as f64 * 100.0),
            "Rendered chunk"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use bundle_export::log_error_with_context;
/// use bundle_export::domain::BundleError;
///
/// let error = BundleError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
