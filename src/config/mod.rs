//! Configuration management
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `BUNDLE_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bundle_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bundle-export.toml")?;
//!
//! println!("Templates: {}", config.templates.root.display());
//! println!("Format: {}", config.export.format);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ExportConfig`] - View prefix, output format, temp dir, archive buffer, client compatibility
//! - [`TemplatesConfig`] - Template root directory
//! - [`LoggingConfig`] - Local JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [export]
//! view_prefix = "views/"
//! format = "csv"
//! temp_dir = "${EXPORT_SCRATCH_DIR}"
//! archive_buffer_size = 65536
//! client_compatibility = "modern"
//!
//! [templates]
//! root = "/srv/templates"
//!
//! [logging]
//! local_enabled = true
//! local_path = "/var/log/bundle-export"
//! local_rotation = "daily"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str, load_config_or_default, DEFAULT_CONFIG_FILE};
pub use schema::{ApplicationConfig, BundleConfig, ExportConfig, LoggingConfig, TemplatesConfig};
