//! Configuration schema types
//!
//! This module defines the configuration structure for bundle exports.
//! Every section is optional; a missing section takes its defaults.

use crate::core::archive::DEFAULT_ARCHIVE_BUFFER_SIZE;
use crate::core::attachment::ClientCompatibility;
use crate::domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound for the archive read buffer (16 MiB)
pub const MAX_ARCHIVE_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Template lookup settings
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BundleConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.templates.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Export pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Prefix prepended to default view names (e.g. `"views/"`)
    #[serde(default)]
    pub view_prefix: String,

    /// Output format (xls, xlsx, csv)
    #[serde(default)]
    pub format: OutputFormat,

    /// Parent directory for working directories (system temp dir if unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Read buffer size in bytes used while streaming archives
    #[serde(default = "default_archive_buffer_size")]
    pub archive_buffer_size: usize,

    /// Attachment filename encoding (modern, legacy-percent, legacy-raw)
    #[serde(default)]
    pub client_compatibility: ClientCompatibility,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            view_prefix: String::new(),
            format: OutputFormat::default(),
            temp_dir: None,
            archive_buffer_size: default_archive_buffer_size(),
            client_compatibility: ClientCompatibility::default(),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.archive_buffer_size == 0 {
            return Err("export.archive_buffer_size must be > 0".to_string());
        }

        if self.archive_buffer_size > MAX_ARCHIVE_BUFFER_SIZE {
            return Err(format!(
                "export.archive_buffer_size must be <= {MAX_ARCHIVE_BUFFER_SIZE}"
            ));
        }

        if self.view_prefix.split('/').any(|segment| segment == "..") {
            return Err("export.view_prefix must not contain '..' segments".to_string());
        }

        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.as_os_str().is_empty() {
                return Err("export.temp_dir must not be empty when set".to_string());
            }
        }

        Ok(())
    }
}

/// Template lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory templates are resolved against
    #[serde(default = "default_templates_root")]
    pub root: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: default_templates_root(),
        }
    }
}

impl TemplatesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.as_os_str().is_empty() {
            return Err("templates.root cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_archive_buffer_size() -> usize {
    DEFAULT_ARCHIVE_BUFFER_SIZE
}

fn default_templates_root() -> PathBuf {
    PathBuf::from("templates")
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
