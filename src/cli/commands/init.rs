//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_FATAL, EXIT_INVALID, EXIT_SUCCESS};
use crate::config::DEFAULT_CONFIG_FILE;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing bundle-export configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_INVALID);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put templates under the configured templates.root");
                println!(
                    "  3. Validate configuration: bundle-export --config {} validate-config",
                    self.output
                );
                println!("  4. Run export: bundle-export export --data payload.json --view <name>");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Bundle Export Configuration File

[application]
log_level = "info"

[export]
view_prefix = ""
format = "csv"
archive_buffer_size = 65536
client_compatibility = "modern"

[templates]
root = "templates"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Bundle Export Configuration File
#
# This file contains all configuration options with examples and explanations.
# Every setting can be overridden with BUNDLE_<SECTION>_<KEY>, for example
# BUNDLE_EXPORT_FORMAT=csv. Values may reference environment variables with
# ${VAR_NAME}.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
log_level = "info"

# ============================================================================
# Export Configuration
# ============================================================================
[export]
# Prefix prepended to the default view name during template lookup
view_prefix = "views/"

# Output format: "xls", "xlsx" or "csv"
# The bundled text engine only renders "csv"; spreadsheet formats need a
# host-provided engine
format = "csv"

# Parent directory for per-export working directories
# (defaults to the system temp directory)
# temp_dir = "/var/tmp/bundle-export"

# Read buffer in bytes used while streaming zip archives
archive_buffer_size = 65536

# Attachment filename encoding:
# - modern: ASCII filename plus RFC 5987 filename*
# - legacy-percent: percent-encoded UTF-8 in filename
# - legacy-raw: UTF-8 bytes passed through as ISO-8859-1
client_compatibility = "modern"

# ============================================================================
# Templates
# ============================================================================
[templates]
# Directory template names are resolved against
root = "templates"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging
local_enabled = false

# Log directory
local_path = "logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}
