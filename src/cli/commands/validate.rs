//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use crate::cli::{EXIT_INVALID, EXIT_SUCCESS};
use crate::config::{load_config_or_default, DEFAULT_CONFIG_FILE};
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also require the template root directory to exist
    #[arg(long)]
    pub check_templates: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let shown = config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{DEFAULT_CONFIG_FILE} (or defaults)"));
        tracing::info!(config_path = %shown, "Validating configuration");

        println!("🔍 Validating configuration: {shown}");
        println!();

        // Loading applies overrides and validates
        let config = match load_config_or_default(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(EXIT_INVALID);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Output Format: {}", config.export.format);
        println!(
            "  View Prefix: {}",
            if config.export.view_prefix.is_empty() {
                "(none)"
            } else {
                config.export.view_prefix.as_str()
            }
        );
        println!(
            "  Temp Dir: {}",
            config
                .export
                .temp_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| std::env::temp_dir().display().to_string())
        );
        println!(
            "  Archive Buffer: {} bytes",
            config.export.archive_buffer_size
        );
        println!(
            "  Client Compatibility: {}",
            config.export.client_compatibility
        );
        println!("  Template Root: {}", config.templates.root.display());
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                format!(
                    "{} ({})",
                    config.logging.local_path, config.logging.local_rotation
                )
            } else {
                "disabled".to_string()
            }
        );
        println!();

        if self.check_templates && !config.templates.root.is_dir() {
            println!(
                "❌ Template root does not exist: {}",
                config.templates.root.display()
            );
            return Ok(EXIT_INVALID);
        }

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_validate_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bundle-export.toml");
        std::fs::write(&path, "[export]\nformat = \"csv\"\n").unwrap();

        let args = ValidateArgs {
            check_templates: false,
        };
        assert_eq!(args.execute(Some(path.as_path())).await.unwrap(), EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_validate_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bundle-export.toml");
        std::fs::write(&path, "[export]\nformat = \"pdf\"\n").unwrap();

        let args = ValidateArgs {
            check_templates: false,
        };
        assert_eq!(args.execute(Some(path.as_path())).await.unwrap(), EXIT_INVALID);
    }

    #[tokio::test]
    async fn test_validate_checks_template_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bundle-export.toml");
        std::fs::write(&path, "[templates]\nroot = \"/nonexistent/templates\"\n").unwrap();

        let args = ValidateArgs {
            check_templates: true,
        };
        assert_eq!(args.execute(Some(path.as_path())).await.unwrap(), EXIT_INVALID);
    }
}
