//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use crate::domain::BundleError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Bad configuration or invalid input
pub const EXIT_INVALID: i32 = 2;
/// No template candidate exists
pub const EXIT_TEMPLATE_NOT_FOUND: i32 = 3;
/// Any other failure
pub const EXIT_FATAL: i32 = 5;
/// Interrupted by SIGINT/SIGTERM
pub const EXIT_CANCELLED: i32 = 130;

/// Exit code reported for a failed export
pub fn exit_code(error: &BundleError) -> i32 {
    match error {
        BundleError::InvalidBundle(_) | BundleError::Configuration(_) => EXIT_INVALID,
        BundleError::TemplateNotFound { .. } => EXIT_TEMPLATE_NOT_FOUND,
        BundleError::Cancelled { .. } => EXIT_CANCELLED,
        BundleError::RenderFailure { .. } | BundleError::ArchiveFailure(_) | BundleError::Io(_) => {
            EXIT_FATAL
        }
    }
}

/// Bundle Export - spreadsheet and zip exports of tabular data bundles
#[derive(Parser, Debug)]
#[command(name = "bundle-export")]
#[command(version, about, long_about = None)]
#[command(author = "Bundle Export Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to ./bundle-export.toml when present)
    #[arg(short, long, env = "BUNDLE_EXPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BUNDLE_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a JSON bundle into a spreadsheet or zip archive
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RenderError;
    use test_case::test_case;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from([
            "bundle-export",
            "export",
            "--data",
            "payload.json",
            "--view",
            "sales/report",
        ]);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.data, PathBuf::from("payload.json"));
                assert_eq!(args.view, "sales/report");
                assert_eq!(args.output, PathBuf::from("."));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from([
            "bundle-export",
            "--config",
            "custom.toml",
            "validate-config",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["bundle-export", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_rejects_unknown_compat() {
        let result = Cli::try_parse_from([
            "bundle-export",
            "export",
            "--data",
            "payload.json",
            "--view",
            "report",
            "--compat",
            "netscape",
        ]);
        assert!(result.is_err());
    }

    #[test_case(BundleError::InvalidBundle("x".into()), EXIT_INVALID ; "invalid bundle")]
    #[test_case(BundleError::Configuration("x".into()), EXIT_INVALID ; "configuration")]
    #[test_case(BundleError::TemplateNotFound { candidates: vec![] }, EXIT_TEMPLATE_NOT_FOUND ; "template not found")]
    #[test_case(BundleError::Cancelled { completed_chunks: 2 }, EXIT_CANCELLED ; "cancelled")]
    #[test_case(BundleError::ArchiveFailure("x".into()), EXIT_FATAL ; "archive failure")]
    #[test_case(
        BundleError::RenderFailure { chunk_index: 0, source: RenderError::MalformedTemplate("x".into()) },
        EXIT_FATAL ;
        "render failure"
    )]
    fn test_exit_codes(error: BundleError, expected: i32) {
        assert_eq!(exit_code(&error), expected);
    }
}
