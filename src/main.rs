// Bundle Export - Spreadsheet and Archive Export Pipeline
// Copyright (c) 2025 Bundle Export Contributors
// Licensed under the MIT License

use bundle_export::cli::{Cli, Commands, EXIT_FATAL};
use bundle_export::config::{load_config_or_default, LoggingConfig};
use bundle_export::logging::init_logging;
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config when it loads; commands report config errors themselves
    let (config_level, logging_config) = load_config_or_default(cli.config.as_deref())
        .map(|config| (config.application.log_level, config.logging))
        .unwrap_or_else(|_| ("info".to_string(), LoggingConfig::default()));
    let log_level = cli.log_level.clone().unwrap_or(config_level);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Bundle Export - Spreadsheet and Archive Export Pipeline"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling export...");
                    eprintln!("\n⚠️  Shutdown signal received, stopping at the next chunk...");
                    let _ = shutdown_tx.send(true);
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, cancelling export...");
                    eprintln!("\n⚠️  Shutdown signal received, stopping at the next chunk...");
                    let _ = shutdown_tx.send(true);
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), cancelling export...");
                eprintln!("\n⚠️  Shutdown signal received, stopping at the next chunk...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Export(args) => args.execute(config_path, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(config_path).await,
        Commands::Init(args) => args.execute().await,
    }
}
