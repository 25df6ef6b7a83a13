//! Export command implementation
//!
//! This module implements the `export` command: it reads a JSON bundle,
//! renders it with the text template engine, and writes the attachment
//! into an output directory under the name the export chose.

use crate::adapters::{FileResponse, FsTemplateSource, TextTemplateEngine};
use crate::cli::{exit_code, EXIT_INVALID, EXIT_SUCCESS};
use crate::config::{load_config_or_default, BundleConfig};
use crate::core::attachment::ClientCompatibility;
use crate::core::export::{
    ExportOrchestrator, ExportRequest, ExportSettings, ExportSummary, HEADER_CONTENT_DISPOSITION,
};
use crate::domain::{Bundle, OutputFormat};
use anyhow::Context;
use clap::Args;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use uuid::Uuid;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// JSON bundle payload (`-` reads standard input)
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,

    /// Default view name used when the bundle's template is not found
    #[arg(short, long, value_name = "NAME")]
    pub view: String,

    /// Override the bundle's template name
    #[arg(long, value_name = "NAME")]
    pub template: Option<String>,

    /// Override the bundle's attachment filename
    #[arg(long, value_name = "NAME")]
    pub filename: Option<String>,

    /// Override the bundle's split size (1..=60000)
    #[arg(long, value_name = "ROWS")]
    pub split_size: Option<usize>,

    /// Directory the attachment is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Attachment filename encoding (modern, legacy-percent, legacy-raw)
    #[arg(long, value_name = "MODE")]
    pub compat: Option<ClientCompatibility>,

    /// Override the configured output format (only csv is rendered by the CLI)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Override the configured template root directory
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: Option<&Path>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(EXIT_INVALID);
            }
        };
        self.apply_overrides(&mut config);

        let bundle = match self.read_bundle() {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "Invalid bundle payload");
                eprintln!("❌ {e}");
                return Ok(EXIT_INVALID);
            }
        };

        if !self.output.is_dir() {
            eprintln!(
                "❌ Output directory does not exist: {}",
                self.output.display()
            );
            return Ok(EXIT_INVALID);
        }

        // The text engine cannot produce spreadsheet bytes for these types
        if config.export.format != OutputFormat::Csv {
            tracing::error!(
                format = %config.export.format,
                "Output format not supported by the text template engine"
            );
            eprintln!(
                "❌ Output format '{}' needs a spreadsheet engine; the CLI renders csv only",
                config.export.format
            );
            return Ok(EXIT_INVALID);
        }

        println!("🚀 Exporting view '{}'", self.view);

        let part_path = self.output.join(format!(".bundle-export-{}.part", Uuid::new_v4()));
        let settings = ExportSettings::from(&config.export);
        let source = FsTemplateSource::new(&config.templates.root);
        let view = self.view.clone();
        let compat = self.compat;
        let body_path = part_path.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let orchestrator =
                ExportOrchestrator::new(source, TextTemplateEngine::new(), settings)
                    .with_cancellation(shutdown_signal);

            let mut request = ExportRequest::new(&bundle, &view);
            if let Some(compat) = compat {
                request = request.with_compatibility(compat);
            }

            let mut response = FileResponse::create(&body_path)?;
            let summary = orchestrator.export(&request, &mut response)?;
            let disposition = response
                .header(HEADER_CONTENT_DISPOSITION)
                .map(str::to_string);
            Ok::<_, crate::domain::BundleError>((summary, disposition))
        })
        .await
        .context("Export task panicked")?;

        match outcome {
            Ok((summary, disposition)) => {
                let target = self.output.join(&summary.attachment_name);
                fs::rename(&part_path, &target).with_context(|| {
                    format!("Failed to move output into place at {}", target.display())
                })?;
                Self::print_summary(&summary, &target, disposition.as_deref());
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&part_path) {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %part_path.display(),
                            error = %remove_err,
                            "Failed to remove partial output"
                        );
                    }
                }
                eprintln!("❌ Export failed: {e}");
                Ok(exit_code(&e))
            }
        }
    }

    fn apply_overrides(&self, config: &mut BundleConfig) {
        if let Some(format) = self.format {
            tracing::info!(format = %format, "Overriding output format from CLI");
            config.export.format = format;
        }
        if let Some(root) = &self.templates {
            tracing::info!(root = %root.display(), "Overriding template root from CLI");
            config.templates.root = root.clone();
        }
    }

    fn read_bundle(&self) -> crate::domain::Result<Bundle> {
        let payload = if self.data.as_os_str() == "-" {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            buffer
        } else {
            fs::read(&self.data).map_err(|e| {
                crate::domain::BundleError::InvalidBundle(format!(
                    "Failed to read payload {}: {e}",
                    self.data.display()
                ))
            })?
        };

        let mut bundle = Bundle::from_json_slice(&payload)?;
        if let Some(template) = &self.template {
            bundle.template_name = Some(template.clone());
        }
        if let Some(filename) = &self.filename {
            bundle.filename = Some(filename.clone());
        }
        if let Some(split_size) = self.split_size {
            bundle.split_size = split_size;
        }
        bundle.validate()?;
        Ok(bundle)
    }

    fn print_summary(summary: &ExportSummary, target: &Path, disposition: Option<&str>) {
        println!();
        println!("📊 Export Summary:");
        println!("  Mode: {}", summary.mode);
        println!("  Template: {}", summary.template);
        println!("  Chunks: {}", summary.chunk_count);
        println!("  Documents: {}", summary.documents_rendered);
        println!("  Content-Type: {}", summary.content_type);
        if let Some(disposition) = disposition {
            println!("  Content-Disposition: {disposition}");
        }
        println!("  Bytes: {}", summary.bytes_written);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        println!("✅ Written to {}", target.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(data: PathBuf, output: PathBuf) -> ExportArgs {
        ExportArgs {
            data,
            view: "report".to_string(),
            template: None,
            filename: None,
            split_size: None,
            output,
            compat: None,
            format: None,
            templates: None,
        }
    }

    #[test]
    fn test_read_bundle_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("payload.json");
        fs::write(&data, r#"{"splitSize": 100, "series": {"rows": [1, 2, 3]}}"#).unwrap();

        let mut args = args(data, dir.path().to_path_buf());
        args.split_size = Some(2);
        args.filename = Some("custom.csv".to_string());

        let bundle = args.read_bundle().unwrap();
        assert_eq!(bundle.split_size, 2);
        assert_eq!(bundle.filename.as_deref(), Some("custom.csv"));
    }

    #[test]
    fn test_read_bundle_rejects_oversized_split() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("payload.json");
        fs::write(&data, r#"{"series": {"rows": []}}"#).unwrap();

        let mut args = args(data, dir.path().to_path_buf());
        args.split_size = Some(70_000);

        assert!(args.read_bundle().is_err());
    }

    #[test]
    fn test_read_bundle_missing_file() {
        let dir = TempDir::new().unwrap();
        let args = args(dir.path().join("missing.json"), dir.path().to_path_buf());
        assert!(matches!(
            args.read_bundle(),
            Err(crate::domain::BundleError::InvalidBundle(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_defaults_to_csv_attachment() {
        let dir = TempDir::new().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(templates.join("report.csv"), "#each rows\n${.}\n#end\n").unwrap();
        let data = dir.path().join("payload.json");
        fs::write(&data, r#"{"series": {"rows": [1, 2, 3]}}"#).unwrap();
        let output = dir.path().join("out");
        fs::create_dir(&output).unwrap();

        let mut args = args(data, output.clone());
        args.templates = Some(templates);

        let missing = dir.path().join("missing.toml");
        let (_tx, rx) = watch::channel(false);
        let code = args.execute(Some(missing.as_path()), rx).await.unwrap();
        assert_eq!(code, EXIT_INVALID);

        let config_path = dir.path().join("bundle-export.toml");
        fs::write(&config_path, "[application]\nlog_level = \"info\"\n").unwrap();
        let (_tx, rx) = watch::channel(false);
        let code = args.execute(Some(config_path.as_path()), rx).await.unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(fs::read_to_string(output.join("report.csv")).unwrap(), "1\n2\n3\n");
        let leftovers: Vec<_> = fs::read_dir(&output).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_rejects_spreadsheet_formats() {
        let dir = TempDir::new().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(templates.join("report.xlsx"), "#each rows\n${.}\n#end\n").unwrap();
        let data = dir.path().join("payload.json");
        fs::write(&data, r#"{"series": {"rows": [1, 2]}}"#).unwrap();
        let output = dir.path().join("out");
        fs::create_dir(&output).unwrap();
        let config_path = dir.path().join("bundle-export.toml");
        fs::write(&config_path, "[export]\nformat = \"xlsx\"\n").unwrap();

        let mut args = args(data, output.clone());
        args.templates = Some(templates);

        let (_tx, rx) = watch::channel(false);
        let code = args.execute(Some(config_path.as_path()), rx).await.unwrap();
        assert_eq!(code, EXIT_INVALID);

        args.format = Some(OutputFormat::Xls);
        let (_tx, rx) = watch::channel(false);
        let code = args.execute(Some(config_path.as_path()), rx).await.unwrap();
        assert_eq!(code, EXIT_INVALID);

        assert!(fs::read_dir(&output).unwrap().next().is_none());
    }
}
