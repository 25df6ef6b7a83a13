//! Integration tests for logging functionality

use bundle_export::adapters::{BufferedResponse, FsTemplateSource, TextTemplateEngine};
use bundle_export::config::LoggingConfig;
use bundle_export::core::export::{ExportOrchestrator, ExportRequest, ExportSettings};
use bundle_export::domain::{Bundle, OutputFormat};
use bundle_export::logging::{init_logging, parse_log_level};
use bundle_export::logging::structured::LOG_FILE_NAME;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let result = init_logging("chatty", &LoggingConfig::default());
    assert!(result.is_err());
    assert!(parse_log_level("WARN").is_ok());
}

// The global subscriber can be installed once per process, so this is the
// only test here that succeeds in initializing it
#[test]
fn test_file_logging_writes_json_lines() {
    std::env::remove_var("RUST_LOG");

    let log_dir = TempDir::new().unwrap();
    let log_path = log_dir.path().join("logs");
    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    let templates = TempDir::new().unwrap();
    fs::write(templates.path().join("report.csv"), "#each rows\n${.}\n#end\n").unwrap();
    let scratch = TempDir::new().unwrap();
    let orchestrator = ExportOrchestrator::new(
        FsTemplateSource::new(templates.path()),
        TextTemplateEngine::new(),
        ExportSettings {
            format: OutputFormat::Csv,
            temp_dir: Some(scratch.path().to_path_buf()),
            ..ExportSettings::default()
        },
    );
    let bundle = Bundle::builder()
        .split_size(2)
        .series("rows", json!([1, 2, 3]))
        .build()
        .unwrap();
    orchestrator
        .export(&ExportRequest::new(&bundle, "report"), &mut BufferedResponse::new())
        .unwrap();

    // Dropping the guard flushes the background writer
    drop(guard);

    let contents = fs::read_to_string(log_path.join(LOG_FILE_NAME)).unwrap();
    let events: Vec<Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(events
        .iter()
        .any(|event| event["fields"]["message"] == "Starting export"));
    assert!(events
        .iter()
        .all(|event| event["target"].as_str().unwrap().starts_with("bundle_export")));
}
