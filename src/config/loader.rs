//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BundleConfig;
use crate::domain::errors::BundleError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Configuration file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "bundle-export.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BundleConfig
/// 4. Applies environment variable overrides (BUNDLE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use bundle_export::config::loader::load_config;
///
/// let config = load_config("bundle-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BundleConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BundleError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BundleError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!(path = %path.display(), "Loaded configuration file");
    load_config_from_str(&contents)
}

/// Loads `path` when given, else `bundle-export.toml` if present, else defaults
///
/// Environment overrides and validation apply in every case. An explicit
/// path that does not exist is an error.
pub fn load_config_or_default(path: Option<&Path>) -> Result<BundleConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_config(DEFAULT_CONFIG_FILE),
        None => {
            tracing::debug!("No configuration file, using defaults");
            finish(BundleConfig::default())
        }
    }
}

/// Parses configuration text, then applies overrides and validation
pub fn load_config_from_str(contents: &str) -> Result<BundleConfig> {
    let contents = substitute_env_vars(contents)?;

    let config: BundleConfig = toml::from_str(&contents)
        .map_err(|e| BundleError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

fn finish(mut config: BundleConfig) -> Result<BundleConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BundleError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BundleError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed_line = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BundleError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| BundleError::Configuration(format!("Invalid value for {name}: {e}")))
}

/// Applies environment variable overrides using BUNDLE_* prefix
///
/// Environment variables follow the pattern: BUNDLE_<SECTION>_<KEY>
/// For example: BUNDLE_EXPORT_FORMAT, BUNDLE_TEMPLATES_ROOT
fn apply_env_overrides(config: &mut BundleConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("BUNDLE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("BUNDLE_EXPORT_VIEW_PREFIX") {
        config.export.view_prefix = val;
    }
    if let Ok(val) = std::env::var("BUNDLE_EXPORT_FORMAT") {
        config.export.format = parse_override("BUNDLE_EXPORT_FORMAT", &val)?;
    }
    if let Ok(val) = std::env::var("BUNDLE_EXPORT_TEMP_DIR") {
        config.export.temp_dir = Some(val.into());
    }
    if let Ok(val) = std::env::var("BUNDLE_EXPORT_ARCHIVE_BUFFER_SIZE") {
        config.export.archive_buffer_size =
            parse_override("BUNDLE_EXPORT_ARCHIVE_BUFFER_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("BUNDLE_EXPORT_CLIENT_COMPATIBILITY") {
        config.export.client_compatibility =
            parse_override("BUNDLE_EXPORT_CLIENT_COMPATIBILITY", &val)?;
    }

    // Template overrides
    if let Ok(val) = std::env::var("BUNDLE_TEMPLATES_ROOT") {
        config.templates.root = val.into();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BUNDLE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("BUNDLE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("BUNDLE_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
