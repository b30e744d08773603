//! Logging configuration and initialization
//!
//! Provides structured logging with tracing, supporting console output,
//! file logging, and JSON format. A screensaver usually runs without a
//! console, so file output is the way to see what placement decided.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::settings::ScreensaverSettings;

/// Log file name inside the log directory
const LOG_FILE_NAME: &str = "pulse-saver.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Enable file logging (default: false)
    pub file_enabled: bool,
    /// Path for the log file (default: None, uses the data directory)
    pub file_path: Option<PathBuf>,
    /// Use JSON format for logs (default: false)
    pub json_format: bool,
    /// Default log level filter (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_enabled: false,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Build a config from the user's settings
    pub fn from_settings(settings: &ScreensaverSettings) -> Self {
        Self {
            file_enabled: settings.log_to_file,
            file_path: ScreensaverSettings::log_dir().map(|dir| dir.join(LOG_FILE_NAME)),
            ..Self::default()
        }
    }

    /// Where file logs go when enabled
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
    }
}

/// Output format shared by the console and file layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// `PULSE_SAVER_LOG_FORMAT` wins over the config when set
    fn resolve(config: &LogConfig, env_format: Option<&str>) -> Self {
        let json = env_format
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(config.json_format);
        if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Initialize the logging system with the given configuration
///
/// Returns a guard that must be kept alive for the duration of the program
/// to ensure file logging is properly flushed.
///
/// # Environment Variables
///
/// - `PULSE_SAVER_LOG`: Set log level filter (e.g., "debug", "info,pulse_saver=debug")
/// - `PULSE_SAVER_LOG_FORMAT`: Set to "json" for JSON output, on the console and in the file
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    // Check PULSE_SAVER_LOG first, then fall back to RUST_LOG, then to config default
    let env_filter = EnvFilter::try_from_env("PULSE_SAVER_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let env_format = std::env::var("PULSE_SAVER_LOG_FORMAT").ok();
    let format = LogFormat::resolve(config, env_format.as_deref());
    let use_json = format == LogFormat::Json;

    let mut file_guard: Option<WorkerGuard> = None;
    let mut file_writer = None;
    let log_path = config.resolved_file_path();

    if config.file_enabled {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(&log_path)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        file_guard = Some(guard);
        file_writer = Some(non_blocking);
    }

    // Absent layers (None) are no-ops, so every combination shares one subscriber
    let (file_compact, file_json) = match file_writer {
        Some(writer) if use_json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false),
            ),
        ),
        Some(writer) => (
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false),
            ),
            None,
        ),
        None => (None, None),
    };

    let (console_compact, console_json) = match (config.console_enabled, format) {
        (true, LogFormat::Json) => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            ),
        ),
        (true, LogFormat::Compact) => (
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            ),
            None,
        ),
        (false, _) => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_compact)
        .with(file_json)
        .with(console_compact)
        .with(console_json)
        .try_init()?;

    if config.file_enabled {
        eprintln!("Logging to file: {}", log_path.display());
    }

    tracing::info!(
        target: "pulse_saver",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(file_guard)
}

// Re-export WorkerGuard so callers can store it
pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.console_enabled);
        assert!(!config.file_enabled);
        assert!(!config.json_format);
        assert_eq!(config.default_level, "info");
        assert_eq!(config.resolved_file_path(), PathBuf::from("pulse-saver.log"));
    }

    #[test]
    fn test_log_config_from_settings() {
        let mut settings = ScreensaverSettings::default();
        settings.log_to_file = true;

        let config = LogConfig::from_settings(&settings);
        assert!(config.file_enabled);
        assert!(config.console_enabled);
        if let Some(path) = &config.file_path {
            assert!(path.ends_with(LOG_FILE_NAME));
        }
    }

    #[test]
    fn test_env_format_overrides_config() {
        let config = LogConfig::default();
        assert_eq!(LogFormat::resolve(&config, None), LogFormat::Compact);
        assert_eq!(LogFormat::resolve(&config, Some("JSON")), LogFormat::Json);

        let json_config = LogConfig {
            json_format: true,
            ..LogConfig::default()
        };
        assert_eq!(LogFormat::resolve(&json_config, Some("pretty")), LogFormat::Compact);
    }

    #[test]
    fn test_file_logging_honors_json_format() {
        let mut settings = ScreensaverSettings::default();
        settings.log_to_file = true;
        let config = LogConfig::from_settings(&settings);

        // The format applies to every sink, not only the console
        assert_eq!(LogFormat::resolve(&config, Some("json")), LogFormat::Json);
    }
}
