//! Structured logging setup with console and file output.
//!
//! Interactive terminals get console output only. Otherwise events go to a
//! daily rotating file as well, falling back to the console when the log
//! directory cannot be used. `THUNDER_LOG` overrides `RUST_LOG`.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "thunder";
const LOG_ENV_VAR: &str = "THUNDER_LOG";

/// Logging configuration.
pub struct LogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether stdout is a terminal
    pub is_pty: bool,
    /// Optional custom log filter
    pub log_filter: Option<String>,
}

impl LogConfig {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir, is_pty: atty::is(atty::Stream::Stdout), log_filter: None }
    }

    /// Set custom log filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

/// Hold for the lifetime of the application. Dropping it flushes the file writer.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// A second call leaves the first subscriber in place.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    if config.is_pty {
        return init_stdout_logging(config.log_filter.as_deref());
    }

    match init_file_logging(&config) {
        Ok(guard) => LoggingGuard { _worker_guard: Some(guard) },
        Err(e) => {
            eprintln!("Warning: Failed to initialize file logging: {e}. Using console only.");
            init_stdout_logging(config.log_filter.as_deref())
        }
    }
}

/// Initialize with the default log directory.
pub fn init_logging_default() -> LoggingGuard {
    init_logging(LogConfig::new(log_dir()))
}

fn init_stdout_logging(filter: Option<&str>) -> LoggingGuard {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(filter))
        .with_ansi(true)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }

    LoggingGuard { _worker_guard: None }
}

fn init_file_logging(config: &LogConfig) -> Result<WorkerGuard, Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(&config.log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let stdout = std::io::stdout.with_max_level(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_writer(stdout.and(non_blocking))
        .with_env_filter(build_env_filter(config.log_filter.as_deref()))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .try_init()?;

    Ok(guard)
}

/// Custom filter, then `THUNDER_LOG`, then `RUST_LOG`, then the build default.
fn build_env_filter(custom_filter: Option<&str>) -> EnvFilter {
    if let Some(filter) = custom_filter {
        return EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    }

    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
}

pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "debug,thunder_core=trace,tokio_postgres=warn,deadpool=warn"
    }
    #[cfg(not(debug_assertions))]
    {
        "info,thunder_core=info,tokio_postgres=warn,deadpool=warn"
    }
}

/// Get the default log directory.
pub fn log_dir() -> PathBuf {
    crate::services::default_data_dir().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_log_filter()).is_ok());
    }

    #[test]
    fn test_invalid_custom_filter_falls_back() {
        let filter = build_env_filter(Some("thunder_core=loudest"));
        assert_eq!(filter.to_string(), EnvFilter::new(default_log_filter()).to_string());
    }

    #[test]
    fn test_log_dir_under_data_dir() {
        assert!(log_dir().ends_with("logs"));
    }

    #[test]
    fn test_file_logging_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");
        let mut config = LogConfig::new(log_dir.clone()).with_filter("info");
        config.is_pty = false;

        let guard = init_logging(config);
        assert!(log_dir.is_dir());
        drop(guard);
    }
}
