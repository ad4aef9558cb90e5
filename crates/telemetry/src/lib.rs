use serde::Deserialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Log Directory Error: {0}")]
    LogDir(#[from] io::Error),
    #[error("Subscriber Already Set: {0}")]
    AlreadySet(String),
}

/// Where and how loudly to log.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Directory for the JSON log file. `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
    pub file_prefix: String,
    /// Console filter used when `RUST_LOG` is unset.
    pub console_level: String,
    pub file_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            log_dir: None,
            file_prefix: "reltime.log".to_string(),
            console_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

/// Initialize logging.
///
/// - Console layer: compact, `RUST_LOG` or `console_level`.
/// - File layer (only with `log_dir`): daily rolling JSON, non-blocking.
///
/// Keep the returned guard alive until exit or buffered file logs are lost.
pub fn init(config: &TelemetryConfig) -> Result<Option<WorkerGuard>, TelemetryError> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .compact()
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.console_level)),
        );

    let Some(log_dir) = &config.log_dir else {
        tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadySet(e.to_string()))?;
        return Ok(None);
    };

    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new(&config.file_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadySet(e.to_string()))?;

    Ok(Some(guard))
}
