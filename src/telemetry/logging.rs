//! Tracing subscriber setup.
//!
//! Managers emit `tracing` events: allocation and release at `debug`,
//! failed allocations and teardown with live handles at `warn`. This module
//! installs the subscriber that renders them.
//!
//! Supports JSON and pretty-printed formats, an `EnvFilter` directive for
//! levels, and an optional log file in place of stderr. Nothing is
//! installed unless the host calls [`init_logging`].

use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format (JSON or pretty).
    pub format: LogFormat,
    /// Filter directive, e.g. "info" or "memres=trace".
    pub level: String,
    /// Log file. `None` writes to stderr.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, Error)]
pub enum LogError {
    /// The level string is not a valid `EnvFilter` directive.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    /// The configured log file could not be created.
    #[error("Failed to open log file: {0}")]
    FileOpen(String),
    /// A global subscriber is already installed.
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

fn make_writer(path: &Option<PathBuf>) -> Result<BoxMakeWriter, LogError> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| LogError::FileOpen(e.to_string()))?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(std::io::stderr)),
    }
}

/// Install the global subscriber with the given configuration.
///
/// Call once at startup; a second call returns
/// [`LogError::AlreadyInitialized`].
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter =
        EnvFilter::try_new(&config.level).map_err(|e| LogError::InvalidFilter(e.to_string()))?;
    let writer = make_writer(&config.output_path)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(writer)).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty().with_writer(writer)).try_init(),
    };
    installed.map_err(|_| LogError::AlreadyInitialized)
}
