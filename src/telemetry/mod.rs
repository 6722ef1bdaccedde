//! Structured logging for resource managers.

mod logging;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
