//! Manager configuration loaded from environment variables.
//!
//! All values are read from `MEMRES_*` environment variables with sensible
//! defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `MEMRES_HEAP_ALIGN` | 16 | Heap block alignment (power of two, 1..=4096) |
//! | `MEMRES_MAX_VIEW_LEN` | 4294967295 | Largest single file-view window (bytes) |
//! | `MEMRES_LOG_LEVEL` | info | Log filter directive |
//! | `MEMRES_LOG_FORMAT` | json | `json` or `pretty` |

use crate::memory::{FileViewConfig, HeapConfig, DEFAULT_HEAP_ALIGN, MAX_VIEW_LEN};
use crate::telemetry::{LogConfig, LogFormat};

/// Largest heap alignment accepted from the environment.
const MAX_HEAP_ALIGN: usize = 4096;

/// Effective configuration summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub heap_alignment: usize,
    pub max_view_len: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub heap: HeapConfig,
    pub file_view: FileViewConfig,
    pub log: LogConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Load heap configuration from environment.
fn load_heap_config() -> HeapConfig {
    let alignment = parse_usize("MEMRES_HEAP_ALIGN", DEFAULT_HEAP_ALIGN);
    let alignment = if alignment.is_power_of_two() && alignment <= MAX_HEAP_ALIGN {
        alignment
    } else {
        DEFAULT_HEAP_ALIGN
    };
    HeapConfig { alignment }
}

/// Load file-view configuration from environment.
fn load_file_view_config() -> FileViewConfig {
    let max_view_len = parse_usize("MEMRES_MAX_VIEW_LEN", MAX_VIEW_LEN);
    let max_view_len = max_view_len.clamp(1, MAX_VIEW_LEN);
    FileViewConfig { max_view_len }
}

/// Load logging configuration from environment.
fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let level = std::env::var("MEMRES_LOG_LEVEL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.level);
    let format = match std::env::var("MEMRES_LOG_FORMAT") {
        Ok(val) if val.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
        Ok(val) if val.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => defaults.format,
    };
    LogConfig {
        format,
        level,
        output_path: defaults.output_path,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    EnvConfig {
        heap: load_heap_config(),
        file_view: load_file_view_config(),
        log: load_log_config(),
    }
}

impl EnvConfig {
    /// Return a flat summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            heap_alignment: self.heap.alignment,
            max_view_len: self.file_view.max_view_len,
            log_level: self.log.level.clone(),
            log_format: self.log.format,
        }
    }
}
