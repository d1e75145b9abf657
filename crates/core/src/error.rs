//! Error types for debouncer construction and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a debouncer or loading its configuration
///
/// All of these are construction-time failures. Once a [`Debouncer`]
/// exists, none of its operations fail.
///
/// [`Debouncer`]: crate::Debouncer
#[derive(Debug, Error)]
pub enum DebounceError {
    /// `wait_ms` was below zero
    #[error("wait must be non-negative, got {0}ms")]
    NegativeWait(i64),

    /// `max_wait_ms` was below zero
    #[error("max wait must be non-negative, got {0}ms")]
    NegativeMaxWait(i64),

    /// No tokio runtime to drive the timers
    #[error("debouncer must be created inside a tokio runtime")]
    NoRuntime,

    /// Config file was not valid TOML for [`DebounceConfig`](crate::DebounceConfig)
    #[error("invalid debounce config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
