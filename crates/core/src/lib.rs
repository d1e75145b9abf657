//! Debounced function wrappers for Quiesce
//!
//! This crate provides:
//! - The debounce scheduler (quiet timer + optional max-wait ceiling)
//! - Leading and trailing edge invocation
//! - Typed options and a TOML config form
//! - A scoped binding that cancels on drop

pub mod debouncer;
pub mod error;
pub mod options;
pub mod scoped;

// Re-exports
pub use debouncer::Debouncer;
pub use error::DebounceError;
pub use options::{DebounceConfig, DebounceOptions};
pub use scoped::ScopedDebounce;

/// Result type for debouncer construction and configuration
pub type Result<T> = std::result::Result<T, DebounceError>;
