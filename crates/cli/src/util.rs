//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use cli_lib::ReplayPlan;
use owo_colors::OwoColorize;
use quiesce_core::{DebounceConfig, DebounceOptions};
use std::path::Path;
use std::time::Duration;

/// Option values given on the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub wait: Option<u64>,
    pub max_wait: Option<u64>,
    pub leading: Option<bool>,
    pub trailing: Option<bool>,
}

/// Resolve options: config file (or the demo defaults), then flags
pub fn resolve_options(config_path: Option<&Path>, overrides: Overrides) -> Result<DebounceOptions> {
    let mut config = match config_path {
        Some(path) => DebounceConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DebounceConfig::from(ReplayPlan::demo().options),
    };

    if let Some(wait) = overrides.wait {
        config.wait_ms = i64::try_from(wait).context("--wait is too large")?;
    }
    if let Some(max_wait) = overrides.max_wait {
        config.max_wait_ms = Some(i64::try_from(max_wait).context("--max-wait is too large")?);
    }
    if let Some(leading) = overrides.leading {
        config.leading = leading;
    }
    if let Some(trailing) = overrides.trailing {
        config.trailing = trailing;
    }

    config.to_options().context("Invalid debounce options")
}

/// Format an offset as a fixed-width millisecond stamp ("[  600ms]")
pub fn format_offset(at: Duration) -> String {
    format!("[{:>6}ms]", at.as_millis())
}

/// Print options as one summary line
pub fn print_options(options: &DebounceOptions) {
    let max_wait = match options.effective_max_wait() {
        Some(max_wait) => format!("{}ms", max_wait.as_millis()),
        None => "none".to_string(),
    };
    println!(
        "{} wait={}ms leading={} trailing={} max_wait={}",
        "Debounce:".bold(),
        options.wait().as_millis(),
        options.is_leading(),
        options.is_trailing(),
        max_wait
    );
}
