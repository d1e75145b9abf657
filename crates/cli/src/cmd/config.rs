//! Configuration inspection commands

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use quiesce_core::DebounceConfig;
use std::path::Path;

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", DebounceConfig::example());
    Ok(())
}

/// Validate a config file and print what it resolves to
pub async fn run_check(path: &Path) -> Result<()> {
    let config = DebounceConfig::load(path)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    let options = config.to_options()?;

    println!("{} {}", "✓".green(), path.display());
    util::print_options(&options);

    if let Some(max_wait_ms) = config.max_wait_ms {
        if (max_wait_ms as u128) < options.wait().as_millis() {
            println!(
                "{}",
                format!("Note: max_wait_ms ({}) is below wait_ms and is raised to it", max_wait_ms).yellow()
            );
        }
    }

    let normalized = toml::to_string(&config).context("Failed to serialize config")?;
    println!("\n{}", "Normalized:".bold());
    print!("{}", normalized);
    Ok(())
}
