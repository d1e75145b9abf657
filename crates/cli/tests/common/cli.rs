//! CLI command execution helpers with automatic timing
//!
//! Wraps the `qd` binary built for this test run and records how long each
//! command took.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

/// CLI command builder with timing
pub struct QdCommand {
    working_dir: PathBuf,
    args: Vec<String>,
}

impl QdCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let output = Command::new(env!("CARGO_BIN_EXE_qd"))
            .args(&self.args)
            .current_dir(&self.working_dir)
            .env("RUST_LOG", "off")
            .output()
            .context("Failed to execute qd")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// Queries of every "API called with query: <q>" line, in order
    pub fn invoked_queries(&self) -> Vec<String> {
        self.stdout
            .lines()
            .filter_map(extract_query)
            .map(str::to_string)
            .collect()
    }
}

/// Extract the query from an invocation line
pub fn extract_query(line: &str) -> Option<&str> {
    const MARKER: &str = "API called with query: ";
    let start = line.find(MARKER)? + MARKER.len();
    Some(line[start..].trim())
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// qd!(dir, "replay", "--schedule", "0,10").assert_success()?;
/// ```
#[macro_export]
macro_rules! qd {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::QdCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_extraction() {
        assert_eq!(extract_query("[   600ms] API called with query: 4"), Some("4"));
        assert_eq!(extract_query("Schedule: 0ms"), None);
    }

    #[test]
    fn test_invoked_queries() {
        let result = CommandResult {
            stdout: "header\n[0ms] API called with query: 1\n[600ms] API called with query: 4\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
            duration: Duration::from_millis(10),
        };
        assert_eq!(result.invoked_queries(), vec!["1", "4"]);
    }
}
