//! Debounce options and their TOML config form

use crate::error::DebounceError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Scheduling options for a [`Debouncer`](crate::Debouncer)
///
/// Immutable once handed to a debouncer. Build with [`DebounceOptions::new`]
/// and the chained setters:
///
/// ```
/// use quiesce_core::DebounceOptions;
/// use std::time::Duration;
///
/// let opts = DebounceOptions::new(Duration::from_millis(500))
///     .leading(true)
///     .max_wait(Duration::from_millis(600));
/// assert_eq!(opts.effective_max_wait(), Some(Duration::from_millis(600)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceOptions {
    wait: Duration,
    leading: bool,
    trailing: bool,
    max_wait: Option<Duration>,
}

impl DebounceOptions {
    /// Trailing-edge only, no ceiling
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            trailing: true,
            max_wait: None,
        }
    }

    /// Invoke on the first call of a burst
    pub fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Invoke once the quiet period after a burst elapses
    pub fn trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// Guarantee an invocation at most this long after a burst starts
    ///
    /// Values shorter than `wait` are raised to `wait`.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn is_leading(&self) -> bool {
        self.leading
    }

    pub fn is_trailing(&self) -> bool {
        self.trailing
    }

    /// Ceiling actually used by the scheduler: `max(max_wait, wait)`
    pub fn effective_max_wait(&self) -> Option<Duration> {
        self.max_wait.map(|max_wait| max_wait.max(self.wait))
    }
}

/// File form of [`DebounceOptions`]
///
/// Durations are signed milliseconds so that a negative value in a config
/// file is reported instead of failing as a type error.
///
/// ```toml
/// wait_ms = 500
/// leading = true
/// trailing = true
/// max_wait_ms = 600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period in milliseconds (default: 0)
    #[serde(default)]
    pub wait_ms: i64,

    /// Fire on the leading edge (default: false)
    #[serde(default)]
    pub leading: bool,

    /// Fire on the trailing edge (default: true)
    #[serde(default = "default_true")]
    pub trailing: bool,

    /// Burst ceiling in milliseconds (default: none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_ms: Option<i64>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            wait_ms: 0,
            leading: false,
            trailing: true,
            max_wait_ms: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl DebounceConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, DebounceError> {
        let config: DebounceConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, DebounceError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DebounceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject negative durations
    pub fn validate(&self) -> Result<(), DebounceError> {
        if self.wait_ms < 0 {
            return Err(DebounceError::NegativeWait(self.wait_ms));
        }
        if let Some(max_wait_ms) = self.max_wait_ms {
            if max_wait_ms < 0 {
                return Err(DebounceError::NegativeMaxWait(max_wait_ms));
            }
        }
        Ok(())
    }

    /// Convert to typed options, validating first
    pub fn to_options(&self) -> Result<DebounceOptions, DebounceError> {
        self.validate()?;

        let mut options = DebounceOptions::new(Duration::from_millis(self.wait_ms as u64))
            .leading(self.leading)
            .trailing(self.trailing);
        if let Some(max_wait_ms) = self.max_wait_ms {
            options = options.max_wait(Duration::from_millis(max_wait_ms as u64));
        }
        Ok(options)
    }

    /// Example config with every key documented
    pub fn example() -> &'static str {
        r#"# Quiesce debounce configuration

# Quiet period: invoke this long after the last call of a burst
wait_ms = 500

# Invoke immediately on the first call of a burst
leading = false

# Invoke once the quiet period elapses (uses the latest call's arguments)
trailing = true

# Force an invocation this long after a burst starts, even under
# continuous calls. Raised to wait_ms if smaller. Omit to disable.
max_wait_ms = 2000
"#
    }
}

/// Milliseconds of `duration`, saturating at `i64::MAX`
fn saturating_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

impl From<DebounceOptions> for DebounceConfig {
    fn from(options: DebounceOptions) -> Self {
        Self {
            wait_ms: saturating_millis(options.wait),
            leading: options.leading,
            trailing: options.trailing,
            max_wait_ms: options.max_wait.map(saturating_millis),
        }
    }
}
