//! Replay a call schedule against a debounced "API call"
//!
//! Each entry of the schedule is a millisecond offset from the start. The
//! n-th call sends the query `"n"` (1-based), mirroring a user typing into a
//! search box that fires a request per keystroke.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use quiesce_core::{DebounceOptions, Debouncer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info};

/// Offsets of the stock search-box demo
pub const DEMO_SCHEDULE: [u64; 6] = [0, 100, 200, 300, 1000, 3000];

/// One invocation of the wrapped API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub query: String,
    /// Time since the replay started
    pub at: Duration,
}

/// Options plus the schedule to replay
#[derive(Debug, Clone)]
pub struct ReplayPlan {
    pub options: DebounceOptions,
    pub offsets: Vec<u64>,
}

impl ReplayPlan {
    /// wait 500ms, leading edge, 600ms ceiling, six calls
    pub fn demo() -> Self {
        Self {
            options: DebounceOptions::new(Duration::from_millis(500))
                .leading(true)
                .max_wait(Duration::from_millis(600)),
            offsets: DEMO_SCHEDULE.to_vec(),
        }
    }

    /// How long after the last call any timer may still fire
    fn settle_time(&self) -> Duration {
        let wait = self.options.wait();
        self.options.effective_max_wait().unwrap_or(wait).max(wait).saturating_add(Duration::from_millis(50))
    }

    /// Replay the schedule, reporting each invocation as it happens
    ///
    /// Returns every invocation in order once all timers have settled.
    pub async fn run<F>(&self, on_invoke: F) -> Result<Vec<Invocation>>
    where
        F: Fn(&Invocation) + Send + Sync + 'static,
    {
        let start = Instant::now();
        let log: Arc<Mutex<Vec<Invocation>>> = Arc::new(Mutex::new(Vec::new()));

        let api_call = {
            let log = log.clone();
            move |query: String| {
                let invocation = Invocation {
                    query,
                    at: start.elapsed(),
                };
                on_invoke(&invocation);
                log.lock().push(invocation);
            }
        };
        let debounced = Debouncer::new(api_call, self.options)
            .context("Failed to create debouncer")?;

        info!(calls = self.offsets.len(), "replaying schedule");
        for (i, &offset) in self.offsets.iter().enumerate() {
            sleep_until(start + Duration::from_millis(offset)).await;
            debug!(offset, query = i + 1, "call");
            debounced.call((i + 1).to_string());
        }

        sleep(self.settle_time()).await;
        debounced.flush();

        let invocations = log.lock().clone();
        Ok(invocations)
    }
}

/// Parse a comma-separated list of non-decreasing millisecond offsets
pub fn parse_schedule(input: &str) -> Result<Vec<u64>> {
    let mut offsets = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let offset: u64 = part
            .parse()
            .with_context(|| format!("Invalid offset '{}': must be milliseconds", part))?;
        if let Some(&previous) = offsets.last() {
            if offset < previous {
                anyhow::bail!("Schedule must be non-decreasing: {} after {}", offset, previous);
            }
        }
        offsets.push(offset);
    }

    if offsets.is_empty() {
        anyhow::bail!("Schedule is empty");
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(invocations: &[Invocation]) -> Vec<(&str, u128)> {
        invocations
            .iter()
            .map(|inv| (inv.query.as_str(), inv.at.as_millis()))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_replay() {
        let invocations = ReplayPlan::demo().run(|_| {}).await.unwrap();
        assert_eq!(
            queries(&invocations),
            vec![("1", 0), ("4", 600), ("5", 1000), ("6", 3000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_only_replay() {
        let plan = ReplayPlan {
            options: DebounceOptions::new(Duration::from_millis(500)),
            offsets: DEMO_SCHEDULE.to_vec(),
        };
        let invocations = plan.run(|_| {}).await.unwrap();
        assert_eq!(queries(&invocations), vec![("4", 800), ("5", 1500), ("6", 3500)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_sees_each_invocation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let invocations = ReplayPlan::demo()
            .run(move |inv| sink.lock().push(inv.query.clone()))
            .await
            .unwrap();

        let expected: Vec<String> = invocations.iter().map(|inv| inv.query.clone()).collect();
        assert_eq!(*seen.lock(), expected);
    }

    #[test]
    fn test_parse_schedule() {
        assert_eq!(parse_schedule("0,100, 200 ,300").unwrap(), vec![0, 100, 200, 300]);
        assert_eq!(parse_schedule("5,5").unwrap(), vec![5, 5]);
        assert!(parse_schedule("").is_err());
        assert!(parse_schedule("0,abc").is_err());
        assert!(parse_schedule("100,50").is_err());
        assert!(parse_schedule("-1").is_err());
    }
}
