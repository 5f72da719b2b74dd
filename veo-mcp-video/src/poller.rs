//! Fixed-interval polling for long-running video operations.
//!
//! A wait call owns one ephemeral poll session: its interval, deadline, and
//! poll counter live in the call's locals and die when it returns. Status
//! fetches are strictly sequential, spaced by the configured interval, and
//! the deadline check runs before each sleep so the loop never blocks past
//! the caller's timeout.

use crate::operation::{OperationError, OperationName, OperationSnapshot, OperationStatus};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use veo_mcp_common::error::Error;

/// Minimum poll interval in seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;
/// Maximum poll interval in seconds.
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;
/// Minimum wait timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 30;
/// Maximum wait timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 600;
/// Poll interval used when the caller does not supply one.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Wait timeout used when the caller does not supply one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Validated poll interval and timeout for one wait call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    poll_interval: Duration,
    timeout: Duration,
}

impl WaitOptions {
    /// Build wait options, enforcing the boundary bounds before the poller
    /// runs: interval in [5, 60] seconds, timeout in [30, 600] seconds.
    ///
    /// # Errors
    /// Returns `Error::Validation` for out-of-range values.
    pub fn new(poll_interval_secs: u64, timeout_secs: u64) -> Result<Self, Error> {
        if !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS).contains(&poll_interval_secs) {
            return Err(Error::validation(format!(
                "poll_interval_seconds must be between {} and {}, got {}",
                MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS, poll_interval_secs
            )));
        }
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(Error::validation(format!(
                "timeout_seconds must be between {} and {}, got {}",
                MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, timeout_secs
            )));
        }
        Ok(Self {
            poll_interval: Duration::from_secs(poll_interval_secs),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Minimum time between two consecutive status fetches.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wall-clock budget for the whole wait call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Source of fresh operation snapshots.
///
/// Each call must be an uncached read of the remote state; the poller never
/// caches or mutates snapshots.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current snapshot of the named operation.
    async fn fetch_status(&self, name: &OperationName) -> Result<OperationSnapshot, Error>;
}

/// Outcome of a wait call.
///
/// A timeout is a valid outcome, not an error: the remote operation is left
/// running and can be picked up later with a fresh status fetch under the
/// same operation name.
#[derive(Debug)]
pub enum WaitOutcome {
    /// The operation finished and produced artifacts (possibly none).
    Completed {
        /// Artifact URIs returned by the service
        artifacts: Vec<String>,
        /// Wall-clock time spent waiting
        elapsed: Duration,
        /// Number of status fetches performed
        polls: u32,
    },
    /// The remote service reported the operation failed.
    Failed {
        /// Error reported by the service
        error: OperationError,
        /// Wall-clock time spent waiting
        elapsed: Duration,
        /// Number of status fetches performed
        polls: u32,
    },
    /// The deadline elapsed with the operation still non-terminal.
    TimedOut {
        /// Wall-clock time spent waiting
        elapsed: Duration,
        /// Number of status fetches performed
        polls: u32,
    },
}

impl WaitOutcome {
    /// Number of status fetches performed before returning.
    pub fn polls(&self) -> u32 {
        match self {
            WaitOutcome::Completed { polls, .. }
            | WaitOutcome::Failed { polls, .. }
            | WaitOutcome::TimedOut { polls, .. } => *polls,
        }
    }

    /// Wall-clock time spent in the wait call.
    pub fn elapsed(&self) -> Duration {
        match self {
            WaitOutcome::Completed { elapsed, .. }
            | WaitOutcome::Failed { elapsed, .. }
            | WaitOutcome::TimedOut { elapsed, .. } => *elapsed,
        }
    }
}

/// Poll an operation at a fixed interval until it reaches a terminal state
/// or the deadline elapses.
///
/// The deadline check runs at the top of each cycle, before the fetch and
/// before the sleep, so the loop never starts a poll past the deadline. A
/// transport error from any fetch propagates immediately; transient and
/// terminal fetch failures are deliberately not distinguished.
pub async fn wait_for_operation<S>(
    source: &S,
    name: &OperationName,
    options: WaitOptions,
) -> Result<WaitOutcome, Error>
where
    S: StatusSource + ?Sized,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut polls: u32 = 0;

    loop {
        if Instant::now() >= deadline {
            info!(
                operation = %name,
                polls,
                elapsed_secs = start.elapsed().as_secs(),
                "Wait deadline elapsed; operation still running remotely"
            );
            return Ok(WaitOutcome::TimedOut {
                elapsed: start.elapsed(),
                polls,
            });
        }

        let snapshot = source.fetch_status(name).await?;
        polls += 1;

        match snapshot.status() {
            OperationStatus::Completed => {
                let artifacts = snapshot.artifact_uris();
                info!(
                    operation = %name,
                    polls,
                    artifacts = artifacts.len(),
                    "Operation completed"
                );
                return Ok(WaitOutcome::Completed {
                    artifacts,
                    elapsed: start.elapsed(),
                    polls,
                });
            }
            OperationStatus::Failed => {
                return Ok(WaitOutcome::Failed {
                    error: snapshot.error.unwrap_or_default(),
                    elapsed: start.elapsed(),
                    polls,
                });
            }
            OperationStatus::InProgress => {
                debug!(operation = %name, polls, "Operation still in progress");
                sleep(options.poll_interval()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted status source: returns queued results in order, then repeats
    /// an in-progress snapshot. Records the instant of every fetch.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<OperationSnapshot, Error>>>,
        fetch_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<OperationSnapshot, Error>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fetch_times: Mutex::new(Vec::new()),
            }
        }

        fn always_in_progress() -> Self {
            Self::new(Vec::new())
        }

        fn fetch_times(&self) -> Vec<Instant> {
            self.fetch_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self, _name: &OperationName) -> Result<OperationSnapshot, Error> {
            self.fetch_times.lock().unwrap().push(Instant::now());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(in_progress()))
        }
    }

    fn in_progress() -> OperationSnapshot {
        serde_json::from_str(r#"{"name": "operations/abc123", "done": false}"#).unwrap()
    }

    fn completed(uris: &[&str]) -> OperationSnapshot {
        let samples: Vec<String> = uris
            .iter()
            .map(|u| format!(r#"{{"video": {{"uri": "{}"}}}}"#, u))
            .collect();
        serde_json::from_str(&format!(
            r#"{{"done": true, "response": {{"generateVideoResponse": {{"generatedSamples": [{}]}}}}}}"#,
            samples.join(",")
        ))
        .unwrap()
    }

    fn failed(code: i32, message: &str) -> OperationSnapshot {
        serde_json::from_str(&format!(
            r#"{{"error": {{"code": {}, "message": "{}"}}}}"#,
            code, message
        ))
        .unwrap()
    }

    fn name() -> OperationName {
        OperationName::parse("abc123").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn completes_on_third_fetch() {
        let source = ScriptedSource::new(vec![
            Ok(in_progress()),
            Ok(in_progress()),
            Ok(completed(&["uri1"])),
        ]);
        let options = WaitOptions::new(5, 120).unwrap();

        let outcome = wait_for_operation(&source, &name(), options).await.unwrap();
        match outcome {
            WaitOutcome::Completed { artifacts, elapsed, polls } => {
                assert_eq!(polls, 3);
                assert_eq!(artifacts, vec!["uri1".to_string()]);
                // Two sleeps of 5s happened before the third fetch
                assert_eq!(elapsed.as_secs(), 10);
            }
            other => panic!("Expected Completed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completes_just_inside_a_short_deadline() {
        // Interval 5, timeout 30 (minimum allowed), done on fetch 3: the
        // completion lands at 10s, well inside the deadline.
        let source = ScriptedSource::new(vec![
            Ok(in_progress()),
            Ok(in_progress()),
            Ok(completed(&["uri1"])),
        ]);
        let options = WaitOptions::new(5, 30).unwrap();

        let outcome = wait_for_operation(&source, &name(), options).await.unwrap();
        assert_eq!(outcome.polls(), 3);
        assert!(outcome.elapsed().as_secs() >= 10);
        assert!(outcome.elapsed() < options.timeout());
        assert!(matches!(outcome, WaitOutcome::Completed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_operation_never_completes() {
        let source = ScriptedSource::always_in_progress();
        // Interval 10 against timeout 30: fetches at 0s, 10s, 20s, then the
        // deadline check at 30s fires before a fourth fetch.
        let options = WaitOptions::new(10, 30).unwrap();

        let outcome = wait_for_operation(&source, &name(), options).await.unwrap();
        match outcome {
            WaitOutcome::TimedOut { elapsed, polls } => {
                assert_eq!(polls, 3);
                assert!(elapsed >= options.timeout());
            }
            other => panic!("Expected TimedOut, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_overshoots_deadline_by_less_than_one_interval() {
        // Timeout 45 is not a multiple of interval 30: the second sleep runs
        // to 60s, then the deadline check returns without a third fetch.
        let source = ScriptedSource::always_in_progress();
        let options = WaitOptions::new(30, 45).unwrap();

        let outcome = wait_for_operation(&source, &name(), options).await.unwrap();
        match outcome {
            WaitOutcome::TimedOut { elapsed, polls } => {
                assert_eq!(polls, 2);
                assert!(elapsed >= options.timeout());
                assert!(elapsed < options.timeout() + options.poll_interval());
            }
            other => panic!("Expected TimedOut, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_poll_count_stays_within_interval_bound() {
        // ceil(t/p) - 1 <= polls <= ceil(t/p) + 1 for a never-completing
        // operation, and elapsed >= t.
        let cases = [(5u64, 30u64), (7, 30), (10, 45), (15, 100), (60, 600), (5, 600)];
        for (p, t) in cases {
            let source = ScriptedSource::always_in_progress();
            let options = WaitOptions::new(p, t).unwrap();
            let outcome = wait_for_operation(&source, &name(), options).await.unwrap();
            assert!(
                matches!(outcome, WaitOutcome::TimedOut { .. }),
                "p={} t={} should time out",
                p,
                t
            );
            let ceil = t.div_ceil(p);
            let polls = u64::from(outcome.polls());
            assert!(
                polls + 1 >= ceil && polls <= ceil + 1,
                "p={} t={}: polls {} outside ceil bound {}",
                p,
                t,
                polls,
                ceil
            );
            assert!(outcome.elapsed().as_secs() >= t);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completes_on_first_fetch_without_sleeping() {
        let source = ScriptedSource::new(vec![Ok(completed(&["uri1", "uri2"]))]);
        let options = WaitOptions::default();

        let outcome = wait_for_operation(&source, &name(), options).await.unwrap();
        assert_eq!(outcome.polls(), 1);
        assert_eq!(outcome.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_operation_returns_failed_outcome() {
        let source = ScriptedSource::new(vec![Ok(in_progress()), Ok(failed(7, "denied"))]);
        let options = WaitOptions::new(5, 60).unwrap();

        let outcome = wait_for_operation(&source, &name(), options).await.unwrap();
        match outcome {
            WaitOutcome::Failed { error, polls, .. } => {
                assert_eq!(polls, 2);
                assert_eq!(error.code, Some(7));
                assert_eq!(error.message.as_deref(), Some("denied"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_mid_poll_propagates() {
        let source = ScriptedSource::new(vec![
            Ok(in_progress()),
            Err(Error::transport("https://example.com", 503, "unavailable")),
        ]);
        let options = WaitOptions::new(5, 60).unwrap();

        let result = wait_for_operation(&source, &name(), options).await;
        match result {
            Err(Error::Transport { status_code, .. }) => assert_eq!(status_code, 503),
            other => panic!("Expected transport error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_are_spaced_by_the_poll_interval() {
        let source = ScriptedSource::always_in_progress();
        let options = WaitOptions::new(15, 60).unwrap();

        let _ = wait_for_operation(&source, &name(), options).await.unwrap();
        let times = source.fetch_times();
        assert!(times.len() >= 2);
        for pair in times.windows(2) {
            assert!(
                pair[1] - pair[0] >= options.poll_interval(),
                "Consecutive fetches closer than the interval"
            );
        }
    }

    #[test]
    fn wait_options_rejects_out_of_range_values() {
        assert!(WaitOptions::new(4, 300).is_err());
        assert!(WaitOptions::new(61, 300).is_err());
        assert!(WaitOptions::new(10, 29).is_err());
        assert!(WaitOptions::new(10, 601).is_err());
    }

    #[test]
    fn wait_options_accepts_boundary_values() {
        assert!(WaitOptions::new(5, 30).is_ok());
        assert!(WaitOptions::new(60, 600).is_ok());
    }

    #[test]
    fn default_wait_options_are_within_bounds() {
        let defaults = WaitOptions::default();
        let rebuilt = WaitOptions::new(DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS).unwrap();
        assert_eq!(defaults, rebuilt);
    }
}
