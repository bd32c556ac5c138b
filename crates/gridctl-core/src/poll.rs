//! Bounded polling of asynchronous, externally-owned operations
//!
//! Cluster creates and deletes are asynchronous on the provider side: the
//! submit call returns immediately and the resource must be re-queried at a
//! fixed interval until it reaches a terminal state. This module is the one
//! generic loop behind every such wait in the workspace: the caller supplies
//! a probe and a classifier, the loop owns interval, timeout and the
//! absent-resource edge case.
//!
//! A probe error that the API reports as "not found" is converted into
//! [`Observation::Absent`] and handed to the classifier like any other
//! observation. A just-submitted delete legitimately 404s both before the
//! operation starts and after it finishes, so absence must be classifiable,
//! not fatal. Every other probe error aborts the loop without a verdict.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{CoreError, Result};

/// Interval/timeout pair shared by every polling component.
///
/// A zero `timeout` means "no monitoring beyond the initial check": the loop
/// probes exactly once and returns whatever the first classification says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollConfig {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// True when the loop will probe once and stop
    pub fn is_single_check(&self) -> bool {
        self.timeout.is_zero()
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// One provider-reported snapshot, or the provider telling us the resource
/// does not exist.
#[derive(Debug, Clone)]
pub enum Observation<S> {
    Present(S),
    Absent,
}

/// Terminal classification of an observed resource.
///
/// Computed exactly once per tick; once any non-`Pending` verdict is returned
/// the loop stops and never re-enters `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    Succeeded,
    Failed(String),
    TimedOut,
    NotFound,
}

impl Verdict {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Pending)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pending => write!(f, "pending"),
            Verdict::Succeeded => write!(f, "succeeded"),
            Verdict::Failed(reason) => write!(f, "failed: {reason}"),
            Verdict::TimedOut => write!(f, "timed out"),
            Verdict::NotFound => write!(f, "not found"),
        }
    }
}

/// Final verdict plus the last snapshot seen, so callers can log it or run
/// post-success side effects.
#[derive(Debug)]
pub struct PollResult<S> {
    pub verdict: Verdict,
    pub last_observed: Option<S>,
}

/// Run `probe` until `classify` reports a terminal verdict or `config` says
/// stop.
///
/// The first probe fires immediately; each later one after an `interval`
/// sleep. The timeout is evaluated at the top of each tick, so once it has
/// been exceeded the loop returns [`Verdict::TimedOut`] without probing
/// again, even if the next probe would have classified terminal.
///
/// `on_tick` fires once per observation with the elapsed time, which is
/// enough for the caller to log resource name, human state and elapsed
/// seconds per tick.
pub async fn poll<S, P, Fut, C, T>(
    mut probe: P,
    classify: C,
    config: &PollConfig,
    mut on_tick: T,
) -> Result<PollResult<S>>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = grid_api::Result<Observation<S>>>,
    C: Fn(&Observation<S>, Duration) -> Verdict,
    T: FnMut(&Observation<S>, Duration),
{
    let started = Instant::now();
    let mut last_observed: Option<S> = None;

    loop {
        if !config.timeout.is_zero() && started.elapsed() > config.timeout {
            return Ok(PollResult {
                verdict: Verdict::TimedOut,
                last_observed,
            });
        }

        let observation = match probe().await {
            Ok(observation) => observation,
            // Absence is an observation, not an error
            Err(e) if e.is_not_found() => Observation::Absent,
            Err(e) => return Err(CoreError::Api(e)),
        };

        let elapsed = started.elapsed();
        on_tick(&observation, elapsed);
        let verdict = classify(&observation, elapsed);
        if let Observation::Present(snapshot) = observation {
            last_observed = Some(snapshot);
        }

        if verdict.is_terminal() || config.is_single_check() {
            return Ok(PollResult {
                verdict,
                last_observed,
            });
        }

        tokio::time::sleep(config.interval).await;
    }
}
