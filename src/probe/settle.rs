//! Bounded polling for asynchronous state transitions.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// How long to keep observing, and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Total budget after the first observation.
    pub timeout: Duration,
    /// Delay between observations.
    pub interval: Duration,
}

impl SettlePolicy {
    /// Build a policy from a budget and poll interval.
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// A policy that observes exactly once.
    #[must_use]
    pub const fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

/// Result of [`wait_until`], carrying the last observation either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled<T> {
    /// The predicate accepted the observation.
    Reached(T),
    /// The budget ran out first.
    TimedOut(T),
}

impl<T> Settled<T> {
    /// Returns whether the predicate was satisfied.
    #[must_use]
    pub const fn is_reached(&self) -> bool {
        matches!(self, Self::Reached(_))
    }

    /// Transform the observation, keeping the verdict.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Settled<U> {
        match self {
            Self::Reached(value) => Settled::Reached(f(value)),
            Self::TimedOut(value) => Settled::TimedOut(f(value)),
        }
    }

    /// Returns the last observation.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Reached(value) | Self::TimedOut(value) => value,
        }
    }
}

/// Observe until `accept` holds or the policy's budget is spent.
///
/// The first observation happens immediately. An observation error ends the
/// wait at once; not-yet-settled values are never errors.
///
/// # Errors
///
/// Returns the first error produced by `observe`.
pub async fn wait_until<T, E, O, Fut, A>(
    policy: SettlePolicy,
    mut observe: O,
    accept: A,
) -> Result<Settled<T>, E>
where
    O: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    A: Fn(&T) -> bool,
{
    let deadline = Instant::now() + policy.timeout;
    loop {
        let value = observe().await?;
        if accept(&value) {
            return Ok(Settled::Reached(value));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(Settled::TimedOut(value));
        }
        tokio::time::sleep(policy.interval.min(deadline - now)).await;
    }
}
