//! Fibonacci backoff for failed reconciliations.
//!
//! The sequence is calculated in minutes: 1m, 1m, 2m, 3m, 5m, 8m, 10m (max).

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Generates backoff durations following the Fibonacci sequence, capped at a
/// maximum. Each backoff is the sum of the previous two.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
    max_minutes: u64,
}

impl FibonacciBackoff {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Returns the current backoff and advances the sequence.
    pub fn next_backoff(&mut self) -> Duration {
        let result = Duration::from_secs(self.current_minutes * 60);

        let next_minutes = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = std::cmp::min(next_minutes, self.max_minutes);

        result
    }

    /// Restarts the sequence after a successful reconciliation.
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Backoff sequences of failing resources, keyed by `namespace/name`.
#[derive(Debug, Default)]
pub struct BackoffStates {
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffStates {
    /// Returns the next requeue delay for a failing resource.
    pub fn next_backoff(&self, key: &str) -> Duration {
        match self.states.lock() {
            Ok(mut states) => states.entry(key.to_string()).or_default().next_backoff(),
            Err(e) => {
                warn!("Failed to lock backoff states: {}, using default backoff", e);
                Duration::from_secs(60)
            }
        }
    }

    /// Forgets the failures of a resource after it reconciled successfully.
    pub fn reset(&self, key: &str) {
        if let Ok(mut states) = self.states.lock() {
            if let Some(backoff) = states.get_mut(key) {
                backoff.reset();
            }
        }
    }

    /// Runs `attempt` until it succeeds, sleeping for the next backoff of the
    /// resource after every failure. Returns the number of failed attempts.
    pub async fn retry<F, Fut, E>(&self, key: &str, mut attempt: F) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let mut failures = 0;

        loop {
            match attempt().await {
                Ok(()) => {
                    self.reset(key);
                    return failures;
                }
                Err(e) => {
                    failures += 1;
                    let delay = self.next_backoff(key);
                    warn!("Attempt {} for {} failed: {}, retrying in {:?}", failures, key, e, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
