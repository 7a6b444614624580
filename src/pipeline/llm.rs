//! Generation calls behind a process-wide minimum-interval rate gate.
//!
//! The generation API enforces a requests-per-minute quota that is global to
//! the API key, not to a document or a request. The gate therefore lives in
//! one shared cell: the timestamp of the last permitted call, protected by a
//! mutex so "read, compare, decide, write" can never interleave between two
//! callers and let two calls through inside one interval window.
//!
//! ## Why a re-check loop, not a queue?
//!
//! Waiters sleep for the remaining window and then re-check under the lock.
//! Several waiters may wake near-simultaneously; whichever takes the lock
//! first claims the next slot and the rest compute a fresh remaining wait.
//! This is a handful of lines and needs no ordered queue — fairness does not
//! matter here, only the interval invariant.
//!
//! The gate keeps time with [`tokio::time::Instant`], so tests drive it with
//! the paused test clock instead of real sleeps.

use crate::error::Pdf2QuizError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// A text-generation capability.
///
/// Implemented by [`crate::provider::GeminiProvider`] in production and by
/// scripted mocks in tests. Failures propagate to the orchestrator; there is
/// no automatic retry at this seam.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, Pdf2QuizError>;
}

/// Process-wide minimum-interval gate over generation calls.
///
/// One instance is shared by every request in the process; see
/// [`crate::generate::QuizBuilder`], which holds it in an `Arc`.
pub struct RateGate {
    interval: Duration,
    /// Timestamp of the last permitted call. `None` = never called.
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// The configured minimum interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until a call is permitted, claiming the slot on return.
    ///
    /// The slot is recorded under the lock, in the same critical section as
    /// the elapsed check — the claim is atomic with the decision.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut last = self.last_call.lock().await;
                let now = Instant::now();
                match *last {
                    None => {
                        *last = Some(now);
                        return;
                    }
                    Some(prev) => {
                        let elapsed = now.duration_since(prev);
                        if elapsed >= self.interval {
                            *last = Some(now);
                            return;
                        }
                        self.interval - elapsed
                    }
                }
            };
            debug!("Rate gate: waiting {:?} before next generation call", wait);
            sleep(wait).await;
        }
    }
}

/// A [`TextGenerator`] that funnels every call through a shared [`RateGate`].
pub struct RateLimitedGenerator {
    inner: Arc<dyn TextGenerator>,
    gate: Arc<RateGate>,
}

impl RateLimitedGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, gate: Arc<RateGate>) -> Self {
        Self { inner, gate }
    }
}

#[async_trait]
impl TextGenerator for RateLimitedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, Pdf2QuizError> {
        self.gate.acquire().await;
        self.inner.generate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(4);

    #[tokio::test(start_paused = true)]
    async fn first_call_proceeds_immediately() {
        let gate = RateGate::new(INTERVAL);
        let before = Instant::now();
        gate.acquire().await;
        assert_eq!(Instant::now(), before, "no wait on a never-used gate");
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_waits_out_the_interval() {
        let gate = RateGate::new(INTERVAL);
        gate.acquire().await;
        let before = Instant::now();
        gate.acquire().await;
        assert!(Instant::now().duration_since(before) >= INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_interval_means_no_wait() {
        let gate = RateGate::new(INTERVAL);
        gate.acquire().await;
        tokio::time::advance(INTERVAL).await;
        let before = Instant::now();
        gate.acquire().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_acquires_are_spaced_by_the_interval() {
        let gate = Arc::new(RateGate::new(INTERVAL));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.acquire().await;
                Instant::now()
            }));
        }

        let mut permits = Vec::new();
        for h in handles {
            permits.push(h.await.unwrap());
        }
        permits.sort();

        for pair in permits.windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            assert!(
                gap >= INTERVAL,
                "two permits {gap:?} apart, interval is {INTERVAL:?}"
            );
        }
    }
}
