//! Politeness delays between sequential requests.

use rand::Rng;
use sifter_core::PacingConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// `base + random(0..=jitter) + progressive * step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    pub base: Duration,
    pub jitter: Duration,
    pub progressive: Duration,
}

impl DelayPolicy {
    /// Delay between listing pages; grows with the page number.
    pub fn listing(config: &PacingConfig) -> Self {
        Self {
            base: Duration::from_millis(config.page_base_ms),
            jitter: Duration::from_millis(config.page_jitter_ms),
            progressive: Duration::from_millis(config.page_progressive_ms),
        }
    }

    /// Delay between detail pages; flat.
    pub fn detail(config: &PacingConfig) -> Self {
        Self {
            base: Duration::from_millis(config.detail_base_ms),
            jitter: Duration::from_millis(config.detail_jitter_ms),
            progressive: Duration::ZERO,
        }
    }

    pub const fn none() -> Self {
        Self {
            base: Duration::ZERO,
            jitter: Duration::ZERO,
            progressive: Duration::ZERO,
        }
    }

    pub fn delay_for<R: Rng + ?Sized>(&self, step: u32, rng: &mut R) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rng.gen_range(0..=jitter_ms))
        };
        self.base + jitter + self.progressive * step
    }

    fn sample(&self, step: u32) -> Duration {
        self.delay_for(step, &mut rand::thread_rng())
    }

    /// Suspend the current task for the delay after `step`.
    pub async fn pause(&self, step: u32) {
        let delay = self.sample(step);
        tracing::debug!(step, delay_ms = delay.as_millis() as u64, "Pacing delay");
        tokio::time::sleep(delay).await;
    }
}

/// Point in time after which a run starts no further work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No limit.
    pub const fn none() -> Self {
        Self(None)
    }

    /// `limit` from now, or no limit.
    pub fn after(limit: Option<Duration>) -> Self {
        Self(limit.map(|limit| Instant::now() + limit))
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Drive `work` until it completes or the deadline passes.
    ///
    /// Returns `None` when the deadline cut the work short; the future is
    /// dropped at that point.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        match self.0 {
            Some(at) => tokio::time::timeout_at(at, work).await.ok(),
            None => Some(work.await),
        }
    }
}
