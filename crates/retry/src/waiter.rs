//! Delay policies consulted between retry attempts.

use std::time::Duration;

use {
    gantry_config::{BackoffKind, WaiterConfig},
    rand::Rng,
};

/// Returns how long to sleep after the `attempt`-th failure (1-based).
pub trait Waiter: Send + Sync {
    fn wait(&self, attempt: u32) -> Duration;
}

impl<F> Waiter for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn wait(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// Growing delay clamped into `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    kind: BackoffKind,
    base: Duration,
    min: Duration,
    max: Option<Duration>,
}

impl Backoff {
    #[must_use]
    pub fn new(kind: BackoffKind, base: Duration) -> Self {
        Self {
            kind,
            base,
            min: Duration::ZERO,
            max: None,
        }
    }

    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self::new(BackoffKind::Fixed, delay)
    }

    #[must_use]
    pub fn with_min(mut self, min: Duration) -> Self {
        self.min = min;
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    /// Delay before jitter, in milliseconds, capped by `max`.
    fn ceiling_ms(&self, attempt: u32) -> u64 {
        let base = u64::try_from(self.base.as_millis()).unwrap_or(u64::MAX);
        let n = u64::from(attempt.max(1));
        let raw = match self.kind {
            BackoffKind::Fixed => base,
            BackoffKind::Linear => base.saturating_mul(n),
            BackoffKind::Polynomial => base.saturating_mul(n.saturating_mul(n)),
            BackoffKind::Exponential
            | BackoffKind::ExponentialFullJitter
            | BackoffKind::ExponentialEqualJitter => {
                let factor = 1u64.checked_shl((n - 1) as u32).unwrap_or(u64::MAX);
                base.saturating_mul(factor)
            },
        };
        match self.max {
            Some(max) => raw.min(u64::try_from(max.as_millis()).unwrap_or(u64::MAX)),
            None => raw,
        }
    }
}

impl Waiter for Backoff {
    fn wait(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling_ms(attempt);
        let ms = match self.kind {
            BackoffKind::ExponentialFullJitter => rand::rng().random_range(0..=ceiling),
            BackoffKind::ExponentialEqualJitter => {
                let half = ceiling / 2;
                half + rand::rng().random_range(0..=ceiling - half)
            },
            _ => ceiling,
        };
        let delay = Duration::from_millis(ms).max(self.min);
        match self.max {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl From<&WaiterConfig> for Backoff {
    fn from(config: &WaiterConfig) -> Self {
        let backoff = Self::new(config.kind, Duration::from_millis(config.base_ms))
            .with_min(Duration::from_millis(config.min_ms));
        if config.max_ms == 0 {
            backoff
        } else {
            backoff.with_max(Duration::from_millis(config.max_ms))
        }
    }
}
