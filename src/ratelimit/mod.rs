//! Outbound call rate limiting
//!
//! [`TokenBucket`] bounds how fast enrichment calls leave the process,
//! independently of the daily budget. It wraps a `governor` GCRA limiter,
//! whose refill is computed from elapsed time whenever it is checked.
//!
//! [`inspect_rate_limit_headers`] is observability only: it reads the remote
//! side's rate-limit headers and warns operators, it never throttles.

#[cfg(test)]
mod tests;

use crate::config::RateLimitConfig;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

/// Slowest refill accepted; lower or non-finite rates are raised to this
const MIN_REFILL_PER_SEC: f64 = 0.001;
/// Fastest refill the quota can express
const MAX_REFILL_PER_SEC: f64 = 1_000_000.0;

type DirectRateLimiter<C> = RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Token bucket shared by all enrichment workers
pub struct TokenBucket<C: Clock = DefaultClock> {
    limiter: DirectRateLimiter<C>,
    capacity: NonZeroU32,
    poll_interval: Duration,
}

fn quota_for(capacity: NonZeroU32, refill_per_sec: f64) -> Quota {
    let per_sec = if refill_per_sec.is_finite() && refill_per_sec >= MIN_REFILL_PER_SEC {
        refill_per_sec.min(MAX_REFILL_PER_SEC)
    } else {
        tracing::warn!(
            "Refill rate {} is not usable, falling back to {}/s",
            refill_per_sec,
            MIN_REFILL_PER_SEC
        );
        MIN_REFILL_PER_SEC
    };

    // The period is at least one microsecond, so the quota always exists
    let period = Duration::from_secs_f64(1.0 / per_sec);
    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(capacity))
        .allow_burst(capacity)
}

impl TokenBucket {
    /// Starts full, holding `capacity` tokens and refilling `refill_per_sec`.
    pub fn new(capacity: u32, refill_per_sec: f64, poll_interval: Duration) -> Self {
        Self::with_clock(capacity, refill_per_sec, poll_interval, &DefaultClock::default())
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_per_sec, config.poll_interval())
    }
}

impl<C: Clock> TokenBucket<C> {
    /// Same as [`TokenBucket::new`] but reads time from `clock`.
    pub fn with_clock(capacity: u32, refill_per_sec: f64, poll_interval: Duration, clock: &C) -> Self {
        let capacity = NonZeroU32::new(capacity).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::direct_with_clock(quota_for(capacity, refill_per_sec), clock),
            capacity,
            poll_interval,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity.get()
    }

    /// Deduct `n` tokens if available, without waiting. A request larger
    /// than the capacity is capped to the capacity.
    pub fn try_take(&self, n: u32) -> bool {
        let Some(n) = NonZeroU32::new(n.min(self.capacity.get())) else {
            return true;
        };
        matches!(self.limiter.check_n(n), Ok(Ok(())))
    }

    /// Wait until `n` tokens are available, then deduct them.
    ///
    /// Suspends only the calling task, polling every `poll_interval`. Refill
    /// is computed from elapsed time on each check, there is no background
    /// timer.
    pub async fn take(&self, n: u32) {
        if n > self.capacity.get() {
            tracing::warn!(
                "Requested {} tokens exceeds bucket capacity {}, capping",
                n,
                self.capacity
            );
        }
        while !self.try_take(n) {
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Remaining calls below this trigger an operator warning
pub const LOW_REMAINING_THRESHOLD: u64 = 200;

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

/// Remote rate-limit state as reported in response headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub limit: Option<u64>,
    pub remaining: u64,
    pub reset: Option<String>,
}

impl RateLimitSnapshot {
    pub fn is_low(&self) -> bool {
        self.remaining < LOW_REMAINING_THRESHOLD
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// Parse rate-limit headers. `None` when no usable remaining count is present.
pub fn parse_rate_limit_headers(headers: &HeaderMap) -> Option<RateLimitSnapshot> {
    let remaining = header_str(headers, HEADER_REMAINING)?.parse().ok()?;
    Some(RateLimitSnapshot {
        limit: header_str(headers, HEADER_LIMIT).and_then(|v| v.parse().ok()),
        remaining,
        reset: header_str(headers, HEADER_RESET).map(str::to_string),
    })
}

/// Parse headers and warn when the remote side reports few calls left.
pub fn inspect_rate_limit_headers(headers: &HeaderMap) -> Option<RateLimitSnapshot> {
    let snapshot = parse_rate_limit_headers(headers)?;
    if snapshot.is_low() {
        tracing::warn!(
            "⚠️ Remote rate limit low: {} calls remaining (limit {}, resets {})",
            snapshot.remaining,
            snapshot
                .limit
                .map(|l| l.to_string())
                .unwrap_or_else(|| "?".to_string()),
            snapshot.reset.as_deref().unwrap_or("?")
        );
    } else {
        tracing::debug!("Remote rate limit: {} calls remaining", snapshot.remaining);
    }
    Some(snapshot)
}
