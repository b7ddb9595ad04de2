//! Login rate limiting.
//!
//! One keyed governor limiter holds a state per normalized email address.
//! The login handler checks it before verifying the password. Keys are
//! attacker-chosen, so stale entries are dropped every `PRUNE_EVERY`
//! checks.

use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter as GovRateLimiter,
};
use std::{
    num::NonZeroU32,
    sync::atomic::{AtomicU64, Ordering},
};

/// Checks between two sweeps of stale keys.
const PRUNE_EVERY: u64 = 1024;

type EmailRateLimiter<C> =
    GovRateLimiter<String, DefaultKeyedStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Rate limiter state shared across all requests, keyed by email.
pub struct RateLimiterState<C: Clock = DefaultClock> {
    limiter: EmailRateLimiter<C>,
    checks: AtomicU64,
    attempts_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when `attempts_per_minute` is 0 (limiting disabled).
    pub fn new(attempts_per_minute: u32) -> Option<Self> {
        Self::with_clock(attempts_per_minute, DefaultClock::default())
    }
}

impl<C: Clock> RateLimiterState<C> {
    pub fn with_clock(attempts_per_minute: u32, clock: C) -> Option<Self> {
        let per_minute = NonZeroU32::new(attempts_per_minute)?;
        Some(Self {
            limiter: GovRateLimiter::new(
                Quota::per_minute(per_minute),
                DefaultKeyedStateStore::default(),
                clock,
            ),
            checks: AtomicU64::new(0),
            attempts_per_minute,
        })
    }

    pub fn attempts_per_minute(&self) -> u32 {
        self.attempts_per_minute
    }

    /// Number of emails currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Drops emails whose state is back to fresh.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Ok if another attempt is allowed, otherwise the retry delay in seconds.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(self.limiter.clock().now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl<C: Clock> std::fmt::Debug for RateLimiterState<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("attempts_per_minute", &self.attempts_per_minute)
            .field("active_limiters", &self.tracked_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::time::Duration;

    #[test]
    fn test_zero_disables_limiting() {
        assert!(RateLimiterState::new(0).is_none());
        assert!(RateLimiterState::new(5).is_some());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(1).unwrap();

        assert!(state.check("a@example.com").is_ok());
        let result = state.check("a@example.com");
        assert!(result.is_err());
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_emails_are_limited_independently() {
        let state = RateLimiterState::new(1).unwrap();

        assert!(state.check("a@example.com").is_ok());
        assert!(state.check("b@example.com").is_ok());
        assert!(state.check("a@example.com").is_err());
        assert!(state.check("b@example.com").is_err());
    }

    #[test]
    fn test_allows_quota_then_blocks() {
        let state = RateLimiterState::new(5).unwrap();
        for i in 0..5 {
            assert!(state.check("x@example.com").is_ok(), "attempt {} allowed", i);
        }
        assert!(state.check("x@example.com").is_err());
    }

    #[test]
    fn test_prune_drops_stale_emails() {
        let clock = FakeRelativeClock::default();
        let state = RateLimiterState::with_clock(10, clock.clone()).unwrap();
        for i in 0..100 {
            assert!(state.check(&format!("user{}@example.com", i)).is_ok());
        }
        assert_eq!(state.tracked_keys(), 100);

        clock.advance(Duration::from_secs(61));
        state.prune();
        assert_eq!(state.tracked_keys(), 0);
    }

    #[test]
    fn test_many_distinct_emails_stay_bounded() {
        let clock = FakeRelativeClock::default();
        let state = RateLimiterState::with_clock(10, clock.clone()).unwrap();
        for i in 0..(PRUNE_EVERY * 4) {
            // Each email goes stale before the next one arrives
            clock.advance(Duration::from_secs(7));
            assert!(state.check(&format!("user{}@example.com", i)).is_ok());
        }
        assert!(state.tracked_keys() <= PRUNE_EVERY as usize);
    }

    #[test]
    fn test_blocked_email_survives_prune() {
        let state = RateLimiterState::new(1).unwrap();
        assert!(state.check("a@example.com").is_ok());
        state.prune();
        assert!(state.check("a@example.com").is_err());
    }

    #[test]
    fn test_debug_output() {
        let state = RateLimiterState::new(10).unwrap();
        state.check("k").unwrap();
        let debug = format!("{:?}", state);
        assert!(debug.contains("attempts_per_minute: 10"));
        assert!(debug.contains("active_limiters: 1"));
    }
}
