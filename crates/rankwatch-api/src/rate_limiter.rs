//! Sliding-log rate limiter.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Sliding-log limiter granting at most `capacity` permits per `window`.
///
/// Every granted permit is logged with its timestamp and expires exactly
/// one `window` later, so bursts straddling a window boundary can never
/// exceed the configured rate. The log is guarded by a mutex; `allow` and
/// `check` may be called from any number of threads.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RateLimiter {
    /// Maximum number of permits within one window.
    capacity: usize,
    /// Length of the sliding window.
    window: Duration,
    /// Grant timestamps still inside the window, oldest first.
    log: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `capacity` permits per `window`.
    #[must_use]
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            log: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Consumes one permit if available.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Reports whether a permit is available without consuming it.
    #[must_use]
    pub fn check(&self) -> bool {
        self.check_at(Instant::now())
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut log = self.lock();
        self.purge(&mut log, now);
        if log.len() < self.capacity {
            log.push_back(now);
            true
        } else {
            false
        }
    }

    fn check_at(&self, now: Instant) -> bool {
        let mut log = self.lock();
        self.purge(&mut log, now);
        log.len() < self.capacity
    }

    /// Drops permits that have left the window.
    fn purge(&self, log: &mut VecDeque<Instant>, now: Instant) {
        while log
            .front()
            .is_some_and(|&granted| now.saturating_duration_since(granted) >= self.window)
        {
            log.pop_front();
        }
    }

    /// Locks the log; a poisoned lock still holds consistent timestamps.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
