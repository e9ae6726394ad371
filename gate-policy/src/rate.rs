//! Sliding-window rate limiting with an injectable clock.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::engine::{PolicyError, PolicyResult};

/// Source of monotonic time for rate accounting.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// Per-key sliding window of admitted calls.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    clock: Arc<dyn Clock>,
    admitted: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter using the system clock.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    /// Creates a limiter using `clock`.
    #[must_use]
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            admitted: Mutex::new(HashMap::new()),
        }
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Admits one call under `key` if fewer than `limit` calls were admitted
    /// during the trailing window. Rejected calls consume no budget, and keys
    /// with no call left inside the window are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::StatePoisoned`] if the window table is poisoned.
    pub fn try_acquire(&self, key: &str, limit: u32) -> PolicyResult<bool> {
        let now = self.clock.now();
        let mut admitted = self
            .admitted
            .lock()
            .map_err(|_| PolicyError::StatePoisoned { what: "rate window" })?;
        admitted.retain(|_, entries| {
            entries
                .back()
                .is_some_and(|newest| now.saturating_duration_since(*newest) < self.window)
        });
        if limit == 0 {
            return Ok(false);
        }

        let entries = admitted.entry(key.to_owned()).or_default();
        while entries
            .front()
            .is_some_and(|oldest| now.saturating_duration_since(*oldest) >= self.window)
        {
            entries.pop_front();
        }

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if entries.len() >= limit {
            return Ok(false);
        }
        entries.push_back(now);
        Ok(true)
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.admitted.lock().map(|admitted| admitted.len()).unwrap_or_default()
    }
}
