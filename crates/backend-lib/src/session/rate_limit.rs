// ============================
// crates/backend-lib/src/session/rate_limit.rs
// ============================
//! Admission control for session creation.
//!
//! The limit is "session creations per second" for the whole repository,
//! enforced with GCRA (generic cell rate algorithm): one atomic holds the
//! theoretical arrival time of the next creation, and a creation is admitted
//! while that time is no further ahead than the burst allowance. Burst is
//! `max(1, ceil(limit))`, so a fresh repository admits one second's worth of
//! creations at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tollgate_common::{MAX_RATE_LIMIT, MIN_RATE_LIMIT};

/// Lock-free creation rate limiter
#[derive(Debug)]
pub struct CreationRateLimiter {
    /// Reference point for `tat_nanos`
    epoch: Instant,
    /// Current limit as `f64` bits, replaced atomically
    limit_bits: AtomicU64,
    /// Theoretical arrival time in nanoseconds since `epoch`
    tat_nanos: AtomicU64,
}

impl Default for CreationRateLimiter {
    fn default() -> Self {
        Self::new(MAX_RATE_LIMIT)
    }
}

impl CreationRateLimiter {
    /// Create a limiter, clamping `limit` into `[MIN_RATE_LIMIT, MAX_RATE_LIMIT]`
    pub fn new(limit: f64) -> Self {
        Self {
            epoch: Instant::now(),
            limit_bits: AtomicU64::new(bounded(limit).to_bits()),
            tat_nanos: AtomicU64::new(0),
        }
    }

    /// Current limit in creations per second
    pub fn limit(&self) -> f64 {
        f64::from_bits(self.limit_bits.load(Ordering::Acquire))
    }

    /// Replace the limit; readers see either the old or the new value.
    ///
    /// A pending arrival time is pulled back to at most one new interval
    /// ahead, so raising the limit takes effect immediately.
    pub fn set_limit(&self, limit: f64) {
        self.set_limit_at(limit, Instant::now());
    }

    pub fn set_limit_at(&self, limit: f64, now: Instant) {
        let limit = bounded(limit);
        self.limit_bits.store(limit.to_bits(), Ordering::Release);

        let (interval_ns, _) = schedule(limit);
        let ceiling = nanos(now.saturating_duration_since(self.epoch)).saturating_add(interval_ns);
        self.tat_nanos.fetch_min(ceiling, Ordering::AcqRel);
    }

    /// Try to admit one creation now
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Try to admit one creation at `now`
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let (interval_ns, tolerance_ns) = schedule(self.limit());
        let now_ns = nanos(now.saturating_duration_since(self.epoch));

        let mut current = self.tat_nanos.load(Ordering::Acquire);
        loop {
            let tat = current.max(now_ns);
            if tat - now_ns > tolerance_ns {
                return false;
            }
            match self.tat_nanos.compare_exchange_weak(
                current,
                tat.saturating_add(interval_ns),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

fn bounded(limit: f64) -> f64 {
    if limit.is_nan() {
        MIN_RATE_LIMIT
    } else {
        limit.clamp(MIN_RATE_LIMIT, MAX_RATE_LIMIT)
    }
}

/// Emission interval and burst tolerance for `limit`, in nanoseconds
fn schedule(limit: f64) -> (u64, u64) {
    let interval = Duration::from_secs_f64(1.0 / limit);
    let burst = limit.ceil().max(1.0) as u32;
    (nanos(interval), nanos(interval * (burst - 1)))
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
