use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current time.
///
/// Credential validity is decided by wall-clock comparison, so the
/// issuer and verifier take the clock as a dependency.
pub trait Clock: Send + Sync {
    // ---
    fn now(&self) -> DateTime<Utc>;
}

/// Type alias for any implementation of Clock.
pub type ClockPtr = Arc<dyn Clock>;

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    // ---
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Stores milliseconds since the Unix epoch. Intended for deterministic
/// tests of rotation behavior.
#[derive(Debug, Default)]
pub struct ManualClock {
    // ---
    millis: AtomicI64,
}

impl ManualClock {
    // ---
    pub fn at_secs(secs: i64) -> Self {
        // ---
        Self {
            millis: AtomicI64::new(secs.saturating_mul(1000)),
        }
    }

    /// Jump to an absolute time, in seconds since the epoch.
    pub fn set_secs(&self, secs: i64) {
        // ---
        self.millis.store(secs.saturating_mul(1000), Ordering::SeqCst);
    }

    /// Move forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        // ---
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    // ---
    fn now(&self) -> DateTime<Utc> {
        // ---
        let millis = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
