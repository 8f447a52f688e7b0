//! Time sources for the sampler.
//!
//! All timers in the capture state machine are wall-clock based and take the
//! current time as an explicit argument, expressed as a [`Duration`] since the
//! clock's origin. Tests drive the machine with a [`ManualClock`].

use crate::constants::MIN_TIMESTAMP_STEP_MS;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is the moment of construction
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock with millisecond resolution.
///
/// Clones share the same underlying time, so a test can keep a handle while
/// the runner owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time; moving backwards is allowed so tests can
    /// exercise timestamp repair
    pub fn set(&self, ms: u64) {
        self.millis.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Produces strictly increasing timestamps for the pose extractor.
///
/// If the clock has not advanced past the last issued stamp, the next stamp
/// is the last one plus one millisecond.
#[derive(Debug, Default)]
pub struct MonotonicStamper {
    last: Option<Duration>,
}

impl MonotonicStamper {
    /// Create a stamper with no history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp given the current clock reading
    pub fn stamp(&mut self, now: Duration) -> Duration {
        let ts = match self.last {
            Some(last) if now <= last => last + Duration::from_millis(MIN_TIMESTAMP_STEP_MS),
            _ => now,
        };
        self.last = Some(ts);
        ts
    }

    /// Forget the last stamp
    pub fn reset(&mut self) {
        self.last = None;
    }
}
