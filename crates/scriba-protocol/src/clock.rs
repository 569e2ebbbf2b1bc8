//! Time source abstraction.
//!
//! Token expiry, the persisted-session age ceiling, draft ids and the
//! edit-draft staleness window are all computed from a [`Clock`] so tests
//! can move time forward by hand instead of sleeping.

use std::fmt::Debug;

/// A provider of wall-clock time.
pub trait Clock: Send + Sync + Debug {
    /// Current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Current time as whole seconds since the Unix epoch.
    fn now_secs(&self) -> u64 {
        self.now_millis() / 1000
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // Before-epoch system clocks are clamped to 0 rather than wrapping.
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// A clock that only moves when told to.
///
/// ```ignore
/// use std::time::Duration;
/// use scriba_protocol::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(clock.now_millis(), 3_000);
/// ```
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: std::sync::Mutex<u64>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualClock {
    /// Creates a clock frozen at `millis`.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: std::sync::Mutex::new(millis),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: std::time::Duration) {
        let mut millis = self.millis.lock().unwrap();
        *millis += by.as_millis() as u64;
    }

    /// Jumps to an absolute instant.
    pub fn set(&self, millis: u64) {
        *self.millis.lock().unwrap() = millis;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        *self.millis.lock().unwrap()
    }
}
