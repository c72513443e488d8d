//! # Carto Testing
//!
//! Testing utilities shared by the Carto crates.
//!
//! This crate provides:
//! - Deterministic clocks implementing [`carto_core::environment::Clock`]
//! - A Given/When/Then harness for reducers ([`ReducerTest`])
//! - A one-line tracing setup for tests that want log output
//!
//! ## Example
//!
//! ```
//! use carto_testing::ManualClock;
//! use carto_core::environment::Clock;
//! use chrono::Duration;
//!
//! let clock = ManualClock::at_millis(1_000);
//! clock.advance(Duration::seconds(61));
//! assert_eq!(clock.now_millis(), 62_000);
//! ```

use carto_core::environment::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};


/// Mock clocks for deterministic tests.
pub mod mocks {
    use super::{Arc, Clock, DateTime, Duration, Mutex, Utc};

    /// Clock pinned to one instant.
    ///
    /// ```
    /// use carto_testing::mocks::FixedClock;
    /// use carto_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Pin the clock at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when a test advances it.
    ///
    /// Clones share the same instant, so a test can keep one handle while the
    /// code under test owns another.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Start the clock at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Start the clock at `millis` milliseconds after the Unix epoch.
        #[must_use]
        pub fn at_millis(millis: i64) -> Self {
            Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
        }

        /// Move the clock forward (or backward, for a negative duration).
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute instant.
        pub fn set(&self, to: DateTime<Utc>) {
            let mut time = self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            *time = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    /// Clock pinned at 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Install a test subscriber that honours `RUST_LOG`.
///
/// Safe to call from many tests; only the first call installs it.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub use mocks::{FixedClock, ManualClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().timestamp_millis(), 1_735_689_600_000);
    }

    #[test]
    fn manual_clock_advances_shared_instant() {
        let clock = ManualClock::at_millis(0);
        let handle = clock.clone();
        handle.advance(Duration::milliseconds(1500));
        assert_eq!(clock.now_millis(), 1500);

        handle.set(test_clock().now());
        assert_eq!(clock.now(), test_clock().now());
    }
}
