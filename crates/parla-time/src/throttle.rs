//! Frame throttle
//!
//! The frame callback fires at display refresh rate. Work that should run
//! at a lower rate skips the tick when less than the minimum interval has
//! elapsed since the last admitted one, instead of slowing the callback.

use std::time::Duration;

use parla_core::FrameTime;

/// Admits at most one tick per `min_interval`
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    /// Minimum time between admitted ticks
    min_interval: Duration,
    /// Last admitted tick
    last: Option<FrameTime>,
}

impl FrameThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Admit the tick at `now` if enough time has passed. The first tick
    /// is always admitted.
    pub fn admit(&mut self, now: FrameTime) -> bool {
        match self.last {
            Some(last) if now - last < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Change the interval; the last admitted tick is kept
    pub fn set_min_interval(&mut self, min_interval: Duration) {
        self.min_interval = min_interval;
    }

    pub fn last_admitted(&self) -> Option<FrameTime> {
        self.last
    }

    /// Forget the last admitted tick
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_throttle_skips_early_ticks() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(33));

        assert!(throttle.admit(FrameTime::from_millis(0)));
        assert!(!throttle.admit(FrameTime::from_millis(16)));
        assert!(!throttle.admit(FrameTime::from_millis(32)));
        assert!(throttle.admit(FrameTime::from_millis(33)));
        assert!(!throttle.admit(FrameTime::from_millis(49)));
        assert!(throttle.admit(FrameTime::from_millis(66)));
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(50));

        assert!(throttle.admit(FrameTime::from_millis(100)));
        throttle.reset();
        assert!(throttle.admit(FrameTime::from_millis(101)));
    }

    proptest! {
        #[test]
        fn admitted_ticks_respect_interval(
            interval_ms in 1u64..100,
            steps in proptest::collection::vec(0u64..40, 1..200),
        ) {
            let mut throttle = FrameThrottle::new(Duration::from_millis(interval_ms));
            let mut now = 0u64;
            let mut last_admitted: Option<u64> = None;

            for step in steps {
                now += step;
                if throttle.admit(FrameTime::from_millis(now)) {
                    if let Some(last) = last_admitted {
                        prop_assert!(now - last >= interval_ms);
                    }
                    last_admitted = Some(now);
                }
            }
        }
    }
}
