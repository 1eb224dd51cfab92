//! Blink cycle - when the next periodic blink is due

use std::time::Duration;

use parla_core::{FrameTime, RandomSource};

/// Periodic blink scheduler. Each cycle draws a fresh interval in
/// `[min_interval, max_interval)`.
#[derive(Debug, Clone)]
pub struct BlinkCycle {
    min_interval: Duration,
    max_interval: Duration,
    next: Option<FrameTime>,
}

impl BlinkCycle {
    pub fn new(min_interval: Duration, max_interval: Duration) -> Self {
        let max_interval = max_interval.max(min_interval);
        Self {
            min_interval,
            max_interval,
            next: None,
        }
    }

    /// Is a blink due at `now`? The first poll only arms the cycle.
    pub fn poll<R: RandomSource + ?Sized>(&mut self, now: FrameTime, rng: &mut R) -> bool {
        match self.next {
            Some(next) if now >= next => {
                self.arm(now, rng);
                true
            }
            Some(_) => false,
            None => {
                self.arm(now, rng);
                false
            }
        }
    }

    /// Start a new cycle from `now`
    pub fn arm<R: RandomSource + ?Sized>(&mut self, now: FrameTime, rng: &mut R) {
        self.next = Some(now + rng.duration(self.min_interval, self.max_interval));
    }

    pub fn next_blink(&self) -> Option<FrameTime> {
        self.next
    }

    /// Disarm; the next poll re-arms
    pub fn reset(&mut self) {
        self.next = None;
    }
}

impl Default for BlinkCycle {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000), Duration::from_millis(8000))
    }
}
