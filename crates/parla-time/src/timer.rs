//! Keyed one-shot timers
//!
//! Self-expiring state (an expression flag that clears itself, a blink
//! phase) is modelled as a deadline keyed by what it affects. Arming a key
//! that is already pending replaces its deadline, so a later event can
//! safely reset a still-pending expiry. Timers fire only when the owner
//! polls them with the current time; nothing runs in the background.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parla_core::FrameTime;

/// Pending deadlines keyed by `K`
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    deadlines: HashMap<K, FrameTime>,
}

impl<K: Copy + Eq + Hash> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            deadlines: HashMap::new(),
        }
    }

    /// Arm `key` to fire at `deadline`, replacing any pending deadline.
    /// Returns the replaced deadline, if any.
    pub fn schedule(&mut self, key: K, deadline: FrameTime) -> Option<FrameTime> {
        self.deadlines.insert(key, deadline)
    }

    /// Arm `key` to fire `delay` after `now`
    pub fn schedule_after(&mut self, key: K, now: FrameTime, delay: Duration) -> Option<FrameTime> {
        self.schedule(key, now + delay)
    }

    /// Disarm `key`. Returns true if it was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn deadline(&self, key: K) -> Option<FrameTime> {
        self.deadlines.get(&key).copied()
    }

    /// Remove and return every key due at `now`, earliest deadline first
    pub fn pop_due(&mut self, now: FrameTime) -> Vec<K> {
        let mut due: Vec<(FrameTime, K)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(&key, &deadline)| (deadline, key))
            .collect();

        if due.is_empty() {
            return Vec::new();
        }

        due.sort_by_key(|(deadline, _)| *deadline);
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

impl<K: Copy + Eq + Hash> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
        C,
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(Key::A, FrameTime::from_millis(300));
        timers.schedule(Key::B, FrameTime::from_millis(100));
        timers.schedule(Key::C, FrameTime::from_millis(900));

        assert!(timers.pop_due(FrameTime::from_millis(50)).is_empty());
        assert_eq!(timers.pop_due(FrameTime::from_millis(300)), vec![Key::B, Key::A]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.deadline(Key::C), Some(FrameTime::from_millis(900)));
    }

    #[test]
    fn test_rescheduling_replaces_deadline() {
        let mut timers = TimerQueue::new();
        let t0 = FrameTime::ZERO;

        timers.schedule_after(Key::A, t0, Duration::from_millis(1000));
        let replaced = timers.schedule_after(Key::A, FrameTime::from_millis(600), Duration::from_millis(1000));

        assert_eq!(replaced, Some(FrameTime::from_millis(1000)));
        // The first deadline no longer fires
        assert!(timers.pop_due(FrameTime::from_millis(1000)).is_empty());
        assert_eq!(timers.pop_due(FrameTime::from_millis(1600)), vec![Key::A]);
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        timers.schedule(Key::A, FrameTime::from_millis(10));
        timers.schedule(Key::B, FrameTime::from_millis(10));

        assert!(timers.cancel(Key::A));
        assert!(!timers.cancel(Key::A));

        assert_eq!(timers.deadline(Key::A), None);

        timers.clear();
        assert!(timers.is_empty());
    }
}
