//! Time primitives for Parla
//!
//! Every animation formula is a function of frame time: a monotonic
//! timestamp measured from session start. The host's frame callback
//! supplies it; formulas read it in milliseconds.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Frame time - monotonic, local-driven
/// Represented as microseconds since session start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTime(pub u64);

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        FrameTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        FrameTime(millis * 1000)
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        FrameTime((secs.max(0.0) * 1_000_000.0) as u64)
    }

    #[inline]
    pub fn from_duration(elapsed: Duration) -> Self {
        FrameTime(elapsed.as_micros() as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    /// Milliseconds with sub-millisecond precision, the unit of all
    /// oscillation formulas
    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        FrameTime(self.0.saturating_add(duration.as_micros() as u64))
    }

    /// Time elapsed since an earlier instant (zero if `earlier` is later)
    #[inline]
    pub fn since(self, earlier: FrameTime) -> Duration {
        self - earlier
    }
}

impl Add<Duration> for FrameTime {
    type Output = FrameTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        FrameTime(self.0 + rhs.as_micros() as u64)
    }
}

impl Sub<FrameTime> for FrameTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: FrameTime) -> Self::Output {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for FrameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.as_millis_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_units() {
        let t = FrameTime::from_millis(1500);
        assert_eq!(t.as_micros(), 1_500_000);
        assert_eq!(t.as_millis(), 1500);
        assert!((t.as_millis_f64() - 1500.0).abs() < 1e-9);
        assert!((t.as_secs_f64() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_frame_time_arithmetic() {
        let t1 = FrameTime::from_millis(100);
        let t2 = t1 + Duration::from_millis(33);

        assert_eq!(t2.as_millis(), 133);
        assert_eq!(t2 - t1, Duration::from_millis(33));
        // Never negative
        assert_eq!(t1 - t2, Duration::ZERO);
    }

    #[test]
    fn test_frame_time_debug() {
        let t = FrameTime::from_micros(1_500);
        assert_eq!(format!("{:?}", t), "t(1.500ms)");
    }
}
