//! Clocks for the render loop

use tokio::time::Instant;

use parla_core::FrameTime;

/// Source of frame time
pub trait Clock {
    /// Current frame time
    fn now(&self) -> FrameTime;
}

/// Frame time since creation, read from tokio's clock
/// INVARIANT: successive readings never decrease
///
/// Follows paused and auto-advanced time in tokio test runtimes, so frame
/// timestamps stay consistent with `tokio::time::sleep` and `interval`.
#[derive(Debug, Clone)]
pub struct TokioClock {
    /// Session start
    reference: Instant,
}

impl TokioClock {
    /// Create a clock reading zero now
    pub fn new() -> Self {
        Self {
            reference: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> FrameTime {
        FrameTime::from_duration(self.reference.elapsed())
    }
}
