//! Frame scheduler
//!
//! One scheduler drives both the idle and the speech loop; switching loops
//! only changes its mode and throttle interval, so two loops can never run
//! at once. The host frame callback calls `begin_frame` on every tick.

use std::time::Duration;

use parla_core::FrameTime;
use parla_time::FrameThrottle;

/// Which loop is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopMode {
    Stopped,
    Idle,
    Speech,
}

/// Scheduler timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Minimum interval between idle frames
    pub idle_interval: Duration,
    /// Minimum interval between speech frames
    pub speech_interval: Duration,
    /// Delay from speech end back to idle
    pub end_linger: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_millis(50),
            speech_interval: Duration::from_millis(33),
            end_linger: Duration::from_millis(500),
        }
    }
}

/// Result of one frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not animating; nothing drawn
    Stopped,
    /// Too soon after the last rendered frame
    Throttled,
    /// Animating without face geometry; nothing drawn
    MissingGeometry,
    /// Frame rendered by the given loop
    Rendered(LoopMode),
}

/// Frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub rendered: u64,
    pub throttled: u64,
    pub blinks: u64,
    /// Loop mode changes
    pub transitions: u64,
}

/// Single scheduler for the idle and speech loops
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    config: SchedulerConfig,
    mode: LoopMode,
    throttle: FrameThrottle,
    /// Pending return from speech to idle
    idle_return: Option<FrameTime>,
    stats: SchedulerStats,
}

impl FrameScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let throttle = FrameThrottle::new(config.idle_interval);
        Self {
            config,
            mode: LoopMode::Stopped,
            throttle,
            idle_return: None,
            stats: SchedulerStats::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    pub fn is_animating(&self) -> bool {
        self.mode != LoopMode::Stopped
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Scheduled return to idle, if any
    pub fn idle_return(&self) -> Option<FrameTime> {
        self.idle_return
    }

    /// Run the idle loop
    pub fn start_idle(&mut self) {
        self.idle_return = None;
        self.switch_to(LoopMode::Idle);
    }

    /// Run the speech loop. Already speaking only cancels a pending idle
    /// return.
    pub fn start_speech(&mut self) {
        self.idle_return = None;
        self.switch_to(LoopMode::Speech);
    }

    /// Return to idle `end_linger` after `now`
    pub fn schedule_idle_return(&mut self, now: FrameTime) {
        if self.mode != LoopMode::Speech {
            tracing::debug!(mode = ?self.mode, "idle return ignored outside speech");
            return;
        }
        let at = now + self.config.end_linger;
        self.idle_return = Some(at);
        tracing::debug!(?at, "idle return scheduled");
    }

    /// Clear `is_animating`
    pub fn stop(&mut self) {
        self.idle_return = None;
        self.switch_to(LoopMode::Stopped);
    }

    /// Gate one frame callback
    pub fn begin_frame(&mut self, now: FrameTime) -> FrameOutcome {
        if !self.is_animating() {
            return FrameOutcome::Stopped;
        }

        if let Some(at) = self.idle_return {
            if now >= at {
                self.start_idle();
            }
        }

        if !self.throttle.admit(now) {
            self.stats.throttled += 1;
            return FrameOutcome::Throttled;
        }

        self.stats.rendered += 1;
        FrameOutcome::Rendered(self.mode)
    }

    pub fn record_blink(&mut self) {
        self.stats.blinks += 1;
    }

    fn switch_to(&mut self, mode: LoopMode) {
        if self.mode == mode {
            return;
        }
        let from = self.mode;

        match mode {
            LoopMode::Idle => self.throttle.set_min_interval(self.config.idle_interval),
            LoopMode::Speech => self.throttle.set_min_interval(self.config.speech_interval),
            LoopMode::Stopped => {}
        }
        if from == LoopMode::Stopped {
            self.throttle.reset();
        }

        self.mode = mode;
        self.stats.transitions += 1;
        tracing::info!(?from, to = ?mode, "render loop transition");
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
