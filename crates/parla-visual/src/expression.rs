//! Expression State Machine - speech-driven facial expression
//!
//! Not one state machine but a set of independent flags, each with its own
//! self-expiring timer, over shared continuous parameters. Flags may
//! overlap (a question while nodding); parameters decay back toward rest
//! every tick.
//!
//! # Inputs
//!
//! - Speech boundaries (word / syllable) with the utterance text
//! - Frame ticks (expiry, overrides, decay, blinks)
//!
//! All randomness comes from the caller's `RandomSource`.

use std::time::Duration;

use parla_core::{BoundaryKind, FrameTime, RandomSource};
use parla_time::TimerQueue;
use parla_voice::{CueLexicon, TextCues};

use crate::{BlinkCycle, HeadMotion, PoseMode};

/// Mouth openness at rest
pub const MOUTH_REST: f64 = 0.1;

/// Discrete expression flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionFlag {
    Surprised,
    Thinking,
    Emphasis,
    Nodding,
    Turning,
}

impl ExpressionFlag {
    pub fn all() -> &'static [ExpressionFlag] {
        &[
            ExpressionFlag::Surprised,
            ExpressionFlag::Thinking,
            ExpressionFlag::Emphasis,
            ExpressionFlag::Nodding,
            ExpressionFlag::Turning,
        ]
    }
}

/// Independent expression flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpressionFlags {
    pub surprised: bool,
    pub thinking: bool,
    pub emphasis: bool,
    pub nodding: bool,
    pub turning: bool,
}

impl ExpressionFlags {
    pub fn get(&self, flag: ExpressionFlag) -> bool {
        match flag {
            ExpressionFlag::Surprised => self.surprised,
            ExpressionFlag::Thinking => self.thinking,
            ExpressionFlag::Emphasis => self.emphasis,
            ExpressionFlag::Nodding => self.nodding,
            ExpressionFlag::Turning => self.turning,
        }
    }

    pub fn set(&mut self, flag: ExpressionFlag, value: bool) {
        let slot = match flag {
            ExpressionFlag::Surprised => &mut self.surprised,
            ExpressionFlag::Thinking => &mut self.thinking,
            ExpressionFlag::Emphasis => &mut self.emphasis,
            ExpressionFlag::Nodding => &mut self.nodding,
            ExpressionFlag::Turning => &mut self.turning,
        };
        *slot = value;
    }

    pub fn any(&self) -> bool {
        ExpressionFlag::all().iter().any(|&flag| self.get(flag))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Current expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpressionState {
    pub flags: ExpressionFlags,
    /// Mouth openness [0.1 - 1.0]
    pub mouth_openness: f64,
    /// Eyebrow raise [0.0 - 1.0]
    pub eyebrow_raise: f64,
    /// Eye openness [0.0 - 1.0], 1.0 = fully open
    pub eye_openness: f64,
    pub head: HeadMotion,
}

impl ExpressionState {
    pub fn neutral() -> Self {
        Self {
            flags: ExpressionFlags::default(),
            mouth_openness: MOUTH_REST,
            eyebrow_raise: 0.0,
            eye_openness: 1.0,
            head: HeadMotion::default(),
        }
    }

    /// Pose mode while speaking
    pub fn speaking_pose_mode(&self) -> PoseMode {
        PoseMode::from_flags(self.flags.nodding, self.flags.turning)
    }
}

impl Default for ExpressionState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Expression tuning
#[derive(Debug, Clone)]
pub struct ExpressionConfig {
    /// Chance a word boundary adds emphasis
    pub emphasis_chance: f64,
    /// Chance an emphasized word adds a head gesture
    pub gesture_chance: f64,
    /// Gesture length range
    pub gesture_min: Duration,
    pub gesture_max: Duration,
    /// Chance per tick an emphasized face re-raises the brows
    pub emphasis_brow_chance: f64,
    /// How long cue flags stay on
    pub question_hold: Duration,
    pub exclamation_hold: Duration,
    pub hesitation_hold: Duration,
    /// Periodic blink interval range
    pub blink_min: Duration,
    pub blink_max: Duration,
    /// Blink phases, from blink start
    pub blink_half_open: Duration,
    pub blink_open: Duration,
    /// Per-tick decay
    pub mouth_decay: f64,
    pub brow_decay: f64,
    pub eye_recovery: f64,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            emphasis_chance: 0.2,
            gesture_chance: 0.3,
            gesture_min: Duration::from_millis(500),
            gesture_max: Duration::from_millis(800),
            emphasis_brow_chance: 0.3,
            question_hold: Duration::from_millis(1000),
            exclamation_hold: Duration::from_millis(800),
            hesitation_hold: Duration::from_millis(1500),
            blink_min: Duration::from_millis(5000),
            blink_max: Duration::from_millis(8000),
            blink_half_open: Duration::from_millis(100),
            blink_open: Duration::from_millis(150),
            mouth_decay: 0.95,
            brow_decay: 0.9,
            eye_recovery: 0.1,
        }
    }
}

impl ExpressionConfig {
    /// Calmer face: fewer emphasized words and gestures
    pub fn subtle() -> Self {
        Self {
            emphasis_chance: 0.1,
            gesture_chance: 0.15,
            emphasis_brow_chance: 0.15,
            ..Default::default()
        }
    }
}

/// Keys of the expression timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionTimer {
    /// Clear a flag
    Clear(ExpressionFlag),
    /// Blink phase 2: eyes half open
    BlinkHalfOpen,
    /// Blink phase 3: eyes open
    BlinkOpen,
}

/// Drives `ExpressionState` from speech and frame ticks
#[derive(Debug, Clone)]
pub struct ExpressionEngine {
    config: ExpressionConfig,
    lexicon: CueLexicon,
    state: ExpressionState,
    timers: TimerQueue<ExpressionTimer>,
    blink: BlinkCycle,
}

impl ExpressionEngine {
    pub fn new(config: ExpressionConfig) -> Self {
        let blink = BlinkCycle::new(config.blink_min, config.blink_max);
        Self {
            config,
            lexicon: CueLexicon::default(),
            state: ExpressionState::neutral(),
            timers: TimerQueue::new(),
            blink,
        }
    }

    pub fn with_lexicon(mut self, lexicon: CueLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn config(&self) -> &ExpressionConfig {
        &self.config
    }

    pub fn state(&self) -> &ExpressionState {
        &self.state
    }

    pub fn flags(&self) -> ExpressionFlags {
        self.state.flags
    }

    /// Pending timer deadline, for inspection
    pub fn timer_deadline(&self, timer: ExpressionTimer) -> Option<FrameTime> {
        self.timers.deadline(timer)
    }

    /// React to a speech boundary. `text` is the full utterance text.
    pub fn on_boundary<R: RandomSource + ?Sized>(
        &mut self,
        kind: BoundaryKind,
        text: &str,
        now: FrameTime,
        rng: &mut R,
    ) {
        match kind {
            BoundaryKind::Word => self.on_word(now, rng),
            BoundaryKind::Syllable => {
                self.state.mouth_openness = rng.range(0.2, 0.5);
            }
        }

        let cues = self.lexicon.analyze(text);
        self.apply_cues(cues, now);
    }

    fn on_word<R: RandomSource + ?Sized>(&mut self, now: FrameTime, rng: &mut R) {
        // Word starts open wider
        self.state.mouth_openness = rng.range(0.5, 1.0);

        if !rng.chance(self.config.emphasis_chance) {
            self.clear_flag(ExpressionFlag::Emphasis);
            return;
        }

        self.state.flags.emphasis = true;
        self.state.eyebrow_raise = rng.range(0.3, 0.5);

        if rng.chance(self.config.gesture_chance) {
            let gesture = if rng.chance(0.5) {
                ExpressionFlag::Nodding
            } else {
                ExpressionFlag::Turning
            };
            let hold = rng.duration(self.config.gesture_min, self.config.gesture_max);
            self.hold_flag(gesture, now, hold);
        }
    }

    /// Apply text cues: question → surprised, exclamation → emphasis,
    /// hesitation → thinking
    pub fn apply_cues(&mut self, cues: TextCues, now: FrameTime) {
        if cues.question {
            self.hold_flag(ExpressionFlag::Surprised, now, self.config.question_hold);
            self.state.eyebrow_raise = 0.7;
        }
        if cues.exclamation {
            self.hold_flag(ExpressionFlag::Emphasis, now, self.config.exclamation_hold);
            self.state.eyebrow_raise = 0.5;
        }
        if cues.hesitation {
            self.hold_flag(ExpressionFlag::Thinking, now, self.config.hesitation_hold);
        }
    }

    /// Set a flag and (re)arm its clear timer
    fn hold_flag(&mut self, flag: ExpressionFlag, now: FrameTime, hold: Duration) {
        self.state.flags.set(flag, true);
        self.timers.schedule_after(ExpressionTimer::Clear(flag), now, hold);
    }

    fn clear_flag(&mut self, flag: ExpressionFlag) {
        self.state.flags.set(flag, false);
        self.timers.cancel(ExpressionTimer::Clear(flag));
    }

    /// Fire every timer due at `now`. Returns how many fired.
    pub fn expire(&mut self, now: FrameTime) -> usize {
        let due = self.timers.pop_due(now);
        for timer in &due {
            match *timer {
                ExpressionTimer::Clear(flag) => self.state.flags.set(flag, false),
                ExpressionTimer::BlinkHalfOpen => self.state.eye_openness = 0.5,
                ExpressionTimer::BlinkOpen => self.state.eye_openness = 1.0,
            }
        }
        due.len()
    }

    /// Brow overrides before drawing
    pub fn apply_overrides<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let flags = self.state.flags;
        if flags.surprised {
            self.state.eyebrow_raise = 0.8;
        } else if flags.thinking {
            self.state.eyebrow_raise = 0.5;
        } else if flags.emphasis && rng.chance(self.config.emphasis_brow_chance) {
            self.state.eyebrow_raise = rng.range(0.3, 0.6);
        }
    }

    /// Passive return toward rest, once per rendered tick
    pub fn decay(&mut self) {
        let state = &mut self.state;
        state.eyebrow_raise *= self.config.brow_decay;
        state.mouth_openness = (state.mouth_openness * self.config.mouth_decay).max(MOUTH_REST);
        state.eye_openness = (state.eye_openness + self.config.eye_recovery).min(1.0);
    }

    /// Close the eyes and schedule reopening
    pub fn start_blink(&mut self, now: FrameTime) {
        self.state.eye_openness = 0.1;
        self.timers
            .schedule_after(ExpressionTimer::BlinkHalfOpen, now, self.config.blink_half_open);
        self.timers
            .schedule_after(ExpressionTimer::BlinkOpen, now, self.config.blink_open);
    }

    /// Blink if the periodic cycle is due, or with `spontaneous_chance`.
    /// Returns true if a blink started.
    pub fn maybe_blink<R: RandomSource + ?Sized>(
        &mut self,
        now: FrameTime,
        rng: &mut R,
        spontaneous_chance: f64,
    ) -> bool {
        let periodic = self.blink.poll(now, rng);
        let spontaneous = !periodic && spontaneous_chance > 0.0 && rng.chance(spontaneous_chance);

        if periodic || spontaneous {
            self.start_blink(now);
            true
        } else {
            false
        }
    }

    pub fn set_head(&mut self, head: HeadMotion) {
        self.state.head = head;
    }

    /// Back to neutral: flags cleared, every pending timer cancelled, blink
    /// cycle restarted
    pub fn reset(&mut self) {
        self.timers.clear();
        self.blink.reset();
        self.state = ExpressionState::neutral();
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new(ExpressionConfig::default())
    }
}
