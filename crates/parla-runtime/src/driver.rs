//! Async frame driver
//!
//! Stands in for the host's frame callback: one task ticks frames at the
//! configured interval and feeds speech events to the session as they
//! arrive, until the utterance is over.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use parla_core::{ParlaResult, RandomSource, SpeechEvent};
use parla_time::{Clock, TokioClock};
use parla_visual::Surface;
use parla_voice::{SpeechEngine, Utterance, UtteranceId, VoiceOptions};

use crate::{AnimationSession, LoopMode, RuntimeConfig};

/// How an utterance ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceOutcome {
    Completed,
    Failed(String),
    /// Stream closed without `End` or `Error`
    Interrupted,
}

/// Summary of one performed utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceReport {
    pub id: UtteranceId,
    pub outcome: UtteranceOutcome,
    /// Boundary events received
    pub boundaries: usize,
    /// Frames rendered while the utterance ran
    pub frames: u64,
    /// Frame callbacks skipped by the throttle
    pub throttled: u64,
    /// From the first frame to the return to idle (or stop)
    pub elapsed: Duration,
}

/// Drives a session through one utterance
#[derive(Debug, Clone)]
pub struct FrameDriver<C: Clock = TokioClock> {
    clock: C,
    frame_interval: Duration,
}

impl FrameDriver<TokioClock> {
    pub fn new(frame_interval: Duration) -> Self {
        Self::with_clock(TokioClock::new(), frame_interval)
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.frame_interval)
    }
}

impl<C: Clock> FrameDriver<C> {
    pub fn with_clock(clock: C, frame_interval: Duration) -> Self {
        Self {
            clock,
            frame_interval,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Speak `text` and animate it. Any in-flight playback on `engine` is
    /// cancelled first. Returns once the session is back to idle or has
    /// stopped.
    pub async fn perform<S, R, E>(
        &self,
        session: &mut AnimationSession<S, R>,
        engine: &mut E,
        text: &str,
        options: VoiceOptions,
    ) -> ParlaResult<UtteranceReport>
    where
        S: Surface,
        R: RandomSource,
        E: SpeechEngine,
    {
        engine.cancel();

        let utterance = Utterance::new(text, options)?;
        let id = utterance.id;
        session.begin_utterance(utterance.clone())?;

        let mut events = match engine.speak(&utterance) {
            Ok(events) => events,
            Err(e) => {
                session.handle_speech_event(SpeechEvent::Error(e.to_string()), self.clock.now());
                return Err(e);
            }
        };

        let started = self.clock.now();
        let stats_before = session.stats();
        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut open = true;
        let mut boundaries = 0;
        let mut outcome = None;

        while session.loop_mode() == LoopMode::Speech {
            tokio::select! {
                event = events.recv(), if open => {
                    let now = self.clock.now();
                    match event {
                        Some(event) => {
                            match &event {
                                SpeechEvent::Boundary { .. } => boundaries += 1,
                                SpeechEvent::End => outcome = Some(UtteranceOutcome::Completed),
                                SpeechEvent::Error(message) => {
                                    outcome = Some(UtteranceOutcome::Failed(message.clone()))
                                }
                                SpeechEvent::Start => {}
                            }
                            session.handle_speech_event(event, now);
                        }
                        None => {
                            open = false;
                            if outcome.is_none() {
                                tracing::warn!(utterance = id.0, "speech stream closed early");
                                outcome = Some(UtteranceOutcome::Interrupted);
                                session.handle_speech_event(SpeechEvent::End, now);
                            }
                        }
                    }
                }
                _ = ticker.tick() => {
                    session.on_frame(self.clock.now());
                }
            }
        }

        let stats = session.stats();
        let report = UtteranceReport {
            id,
            outcome: outcome.unwrap_or(UtteranceOutcome::Interrupted),
            boundaries,
            frames: stats.rendered - stats_before.rendered,
            throttled: stats.throttled - stats_before.throttled,
            elapsed: self.clock.now() - started,
        };
        tracing::info!(
            utterance = id.0,
            outcome = ?report.outcome,
            frames = report.frames,
            "utterance performed"
        );
        Ok(report)
    }
}
