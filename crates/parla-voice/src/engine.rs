//! Speech engine boundary
//!
//! Synthesis runs outside the animation core. An engine accepts an
//! utterance and returns the ordered event stream of its playback; the
//! animation core consumes that stream on its own task.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use parla_core::{ParlaError, ParlaResult, SpeechEvent};

use crate::{select_default_voice, Utterance, Voice};

/// Event stream of one utterance
pub type SpeechStream = mpsc::UnboundedReceiver<SpeechEvent>;

/// A speech synthesis engine
pub trait SpeechEngine {
    /// Start speaking `utterance`. Events arrive on the returned stream and
    /// end with `End` or `Error`.
    fn speak(&mut self, utterance: &Utterance) -> ParlaResult<SpeechStream>;

    /// Stop any in-flight playback. The stream of a cancelled utterance
    /// closes without a terminal event.
    fn cancel(&mut self);

    /// Voices this engine offers
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    /// Default voice for a language prefix
    fn default_voice(&self, language_prefix: &str) -> Option<Voice> {
        select_default_voice(&self.voices(), language_prefix).cloned()
    }
}

/// Scripted engine configuration
#[derive(Debug, Clone)]
pub struct ScriptedEngineConfig {
    /// Delay between `Start` and the first word
    pub lead_in: Duration,
    /// Time spent on each word at rate 1.0
    pub word_duration: Duration,
    /// Emit a syllable boundary halfway through each word
    pub syllables: bool,
    /// Fail after this many words instead of finishing
    pub fail_after_words: Option<usize>,
}

impl Default for ScriptedEngineConfig {
    fn default() -> Self {
        Self {
            lead_in: Duration::from_millis(50),
            word_duration: Duration::from_millis(250),
            syllables: false,
            fail_after_words: None,
        }
    }
}

/// Engine that "speaks" by pacing events on a tokio task: `Start`, one
/// word boundary per word, then `End`.
///
/// `speak` fails with a speech error outside a tokio runtime.
#[derive(Debug)]
pub struct ScriptedEngine {
    config: ScriptedEngineConfig,
    voices: Vec<Voice>,
    playback: Option<JoinHandle<()>>,
}

impl ScriptedEngine {
    pub fn new(config: ScriptedEngineConfig) -> Self {
        Self {
            config,
            voices: vec![Voice::new("Guion", "es-ES")],
            playback: None,
        }
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    pub fn config(&self) -> &ScriptedEngineConfig {
        &self.config
    }

    /// Is a playback task still running?
    pub fn is_speaking(&self) -> bool {
        self.playback
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new(ScriptedEngineConfig::default())
    }
}

impl SpeechEngine for ScriptedEngine {
    fn speak(&mut self, utterance: &Utterance) -> ParlaResult<SpeechStream> {
        if self.is_speaking() {
            return Err(ParlaError::SpeechBusy);
        }
        let runtime = Handle::try_current()
            .map_err(|e| ParlaError::Speech(format!("no tokio runtime: {e}")))?;

        let rate = f64::from(utterance.options.rate());
        let word_duration = self.config.word_duration.div_f64(rate);
        let lead_in = self.config.lead_in;
        let syllables = self.config.syllables;
        let fail_after = self.config.fail_after_words;
        let starts = utterance.word_starts();
        let id = utterance.id;

        let (tx, rx) = mpsc::unbounded_channel();

        self.playback = Some(runtime.spawn(async move {
            tracing::debug!(utterance = id.0, words = starts.len(), "scripted playback started");

            if tx.send(SpeechEvent::Start).is_err() {
                return;
            }
            tokio::time::sleep(lead_in).await;

            for (word, start) in starts.into_iter().enumerate() {
                if fail_after == Some(word) {
                    let _ = tx.send(SpeechEvent::Error("synthesis-failed".into()));
                    return;
                }
                if tx.send(SpeechEvent::word(start)).is_err() {
                    return; // Receiver dropped
                }

                if syllables {
                    tokio::time::sleep(word_duration / 2).await;
                    if tx.send(SpeechEvent::syllable(start + 1)).is_err() {
                        return;
                    }
                    tokio::time::sleep(word_duration - word_duration / 2).await;
                } else {
                    tokio::time::sleep(word_duration).await;
                }
            }

            let _ = tx.send(SpeechEvent::End);
        }));

        Ok(rx)
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.playback.take() {
            if !handle.is_finished() {
                tracing::debug!("scripted playback cancelled");
            }
            handle.abort();
        }
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoiceOptions;
    use parla_core::BoundaryKind;

    async fn collect(mut stream: SpeechStream) -> Vec<SpeechEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_playback_order() {
        let mut engine = ScriptedEngine::default();
        let utterance = Utterance::new("Hola mundo", VoiceOptions::default()).unwrap();

        let events = collect(engine.speak(&utterance).unwrap()).await;

        assert_eq!(
            events,
            vec![
                SpeechEvent::Start,
                SpeechEvent::word(0),
                SpeechEvent::word(5),
                SpeechEvent::End,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_syllables() {
        let mut engine = ScriptedEngine::new(ScriptedEngineConfig {
            syllables: true,
            ..Default::default()
        });
        let utterance = Utterance::new("Hola", VoiceOptions::default()).unwrap();

        let events = collect(engine.speak(&utterance).unwrap()).await;
        assert!(events.contains(&SpeechEvent::Boundary {
            kind: BoundaryKind::Syllable,
            char_index: 1,
        }));
        assert_eq!(events.last(), Some(&SpeechEvent::End));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_failure() {
        let mut engine = ScriptedEngine::new(ScriptedEngineConfig {
            fail_after_words: Some(1),
            ..Default::default()
        });
        let utterance = Utterance::new("uno dos tres", VoiceOptions::default()).unwrap();

        let events = collect(engine.speak(&utterance).unwrap()).await;
        assert_eq!(events.len(), 3);
        assert!(matches!(events.last(), Some(SpeechEvent::Error(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_then_cancel() {
        let mut engine = ScriptedEngine::default();
        let first = Utterance::new("uno dos tres", VoiceOptions::default()).unwrap();
        let second = Utterance::new("otra", VoiceOptions::default()).unwrap();

        let stream = engine.speak(&first).unwrap();
        assert!(engine.is_speaking());
        assert_eq!(engine.speak(&second).unwrap_err(), ParlaError::SpeechBusy);

        engine.cancel();
        let events = collect(stream).await;
        assert!(!events.iter().any(SpeechEvent::is_terminal));

        let events = collect(engine.speak(&second).unwrap()).await;
        assert_eq!(events.last(), Some(&SpeechEvent::End));
    }

    #[test]
    fn test_speak_outside_runtime() {
        let mut engine = ScriptedEngine::default();
        let utterance = Utterance::new("Hola", VoiceOptions::default()).unwrap();

        let result = engine.speak(&utterance);
        assert!(matches!(result, Err(ParlaError::Speech(_))));
        assert!(!engine.is_speaking());
    }

    #[test]
    fn test_default_voice() {
        let engine = ScriptedEngine::default().with_voices(vec![
            Voice::new("Daniel", "en-GB"),
            Voice::new("Jorge", "es-ES"),
        ]);
        assert_eq!(engine.default_voice("es").unwrap().name, "Jorge");
    }
}
