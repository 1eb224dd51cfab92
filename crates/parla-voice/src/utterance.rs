//! Utterance - one speech request

use std::sync::atomic::{AtomicU64, Ordering};

use parla_core::{ParlaError, ParlaResult};

use crate::VoiceOptions;

/// Unique identifier for an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl UtteranceId {
    /// Next process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Text plus voice options
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    text: String,
    pub options: VoiceOptions,
}

impl Utterance {
    /// Create an utterance from user text. Blank text is rejected.
    pub fn new(text: impl Into<String>, options: VoiceOptions) -> ParlaResult<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParlaError::Speech("empty text".into()));
        }

        Ok(Self {
            id: UtteranceId::next(),
            text: trimmed.to_string(),
            options,
        })
    }

    /// Full utterance text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character index of the start of every word
    pub fn word_starts(&self) -> Vec<usize> {
        let mut starts = Vec::new();
        let mut in_word = false;
        for (i, c) in self.text.chars().enumerate() {
            if c.is_whitespace() {
                in_word = false;
            } else if !in_word {
                starts.push(i);
                in_word = true;
            }
        }
        starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_text() {
        assert!(Utterance::new("   ", VoiceOptions::default()).is_err());
    }

    #[test]
    fn test_trims_and_identifies() {
        let a = Utterance::new("  Hola  ", VoiceOptions::default()).unwrap();
        let b = Utterance::new("Hola", VoiceOptions::default()).unwrap();

        assert_eq!(a.text(), "Hola");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_word_starts() {
        let utterance = Utterance::new("Hola, ¿cómo  estás?", VoiceOptions::default()).unwrap();
        assert_eq!(utterance.word_starts(), vec![0, 6, 13]);
    }
}
