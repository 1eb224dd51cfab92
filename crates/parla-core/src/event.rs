//! Speech events consumed by the animation core
//!
//! The speech engine is an external collaborator. The core only needs the
//! ordered event stream of one utterance: start, boundaries, end or error.

/// Granularity of a boundary notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// Start of a word
    Word,
    /// Any finer boundary (syllable, sentence part)
    Syllable,
}

/// One event of an utterance's playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Playback started
    Start,
    /// Playback crossed a boundary at `char_index` of the utterance text
    Boundary { kind: BoundaryKind, char_index: usize },
    /// Playback finished
    End,
    /// Engine failure; no further events follow
    Error(String),
}

impl SpeechEvent {
    pub fn word(char_index: usize) -> Self {
        SpeechEvent::Boundary {
            kind: BoundaryKind::Word,
            char_index,
        }
    }

    pub fn syllable(char_index: usize) -> Self {
        SpeechEvent::Boundary {
            kind: BoundaryKind::Syllable,
            char_index,
        }
    }

    /// Does this event end the utterance?
    pub fn is_terminal(&self) -> bool {
        matches!(self, SpeechEvent::End | SpeechEvent::Error(_))
    }
}
