//! Parla Voice - The speech side of the avatar
//!
//! Speech synthesis itself is an external engine. This crate owns what the
//! animation core needs from it:
//! - Voice options and default voice selection
//! - Utterances (text + options, with identity for cancellation)
//! - Text cue analysis (questions, exclamations, hesitation)
//! - The speech engine boundary and a scripted engine for playback

pub mod params;
pub mod voices;
pub mod utterance;
pub mod cues;
pub mod engine;

pub use params::*;
pub use voices::*;
pub use utterance::*;
pub use cues::*;
pub use engine::*;
