//! Voice Options - prosody parameters handed to the speech engine

/// Default utterance language
pub const DEFAULT_LANGUAGE: &str = "es-ES";

/// Options for one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceOptions {
    /// Speaking rate multiplier [0.5 - 2.0]
    rate: f32,
    /// Pitch multiplier [0.5 - 2.0]
    pitch: f32,
    /// Volume [0.0 - 1.0]
    volume: f32,
    /// BCP 47 language tag
    pub language: String,
    /// Engine voice name; engine default when None
    pub voice: Option<String>,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            language: DEFAULT_LANGUAGE.to_string(),
            voice: None,
        }
    }
}

impl VoiceOptions {
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set speaking rate, clamped to [0.5, 2.0]
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp_or(rate, 0.5, 2.0, 1.0);
    }

    /// Set pitch, clamped to [0.5, 2.0]
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = clamp_or(pitch, 0.5, 2.0, 1.0);
    }

    /// Set volume, clamped to [0.0, 1.0]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_or(volume, 0.0, 1.0, 1.0);
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.set_rate(rate);
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.set_pitch(pitch);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    /// Use a voice; the language follows the voice
    pub fn with_voice(mut self, name: impl Into<String>, language: impl Into<String>) -> Self {
        self.voice = Some(name.into());
        self.language = language.into();
        self
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
