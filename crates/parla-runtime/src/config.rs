//! Runtime configuration
//!
//! Loaded from JSON. Durations are human-readable strings (`"50ms"`,
//! `"1s 500ms"`); every field is optional and falls back to its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use parla_core::{ParlaError, ParlaResult, SeededRandom};
use parla_visual::{ExpressionConfig, OverlayTiming, PostProcessConfig};

use crate::{LogFormat, SchedulerConfig, SessionConfig};

/// Expression tuning preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionPreset {
    #[default]
    Standard,
    Subtle,
}

impl ExpressionPreset {
    pub fn config(self) -> ExpressionConfig {
        match self {
            ExpressionPreset::Standard => ExpressionConfig::default(),
            ExpressionPreset::Subtle => ExpressionConfig::subtle(),
        }
    }
}

/// Top-level runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Minimum interval between idle frames
    #[serde(with = "human_duration")]
    pub idle_interval: Duration,
    /// Minimum interval between speech frames
    #[serde(with = "human_duration")]
    pub speech_interval: Duration,
    /// Delay from speech end back to the idle loop
    #[serde(with = "human_duration")]
    pub end_linger: Duration,
    /// Host frame callback period used by the async driver
    #[serde(with = "human_duration")]
    pub frame_interval: Duration,
    /// Per-frame chance of a spontaneous blink while idle
    pub idle_blink_chance: f64,
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Lighting and shader passes
    pub post_processing: bool,
    pub expression: ExpressionPreset,
    /// Face box flashed after detection
    pub detection_overlay: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_millis(50),
            speech_interval: Duration::from_millis(33),
            end_linger: Duration::from_millis(500),
            frame_interval: Duration::from_millis(16),
            idle_blink_chance: 0.005,
            seed: None,
            log_filter: "info".to_string(),
            log_format: LogFormat::Text,
            post_processing: true,
            expression: ExpressionPreset::Standard,
            detection_overlay: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> ParlaResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ParlaError::InvalidConfig(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> ParlaResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ParlaError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "runtime config loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> ParlaResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ParlaError::InvalidConfig(format!("serialize error: {e}")))
    }

    pub fn validate(&self) -> ParlaResult<()> {
        for (name, interval) in [
            ("idle_interval", self.idle_interval),
            ("speech_interval", self.speech_interval),
            ("frame_interval", self.frame_interval),
        ] {
            if interval.is_zero() {
                return Err(ParlaError::InvalidConfig(format!("{name} must be non-zero")));
            }
        }
        if !(0.0..=1.0).contains(&self.idle_blink_chance) {
            return Err(ParlaError::InvalidConfig(format!(
                "idle_blink_chance {} outside [0, 1]",
                self.idle_blink_chance
            )));
        }
        Ok(())
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            idle_interval: self.idle_interval,
            speech_interval: self.speech_interval,
            end_linger: self.end_linger,
        }
    }

    pub fn post_process_config(&self) -> PostProcessConfig {
        if self.post_processing {
            PostProcessConfig::default()
        } else {
            PostProcessConfig::flat()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            scheduler: self.scheduler_config(),
            expression: self.expression.config(),
            post_process: self.post_process_config(),
            idle_blink_chance: self.idle_blink_chance,
            detection_overlay: self.detection_overlay.then(OverlayTiming::default),
        }
    }

    /// Random source honoring `seed`
    pub fn random(&self) -> SeededRandom {
        match self.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        }
    }
}

mod human_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = RuntimeConfig::from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.speech_interval, Duration::from_millis(33));
    }

    #[test]
    fn test_human_durations() {
        let config = RuntimeConfig::from_json(
            r#"{
                "idle_interval": "100ms",
                "end_linger": "1s 200ms",
                "seed": 7,
                "log_format": "json",
                "expression": "subtle"
            }"#,
        )
        .unwrap();

        assert_eq!(config.idle_interval, Duration::from_millis(100));
        assert_eq!(config.end_linger, Duration::from_millis(1200));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.expression, ExpressionPreset::Subtle);
        assert_eq!(config.scheduler_config().end_linger, Duration::from_millis(1200));
    }

    #[test]
    fn test_serialization_reloads() {
        let config = RuntimeConfig {
            frame_interval: Duration::from_millis(20),
            post_processing: false,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"20ms\""));
        assert_eq!(RuntimeConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            RuntimeConfig::from_json(r#"{"speech_interval": "0s"}"#),
            Err(ParlaError::InvalidConfig(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_json(r#"{"idle_blink_chance": 1.5}"#),
            Err(ParlaError::InvalidConfig(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_json(r#"{"idle_interval": "soon"}"#),
            Err(ParlaError::InvalidConfig(_))
        ));
        assert!(RuntimeConfig::load("/nonexistent/parla.json").is_err());
    }

    #[test]
    fn test_presets() {
        let flat = RuntimeConfig {
            post_processing: false,
            ..Default::default()
        };
        let session = flat.session_config();
        assert!(!session.post_process.lighting);
        assert!(!session.post_process.shader);
        assert_eq!(session.idle_blink_chance, 0.005);
        assert_eq!(session.detection_overlay, Some(OverlayTiming::default()));
        assert!(RuntimeConfig::default().post_process_config().shader);

        let quiet = RuntimeConfig::from_json(r#"{"detection_overlay": false}"#).unwrap();
        assert_eq!(quiet.session_config().detection_overlay, None);
    }
}
