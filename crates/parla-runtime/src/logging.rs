//! Logging setup
//!
//! Library code only emits `tracing` events. Hosts that want them printed
//! call `init_logging` once; `RUST_LOG` overrides the configured filter.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use parla_core::{ParlaError, ParlaResult};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Install a global fmt subscriber.
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init_logging(format: LogFormat, filter: &str) -> ParlaResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter)
            .map_err(|e| ParlaError::InvalidConfig(format!("log filter {filter:?}: {e}")))?,
    };

    let installed = match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!(?format, "logging initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let first = init_logging(LogFormat::Text, "parla=debug").unwrap();
        let second = init_logging(LogFormat::Json, "parla=debug").unwrap();

        // Another test may have installed a subscriber first
        assert!(!(first && second));
        assert!(!second);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
        assert_eq!(
            serde_json::from_str::<LogFormat>("\"text\"").unwrap(),
            LogFormat::Text
        );
    }
}
