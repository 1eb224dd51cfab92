//! User-facing status messages

use std::fmt;

use parla_core::ParlaError;

/// Status line shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    LoadingImage,
    ImageLoadFailed,
    Detecting,
    FaceReady,
    NoFace,
    DetectorLoadFailed,
    DetectionFailed(String),
    Speaking,
    Finished,
    SpeechFailed,
}

impl StatusMessage {
    /// Status for a failure surfaced to the user
    pub fn from_error(error: &ParlaError) -> Self {
        match error {
            ParlaError::NoFaceFound => StatusMessage::NoFace,
            ParlaError::DetectorLoad(_) => StatusMessage::DetectorLoadFailed,
            ParlaError::DetectorFailed(message) => StatusMessage::DetectionFailed(message.clone()),
            ParlaError::Speech(_) | ParlaError::SpeechBusy => StatusMessage::SpeechFailed,
            ParlaError::InvalidImage(_) => StatusMessage::ImageLoadFailed,
            other => StatusMessage::DetectionFailed(other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusMessage::ImageLoadFailed
                | StatusMessage::NoFace
                | StatusMessage::DetectorLoadFailed
                | StatusMessage::DetectionFailed(_)
                | StatusMessage::SpeechFailed
        )
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::LoadingImage => write!(f, "Cargando imagen..."),
            StatusMessage::ImageLoadFailed => write!(f, "Error al cargar la imagen."),
            StatusMessage::Detecting => write!(f, "Detectando rostro..."),
            StatusMessage::FaceReady => {
                write!(f, "Rostro detectado correctamente. ¡Listo para animar!")
            }
            StatusMessage::NoFace => {
                write!(f, "No se detectó ningún rostro. Intenta con otra imagen.")
            }
            StatusMessage::DetectorLoadFailed => {
                write!(f, "Error al cargar los modelos de detección facial.")
            }
            StatusMessage::DetectionFailed(message) => {
                write!(f, "Error al detectar el rostro: {}", message)
            }
            StatusMessage::Speaking => write!(f, "Hablando..."),
            StatusMessage::Finished => write!(f, "Animación completada"),
            StatusMessage::SpeechFailed => write!(f, "Error en la síntesis de voz"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(StatusMessage::Detecting.to_string(), "Detectando rostro...");
        assert_eq!(StatusMessage::Speaking.to_string(), "Hablando...");
        assert_eq!(
            StatusMessage::DetectionFailed("timeout".into()).to_string(),
            "Error al detectar el rostro: timeout"
        );
    }

    #[test]
    fn test_from_error() {
        assert_eq!(StatusMessage::from_error(&ParlaError::NoFaceFound), StatusMessage::NoFace);
        assert_eq!(
            StatusMessage::from_error(&ParlaError::DetectorLoad("missing weights".into())),
            StatusMessage::DetectorLoadFailed
        );
        assert_eq!(
            StatusMessage::from_error(&ParlaError::Speech("synthesis-failed".into())),
            StatusMessage::SpeechFailed
        );
        assert!(StatusMessage::from_error(&ParlaError::NoFaceFound).is_error());
        assert!(!StatusMessage::FaceReady.is_error());
    }
}
