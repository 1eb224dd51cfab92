//! Voice catalogue and default voice selection

/// A voice offered by the speech engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag
    pub language: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// Pick the default voice: the first whose language contains
/// `language_prefix`, else the first voice at all
pub fn select_default_voice<'a>(voices: &'a [Voice], language_prefix: &str) -> Option<&'a Voice> {
    voices
        .iter()
        .find(|voice| voice.language.contains(language_prefix))
        .or_else(|| voices.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_language() {
        let voices = vec![
            Voice::new("Daniel", "en-GB"),
            Voice::new("Paulina", "es-MX"),
            Voice::new("Jorge", "es-ES"),
        ];

        let voice = select_default_voice(&voices, "es").unwrap();
        assert_eq!(voice.name, "Paulina");
    }

    #[test]
    fn test_falls_back_to_first() {
        let voices = vec![Voice::new("Daniel", "en-GB"), Voice::new("Anna", "de-DE")];

        assert_eq!(select_default_voice(&voices, "es").unwrap().name, "Daniel");
        assert!(select_default_voice(&[], "es").is_none());
    }
}
