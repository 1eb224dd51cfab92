//! Text cue analysis
//!
//! The utterance text carries expression cues the face should show while
//! speaking: a question mark reads as surprise, an exclamation mark as
//! emphasis, and hedging words as thinking.

/// Hedging words that make the avatar look thoughtful
pub const DEFAULT_HESITATION_WORDS: [&str; 5] = ["hmm", "quizás", "tal vez", "pienso", "creo"];

/// Cues found in a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCues {
    pub question: bool,
    pub exclamation: bool,
    pub hesitation: bool,
}

impl TextCues {
    pub fn is_empty(&self) -> bool {
        !(self.question || self.exclamation || self.hesitation)
    }
}

/// Lexicon used for cue detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueLexicon {
    /// Lowercase hedging words, matched as substrings
    hesitation: Vec<String>,
}

impl Default for CueLexicon {
    fn default() -> Self {
        Self::new(DEFAULT_HESITATION_WORDS)
    }
}

impl CueLexicon {
    pub fn new<I, S>(hesitation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hesitation: hesitation
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }

    pub fn hesitation_words(&self) -> &[String] {
        &self.hesitation
    }

    /// Scan `text` for cues. Matching is case-insensitive; hedging words
    /// match anywhere, including inside longer words.
    pub fn analyze(&self, text: &str) -> TextCues {
        let lower = text.to_lowercase();
        TextCues {
            question: text.contains('?'),
            exclamation: text.contains('!'),
            hesitation: self.hesitation.iter().any(|word| lower.contains(word.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_and_exclamation() {
        let lexicon = CueLexicon::default();

        let cues = lexicon.analyze("¿Vienes?");
        assert!(cues.question);
        assert!(!cues.exclamation);

        let cues = lexicon.analyze("Genial!");
        assert!(cues.exclamation);
        assert!(!cues.question);
    }

    #[test]
    fn test_hesitation_is_case_insensitive() {
        let lexicon = CueLexicon::default();

        assert!(lexicon.analyze("Hmm, no sé").hesitation);
        assert!(lexicon.analyze("QUIZÁS mañana").hesitation);
        assert!(lexicon.analyze("Tal vez").hesitation);
        // Substring match
        assert!(lexicon.analyze("Creolina").hesitation);
        assert!(lexicon.analyze("Hola").is_empty());
    }

    #[test]
    fn test_custom_lexicon() {
        let lexicon = CueLexicon::new(["Maybe", ""]);
        assert_eq!(lexicon.hesitation_words(), ["maybe".to_string()]);
        assert!(lexicon.analyze("maybe later").hesitation);
        assert!(!lexicon.analyze("hmm").hesitation);
    }
}
