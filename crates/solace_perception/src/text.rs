//! Lexicon-based text emotion analysis.
//!
//! Deliberately simple keyword matching; swap in an ML model behind the same
//! trait when one is available. Crisis keywords are matched as substrings of
//! the lowercased input and reported in match order.

use async_trait::async_trait;
use solace_core::mood::{EnergyLevel, TextEmotion};
use solace_core::TextAnalyzer;

const CRISIS_KEYWORDS: &[&str] = &["suicide", "kill myself", "end it", "self-harm"];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "depressed", "anxious", "angry", "worried", "tired", "exhausted", "hopeless",
];

const POSITIVE_WORDS: &[&str] = &["happy", "excited", "grateful", "hopeful", "good"];

/// Score a piece of text for emotion, intensity, energy and crisis language.
pub fn analyze_text(text: &str) -> TextEmotion {
    let lowered = text.to_lowercase();

    let crisis_keywords: Vec<String> = CRISIS_KEYWORDS
        .iter()
        .filter(|w| lowered.contains(*w))
        .map(|w| w.to_string())
        .collect();

    let neg_score = NEGATIVE_WORDS.iter().filter(|w| lowered.contains(*w)).count();
    let pos_score = POSITIVE_WORDS.iter().filter(|w| lowered.contains(*w)).count();

    let (emotion, energy, intensity) = if neg_score > pos_score && neg_score > 0 {
        ("sad", EnergyLevel::Low, (0.2 * neg_score as f32).min(1.0))
    } else if pos_score > neg_score && pos_score > 0 {
        ("happy", EnergyLevel::Medium, (0.2 * pos_score as f32).min(1.0))
    } else {
        ("neutral", EnergyLevel::Medium, 0.2)
    };

    let confidence = (0.5 + 0.1 * (neg_score + pos_score) as f32).min(1.0);

    TextEmotion {
        emotion: emotion.to_string(),
        intensity,
        energy,
        crisis_keywords,
        confidence,
    }
}

/// Trait adapter for the local lexicon analyzer.
#[derive(Debug, Clone, Default)]
pub struct LexiconTextAnalyzer;

impl LexiconTextAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextAnalyzer for LexiconTextAnalyzer {
    async fn analyze(&self, text: &str) -> TextEmotion {
        analyze_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_text() {
        let result = analyze_text("the meeting is at three");
        assert_eq!(result.emotion, "neutral");
        assert_eq!(result.energy, EnergyLevel::Medium);
        assert!((result.intensity - 0.2).abs() < 1e-6);
        assert!((result.confidence - 0.5).abs() < 1e-6);
        assert!(result.crisis_keywords.is_empty());
    }

    #[test]
    fn test_negative_text_scores_sad() {
        let result = analyze_text("I feel so sad and hopeless and tired");
        assert_eq!(result.emotion, "sad");
        assert_eq!(result.energy, EnergyLevel::Low);
        // three negative hits
        assert!((result.intensity - 0.6).abs() < 1e-6);
        assert!((result.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_positive_text_scores_happy() {
        let result = analyze_text("feeling happy and grateful today");
        assert_eq!(result.emotion, "happy");
        assert_eq!(result.energy, EnergyLevel::Medium);
        assert!((result.intensity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_tie_is_neutral() {
        let result = analyze_text("I'm happy but also sad");
        assert_eq!(result.emotion, "neutral");
    }

    #[test]
    fn test_crisis_keywords_detected_case_insensitively() {
        let result = analyze_text("Sometimes I want to End It all");
        assert_eq!(result.crisis_keywords, vec!["end it".to_string()]);
    }

    #[test]
    fn test_multi_word_crisis_phrase() {
        let result = analyze_text("i might kill myself");
        assert!(result.crisis_keywords.contains(&"kill myself".to_string()));
    }

    #[test]
    fn test_intensity_capped_at_one() {
        let result = analyze_text(
            "sad depressed anxious angry worried tired exhausted hopeless",
        );
        assert!(result.intensity <= 1.0);
        assert!(result.confidence <= 1.0);
    }

    #[tokio::test]
    async fn test_trait_adapter_matches_free_function() {
        let analyzer = LexiconTextAnalyzer::new();
        let via_trait = analyzer.analyze("I feel sad").await;
        assert_eq!(via_trait, analyze_text("I feel sad"));
    }
}
