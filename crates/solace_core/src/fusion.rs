//! Weighted-vote fusion of up to three modality results into one
//! [`MoodState`].
//!
//! Pure function: no hidden state, safe to call concurrently. A new call
//! always produces a new value.

use crate::mood::{
    Arousal, EnergyLevel, FaceEmotion, ModalitySources, MoodState, Stability, TextEmotion,
    VoiceEmotion,
};
use crate::risk::{CRISIS_THRESHOLD, OVERWHELM_THRESHOLD};

/// Fixed per-modality vote weights.
pub const TEXT_WEIGHT: f32 = 0.5;
pub const FACE_WEIGHT: f32 = 0.3;
pub const VOICE_WEIGHT: f32 = 0.2;

/// Emotions whose presence in text contributes to the fused risk score.
const RISKY_TEXT_EMOTIONS: &[&str] = &["sad", "anxious", "angry"];

/// Per-unit-intensity risk contribution of a risky text emotion.
const TEXT_RISK_RATE: f32 = 0.2;

/// Combine available modality results into a single [`MoodState`].
///
/// Votes accumulate per emotion label: text adds `TEXT_WEIGHT`, face adds
/// `FACE_WEIGHT × confidence` (only when a face was actually detected), voice
/// adds `VOICE_WEIGHT × confidence`. Ties break toward the first-inserted
/// label in text → face → voice evaluation order, so results are
/// deterministic. With no modalities present the mood is neutral.
pub fn fuse(
    text: Option<&TextEmotion>,
    face: Option<&FaceEmotion>,
    voice: Option<&VoiceEmotion>,
) -> MoodState {
    // Insertion-ordered accumulator; iteration order is the tie break.
    let mut votes: Vec<(String, f32)> = Vec::new();
    let mut risk_score: f32 = 0.0;

    if let Some(text) = text {
        add_vote(&mut votes, &text.emotion, TEXT_WEIGHT);
        if RISKY_TEXT_EMOTIONS.contains(&text.emotion.as_str()) {
            risk_score += TEXT_RISK_RATE * text.intensity;
        }
    }

    if let Some(face) = face {
        // A face result with no face found contributes nothing.
        if face.face_detected {
            add_vote(&mut votes, &face.dominant_emotion, FACE_WEIGHT * face.confidence);
        }
    }

    if let Some(voice) = voice {
        add_vote(&mut votes, &voice.dominant_emotion, VOICE_WEIGHT * voice.confidence);
    }

    let dominant_mood = votes
        .iter()
        .fold(None::<&(String, f32)>, |best, entry| match best {
            // Strict comparison keeps the earlier entry on ties.
            Some(b) if entry.1 > b.1 => Some(entry),
            Some(b) => Some(b),
            None => Some(entry),
        })
        .map(|(label, _)| label.clone())
        .unwrap_or_else(|| "neutral".to_string());

    // Energy: text sets the baseline, non-neutral voice arousal overrides.
    let mut energy_level = EnergyLevel::Medium;
    if let Some(text) = text {
        energy_level = text.energy;
    }
    match voice.map(|v| v.arousal) {
        Some(Arousal::Agitated) => energy_level = EnergyLevel::High,
        Some(Arousal::Calm) => energy_level = EnergyLevel::Low,
        _ => {}
    }

    let risk_score = risk_score.min(1.0);

    let stability = if risk_score >= CRISIS_THRESHOLD {
        Stability::Fragile
    } else if risk_score >= OVERWHELM_THRESHOLD {
        Stability::Overwhelmed
    } else {
        Stability::Stable
    };

    MoodState {
        dominant_mood,
        energy_level,
        stability,
        risk_score,
        sources: ModalitySources {
            text: text.cloned(),
            face: face.cloned(),
            voice: voice.cloned(),
        },
    }
}

fn add_vote(votes: &mut Vec<(String, f32)>, label: &str, weight: f32) {
    if let Some(entry) = votes.iter_mut().find(|(l, _)| l == label) {
        entry.1 += weight;
    } else {
        votes.push((label.to_string(), weight));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::Arousal;
    use std::collections::BTreeMap;

    fn text(emotion: &str, intensity: f32, energy: EnergyLevel) -> TextEmotion {
        TextEmotion {
            emotion: emotion.to_string(),
            intensity,
            energy,
            crisis_keywords: Vec::new(),
            confidence: 0.8,
        }
    }

    fn face(emotion: &str, detected: bool, confidence: f32) -> FaceEmotion {
        FaceEmotion {
            emotion_probs: BTreeMap::from([(emotion.to_string(), 1.0)]),
            dominant_emotion: emotion.to_string(),
            face_detected: detected,
            multiple_faces: false,
            confidence,
        }
    }

    fn voice(emotion: &str, arousal: Arousal, confidence: f32) -> VoiceEmotion {
        VoiceEmotion {
            emotion_probs: BTreeMap::from([(emotion.to_string(), 1.0)]),
            arousal,
            dominant_emotion: emotion.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_fuse_nothing_is_neutral() {
        let mood = fuse(None, None, None);
        assert_eq!(mood.dominant_mood, "neutral");
        assert_eq!(mood.risk_score, 0.0);
        assert_eq!(mood.stability, Stability::Stable);
        assert_eq!(mood.energy_level, EnergyLevel::Medium);
        assert!(mood.sources.text.is_none());
    }

    #[test]
    fn test_sad_text_full_intensity_risk() {
        let t = text("sad", 1.0, EnergyLevel::Low);
        let mood = fuse(Some(&t), None, None);
        assert_eq!(mood.dominant_mood, "sad");
        assert!((mood.risk_score - 0.2).abs() < 1e-6);
        // 0.2 is below the overwhelm threshold.
        assert_eq!(mood.stability, Stability::Stable);
    }

    #[test]
    fn test_happy_text_contributes_no_risk() {
        let t = text("happy", 1.0, EnergyLevel::Medium);
        let mood = fuse(Some(&t), None, None);
        assert_eq!(mood.risk_score, 0.0);
    }

    #[test]
    fn test_undetected_face_contributes_nothing() {
        let f = face("angry", false, 0.99);
        let v = voice("happy", Arousal::Neutral, 0.5);
        let mood = fuse(None, Some(&f), Some(&v));
        // Voice is the only vote; angry never enters the accumulator.
        assert_eq!(mood.dominant_mood, "happy");
    }

    #[test]
    fn test_detected_face_outvotes_voice() {
        // face: 0.3 * 0.9 = 0.27, voice: 0.2 * 0.9 = 0.18
        let f = face("sad", true, 0.9);
        let v = voice("happy", Arousal::Neutral, 0.9);
        let mood = fuse(None, Some(&f), Some(&v));
        assert_eq!(mood.dominant_mood, "sad");
    }

    #[test]
    fn test_tie_breaks_toward_earlier_modality() {
        // text vote 0.5 for "anxious", face 0.3*1.0 + voice 0.2*1.0 = 0.5 for "happy".
        // Equal scores: text was inserted first and must win.
        let t = text("anxious", 0.0, EnergyLevel::Medium);
        let f = face("happy", true, 1.0);
        let v = voice("happy", Arousal::Neutral, 1.0);
        let mood = fuse(Some(&t), Some(&f), Some(&v));
        assert_eq!(mood.dominant_mood, "anxious");
    }

    #[test]
    fn test_same_label_votes_accumulate() {
        let t = text("sad", 0.0, EnergyLevel::Medium);
        let f = face("sad", true, 1.0);
        let v = voice("happy", Arousal::Neutral, 1.0);
        let mood = fuse(Some(&t), Some(&f), Some(&v));
        // sad: 0.5 + 0.3 = 0.8 beats happy: 0.2
        assert_eq!(mood.dominant_mood, "sad");
    }

    #[test]
    fn test_text_energy_carries_through() {
        let t = text("sad", 0.5, EnergyLevel::Low);
        let mood = fuse(Some(&t), None, None);
        assert_eq!(mood.energy_level, EnergyLevel::Low);
    }

    #[test]
    fn test_agitated_voice_overrides_text_energy() {
        let t = text("happy", 0.5, EnergyLevel::Low);
        let v = voice("happy", Arousal::Agitated, 0.5);
        let mood = fuse(Some(&t), None, Some(&v));
        assert_eq!(mood.energy_level, EnergyLevel::High);
    }

    #[test]
    fn test_calm_voice_overrides_text_energy() {
        let t = text("happy", 0.5, EnergyLevel::High);
        let v = voice("happy", Arousal::Calm, 0.5);
        let mood = fuse(Some(&t), None, Some(&v));
        assert_eq!(mood.energy_level, EnergyLevel::Low);
    }

    #[test]
    fn test_neutral_voice_arousal_defers_to_text() {
        let t = text("happy", 0.5, EnergyLevel::High);
        let v = voice("happy", Arousal::Neutral, 0.5);
        let mood = fuse(Some(&t), None, Some(&v));
        assert_eq!(mood.energy_level, EnergyLevel::High);
    }

    #[test]
    fn test_stability_thresholds() {
        // Single sad text caps the fused pre-score at 0.2, so drive the
        // thresholds directly through the shared constants.
        assert!(OVERWHELM_THRESHOLD < CRISIS_THRESHOLD);

        let t = text("sad", 1.0, EnergyLevel::Low);
        let mood = fuse(Some(&t), None, None);
        assert!(mood.risk_score < OVERWHELM_THRESHOLD);
        assert_eq!(mood.stability, Stability::Stable);
    }

    #[test]
    fn test_sources_retained_for_audit() {
        let t = text("sad", 0.4, EnergyLevel::Low);
        let f = face("sad", true, 0.7);
        let mood = fuse(Some(&t), Some(&f), None);
        assert_eq!(mood.sources.text.as_ref().unwrap().emotion, "sad");
        assert!(mood.sources.face.as_ref().unwrap().face_detected);
        assert!(mood.sources.voice.is_none());
    }

    #[test]
    fn test_risk_score_capped_at_one() {
        let t = text("sad", 1.0, EnergyLevel::Low);
        let mood = fuse(Some(&t), None, None);
        assert!(mood.risk_score <= 1.0);
    }
}
