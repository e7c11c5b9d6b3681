//! Core data model for the mood pipeline.
//!
//! Every modality produces one of the `*Emotion` result types below; the
//! fusion engine folds them into an immutable [`MoodState`]. Probability maps
//! use `BTreeMap` so serialized output is deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Guard against NaN/Inf and out-of-range values sneaking in through
/// deserialization. Non-finite values collapse to 0.0.
pub fn deserialize_unit_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f32::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value.clamp(0.0, 1.0))
    } else {
        Ok(0.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arousal {
    Calm,
    #[default]
    Neutral,
    Agitated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    #[default]
    Stable,
    Overwhelmed,
    Fragile,
}

/// Response strategy chosen for a turn. Selected by an ordered decision list
/// in [`crate::mode::select`]; `CrisisAware` always takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportMode {
    Listening,
    Calming,
    Motivation,
    Stability,
    CrisisAware,
}

impl SupportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportMode::Listening => "listening",
            SupportMode::Calming => "calming",
            SupportMode::Motivation => "motivation",
            SupportMode::Stability => "stability",
            SupportMode::CrisisAware => "crisis_aware",
        }
    }
}

// ============================================================================
// Per-modality results
// ============================================================================

/// Result of text emotion analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEmotion {
    pub emotion: String,
    #[serde(deserialize_with = "deserialize_unit_f32")]
    pub intensity: f32,
    pub energy: EnergyLevel,
    #[serde(default)]
    pub crisis_keywords: Vec<String>,
    #[serde(deserialize_with = "deserialize_unit_f32")]
    pub confidence: f32,
}

impl TextEmotion {
    /// The documented neutral fallback: analyzers return this instead of
    /// erroring when they cannot produce a real result.
    pub fn neutral() -> Self {
        Self {
            emotion: "neutral".to_string(),
            intensity: 0.0,
            energy: EnergyLevel::Medium,
            crisis_keywords: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// Result of facial emotion analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceEmotion {
    #[serde(default)]
    pub emotion_probs: BTreeMap<String, f32>,
    pub dominant_emotion: String,
    pub face_detected: bool,
    pub multiple_faces: bool,
    #[serde(deserialize_with = "deserialize_unit_f32")]
    pub confidence: f32,
}

impl FaceEmotion {
    pub fn neutral() -> Self {
        Self {
            emotion_probs: BTreeMap::from([("neutral".to_string(), 1.0)]),
            dominant_emotion: "neutral".to_string(),
            face_detected: false,
            multiple_faces: false,
            confidence: 0.0,
        }
    }
}

/// Result of voice emotion analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceEmotion {
    #[serde(default)]
    pub emotion_probs: BTreeMap<String, f32>,
    pub arousal: Arousal,
    pub dominant_emotion: String,
    #[serde(deserialize_with = "deserialize_unit_f32")]
    pub confidence: f32,
}

impl VoiceEmotion {
    pub fn neutral() -> Self {
        Self {
            emotion_probs: BTreeMap::from([("neutral".to_string(), 1.0)]),
            arousal: Arousal::Neutral,
            dominant_emotion: "neutral".to_string(),
            confidence: 0.0,
        }
    }
}

// ============================================================================
// Probability helpers
// ============================================================================

/// Normalize an emotion probability map so values sum to 1.0.
///
/// Negative and non-finite entries are discarded. A map that is empty (or
/// degenerate) after filtering means "no analysis" and collapses to
/// `{neutral: 1.0}`.
pub fn normalize_probs(probs: BTreeMap<String, f32>) -> BTreeMap<String, f32> {
    let filtered: BTreeMap<String, f32> = probs
        .into_iter()
        .filter(|(_, v)| v.is_finite() && *v > 0.0)
        .collect();

    let total: f32 = filtered.values().sum();
    if total <= f32::EPSILON {
        return BTreeMap::from([("neutral".to_string(), 1.0)]);
    }

    filtered.into_iter().map(|(k, v)| (k, v / total)).collect()
}

/// Resolve a dominant emotion label against its probability map.
///
/// If the candidate is not a key of the map, fall back to the highest-scoring
/// label so the "dominant is a key" invariant holds.
pub fn resolve_dominant(probs: &BTreeMap<String, f32>, candidate: &str) -> String {
    if probs.contains_key(candidate) {
        return candidate.to_string();
    }
    probs
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(label, _)| label.clone())
        .unwrap_or_else(|| "neutral".to_string())
}

// ============================================================================
// Fused state
// ============================================================================

/// The modality results that contributed to a fusion, retained for audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalitySources {
    pub text: Option<TextEmotion>,
    pub face: Option<FaceEmotion>,
    pub voice: Option<VoiceEmotion>,
}

/// One fused mood estimate. Created fresh per fusion call and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodState {
    pub dominant_mood: String,
    pub energy_level: EnergyLevel,
    pub stability: Stability,
    #[serde(deserialize_with = "deserialize_unit_f32")]
    pub risk_score: f32,
    #[serde(default)]
    pub sources: ModalitySources,
}

impl Default for MoodState {
    fn default() -> Self {
        Self {
            dominant_mood: "neutral".to_string(),
            energy_level: EnergyLevel::Medium,
            stability: Stability::Stable,
            risk_score: 0.0,
            sources: ModalitySources::default(),
        }
    }
}

/// Crisis/risk classification derived from a [`MoodState`] plus explicit
/// lexical crisis signals. Pure data; see [`crate::risk::evaluate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFlags {
    pub crisis_keywords: Vec<String>,
    #[serde(deserialize_with = "deserialize_unit_f32")]
    pub risk_score: f32,
    pub is_crisis: bool,
}

// ============================================================================
// Conversation turns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One logged turn of a conversation, handed to the history collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub mood_state: Option<MoodState>,
    #[serde(default)]
    pub mode: Option<SupportMode>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: &str, mood_state: Option<MoodState>, mode: Option<SupportMode>) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            mood_state,
            mode,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(
        content: &str,
        mood_state: Option<MoodState>,
        mode: Option<SupportMode>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            mood_state,
            mode,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
