//! Voice emotion analysis over a remote multimodal model.

use crate::gemini::GeminiClient;
use async_trait::async_trait;
use serde_json::Value;
use solace_core::config::VisionConfig;
use solace_core::mood::{normalize_probs, resolve_dominant, Arousal, VoiceEmotion};
use solace_core::VoiceAnalyzer;
use std::collections::BTreeMap;

const VOICE_PROMPT: &str = r#"Analyze this audio clip for emotional tone and voice characteristics.

Provide a JSON response with:
1. "emotions": an object with probabilities (0.0 to 1.0) for: happy, sad, anxious, angry, neutral, exhausted, excited, calm
2. "dominant_emotion": the most likely emotion based on voice tone (string)
3. "arousal": one of "calm", "neutral", or "agitated" based on voice energy/speed
4. "confidence": a float (0.0 to 1.0) indicating your confidence in the analysis

Respond ONLY with valid JSON, no other text."#;

/// Remote voice analyzer with the same unconfigured-means-neutral behavior
/// as the face analyzer.
pub struct GeminiVoiceAnalyzer {
    client: Option<GeminiClient>,
}

impl GeminiVoiceAnalyzer {
    pub fn new(config: &VisionConfig) -> Self {
        let client = GeminiClient::from_config(config);
        if client.is_none() {
            tracing::info!("No vision API key configured; voice analysis will return neutral");
        }
        Self { client }
    }
}

#[async_trait]
impl VoiceAnalyzer for GeminiVoiceAnalyzer {
    async fn analyze(&self, audio: &[u8]) -> VoiceEmotion {
        let client = match &self.client {
            Some(c) => c,
            None => return VoiceEmotion::neutral(),
        };

        match client.describe_media(VOICE_PROMPT, "audio/wav", audio).await {
            Ok(report) => parse_voice_report(&report),
            Err(e) => {
                tracing::warn!("Voice analysis failed, falling back to neutral: {}", e);
                VoiceEmotion::neutral()
            }
        }
    }
}

fn parse_voice_report(report: &Value) -> VoiceEmotion {
    let raw_probs: BTreeMap<String, f32> = report["emotions"]
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_f64().map(|p| (k.clone(), p as f32)))
                .collect()
        })
        .unwrap_or_default();

    let emotion_probs = normalize_probs(raw_probs);
    let candidate = report["dominant_emotion"].as_str().unwrap_or("neutral");
    let dominant_emotion = resolve_dominant(&emotion_probs, candidate);

    let arousal = match report["arousal"].as_str() {
        Some("calm") => Arousal::Calm,
        Some("agitated") => Arousal::Agitated,
        // Unknown labels degrade to neutral rather than erroring.
        _ => Arousal::Neutral,
    };

    VoiceEmotion {
        emotion_probs,
        arousal,
        dominant_emotion,
        confidence: report["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0) as f32,
    }
}
