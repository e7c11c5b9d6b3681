//! Facial emotion analysis over a remote multimodal model.

use crate::gemini::GeminiClient;
use async_trait::async_trait;
use serde_json::Value;
use solace_core::config::VisionConfig;
use solace_core::mood::{normalize_probs, resolve_dominant, FaceEmotion};
use solace_core::FaceAnalyzer;
use std::collections::BTreeMap;

const FACE_PROMPT: &str = r#"Analyze this image for facial emotion detection.

Provide a JSON response with:
1. "emotions": an object with probabilities (0.0 to 1.0) for: happy, sad, anxious, angry, neutral, exhausted, surprised, fearful
2. "dominant_emotion": the most likely emotion (string)
3. "face_detected": boolean indicating if a face is visible
4. "multiple_faces": boolean indicating if multiple faces are detected
5. "confidence": a float (0.0 to 1.0) indicating your confidence in the analysis

Respond ONLY with valid JSON, no other text."#;

/// Remote face analyzer. Without an API key every call yields the neutral
/// fallback, so the pipeline works unconfigured.
pub struct GeminiFaceAnalyzer {
    client: Option<GeminiClient>,
}

impl GeminiFaceAnalyzer {
    pub fn new(config: &VisionConfig) -> Self {
        let client = GeminiClient::from_config(config);
        if client.is_none() {
            tracing::info!("No vision API key configured; face analysis will return neutral");
        }
        Self { client }
    }
}

#[async_trait]
impl FaceAnalyzer for GeminiFaceAnalyzer {
    async fn analyze(&self, image: &[u8]) -> FaceEmotion {
        let client = match &self.client {
            Some(c) => c,
            None => return FaceEmotion::neutral(),
        };

        match client.describe_media(FACE_PROMPT, "image/jpeg", image).await {
            Ok(report) => parse_face_report(&report),
            Err(e) => {
                tracing::warn!("Face analysis failed, falling back to neutral: {}", e);
                FaceEmotion::neutral()
            }
        }
    }
}

/// Turn the model's JSON report into a well-formed [`FaceEmotion`].
fn parse_face_report(report: &Value) -> FaceEmotion {
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

    FaceEmotion {
        emotion_probs,
        dominant_emotion,
        face_detected: report["face_detected"].as_bool().unwrap_or(false),
        multiple_faces: report["multiple_faces"].as_bool().unwrap_or(false),
        confidence: report["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0) as f32,
    }
}
