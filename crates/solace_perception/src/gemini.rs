//! Shared client for the Gemini-compatible multimodal endpoint.
//!
//! The face and voice analyzers both send an inline media part plus a prompt
//! demanding a strict-JSON report, then parse that JSON out of the reply.

use anyhow::{Context, Result};
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use solace_core::config::VisionConfig;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from config. Returns `None` when no API key is
    /// configured — callers fall back to neutral analysis.
    pub fn from_config(config: &VisionConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Send a prompt plus one inline media blob and parse the model's reply
    /// as JSON.
    pub async fn describe_media(
        &self,
        prompt: &str,
        mime_type: &str,
        data: &[u8],
    ) -> Result<Value> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key,
        );

        let encoded = base64::engine::general_purpose::STANDARD.encode(data);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{
                    "parts": [
                        {"text": prompt},
                        {"inline_data": {"mime_type": mime_type, "data": encoded}}
                    ]
                }]
            }))
            .send()
            .await
            .context("Failed to send request to multimodal endpoint")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Multimodal API error: {}", error_text);
        }

        let body: Value = response.json().await?;
        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .context("Failed to extract text from model response")?;

        let report: Value = serde_json::from_str(strip_code_fences(text))
            .context("Model reply was not valid JSON")?;
        Ok(report)
    }
}

/// Models sometimes wrap their JSON in markdown fences; peel them off.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
