//! OpenRouter-compatible chat completions client.

use crate::prompt::build_messages;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use solace_core::config::LlmConfig;
use solace_core::{GenerationRequest, ResponseGenerator};

/// Fallback when the backend is unconfigured or unreachable on an ordinary
/// turn.
const OFFLINE_FALLBACK: &str = "I'm here with you. Right now I'm not connected to the \
language model, but from what I can tell, things feel heavy. Your feelings are valid. \
If you're in danger or thinking of hurting yourself, please reach out to someone you \
trust or local emergency services.";

/// Fallback for a crisis-flagged turn. Must acknowledge distress and point to
/// outside help; a crisis turn never fails silently.
const CRISIS_FALLBACK: &str = "I hear how much pain you're in right now, and I'm \
genuinely concerned about you. I can't reach my usual tools at the moment, but you \
don't have to carry this alone: please contact someone you trust, a local crisis \
helpline, or emergency services right away. You matter, and real people can help.";

pub struct OpenRouterGenerator {
    client: Client,
    config: LlmConfig,
}

impl OpenRouterGenerator {
    pub fn new(config: LlmConfig) -> Self {
        if config.api_key.is_none() {
            tracing::info!("No LLM API key configured; responses will use the offline fallback");
        }
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn fallback_message(is_crisis: bool) -> &'static str {
        if is_crisis {
            CRISIS_FALLBACK
        } else {
            OFFLINE_FALLBACK
        }
    }

    async fn complete(&self, request: &GenerationRequest<'_>, api_key: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": self.config.model,
                "messages": build_messages(request),
                "temperature": self.config.temperature,
                "max_tokens": self.config.max_tokens,
                "top_p": self.config.top_p,
            }))
            .send()
            .await
            .context("Failed to send request to chat completions API")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completions API error: {}", error_text);
        }

        let body: serde_json::Value = response.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .context("Failed to parse response content")?
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl ResponseGenerator for OpenRouterGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> String {
        let api_key = match &self.config.api_key {
            Some(key) => key.clone(),
            None => return Self::fallback_message(request.is_crisis).to_string(),
        };

        match self.complete(&request, &api_key).await {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => Self::fallback_message(request.is_crisis).to_string(),
            Err(e) => {
                tracing::warn!("Generation failed, using fallback message: {}", e);
                Self::fallback_message(request.is_crisis).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_core::mood::{MoodState, SupportMode};

    fn unconfigured() -> OpenRouterGenerator {
        OpenRouterGenerator::new(LlmConfig::default())
    }

    #[tokio::test]
    async fn test_no_key_yields_offline_fallback() {
        let generator = unconfigured();
        let mood = MoodState::default();
        let response = generator
            .generate(GenerationRequest {
                user_text: Some("hi"),
                mood: &mood,
                mode: SupportMode::Listening,
                is_crisis: false,
                history: &[],
            })
            .await;
        assert_eq!(response, OFFLINE_FALLBACK);
    }

    #[tokio::test]
    async fn test_crisis_fallback_points_to_outside_help() {
        let generator = unconfigured();
        let mood = MoodState {
            risk_score: 0.8,
            ..MoodState::default()
        };
        let response = generator
            .generate(GenerationRequest {
                user_text: Some("i can't do this anymore"),
                mood: &mood,
                mode: SupportMode::CrisisAware,
                is_crisis: true,
                history: &[],
            })
            .await;
        // The crisis fallback must acknowledge distress and name real help.
        assert!(response.contains("helpline") || response.contains("emergency"));
        assert!(response.contains("pain") || response.contains("concerned"));
    }

    #[test]
    fn test_fallback_selection() {
        assert_eq!(OpenRouterGenerator::fallback_message(true), CRISIS_FALLBACK);
        assert_eq!(OpenRouterGenerator::fallback_message(false), OFFLINE_FALLBACK);
    }
}
