use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SolaceConfig {
    pub llm: LlmConfig,
    pub vision: VisionConfig,
    pub history: HistoryConfig,
    pub gateway: GatewayConfig,
}

impl SolaceConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: SolaceConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file doesn't exist, return defaults with
    /// env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OPENROUTER_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("OPENROUTER_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("GEMINI_API_KEY") {
            self.vision.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("GEMINI_MODEL") {
            self.vision.model = v;
        }
        if let Ok(v) = std::env::var("GATEWAY_HOST") {
            self.gateway.host = v;
        }
        if let Ok(v) = std::env::var("GATEWAY_PORT") {
            if let Ok(n) = v.parse() {
                self.gateway.port = n;
            }
        }
        if let Ok(v) = std::env::var("HISTORY_MAX_TURNS") {
            if let Ok(n) = v.parse() {
                self.history.max_turns = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Response-generation backend (OpenRouter-compatible chat completions).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "deepseek/deepseek-chat".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            max_tokens: 600,
            temperature: 0.85,
            top_p: 0.9,
        }
    }
}

/// Multimodal analysis backend for face and voice (Gemini-compatible).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Upper bound on turns replayed to the generator per request.
    pub max_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_turns: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8900,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
