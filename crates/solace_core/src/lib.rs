//! Core of the mood support pipeline: data model, fusion engine, risk
//! evaluator, mode selector, and the capability traits the pipeline is wired
//! through. Everything here is pure or in-memory; network-bound analyzers and
//! generators live behind the traits.

pub mod config;
pub mod error;
pub mod fusion;
pub mod history;
pub mod mode;
pub mod mood;
pub mod risk;

pub use config::SolaceConfig;
pub use error::SessionError;
pub use history::{ConversationLog, InMemoryLog, PrivilegedExchange};
pub use mood::{
    Arousal, ConversationTurn, EnergyLevel, FaceEmotion, ModalitySources, MoodState, RiskFlags,
    Role, Stability, SupportMode, TextEmotion, VoiceEmotion,
};

use async_trait::async_trait;

/// Everything the generator needs to produce one response.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    /// What the user typed, if the triggering input was textual.
    pub user_text: Option<&'a str>,
    pub mood: &'a MoodState,
    pub mode: SupportMode,
    pub is_crisis: bool,
    /// Bounded prior turns, oldest first. Empty for streaming events.
    pub history: &'a [ConversationTurn],
}

/// Text modality analyzer. Must never fail: on any internal problem it
/// returns [`TextEmotion::neutral`] so the pipeline always has a usable
/// result.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> TextEmotion;
}

/// Face modality analyzer over raw image bytes. Same no-fail contract.
#[async_trait]
pub trait FaceAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> FaceEmotion;
}

/// Voice modality analyzer over raw audio bytes. Same no-fail contract.
#[async_trait]
pub trait VoiceAnalyzer: Send + Sync {
    async fn analyze(&self, audio: &[u8]) -> VoiceEmotion;
}

/// Response generation boundary. Implementations handle their own outages:
/// when the backend is unavailable they return a safety-oriented default
/// message rather than an error, and a crisis-flagged request always gets
/// text that acknowledges distress and points to outside help.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> String;
}
