//! Turn-oriented pipeline (request/response variant).
//!
//! Same fusion → risk → mode chain as the streaming manager, but each call is
//! self-contained: modality inputs arrive together, bounded history is
//! fetched from the conversation log and replayed to the generator, and the
//! finished exchange is offered back for persistence.

use serde::{Deserialize, Serialize};
use solace_core::history::PrivilegedExchange;
use solace_core::mood::{ConversationTurn, MoodState, RiskFlags, SupportMode};
use solace_core::{
    fusion, mode, risk, ConversationLog, FaceAnalyzer, GenerationRequest, ResponseGenerator,
    TextAnalyzer, VoiceAnalyzer,
};
use std::sync::Arc;

/// One turn's worth of raw inputs.
#[derive(Debug, Clone)]
pub struct TurnRequest<'a> {
    pub text: Option<&'a str>,
    pub image: Option<&'a [u8]>,
    pub audio: Option<&'a [u8]>,
    pub conversation_id: &'a str,
    /// Privilege is determined by the caller; this core only routes the
    /// logging accordingly.
    pub is_privileged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub response_text: String,
    pub mood_state: MoodState,
    pub risk: RiskFlags,
    pub mode: SupportMode,
    pub has_text: bool,
    pub has_face: bool,
    pub has_voice: bool,
}

pub struct TurnPipeline {
    text: Arc<dyn TextAnalyzer>,
    face: Arc<dyn FaceAnalyzer>,
    voice: Arc<dyn VoiceAnalyzer>,
    generator: Arc<dyn ResponseGenerator>,
    log: Arc<dyn ConversationLog>,
    max_history: usize,
}

impl TurnPipeline {
    pub fn new(
        text: Arc<dyn TextAnalyzer>,
        face: Arc<dyn FaceAnalyzer>,
        voice: Arc<dyn VoiceAnalyzer>,
        generator: Arc<dyn ResponseGenerator>,
        log: Arc<dyn ConversationLog>,
        max_history: usize,
    ) -> Self {
        Self {
            text,
            face,
            voice,
            generator,
            log,
            max_history,
        }
    }

    /// Run one full turn: analyze whatever modalities are present, fuse,
    /// classify, generate, then log the exchange.
    pub async fn run(&self, request: TurnRequest<'_>) -> TurnOutcome {
        let trimmed = request.text.map(str::trim).filter(|t| !t.is_empty());

        let text_result = match trimmed {
            Some(text) => Some(self.text.analyze(text).await),
            None => None,
        };
        let face_result = match request.image {
            Some(image) => Some(self.face.analyze(image).await),
            None => None,
        };
        let voice_result = match request.audio {
            Some(audio) => Some(self.voice.analyze(audio).await),
            None => None,
        };

        let mood_state = fusion::fuse(
            text_result.as_ref(),
            face_result.as_ref(),
            voice_result.as_ref(),
        );

        let crisis_keywords = text_result
            .as_ref()
            .map(|t| t.crisis_keywords.clone())
            .unwrap_or_default();
        let risk = risk::evaluate(&mood_state, &crisis_keywords);
        let mode = mode::select(risk.risk_score, &mood_state.dominant_mood);

        // History failures degrade to an empty window; the turn still runs.
        let history = match self
            .log
            .history(request.conversation_id, self.max_history)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("Failed to fetch conversation history: {}", e);
                Vec::new()
            }
        };

        let response_text = self
            .generator
            .generate(GenerationRequest {
                user_text: trimmed,
                mood: &mood_state,
                mode,
                is_crisis: risk.is_crisis,
                history: &history,
            })
            .await;

        self.record_exchange(&request, trimmed, &response_text, &mood_state, mode)
            .await;

        TurnOutcome {
            response_text,
            mood_state,
            risk,
            mode,
            has_text: trimmed.is_some(),
            has_face: face_result.is_some(),
            has_voice: voice_result.is_some(),
        }
    }

    /// Non-privileged callers get exactly two turns (user, then assistant);
    /// privileged callers get a single paired record outside the transcript.
    async fn record_exchange(
        &self,
        request: &TurnRequest<'_>,
        user_text: Option<&str>,
        response_text: &str,
        mood_state: &MoodState,
        mode: SupportMode,
    ) {
        let user_content = user_text.unwrap_or_default();

        if request.is_privileged {
            if let Err(e) = self
                .log
                .record_privileged(PrivilegedExchange::new(user_content, response_text))
                .await
            {
                tracing::warn!("Failed to record privileged exchange: {}", e);
            }
            return;
        }

        let user_turn =
            ConversationTurn::user(user_content, Some(mood_state.clone()), Some(mode));
        let assistant_turn =
            ConversationTurn::assistant(response_text, Some(mood_state.clone()), Some(mode));

        if let Err(e) = self.log.record(request.conversation_id, user_turn).await {
            tracing::warn!("Failed to record user turn: {}", e);
        }
        if let Err(e) = self
            .log
            .record(request.conversation_id, assistant_turn)
            .await
        {
            tracing::warn!("Failed to record assistant turn: {}", e);
        }
    }
}
