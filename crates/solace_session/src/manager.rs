//! Streaming session manager.
//!
//! Owns the connection → session registry. Each session keeps the latest
//! result per modality and re-fuses the full snapshot on every event, so a
//! text-only event still benefits from an earlier face or voice reading
//! (last-value-wins per modality; stale results never expire — modalities are
//! independently refreshed channels, not a rolling window).

use crate::event::InboundEvent;
use serde::{Deserialize, Serialize};
use solace_core::mood::{FaceEmotion, MoodState, RiskFlags, SupportMode, TextEmotion, VoiceEmotion};
use solace_core::{
    fusion, mode, risk, FaceAnalyzer, GenerationRequest, ResponseGenerator, SessionError,
    TextAnalyzer, VoiceAnalyzer,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Per-connection mutable state. Only the most recent analysis per modality
/// survives; new results overwrite, never merge.
#[derive(Debug, Default)]
struct Session {
    last_text: Option<TextEmotion>,
    last_face: Option<FaceEmotion>,
    last_voice: Option<VoiceEmotion>,
}

/// Result of one processed streaming event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamOutcome {
    pub response_text: String,
    pub mood_state: MoodState,
    pub risk: RiskFlags,
    pub mode: SupportMode,
}

/// Maps live connections to sessions and serializes event processing per
/// session while letting distinct sessions run in parallel.
///
/// Locking discipline: the registry lock is only held for insert/lookup/
/// remove, never across an analyzer or generator await. The per-session
/// mutex is what guarantees in-order, non-overlapping processing within one
/// connection. An externally timed-out `handle_event` cancels at an await
/// point before the session's `last_*` field is written, so session state
/// stays consistent.
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
    text: Arc<dyn TextAnalyzer>,
    face: Arc<dyn FaceAnalyzer>,
    voice: Arc<dyn VoiceAnalyzer>,
    generator: Arc<dyn ResponseGenerator>,
}

impl SessionManager {
    pub fn new(
        text: Arc<dyn TextAnalyzer>,
        face: Arc<dyn FaceAnalyzer>,
        voice: Arc<dyn VoiceAnalyzer>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            text,
            face,
            voice,
            generator,
        }
    }

    /// Open a fresh session for a connection. Fails if the identity already
    /// has one.
    pub async fn connect(&self, connection_id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&connection_id) {
            return Err(SessionError::SessionExists(connection_id));
        }
        sessions.insert(connection_id, Arc::new(Mutex::new(Session::default())));
        tracing::debug!("Session opened for connection {}", connection_id);
        Ok(())
    }

    /// Discard a session. Idempotent: disconnecting an unknown or already
    /// closed connection is a no-op.
    pub async fn disconnect(&self, connection_id: Uuid) {
        if self.sessions.write().await.remove(&connection_id).is_some() {
            tracing::debug!("Session closed for connection {}", connection_id);
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every live session. Events arriving afterwards get
    /// `SessionNotFound`.
    pub async fn shutdown(&self) {
        let mut sessions = self.sessions.write().await;
        let drained = sessions.len();
        sessions.clear();
        if drained > 0 {
            tracing::info!("Drained {} session(s) on shutdown", drained);
        }
    }

    /// Process one inbound event: validate, analyze, update the matching
    /// modality slot, re-fuse the current snapshot and generate a response.
    pub async fn handle_event(
        &self,
        connection_id: Uuid,
        kind: &str,
        payload: &serde_json::Value,
    ) -> Result<StreamOutcome, SessionError> {
        // Validate before touching anything.
        let event = InboundEvent::parse(kind, payload)?;

        let session = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&connection_id)
                .cloned()
                .ok_or(SessionError::SessionNotFound(connection_id))?
        };

        // Serializes this connection's events; other sessions proceed freely.
        let mut session = session.lock().await;

        let user_text = match event {
            InboundEvent::Text(text) => {
                session.last_text = Some(self.text.analyze(&text).await);
                Some(text)
            }
            InboundEvent::Image(image) => {
                session.last_face = Some(self.face.analyze(&image).await);
                None
            }
            InboundEvent::Audio(audio) => {
                session.last_voice = Some(self.voice.analyze(&audio).await);
                None
            }
        };

        let mood_state = fusion::fuse(
            session.last_text.as_ref(),
            session.last_face.as_ref(),
            session.last_voice.as_ref(),
        );

        let crisis_keywords = session
            .last_text
            .as_ref()
            .map(|t| t.crisis_keywords.clone())
            .unwrap_or_default();
        let risk = risk::evaluate(&mood_state, &crisis_keywords);
        let mode = mode::select(risk.risk_score, &mood_state.dominant_mood);

        // Streaming sessions do not replay history to the generator.
        let response_text = self
            .generator
            .generate(GenerationRequest {
                user_text: user_text.as_deref(),
                mood: &mood_state,
                mode,
                is_crisis: risk.is_crisis,
                history: &[],
            })
            .await;

        Ok(StreamOutcome {
            response_text,
            mood_state,
            risk,
            mode,
        })
    }
}
