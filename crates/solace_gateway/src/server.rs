//! HTTP + WebSocket gateway.
//!
//! - `GET /health` — liveness and active session count
//! - `GET /ws` — streaming variant: one session per connection
//! - `POST /mood/text` — turn variant, text only
//! - `POST /mood/multimodal` — turn variant, any subset of modalities

use crate::types::{ErrorReply, MultimodalMoodRequest, StreamEvent, TextMoodRequest};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use solace_core::SessionError;
use solace_session::{SessionManager, StreamOutcome, TurnOutcome, TurnPipeline, TurnRequest};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

#[derive(Clone)]
struct AppState {
    manager: Arc<SessionManager>,
    pipeline: Arc<TurnPipeline>,
}

/// The gateway server. Construction wires in an already-built session
/// manager and turn pipeline; `start` binds and serves in a background task.
pub struct GatewayServer {
    state: AppState,
    host: String,
    port: u16,
}

impl GatewayServer {
    pub fn new(
        manager: Arc<SessionManager>,
        pipeline: Arc<TurnPipeline>,
        host: &str,
        port: u16,
    ) -> Self {
        Self {
            state: AppState { manager, pipeline },
            host: host.to_string(),
            port,
        }
    }

    /// Build the router (separated out so tests can drive it directly).
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/ws", get(ws_upgrade))
            .route("/mood/text", post(mood_text))
            .route("/mood/multimodal", post(mood_multimodal))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the server. Spawns a background task and returns its handle.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.host, self.port);

        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("Gateway failed to bind {}: {}", addr, e);
                    return;
                }
            };
            tracing::info!("Gateway listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Gateway server error: {}", e);
            }
        })
    }
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "active_sessions": state.manager.session_count().await,
    }))
}

async fn mood_text(
    State(state): State<AppState>,
    Json(request): Json<TextMoodRequest>,
) -> Json<TurnOutcome> {
    let conversation_id = request.conversation_id.as_deref().unwrap_or("default");
    let outcome = state
        .pipeline
        .run(TurnRequest {
            text: Some(&request.text),
            image: None,
            audio: None,
            conversation_id,
            is_privileged: request.privileged,
        })
        .await;
    Json(outcome)
}

async fn mood_multimodal(
    State(state): State<AppState>,
    Json(request): Json<MultimodalMoodRequest>,
) -> Result<Json<TurnOutcome>, (StatusCode, Json<ErrorReply>)> {
    let image = decode_media(request.image_base64.as_deref(), "image")?;
    let audio = decode_media(request.audio_base64.as_deref(), "audio")?;

    let conversation_id = request.conversation_id.as_deref().unwrap_or("default");
    let outcome = state
        .pipeline
        .run(TurnRequest {
            text: request.text.as_deref(),
            image: image.as_deref(),
            audio: audio.as_deref(),
            conversation_id,
            is_privileged: request.privileged,
        })
        .await;
    Ok(Json(outcome))
}

fn decode_media(
    encoded: Option<&str>,
    kind: &str,
) -> Result<Option<Vec<u8>>, (StatusCode, Json<ErrorReply>)> {
    match encoded {
        None => Ok(None),
        Some(data) => base64::engine::general_purpose::STANDARD
            .decode(data)
            .map(Some)
            .map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorReply::new(format!("{} is not valid base64", kind))),
                )
            }),
    }
}

/// GET /ws — WebSocket upgrade.
async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// One WebSocket connection: open a session, process events in arrival
/// order, tear the session down on close.
async fn handle_ws(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    if let Err(e) = state.manager.connect(connection_id).await {
        tracing::error!("Failed to open session: {}", e);
        return;
    }

    let (mut ws_tx, mut ws_rx) = socket.split();

    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => {
                let event: StreamEvent = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        let reply = ErrorReply::new(format!("Invalid JSON: {}", e));
                        let json = serde_json::to_string(&reply).unwrap_or_default();
                        if ws_tx.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                let result = state
                    .manager
                    .handle_event(connection_id, &event.kind, &event.payload)
                    .await;
                let (reply, close) = event_reply(result);

                if close {
                    // Session gone (e.g. shutdown raced the event); tell the
                    // client why before ending the connection.
                    tracing::debug!("Closing connection {}: session no longer active", connection_id);
                    let _ = ws_tx.send(Message::Text(reply)).await;
                    break;
                }
                if ws_tx.send(Message::Text(reply)).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.manager.disconnect(connection_id).await;
}

/// Turn an event result into the JSON reply to send, plus whether the
/// connection must close afterwards. Invalid events keep the stream open; a
/// missing session ends it, but the client still gets told why.
fn event_reply(result: Result<StreamOutcome, SessionError>) -> (String, bool) {
    match result {
        Ok(outcome) => (serde_json::to_string(&outcome).unwrap_or_default(), false),
        Err(e @ SessionError::InvalidEventFormat(_)) => (
            serde_json::to_string(&ErrorReply::new(e.to_string())).unwrap_or_default(),
            false,
        ),
        Err(e) => (
            serde_json::to_string(&ErrorReply::new(e.to_string())).unwrap_or_default(),
            true,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solace_core::history::InMemoryLog;
    use solace_core::mood::{FaceEmotion, TextEmotion, VoiceEmotion};
    use solace_core::{
        FaceAnalyzer, GenerationRequest, ResponseGenerator, TextAnalyzer, VoiceAnalyzer,
    };

    struct NeutralText;

    #[async_trait]
    impl TextAnalyzer for NeutralText {
        async fn analyze(&self, _text: &str) -> TextEmotion {
            TextEmotion::neutral()
        }
    }

    struct NeutralFace;

    #[async_trait]
    impl FaceAnalyzer for NeutralFace {
        async fn analyze(&self, _image: &[u8]) -> FaceEmotion {
            FaceEmotion::neutral()
        }
    }

    struct NeutralVoice;

    #[async_trait]
    impl VoiceAnalyzer for NeutralVoice {
        async fn analyze(&self, _audio: &[u8]) -> VoiceEmotion {
            VoiceEmotion::neutral()
        }
    }

    struct StaticGenerator;

    #[async_trait]
    impl ResponseGenerator for StaticGenerator {
        async fn generate(&self, _request: GenerationRequest<'_>) -> String {
            "ok".to_string()
        }
    }

    fn server() -> GatewayServer {
        let manager = Arc::new(SessionManager::new(
            Arc::new(NeutralText),
            Arc::new(NeutralFace),
            Arc::new(NeutralVoice),
            Arc::new(StaticGenerator),
        ));
        let pipeline = Arc::new(TurnPipeline::new(
            Arc::new(NeutralText),
            Arc::new(NeutralFace),
            Arc::new(NeutralVoice),
            Arc::new(StaticGenerator),
            Arc::new(InMemoryLog::new()),
            10,
        ));
        GatewayServer::new(manager, pipeline, "127.0.0.1", 0)
    }

    #[tokio::test]
    async fn test_router_builds() {
        let _router = server().router();
    }

    #[tokio::test]
    async fn test_health_reports_session_count() {
        let server = server();
        let response = health(State(server.state.clone())).await;
        assert_eq!(response.0["status"], "ok");
        assert_eq!(response.0["active_sessions"], 0);
    }

    #[test]
    fn test_decode_media_accepts_valid_base64() {
        let decoded = decode_media(Some("aGVsbG8="), "image").unwrap();
        assert_eq!(decoded, Some(b"hello".to_vec()));
    }

    #[test]
    fn test_decode_media_rejects_garbage() {
        let err = decode_media(Some("!!not-base64!!"), "audio").unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1 .0.error.contains("audio"));
    }

    #[test]
    fn test_decode_media_absent_is_none() {
        assert_eq!(decode_media(None, "image").unwrap(), None);
    }

    #[test]
    fn test_lost_session_sends_error_reply_before_close() {
        let id = Uuid::new_v4();
        let (reply, close) = event_reply(Err(SessionError::SessionNotFound(id)));
        assert!(close);
        let parsed: ErrorReply = serde_json::from_str(&reply).unwrap();
        assert!(parsed.error.contains("no active session"));
    }

    #[test]
    fn test_invalid_event_reply_keeps_stream_open() {
        let (reply, close) =
            event_reply(Err(SessionError::InvalidEventFormat("bad payload".into())));
        assert!(!close);
        let parsed: ErrorReply = serde_json::from_str(&reply).unwrap();
        assert!(parsed.error.contains("bad payload"));
    }

    #[test]
    fn test_ok_outcome_serialized_and_stream_stays_open() {
        use solace_core::mood::{MoodState, RiskFlags, SupportMode};

        let outcome = StreamOutcome {
            response_text: "here for you".to_string(),
            mood_state: MoodState::default(),
            risk: RiskFlags::default(),
            mode: SupportMode::Listening,
        };
        let (reply, close) = event_reply(Ok(outcome));
        assert!(!close);
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["response_text"], "here for you");
        assert_eq!(value["mode"], "listening");
    }
}
