//! Error taxonomy for the session layer.
//!
//! Analyzer and generation failures are handled locally with fallbacks and
//! never reach callers; only session-level faults are surfaced.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Event arrived for a connection that was never opened or has already
    /// disconnected. A race the manager must absorb without panicking.
    #[error("no active session for connection {0}")]
    SessionNotFound(Uuid),

    /// `connect` was called for an identity that already has a live session.
    #[error("session already open for connection {0}")]
    SessionExists(Uuid),

    /// Unrecognized event type or payload failing the basic type check. The
    /// session is left untouched and no fusion runs.
    #[error("invalid event format: {0}")]
    InvalidEventFormat(String),
}
