//! Conversation history collaborator.
//!
//! The pipeline never parses or stores transcripts itself — it asks a
//! [`ConversationLog`] for bounded recent history and offers turns back for
//! persistence. [`InMemoryLog`] is the default implementation used by the
//! binary and tests; durable stores live behind the same trait.

use crate::mood::ConversationTurn;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A single privileged user/assistant exchange, recorded as one paired
/// entry instead of two turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivilegedExchange {
    pub user_text: String,
    pub response_text: String,
    pub timestamp: DateTime<Utc>,
}

impl PrivilegedExchange {
    pub fn new(user_text: &str, response_text: &str) -> Self {
        Self {
            user_text: user_text.to_string(),
            response_text: response_text.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Most recent turns for a conversation, oldest first, at most
    /// `max_turns` entries.
    async fn history(
        &self,
        conversation_id: &str,
        max_turns: usize,
    ) -> anyhow::Result<Vec<ConversationTurn>>;

    /// Append one turn to a conversation.
    async fn record(&self, conversation_id: &str, turn: ConversationTurn) -> anyhow::Result<()>;

    /// Record a privileged exchange outside the regular transcript.
    async fn record_privileged(&self, exchange: PrivilegedExchange) -> anyhow::Result<()>;
}

/// Process-local conversation log.
#[derive(Default)]
pub struct InMemoryLog {
    conversations: RwLock<HashMap<String, Vec<ConversationTurn>>>,
    privileged: RwLock<Vec<PrivilegedExchange>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full transcript of one conversation (for inspection/tests).
    pub async fn transcript(&self, conversation_id: &str) -> Vec<ConversationTurn> {
        self.conversations
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn privileged_exchanges(&self) -> Vec<PrivilegedExchange> {
        self.privileged.read().await.clone()
    }
}

#[async_trait]
impl ConversationLog for InMemoryLog {
    async fn history(
        &self,
        conversation_id: &str,
        max_turns: usize,
    ) -> anyhow::Result<Vec<ConversationTurn>> {
        let conversations = self.conversations.read().await;
        let turns = match conversations.get(conversation_id) {
            Some(turns) => turns,
            None => return Ok(Vec::new()),
        };
        let start = turns.len().saturating_sub(max_turns);
        Ok(turns[start..].to_vec())
    }

    async fn record(&self, conversation_id: &str, turn: ConversationTurn) -> anyhow::Result<()> {
        let mut conversations = self.conversations.write().await;
        conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn record_privileged(&self, exchange: PrivilegedExchange) -> anyhow::Result<()> {
        self.privileged.write().await.push(exchange);
        Ok(())
    }
}
