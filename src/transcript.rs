//! Append-only client-side record of a conversation.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wire::{ChatReply, CostMetrics};

/// Who authored a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single transcript entry. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Client-generated UUID; the server never sees it.
    pub id: String,
    pub content: String,
    pub role: Role,
    /// Model and provider tags, present on assistant entries only.
    pub model: Option<String>,
    pub provider: Option<String>,
    /// Milliseconds since the Unix epoch when the entry was recorded locally.
    pub timestamp: i64,
    pub metrics: Option<CostMetrics>,
}

/// One conversation as observed by this client.
///
/// Entries are appended in the order the UI records them; nothing is
/// reordered or deduplicated. The server issues the session's `chat_id` on
/// the first reply, and every later send should carry it so the backend keeps
/// conversational context.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    chat_id: Option<String>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the local echo of a message the user just sent.
    pub fn record_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        let index = self.messages.len();
        self.messages.push(ChatMessage {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: Role::User,
            model: None,
            provider: None,
            timestamp: now_ms(),
            metrics: None,
        });
        &self.messages[index]
    }

    /// Append an assistant reply and capture its session token.
    ///
    /// The first reply establishes `chat_id`; later replies for the same
    /// session simply repeat it.
    pub fn record_reply(&mut self, reply: &ChatReply) -> &ChatMessage {
        if self.chat_id.is_none() {
            self.chat_id = Some(reply.chat_id.clone());
        }
        let index = self.messages.len();
        self.messages.push(ChatMessage {
            id: Uuid::new_v4().to_string(),
            content: reply.content.clone(),
            role: Role::Assistant,
            model: Some(reply.model.clone()),
            provider: Some(reply.provider.clone()),
            timestamp: now_ms(),
            metrics: reply.metrics.clone(),
        });
        &self.messages[index]
    }

    /// Server-assigned session token, absent until the first reply arrives.
    #[must_use]
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

fn now_ms() -> i64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;
