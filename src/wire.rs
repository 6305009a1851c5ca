//! Event envelopes and payload types for the realtime chat protocol.
//!
//! Every frame on the wire is a JSON text message shaped as
//! `{ "event": <name>, "data": <payload> }`. The payload field names follow
//! the backend's camelCase convention (`chatId`, `taskType`), so the structs
//! here carry rename attributes rather than leaking wire spelling into Rust
//! code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token, cost, and latency accounting attached to an assistant reply.
///
/// Field names match the backend exactly; these are snake_case on the wire
/// even though the envelope around them uses camelCase keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostMetrics {
    pub tokens_used: u64,
    pub cost_usd: f64,
    pub latency_ms: f64,
}

/// Payload of an inbound `message` event: one assistant reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Server-assigned session correlation token.
    #[serde(rename = "chatId")]
    pub chat_id: String,
    pub content: String,
    /// Always `"assistant"` from the backend; kept as data rather than
    /// validated so a misbehaving server surfaces in the transcript, not as
    /// a decode failure.
    pub role: String,
    pub model: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CostMetrics>,
}

/// Payload of an outbound `message` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub content: String,
    /// Omitted from the wire entirely until the server has issued one.
    #[serde(rename = "chatId", default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Routing tag the backend uses to pick a model.
    #[serde(rename = "taskType", default = "default_task_type")]
    pub task_type: String,
}

/// Default routing tag when the caller does not specify one.
pub const DEFAULT_TASK_TYPE: &str = "general";

fn default_task_type() -> String {
    DEFAULT_TASK_TYPE.to_owned()
}

impl OutboundMessage {
    /// Build a message with the default `"general"` task type and no session.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            chat_id: None,
            task_type: default_task_type(),
        }
    }

    /// Attach the server-issued session token.
    #[must_use]
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Override the routing tag.
    #[must_use]
    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }
}

/// Frames the client sends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ClientEvent {
    Message(OutboundMessage),
}

/// Frames the server sends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ServerEvent {
    /// One assistant reply.
    Message(ChatReply),
    /// Opaque error payload; handed to error handlers unmodified.
    Error(Value),
    /// Informational; carries no payload.
    Disconnect,
}

/// Encode a client event as a JSON text frame.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if serialization fails, which
/// cannot happen for these types in practice.
pub fn encode_event(event: &ClientEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Decode a JSON text frame from the server.
///
/// Unknown event names are a decode error here; the caller decides whether
/// to ignore or surface them.
pub fn decode_event(text: &str) -> Result<ServerEvent, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
