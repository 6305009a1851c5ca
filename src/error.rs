//! Error taxonomy for the chat transport client.

use serde_json::Value;

/// Synchronous failures returned by [`crate::client::ChatClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A connection already exists; `connect` refuses to open a second one.
    #[error("already connected to chat server")]
    AlreadyConnected,
    /// `send` was called without an active connection. Nothing is queued.
    #[error("not connected to chat server")]
    NotConnected,
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
    #[error("invalid configuration: {0}")]
    ConfigParse(String),
    #[error("websocket connect failed: {0}")]
    Connect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket send failed: {0}")]
    Send(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("message encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Asynchronous failures delivered to registered error handlers.
///
/// Server-reported errors arrive on the `error` event with an opaque payload;
/// transport failures are whatever the read side of the socket reported. A
/// clean close is not an error and is only logged.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorEvent {
    /// Payload of a server-emitted `error` event, passed through unmodified.
    Server(Value),
    /// The connection failed mid-stream; no automatic reconnect is attempted.
    Transport(String),
}
