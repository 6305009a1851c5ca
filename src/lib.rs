//! Realtime chat transport client.
//!
//! `chatwire` owns a single long-lived websocket connection to a chat
//! backend, exposes a send operation, and fans inbound `message` / `error`
//! events out to registered handlers. Connection lifecycle is explicit:
//! no reconnect, no retry, no queueing while disconnected.
//!
//! The backend itself (inference, model routing, cost accounting) is out of
//! scope; the test suite scripts one with `axum`.

pub mod client;
pub mod config;
pub mod error;
pub mod transcript;
pub mod wire;

pub use client::{ChatClient, Subscription};
pub use config::{ClientConfig, TransportMode};
pub use error::{ChatError, ErrorEvent};
pub use transcript::{ChatMessage, Role, Transcript};
pub use wire::{ChatReply, CostMetrics, DEFAULT_TASK_TYPE, OutboundMessage};
