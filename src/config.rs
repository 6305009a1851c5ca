//! Client configuration parsed from environment variables.

use crate::error::ChatError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:59500";
pub const DEFAULT_WS_PATH: &str = "/ws/socket.io";

/// Low-level transport negotiation preference.
///
/// Only the direct websocket transport is recognized; the long-polling
/// fallback some backends negotiate is deliberately unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    Websocket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base HTTP endpoint of the chat backend, e.g. `http://127.0.0.1:59500`.
    pub endpoint: String,
    /// Sub-route the websocket is served under.
    pub path: String,
    pub transport: TransportMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            path: DEFAULT_WS_PATH.to_owned(),
            transport: TransportMode::Websocket,
        }
    }
}

impl ClientConfig {
    /// Build config for a specific endpoint, keeping the default path and
    /// transport.
    #[must_use]
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CHAT_ENDPOINT`: default `http://127.0.0.1:59500`
    /// - `CHAT_WS_PATH`: default `/ws/socket.io`
    /// - `CHAT_TRANSPORT`: `websocket` (the only recognized value)
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::ConfigParse`] for an unrecognized transport.
    pub fn from_env() -> Result<Self, ChatError> {
        let endpoint = std::env::var("CHAT_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let path = std::env::var("CHAT_WS_PATH").unwrap_or_else(|_| DEFAULT_WS_PATH.to_owned());
        let transport = parse_transport(std::env::var("CHAT_TRANSPORT").ok().as_deref())?;

        Ok(Self { endpoint, path, transport })
    }

    /// Resolve the websocket URL for this config.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidEndpoint`] when the endpoint is neither
    /// `http://` nor `https://`.
    pub fn ws_url(&self) -> Result<String, ChatError> {
        let endpoint = self.endpoint.trim_end_matches('/');
        let path = self.path.as_str();
        if let Some(rest) = endpoint.strip_prefix("http://") {
            return Ok(format!("ws://{rest}{path}"));
        }
        if let Some(rest) = endpoint.strip_prefix("https://") {
            return Ok(format!("wss://{rest}{path}"));
        }

        Err(ChatError::InvalidEndpoint(self.endpoint.clone()))
    }
}

fn parse_transport(raw: Option<&str>) -> Result<TransportMode, ChatError> {
    match raw.unwrap_or("websocket") {
        "websocket" => Ok(TransportMode::Websocket),
        other => Err(ChatError::ConfigParse(format!(
            "unsupported CHAT_TRANSPORT: {other}"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
