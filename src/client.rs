//! The chat transport client.
//!
//! One `ChatClient` owns at most one websocket connection to the chat
//! backend. `connect` opens the socket and spawns a reader task; inbound
//! events are fanned out to registered handlers in registration order. There
//! is no reconnect, retry, or replay: a lost connection is reported to error
//! handlers and the client goes back to the not-connected state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::ClientConfig;
use crate::error::{ChatError, ErrorEvent};
use crate::wire::{self, ChatReply, ClientEvent, OutboundMessage, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type MessageHandler = Arc<dyn Fn(&ChatReply) + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Ordered observer registry shared between the client and its reader task.
#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    messages: Mutex<Vec<(u64, MessageHandler)>>,
    errors: Mutex<Vec<(u64, ErrorHandler)>>,
}

#[derive(Clone, Copy)]
enum HandlerKind {
    Message,
    Error,
}

/// Handle returned by [`ChatClient::on_message`] / [`ChatClient::on_error`].
///
/// `unsubscribe` removes exactly the handler this handle was issued for;
/// dropping the handle without calling it leaves the handler registered.
#[must_use = "dropping a Subscription without unsubscribing leaves the handler registered"]
pub struct Subscription {
    registry: Weak<Registry>,
    kind: HandlerKind,
    id: u64,
}

impl Subscription {
    /// Remove the handler this subscription refers to. No-op if the client
    /// is already gone.
    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match self.kind {
            HandlerKind::Message => lock(&registry.messages).retain(|(id, _)| *id != self.id),
            HandlerKind::Error => lock(&registry.errors).retain(|(id, _)| *id != self.id),
        }
    }
}

struct Connection {
    sink: WsSink,
    reader: JoinHandle<()>,
}

type ConnectionSlot = tokio::sync::Mutex<Option<Connection>>;

/// Client for the realtime chat backend.
pub struct ChatClient {
    config: ClientConfig,
    conn: Arc<ConnectionSlot>,
    registry: Arc<Registry>,
}

impl ChatClient {
    /// Construct a client. Performs no I/O until [`connect`](Self::connect).
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            conn: Arc::new(tokio::sync::Mutex::new(None)),
            registry: Arc::new(Registry::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open the websocket and start the reader task.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::AlreadyConnected`] when a connection exists,
    /// [`ChatError::InvalidEndpoint`] for an unusable endpoint URL, and
    /// [`ChatError::Connect`] when the websocket handshake fails.
    pub async fn connect(&self) -> Result<(), ChatError> {
        let mut slot = self.conn.lock().await;
        if slot.is_some() {
            return Err(ChatError::AlreadyConnected);
        }

        let url = self.config.ws_url()?;
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|error| ChatError::Connect(Box::new(error)))?;
        tracing::info!(%url, "connected to chat server");

        let (sink, source) = stream.split();
        let reader = tokio::spawn(read_loop(
            source,
            Arc::clone(&self.registry),
            Arc::downgrade(&self.conn),
        ));
        *slot = Some(Connection { sink, reader });
        Ok(())
    }

    /// Close the connection and stop the reader. No-op when not connected;
    /// calling it twice is safe.
    pub async fn disconnect(&self) {
        let mut slot = self.conn.lock().await;
        let Some(mut conn) = slot.take() else {
            return;
        };
        conn.reader.abort();
        if let Err(error) = conn.sink.send(Message::Close(None)).await {
            tracing::debug!(%error, "close frame not delivered");
        }
        tracing::info!("disconnected from chat server");
    }

    /// Whether a connection currently exists.
    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Transmit one `message` event.
    ///
    /// Returns as soon as the frame is handed to the transport; the reply
    /// arrives later through message handlers and is correlated by
    /// `chat_id`, not by this call.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NotConnected`] when no connection exists (the
    /// message is not queued) and [`ChatError::Send`] when the transport
    /// rejects the frame.
    pub async fn send(&self, message: OutboundMessage) -> Result<(), ChatError> {
        let text = wire::encode_event(&ClientEvent::Message(message))?;
        let mut slot = self.conn.lock().await;
        let Some(conn) = slot.as_mut() else {
            return Err(ChatError::NotConnected);
        };
        conn.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|error| ChatError::Send(Box::new(error)))
    }

    /// Convenience wrapper: send `content` with the default task type,
    /// attaching `chat_id` when the session already has one.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn send_message(
        &self,
        content: &str,
        chat_id: Option<&str>,
    ) -> Result<(), ChatError> {
        let mut message = OutboundMessage::new(content);
        if let Some(chat_id) = chat_id {
            message = message.with_chat_id(chat_id);
        }
        self.send(message).await
    }

    /// Register a handler for inbound assistant replies.
    ///
    /// Handlers run on the reader task, in registration order, once per
    /// event each.
    pub fn on_message(&self, handler: impl Fn(&ChatReply) + Send + Sync + 'static) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.registry.messages).push((id, Arc::new(handler)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            kind: HandlerKind::Message,
            id,
        }
    }

    /// Register a handler for server-reported and transport errors.
    pub fn on_error(&self, handler: impl Fn(&ErrorEvent) + Send + Sync + 'static) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.registry.errors).push((id, Arc::new(handler)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            kind: HandlerKind::Error,
            id,
        }
    }
}

/// Read frames until close or failure, then clear the connection slot so
/// later sends fail with `NotConnected`.
async fn read_loop(mut source: WsSource, registry: Arc<Registry>, conn: Weak<ConnectionSlot>) {
    while let Some(next) = source.next().await {
        match next {
            Ok(Message::Text(text)) => dispatch_text(&registry, text.as_str()),
            Ok(Message::Close(_)) => {
                tracing::info!("chat server closed the connection");
                break;
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%error, "websocket read failed");
                dispatch_error(&registry, &ErrorEvent::Transport(error.to_string()));
                break;
            }
        }
    }

    if let Some(slot) = conn.upgrade() {
        slot.lock().await.take();
    }
}

fn dispatch_text(registry: &Registry, text: &str) {
    match wire::decode_event(text) {
        Ok(ServerEvent::Message(reply)) => {
            // Snapshot under the lock, call outside it, so a handler may
            // unsubscribe without deadlocking.
            let handlers: Vec<MessageHandler> = lock(&registry.messages)
                .iter()
                .map(|(_, handler)| Arc::clone(handler))
                .collect();
            for handler in handlers {
                handler(&reply);
            }
        }
        Ok(ServerEvent::Error(payload)) => {
            dispatch_error(registry, &ErrorEvent::Server(payload));
        }
        Ok(ServerEvent::Disconnect) => {
            tracing::info!("chat server announced disconnect");
        }
        Err(error) => {
            tracing::debug!(%error, "ignoring unrecognized event");
        }
    }
}

fn dispatch_error(registry: &Registry, event: &ErrorEvent) {
    let handlers: Vec<ErrorHandler> = lock(&registry.errors)
        .iter()
        .map(|(_, handler)| Arc::clone(handler))
        .collect();
    for handler in handlers {
        handler(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
