// MIT License - Copyright (c) 2026 elk-m1-client contributors

use crate::error::ElkError;
use crate::protocol::ElkMessage;

/// Events emitted by a [`Connection`](crate::connection::Connection).
///
/// State events are named after the state the connection moved into and fire
/// once per actual change. `Disconnecting` is additionally emitted when a
/// disconnect is requested while a connect is still underway, which cancels
/// that connect.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    /// Text received from the panel, one read at a time.
    Data(String),
    Error(ElkError),
}

/// Events emitted by a [`Client`](crate::client::Client).
///
/// Users subscribe via `client.subscribe()` to receive a
/// `tokio::sync::broadcast::Receiver<ClientEvent>`.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The underlying connection started connecting.
    Connecting,
    /// The underlying connection is established; authentication may follow.
    Connected,
    /// The panel asked for credentials and the username has been sent.
    Authenticating,
    /// The panel accepted the credentials. Always followed by `Ready`.
    Authenticated,
    /// The session can send and receive messages.
    Ready,
    /// A decoded message from the panel.
    Message(ElkMessage),
    /// A bare "OK" line from the panel.
    Ok,
    Error(ElkError),
    Disconnecting,
    Disconnected,
}

pub type ConnectionEventSender = tokio::sync::broadcast::Sender<ConnectionEvent>;
pub type ConnectionEventReceiver = tokio::sync::broadcast::Receiver<ConnectionEvent>;

pub type EventSender = tokio::sync::broadcast::Sender<ClientEvent>;
pub type EventReceiver = tokio::sync::broadcast::Receiver<ClientEvent>;

/// Create a new client event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}

/// Create a new connection event channel with the given capacity.
pub fn connection_event_channel(
    capacity: usize,
) -> (ConnectionEventSender, ConnectionEventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
