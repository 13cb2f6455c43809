// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};

use crate::config::ClientOptions;
use crate::connection::{lock, Connection, ConnectionState};
use crate::constants::*;
use crate::error::{AuthenticationFailedReason, ElkError, Result};
use crate::event::{event_channel, ClientEvent, ConnectionEvent, ConnectionEventReceiver, EventReceiver, EventSender};
use crate::protocol::{self, Command};
use crate::timeout::with_timeout;
use crate::transport::SocketFactory;

/// Session state of a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    Disconnected,
    Disconnecting,
    Connecting,
    Authenticating,
    Ready,
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Disconnecting => "disconnecting",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
        })
    }
}

pub(crate) struct ClientInner {
    options: ClientOptions,
    connection: Connection,
    state: Mutex<ClientState>,
    authenticated: AtomicBool,
    /// Received text not yet terminated by a line break.
    partial_line: Mutex<String>,
    events: EventSender,
    dispatcher: Mutex<Option<AbortHandle>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(dispatcher) = lock(&self.dispatcher).take() {
            dispatcher.abort();
        }
    }
}

/// A session with an Elk M1 panel.
///
/// The client owns one [`Connection`] for its whole life and layers the
/// login handshake on top of it. Subscribe with
/// [`subscribe`](Client::subscribe) to receive [`ClientEvent`]s: every
/// decoded panel message is broadcast as [`ClientEvent::Message`].
///
/// Must be created inside a tokio runtime; connection events are processed
/// by a background task that lives as long as the client.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("connection", &self.inner.connection)
            .field("state", &self.state())
            .field("authenticated", &self.authenticated())
            .finish()
    }
}

impl Client {
    /// Create a client that connects over TCP/TLS.
    pub fn new(options: ClientOptions) -> Self {
        let connection = Connection::new(options.connection.clone());
        Self::with_connection(options, connection)
    }

    /// Create a client whose connection opens streams through `factory`.
    pub fn with_factory(options: ClientOptions, factory: Arc<dyn SocketFactory>) -> Self {
        let connection = Connection::with_factory(options.connection.clone(), factory);
        Self::with_connection(options, connection)
    }

    fn with_connection(options: ClientOptions, connection: Connection) -> Self {
        let (events, _) = event_channel(EVENT_CHANNEL_CAPACITY);
        let connection_events = connection.subscribe();
        let inner = Arc::new(ClientInner {
            options,
            connection,
            state: Mutex::new(ClientState::Disconnected),
            authenticated: AtomicBool::new(false),
            partial_line: Mutex::new(String::new()),
            events,
            dispatcher: Mutex::new(None),
        });
        let task = tokio::spawn(dispatch(Arc::downgrade(&inner), connection_events));
        *lock(&inner.dispatcher) = Some(task.abort_handle());
        Self { inner }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    pub fn state(&self) -> ClientState {
        *lock(&self.inner.state)
    }

    /// Whether the panel accepted our credentials since the last connect.
    pub fn authenticated(&self) -> bool {
        self.inner.authenticated.load(Ordering::SeqCst)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ClientState::Ready
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connection.state() == ConnectionState::Connected
    }

    /// Default deadline for commands.
    pub fn default_timeout(&self) -> Duration {
        self.inner.options.response_timeout
    }

    /// Subscribe to client events.
    pub fn subscribe(&self) -> EventReceiver {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        let _ = self.inner.events.send(event);
    }

    fn set_state(&self, state: ClientState) {
        let mut current = lock(&self.inner.state);
        if *current != state {
            debug!("Client state {} -> {}", *current, state);
            *current = state;
        }
    }

    /// Connect using the configured client connect timeout.
    pub async fn connect(&self) -> Result<()> {
        self.connect_with_timeout(self.inner.options.connect_timeout).await
    }

    /// Connect and wait until the session is ready, including the login
    /// handshake when the panel asks for one.
    ///
    /// Resolves immediately when already ready and connected. If the connection is still
    /// closing from an earlier disconnect, that disconnect is awaited first.
    /// If a connect is already underway, this waits for it to finish.
    pub async fn connect_with_timeout(&self, timeout: Duration) -> Result<()> {
        if self.is_ready() && self.is_connected() {
            return Ok(());
        }

        let mut events = self.subscribe();
        let connection = &self.inner.connection;
        let wait = async {
            let open = async {
                if connection.state() == ConnectionState::Disconnecting {
                    connection.disconnect().await;
                }
                connection.connect().await
            };
            tokio::pin!(open);
            let mut opened = false;
            loop {
                tokio::select! {
                    result = &mut open, if !opened => {
                        opened = true;
                        match result {
                            Ok(()) => {}
                            Err(ElkError::NotConnectable { state }) => {
                                debug!("Connection is already {}, waiting for ready", state);
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    event = events.recv() => match event {
                        Ok(ClientEvent::Ready) => return Ok(()),
                        Ok(ClientEvent::Error(e)) => return Err(e),
                        Ok(_) => {}
                        Err(RecvError::Lagged(n)) => warn!("Missed {} client events while connecting", n),
                        Err(RecvError::Closed) => return Err(ElkError::ChannelClosed),
                    },
                }
            }
        };
        with_timeout(timeout, wait).await
    }

    /// Close the session.
    pub async fn disconnect(&self) {
        self.inner.connection.disconnect().await
    }

    async fn on_connection_event(&self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connecting => {
                self.set_state(ClientState::Connecting);
                self.emit(ClientEvent::Connecting);
            }
            ConnectionEvent::Connected => {
                self.emit(ClientEvent::Connected);
                if self.inner.options.username.is_none() {
                    // A panel without login answers this; one with login
                    // prompts for a username instead.
                    let client = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = client.send_command(&Command::VersionNumberRequest).await {
                            debug!("Version probe failed: {}", e);
                        }
                    });
                }
            }
            ConnectionEvent::Disconnecting => {
                self.set_state(ClientState::Disconnecting);
                self.emit(ClientEvent::Disconnecting);
            }
            ConnectionEvent::Disconnected => {
                self.set_state(ClientState::Disconnected);
                self.inner.authenticated.store(false, Ordering::SeqCst);
                lock(&self.inner.partial_line).clear();
                info!("Disconnected from panel");
                self.emit(ClientEvent::Disconnected);
            }
            ConnectionEvent::Error(e) => self.emit(ClientEvent::Error(e)),
            ConnectionEvent::Data(data) => self.on_data(&data).await,
        }
    }

    async fn on_data(&self, data: &str) {
        match data {
            USERNAME_REQUEST => match self.inner.options.username.as_deref() {
                None => self.fail_authentication(AuthenticationFailedReason::MissingUsername),
                Some(username) => {
                    self.set_state(ClientState::Authenticating);
                    self.emit(ClientEvent::Authenticating);
                    debug!("Sending username");
                    self.write_credential(username).await;
                }
            },
            PASSWORD_REQUEST => match self.inner.options.password.as_deref() {
                None => self.fail_authentication(AuthenticationFailedReason::MissingPassword),
                Some(password) => {
                    debug!("Sending password");
                    self.write_credential(password).await;
                }
            },
            LOGIN_FAILURE => self.fail_authentication(AuthenticationFailedReason::InvalidCredentials),
            LOGIN_SUCCESSFUL => {
                self.set_state(ClientState::Ready);
                self.inner.authenticated.store(true, Ordering::SeqCst);
                info!("Logged in to panel");
                self.emit(ClientEvent::Authenticated);
                self.emit(ClientEvent::Ready);
            }
            _ => {
                // credentials are echoed back while logging in
                if self.state() == ClientState::Authenticating {
                    trace!("Ignoring {:?} while authenticating", data);
                    return;
                }
                if !self.is_ready() && self.is_connected() {
                    self.set_state(ClientState::Ready);
                    info!("Panel ready, no login required");
                    self.emit(ClientEvent::Ready);
                }

                let lines = split_lines(&mut lock(&self.inner.partial_line), data);
                for line in lines {
                    self.on_line(&line);
                }
            }
        }
    }

    fn on_line(&self, line: &str) {
        if line == OK_RESPONSE {
            self.emit(ClientEvent::Ok);
            return;
        }
        match protocol::parse(line) {
            Ok(message) => {
                trace!("Received {:?}", message);
                self.emit(ClientEvent::Message(message));
            }
            Err(e) => warn!("Skipping line {:?}: {}", line, e),
        }
    }

    async fn write_credential(&self, credential: &str) {
        let data = format!("{}{}", credential, CRLF);
        if let Err(e) = self.inner.connection.write(&data).await {
            warn!("Failed to send credentials: {}", e);
            self.emit(ClientEvent::Error(e));
        }
    }

    fn fail_authentication(&self, reason: AuthenticationFailedReason) {
        warn!("Authentication failed: {}", reason);
        self.emit(ClientEvent::Error(ElkError::AuthenticationFailed { reason }));
        let connection = self.inner.connection.clone();
        tokio::spawn(async move { connection.disconnect().await });
    }
}

/// Forward connection events to the client until it is dropped.
async fn dispatch(client: Weak<ClientInner>, mut events: ConnectionEventReceiver) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(n)) => {
                warn!("Client missed {} connection events", n);
                continue;
            }
            Err(RecvError::Closed) => return,
        };
        let Some(inner) = client.upgrade() else {
            return;
        };
        Client { inner }.on_connection_event(event).await;
    }
}

/// Append `data` to the partial line in `buffer` and return every complete,
/// non-empty line. A trailing fragment stays in the buffer.
fn split_lines(buffer: &mut String, data: &str) -> Vec<String> {
    buffer.push_str(data);
    let Some(end) = buffer.rfind(['\r', '\n']) else {
        if buffer.len() > MAX_PARTIAL_LINE {
            warn!("Discarding {} bytes without a line break", buffer.len());
            buffer.clear();
        }
        return Vec::new();
    };
    let complete: String = buffer.drain(..=end).collect();
    complete
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
