// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, trace, warn};

use crate::config::ConnectionOptions;
use crate::constants::{EVENT_CHANNEL_CAPACITY, READ_BUFFER_SIZE};
use crate::error::{ElkError, Result};
use crate::event::{connection_event_channel, ConnectionEvent, ConnectionEventReceiver, ConnectionEventSender};
use crate::timeout::with_timeout;
use crate::transport::{BoxedStream, HandleFlags, NetSocketFactory, SocketFactory};

/// Lifecycle state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    /// Derive the state from the flags of the live handle, if any.
    pub fn from_flags(flags: Option<&HandleFlags>) -> Self {
        match flags {
            None => Self::Disconnected,
            Some(f) if f.destroyed => Self::Disconnected,
            Some(f) if f.connecting => Self::Connecting,
            Some(f) if f.readable && f.writable => Self::Connected,
            Some(_) => Self::Disconnecting,
        }
    }

    /// The event emitted on entering this state.
    fn event(&self) -> ConnectionEvent {
        match self {
            Self::Disconnected => ConnectionEvent::Disconnected,
            Self::Connecting => ConnectionEvent::Connecting,
            Self::Connected => ConnectionEvent::Connected,
            Self::Disconnecting => ConnectionEvent::Disconnecting,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
        })
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Writer = Arc<tokio::sync::Mutex<WriteHalf<BoxedStream>>>;

/// The transport handle: one per connect attempt.
struct Handle {
    /// Generation, so tasks of a replaced handle cannot touch the new one.
    id: u64,
    flags: HandleFlags,
    writer: Option<Writer>,
    reader: Option<AbortHandle>,
    /// Dropped on teardown, which wakes anyone waiting for the close.
    closed: watch::Sender<()>,
}

impl Handle {
    fn opening(id: u64) -> Self {
        let (closed, _) = watch::channel(());
        Self {
            id,
            flags: HandleFlags::opening(),
            writer: None,
            reader: None,
            closed,
        }
    }
}

struct Inner {
    options: ConnectionOptions,
    factory: Arc<dyn SocketFactory>,
    handle: Mutex<Option<Handle>>,
    /// Last state an event was emitted for. Lock before `handle`.
    last_state: Mutex<ConnectionState>,
    next_id: AtomicU64,
    events: ConnectionEventSender,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let handle = self.handle.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(reader) = handle.take().and_then(|h| h.reader) {
            reader.abort();
        }
    }
}

/// A byte-stream connection to the panel.
///
/// The connection owns at most one transport handle at a time. Its
/// [`state`](Connection::state) is always derived from that handle, and a
/// [`ConnectionEvent`] named after the new state is broadcast once per
/// actual change. Received text is broadcast as [`ConnectionEvent::Data`].
///
/// Cloning is cheap; clones share the same handle and event channel.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.inner.options.address())
            .field("state", &self.state())
            .finish()
    }
}

impl Connection {
    /// Create a connection that opens TCP/TLS sockets.
    pub fn new(options: ConnectionOptions) -> Self {
        Self::with_factory(options, Arc::new(NetSocketFactory))
    }

    /// Create a connection that opens its streams through `factory`.
    pub fn with_factory(options: ConnectionOptions, factory: Arc<dyn SocketFactory>) -> Self {
        let (events, _) = connection_event_channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                options,
                factory,
                handle: Mutex::new(None),
                last_state: Mutex::new(ConnectionState::Disconnected),
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.inner.options
    }

    /// Subscribe to connection events.
    pub fn subscribe(&self) -> ConnectionEventReceiver {
        self.inner.events.subscribe()
    }

    /// The current state, derived from the live handle.
    pub fn state(&self) -> ConnectionState {
        let handle = lock(&self.inner.handle);
        ConnectionState::from_flags(handle.as_ref().map(|h| &h.flags))
    }

    fn emit(&self, event: ConnectionEvent) {
        // no subscribers is fine
        let _ = self.inner.events.send(event);
    }

    /// Emit the event for the current state if it differs from the last one
    /// emitted.
    fn check_for_state_change(&self) {
        let mut last = lock(&self.inner.last_state);
        let current = self.state();
        if current == *last {
            return;
        }
        debug!("Connection state {} -> {}", *last, current);
        *last = current;
        self.emit(current.event());
    }

    /// Connect using the configured connect timeout.
    pub async fn connect(&self) -> Result<()> {
        self.connect_with_timeout(self.inner.options.connect_timeout).await
    }

    /// Open a new stream to the panel.
    ///
    /// Fails with [`ElkError::NotConnectable`] unless disconnected. The open
    /// races a concurrent [`disconnect`](Self::disconnect)
    /// ([`ElkError::ConnectCancelled`]), a connection error, and `timeout`
    /// ([`ElkError::Timeout`]). Any failure tears the new handle down again.
    pub async fn connect_with_timeout(&self, timeout: Duration) -> Result<()> {
        let mut events = self.subscribe();
        let id = {
            let mut handle = lock(&self.inner.handle);
            if let Some(existing) = handle.as_ref() {
                return Err(ElkError::NotConnectable {
                    state: ConnectionState::from_flags(Some(&existing.flags)),
                });
            }
            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            *handle = Some(Handle::opening(id));
            id
        };
        self.check_for_state_change();

        let address = self.inner.options.address();
        info!("Connecting to {}", address);

        let race = async {
            let open = self.inner.factory.open(&self.inner.options);
            tokio::pin!(open);
            loop {
                tokio::select! {
                    result = &mut open => {
                        if let Err(e) = &result {
                            self.emit(ConnectionEvent::Error(e.clone()));
                        }
                        return result;
                    }
                    event = events.recv() => match event {
                        Ok(ConnectionEvent::Disconnecting) => return Err(ElkError::ConnectCancelled),
                        Ok(ConnectionEvent::Error(e)) => return Err(e),
                        Ok(_) | Err(RecvError::Lagged(_)) => {}
                        Err(RecvError::Closed) => return Err(ElkError::ChannelClosed),
                    },
                }
            }
        };

        // also covers this future being dropped mid-connect
        let mut guard = ConnectGuard {
            connection: self,
            id,
            armed: true,
        };
        match with_timeout(timeout, race).await {
            Ok(stream) => {
                guard.armed = false;
                self.attach(id, stream)
            }
            Err(e) => {
                warn!("Connecting to {} failed: {}", address, e);
                Err(e)
            }
        }
    }

    /// Install an opened stream on handle `id` and start reading from it.
    fn attach(&self, id: u64, stream: BoxedStream) -> Result<()> {
        let (reader, writer) = tokio::io::split(stream);
        {
            let mut guard = lock(&self.inner.handle);
            let handle = match guard.as_mut() {
                Some(handle) if handle.id == id => handle,
                _ => return Err(ElkError::ConnectCancelled),
            };
            handle.flags = HandleFlags::open();
            handle.writer = Some(Arc::new(tokio::sync::Mutex::new(writer)));
        }
        self.check_for_state_change();
        info!("Connected to {}", self.inner.options.address());

        // started after `Connected` so no data event precedes it
        let task = tokio::spawn(read_loop(
            Arc::downgrade(&self.inner),
            id,
            reader,
            self.inner.options.idle_timeout,
        ));
        match lock(&self.inner.handle).as_mut() {
            Some(handle) if handle.id == id => handle.reader = Some(task.abort_handle()),
            _ => task.abort(),
        }
        Ok(())
    }

    /// Drop handle `id` if it is still the live one.
    fn teardown(&self, id: u64) {
        let removed = {
            let mut guard = lock(&self.inner.handle);
            if guard.as_ref().is_some_and(|h| h.id == id) {
                guard.take()
            } else {
                None
            }
        };
        if let Some(mut handle) = removed {
            handle.flags.destroyed = true;
            if let Some(reader) = handle.reader.take() {
                reader.abort();
            }
            drop(handle);
            self.check_for_state_change();
        }
    }

    /// The panel closed its side of the stream.
    fn on_end(&self, id: u64) {
        {
            let mut guard = lock(&self.inner.handle);
            match guard.as_mut() {
                Some(handle) if handle.id == id => handle.flags.readable = false,
                _ => return,
            }
        }
        self.check_for_state_change();
        self.teardown(id);
    }

    /// Disconnect using the configured connect timeout.
    pub async fn disconnect(&self) {
        self.disconnect_with_timeout(self.inner.options.connect_timeout).await
    }

    /// Close the connection. Never fails.
    ///
    /// - No handle: returns at once, no event.
    /// - Still connecting: emits [`ConnectionEvent::Disconnecting`], which
    ///   cancels the pending connect, and returns without waiting.
    /// - Otherwise: half-closes the stream and waits for the panel to close
    ///   its side, forcibly dropping the handle once `timeout` elapses.
    pub async fn disconnect_with_timeout(&self, timeout: Duration) {
        let (id, writer, mut closed) = {
            let mut guard = lock(&self.inner.handle);
            let Some(handle) = guard.as_mut() else {
                return;
            };
            if handle.flags.connecting {
                drop(guard);
                debug!("Disconnect requested while connecting");
                self.emit(ConnectionEvent::Disconnecting);
                return;
            }
            handle.flags.writable = false;
            (handle.id, handle.writer.clone(), handle.closed.subscribe())
        };
        self.check_for_state_change();
        info!("Disconnecting from {}", self.inner.options.address());

        let graceful = async {
            if let Some(writer) = writer {
                if let Err(e) = writer.lock().await.shutdown().await {
                    debug!("Socket shutdown failed: {}", e);
                }
            }
            // errors once the handle is dropped
            let _ = closed.changed().await;
            Ok(())
        };
        if let Err(e) = with_timeout(timeout, graceful).await {
            warn!("Graceful disconnect failed ({}), closing socket", e);
            self.teardown(id);
        }
    }

    /// Write raw text to the panel.
    ///
    /// Fails with [`ElkError::Write`] when there is no writable stream.
    pub async fn write(&self, data: &str) -> Result<()> {
        let writer = {
            let guard = lock(&self.inner.handle);
            match guard.as_ref() {
                Some(handle) if handle.flags.writable => handle.writer.clone(),
                _ => None,
            }
        };
        let Some(writer) = writer else {
            return Err(ElkError::Write { state: self.state() });
        };

        trace!("Writing {:?}", data);
        let mut writer = writer.lock().await;
        writer.write_all(data.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Tears down an unfinished handle unless disarmed.
struct ConnectGuard<'a> {
    connection: &'a Connection,
    id: u64,
    armed: bool,
}

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.connection.teardown(self.id);
        }
    }
}

/// Forward everything read from the panel until the stream ends, fails, or
/// stays silent for `idle_timeout`.
async fn read_loop(
    connection: Weak<Inner>,
    id: u64,
    mut reader: ReadHalf<BoxedStream>,
    idle_timeout: Duration,
) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let result = with_timeout(idle_timeout, async {
            reader.read(&mut buf).await.map_err(ElkError::from)
        })
        .await;
        let Some(inner) = connection.upgrade() else {
            return;
        };
        let connection = Connection { inner };

        match result {
            Ok(0) => {
                debug!("Panel closed the connection");
                connection.on_end(id);
                return;
            }
            Ok(n) => {
                let data = String::from_utf8_lossy(&buf[..n]).into_owned();
                trace!("Received {:?}", data);
                connection.emit(ConnectionEvent::Data(data));
            }
            Err(e @ ElkError::Timeout { .. }) => {
                warn!("No data received for {:?}, closing connection", idle_timeout);
                connection.emit(ConnectionEvent::Error(e));
                connection.teardown(id);
                return;
            }
            Err(e) => {
                error!("Read failed: {}", e);
                connection.emit(ConnectionEvent::Error(e));
                connection.teardown(id);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::DuplexStream;
    use tokio::sync::mpsc;

    use crate::transport::OpenFuture;

    struct DuplexFactory {
        panels: mpsc::UnboundedSender<DuplexStream>,
        opens: AtomicUsize,
        hang: bool,
    }

    impl SocketFactory for DuplexFactory {
        fn open<'a>(&'a self, _options: &'a ConnectionOptions) -> OpenFuture<'a> {
            Box::pin(async move {
                self.opens.fetch_add(1, Ordering::SeqCst);
                if self.hang {
                    std::future::pending::<()>().await;
                }
                let (client, panel) = tokio::io::duplex(1024);
                let _ = self.panels.send(panel);
                Ok(Box::new(client) as BoxedStream)
            })
        }
    }

    fn connection(hang: bool) -> (Connection, Arc<DuplexFactory>, mpsc::UnboundedReceiver<DuplexStream>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let factory = Arc::new(DuplexFactory {
            panels: tx,
            opens: AtomicUsize::new(0),
            hang,
        });
        let options = ConnectionOptions::builder().host("test").build();
        (Connection::with_factory(options, factory.clone()), factory, rx)
    }

    fn drain(events: &mut ConnectionEventReceiver) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(event) = events.try_recv() {
            names.push(match event {
                ConnectionEvent::Data(d) => format!("data:{}", d),
                ConnectionEvent::Error(e) => format!("error:{}", e),
                other => format!("{:?}", other).to_lowercase(),
            });
        }
        names
    }

    #[test]
    fn test_state_from_flags() {
        assert_eq!(ConnectionState::from_flags(None), ConnectionState::Disconnected);
        assert_eq!(
            ConnectionState::from_flags(Some(&HandleFlags::opening())),
            ConnectionState::Connecting
        );
        assert_eq!(
            ConnectionState::from_flags(Some(&HandleFlags::open())),
            ConnectionState::Connected
        );
        let half_closed = HandleFlags {
            writable: false,
            ..HandleFlags::open()
        };
        assert_eq!(
            ConnectionState::from_flags(Some(&half_closed)),
            ConnectionState::Disconnecting
        );
        let destroyed = HandleFlags {
            destroyed: true,
            ..HandleFlags::open()
        };
        assert_eq!(
            ConnectionState::from_flags(Some(&destroyed)),
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn test_connect_write_and_remote_close() {
        let (connection, _factory, mut panels) = connection(false);
        let mut events = connection.subscribe();

        connection.connect().await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Connected);
        assert_eq!(drain(&mut events), vec!["connecting", "connected"]);

        let mut panel = panels.recv().await.unwrap();
        connection.write("06vn0056\r\n").await.unwrap();
        let mut buf = [0u8; 10];
        panel.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"06vn0056\r\n");

        panel.write_all(b"OK\r\n").await.unwrap();
        match events.recv().await.unwrap() {
            ConnectionEvent::Data(data) => assert_eq!(data, "OK\r\n"),
            other => panic!("unexpected event {:?}", other),
        }

        drop(panel);
        assert!(matches!(events.recv().await.unwrap(), ConnectionEvent::Disconnecting));
        assert!(matches!(events.recv().await.unwrap(), ConnectionEvent::Disconnected));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_when_connected_is_rejected() {
        let (connection, factory, _panels) = connection(false);
        connection.connect().await.unwrap();

        let err = connection.connect().await.unwrap_err();
        assert!(matches!(
            err,
            ElkError::NotConnectable {
                state: ConnectionState::Connected
            }
        ));
        assert_eq!(factory.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disconnect_without_handle_is_silent() {
        let (connection, _factory, _panels) = connection(false);
        let mut events = connection.subscribe();
        connection.disconnect().await;
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn test_graceful_disconnect() {
        let (connection, _factory, mut panels) = connection(false);
        connection.connect().await.unwrap();
        let mut panel = panels.recv().await.unwrap();
        let mut events = connection.subscribe();

        let panel_task = tokio::spawn(async move {
            let mut rest = Vec::new();
            // our half-close shows up as EOF
            panel.read_to_end(&mut rest).await.unwrap();
            drop(panel);
        });

        connection.disconnect().await;
        panel_task.await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert_eq!(drain(&mut events), vec!["disconnecting", "disconnected"]);

        // writes now fail with the state attached
        let err = connection.write("x").await.unwrap_err();
        assert!(matches!(
            err,
            ElkError::Write {
                state: ConnectionState::Disconnected
            }
        ));
    }

    #[tokio::test]
    async fn test_disconnect_cancels_pending_connect() {
        let (connection, _factory, _panels) = connection(true);
        let connecting = {
            let connection = connection.clone();
            tokio::spawn(async move { connection.connect().await })
        };
        while connection.state() != ConnectionState::Connecting {
            tokio::task::yield_now().await;
        }

        connection.disconnect().await;
        let err = connecting.await.unwrap().unwrap_err();
        assert!(matches!(err, ElkError::ConnectCancelled));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_timeout() {
        let (connection, _factory, _panels) = connection(true);
        let err = connection
            .connect_with_timeout(Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ElkError::Timeout { .. }));
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_dropped_connect_releases_handle() {
        let (connection, _factory, _panels) = connection(true);
        let mut events = connection.subscribe();
        let result = tokio::time::timeout(Duration::from_millis(5), connection.connect()).await;
        assert!(result.is_err());
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert_eq!(drain(&mut events), vec!["connecting", "disconnected"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_closes_connection() {
        let (connection, _factory, mut panels) = connection(false);
        connection.connect().await.unwrap();
        let _panel = panels.recv().await.unwrap();
        let mut events = connection.subscribe();

        match events.recv().await.unwrap() {
            ConnectionEvent::Error(ElkError::Timeout { timeout }) => {
                assert_eq!(timeout, Duration::from_secs(60))
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events.recv().await.unwrap(), ConnectionEvent::Disconnected));
    }
}
