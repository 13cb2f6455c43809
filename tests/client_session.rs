// Session tests against an in-memory panel
//
// The client runs over tokio duplex streams handed out by a test socket
// factory; each test plays the panel side of the conversation by hand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

use elk_m1_client::constants::{LOGIN_FAILURE, LOGIN_SUCCESSFUL, PASSWORD_REQUEST, USERNAME_REQUEST};
use elk_m1_client::event::EventReceiver;
use elk_m1_client::protocol::frame;
use elk_m1_client::transport::{BoxedStream, OpenFuture};
use elk_m1_client::{
    AuthenticationFailedReason, Client, ClientEvent, ClientOptions, ClientState, Command,
    ConnectionOptions, ConnectionState, ElkError, ElkMessage, FunctionKey, SocketFactory,
    ThermostatMode,
};

const WAIT: Duration = Duration::from_secs(5);

struct PanelFactory {
    panels: mpsc::UnboundedSender<DuplexStream>,
    opens: AtomicUsize,
    hang: bool,
}

impl SocketFactory for PanelFactory {
    fn open<'a>(&'a self, _options: &'a ConnectionOptions) -> OpenFuture<'a> {
        Box::pin(async move {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            let (client, panel) = tokio::io::duplex(4096);
            let _ = self.panels.send(panel);
            Ok(Box::new(client) as BoxedStream)
        })
    }
}

fn client(
    username: Option<&str>,
    password: Option<&str>,
    hang: bool,
) -> (Client, Arc<PanelFactory>, mpsc::UnboundedReceiver<DuplexStream>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let factory = Arc::new(PanelFactory {
        panels: tx,
        opens: AtomicUsize::new(0),
        hang,
    });
    let mut options = ClientOptions::builder()
        .connection(ConnectionOptions::builder().host("panel.test").build())
        .response_timeout(WAIT);
    if let Some(username) = username {
        options = options.username(username);
    }
    if let Some(password) = password {
        options = options.password(password);
    }
    (
        Client::with_factory(options.build(), factory.clone()),
        factory,
        rx,
    )
}

/// Read one CRLF-terminated line written by the client.
async fn read_line(panel: &mut DuplexStream) -> String {
    let mut line = Vec::new();
    loop {
        let byte = panel.read_u8().await.expect("client closed the stream");
        if byte == b'\n' {
            break;
        }
        line.push(byte);
    }
    String::from_utf8(line).unwrap().trim_end_matches('\r').to_string()
}

async fn send(panel: &mut DuplexStream, text: &str) {
    panel.write_all(text.as_bytes()).await.unwrap();
}

/// Accept the connection and answer the version probe sent by a client
/// without credentials.
async fn accept_without_login(panels: &mut mpsc::UnboundedReceiver<DuplexStream>) -> DuplexStream {
    let mut panel = panels.recv().await.unwrap();
    assert_eq!(read_line(&mut panel).await, "06vn0056");
    send(&mut panel, &frame("VN05020A01040C")).await;
    panel
}

/// Play a panel that closes its side once the client has shut down writing.
async fn close_after_client(mut panel: DuplexStream) {
    let mut rest = Vec::new();
    let _ = panel.read_to_end(&mut rest).await;
}

fn drain(events: &mut EventReceiver) -> Vec<String> {
    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(match event {
            ClientEvent::Message(m) => format!("message:{:?}", m.kind()),
            ClientEvent::Error(e) => format!("error:{}", e),
            other => format!("{:?}", other).to_lowercase(),
        });
    }
    names
}

async fn wait_for_disconnected(events: &mut EventReceiver) {
    tokio::time::timeout(WAIT, async {
        loop {
            if let Ok(ClientEvent::Disconnected) = events.recv().await {
                return;
            }
        }
    })
    .await
    .expect("client never disconnected");
}

#[tokio::test]
async fn test_ready_without_login() {
    let (client, _, mut panels) = client(None, None, false);
    let mut events = client.subscribe();

    let (result, _panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    assert_eq!(client.state(), ClientState::Ready);
    assert!(client.is_ready());
    assert!(!client.authenticated());

    let names = drain(&mut events);
    assert_eq!(
        names,
        vec!["connecting", "connected", "ready", "message:VersionNumber"]
    );
}

#[tokio::test]
async fn test_login_handshake() {
    let (client, _, mut panels) = client(Some("someone"), Some("supersecret"), false);
    let mut events = client.subscribe();

    let panel = async {
        let mut panel = panels.recv().await.unwrap();
        send(&mut panel, USERNAME_REQUEST).await;
        assert_eq!(read_line(&mut panel).await, "someone");
        send(&mut panel, PASSWORD_REQUEST).await;
        assert_eq!(read_line(&mut panel).await, "supersecret");
        send(&mut panel, LOGIN_SUCCESSFUL).await;
        panel
    };
    let (result, _panel) = tokio::join!(client.connect(), panel);
    result.unwrap();

    assert_eq!(client.state(), ClientState::Ready);
    assert!(client.authenticated());
    assert_eq!(
        drain(&mut events),
        vec!["connecting", "connected", "authenticating", "authenticated", "ready"]
    );
}

#[tokio::test]
async fn test_rejected_credentials() {
    let (client, _, mut panels) = client(Some("someone"), Some("wrong"), false);
    let mut events = client.subscribe();

    let panel = async {
        let mut panel = panels.recv().await.unwrap();
        send(&mut panel, USERNAME_REQUEST).await;
        read_line(&mut panel).await;
        send(&mut panel, PASSWORD_REQUEST).await;
        read_line(&mut panel).await;
        send(&mut panel, LOGIN_FAILURE).await;
        close_after_client(panel).await;
    };
    let (result, ()) = tokio::join!(client.connect(), panel);
    let err = result.unwrap_err();
    assert_eq!(
        err.authentication_reason(),
        Some(AuthenticationFailedReason::InvalidCredentials)
    );

    wait_for_disconnected(&mut events).await;
    assert_eq!(client.state(), ClientState::Disconnected);
    assert!(!client.authenticated());
}

#[tokio::test]
async fn test_missing_username_disconnects() {
    let (client, _, mut panels) = client(None, None, false);
    let mut events = client.subscribe();

    let panel = async {
        let mut panel = panels.recv().await.unwrap();
        send(&mut panel, USERNAME_REQUEST).await;
        close_after_client(panel).await;
    };
    let (result, ()) = tokio::join!(client.connect(), panel);
    assert!(matches!(
        result,
        Err(ElkError::AuthenticationFailed {
            reason: AuthenticationFailedReason::MissingUsername
        })
    ));

    wait_for_disconnected(&mut events).await;
    assert_eq!(client.connection().state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_missing_password_disconnects() {
    let (client, _, mut panels) = client(Some("someone"), None, false);

    let panel = async {
        let mut panel = panels.recv().await.unwrap();
        send(&mut panel, USERNAME_REQUEST).await;
        read_line(&mut panel).await;
        send(&mut panel, PASSWORD_REQUEST).await;
        close_after_client(panel).await;
    };
    let (result, ()) = tokio::join!(client.connect(), panel);
    assert_eq!(
        result.unwrap_err().authentication_reason(),
        Some(AuthenticationFailedReason::MissingPassword)
    );
}

#[tokio::test]
async fn test_concurrent_connects_share_one_socket() {
    let (client, factory, mut panels) = client(None, None, false);

    let (first, second, _panel) = tokio::join!(
        client.connect(),
        client.connect(),
        accept_without_login(&mut panels)
    );
    first.unwrap();
    second.unwrap();
    assert_eq!(factory.opens.load(Ordering::SeqCst), 1);

    // already ready
    client.connect().await.unwrap();
    assert_eq!(factory.opens.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connect_timeout_releases_connection() {
    let (client, _, _panels) = client(None, None, true);

    let err = client
        .connect_with_timeout(Duration::from_millis(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ElkError::Timeout { .. }));
    assert_eq!(client.connection().state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_disconnect_cancels_pending_connect() {
    let (client, factory, _panels) = client(None, None, true);

    let cancel = async {
        while client.connection().state() != ConnectionState::Connecting {
            tokio::task::yield_now().await;
        }
        client.disconnect().await;
    };
    let (result, ()) = tokio::join!(client.connect(), cancel);
    assert!(
        matches!(result, Err(ElkError::ConnectCancelled)),
        "unexpected result {result:?}"
    );
    assert_eq!(factory.opens.load(Ordering::SeqCst), 1);
    assert_eq!(client.connection().state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_connect_while_disconnecting_waits_for_close() {
    let (client, factory, mut panels) = client(None, None, false);
    let (result, panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let reconnect = async {
        while client.connection().state() != ConnectionState::Disconnecting {
            tokio::task::yield_now().await;
        }
        client.connect().await
    };
    let panel_side = async {
        let mut panel = panel;
        let mut rest = Vec::new();
        let _ = panel.read_to_end(&mut rest).await;
        // the old socket is still open, so no new one may have been made
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(factory.opens.load(Ordering::SeqCst), 1);
        drop(panel);
        accept_without_login(&mut panels).await
    };
    let ((), result, _panel) = tokio::join!(client.disconnect(), reconnect, panel_side);
    result.unwrap();
    assert_eq!(factory.opens.load(Ordering::SeqCst), 2);
    assert!(client.is_ready());
    assert_eq!(client.connection().state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let (client, factory, mut panels) = client(None, None, false);

    let (result, panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let mut events = client.subscribe();
    tokio::join!(client.disconnect(), close_after_client(panel));
    assert_eq!(client.connection().state(), ConnectionState::Disconnected);
    wait_for_disconnected(&mut events).await;
    assert_eq!(client.state(), ClientState::Disconnected);

    let (result, _panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();
    assert_eq!(factory.opens.load(Ordering::SeqCst), 2);
    assert!(client.is_ready());
}

#[tokio::test]
async fn test_response_matches_requested_zone() {
    let (client, _, mut panels) = client(None, None, false);
    let (result, mut panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let panel_side = async {
        let request = read_line(&mut panel).await;
        assert!(request.starts_with("09zv003"), "unexpected request {request}");
        let replies = format!("{}{}", frame("ZV002072"), frame("ZV003135"));
        send(&mut panel, &replies).await;
    };
    let (reply, ()) = tokio::join!(client.get_zone_voltage(3), panel_side);
    let reply = reply.unwrap();
    assert_eq!(reply.zone, 3);
    assert!((reply.voltage - 13.5).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_response_takes_first_match_only() {
    let (client, _, mut panels) = client(None, None, false);
    let (result, mut panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let panel_side = async {
        read_line(&mut panel).await;
        let replies = format!("{}{}", frame("ZV003135"), frame("ZV003072"));
        send(&mut panel, &replies).await;
        let request = read_line(&mut panel).await;
        assert!(request.starts_with("09zv003"), "unexpected request {request}");
        send(&mut panel, &frame("ZV003090")).await;
    };
    let requests = async {
        let first = client.get_zone_voltage(3).await.unwrap();
        let second = client.get_zone_voltage(3).await.unwrap();
        (first, second)
    };
    let ((first, second), ()) = tokio::join!(requests, panel_side);
    assert!((first.voltage - 13.5).abs() < f32::EPSILON);
    // the extra 7.2 V reply arrived before the second request was sent
    assert!((second.voltage - 9.0).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_function_key_press_matches_keypad_and_key() {
    let (client, _, mut panels) = client(None, None, false);
    let (result, mut panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let panel_side = async {
        let request = read_line(&mut panel).await;
        assert!(request.starts_with("09kf021"), "unexpected request {request}");
        let replies = format!(
            "{}{}{}",
            frame("KF01C20000000"),
            frame("KF02220000000"),
            frame("KF02120000000")
        );
        send(&mut panel, &replies).await;
    };
    let (reply, ()) = tokio::join!(client.press_keypad_function_key(2, FunctionKey::F1), panel_side);
    let reply = reply.unwrap();
    assert_eq!(reply.keypad, 2);
    assert_eq!(reply.key, FunctionKey::F1);
    assert_eq!(reply.chime_modes[0], 2);
}

#[tokio::test]
async fn test_set_thermostat_mode() {
    let (client, _, mut panels) = client(None, None, false);
    let (result, mut panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let panel_side = async {
        let request = read_line(&mut panel).await;
        assert!(request.starts_with("0Bts02040"), "unexpected request {request}");
        let replies = format!("{}{}", frame("TR0110072687500"), frame("TR0240072687500"));
        send(&mut panel, &replies).await;
    };
    let (reply, ()) = tokio::join!(
        client.set_thermostat_mode(2, ThermostatMode::EmergencyHeat),
        panel_side
    );
    let reply = reply.unwrap();
    assert_eq!(reply.thermostat, 2);
    assert_eq!(reply.mode, ThermostatMode::EmergencyHeat);
}

#[tokio::test]
async fn test_response_split_across_reads() {
    let (client, _, mut panels) = client(None, None, false);
    let (result, mut panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let panel_side = async {
        read_line(&mut panel).await;
        let reply = frame("CV0400042");
        let (head, tail) = reply.split_at(5);
        send(&mut panel, head).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        send(&mut panel, tail).await;
    };
    let (reply, ()) = tokio::join!(client.get_counter_value(4), panel_side);
    let reply = reply.unwrap();
    assert_eq!(reply.counter, 4);
    assert_eq!(reply.value, 42);
}

#[tokio::test]
async fn test_send_command_for_ok() {
    let (client, _, mut panels) = client(None, None, false);
    let (result, mut panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let panel_side = async {
        let request = read_line(&mut panel).await;
        assert!(request.starts_with("0Ele1100001"), "unexpected request {request}");
        send(&mut panel, "OK\r\n").await;
    };
    let (result, ()) = tokio::join!(client.write_system_log_data(1, 100, 1, 1), panel_side);
    result.unwrap();
}

#[tokio::test]
async fn test_response_timeout() {
    let (client, _, mut panels) = client(None, None, false);
    let (result, _panel) = tokio::join!(client.connect(), accept_without_login(&mut panels));
    result.unwrap();

    let err = client
        .send_command_for_response(
            &Command::ZoneStatusRequest,
            |message| matches!(message, ElkMessage::ZoneStatus(_)),
            Duration::from_millis(20),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ElkError::Timeout { .. }));
}

#[tokio::test]
async fn test_command_fails_when_disconnected() {
    let (client, _, _panels) = client(None, None, false);
    let err = client
        .send_command(&Command::ArmingStatusRequest)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ElkError::Write {
            state: ConnectionState::Disconnected
        }
    ));
}
