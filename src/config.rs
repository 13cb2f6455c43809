// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::*;
use crate::transport::discovery::ElkDeviceType;

/// TLS settings for secure connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// Verify the panel's certificate chain and host name. Off by default:
    /// M1XEP and C1M1 modules ship self-signed certificates.
    pub verify_certificates: bool,
    /// PEM bundle of additional trust anchors, used when verifying.
    pub ca_file: Option<PathBuf>,
    /// Name presented in SNI and checked against the certificate. Defaults to
    /// the connection host.
    pub server_name: Option<String>,
}

/// Configuration for the socket connection to a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Panel host name or IP address
    pub host: String,
    /// Panel TCP port (default: 2601 when secure, 2101 otherwise)
    pub port: u16,
    /// Whether to use TLS.
    ///
    /// Secure sessions negotiate TLS 1.2 or 1.3 only. Older M1XEP firmware
    /// that offers nothing newer than TLS 1.0 on port 2601 cannot be reached
    /// this way; connect to the plain port instead.
    pub secure: bool,
    pub tls: TlsOptions,
    /// Inactivity period after which the connection is torn down.
    /// `Duration::ZERO` disables the idle timer.
    pub idle_timeout: Duration,
    /// Default deadline for `connect()` and `disconnect()`
    pub connect_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_INSECURE_PORT,
            secure: false,
            tls: TlsOptions::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ConnectionOptions {
    /// Create a new options builder starting from defaults.
    pub fn builder() -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder::default()
    }

    /// `host:port` for display and socket connect.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Server name used for TLS.
    pub fn server_name(&self) -> &str {
        self.tls.server_name.as_deref().unwrap_or(&self.host)
    }
}

/// Builder for ConnectionOptions.
///
/// The port follows `secure` unless set explicitly.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptionsBuilder {
    options: ConnectionOptions,
    port: Option<u16>,
}

impl ConnectionOptionsBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.options.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.options.secure = secure;
        self
    }

    pub fn verify_certificates(mut self, verify: bool) -> Self {
        self.options.tls.verify_certificates = verify;
        self
    }

    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.tls.ca_file = Some(path.into());
        self
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.options.tls.server_name = Some(name.into());
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.options.idle_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    pub fn build(mut self) -> ConnectionOptions {
        self.options.port = self.port.unwrap_or(if self.options.secure {
            DEFAULT_SECURE_PORT
        } else {
            DEFAULT_INSECURE_PORT
        });
        self.options
    }
}

/// Configuration for a [`Client`](crate::Client) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub connection: ConnectionOptions,
    /// Username sent when the panel prompts for one (secure connections only)
    pub username: Option<String>,
    /// Password sent when the panel prompts for one
    pub password: Option<String>,
    /// Default deadline for correlated commands
    pub response_timeout: Duration,
    /// Default deadline for the whole connect and authenticate sequence
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connection: ConnectionOptions::default(),
            username: None,
            password: None,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            connect_timeout: DEFAULT_CLIENT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Create a new options builder starting from defaults.
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }
}

/// Builder for ClientOptions.
#[derive(Debug, Clone, Default)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    pub fn connection(mut self, connection: ConnectionOptions) -> Self {
        self.options.connection = connection;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.options.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.options.password = Some(password.into());
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.options.response_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> ClientOptions {
        self.options
    }
}

/// Configuration for UDP discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Address the probes are sent to
    pub broadcast_address: Ipv4Addr,
    /// UDP port the modules listen on
    pub port: u16,
    /// Local UDP port to bind; replies are sent back to it
    pub local_port: u16,
    /// How long to collect replies
    pub timeout: Duration,
    /// Device types to probe for
    pub device_types: Vec<ElkDeviceType>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            broadcast_address: Ipv4Addr::BROADCAST,
            port: DISCOVERY_PORT,
            local_port: DISCOVERY_PORT,
            timeout: DISCOVERY_TIMEOUT,
            device_types: vec![ElkDeviceType::M1Xep, ElkDeviceType::C1M1],
        }
    }
}

impl DiscoveryOptions {
    pub fn builder() -> DiscoveryOptionsBuilder {
        DiscoveryOptionsBuilder::default()
    }
}

/// Builder for DiscoveryOptions.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptionsBuilder {
    options: DiscoveryOptions,
}

impl DiscoveryOptionsBuilder {
    pub fn broadcast_address(mut self, address: Ipv4Addr) -> Self {
        self.options.broadcast_address = address;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    pub fn local_port(mut self, port: u16) -> Self {
        self.options.local_port = port;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn device_types(mut self, types: Vec<ElkDeviceType>) -> Self {
        self.options.device_types = types;
        self
    }

    pub fn build(self) -> DiscoveryOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_defaults() {
        let options = ConnectionOptions::default();
        assert_eq!(options.host, "192.168.0.251");
        assert_eq!(options.port, 2101);
        assert!(!options.secure);
        assert!(!options.tls.verify_certificates);
        assert_eq!(options.idle_timeout, Duration::from_secs(60));
        assert_eq!(options.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_port_follows_secure() {
        let options = ConnectionOptions::builder().secure(true).build();
        assert_eq!(options.port, 2601);

        let options = ConnectionOptions::builder().port(3000).secure(true).build();
        assert_eq!(options.port, 3000);
        assert_eq!(options.address(), "192.168.0.251:3000");
    }

    #[test]
    fn test_server_name_defaults_to_host() {
        let options = ConnectionOptions::builder().host("elk.local").build();
        assert_eq!(options.server_name(), "elk.local");

        let options = ConnectionOptions::builder()
            .host("10.0.0.5")
            .server_name("m1xep")
            .build();
        assert_eq!(options.server_name(), "m1xep");
    }

    #[test]
    fn test_client_builder() {
        let options = ClientOptions::builder()
            .connection(ConnectionOptions::builder().host("10.0.0.1").build())
            .username("someone")
            .password("supersecret")
            .response_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(options.connection.host, "10.0.0.1");
        assert_eq!(options.username.as_deref(), Some("someone"));
        assert_eq!(options.password.as_deref(), Some("supersecret"));
        assert_eq!(options.response_timeout, Duration::from_secs(5));
        assert_eq!(options.connect_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_discovery_defaults() {
        let options = DiscoveryOptions::default();
        assert_eq!(options.broadcast_address, Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(options.port, 2362);
        assert_eq!(options.device_types.len(), 2);
    }
}
