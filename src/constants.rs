// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::time::Duration;

/// The panel sends this when prompting for a username.
pub const USERNAME_REQUEST: &str = "\r\nUsername: ";

/// The panel sends this when prompting for a password.
pub const PASSWORD_REQUEST: &str = "\r\nPassword: ";

/// The panel sends this when logging in fails.
pub const LOGIN_FAILURE: &str = "\r\nUsername/Password not found.\r\n";

/// The panel sends this when logging in succeeds.
pub const LOGIN_SUCCESSFUL: &str = "\r\nElk-M1XEP: Login successful.\r\n";

/// Line terminator for everything written to the panel.
pub const CRLF: &str = "\r\n";

/// Bare acknowledgement some commands (e.g. log writes) receive instead of a
/// framed reply.
pub const OK_RESPONSE: &str = "OK";

/// Address the M1XEP assigns itself without DHCP or after a reset.
pub const DEFAULT_HOST: &str = "192.168.0.251";
pub const DEFAULT_INSECURE_PORT: u16 = 2101;
pub const DEFAULT_SECURE_PORT: u16 = 2601;

/// The panel sends an ethernet test ("XK") every 30s, so a minute of silence
/// means the link is dead.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);
/// Client connect timeout; includes authentication.
pub const DEFAULT_CLIENT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Capacity of the connection and client broadcast channels.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Read buffer size for the socket reader task.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Unterminated text beyond this is discarded. The longest packet is 257
/// characters.
pub const MAX_PARTIAL_LINE: usize = 1024;

/// UDP port used for discovery requests and replies.
pub const DISCOVERY_PORT: u16 = 2362;
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe payload answered by C1M1 communicators.
pub const C1M1_DISCOVERY_ID: &[u8] = b"C1M1ID";
/// Probe payload answered by M1XEP ethernet modules.
pub const M1XEP_DISCOVERY_ID: &[u8] = b"XEPID";

/// Five-byte tag at the start of a C1M1 discovery reply.
pub const C1M1_REPLY_TAG: &[u8; 5] = b"C1M1 ";
/// Five-byte tag at the start of an M1XEP discovery reply.
pub const M1XEP_REPLY_TAG: &[u8; 5] = b"M1XEP";

/// Number of zones, outputs and other 208-entry tables on an M1.
pub const MAX_ZONES: usize = 208;
pub const MAX_AREAS: usize = 8;
pub const MAX_KEYPADS: usize = 16;
pub const MAX_OUTPUTS: usize = 208;
