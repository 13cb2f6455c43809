// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::connection::ConnectionState;

/// Why an authentication attempt with the panel failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticationFailedReason {
    Unknown,
    /// The panel rejected the username/password pair.
    InvalidCredentials,
    /// The panel asked for a username but none was configured.
    MissingUsername,
    /// The panel asked for a password but none was configured.
    MissingPassword,
}

impl AuthenticationFailedReason {
    /// Human-readable description of the reason.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unknown => "authentication failed",
            Self::InvalidCredentials => "login failed, invalid username or password",
            Self::MissingUsername => "username was requested but none was provided",
            Self::MissingPassword => "password was requested but none was provided",
        }
    }
}

impl fmt::Display for AuthenticationFailedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// All errors that can occur in the elk-m1-client library.
///
/// Errors are `Clone` so they can be fanned out to every subscriber of the
/// connection and client event channels; I/O errors are shared behind an `Arc`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ElkError {
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("TLS error: {details}")]
    Tls { details: String },

    #[error("Operation timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("Connect was cancelled")]
    ConnectCancelled,

    #[error("Must be disconnected to connect (state: {state})")]
    NotConnectable { state: ConnectionState },

    #[error("Connection is not writable (state: {state})")]
    Write { state: ConnectionState },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: AuthenticationFailedReason },

    #[error("Invalid message: {details}")]
    InvalidMessage { details: String },

    #[error("Unexpected response: {details}")]
    UnexpectedResponse { details: String },

    #[error("Discovery failed: {reason}")]
    DiscoveryFailed { reason: String },

    #[error("Channel closed")]
    ChannelClosed,
}

impl From<std::io::Error> for ElkError {
    fn from(e: std::io::Error) -> Self {
        ElkError::Io(Arc::new(e))
    }
}

impl ElkError {
    /// Whether this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ElkError::Io(_)
                | ElkError::Timeout { .. }
                | ElkError::ConnectCancelled
                | ElkError::ChannelClosed
        )
    }

    /// The authentication failure reason, if this is an authentication error.
    pub fn authentication_reason(&self) -> Option<AuthenticationFailedReason> {
        match self {
            ElkError::AuthenticationFailed { reason } => Some(*reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ElkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_uses_millis() {
        let err = ElkError::Timeout {
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Operation timed out after 1500ms");
    }

    #[test]
    fn test_state_errors_carry_state() {
        let err = ElkError::NotConnectable {
            state: ConnectionState::Connected,
        };
        assert_eq!(err.to_string(), "Must be disconnected to connect (state: connected)");

        let err = ElkError::Write {
            state: ConnectionState::Disconnected,
        };
        assert_eq!(err.to_string(), "Connection is not writable (state: disconnected)");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ElkError::from(std::io::Error::from(std::io::ErrorKind::ConnectionReset)).is_retryable());
        assert!(ElkError::ConnectCancelled.is_retryable());
        assert!(!ElkError::AuthenticationFailed {
            reason: AuthenticationFailedReason::InvalidCredentials
        }
        .is_retryable());
    }

    #[test]
    fn test_authentication_reason() {
        let err = ElkError::AuthenticationFailed {
            reason: AuthenticationFailedReason::MissingPassword,
        };
        assert_eq!(
            err.authentication_reason(),
            Some(AuthenticationFailedReason::MissingPassword)
        );
        assert_eq!(ElkError::ChannelClosed.authentication_reason(), None);
    }
}
