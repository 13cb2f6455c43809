// MIT License - Copyright (c) 2026 elk-m1-client contributors

pub mod discovery;
pub mod socket;
pub mod tls;

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::ConnectionOptions;
use crate::error::Result;

pub use socket::NetSocketFactory;

/// A duplex byte stream to the panel.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

pub type BoxedStream = Box<dyn AsyncStream>;

pub type OpenFuture<'a> = Pin<Box<dyn Future<Output = Result<BoxedStream>> + Send + 'a>>;

/// Creates the byte stream a [`Connection`](crate::connection::Connection)
/// runs over.
///
/// The default is [`NetSocketFactory`] (TCP, optionally TLS). Tests plug in
/// in-memory streams here.
pub trait SocketFactory: Send + Sync {
    /// Open a stream using the given options. The future resolves once the
    /// stream is ready for reading and writing.
    fn open<'a>(&'a self, options: &'a ConnectionOptions) -> OpenFuture<'a>;
}

/// Lifecycle flags of the live transport handle. The connection state is
/// derived from these alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleFlags {
    /// The factory has not finished opening the stream.
    pub connecting: bool,
    /// The read side is open.
    pub readable: bool,
    /// The write side is open.
    pub writable: bool,
    /// The handle was torn down.
    pub destroyed: bool,
}

impl HandleFlags {
    /// Flags of a handle whose stream is still being opened.
    pub fn opening() -> Self {
        Self {
            connecting: true,
            ..Self::default()
        }
    }

    /// Flags of a handle with an open, duplex stream.
    pub fn open() -> Self {
        Self {
            readable: true,
            writable: true,
            ..Self::default()
        }
    }
}
