// MIT License - Copyright (c) 2026 elk-m1-client contributors

use tokio::net::TcpStream;
use tracing::{debug, error};

use crate::config::ConnectionOptions;
use crate::transport::{tls, BoxedStream, OpenFuture, SocketFactory};

/// Opens TCP connections to the panel, wrapped in TLS when
/// `ConnectionOptions::secure` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetSocketFactory;

impl SocketFactory for NetSocketFactory {
    fn open<'a>(&'a self, options: &'a ConnectionOptions) -> OpenFuture<'a> {
        Box::pin(async move {
            let address = options.address();
            debug!("Opening TCP socket to {}", address);

            let stream = TcpStream::connect(&address).await.map_err(|e| {
                error!("TCP connect to {} failed: {}", address, e);
                e
            })?;
            // the panel protocol is small request/reply lines
            stream.set_nodelay(true)?;

            if !options.secure {
                return Ok(Box::new(stream) as BoxedStream);
            }

            let stream = tls::connect(stream, options).await?;
            debug!("TLS session established with {}", address);
            Ok(Box::new(stream) as BoxedStream)
        })
    }
}
