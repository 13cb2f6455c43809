// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::config::{ConnectionOptions, TlsOptions};
use crate::error::{ElkError, Result};

fn tls_error(details: impl std::fmt::Display) -> ElkError {
    ElkError::Tls {
        details: details.to_string(),
    }
}

/// Accepts whatever certificate the panel presents. Signatures are still
/// checked so the handshake itself is sound.
#[derive(Debug)]
struct AcceptAnyServerCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

/// Trust anchors for verified connections: the public web roots plus any
/// certificates in the configured CA file.
fn root_store(options: &TlsOptions) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    if let Some(path) = &options.ca_file {
        let certs = CertificateDer::pem_file_iter(path)
            .map_err(|e| tls_error(format!("cannot read {}: {}", path.display(), e)))?;
        for cert in certs {
            let cert = cert.map_err(|e| tls_error(format!("bad PEM in {}: {}", path.display(), e)))?;
            roots.add(cert).map_err(tls_error)?;
        }
        debug!("Loaded CA certificates from {}", path.display());
    }
    Ok(roots)
}

/// Build the rustls client configuration for the given options.
pub fn client_config(options: &TlsOptions) -> Result<ClientConfig> {
    let provider = Arc::new(ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(tls_error)?;

    let config = if options.verify_certificates {
        builder
            .with_root_certificates(root_store(options)?)
            .with_no_client_auth()
    } else {
        if options.ca_file.is_some() {
            warn!("ca_file is ignored because certificate verification is disabled");
        }
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert(provider)))
            .with_no_client_auth()
    };
    Ok(config)
}

/// Run the TLS handshake over an open TCP stream.
pub async fn connect(stream: TcpStream, options: &ConnectionOptions) -> Result<TlsStream<TcpStream>> {
    let config = client_config(&options.tls)?;
    let server_name = ServerName::try_from(options.server_name().to_string())
        .map_err(|e| tls_error(format!("invalid server name {:?}: {}", options.server_name(), e)))?;

    let connector = TlsConnector::from(Arc::new(config));
    connector
        .connect(server_name, stream)
        .await
        .map_err(|e| tls_error(format!("handshake with {} failed: {}", options.address(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unverified_config_builds() {
        let config = client_config(&TlsOptions::default()).unwrap();
        assert!(config.alpn_protocols.is_empty());
    }

    #[test]
    fn test_verified_config_builds_without_ca_file() {
        let options = TlsOptions {
            verify_certificates: true,
            ..TlsOptions::default()
        };
        assert!(client_config(&options).is_ok());
    }

    #[test]
    fn test_missing_ca_file_is_tls_error() {
        let options = TlsOptions {
            verify_certificates: true,
            ca_file: Some("/nonexistent/elk-ca.pem".into()),
            server_name: None,
        };
        assert!(matches!(client_config(&options), Err(ElkError::Tls { .. })));
    }

    #[tokio::test]
    async fn test_handshake_with_plain_server_is_tls_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut hello = [0u8; 512];
            let _ = socket.read(&mut hello).await;
            let _ = socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
                .await;
        });

        let options = ConnectionOptions::builder()
            .host("127.0.0.1")
            .port(port)
            .secure(true)
            .build();
        let stream = TcpStream::connect(options.address()).await.unwrap();
        let err = connect(stream, &options).await.unwrap_err();
        assert!(matches!(err, ElkError::Tls { .. }), "unexpected error {err:?}");
        server.await.unwrap();
    }
}
