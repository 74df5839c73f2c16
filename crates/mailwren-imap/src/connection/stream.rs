//! TLS stream setup for IMAP connections.
//!
//! Connections are implicit-TLS only, on the standard encrypted IMAP port.

#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::Result;

/// The standard encrypted IMAP port.
pub const IMAP_TLS_PORT: u16 = 993;

/// A TLS-encrypted IMAP stream.
pub type ImapStream = TlsStream<TcpStream>;

/// Creates a TLS connector with the bundled root certificates.
pub fn create_tls_connector() -> TlsConnector {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Connects to a server with TLS from the start.
pub async fn connect_tls(host: &str, port: u16) -> Result<ImapStream> {
    let addr = format!("{host}:{port}");
    let tcp = TcpStream::connect(&addr).await?;

    let connector = create_tls_connector();
    let server_name = ServerName::try_from(host.to_string())?;
    let tls = connector.connect(server_name, tcp).await?;

    Ok(tls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tls_connector() {
        // Root store construction must not panic with the bundled roots.
        let _connector = create_tls_connector();
    }
}
