//! [`TlsProvider`] backed by rustls + ring.
//!
//! Enabled by the `tls-rustls` feature.

use std::io::{self, Read, Write};
use std::sync::Arc;

use rustls::ClientConfig;
use rustls_pki_types::ServerName;

use skein_types::error::{Result, SkeinError};
use skein_types::stream::{IoAdapter, NetworkStream};
use skein_types::tls::TlsProvider;

/// Shared, reusable TLS client configuration (one per process).
pub struct RustlsTlsProvider {
    config: Arc<ClientConfig>,
}

impl RustlsTlsProvider {
    /// Build a provider that trusts Mozilla's root CA bundle.
    pub fn new() -> Self {
        let root_store =
            rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for RustlsTlsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsProvider for RustlsTlsProvider {
    fn connect_tls(
        &self,
        stream: Box<dyn NetworkStream>,
        server_name: &str,
    ) -> Result<Box<dyn NetworkStream>> {
        let sni = ServerName::try_from(server_name.to_owned())
            .map_err(|e| SkeinError::Connection(format!("invalid server name: {e}")))?;

        let conn = rustls::ClientConnection::new(Arc::clone(&self.config), sni)
            .map_err(|e| SkeinError::Connection(format!("TLS init: {e}")))?;

        let stream = RustlsStream::handshake(conn, stream)?;
        log::debug!("TLS session established with {server_name}");
        Ok(Box::new(stream))
    }
}

// ---------------------------------------------------------------------------
// Adapter: drive a rustls session over a `NetworkStream`
// ---------------------------------------------------------------------------

/// A TLS-wrapped network stream over blocking I/O.
struct RustlsStream {
    tls: rustls::ClientConnection,
    inner: Box<dyn NetworkStream>,
}

impl RustlsStream {
    /// Run the handshake to completion so callers get a ready stream.
    fn handshake(
        mut tls: rustls::ClientConnection,
        mut inner: Box<dyn NetworkStream>,
    ) -> Result<Self> {
        {
            let mut adapter = IoAdapter::new(&mut *inner);
            while tls.is_handshaking() {
                tls.complete_io(&mut adapter)
                    .map_err(|e| SkeinError::Connection(format!("TLS handshake: {e}")))?;
            }
        }
        Ok(Self { tls, inner })
    }

    /// Send any ciphertext rustls has queued.
    fn flush_tls(&mut self) -> Result<()> {
        let mut adapter = IoAdapter::new(&mut *self.inner);
        while self.tls.wants_write() {
            self.tls
                .write_tls(&mut adapter)
                .map_err(|e| SkeinError::Connection(format!("TLS write_tls: {e}")))?;
        }
        Ok(())
    }
}

impl NetworkStream for RustlsStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.tls.reader().read(buf) {
                Ok(n) => return Ok(n),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {},
                // Peer closed without close_notify: treat as end of stream.
                Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(0),
                Err(e) => return Err(SkeinError::Connection(format!("TLS read: {e}"))),
            }

            let read = {
                let mut adapter = IoAdapter::new(&mut *self.inner);
                self.tls.read_tls(&mut adapter)?
            };
            if read == 0 {
                return Ok(0);
            }
            self.tls
                .process_new_packets()
                .map_err(|e| SkeinError::Connection(format!("TLS process: {e}")))?;
            self.flush_tls()?;
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let n = self
            .tls
            .writer()
            .write(data)
            .map_err(|e| SkeinError::Connection(format!("TLS write: {e}")))?;
        self.flush_tls()?;
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        self.tls.send_close_notify();
        let _ = self.flush_tls();
        self.inner.close()
    }
}
