//! TLS provider abstraction.
//!
//! Hosts supply a [`TlsProvider`] that wraps a plain TCP
//! [`NetworkStream`] in a TLS session. The transport client only talks to
//! this trait, so it never depends on a concrete TLS library.

use crate::error::Result;
use crate::stream::NetworkStream;

/// Provides TLS client connections.
pub trait TlsProvider: Send + Sync {
    /// Wrap `stream` in a TLS client session, performing the handshake.
    ///
    /// `server_name` is used for SNI and certificate verification.
    fn connect_tls(
        &self,
        stream: Box<dyn NetworkStream>,
        server_name: &str,
    ) -> Result<Box<dyn NetworkStream>>;
}
