//! Networking: blocking std TCP streams and the rustls TLS provider.

mod std_stream;
#[cfg(feature = "tls-rustls")]
pub mod tls_rustls;

pub use skein_types::tls::TlsProvider;
pub use std_stream::{StdNetworkStream, tcp_connect};
#[cfg(feature = "tls-rustls")]
pub use tls_rustls::RustlsTlsProvider;
