//! Foundation types and traits for skein.
//!
//! This crate holds the pieces shared by the networking and browser
//! crates: the error taxonomy, the byte-stream trait the transport talks
//! through, and the TLS provider seam.

pub mod error;
pub mod stream;
pub mod tls;
