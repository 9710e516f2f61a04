//! Error types for skein.

use std::io;

/// Errors produced while resolving, fetching, or decoding a document.
#[derive(Debug, thiserror::Error)]
pub enum SkeinError {
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("bad status line: {0}")]
    BadStatusLine(String),

    #[error("unexpected status: {code} {reason}")]
    UnexpectedStatus { code: u16, reason: String },

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SkeinError {
    /// True when the error came from a missing local file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SkeinError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SkeinError>;
