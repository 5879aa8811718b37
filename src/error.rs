//! Error types for the handshake, authorization and transfer stages.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a single connection before any file I/O.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Peer closed its side before both handshake fields arrived.
    #[error("connection closed before handshake completed")]
    PrematureClose,

    /// Command field is not exactly `GET` or `PUT`.
    #[error("invalid command {0:?}")]
    InvalidCommand(String),

    /// No location delimiter within the accepted length.
    #[error("location exceeds {max} bytes")]
    LocationTooLong { max: usize },

    /// Location is not `address:path` (or not UTF-8).
    #[error("malformed location {0:?}: expected address:path")]
    MalformedLocation(String),

    /// Requested path is outside the served root.
    #[error("illegal path {0}")]
    IllegalPath(String),

    #[error("connection I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures while streaming file content.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("cannot open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transfer I/O error: {0}")]
    Io(#[from] io::Error),
}
