/// Error types for the duel-arena library
use thiserror::Error;

/// Result type alias for arena operations
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Errors that can occur in duel-arena operations
#[derive(Debug, Error)]
pub enum ArenaError {
    /// IO error on the peer stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the stream
    #[error("Peer disconnected")]
    Disconnected,

    /// Malformed frame or unexpected message
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Field payload of the wrong size; there is no way to resynchronize
    #[error("Field desync: expected {expected} bytes, got {actual}")]
    Desync {
        /// Size both peers agreed on during the handshake
        expected: usize,
        /// Size actually received
        actual: usize,
    },

    /// Declared frame length above the configured limit
    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge {
        /// Declared payload length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Hello exchange failed or peers disagree on the field layout
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Invalid player name provided
    #[error("Invalid player name: {0}")]
    InvalidPlayerName(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operation timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ArenaError {
    fn from(e: serde_json::Error) -> Self {
        ArenaError::Serialization(e.to_string())
    }
}
