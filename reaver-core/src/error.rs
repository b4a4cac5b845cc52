//! Error types for reaver-rs

use thiserror::Error;

/// Result type alias for reaver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for reaver-rs
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Packet parsing error
    #[error("Packet parsing error: {0}")]
    PacketParsing(String),

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// A capture-layer length field contradicts the packet itself.
    ///
    /// Unlike every other malformed-input case this is not locally
    /// recoverable: the capture stream can no longer be trusted and the
    /// process is expected to abort.
    #[error("Corrupt capture data: {0}")]
    CorruptCapture(String),

    /// Packet capture error
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// Session file error
    #[error("Session error: {0}")]
    Session(String),

    /// Pixie-dust solver error
    #[error("Pixie solver error: {0}")]
    Pixie(String),

    /// WPS registrar error
    #[error("Registrar error: {0}")]
    Registrar(String),

    /// Frame transmission error
    #[error("Transmit error: {0}")]
    Transmit(String),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl Error {
    /// Create a packet parsing error with a custom message
    pub fn parsing<S: Into<String>>(msg: S) -> Self {
        Error::PacketParsing(msg.into())
    }

    /// Create a session error with a custom message
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Error::Session(msg.into())
    }

    /// Create a pixie error with a custom message
    pub fn pixie<S: Into<String>>(msg: S) -> Self {
        Error::Pixie(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
