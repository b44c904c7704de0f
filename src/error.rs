//! Error types for the flipperzero-client library.

use thiserror::Error;

/// The main error type for Flipper Zero operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection could not be established or was lost mid-command.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// A command was attempted while disconnected.
    #[error("not connected")]
    NotConnected,

    /// No terminal response line arrived within the time budget.
    #[error("command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The device replied, but the response signalled failure.
    ///
    /// Carries the full accumulated response text.
    #[error("command failed: {response}")]
    Command { response: String },
}

impl Error {
    /// Returns true for the connection family of failures.
    ///
    /// These always leave the session disconnected, unlike [`Error::Timeout`]
    /// and [`Error::Command`] which leave the link usable.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Serial(_) | Self::Io(_) | Self::Connection { .. } | Self::NotConnected
        )
    }
}

/// Result type alias for Flipper Zero operations.
pub type Result<T> = std::result::Result<T, Error>;
