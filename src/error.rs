use std::time::Duration;
use thiserror::Error;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can occur when talking to a Skydance relay
#[derive(Error, Debug)]
pub enum RelayError {
    /// TCP connection could not be established within the timeout
    #[error("Connect timeout after {0:?}")]
    ConnectTimeout(Duration),

    /// I/O error on the underlying connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection was closed, or used after `close()`
    #[error("Connection closed")]
    ConnectionClosed,

    /// A reply frame did not match the layout expected for its command
    ///
    /// The relay occasionally answers a zone query with a frame for a
    /// different zone; that case lands here rather than producing a
    /// half-filled zone record.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
