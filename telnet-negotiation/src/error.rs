//! Error types for the Telnet connection layer

use std::io;
use thiserror::Error;

/// Message carried by the not-ready error, also used when it is surfaced
/// through the `std::io` traits.
pub const NOT_READY_MESSAGE: &str = "telnet connection is not ready";

/// Errors produced by a Telnet [`Connection`](crate::Connection)
#[derive(Debug, Error)]
pub enum TelnetError {
    /// The connection was closed, torn down, or never finished setup
    #[error("telnet connection is not ready")]
    NotReady,

    /// Failure reported by the underlying transport, passed through verbatim
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A control sequence too short to be interpreted
    #[error("malformed telnet command: {0:?}")]
    MalformedCommand(Vec<u8>),
}

impl TelnetError {
    /// True for the not-ready error
    pub fn is_not_ready(&self) -> bool {
        matches!(self, TelnetError::NotReady)
    }
}

impl From<TelnetError> for io::Error {
    fn from(err: TelnetError) -> Self {
        match err {
            TelnetError::Io(err) => err,
            TelnetError::NotReady => io::Error::new(io::ErrorKind::NotConnected, NOT_READY_MESSAGE),
            TelnetError::MalformedCommand(_) => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

/// Result type alias for Telnet operations
pub type Result<T> = std::result::Result<T, TelnetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_display() {
        assert_eq!(TelnetError::NotReady.to_string(), NOT_READY_MESSAGE);
        assert!(TelnetError::NotReady.is_not_ready());
    }

    #[test]
    fn test_io_error_passes_through() {
        let err: io::Error = TelnetError::Io(io::Error::from(io::ErrorKind::BrokenPipe)).into();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_not_ready_maps_to_not_connected() {
        let err: io::Error = TelnetError::NotReady.into();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert_eq!(err.to_string(), NOT_READY_MESSAGE);
    }

    #[test]
    fn test_malformed_maps_to_invalid_data() {
        let err: io::Error = TelnetError::MalformedCommand(vec![255]).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
