use std::io;

use telnet_negotiation::TelnetError;
use thiserror::Error;

/// Errors while loading `telnet-client.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Custom error types for the telnet client
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O related errors (network, terminal)
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The protocol layer failed
    #[error("telnet error: {0}")]
    Telnet(TelnetError),

    /// The server went away
    #[error("server disconnected")]
    Disconnected,

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Bad command line
    #[error("usage: {0}")]
    Usage(String),
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        use io::ErrorKind;

        match err.kind() {
            ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
                ClientError::Disconnected
            }
            _ => ClientError::Io(err),
        }
    }
}

impl From<TelnetError> for ClientError {
    fn from(err: TelnetError) -> Self {
        match err {
            TelnetError::Io(e) => e.into(),
            other => ClientError::Telnet(other),
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_kinds() {
        for kind in [
            io::ErrorKind::UnexpectedEof,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted,
        ] {
            let err: ClientError = io::Error::from(kind).into();
            assert!(matches!(err, ClientError::Disconnected));
        }

        let err: ClientError = io::Error::from(io::ErrorKind::PermissionDenied).into();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn test_telnet_io_error_is_unwrapped() {
        let err: ClientError =
            TelnetError::Io(io::Error::from(io::ErrorKind::ConnectionReset)).into();
        assert!(matches!(err, ClientError::Disconnected));

        let err: ClientError = TelnetError::NotReady.into();
        assert_eq!(
            err.to_string(),
            "telnet error: telnet connection is not ready"
        );
    }
}
