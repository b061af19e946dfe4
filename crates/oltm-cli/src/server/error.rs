use std::io;

use thiserror::Error;

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Failures while running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    pub fn bind_error(address: impl ToString, source: io::Error) -> Self {
        Self::BindError {
            address: address.to_string(),
            source,
        }
    }

    /// Returns a hint for the operator, when there is an obvious one.
    pub fn suggestion(&self) -> Option<&'static str> {
        let source = match self {
            Self::BindError { source, .. } | Self::Runtime(source) => source,
        };

        match source.kind() {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => {
                Some("The port is already in use. Try a different port or stop the conflicting service")
            }
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_in_use_has_suggestion() {
        let error = ServerError::bind_error(
            "127.0.0.1:5050",
            io::Error::from(io::ErrorKind::AddrInUse),
        );
        assert!(error.to_string().starts_with("Failed to bind to 127.0.0.1:5050"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn other_errors_have_no_suggestion() {
        let error = ServerError::Runtime(io::Error::other("boom"));
        assert!(error.suggestion().is_none());
    }
}
