//! Common error types for the Wharf tools.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`WharfError`].
pub type WharfResult<T> = Result<T, WharfError>;

/// Common errors across the Wharf crates.
#[derive(Error, Diagnostic, Debug)]
pub enum WharfError {
    /// Invalid protocol-qualified port identifier.
    #[error("Invalid port identifier: {value}")]
    #[diagnostic(
        code(wharf::port::invalid),
        help("Ports are written as '<port>/tcp' or '<port>/udp' with a port between 1 and 65535")
    )]
    InvalidPort {
        /// The invalid value.
        value: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(wharf::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(wharf::serialization))]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(wharf::config),
        help("Check the docker.network section of the configuration file")
    )]
    Config {
        /// The error message.
        message: String,
    },
}

impl From<serde_json::Error> for WharfError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for WharfError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WharfError::InvalidPort {
            value: "80/sctp".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid port identifier: 80/sctp");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WharfError = io_err.into();
        assert!(matches!(err, WharfError::Io(_)));
    }

    #[test]
    fn error_from_json() {
        let json_err = serde_json::from_str::<u16>("not json").unwrap_err();
        let err: WharfError = json_err.into();
        assert!(matches!(err, WharfError::Serialization(_)));
    }

    #[test]
    fn error_from_yaml_is_config() {
        let yaml_err = serde_yaml::from_str::<u16>("[unclosed").unwrap_err();
        let err: WharfError = yaml_err.into();
        assert!(matches!(err, WharfError::Config { .. }));
    }
}
