//! Pool error types.

use thiserror::Error;

use crate::auth::AuthMechanism;
use crate::endpoint::Endpoint;

/// Errors surfaced by the connection pool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Dialing a new connection did not succeed.
    #[error("failed attempt to connect to {endpoint}; {message}")]
    ConnectFailed {
        /// Endpoint that was being dialed.
        endpoint: Endpoint,
        /// Underlying error text.
        message: String,
    },

    /// Authentication is required but no internal credentials are configured.
    #[error("missing credentials for authenticating as internal user")]
    MissingCredentials,

    /// The remote end rejected the configured credentials.
    #[error("authentication to {endpoint} failed: {message}")]
    AuthenticationFailed {
        /// Endpoint that rejected the credentials.
        endpoint: Endpoint,
        /// Underlying error text.
        message: String,
    },

    /// Invalid pool configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An endpoint string could not be parsed.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl PoolError {
    /// Whether this error is one of the authentication kinds.
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials | Self::AuthenticationFailed { .. }
        )
    }
}

/// Errors returned by [`Connection::authenticate`](crate::Connection::authenticate).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The server refused the credentials.
    #[error("credentials rejected: {0}")]
    Rejected(String),

    /// The server does not support the requested mechanism.
    #[error("unsupported authentication mechanism: {0}")]
    UnsupportedMechanism(AuthMechanism),

    /// IO error during the exchange.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_failed_message_names_endpoint() {
        let err = PoolError::ConnectFailed {
            endpoint: "db1.example.com:27017".parse().unwrap(),
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed attempt to connect to db1.example.com:27017; connection refused"
        );
        assert!(!err.is_authentication_error());
    }

    #[test]
    fn test_authentication_kinds() {
        assert!(PoolError::MissingCredentials.is_authentication_error());
        let err = PoolError::AuthenticationFailed {
            endpoint: Endpoint::new("h", 1),
            message: "bad password".into(),
        };
        assert!(err.is_authentication_error());
        assert!(!PoolError::Config("x".into()).is_authentication_error());
    }
}
