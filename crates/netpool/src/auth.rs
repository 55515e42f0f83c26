//! Credentials used to authenticate pooled connections as the internal user.
//!
//! The pool never decides *whether* authentication is needed on its own. It
//! asks a [`CredentialSource`] once per dialed connection, and if the source
//! says authentication is required it authenticates with the source's internal
//! credentials before handing the connection out.
//!
//! ## Example
//!
//! ```rust
//! use netpool::{AuthMechanism, CredentialSource, Credentials, StaticCredentials};
//!
//! let creds = Credentials::new("__system", "s3cret", AuthMechanism::ScramSha256)
//!     .with_fallback(AuthMechanism::ScramSha1);
//! let source = StaticCredentials::new(creds);
//!
//! assert!(source.is_auth_required());
//! assert!(source.has_internal_credentials());
//! ```

use std::fmt;

/// Authentication mechanism negotiated with the remote server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AuthMechanism {
    /// SCRAM with SHA-256.
    ScramSha256,
    /// SCRAM with SHA-1.
    ScramSha1,
    /// Client certificate (X.509) authentication.
    X509,
    /// Plain username/password (LDAP proxy).
    Plain,
}

impl fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::ScramSha1 => "SCRAM-SHA-1",
            Self::X509 => "X509",
            Self::Plain => "PLAIN",
        };
        f.write_str(name)
    }
}

/// Internal-user credentials.
///
/// Carries an optional fallback mechanism that is tried when the server
/// does not support the primary one.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
    mechanism: AuthMechanism,
    fallback: Option<AuthMechanism>,
}

impl Credentials {
    /// Create credentials for the given user and mechanism.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        mechanism: AuthMechanism,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            mechanism,
            fallback: None,
        }
    }

    /// Set a fallback mechanism.
    #[must_use]
    pub fn with_fallback(mut self, mechanism: AuthMechanism) -> Self {
        self.fallback = Some(mechanism);
        self
    }

    /// User name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Primary mechanism.
    #[must_use]
    pub fn mechanism(&self) -> AuthMechanism {
        self.mechanism
    }

    /// Fallback mechanism, if any.
    #[must_use]
    pub fn fallback(&self) -> Option<AuthMechanism> {
        self.fallback
    }

    /// The credentials to try, in order: the primary mechanism, then the
    /// fallback mechanism if one is set and differs from the primary.
    pub fn attempts(&self) -> impl Iterator<Item = Credentials> + '_ {
        let fallback = self
            .fallback
            .filter(|m| *m != self.mechanism)
            .map(|mechanism| Credentials {
                mechanism,
                fallback: None,
                ..self.clone()
            });
        std::iter::once(Credentials {
            fallback: None,
            ..self.clone()
        })
        .chain(fallback)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("mechanism", &self.mechanism)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Source of the internal-user credentials and the global auth switch.
pub trait CredentialSource: Send + Sync {
    /// Whether connections must authenticate before use.
    fn is_auth_required(&self) -> bool;

    /// Whether internal credentials have been configured.
    fn has_internal_credentials(&self) -> bool {
        self.internal_credentials().is_some()
    }

    /// The configured internal credentials.
    fn internal_credentials(&self) -> Option<Credentials>;
}

/// A credential source for deployments without authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl CredentialSource for NoAuth {
    fn is_auth_required(&self) -> bool {
        false
    }

    fn internal_credentials(&self) -> Option<Credentials> {
        None
    }
}

/// A credential source with fixed settings.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    required: bool,
    credentials: Option<Credentials>,
}

impl StaticCredentials {
    /// Require authentication with the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            required: true,
            credentials: Some(credentials),
        }
    }

    /// Require authentication without any credentials configured.
    ///
    /// Every dial fails with [`PoolError::MissingCredentials`](crate::PoolError::MissingCredentials).
    pub fn required_without_credentials() -> Self {
        Self {
            required: true,
            credentials: None,
        }
    }
}

impl CredentialSource for StaticCredentials {
    fn is_auth_required(&self) -> bool {
        self.required
    }

    fn internal_credentials(&self) -> Option<Credentials> {
        self.credentials.clone()
    }
}
