//! Remote endpoint addressing.

use std::fmt;
use std::str::FromStr;

use crate::error::PoolError;

/// Port used when an endpoint string carries no explicit port.
pub const DEFAULT_PORT: u16 = 27017;

/// A remote server address (host + port).
///
/// Endpoints key the per-host idle lists, so two endpoints compare equal only
/// when both host and port match exactly. Host names are not resolved or
/// case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint from a host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or IP address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port number.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = PoolError;

    /// Parse `host`, `host:port`, `[v6addr]` or `[v6addr]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PoolError::InvalidEndpoint("empty endpoint".into()));
        }

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| PoolError::InvalidEndpoint(format!("unclosed bracket: {s}")))?;
            let port = match after {
                "" => None,
                p => Some(p.strip_prefix(':').ok_or_else(|| {
                    PoolError::InvalidEndpoint(format!("unexpected text after address: {s}"))
                })?),
            };
            (host, port)
        } else {
            match s.rsplit_once(':') {
                // A bare IPv6 address has several colons and must be bracketed.
                Some((host, _)) if host.contains(':') => {
                    return Err(PoolError::InvalidEndpoint(format!(
                        "IPv6 address must be bracketed: {s}"
                    )));
                }
                Some((host, port)) => (host, Some(port)),
                None => (s, None),
            }
        };

        if host.is_empty() {
            return Err(PoolError::InvalidEndpoint(format!("missing host: {s}")));
        }
        if host.chars().any(|c| c.is_whitespace() || c == '[' || c == ']') {
            return Err(PoolError::InvalidEndpoint(format!("invalid host: {host}")));
        }

        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| PoolError::InvalidEndpoint(format!("invalid port: {p}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self::new(host, port))
    }
}
