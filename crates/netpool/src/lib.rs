//! # netpool
//!
//! Thread-safe pool of reusable outbound connections, keyed by remote
//! endpoint.
//!
//! Clients that issue many short requests to the same few servers pay for a
//! dial and an authentication handshake on every fresh connection. The pool
//! keeps released connections per endpoint and hands them back out while they
//! are younger than a maximum age, probing each one before reuse.
//!
//! ## Features
//!
//! - Per-endpoint idle lists with most-recently-released-first reuse
//! - Liveness probe and I/O timeout applied before every reuse
//! - Age-based expiry with an interval-gated sweep of quiet endpoints
//! - Internal-user authentication with mechanism fallback
//! - Pool-wide cancellation of in-flight connections
//! - Scoped handles that destroy by default and return on `finish`
//! - Status and metrics for observability
//!
//! ## Example
//!
//! ```rust,ignore
//! use netpool::{Pool, StaticCredentials};
//! use chrono::Utc;
//! use std::time::Duration;
//!
//! let pool = Pool::builder(connector)
//!     .credentials(StaticCredentials::new(credentials))
//!     .build()?;
//!
//! let endpoint = "db1.example.com:27017".parse()?;
//! let mut conn = pool.get(&endpoint, Utc::now(), Duration::from_secs(10)).await?;
//! conn.send(request).await?;
//!
//! // Only connections known to be in a clean state go back to the pool.
//! conn.finish(Utc::now());
//!
//! // Periodic maintenance
//! pool.clean_up_older_than(Utc::now());
//!
//! let status = pool.status();
//! println!("{} idle, {} in use", status.idle, status.in_use);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod pool;

// Configuration
pub use config::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_CONNECTION_AGE, PoolConfig};

// Error types
pub use error::{AuthError, PoolError};

// Addressing
pub use endpoint::{DEFAULT_PORT, Endpoint};

// Authentication
pub use auth::{AuthMechanism, CredentialSource, Credentials, NoAuth, StaticCredentials};

// Pool types
pub use pool::{Pool, PoolBuilder, PoolMetrics, PoolStatus, PooledConnection};

// Connection lifecycle
pub use lifecycle::{Connection, ConnectionId, ConnectionRecord, Connector, Shutdown};
