//! Connection capabilities and the record the pool stores for each connection.
//!
//! The pool does not know how to speak any wire protocol. It drives
//! connections through three small traits:
//!
//! - [`Connector`] dials a new connection to an [`Endpoint`].
//! - [`Connection`] is the live handle: liveness probe, I/O timeout,
//!   authentication, close, and an OR-able tag field.
//! - [`Shutdown`] forcibly shuts a transport down from another task while the
//!   owner is still using it.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use crate::auth::Credentials;
use crate::endpoint::Endpoint;
use crate::error::AuthError;

/// Dials new connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Open a connection to `endpoint` with `io_timeout` applied to sends and
    /// receives, including the dial itself.
    async fn connect(
        &self,
        endpoint: &Endpoint,
        io_timeout: Duration,
    ) -> io::Result<Self::Connection>;
}

/// A live connection to a single endpoint.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Probe the connection. `Ok(false)` and `Err(_)` both mean the connection
    /// must not be reused.
    async fn is_still_connected(&mut self) -> io::Result<bool>;

    /// Set the send and receive timeout.
    fn set_io_timeout(&mut self, timeout: Duration);

    /// Authenticate with the given credentials.
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), AuthError>;

    /// Close the connection. Called exactly once, right before the handle is
    /// dropped.
    fn close(&mut self);

    /// Endpoint this connection talks to.
    fn endpoint(&self) -> &Endpoint;

    /// OR additional tag bits into the connection's tag field.
    fn add_tags(&mut self, tags: u32);

    /// Current tag bits.
    fn tags(&self) -> u32;

    /// A handle that can shut the transport down from another task.
    fn shutdown_handle(&self) -> Arc<dyn Shutdown>;
}

/// Forcible transport shutdown.
///
/// After `shutdown` the owning connection's in-flight and subsequent I/O fails
/// and its liveness probe reports dead.
pub trait Shutdown: Send + Sync {
    /// Shut the transport down.
    fn shutdown(&self);
}

/// Pool-unique identifier of a connection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A connection together with its creation time.
///
/// Records are never cloned. Moving a record between the idle lists and a
/// caller is a Rust move, and [`Pool::release`](crate::Pool::release) and
/// [`Pool::destroy`](crate::Pool::destroy) consume it.
pub struct ConnectionRecord<T> {
    id: ConnectionId,
    conn: T,
    created_at: DateTime<Utc>,
}

impl<T: Connection> ConnectionRecord<T> {
    pub(crate) fn new(id: ConnectionId, conn: T, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            conn,
            created_at,
        }
    }

    /// Record id.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// When the connection was dialed.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Endpoint of the underlying connection.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        self.conn.endpoint()
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &T {
        &self.conn
    }

    /// The underlying connection, mutably.
    pub fn connection_mut(&mut self) -> &mut T {
        &mut self.conn
    }

    /// Whether the record may still be kept at `now`.
    ///
    /// A record expires once `created_at + max_age <= now`.
    pub(crate) fn should_keep(&self, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
        match self.created_at.checked_add_signed(max_age) {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }

    /// Close the connection and drop the record.
    pub(crate) fn close(mut self) {
        self.conn.close();
    }
}

impl<T: Connection> fmt::Debug for ConnectionRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("id", &self.id)
            .field("endpoint", self.conn.endpoint())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
