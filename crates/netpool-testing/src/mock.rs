//! Scriptable mock connector and connections.
//!
//! Every connection the [`MockConnector`] dials shares a [`MockLink`] with the
//! connector, so a test can kill, break or inspect a connection after the pool
//! has taken ownership of it.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use netpool::{AuthError, AuthMechanism, Connection, Connector, Credentials, Endpoint, Shutdown};
use parking_lot::Mutex;

/// Shared, externally controllable state of one mock connection.
#[derive(Debug)]
pub struct MockLink {
    serial: usize,
    endpoint: Endpoint,
    alive: AtomicBool,
    probe_error: AtomicBool,
    shut_down: AtomicBool,
    closed: AtomicBool,
    probes: AtomicUsize,
    io_timeout: Mutex<Option<Duration>>,
    authenticated_with: Mutex<Option<AuthMechanism>>,
}

impl MockLink {
    fn new(serial: usize, endpoint: Endpoint) -> Self {
        Self {
            serial,
            endpoint,
            alive: AtomicBool::new(true),
            probe_error: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
            io_timeout: Mutex::new(None),
            authenticated_with: Mutex::new(None),
        }
    }

    /// Dial order, starting at zero.
    pub fn serial(&self) -> usize {
        self.serial
    }

    /// Endpoint the connection was dialed to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Make the next liveness probe report the peer as gone.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Make the next liveness probe fail with an I/O error.
    pub fn break_probe(&self) {
        self.probe_error.store(true, Ordering::SeqCst);
    }

    /// Whether the transport was shut down through a [`Shutdown`] handle.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Whether [`Connection::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of liveness probes run against this connection.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// The I/O timeout most recently applied.
    pub fn io_timeout(&self) -> Option<Duration> {
        *self.io_timeout.lock()
    }

    /// Mechanism of the successful authentication, if any.
    pub fn authenticated_with(&self) -> Option<AuthMechanism> {
        *self.authenticated_with.lock()
    }

    fn connected(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
            && !self.shut_down.load(Ordering::SeqCst)
            && !self.closed.load(Ordering::SeqCst)
    }
}

impl Shutdown for MockLink {
    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

/// Scripted behaviour and counters shared by a connector and its connections.
#[derive(Debug, Default)]
struct Script {
    links: Mutex<Vec<Arc<MockLink>>>,
    refused: Mutex<HashSet<Endpoint>>,
    dial_delay: Mutex<Option<Duration>>,
    supported_mechanisms: Mutex<Option<Vec<AuthMechanism>>>,
    reject_auth: AtomicBool,
    dials: AtomicUsize,
    closes: AtomicUsize,
    auth_attempts: Mutex<Vec<AuthMechanism>>,
}

/// A connector producing [`MockConnection`]s.
///
/// Cloning shares the script and counters, so a test can keep a clone while
/// the pool owns the original.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    script: Arc<Script>,
}

impl MockConnector {
    /// Create a connector where every dial and authentication succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse dials to `endpoint`.
    pub fn refuse(&self, endpoint: &Endpoint) {
        self.script.refused.lock().insert(endpoint.clone());
    }

    /// Accept dials to `endpoint` again.
    pub fn accept(&self, endpoint: &Endpoint) {
        self.script.refused.lock().remove(endpoint);
    }

    /// Delay every dial, widening race windows in concurrency tests.
    pub fn set_dial_delay(&self, delay: Duration) {
        *self.script.dial_delay.lock() = Some(delay);
    }

    /// Restrict the mechanisms the mock servers support.
    pub fn support_only(&self, mechanisms: &[AuthMechanism]) {
        *self.script.supported_mechanisms.lock() = Some(mechanisms.to_vec());
    }

    /// Reject every authentication attempt.
    pub fn reject_auth(&self) {
        self.script.reject_auth.store(true, Ordering::SeqCst);
    }

    /// Number of dial attempts, successful or not.
    pub fn dials(&self) -> usize {
        self.script.dials.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn closes(&self) -> usize {
        self.script.closes.load(Ordering::SeqCst)
    }

    /// Mechanisms tried by authentication, in order.
    pub fn auth_attempts(&self) -> Vec<AuthMechanism> {
        self.script.auth_attempts.lock().clone()
    }

    /// All connections dialed so far, in dial order.
    pub fn links(&self) -> Vec<Arc<MockLink>> {
        self.script.links.lock().clone()
    }

    /// The connection dialed `serial`-th, if any.
    pub fn link(&self, serial: usize) -> Option<Arc<MockLink>> {
        self.script.links.lock().get(serial).cloned()
    }

    /// Number of connections dialed and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.script
            .links
            .lock()
            .iter()
            .filter(|l| !l.is_closed())
            .count()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, endpoint: &Endpoint, io_timeout: Duration) -> io::Result<MockConnection> {
        self.script.dials.fetch_add(1, Ordering::SeqCst);

        let delay = *self.script.dial_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.script.refused.lock().contains(endpoint) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ));
        }

        let link = {
            let mut links = self.script.links.lock();
            let link = Arc::new(MockLink::new(links.len(), endpoint.clone()));
            links.push(Arc::clone(&link));
            link
        };
        *link.io_timeout.lock() = Some(io_timeout);
        tracing::trace!(endpoint = %endpoint, serial = link.serial, "mock connection dialed");

        Ok(MockConnection {
            link,
            tags: 0,
            script: Arc::clone(&self.script),
        })
    }
}

/// A connection produced by [`MockConnector`].
#[derive(Debug)]
pub struct MockConnection {
    link: Arc<MockLink>,
    tags: u32,
    script: Arc<Script>,
}

impl MockConnection {
    /// The shared link of this connection.
    pub fn link(&self) -> &Arc<MockLink> {
        &self.link
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn is_still_connected(&mut self) -> io::Result<bool> {
        self.link.probes.fetch_add(1, Ordering::SeqCst);
        // Give other tasks a chance to run while "on the wire".
        tokio::task::yield_now().await;
        if self.link.probe_error.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        Ok(self.link.connected())
    }

    fn set_io_timeout(&mut self, timeout: Duration) {
        *self.link.io_timeout.lock() = Some(timeout);
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), AuthError> {
        let mechanism = credentials.mechanism();
        self.script.auth_attempts.lock().push(mechanism);

        if self.script.reject_auth.load(Ordering::SeqCst) {
            return Err(AuthError::Rejected(format!(
                "authentication failed for user {}",
                credentials.user()
            )));
        }
        let supported = self
            .script
            .supported_mechanisms
            .lock()
            .as_ref()
            .is_none_or(|m| m.contains(&mechanism));
        if !supported {
            return Err(AuthError::UnsupportedMechanism(mechanism));
        }

        *self.link.authenticated_with.lock() = Some(mechanism);
        Ok(())
    }

    fn close(&mut self) {
        if !self.link.closed.swap(true, Ordering::SeqCst) {
            self.script.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn endpoint(&self) -> &Endpoint {
        &self.link.endpoint
    }

    fn add_tags(&mut self, tags: u32) {
        self.tags |= tags;
    }

    fn tags(&self) -> u32 {
        self.tags
    }

    fn shutdown_handle(&self) -> Arc<dyn Shutdown> {
        Arc::clone(&self.link) as Arc<dyn Shutdown>
    }
}
