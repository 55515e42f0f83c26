//! Connection pool implementation.
//!
//! All pool state sits behind a single mutex. The lock is never held across
//! network I/O: an idle record is moved out of its idle list and registered as
//! in use while the lock is held, and only then probed. No other task can reach
//! the record during that unlocked window.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::auth::{CredentialSource, NoAuth};
use crate::config::{PoolConfig, Timings};
use crate::endpoint::Endpoint;
use crate::error::{AuthError, PoolError};
use crate::lifecycle::{Connection, ConnectionId, ConnectionRecord, Connector, Shutdown};

/// A pool of reusable connections keyed by endpoint.
///
/// Idle connections are kept per endpoint, most recently released first, and
/// are handed out only while younger than the configured maximum age. A
/// checked-out connection is returned with [`release`](Pool::release) or
/// discarded with [`destroy`](Pool::destroy); [`PooledConnection`] does one of
/// the two automatically.
///
/// # Example
///
/// ```rust,ignore
/// use netpool::{Pool, PoolConfig};
/// use std::time::Duration;
///
/// let pool = Pool::builder(connector)
///     .credentials(credentials)
///     .tags(TAG_INTERNAL)
///     .build()?;
///
/// let endpoint = "db1.example.com:27017".parse()?;
/// let mut conn = pool.get(&endpoint, Utc::now(), Duration::from_secs(10)).await?;
/// conn.send(request).await?;
/// // Return the connection for reuse. Dropping it instead closes it.
/// conn.finish(Utc::now());
/// ```
pub struct Pool<C: Connector> {
    config: PoolConfig,
    timings: Timings,
    connector: C,
    credentials: Arc<dyn CredentialSource>,

    /// Counter for generating connection IDs.
    next_connection_id: AtomicU64,

    /// When the pool was created.
    created_at: Instant,

    state: Mutex<PoolState<C::Connection>>,
}

/// Everything guarded by the pool lock.
struct PoolState<T> {
    /// Idle connections per endpoint, most recently released first.
    idle: HashMap<Endpoint, VecDeque<ConnectionRecord<T>>>,

    /// Connections currently checked out.
    in_use: HashMap<ConnectionId, InUseEntry>,

    /// Last release time per endpoint. An endpoint without an entry is never
    /// considered stale by the sweep.
    last_used: HashMap<Endpoint, DateTime<Utc>>,

    /// When the last stale-host sweep ran.
    last_clean_up: DateTime<Utc>,

    metrics: PoolMetricsInner,
}

/// Bookkeeping for a checked-out connection.
struct InUseEntry {
    endpoint: Endpoint,
    shutdown: Arc<dyn Shutdown>,
}

/// Internal metrics tracking.
#[derive(Debug, Default)]
struct PoolMetricsInner {
    /// Total connections dialed and handed out.
    connections_created: u64,
    /// Total connections closed.
    connections_closed: u64,
    /// Connections closed because they exceeded the maximum age.
    connections_expired: u64,
    /// Total successful checkouts.
    checkouts_successful: u64,
    /// Total failed checkouts (dial or authentication errors).
    checkouts_failed: u64,
    /// Checkouts served from an idle list.
    reuses: u64,
    /// Liveness probes performed on idle candidates.
    health_checks_performed: u64,
    /// Liveness probes that reported dead or errored.
    health_checks_failed: u64,
    /// Stale-host sweeps run.
    sweeps: u64,
}

impl<T: Connection> PoolState<T> {
    fn new() -> Self {
        Self {
            idle: HashMap::new(),
            in_use: HashMap::new(),
            last_used: HashMap::new(),
            last_clean_up: DateTime::<Utc>::MIN_UTC,
            metrics: PoolMetricsInner::default(),
        }
    }

    fn register(&mut self, record: &ConnectionRecord<T>) {
        self.in_use.insert(
            record.id(),
            InUseEntry {
                endpoint: record.endpoint().clone(),
                shutdown: record.connection().shutdown_handle(),
            },
        );
    }

    fn destroy(&mut self, record: ConnectionRecord<T>) {
        let id = record.id();
        self.in_use.remove(&id);
        record.close();
        self.metrics.connections_closed += 1;
        tracing::debug!(connection_id = %id, "connection destroyed");
    }

    /// Close every record in `list` that has exceeded `max_age` at `now`.
    fn sweep_list(
        metrics: &mut PoolMetricsInner,
        list: &mut VecDeque<ConnectionRecord<T>>,
        now: DateTime<Utc>,
        max_age: TimeDelta,
    ) {
        if list.iter().all(|r| r.should_keep(now, max_age)) {
            return;
        }
        let (keep, expired): (VecDeque<_>, VecDeque<_>) =
            list.drain(..).partition(|r| r.should_keep(now, max_age));
        *list = keep;
        for record in expired {
            tracing::debug!(
                connection_id = %record.id(),
                endpoint = %record.endpoint(),
                "closing expired idle connection"
            );
            record.close();
            metrics.connections_closed += 1;
            metrics.connections_expired += 1;
        }
    }

    fn clean_up_older_than(&mut self, now: DateTime<Utc>, max_age: TimeDelta) {
        let metrics = &mut self.metrics;
        self.idle.retain(|_, list| {
            Self::sweep_list(metrics, list, now, max_age);
            !list.is_empty()
        });
    }

    /// Sweep endpoints with no release since the previous sweep, at most once
    /// per cleanup interval.
    fn clean_up_stale_hosts(&mut self, now: DateTime<Utc>, timings: Timings) {
        let due = self
            .last_clean_up
            .checked_add_signed(timings.cleanup_interval)
            .is_some_and(|next| now > next);
        if !due {
            return;
        }

        let last_clean_up = self.last_clean_up;
        let idle = &mut self.idle;
        let metrics = &mut self.metrics;
        let mut swept = 0usize;
        self.last_used.retain(|endpoint, last_used| {
            if *last_used > last_clean_up {
                return true;
            }
            if let Some(list) = idle.get_mut(endpoint) {
                Self::sweep_list(metrics, list, now, timings.max_connection_age);
                if list.is_empty() {
                    idle.remove(endpoint);
                }
            }
            swept += 1;
            false
        });

        self.last_clean_up = now;
        self.metrics.sweeps += 1;
        tracing::debug!(endpoints = swept, "stale host sweep complete");
    }

    /// Move the most recently released live record for `endpoint` into the
    /// in-use set.
    fn check_out_idle(
        &mut self,
        endpoint: &Endpoint,
        now: DateTime<Utc>,
        max_age: TimeDelta,
    ) -> Option<ConnectionRecord<T>> {
        let (record, drained) = match self.idle.get_mut(endpoint) {
            Some(list) => {
                Self::sweep_list(&mut self.metrics, list, now, max_age);
                let record = list.pop_front();
                (record, list.is_empty())
            }
            None => (None, true),
        };
        if drained {
            self.idle.remove(endpoint);
        }

        match record {
            Some(record) => {
                self.register(&record);
                Some(record)
            }
            None => {
                // Nothing left to sweep for this endpoint.
                self.last_used.remove(endpoint);
                None
            }
        }
    }

    fn release(&mut self, record: ConnectionRecord<T>, now: DateTime<Utc>, max_age: TimeDelta) {
        if !record.should_keep(now, max_age) {
            self.metrics.connections_expired += 1;
            self.destroy(record);
            return;
        }

        let endpoint = record.endpoint().clone();
        self.in_use.remove(&record.id());
        let list = self.idle.entry(endpoint.clone()).or_default();
        Self::sweep_list(&mut self.metrics, list, now, max_age);
        tracing::trace!(
            connection_id = %record.id(),
            endpoint = %endpoint,
            idle = list.len() + 1,
            "connection returned to pool"
        );
        list.push_front(record);
        self.last_used.insert(endpoint, now);
    }

    fn idle_count(&self) -> usize {
        self.idle.values().map(VecDeque::len).sum()
    }
}

impl<C: Connector> Pool<C> {
    /// Create a new pool builder around a connector.
    ///
    /// Use the builder to configure the pool before creating it.
    #[must_use]
    pub fn builder(connector: C) -> PoolBuilder<C> {
        PoolBuilder::new(connector)
    }

    /// Create a pool that does not authenticate its connections.
    ///
    /// For more control over pool creation, use [`Pool::builder()`].
    pub fn new(connector: C, config: PoolConfig) -> Result<Self, PoolError> {
        Self::with_credentials(connector, config, Arc::new(NoAuth))
    }

    fn with_credentials(
        connector: C,
        config: PoolConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        let timings = config.timings()?;

        tracing::info!(
            tags = config.tags,
            cleanup_interval = ?config.cleanup_interval,
            max_connection_age = ?config.max_connection_age,
            "connection pool created"
        );

        Ok(Self {
            config,
            timings,
            connector,
            credentials,
            next_connection_id: AtomicU64::new(1),
            created_at: Instant::now(),
            state: Mutex::new(PoolState::new()),
        })
    }

    /// Check out a connection to `endpoint`.
    ///
    /// Idle connections for the endpoint are tried most recently released
    /// first. Each candidate is probed and gets `timeout` applied; a candidate
    /// that fails the probe is destroyed and the next one is tried. When no
    /// idle candidate survives, a new connection is dialed and, if the
    /// credential source requires it, authenticated.
    ///
    /// The returned record is in use until passed to [`release`](Self::release)
    /// or [`destroy`](Self::destroy).
    pub async fn acquire(
        &self,
        endpoint: &Endpoint,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<ConnectionRecord<C::Connection>, PoolError> {
        tracing::trace!(endpoint = %endpoint, "acquiring connection from pool");
        self.state.lock().clean_up_stale_hosts(now, self.timings);

        while let Some(record) = self.check_out_idle(endpoint, now) {
            // Destroys the candidate if this future is dropped mid-probe.
            let mut candidate = PooledConnection {
                pool: self,
                record: Some(record),
            };
            let probe = Self::revalidate(candidate.record_mut(), timeout).await;
            let Some(record) = candidate.into_record() else {
                continue;
            };

            let mut state = self.state.lock();
            state.metrics.health_checks_performed += 1;
            match probe {
                Ok(true) => {
                    state.metrics.reuses += 1;
                    state.metrics.checkouts_successful += 1;
                    tracing::debug!(
                        connection_id = %record.id(),
                        endpoint = %endpoint,
                        "reusing idle connection"
                    );
                    return Ok(record);
                }
                Ok(false) => {
                    tracing::debug!(
                        connection_id = %record.id(),
                        endpoint = %endpoint,
                        "idle connection is no longer connected"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %record.id(),
                        endpoint = %endpoint,
                        error = %e,
                        "liveness probe failed on idle connection"
                    );
                }
            }
            state.metrics.health_checks_failed += 1;
            state.destroy(record);
        }

        let conn = match self.open(endpoint, timeout).await {
            Ok(conn) => conn,
            Err(e) => {
                self.state.lock().metrics.checkouts_failed += 1;
                return Err(e);
            }
        };

        let record = ConnectionRecord::new(self.next_connection_id(), conn, now);
        let mut state = self.state.lock();
        state.register(&record);
        state.metrics.connections_created += 1;
        state.metrics.checkouts_successful += 1;
        tracing::debug!(
            connection_id = %record.id(),
            endpoint = %endpoint,
            "new connection established"
        );
        Ok(record)
    }

    /// Check out a connection wrapped in a [`PooledConnection`].
    pub async fn get(
        &self,
        endpoint: &Endpoint,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<PooledConnection<'_, C>, PoolError> {
        PooledConnection::acquire(self, endpoint, now, timeout).await
    }

    /// Return a checked-out connection for reuse.
    ///
    /// A connection that has already exceeded the maximum age at `now` is
    /// destroyed instead.
    pub fn release(&self, record: ConnectionRecord<C::Connection>, now: DateTime<Utc>) {
        self.state
            .lock()
            .release(record, now, self.timings.max_connection_age);
    }

    /// Close a checked-out connection and forget it.
    pub fn destroy(&self, record: ConnectionRecord<C::Connection>) {
        self.state.lock().destroy(record);
    }

    /// Close every idle connection that has exceeded the maximum age at `now`.
    ///
    /// Endpoints left without idle connections are dropped. Checked-out
    /// connections are not affected.
    pub fn clean_up_older_than(&self, now: DateTime<Utc>) {
        self.state
            .lock()
            .clean_up_older_than(now, self.timings.max_connection_age);
    }

    /// Shut down the transport of every checked-out connection.
    ///
    /// Owners see their current and next I/O fail. The connections stay
    /// checked out until their owners release or destroy them.
    pub fn close_all_in_use_connections(&self) {
        let state = self.state.lock();
        tracing::info!(
            in_use = state.in_use.len(),
            "shutting down all in-use connections"
        );
        for (id, entry) in &state.in_use {
            tracing::debug!(connection_id = %id, endpoint = %entry.endpoint, "shutting down");
            entry.shutdown.shutdown();
        }
    }

    /// Get the current pool status.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.state.lock();
        PoolStatus {
            idle: state.idle_count(),
            in_use: state.in_use.len(),
            endpoints: state.idle.len(),
        }
    }

    /// Number of idle connections pooled for `endpoint`.
    #[must_use]
    pub fn idle_count(&self, endpoint: &Endpoint) -> usize {
        self.state.lock().idle.get(endpoint).map_or(0, VecDeque::len)
    }

    /// Get pool metrics.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        let state = self.state.lock();
        let inner = &state.metrics;
        PoolMetrics {
            connections_created: inner.connections_created,
            connections_closed: inner.connections_closed,
            connections_expired: inner.connections_expired,
            checkouts_successful: inner.checkouts_successful,
            checkouts_failed: inner.checkouts_failed,
            reuses: inner.reuses,
            health_checks_performed: inner.health_checks_performed,
            health_checks_failed: inner.health_checks_failed,
            sweeps: inner.sweeps,
            uptime: self.created_at.elapsed(),
        }
    }

    /// Get the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Generate a new unique connection ID.
    fn next_connection_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_connection_id.fetch_add(1, Ordering::Relaxed))
    }

    fn check_out_idle(
        &self,
        endpoint: &Endpoint,
        now: DateTime<Utc>,
    ) -> Option<ConnectionRecord<C::Connection>> {
        self.state
            .lock()
            .check_out_idle(endpoint, now, self.timings.max_connection_age)
    }

    async fn revalidate(
        record: &mut ConnectionRecord<C::Connection>,
        timeout: Duration,
    ) -> io::Result<bool> {
        let conn = record.connection_mut();
        if !conn.is_still_connected().await? {
            return Ok(false);
        }
        conn.set_io_timeout(timeout);
        Ok(true)
    }

    /// Dial, tag and authenticate a new connection. The lock is not held.
    async fn open(&self, endpoint: &Endpoint, timeout: Duration) -> Result<C::Connection, PoolError> {
        tracing::debug!(endpoint = %endpoint, timeout = ?timeout, "dialing new connection");

        let mut conn = self
            .connector
            .connect(endpoint, timeout)
            .await
            .map_err(|e| PoolError::ConnectFailed {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;
        conn.add_tags(self.config.tags);

        if let Err(e) = self.authenticate(&mut conn, endpoint).await {
            tracing::warn!(endpoint = %endpoint, error = %e, "authentication failed");
            conn.close();
            return Err(e);
        }
        Ok(conn)
    }

    async fn authenticate(
        &self,
        conn: &mut C::Connection,
        endpoint: &Endpoint,
    ) -> Result<(), PoolError> {
        if !self.credentials.is_auth_required() {
            return Ok(());
        }
        if !self.credentials.has_internal_credentials() {
            return Err(PoolError::MissingCredentials);
        }
        let credentials = self
            .credentials
            .internal_credentials()
            .ok_or(PoolError::MissingCredentials)?;

        let mut last_error = None;
        for attempt in credentials.attempts() {
            match conn.authenticate(&attempt).await {
                Ok(()) => return Ok(()),
                Err(AuthError::UnsupportedMechanism(mechanism)) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        mechanism = %mechanism,
                        "mechanism not supported by server"
                    );
                    last_error = Some(AuthError::UnsupportedMechanism(mechanism));
                }
                Err(e) => {
                    last_error = Some(e);
                    break;
                }
            }
        }

        Err(PoolError::AuthenticationFailed {
            endpoint: endpoint.clone(),
            message: last_error.map_or_else(|| "no mechanism attempted".into(), |e| e.to_string()),
        })
    }
}

impl<C: Connector> Drop for Pool<C> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for (_, list) in state.idle.drain() {
            for record in list {
                record.close();
            }
        }
        state.last_used.clear();

        let leaked = state.in_use.len();
        if leaked > 0 {
            tracing::error!(leaked, "connection pool dropped with checked-out connections");
        } else {
            tracing::info!("connection pool closed");
        }
        debug_assert!(
            leaked == 0 || std::thread::panicking(),
            "connection pool dropped with {leaked} leaked connection(s)"
        );
    }
}

impl<C: Connector> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Builder for creating a connection pool.
///
/// # Example
///
/// ```rust,ignore
/// let pool = Pool::builder(connector)
///     .credentials(StaticCredentials::new(credentials))
///     .tags(TAG_INTERNAL)
///     .build()?;
/// ```
pub struct PoolBuilder<C> {
    connector: C,
    credentials: Arc<dyn CredentialSource>,
    pool_config: PoolConfig,
}

impl<C: Connector> PoolBuilder<C> {
    /// Create a new pool builder with default settings and no authentication.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            credentials: Arc::new(NoAuth),
            pool_config: PoolConfig::default(),
        }
    }

    /// Set the pool configuration.
    #[must_use]
    pub fn pool_config(mut self, config: PoolConfig) -> Self {
        self.pool_config = config;
        self
    }

    /// Set the credential source used for new connections.
    #[must_use]
    pub fn credentials(mut self, source: impl CredentialSource + 'static) -> Self {
        self.credentials = Arc::new(source);
        self
    }

    /// Share an existing credential source.
    #[must_use]
    pub fn shared_credentials(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.credentials = source;
        self
    }

    /// Set the tag bits applied to every dialed connection.
    #[must_use]
    pub fn tags(mut self, tags: u32) -> Self {
        self.pool_config.tags = tags;
        self
    }

    /// Set the stale-host sweep interval.
    #[must_use]
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.pool_config.cleanup_interval = interval;
        self
    }

    /// Set the maximum connection age.
    #[must_use]
    pub fn max_connection_age(mut self, age: Duration) -> Self {
        self.pool_config.max_connection_age = age;
        self
    }

    /// Build the pool.
    pub fn build(self) -> Result<Pool<C>, PoolError> {
        Pool::with_credentials(self.connector, self.pool_config, self.credentials)
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of idle connections across all endpoints.
    pub idle: usize,
    /// Number of connections currently checked out.
    pub in_use: usize,
    /// Number of endpoints with at least one idle connection.
    pub endpoints: usize,
}

impl PoolStatus {
    /// Total number of open connections.
    #[must_use]
    pub fn total(&self) -> usize {
        self.idle + self.in_use
    }

    /// Whether the pool holds no connections at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Percentage of open connections that are checked out.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.in_use as f64 / self.total() as f64) * 100.0
    }
}

/// Metrics collected from the pool.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Total connections dialed since pool start.
    pub connections_created: u64,
    /// Total connections closed since pool start.
    pub connections_closed: u64,
    /// Connections closed for exceeding the maximum age.
    pub connections_expired: u64,
    /// Successful connection checkouts.
    pub checkouts_successful: u64,
    /// Failed connection checkouts (dial or authentication errors).
    pub checkouts_failed: u64,
    /// Checkouts served by an idle connection.
    pub reuses: u64,
    /// Liveness probes performed.
    pub health_checks_performed: u64,
    /// Liveness probes that failed.
    pub health_checks_failed: u64,
    /// Stale-host sweeps run.
    pub sweeps: u64,
    /// Time since pool creation.
    pub uptime: Duration,
}

impl PoolMetrics {
    /// Calculate checkout success rate (0.0 to 1.0).
    #[must_use]
    pub fn checkout_success_rate(&self) -> f64 {
        let total = self.checkouts_successful + self.checkouts_failed;
        if total == 0 {
            return 1.0;
        }
        self.checkouts_successful as f64 / total as f64
    }

    /// Calculate health check success rate (0.0 to 1.0).
    #[must_use]
    pub fn health_check_success_rate(&self) -> f64 {
        if self.health_checks_performed == 0 {
            return 1.0;
        }
        let successful = self.health_checks_performed - self.health_checks_failed;
        successful as f64 / self.health_checks_performed as f64
    }

    /// Fraction of successful checkouts served from the idle lists.
    #[must_use]
    pub fn reuse_rate(&self) -> f64 {
        if self.checkouts_successful == 0 {
            return 0.0;
        }
        self.reuses as f64 / self.checkouts_successful as f64
    }
}

/// A checked-out connection that is destroyed unless explicitly finished.
///
/// Call [`finish`](PooledConnection::finish) once the connection is known to
/// be in a clean state to return it to the pool. Dropping the wrapper without
/// finishing, for example while unwinding after an error, closes the
/// connection instead.
pub struct PooledConnection<'a, C: Connector> {
    pool: &'a Pool<C>,
    record: Option<ConnectionRecord<C::Connection>>,
}

impl<'a, C: Connector> PooledConnection<'a, C> {
    /// Check out a connection to `endpoint` from `pool`.
    pub async fn acquire(
        pool: &'a Pool<C>,
        endpoint: &Endpoint,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<Self, PoolError> {
        let record = pool.acquire(endpoint, now, timeout).await?;
        Ok(Self {
            pool,
            record: Some(record),
        })
    }

    /// Return the connection to the pool for reuse.
    pub fn finish(mut self, now: DateTime<Utc>) {
        if let Some(record) = self.record.take() {
            self.pool.release(record, now);
        }
    }

    /// Record id.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.record().id()
    }

    /// When the connection was dialed.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.record().created_at()
    }

    /// Endpoint of the connection.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        self.record().endpoint()
    }

    fn into_record(mut self) -> Option<ConnectionRecord<C::Connection>> {
        self.record.take()
    }

    // The record is only taken by `finish`, `into_record` and `drop`, which
    // all consume the wrapper.
    #[allow(clippy::expect_used)]
    fn record(&self) -> &ConnectionRecord<C::Connection> {
        self.record.as_ref().expect("pooled connection already returned")
    }

    #[allow(clippy::expect_used)]
    fn record_mut(&mut self) -> &mut ConnectionRecord<C::Connection> {
        self.record.as_mut().expect("pooled connection already returned")
    }
}

impl<C: Connector> Deref for PooledConnection<'_, C> {
    type Target = C::Connection;

    fn deref(&self) -> &Self::Target {
        self.record().connection()
    }
}

impl<C: Connector> DerefMut for PooledConnection<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.record_mut().connection_mut()
    }
}

impl<C: Connector> Drop for PooledConnection<'_, C> {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            tracing::trace!(
                connection_id = %record.id(),
                "pooled connection dropped without finish, destroying"
            );
            self.pool.destroy(record);
        }
    }
}

impl<C: Connector> fmt::Debug for PooledConnection<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
