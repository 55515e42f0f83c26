//! # netpool-testing
//!
//! Test infrastructure for the netpool connection pool.
//!
//! Provides a scriptable in-memory [`MockConnector`] whose connections can be
//! killed, broken or shut down from the test while the pool owns them, plus
//! small helpers for deterministic timestamps and log output.
//!
//! ## Example
//!
//! ```rust,ignore
//! use netpool::{Pool, PoolConfig};
//! use netpool_testing::{MockConnector, at};
//!
//! let connector = MockConnector::new();
//! let pool = Pool::new(connector.clone(), PoolConfig::default())?;
//!
//! let record = pool.acquire(&endpoint, at(0), TIMEOUT).await?;
//! pool.release(record, at(1));
//! connector.link(0).unwrap().kill();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod mock;

use chrono::{DateTime, TimeDelta, Utc};

pub use mock::{MockConnection, MockConnector, MockLink};

/// Fixed reference instant all test timestamps are relative to.
pub const EPOCH_SECS: i64 = 1_700_000_000;

/// A deterministic timestamp `secs` seconds after the reference instant.
#[must_use]
pub fn at(secs: i64) -> DateTime<Utc> {
    at_millis(secs * 1000)
}

/// A deterministic timestamp `millis` milliseconds after the reference instant.
#[must_use]
pub fn at_millis(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(EPOCH_SECS) + TimeDelta::milliseconds(millis)
}

/// Install a test-friendly tracing subscriber honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
