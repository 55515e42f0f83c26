//! Pool configuration.

use std::time::Duration;

use chrono::TimeDelta;

use crate::error::PoolError;

/// Default interval between stale-host sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default maximum age of a pooled connection.
pub const DEFAULT_MAX_CONNECTION_AGE: Duration = Duration::from_secs(30);

/// Configuration for a connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Tag bits OR-ed into every newly dialed connection.
    pub tags: u32,

    /// Minimum time between two stale-host sweeps.
    ///
    /// Must be larger than [`max_connection_age`](Self::max_connection_age).
    pub cleanup_interval: Duration,

    /// Connections older than this are never handed out or pooled.
    pub max_connection_age: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            tags: 0,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            max_connection_age: DEFAULT_MAX_CONNECTION_AGE,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag bits applied to dialed connections.
    #[must_use]
    pub fn tags(mut self, tags: u32) -> Self {
        self.tags = tags;
        self
    }

    /// Set the stale-host sweep interval.
    #[must_use]
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the maximum connection age.
    #[must_use]
    pub fn max_connection_age(mut self, age: Duration) -> Self {
        self.max_connection_age = age;
        self
    }

    /// Validate the configuration.
    ///
    /// A sweep interval that does not exceed the maximum age would let a
    /// connection be pooled, skipped by the interval-gated sweep, and still
    /// look valid past its age limit.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_connection_age.is_zero() {
            return Err(PoolError::Config(
                "max_connection_age must be greater than zero".into(),
            ));
        }
        if self.cleanup_interval <= self.max_connection_age {
            return Err(PoolError::Config(format!(
                "cleanup_interval ({:?}) must be greater than max_connection_age ({:?})",
                self.cleanup_interval, self.max_connection_age
            )));
        }
        self.timings().map(|_| ())
    }

    /// Convert the durations into timestamp arithmetic deltas.
    pub(crate) fn timings(&self) -> Result<Timings, PoolError> {
        let convert = |name: &str, d: Duration| {
            TimeDelta::from_std(d)
                .map_err(|_| PoolError::Config(format!("{name} is out of range: {d:?}")))
        };
        Ok(Timings {
            cleanup_interval: convert("cleanup_interval", self.cleanup_interval)?,
            max_connection_age: convert("max_connection_age", self.max_connection_age)?,
        })
    }
}

/// Validated durations in the representation used against timestamps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timings {
    pub(crate) cleanup_interval: TimeDelta,
    pub(crate) max_connection_age: TimeDelta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PoolConfig::default();
        assert_eq!(config.tags, 0);
        assert_eq!(config.cleanup_interval, Duration::from_secs(300));
        assert_eq!(config.max_connection_age, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fluent_setters() {
        let config = PoolConfig::new()
            .tags(0b101)
            .cleanup_interval(Duration::from_secs(60))
            .max_connection_age(Duration::from_secs(10));
        assert_eq!(config.tags, 0b101);
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
        assert_eq!(config.max_connection_age, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_interval_must_exceed_max_age() {
        let equal = PoolConfig::new()
            .cleanup_interval(Duration::from_secs(30))
            .max_connection_age(Duration::from_secs(30));
        assert!(matches!(equal.validate(), Err(PoolError::Config(_))));

        let smaller = PoolConfig::new().cleanup_interval(Duration::from_secs(5));
        assert!(matches!(smaller.validate(), Err(PoolError::Config(_))));
    }

    #[test]
    fn test_zero_max_age_rejected() {
        let config = PoolConfig::new().max_connection_age(Duration::ZERO);
        assert!(matches!(config.validate(), Err(PoolError::Config(_))));
    }

    #[test]
    fn test_out_of_range_interval_rejected() {
        let config = PoolConfig::new().cleanup_interval(Duration::MAX);
        assert!(matches!(config.validate(), Err(PoolError::Config(_))));
    }
}
