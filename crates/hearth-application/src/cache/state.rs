//! Query options and the observable state of a cache entry.

use std::sync::Arc;
use std::time::Duration;

use hearth_core::config::ClientConfig;
use hearth_core::error::HearthError;

/// How far an entry can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Fetching,
    Error,
}

/// Per-read options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// When false no fetch is issued and reads come back disabled.
    pub enabled: bool,
    /// Polling period for watches.
    pub refetch_interval: Option<Duration>,
    /// Re-issue a failed fetch per the cache's [`RetryPolicy`].
    pub retry: bool,
    /// How long a value stays fresh. `None` means until invalidated.
    pub stale_time: Option<Duration>,
}

impl QueryOptions {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn polling(mut self, period: Duration) -> Self {
        self.refetch_interval = Some(period);
        self
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            refetch_interval: None,
            retry: false,
            stale_time: None,
        }
    }
}

/// Attempts and fixed delay for queries that opt into retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            attempts: config.retry_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Snapshot of one query as seen by a consumer.
#[derive(Debug)]
pub struct QueryState<T> {
    pub value: Option<Arc<T>>,
    pub freshness: Freshness,
    pub error: Option<HearthError>,
    /// Fetching with nothing to show yet.
    pub is_loading: bool,
    /// At least one fetch has completed.
    pub is_fetched: bool,
    pub enabled: bool,
}

impl<T> QueryState<T> {
    /// The state of a read whose preconditions do not hold.
    pub fn disabled() -> Self {
        Self {
            value: None,
            freshness: Freshness::Stale,
            error: None,
            is_loading: false,
            is_fetched: false,
            enabled: false,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            enabled: true,
            ..Self::disabled()
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The value, or the error that prevented one.
    ///
    /// A disabled read is `NotReady`. A read that failed returns its error
    /// even if an older value is still held.
    pub fn into_result(self) -> Result<Arc<T>, HearthError> {
        if !self.enabled {
            return Err(HearthError::NotReady);
        }
        if let Some(err) = self.error {
            return Err(err);
        }
        self.value.ok_or(HearthError::NotReady)
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            freshness: self.freshness,
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetched: self.is_fetched,
            enabled: self.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_do_not_retry_or_poll() {
        let options = QueryOptions::default();
        assert!(options.enabled);
        assert!(!options.retry);
        assert!(options.refetch_interval.is_none());
    }

    #[test]
    fn test_disabled_state_is_not_ready() {
        let state = QueryState::<u32>::disabled();
        assert!(state.value().is_none());
        assert_eq!(state.into_result().unwrap_err(), HearthError::NotReady);
    }

    #[test]
    fn test_error_wins_over_stale_value() {
        let state = QueryState {
            value: Some(Arc::new(1u32)),
            freshness: Freshness::Error,
            error: Some(HearthError::transport("boom")),
            is_loading: false,
            is_fetched: true,
            enabled: true,
        };
        assert!(matches!(state.into_result(), Err(HearthError::Transport(_))));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = ClientConfig {
            retry_attempts: 0,
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(500));
    }
}
