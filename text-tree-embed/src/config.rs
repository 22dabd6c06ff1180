//! Configuration for cached embedding calls.

use std::time::Duration;

/// Retry policy for [`CachedEmbedder`](crate::CachedEmbedder).
///
/// Only retryable failures (`Unavailable`, `Timeout`) are retried; the wait
/// before retry `n` (1-based) is
/// `min(initial_backoff · backoff_multiplier^(n-1), max_backoff)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedConfig {
    /// Retries after the first failed attempt.
    ///
    /// Default: 3
    pub max_retries: u32,

    /// Wait before the first retry.
    ///
    /// Default: 50ms
    pub initial_backoff: Duration,

    /// Growth factor of the wait between consecutive retries.
    ///
    /// Default: 2.0
    pub backoff_multiplier: f64,

    /// Upper bound on any single wait.
    ///
    /// Default: 2s
    pub max_backoff: Duration,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl EmbedConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never retries or waits, for local providers and
    /// tests.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
            max_backoff: Duration::ZERO,
        }
    }

    /// Sets the number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the initial backoff.
    #[must_use]
    pub const fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Sets the maximum backoff.
    #[must_use]
    pub const fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Wait before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let secs = self.initial_backoff.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_then_caps() {
        let config = EmbedConfig::new()
            .with_initial_backoff(Duration::from_millis(100))
            .with_backoff_multiplier(2.0)
            .with_max_backoff(Duration::from_millis(350));
        assert!((config.backoff_for(1).as_secs_f64() - 0.1).abs() < 1e-9);
        assert!((config.backoff_for(2).as_secs_f64() - 0.2).abs() < 1e-9);
        assert_eq!(config.backoff_for(3), Duration::from_millis(350));
        assert_eq!(config.backoff_for(40), Duration::from_millis(350));
    }

    #[test]
    fn no_retry_never_waits() {
        let config = EmbedConfig::no_retry();
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.backoff_for(1), Duration::ZERO);
    }
}
