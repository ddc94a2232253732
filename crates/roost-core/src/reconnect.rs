//! Reconnection backoff policy.
//!
//! The stream client makes a single connection attempt and stops on the
//! first transport failure; whether to reconnect is the caller's decision.
//! This policy computes the delay schedule for callers that opt in.

use std::time::Duration;

/// Configuration for reconnection backoff
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Maximum number of attempts; 0 means unlimited
    pub max_attempts: u32,
    /// Delay before the first reconnect
    pub initial_delay: Duration,
    /// Upper bound for any delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Add random jitter to delays
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ReconnectPolicy {
    /// Create a policy with the defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts (0 = unlimited)
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first reconnect
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay upper bound
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Enable or disable jitter
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether the given 1-based attempt number exhausts the policy
    #[must_use]
    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts != 0 && attempt >= self.max_attempts
    }

    /// Delay before the given 1-based reconnect attempt
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = base.min(self.max_delay.as_millis() as f64) as u64;

        let delay_ms = if self.jitter {
            // Up to 25% jitter
            capped + rand_jitter(capped / 4)
        } else {
            capped
        };

        Duration::from_millis(delay_ms)
    }
}

/// Simple pseudo-random jitter (avoids pulling in a rand dependency)
fn rand_jitter(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    nanos % max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_attempts, 0);
        assert_eq!(policy.initial_delay, Duration::from_millis(500));
        assert_eq!(policy.multiplier, 2.0);
        assert!(policy.jitter);
    }

    #[test]
    fn test_builder() {
        let policy = ReconnectPolicy::new()
            .with_max_attempts(5)
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(10))
            .with_multiplier(3.0)
            .with_jitter(false);

        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        assert_eq!(policy.multiplier, 3.0);
        assert!(!policy.jitter);
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = ReconnectPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_multiplier(2.0)
            .with_jitter(false);

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_respects_max() {
        let policy = ReconnectPolicy::new()
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_multiplier(10.0)
            .with_jitter(false);

        assert_eq!(policy.delay_for(3), Duration::from_secs(5));
    }

    #[test]
    fn test_exhaustion() {
        let unlimited = ReconnectPolicy::new();
        assert!(!unlimited.exhausted(1_000_000));

        let bounded = ReconnectPolicy::new().with_max_attempts(3);
        assert!(!bounded.exhausted(2));
        assert!(bounded.exhausted(3));
        assert!(bounded.exhausted(4));
    }
}
