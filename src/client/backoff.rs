//! Back-off configuration for retried exchanges.

use std::time::Duration;

/// Exponential back-off between attempts of the same exchange.
///
/// The delay starts at `initial_delay` and doubles after each failed attempt,
/// capped at `max_delay`.
///
/// # Default Values
/// - `initial_delay`: 100 milliseconds
/// - `max_delay`: 2 seconds
///
/// # Invariants
/// - `initial_delay` must not exceed `max_delay`
/// - `initial_delay` must be at least 1 millisecond
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl BackoffConfig {
    /// Clamp delays to sane bounds and ensure `initial_delay <= max_delay`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use betwire::client::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::from_millis(5),
    ///     max_delay: Duration::ZERO,
    /// };
    ///
    /// let normalized = cfg.normalized();
    /// assert_eq!(normalized.initial_delay, Duration::from_millis(1));
    /// assert_eq!(normalized.max_delay, Duration::from_millis(5));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.initial_delay = self.initial_delay.max(Duration::from_millis(1));
        self.max_delay = self.max_delay.max(Duration::from_millis(1));
        if self.initial_delay > self.max_delay {
            std::mem::swap(&mut self.initial_delay, &mut self.max_delay);
        }
        self
    }

    /// Delay to wait after the `failures`-th consecutive failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use betwire::client::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::from_millis(100),
    ///     max_delay: Duration::from_millis(350),
    /// };
    /// assert_eq!(cfg.delay_after(1), Duration::from_millis(100));
    /// assert_eq!(cfg.delay_after(2), Duration::from_millis(200));
    /// assert_eq!(cfg.delay_after(3), Duration::from_millis(350));
    /// ```
    #[must_use]
    pub fn delay_after(&self, failures: u32) -> Duration {
        let factor = 1_u32
            .checked_shl(failures.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::BackoffConfig;

    #[rstest]
    #[case(0, 10)]
    #[case(1, 10)]
    #[case(4, 80)]
    #[case(10, 1000)]
    #[case(64, 1000)]
    fn delay_doubles_and_caps(#[case] failures: u32, #[case] expected_ms: u64) {
        let cfg = BackoffConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        };
        assert_eq!(cfg.delay_after(failures), Duration::from_millis(expected_ms));
    }

    #[test]
    fn normalized_swaps_inverted_bounds() {
        let cfg = BackoffConfig {
            initial_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(1),
        }
        .normalized();
        assert_eq!(cfg.initial_delay, Duration::from_secs(1));
        assert_eq!(cfg.max_delay, Duration::from_secs(3));
    }
}
