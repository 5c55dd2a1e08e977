//! Delay between failed Runtime API polls.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

impl RetryConfig {
    /// Wait before the next poll after `failures` consecutive failures.
    ///
    /// Doubles from `base_delay_ms` per failure, clamps at `max_delay_ms`,
    /// then adds up to 10% jitter so that concurrent sandboxes spread out.
    /// No failures means no wait.
    pub fn backoff(&self, failures: u32) -> Duration {
        let Some(exponent) = failures.checked_sub(1) else {
            return Duration::ZERO;
        };

        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        let jitter_ms = rand::thread_rng().gen_range(0..=delay_ms / 10);

        Duration::from_millis(delay_ms.saturating_add(jitter_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(base_delay_ms: u64, max_delay_ms: u64) -> RetryConfig {
        RetryConfig {
            max_attempts: 5,
            base_delay_ms,
            max_delay_ms,
        }
    }

    fn within(d: Duration, low: u128, high: u128) -> bool {
        (low..=high).contains(&d.as_millis())
    }

    #[test]
    fn test_no_failures_no_wait() {
        assert_eq!(retry(100, 2000).backoff(0), Duration::ZERO);
    }

    #[test]
    fn test_doubles_per_failure() {
        let retry = retry(100, 2000);
        assert!(within(retry.backoff(1), 100, 110));
        assert!(within(retry.backoff(2), 200, 220));
        assert!(within(retry.backoff(3), 400, 440));
    }

    #[test]
    fn test_clamped_at_ceiling() {
        let retry = retry(100, 1000);
        assert!(within(retry.backoff(10), 1000, 1100));
        assert!(within(retry.backoff(64), 1000, 1100));
        assert!(within(retry.backoff(u32::MAX), 1000, 1100));
    }

    #[test]
    fn test_zero_base_never_waits() {
        assert_eq!(retry(0, 2000).backoff(7), Duration::ZERO);
    }
}
