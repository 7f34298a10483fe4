//! Retry strategy for the execution engine.

use std::time::Duration;

use crate::Error;

/// A bounded fixed-delay retry strategy.
///
/// Read-style actions are idempotent, so they get a generous budget with a
/// short delay. Mutating actions get fewer attempts with a longer delay:
/// an operation like `rename` is not safely repeatable when the first
/// attempt succeeded server-side but the response was lost on the way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Default budget for read-style actions.
    pub const fn read() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(2),
        }
    }

    /// Default budget for write-style actions.
    pub const fn write() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }

    /// A single attempt, no retries. Used for non-replayable upload streams.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Decide what to do after a failed attempt.
    ///
    /// `attempts_made` counts attempts already performed. Returns the delay
    /// to wait before the next attempt, or `None` to stop and surface the
    /// error.
    pub fn next_delay(&self, attempts_made: u32, error: &Error) -> Option<Duration> {
        if !error.is_retryable() {
            return None;
        }
        if attempts_made >= self.max_attempts {
            return None;
        }
        Some(self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_retryable_error_within_budget() {
        let policy = RetryPolicy::read();
        let err = Error::transport_failure("connection reset");

        assert_eq!(policy.next_delay(1, &err), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(4, &err), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(5, &err), None);
    }

    #[test]
    fn test_terminal_errors_never_retry() {
        let policy = RetryPolicy::read();

        for err in [
            Error::invalid_credentials("no key"),
            Error::missing_parameters("no action"),
            Error::clock_drift("out of sync"),
            Error::resource_not_found("404"),
            Error::local_file_not_found("gone"),
        ] {
            assert_eq!(policy.next_delay(1, &err), None);
        }
    }

    #[test]
    fn test_server_response_is_retryable() {
        let policy = RetryPolicy::write();
        let err = Error::unexpected_server_response("503");

        assert_eq!(policy.next_delay(1, &err), Some(Duration::from_secs(5)));
        assert_eq!(policy.next_delay(3, &err), None);
    }

    #[test]
    fn test_none_policy_is_single_attempt() {
        let policy = RetryPolicy::none();
        let err = Error::transport_failure("connection reset");

        assert_eq!(policy.next_delay(1, &err), None);
    }
}
