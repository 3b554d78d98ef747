//! Retry delay calculation.
//!
//! The delay before a retried attempt is a pure function of the attempt number
//! and the server's `Retry-After` header. There is no jitter: the same inputs
//! always produce the same delay.

use std::time::{Duration, SystemTime};

/// Ceiling of the exponential branch. A server-supplied `Retry-After` is not capped.
pub const MAX_EXPONENTIAL_BACKOFF: Duration = Duration::from_secs(8);

/// HTTP statuses that are retried while the retry budget lasts.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Returns `true` if `status` is in [`RETRYABLE_STATUSES`].
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Computes the delay before retrying after `attempt` (0-based).
///
/// Priority order:
/// 1. `Retry-After` as non-negative integer seconds, returned as-is.
/// 2. `Retry-After` as an HTTP-date in the future, returned as `date - now`.
/// 3. Otherwise `min(2^attempt, 8)` seconds.
///
/// # Examples
///
/// ```
/// use resilient_client::backoff::calculate_backoff;
/// use std::time::Duration;
///
/// assert_eq!(calculate_backoff(0, None), Duration::from_secs(1));
/// assert_eq!(calculate_backoff(2, None), Duration::from_secs(4));
/// assert_eq!(calculate_backoff(7, None), Duration::from_secs(8));
/// assert_eq!(calculate_backoff(0, Some("120")), Duration::from_secs(120));
/// ```
pub fn calculate_backoff(attempt: u32, retry_after: Option<&str>) -> Duration {
    calculate_backoff_at(attempt, retry_after, SystemTime::now())
}

/// Same as [`calculate_backoff`], evaluated against an explicit `now`.
pub fn calculate_backoff_at(attempt: u32, retry_after: Option<&str>, now: SystemTime) -> Duration {
    retry_after
        .and_then(|value| parse_retry_after(value, now))
        .unwrap_or_else(|| exponential(attempt))
}

/// Parses a `Retry-After` value in delay-seconds or HTTP-date form.
///
/// Returns `None` for unparseable values and for dates that are not in the future.
fn parse_retry_after(value: &str, now: SystemTime) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = httpdate::parse_http_date(value).ok()?;
    match date.duration_since(now) {
        Ok(delay) if !delay.is_zero() => Some(delay),
        _ => None,
    }
}

fn exponential(attempt: u32) -> Duration {
    let secs = 2u64.saturating_pow(attempt);
    Duration::from_secs(secs).min(MAX_EXPONENTIAL_BACKOFF)
}

/// Per-attempt retry state.
///
/// Created for one attempt of one logical call and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryContext {
    /// 0-based attempt number.
    pub attempt: u32,
    /// Status of the attempt's response, absent for transport failures.
    pub status_code: Option<u16>,
    /// Raw `Retry-After` header of the attempt's response.
    pub retry_after: Option<String>,
}

impl RetryContext {
    /// Context for an attempt that failed before any response arrived.
    pub fn transport_failure(attempt: u32) -> Self {
        Self {
            attempt,
            status_code: None,
            retry_after: None,
        }
    }

    /// Context for an attempt that received a response.
    pub fn response(attempt: u32, status_code: u16, retry_after: Option<String>) -> Self {
        Self {
            attempt,
            status_code: Some(status_code),
            retry_after,
        }
    }

    /// Returns `true` if this attempt's outcome is retryable and budget remains.
    pub fn should_retry(&self, max_retries: u32) -> bool {
        if self.attempt >= max_retries {
            return false;
        }
        match self.status_code {
            None => true,
            Some(status) => is_retryable_status(status),
        }
    }

    /// Delay before the next attempt.
    ///
    /// Transport failures never consult `Retry-After`.
    pub fn backoff(&self) -> Duration {
        let retry_after = self
            .status_code
            .and(self.retry_after.as_deref());
        calculate_backoff(self.attempt, retry_after)
    }
}
