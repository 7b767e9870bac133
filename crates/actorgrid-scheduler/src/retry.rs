//! Retry helpers for transport calls.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::transport::TransportError;

/// Run `op` up to `attempts` times, sleeping `delay` between failures.
///
/// `op` receives the 1-based attempt number. Non-retryable errors are
/// returned immediately.
pub async fn retry_fixed<T, F, Fut>(
    attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, TransportError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && e.is_retryable() => {
                debug!(attempt, attempts, error = %e, "attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Randomized exponential backoff.
///
/// Attempt `n` waits a random whole number of `unit`s in
/// `[min, min + ending_bounds(n))`, where the bound doubles per attempt and
/// is clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpBackoff {
    pub min: u32,
    pub max: u32,
    pub unit: Duration,
}

impl Default for ExpBackoff {
    fn default() -> Self {
        Self {
            min: 0,
            max: 16,
            unit: Duration::from_secs(1),
        }
    }
}

impl ExpBackoff {
    pub fn ending_bounds(&self, attempt: u32) -> u32 {
        let doubled = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        doubled
            .max(u64::from(self.min))
            .min(u64::from(self.max)) as u32
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let end = self.ending_bounds(attempt);
        let jitter = if end == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..end)
        };
        self.unit.saturating_mul(jitter.saturating_add(self.min))
    }
}
