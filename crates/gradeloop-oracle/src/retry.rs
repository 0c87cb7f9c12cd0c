use std::time::Duration;
use tracing::{debug, warn};

use crate::{OracleError, OracleRequest, TextOracle};

/// Bounded exponential backoff for transient oracle errors.
///
/// Applied once, at the oracle boundary. Terminal errors propagate
/// immediately; transient ones are retried up to `max_attempts` total
/// calls, doubling the delay each time.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// A policy that never sleeps, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Run a completion with retries on transient failures.
    pub async fn complete(
        &self,
        oracle: &dyn TextOracle,
        request: &OracleRequest,
    ) -> Result<String, OracleError> {
        let mut delay = self.base_delay;
        let mut attempt = 1;

        loop {
            match oracle.complete(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        oracle = oracle.name(),
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Transient oracle error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => {
                    debug!(oracle = oracle.name(), attempt, error = %e, "Oracle call failed");
                    return Err(e);
                }
            }
        }
    }
}
