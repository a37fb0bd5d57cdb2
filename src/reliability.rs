//! Bounded exponential-backoff retry with cooperative cancellation.

use crate::api::RetryConfig;
use crate::error::{Result, ScopeError};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `op` until it succeeds, fails with an error `is_transient` rejects, or
/// the attempt budget in `config` runs out.
///
/// `op` receives the 1-based attempt number. Between attempts the harness
/// sleeps for [`RetryConfig::get_backoff`]. Cancelling `cancel` aborts both an
/// in-flight attempt and the sleep with [`ScopeError::Cancelled`]; exhausting
/// the budget on a transient error yields [`ScopeError::TaskTimeout`].
pub async fn retry_with_backoff<T, F, Fut, P>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    label: &str,
    is_transient: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&ScopeError) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        if cancel.is_cancelled() {
            return Err(ScopeError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScopeError::Cancelled),
            result = op(attempt) => result,
        };

        let e = match result {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) => e,
            Err(e) => return Err(e),
        };

        if attempt >= max_attempts {
            tracing::warn!(
                operation = %label,
                attempts = attempt,
                error = %e,
                "Retry budget exhausted"
            );
            return Err(ScopeError::TaskTimeout { attempts: attempt });
        }

        let backoff = config.get_backoff(attempt);
        if matches!(e, ScopeError::TransientPending { .. }) {
            tracing::debug!(
                operation = %label,
                attempt,
                backoff_ms = backoff.as_millis(),
                error = %e,
                "Not ready; retrying"
            );
        } else {
            tracing::warn!(
                operation = %label,
                attempt,
                backoff_ms = backoff.as_millis(),
                error = %e,
                "Retrying after transient error"
            );
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScopeError::Cancelled),
            _ = tokio::time::sleep(backoff) => {}
        }
    }
}
