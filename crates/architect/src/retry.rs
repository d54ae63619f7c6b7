use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::{ArchitectError, ArchitectResult};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 60000;

/// Run a provider call, retrying rate limits and 5xx responses with
/// exponential backoff. Any other error is returned immediately.
pub(crate) async fn with_retry<T, F, Fut>(
    max_retries: u32,
    operation_name: &str,
    operation: F,
) -> ArchitectResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = ArchitectResult<T>>,
{
    let mut retries = 0;
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() => {
                if retries >= max_retries {
                    error!(
                        operation = operation_name,
                        retries,
                        error = %e,
                        "Provider call failed after retries"
                    );
                    return Err(e);
                }

                let wait_ms = match &e {
                    ArchitectError::RateLimited {
                        retry_after: Some(secs),
                        ..
                    } => secs.saturating_mul(1000),
                    _ => backoff_ms,
                }
                .min(MAX_BACKOFF_MS);

                warn!(
                    operation = operation_name,
                    error = %e,
                    "Retrying in {}ms (attempt {}/{})",
                    wait_ms,
                    retries + 1,
                    max_retries
                );

                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                retries += 1;
                backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
            }
            Err(e) => {
                if retries > 0 {
                    info!(operation = operation_name, retries, error = %e, "Provider call failed");
                }
                return Err(e);
            }
        }
    }
}
