//! Caller-level retry for the idempotent single-shot calls.

use std::future::Future;
use std::time::Duration;

use crate::core::error::{GeoError, GeoResult};

const BASE_BACKOFF_MS: u64 = 250;
const MAX_BACKOFF_MS: u64 = 4_000;

/// Run `operation` up to `1 + retries` times. Only transient failures
/// (transport and malformed structured output) are retried.
pub async fn with_retry<F, Fut, T>(retries: u32, label: &str, operation: F) -> GeoResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = GeoResult<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if !is_retryable(&e) || attempt >= retries {
                    return Err(e);
                }
                let backoff_ms = backoff(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = retries,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Retrying {}",
                    label
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                attempt += 1;
            }
        }
    }
}

fn is_retryable(err: &GeoError) -> bool {
    matches!(
        err,
        GeoError::GenerationFailure { .. } | GeoError::MalformedResponse { .. }
    )
}

fn backoff(attempt: u32) -> u64 {
    BASE_BACKOFF_MS
        .saturating_mul(1u64 << attempt.min(8))
        .min(MAX_BACKOFF_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm::EngineId;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = with_retry(2, "scenario", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(GeoError::generation(EngineId::Gpt, "503"))
            } else {
                Ok("ok")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_retries_calls_once() {
        let calls = AtomicU32::new(0);
        let result: GeoResult<()> = with_retry(0, "report", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GeoError::malformed("report", "empty"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn credential_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: GeoResult<()> = with_retry(3, "scenario", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GeoError::CredentialMissing {
                engine: EngineId::Gpt,
                var: "OPENAI_API_KEY",
            })
        })
        .await;
        assert!(matches!(result, Err(GeoError::CredentialMissing { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(backoff(0), 250);
        assert_eq!(backoff(1), 500);
        assert_eq!(backoff(10), MAX_BACKOFF_MS);
    }
}
