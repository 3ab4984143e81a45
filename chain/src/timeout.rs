//! Bounded waits on chain calls.

use std::future::Future;
use std::time::Duration;

use crate::ChainError;

/// Run `fut`, failing with [`ChainError::Timeout`] once `limit` elapses.
///
/// Only the wait is abandoned; a transaction already broadcast stays broadcast.
pub async fn with_timeout<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T, ChainError>
where
    F: Future<Output = Result<T, ChainError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, seconds = limit.as_secs(), "chain call timed out");
            Err(ChainError::Timeout {
                operation,
                seconds: limit.as_secs(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_fast_results() {
        let result = with_timeout("read", Duration::from_secs(1), async { Ok::<_, ChainError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_slow_calls() {
        let result: Result<(), ChainError> = with_timeout("read", Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert_eq!(
            result,
            Err(ChainError::Timeout {
                operation: "read",
                seconds: 5
            })
        );
    }
}
