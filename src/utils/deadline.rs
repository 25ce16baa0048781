use std::future::Future;
use std::time::Duration;

use crate::errors::LaughGenError;

/// Run `fut` under `limit`, mapping an elapsed deadline to `TimeoutError`.
pub async fn bounded<T, F>(operation: &str, limit: Duration, fut: F) -> Result<T, LaughGenError>
where
    F: Future<Output = Result<T, LaughGenError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(LaughGenError::TimeoutError {
            operation: operation.to_string(),
            after: limit,
        }),
    }
}
