use std::future::Future;
use std::time::Duration;

use fieldward_core::{AppError, AppResult};

/// Default bound for a single store or collaborator call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a store call under `limit`, dropping it on expiry.
///
/// Dropping an in-flight store future rolls back any open transaction, so an
/// expired call leaves persisted state unchanged.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &str, future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(AppError::StoreUnavailable(format!(
            "{operation} did not complete within {} ms",
            limit.as_millis()
        ))),
    }
}
