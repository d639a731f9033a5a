//! API handlers.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod deposits;
pub mod health;
pub mod transactions;

use crate::error::ApiError;

/// Run store and password work off the async worker threads.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
