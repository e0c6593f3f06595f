use std::future::Future;

use crate::error::Result;

/// Runs a side effect whose failure must not fail the caller, such as
/// refreshing the summary or relaying a push. Failures are logged and dropped.
pub async fn best_effort<T, F>(label: &str, effect: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match effect.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(effect = label, error = %err, "best-effort call failed");
            None
        }
    }
}
