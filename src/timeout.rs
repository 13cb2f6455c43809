// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::future::Future;
use std::time::Duration;

use crate::error::{ElkError, Result};

/// Race `operation` against a single-shot timer.
///
/// Whichever settles first wins. When the timer fires the operation future is
/// dropped, which releases any subscriptions it holds; when the operation
/// settles first the timer is dropped. A zero `timeout` disables the timer and
/// simply awaits the operation.
pub async fn with_timeout<T, F>(timeout: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if timeout.is_zero() {
        return operation.await;
    }
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(ElkError::Timeout { timeout }),
    }
}
