//! Oracle deadlines

use crate::{OracleError, OracleResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run an oracle call with a deadline
pub async fn with_timeout<T, F>(deadline: Duration, call: F) -> OracleResult<T>
where
    F: Future<Output = OracleResult<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            let ms = deadline.as_millis() as u64;
            warn!("Oracle call exceeded {}ms", ms);
            Err(OracleError::Timeout(ms))
        }
    }
}
