//! Request Wrapper
//!
//! Cancellation and retry around generation requests. `send_step` races a
//! request against a cancellation token; `retry` re-runs transient failures
//! a bounded number of times. User aborts and validation failures always
//! surface immediately.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::warn;
use webforge_llm::{ErrorKind, ErrorResponse};

/// Run a request, returning `aborted` as soon as the token fires.
pub async fn send_step<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<T, ErrorResponse>>,
) -> Result<T, ErrorResponse> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ErrorResponse::aborted()),
        result = request => result,
    }
}

/// Re-run `f` on retryable failures, up to `times` extra attempts. When the
/// budget runs out the caller sees `retry_limit_reached` instead of the last
/// transient error.
pub async fn retry<T, F, Fut>(times: usize, mut f: F) -> Result<T, ErrorResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ErrorResponse>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if err.kind == ErrorKind::Aborted => return Err(err),
            Err(err) if !err.kind.is_retryable() => return Err(err),
            Err(err) => {
                if attempt >= times {
                    return Err(ErrorResponse::retry_limit_reached());
                }
                attempt += 1;
                warn!(attempt, error = %err, "retrying generation request");
            }
        }
    }
}
