//! Run a signing job off the async runtime.
//!
//! The key's `sign` call may wait on a PIN prompt or a hardware device, so
//! the whole transition runs on the blocking pool. Cancelling the token
//! also asks the key to abort its in-flight call.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::adapters::engine::SignatureEngines;
use crate::adapters::key::SigningKey;
use crate::adapters::responder::Responder;
use crate::infra::error::{SigningError, SigningResult};
use crate::pipelines::signing_job::{JobOutcome, SigningJob};

/// Sign `job` on the blocking thread pool.
///
/// # Errors
///
/// Returns `AdapterError` only if the blocking task itself died; ordinary
/// signing failures are reported to the responder and as `JobOutcome::Failed`.
pub async fn sign_in_background<R>(
    job: SigningJob<R>,
    engines: SignatureEngines,
    key: Arc<dyn SigningKey>,
    cancel: CancellationToken,
) -> SigningResult<JobOutcome>
where
    R: Responder + 'static,
{
    let watcher = {
        let key = Arc::clone(&key);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            log::info!("Cancellation requested, aborting key operation");
            key.cancel();
        })
    };

    let result = tokio::task::spawn_blocking(move || {
        job.sign_with_key_and_respond(&engines, key.as_ref(), &cancel)
    })
    .await;
    watcher.abort();

    result.map_err(|e| SigningError::AdapterError(format!("Signing task failed: {e}")))
}
