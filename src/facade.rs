//! Blocking entry points for callers without an async runtime.
//!
//! Every async operation of the crate has a `*_blocking` twin built on [`block_on`]. It works
//! both from plain threads and from code already running inside a Tokio runtime.

use std::future::Future;

use crate::foundation::error::{ReelError, ReelResult};

/// Drive `fut` to completion from synchronous code.
///
/// Outside a runtime a current-thread runtime is created for the call. Inside one, the future
/// runs on a separate OS thread with its own runtime, since blocking a runtime worker on itself
/// would deadlock.
pub fn block_on<F, T>(fut: F) -> ReelResult<T>
where
    F: Future<Output = ReelResult<T>> + Send + 'static,
    T: Send + 'static,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return new_runtime()?.block_on(fut);
    }
    tracing::debug!("blocking call inside a runtime; using a helper thread");
    std::thread::Builder::new()
        .name("scenereel-blocking".to_string())
        .spawn(move || new_runtime()?.block_on(fut))
        .map_err(|e| ReelError::Other(anyhow::anyhow!("spawn blocking helper thread: {e}")))?
        .join()
        .map_err(|_| ReelError::Other(anyhow::anyhow!("blocking helper thread panicked")))?
}

fn new_runtime() -> ReelResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ReelError::Other(anyhow::anyhow!("build tokio runtime: {e}")))
}
