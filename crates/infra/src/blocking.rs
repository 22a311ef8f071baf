//! Guard against blocking calls on async runtime worker threads.
//!
//! Worker threads drive every in-flight request; a blocking call there stalls all of
//! them. Code that blocks (hashing, signing, sync IO) calls [`check`] or wraps the
//! work in [`guarded`] first, and runs through [`offload`] when it is on the runtime.
//! A call made directly from a worker thread is rejected with
//! [`BlockingError::Violation`].

use std::cell::Cell;

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::warn;

thread_local! {
    static BLOCKING_PERMITTED: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, Error)]
pub enum BlockingError {
    #[error("blocking call '{0}' attempted on a non-blocking runtime thread")]
    Violation(&'static str),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Fails when the current thread belongs to a tokio runtime and is not a thread
/// handed out by [`offload`]. Threads outside any runtime may always block.
pub fn check(operation: &'static str) -> Result<(), BlockingError> {
    if BLOCKING_PERMITTED.with(Cell::get) {
        return Ok(());
    }
    if Handle::try_current().is_ok() {
        warn!(operation, "blocking call rejected on runtime thread");
        return Err(BlockingError::Violation(operation));
    }
    Ok(())
}

/// Run `f` only if blocking is allowed on this thread.
pub fn guarded<T>(operation: &'static str, f: impl FnOnce() -> T) -> Result<T, BlockingError> {
    check(operation)?;
    Ok(f())
}

/// Run `f` on the runtime's blocking pool with blocking permitted.
pub async fn offload<F, T>(f: F) -> Result<T, BlockingError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let value = tokio::task::spawn_blocking(move || {
        BLOCKING_PERMITTED.with(|permitted| permitted.set(true));
        f()
    })
    .await?;
    Ok(value)
}
