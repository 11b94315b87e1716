use std::future::Future;

use tokio::runtime::{Builder, Runtime};

/// Runtime used to drive SDK futures from blocking callers.
pub fn build_runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Blocks the calling thread until `future` completes.
///
/// Panics if called from within another tokio runtime.
pub fn poll_until_ready<Fut>(runtime: &Runtime, future: Fut) -> Fut::Output
where
    Fut: Future,
{
    runtime.block_on(future)
}
