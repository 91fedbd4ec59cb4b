//! Drive selector futures from synchronous frontends.

use std::future::Future;

use anyhow::Context;

/// Run `future` to completion on a fresh current-thread runtime.
///
/// Scopes state is single-threaded, so its futures must stay on the calling
/// thread.
pub fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;
    Ok(runtime.block_on(future))
}
