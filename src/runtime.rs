//! Process runtime
//!
//! Transfers run on the blocking thread pool and cannot be cancelled while a
//! read is in progress. A runtime dropped the usual way waits for them, so
//! `quit` would hang until the server answers or the socket times out. The
//! runtime built here is shut down in the background instead: once the main
//! future returns, pending blocking work is abandoned.

use std::future::Future;
use std::io;

/// Run `future` to completion on a fresh multi-threaded runtime and return
/// without waiting for leftover blocking tasks.
pub fn run_until_quit<F: Future>(future: F) -> io::Result<F::Output> {
	let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
	let output = runtime.block_on(future);
	runtime.shutdown_background();
	Ok(output)
}


// vim: ts=4
