//! Connection-resilience wrapper around a [`RemoteClient`]
//!
//! Every remote operation goes through [`TransportSession::guarded`]:
//! reconnect first when the session is marked closed, run the operation, and
//! on a transient failure reconnect and retry exactly once. The session keeps
//! its own `closed` flag because the client's view of the connection is not
//! reliable after an error.

use std::fs::File;
use std::future::Future;
use std::io::{Seek, SeekFrom};
use std::pin::Pin;
use std::time::Duration;

use super::{ProgressHandler, RemoteClient, RemoteEntry, TransportResult};
use crate::error::TransportError;
use crate::logging::*;

type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// Bounded exponential backoff for reconnects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
	/// Number of connect attempts before giving up
	pub max_retries: u32,

	/// Delay after the first failed attempt; doubled after each further one
	pub initial_delay: Duration,
}

impl ReconnectPolicy {
	pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
		ReconnectPolicy { max_retries, initial_delay }
	}
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		ReconnectPolicy { max_retries: 3, initial_delay: Duration::from_millis(2000) }
	}
}

/// A remote session that hides transient connection failures from callers
pub struct TransportSession<C> {
	client: C,
	closed: bool,
	policy: ReconnectPolicy,
	progress: Option<ProgressHandler>,
	reconnects: u32,
}

impl<C: RemoteClient> TransportSession<C> {
	/// Wrap a client; the session starts closed
	pub fn new(client: C) -> Self {
		Self::with_policy(client, ReconnectPolicy::default())
	}

	/// Wrap a client with a custom guard reconnect policy
	pub fn with_policy(client: C, policy: ReconnectPolicy) -> Self {
		TransportSession { client, closed: true, policy, progress: None, reconnects: 0 }
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	/// Number of reconnect cycles performed so far
	pub fn reconnect_count(&self) -> u32 {
		self.reconnects
	}

	/// Establish the connection; no-op while the session is open
	pub async fn connect(&mut self) -> TransportResult<()> {
		if !self.closed {
			return Ok(());
		}

		info!("Connecting to FTP server...");
		self.client.connect().await?;
		self.closed = false;
		info!("Connection to FTP established");
		Ok(())
	}

	/// Mark the session closed and release the connection
	pub fn close(&mut self) {
		self.closed = true;
		self.client.close();
	}

	/// Close any live connection and connect again with exponential backoff
	pub async fn reconnect(&mut self, policy: ReconnectPolicy) -> TransportResult<()> {
		self.reconnects += 1;
		self.close();

		let attempts = policy.max_retries.max(1);
		let mut delay = policy.initial_delay;
		let mut attempt = 0;

		loop {
			attempt += 1;
			match self.connect().await {
				Ok(()) => {
					if attempt > 1 {
						info!("Reconnected after {} attempts", attempt);
					}
					return Ok(());
				}
				Err(e) if attempt >= attempts => {
					error!("Giving up after {} connect attempts: {}", attempts, e);
					return Err(TransportError::ReconnectExhausted { attempts, last: Box::new(e) });
				}
				Err(e) => {
					warn!(
						"Connect attempt {}/{} failed: {} (retrying in {:?})",
						attempt, attempts, e, delay
					);
					tokio::time::sleep(delay).await;
					delay = delay.saturating_mul(2);
				}
			}
		}
	}

	/// Register or clear the byte-progress callback for downloads
	pub fn track_progress(&mut self, handler: Option<ProgressHandler>) {
		self.progress = handler;
	}

	/// List a remote directory
	pub async fn list(&mut self, remote_path: &str) -> TransportResult<Vec<RemoteEntry>> {
		self.guarded(|client| {
			let path = remote_path.to_string();
			Box::pin(async move { client.list(&path).await })
		})
		.await
	}

	/// Download a remote file into a caller-owned file.
	///
	/// The sink is truncated before every attempt, so a retried transfer
	/// never appends to a partial one.
	pub async fn download(&mut self, remote_path: &str, sink: &File) -> TransportResult<u64> {
		let progress = self.progress.clone();

		self.guarded(|client| {
			let path = remote_path.to_string();
			let progress = progress.clone();
			let sink = sink.try_clone().and_then(|mut file| {
				file.set_len(0)?;
				file.seek(SeekFrom::Start(0))?;
				Ok(file)
			});

			Box::pin(async move {
				let sink = sink?;
				client.retrieve(&path, sink, progress).await
			})
		})
		.await
	}

	/// Run `op` under the guard contract
	async fn guarded<T, F>(&mut self, op: F) -> TransportResult<T>
	where
		F: for<'a> Fn(&'a mut C) -> ClientFuture<'a, T>,
	{
		if self.closed {
			self.reconnect(self.policy).await?;
		}

		match op(&mut self.client).await {
			Ok(value) => Ok(value),
			Err(e) if !e.is_transient() => Err(e),
			Err(e) => {
				warn!("connection lost - trying to reconnect ({})", e);
				self.reconnect(self.policy).await?;
				op(&mut self.client).await
			}
		}
	}
}

// vim: ts=4
