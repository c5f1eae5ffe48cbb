//! Remote transport abstraction
//!
//! The sync engine never talks to a protocol client directly. It goes through
//! [`TransportSession`], which wraps any [`RemoteClient`] with the
//! reconnect-and-retry guard. [`FtpClient`] is the production client.

mod encoding;
mod ftp;
mod session;

pub use encoding::TextEncoding;
pub use ftp::{FtpClient, DEFAULT_TIMEOUT};
pub use session::{ReconnectPolicy, TransportSession};

use async_trait::async_trait;
use std::fs::File;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::TransportError;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Byte-progress callback; receives the cumulative bytes of the current transfer
pub type ProgressHandler = Arc<dyn Fn(u64) + Send + Sync>;

/// Kind of a directory listing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
	File,
	Directory,
}

/// One record of a remote directory listing
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntry {
	pub name: String,
	pub kind: EntryKind,
	/// Size in bytes (meaningful for files only)
	pub size: u64,
	pub modified_at: Option<SystemTime>,
}

impl RemoteEntry {
	pub fn file(name: &str, size: u64) -> Self {
		RemoteEntry { name: name.to_string(), kind: EntryKind::File, size, modified_at: None }
	}

	pub fn dir(name: &str) -> Self {
		RemoteEntry { name: name.to_string(), kind: EntryKind::Directory, size: 0, modified_at: None }
	}

	pub fn with_modified(mut self, modified_at: SystemTime) -> Self {
		self.modified_at = Some(modified_at);
		self
	}

	pub fn is_dir(&self) -> bool {
		self.kind == EntryKind::Directory
	}

	/// "." and ".." are listing artifacts, never real entries
	pub fn is_dot_entry(&self) -> bool {
		self.name == "." || self.name == ".."
	}
}

/// Primitive operations of a concrete protocol client
///
/// Implementations report failures as-is; retrying is the session's job.
#[async_trait]
pub trait RemoteClient: Send {
	/// Open the control connection, log in and apply protocol defaults
	async fn connect(&mut self) -> TransportResult<()>;

	/// List a remote directory
	async fn list(&mut self, path: &str) -> TransportResult<Vec<RemoteEntry>>;

	/// Stream a remote file into `sink`, reporting cumulative bytes to `progress`.
	/// Returns the number of bytes written.
	async fn retrieve(
		&mut self,
		path: &str,
		sink: File,
		progress: Option<ProgressHandler>,
	) -> TransportResult<u64>;

	/// Drop the connection; must be safe to call repeatedly
	fn close(&mut self);
}


// vim: ts=4
