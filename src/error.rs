//! Error types for ftpmirror operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Boxed error coming from the protocol client library
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Main error type for a mirror run
#[derive(Debug)]
pub enum SyncError {
	/// Remote side failed and could not be recovered by the session guard
	Transport(TransportError),

	/// Local filesystem error while writing into the staging tree
	Io { path: PathBuf, source: io::Error },

	/// Invalid or unreadable configuration
	Config(ConfigError),

	/// A run was requested while another one is still in progress
	AlreadyRunning,

	/// Background task failed to complete (panic or cancellation)
	Task { message: String },
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::Transport(e) => write!(f, "{}", e),
			SyncError::Io { path, source } => {
				write!(f, "I/O error on {}: {}", path.display(), source)
			}
			SyncError::Config(e) => write!(f, "Configuration error: {}", e),
			SyncError::AlreadyRunning => write!(f, "Synchronization is already running"),
			SyncError::Task { message } => write!(f, "Background task failed: {}", message),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::Transport(e) => Some(e),
			SyncError::Io { source, .. } => Some(source),
			SyncError::Config(e) => Some(e),
			_ => None,
		}
	}
}

impl From<TransportError> for SyncError {
	fn from(e: TransportError) -> Self {
		SyncError::Transport(e)
	}
}

impl From<ConfigError> for SyncError {
	fn from(e: ConfigError) -> Self {
		SyncError::Config(e)
	}
}

impl SyncError {
	/// Wrap an I/O error with the path it happened on
	pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
		SyncError::Io { path: path.into(), source }
	}
}

/// Errors raised by the transport layer
#[derive(Debug)]
pub enum TransportError {
	/// Handshake or login failed
	Connect { host: String, source: BoxError },

	/// Directory listing failed
	List { path: String, source: BoxError },

	/// File retrieval failed
	Download { path: String, source: BoxError },

	/// Every reconnect attempt failed; fatal for the current run
	ReconnectExhausted { attempts: u32, last: Box<TransportError> },

	/// Operation attempted without a live connection
	NotConnected,

	/// Local I/O on the caller-owned sink failed
	Io(io::Error),
}

impl TransportError {
	/// Whether the error can be caused by a dropped connection.
	///
	/// Local sink failures and exhausted reconnects are never retried.
	pub fn is_transient(&self) -> bool {
		!matches!(self, TransportError::Io(_) | TransportError::ReconnectExhausted { .. })
	}

	/// Whether this is the fatal reconnect exhaustion error
	pub fn is_fatal(&self) -> bool {
		matches!(self, TransportError::ReconnectExhausted { .. })
	}
}

impl fmt::Display for TransportError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransportError::Connect { host, source } => {
				write!(f, "Failed to connect to {}: {}", host, source)
			}
			TransportError::List { path, source } => {
				write!(f, "Failed to list {}: {}", path, source)
			}
			TransportError::Download { path, source } => {
				write!(f, "Failed to download {}: {}", path, source)
			}
			TransportError::ReconnectExhausted { attempts, last } => {
				write!(f, "Failed to connect after {} attempts: {}", attempts, last)
			}
			TransportError::NotConnected => write!(f, "Not connected"),
			TransportError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for TransportError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			TransportError::Connect { source, .. }
			| TransportError::List { source, .. }
			| TransportError::Download { source, .. } => Some(source.as_ref()),
			TransportError::ReconnectExhausted { last, .. } => Some(last.as_ref()),
			TransportError::Io(e) => Some(e),
			TransportError::NotConnected => None,
		}
	}
}

impl From<io::Error> for TransportError {
	fn from(e: io::Error) -> Self {
		TransportError::Io(e)
	}
}

/// Configuration loading and validation errors
#[derive(Debug)]
pub enum ConfigError {
	/// Config file could not be read
	Read { path: PathBuf, source: io::Error },

	/// Config file could not be parsed
	Parse { path: PathBuf, message: String },

	/// A field is missing or holds an unusable value
	Invalid { message: String },
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Read { path, source } => {
				write!(f, "Cannot read config file {}: {}", path.display(), source)
			}
			ConfigError::Parse { path, message } => {
				write!(f, "Cannot parse config file {}: {}", path.display(), message)
			}
			ConfigError::Invalid { message } => write!(f, "Invalid configuration: {}", message),
		}
	}
}

impl Error for ConfigError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			ConfigError::Read { source, .. } => Some(source),
			_ => None,
		}
	}
}


// vim: ts=4
