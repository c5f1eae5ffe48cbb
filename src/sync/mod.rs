//! Sync engine: walks the remote tree and downloads missing or stale files
//!
//! Files are processed one at a time, in listing order, depth-first. Before
//! every entry the traversal waits on the continue flag, so pausing takes
//! effect at the next entry (within one poll interval) and never interrupts a
//! transfer in flight.

pub mod controller;
mod decision;
mod paths;

pub use controller::SyncController;
pub use decision::{classify, SyncDecision};
pub use paths::{remote_join, SyncPaths};

use filetime::FileTime;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::{Config, SyncTuning};
use crate::error::SyncError;
use crate::logging::*;
use crate::observer::{MirrorEvent, MirrorObserver, ObserverExt, StyleHint};
use crate::progress::{format_download_status, SpeedMeter};
use crate::state::{lock, SharedRunState, IDLE_DOWNLOAD_STATUS};
use crate::transport::{ProgressHandler, RemoteClient, RemoteEntry, TransportSession};

/// Session shared between the traversal and the controller
pub type SharedSession<C> = Arc<tokio::sync::Mutex<TransportSession<C>>>;

type TraverseFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SyncError>> + Send + 'a>>;

/// The three roots a run starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRoots {
	pub local: PathBuf,
	pub remote: String,
	pub staging: PathBuf,
}

impl SyncRoots {
	pub fn from_config(config: &Config) -> Self {
		SyncRoots {
			local: config.local_dir.clone(),
			remote: config.remote_dir.clone(),
			staging: config.patch_dir.clone(),
		}
	}
}

/// Engine timing settings
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
	/// Idle time after which matching files are re-downloaded
	pub safety_window: Duration,

	/// Continue-flag poll interval
	pub poll_interval: Duration,
}

impl EngineSettings {
	pub fn from_tuning(tuning: &SyncTuning) -> Self {
		EngineSettings { safety_window: tuning.safety_window(), poll_interval: tuning.poll_interval() }
	}
}

impl Default for EngineSettings {
	fn default() -> Self {
		Self::from_tuning(&SyncTuning::default())
	}
}

/// Recursive tree-diff and download driver
pub struct SyncEngine<C> {
	session: SharedSession<C>,
	state: SharedRunState,
	observer: Arc<dyn MirrorObserver>,
	settings: EngineSettings,
}

impl<C: RemoteClient> SyncEngine<C> {
	pub fn new(
		session: SharedSession<C>,
		state: SharedRunState,
		observer: Arc<dyn MirrorObserver>,
		settings: EngineSettings,
	) -> Self {
		SyncEngine { session, state, observer, settings }
	}

	pub fn session(&self) -> &SharedSession<C> {
		&self.session
	}

	pub fn state(&self) -> &SharedRunState {
		&self.state
	}

	/// Mirror the whole tree below the configured roots
	pub async fn run(&self, roots: &SyncRoots) -> Result<(), SyncError> {
		self.traverse(&roots.local, &roots.remote, &roots.staging).await
	}

	/// Walk `remote_path`, mirroring into `staging_path` and comparing against
	/// `local_path`
	pub fn traverse<'a>(
		&'a self,
		local_path: &'a Path,
		remote_path: &'a str,
		staging_path: &'a Path,
	) -> TraverseFuture<'a> {
		Box::pin(async move {
			let entries = self.session.lock().await.list(remote_path).await?;

			for entry in entries.iter().filter(|entry| !entry.is_dot_entry()) {
				self.wait_for_continue_flag().await;
				self.publish_status();

				let paths = SyncPaths::derive(local_path, remote_path, staging_path, &entry.name);

				if entry.is_dir() {
					debug!("Entering {}", paths.remote_file);
					self.observer
						.on_event(MirrorEvent::CurrentDirectory { path: paths.remote_file.clone() });
					self.traverse(&paths.local_file, &paths.remote_file, &paths.staging_file)
						.await?;
				} else {
					let decision =
						self.should_download(&paths.local_file, entry, &paths.staging_file).await;
					if decision.needs_download() {
						self.download(entry, &paths, decision).await?;
					} else {
						self.observer.log(format!("{} in sync", entry.name), StyleHint::Info);
					}
				}
			}

			Ok(())
		})
	}

	/// Decide whether `entry` has to be downloaded; counts the file as processed
	pub async fn should_download(
		&self,
		local_file: &Path,
		entry: &RemoteEntry,
		staging_file: &Path,
	) -> SyncDecision {
		let (stale, idle) = {
			let mut state = lock(&self.state);
			state.file_counter += 1;
			let idle = state.last_operation.elapsed();
			(idle > self.settings.safety_window, idle)
		};

		let local_size = file_size(local_file).await;
		let staging_size = match local_size {
			Some(_) => None,
			None => file_size(staging_file).await,
		};

		let decision = classify(local_size, staging_size, entry.size, stale);

		if decision.is_safety() {
			lock(&self.state).pending_safety_reconfirm = true;
			debug!("Safety sync of {} after {}s without transfers", entry.name, idle.as_secs());
			self.observer.log(
				format!("safety sync: {} (idle for {}s)", entry.name, idle.as_secs()),
				StyleHint::Warning,
			);
		}

		decision
	}

	async fn download(
		&self,
		entry: &RemoteEntry,
		paths: &SyncPaths,
		decision: SyncDecision,
	) -> Result<(), SyncError> {
		let safety = decision.is_safety();

		if let Some(parent) = paths.staging_file.parent() {
			tokio::fs::create_dir_all(parent).await.map_err(|e| SyncError::io(parent, e))?;
		}

		debug!("Downloading {} -> {}", paths.remote_file, paths.staging_file.display());
		self.observer.sync_log(format!("- {}", entry.name), StyleHint::Warning, false);

		self.session.lock().await.track_progress(Some(self.progress_handler(entry.size)));
		let result = self.transfer(entry, paths).await;

		if let Ok(bytes) = &result {
			debug!("Downloaded {} ({} bytes)", paths.remote_file, bytes);
			let style = if safety { StyleHint::Muted } else { StyleHint::Success };
			self.observer.sync_log(format!("✓ {}", entry.name), style, true);
		}

		self.session.lock().await.track_progress(None);
		{
			let mut state = lock(&self.state);
			state.download_status = IDLE_DOWNLOAD_STATUS.to_string();
			state.pending_safety_reconfirm = false;
		}
		result?;

		{
			let mut state = lock(&self.state);
			state.last_operation = Instant::now();
			if !safety {
				state.sync_counter += 1;
			}
		}
		self.publish_status();

		Ok(())
	}

	/// Stream the remote file into a fresh staging file and copy its mtime
	async fn transfer(&self, entry: &RemoteEntry, paths: &SyncPaths) -> Result<u64, SyncError> {
		let file = tokio::fs::File::create(&paths.staging_file)
			.await
			.map_err(|e| SyncError::io(&paths.staging_file, e))?
			.into_std()
			.await;

		let bytes = self.session.lock().await.download(&paths.remote_file, &file).await?;
		drop(file);

		if let Some(modified) = entry.modified_at {
			filetime::set_file_mtime(&paths.staging_file, FileTime::from_system_time(modified))
				.map_err(|e| SyncError::io(&paths.staging_file, e))?;
		}

		Ok(bytes)
	}

	/// Progress callback publishing percent and speed of the current download
	fn progress_handler(&self, total: u64) -> ProgressHandler {
		let state = self.state.clone();
		let observer = self.observer.clone();
		let meter = Mutex::new(SpeedMeter::new(Instant::now()));

		Arc::new(move |bytes_overall| {
			let now = Instant::now();
			let speed = meter.lock().unwrap_or_else(|e| e.into_inner()).update(bytes_overall, now);
			let snapshot = {
				let mut state = lock(&state);
				state.download_status = format_download_status(bytes_overall, total, speed);
				state.snapshot(now)
			};
			observer.on_event(MirrorEvent::Status(snapshot));
		})
	}

	/// Block until the continue flag is set
	async fn wait_for_continue_flag(&self) {
		loop {
			let running = lock(&self.state).running;
			if running {
				return;
			}
			tokio::time::sleep(self.settings.poll_interval).await;
		}
	}

	fn publish_status(&self) {
		let snapshot = lock(&self.state).snapshot(Instant::now());
		self.observer.on_event(MirrorEvent::Status(snapshot));
	}
}

/// Size of a regular file, `None` when it does not exist
async fn file_size(path: &Path) -> Option<u64> {
	match tokio::fs::metadata(path).await {
		Ok(meta) if meta.is_file() => Some(meta.len()),
		_ => None,
	}
}

// vim: ts=4
