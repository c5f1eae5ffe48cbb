//! Run state shared between the controller, the engine and the status timer

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Shared handle to the run state
pub type SharedRunState = Arc<Mutex<RunState>>;

/// Status line shown while no download is in flight
pub const IDLE_DOWNLOAD_STATUS: &str = "-";

/// Controller state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
	Idle,
	Running,
	Paused,
}

/// Mutable process-wide run state
#[derive(Debug, Clone)]
pub struct RunState {
	pub phase: RunPhase,

	/// Continue flag polled by the traversal gate
	pub running: bool,

	/// Remote files examined in the current run
	pub file_counter: u64,

	/// Files transferred in the current run (safety re-downloads excluded)
	pub sync_counter: u64,

	/// Time of the last completed download
	pub last_operation: Instant,

	pub run_start: Option<Instant>,

	/// The download in flight is a safety re-download
	pub pending_safety_reconfirm: bool,

	/// Formatted progress of the download in flight
	pub download_status: String,
}

impl RunState {
	pub fn new() -> Self {
		RunState {
			phase: RunPhase::Idle,
			running: false,
			file_counter: 0,
			sync_counter: 0,
			last_operation: Instant::now(),
			run_start: None,
			pending_safety_reconfirm: false,
			download_status: IDLE_DOWNLOAD_STATUS.to_string(),
		}
	}

	/// Wrap a fresh state for sharing
	pub fn shared() -> SharedRunState {
		Arc::new(Mutex::new(RunState::new()))
	}

	/// Reset the per-run fields at the start of a new run
	pub fn begin_run(&mut self, now: Instant) {
		self.file_counter = 0;
		self.sync_counter = 0;
		self.run_start = Some(now);
		self.pending_safety_reconfirm = false;
		self.download_status = IDLE_DOWNLOAD_STATUS.to_string();
	}

	/// Snapshot for the presentation layer
	pub fn snapshot(&self, now: Instant) -> StatusSnapshot {
		let elapsed = self.run_start.map(|start| now.saturating_duration_since(start));

		StatusSnapshot {
			elapsed: format_elapsed(elapsed),
			rate: format_rate(self.file_counter, elapsed),
			file_counter: self.file_counter,
			sync_counter: self.sync_counter,
			download_status: self.download_status.clone(),
		}
	}
}

impl Default for RunState {
	fn default() -> Self {
		Self::new()
	}
}

/// Lock the shared state, recovering from a poisoned mutex
pub fn lock(state: &SharedRunState) -> MutexGuard<'_, RunState> {
	state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Values rendered in the status panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
	pub elapsed: String,
	pub rate: String,
	pub file_counter: u64,
	pub sync_counter: u64,
	pub download_status: String,
}

/// Format a run duration as HH:MM:SS; no run yields "00:00:00"
pub fn format_elapsed(elapsed: Option<Duration>) -> String {
	let secs = elapsed.map(|d| d.as_secs()).unwrap_or(0);
	format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format the processing rate in files per second
pub fn format_rate(files: u64, elapsed: Option<Duration>) -> String {
	match elapsed {
		Some(elapsed) if elapsed.as_secs_f64() > 0.0 => {
			format!("{:.2} files/s", files as f64 / elapsed.as_secs_f64())
		}
		_ => "0 files/s".to_string(),
	}
}


// vim: ts=4
