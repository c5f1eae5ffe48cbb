//! Transfer progress formatting and the headless observer
//!
//! The dashboard renders mirror events itself; without it the
//! [`CliObserver`] turns them into log records.

pub mod constants;

use std::sync::Mutex;
use std::time::Instant;

use crate::logging::*;
use crate::observer::{MirrorEvent, MirrorObserver, StyleHint};
use crate::state::IDLE_DOWNLOAD_STATUS;

/// Progress display constants
pub use constants::*;

/// Transfer speed from the byte delta between two progress callbacks
#[derive(Debug, Clone)]
pub struct SpeedMeter {
	last_bytes: u64,
	last_time: Instant,
	speed: f64,
}

impl SpeedMeter {
	pub fn new(start: Instant) -> Self {
		SpeedMeter { last_bytes: 0, last_time: start, speed: 0.0 }
	}

	/// Feed the cumulative byte count; returns the speed in kB/s.
	///
	/// Callbacks arriving within the same instant keep the previous speed.
	pub fn update(&mut self, bytes_overall: u64, now: Instant) -> f64 {
		let elapsed = now.saturating_duration_since(self.last_time).as_secs_f64();
		if elapsed > 0.0 {
			let delta = bytes_overall.saturating_sub(self.last_bytes) as f64;
			self.speed = delta / elapsed / BYTES_PER_KB;
			self.last_bytes = bytes_overall;
			self.last_time = now;
		}
		self.speed
	}
}

/// Format download progress as "XX.XX% @ S.SS kB/s"
pub fn format_download_status(bytes_overall: u64, total: u64, speed: f64) -> String {
	let percent = if total == 0 { 100.0 } else { bytes_overall as f64 / total as f64 * 100.0 };
	format!("{:.2}% @ {:.2} kB/s", percent, speed)
}

/// Headless observer: mirror events become tracing records
pub struct CliObserver {
	last_update: Mutex<Instant>,
}

impl CliObserver {
	pub fn new() -> Self {
		CliObserver { last_update: Mutex::new(Instant::now()) }
	}

	/// True at most once per throttle interval
	fn should_report(&self) -> bool {
		let mut last = self.last_update.lock().unwrap_or_else(|e| e.into_inner());
		if last.elapsed().as_millis() < UPDATE_THROTTLE_MS {
			return false;
		}
		*last = Instant::now();
		true
	}
}

impl Default for CliObserver {
	fn default() -> Self {
		Self::new()
	}
}

impl MirrorObserver for CliObserver {
	fn on_event(&self, event: MirrorEvent) {
		match event {
			MirrorEvent::Status(snapshot) => {
				if snapshot.download_status != IDLE_DOWNLOAD_STATUS && self.should_report() {
					info!(
						"  Download: {} | files processed: {} @ {} | files synchronized: {}",
						snapshot.download_status,
						snapshot.file_counter,
						snapshot.rate,
						snapshot.sync_counter
					);
				}
			}
			MirrorEvent::Log { text, style } => match style {
				StyleHint::Error => error!("{}", text),
				StyleHint::Warning => warn!("{}", text),
				StyleHint::Muted => debug!("{}", text),
				StyleHint::Info | StyleHint::Success => info!("{}", text),
			},
			MirrorEvent::SyncLog { text, replace_previous, .. } => {
				// the completion line replaces the start line; log only that one
				if replace_previous {
					info!("{}", text);
				} else {
					debug!("{}", text);
				}
			}
			MirrorEvent::CurrentDirectory { path } => {
				info!("current remote directory: {}", path);
			}
		}
	}
}


// vim: ts=4
