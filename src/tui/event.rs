//! Event types and handling for the TUI

use std::time::Duration;

/// Commands sent from the TUI to the sync controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiCommand {
	StartSync,
	TogglePause,
	ResumeSync,
	Reconnect,
	Quit,
}

/// Generates tick events at a fixed rate
pub struct TickGenerator {
	interval: Duration,
}

impl TickGenerator {
	/// Create a new tick generator with target FPS
	pub fn new(fps: u32) -> Self {
		let interval = Duration::from_millis(1000 / fps.max(1) as u64);
		TickGenerator { interval }
	}

	/// Wait for next tick
	pub async fn next_tick(&self) {
		tokio::time::sleep(self.interval).await;
	}
}


// vim: ts=4
