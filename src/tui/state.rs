//! Application state management

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::Config;
use crate::observer::{MirrorEvent, StyleHint};
use crate::state::{RunPhase, RunState, StatusSnapshot};

/// Maximum number of lines kept per log panel
pub const MAX_LOG_LINES: usize = 1000;

/// Main application state
pub struct AppState {
	/// Current view being displayed
	pub current_view: ViewType,

	/// Configuration shown in the detail panels
	pub config: Config,

	/// Latest status snapshot
	pub status: StatusSnapshot,

	/// Controller phase, refreshed every frame
	pub phase: RunPhase,

	/// Remote directory the traversal is in
	pub current_dir: Option<String>,

	/// Processing log entries (ring buffer style)
	pub logs: VecDeque<LogEntry>,

	/// Sync log entries: one line per download
	pub sync_logs: VecDeque<LogEntry>,

	/// Quit confirmation popup is open
	pub confirm_quit: bool,

	/// Should the application quit?
	pub should_quit: bool,
}

/// Available view types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
	Dashboard,
	Help,
}

/// A log line with timestamp and style
#[derive(Debug, Clone)]
pub struct LogEntry {
	#[allow(dead_code)]
	pub timestamp: Instant,
	pub style: StyleHint,
	pub message: String,
}

impl LogEntry {
	fn new(style: StyleHint, message: String) -> Self {
		LogEntry { timestamp: Instant::now(), style, message }
	}
}

fn push_capped(log: &mut VecDeque<LogEntry>, entry: LogEntry) {
	log.push_back(entry);
	while log.len() > MAX_LOG_LINES {
		log.pop_front();
	}
}

impl AppState {
	/// Create a new application state
	pub fn new(config: Config) -> Self {
		AppState {
			current_view: ViewType::Dashboard,
			config,
			status: RunState::new().snapshot(Instant::now()),
			phase: RunPhase::Idle,
			current_dir: None,
			logs: VecDeque::with_capacity(MAX_LOG_LINES),
			sync_logs: VecDeque::with_capacity(MAX_LOG_LINES),
			confirm_quit: false,
			should_quit: false,
		}
	}

	/// Add a processing log entry
	pub fn add_log(&mut self, style: StyleHint, message: String) {
		push_capped(&mut self.logs, LogEntry::new(style, message));
	}

	/// Add a sync log entry, or overwrite the last one in place
	pub fn add_sync_log(&mut self, style: StyleHint, message: String, replace_previous: bool) {
		if replace_previous {
			if let Some(last) = self.sync_logs.back_mut() {
				*last = LogEntry::new(style, message);
				return;
			}
		}
		push_capped(&mut self.sync_logs, LogEntry::new(style, message));
	}

	/// Fold an observer event into the state
	pub fn apply(&mut self, event: MirrorEvent) {
		match event {
			MirrorEvent::Status(snapshot) => self.status = snapshot,
			MirrorEvent::Log { text, style } => self.add_log(style, text),
			MirrorEvent::SyncLog { text, style, replace_previous } => {
				self.add_sync_log(style, text, replace_previous)
			}
			MirrorEvent::CurrentDirectory { path } => self.current_dir = Some(path),
		}
	}

	/// Change to a different view
	pub fn change_view(&mut self, view: ViewType) {
		self.current_view = view;
	}
}


// vim: ts=4
