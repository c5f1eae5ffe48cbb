//! Presentation callbacks emitted by the sync engine and controller

use crate::state::StatusSnapshot;

/// Styling hint for a log line; the presentation layer picks the colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleHint {
	Info,
	/// Download starting, safety notices
	Warning,
	/// Download finished
	Success,
	/// Safety re-download finished
	Muted,
	/// Run aborted
	Error,
}

/// Events published to the dashboard (or any other observer)
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorEvent {
	/// Fresh status snapshot
	Status(StatusSnapshot),

	/// Line for the processing log
	Log { text: String, style: StyleHint },

	/// Line for the sync log; `replace_previous` swaps out the last line in place
	SyncLog { text: String, style: StyleHint, replace_previous: bool },

	/// Traversal entered a remote directory
	CurrentDirectory { path: String },
}

/// Receives mirror events
pub trait MirrorObserver: Send + Sync {
	fn on_event(&self, _event: MirrorEvent) {}
}

impl<T: Fn(MirrorEvent) + Send + Sync> MirrorObserver for T {
	fn on_event(&self, event: MirrorEvent) {
		self(event);
	}
}

/// Convenience emitters shared by engine and controller
pub(crate) trait ObserverExt {
	fn log(&self, text: impl Into<String>, style: StyleHint);
	fn sync_log(&self, text: impl Into<String>, style: StyleHint, replace_previous: bool);
}

impl<O: MirrorObserver + ?Sized> ObserverExt for O {
	fn log(&self, text: impl Into<String>, style: StyleHint) {
		self.on_event(MirrorEvent::Log { text: text.into(), style });
	}

	fn sync_log(&self, text: impl Into<String>, style: StyleHint, replace_previous: bool) {
		self.on_event(MirrorEvent::SyncLog { text: text.into(), style, replace_previous });
	}
}


// vim: ts=4
