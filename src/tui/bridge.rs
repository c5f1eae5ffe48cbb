//! Bridge between sync engine and TUI
//!
//! Log and directory events go through an unbounded queue so none is lost
//! while the dashboard is busy drawing. Status snapshots are only ever
//! rendered as the latest value, so they are published on a watch channel
//! and coalesce instead of queueing.

use tokio::sync::{mpsc, watch};

use crate::observer::{MirrorEvent, MirrorObserver};
use crate::state::StatusSnapshot;

/// Observer that forwards mirror events to the TUI
pub struct TuiBridge {
	event_tx: mpsc::UnboundedSender<MirrorEvent>,
	status_tx: watch::Sender<Option<StatusSnapshot>>,
}

/// Receiving ends of a [`TuiBridge`]
pub struct BridgeReceivers {
	pub events: mpsc::UnboundedReceiver<MirrorEvent>,
	pub status: watch::Receiver<Option<StatusSnapshot>>,
}

impl TuiBridge {
	/// Create a bridge together with the receivers the event loop reads
	pub fn channel() -> (Self, BridgeReceivers) {
		let (event_tx, events) = mpsc::unbounded_channel();
		let (status_tx, status) = watch::channel(None);
		(TuiBridge { event_tx, status_tx }, BridgeReceivers { events, status })
	}
}

impl MirrorObserver for TuiBridge {
	fn on_event(&self, event: MirrorEvent) {
		match event {
			MirrorEvent::Status(snapshot) => {
				self.status_tx.send_replace(Some(snapshot));
			}
			// no receiver means the dashboard is gone
			other => {
				let _ = self.event_tx.send(other);
			}
		}
	}
}


// vim: ts=4
