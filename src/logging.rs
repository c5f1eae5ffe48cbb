//! Logging prelude module for convenient access to tracing macros.
//!
//! This module provides convenient re-exports of common tracing macros
//! to reduce verbosity and maintain consistency across the codebase.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("This is an info message");
//! warn!("This is a warning");
//! error!("An error occurred");
//! debug!("Debug information");
//! ```
//!
//! Records that duplicate an observer event are logged at debug level, so the
//! processing log does not show them twice.

pub use tracing::{debug, error, info, warn};

use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::observer::{MirrorEvent, MirrorObserver, StyleHint};

fn env_filter() -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber with environment filter support.
///
/// By default, logs at INFO level and above are displayed. Control the log level
/// with the `RUST_LOG` environment variable:
///
/// ```bash
/// RUST_LOG=debug ftpmirror configs/site.json
/// RUST_LOG=ftpmirror::transport=debug ftpmirror --headless site
/// ```
pub fn init_tracing() {
	tracing_subscriber::fmt().with_env_filter(env_filter()).with_writer(std::io::stderr).init();
}

/// Initialize tracing so that records end up in the observer's processing log
/// instead of the terminal (used while the dashboard owns the screen).
///
/// The observer must not log through tracing itself.
pub fn init_observer_tracing(observer: Arc<dyn MirrorObserver>) {
	tracing_subscriber::registry().with(env_filter()).with(ObserverLayer::new(observer)).init();
}

/// Layer forwarding every record as a [`MirrorEvent::Log`]
pub struct ObserverLayer {
	observer: Arc<dyn MirrorObserver>,
}

impl ObserverLayer {
	pub fn new(observer: Arc<dyn MirrorObserver>) -> Self {
		ObserverLayer { observer }
	}
}

impl<S: Subscriber> Layer<S> for ObserverLayer {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let mut visitor = MessageVisitor::default();
		event.record(&mut visitor);

		let style = match *event.metadata().level() {
			Level::ERROR => StyleHint::Error,
			Level::WARN => StyleHint::Warning,
			Level::INFO => StyleHint::Info,
			_ => StyleHint::Muted,
		};

		self.observer.on_event(MirrorEvent::Log { text: visitor.message, style });
	}
}

/// Collects the message and any extra fields of a record into one line
#[derive(Default)]
struct MessageVisitor {
	message: String,
}

impl Visit for MessageVisitor {
	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message.insert_str(0, value);
		} else {
			let _ = write!(self.message, " {}={}", field.name(), value);
		}
	}

	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == "message" {
			self.message.insert_str(0, &format!("{:?}", value));
		} else {
			let _ = write!(self.message, " {}={:?}", field.name(), value);
		}
	}
}


// vim: ts=4
