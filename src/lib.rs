//! # ftpmirror - One-way FTP Mirroring Tool
//!
//! ftpmirror walks a remote directory tree over FTP and downloads every file
//! that is missing or changed into a local staging ("patch") directory. A
//! primary local mirror is consulted first for change detection, so only the
//! difference lands in the staging tree.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ftpmirror::{config::Config, progress::CliObserver, sync::SyncController, transport::FtpClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("configs/site.json".as_ref())?;
//!     ftpmirror::runtime::run_until_quit(async {
//!         let client = FtpClient::from_config(&config);
//!         let mut controller = SyncController::new(client, &config, Arc::new(CliObserver::new()));
//!         controller.start()?;
//!         controller.wait().await?;
//!         Ok(())
//!     })?
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod observer;
pub mod progress;
pub mod runtime;
pub mod state;
pub mod sync;
pub mod transport;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types and functions
pub use config::{Config, FtpConfig, SyncTuning};
pub use error::{ConfigError, SyncError, TransportError};
pub use observer::{MirrorEvent, MirrorObserver, StyleHint};
pub use sync::{SyncController, SyncDecision, SyncEngine};

// vim: ts=4
