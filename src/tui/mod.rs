//! Terminal dashboard for ftpmirror
//!
//! This module is only compiled when the 'tui' feature is enabled.
//! It shows the connection and path settings, the run status, the current
//! remote directory and two log panels, and maps keys to controller commands.

mod app;
mod bridge;
mod event;
mod state;
mod ui;
mod views;

pub use app::run_tui;

// vim: ts=4
