//! Main TUI application and event loop

use crossterm::{
	event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
	execute,
	terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use crate::config::Config;
use crate::observer::{MirrorEvent, MirrorObserver, StyleHint};
use crate::sync::SyncController;
use crate::transport::{FtpClient, RemoteClient};

use super::{
	bridge::{BridgeReceivers, TuiBridge},
	event::{TickGenerator, TuiCommand},
	state::{AppState, ViewType},
	views,
};

/// RAII guard for TUI terminal state
/// Ensures terminal is properly cleaned up even if panic occurs
struct TuiGuard;

impl TuiGuard {
	/// Setup terminal in raw mode
	fn new() -> Result<Self, Box<dyn Error>> {
		enable_raw_mode()?;
		Ok(TuiGuard)
	}
}

impl Drop for TuiGuard {
	fn drop(&mut self) {
		let _ = disable_raw_mode();

		let mut stdout = io::stdout();
		let _ = execute!(stdout, LeaveAlternateScreen);

		// Show cursor if it's hidden
		let _ = write!(io::stdout(), "\x1B[?25h");
		let _ = io::stdout().flush();
	}
}

/// Main TUI application
pub struct TuiApp<C> {
	state: AppState,
	receivers: BridgeReceivers,
	controller: SyncController<C>,
}

impl<C: RemoteClient + 'static> TuiApp<C> {
	/// Create a new TUI application
	pub fn new(
		config: Config,
		controller: SyncController<C>,
		receivers: BridgeReceivers,
	) -> Self {
		TuiApp { state: AppState::new(config), receivers, controller }
	}

	/// Run the TUI application event loop
	pub async fn run<B: ratatui::backend::Backend>(
		&mut self,
		terminal: &mut Terminal<B>,
	) -> Result<(), Box<dyn Error>> {
		let tick_gen = TickGenerator::new(30);

		loop {
			self.state.phase = self.controller.phase();
			terminal.draw(|f| self.render(f))?;

			tokio::select! {
				biased;

				_ = tick_gen.next_tick() => {}

				event = self.receivers.events.recv() => {
					match event {
						Some(event) => self.state.apply(event),
						None => break,
					}
				}

				changed = self.receivers.status.changed() => {
					if changed.is_err() {
						break;
					}
					let latest = self.receivers.status.borrow_and_update().clone();
					if let Some(snapshot) = latest {
						self.state.apply(MirrorEvent::Status(snapshot));
					}
				}

				result = async {
					if event::poll(std::time::Duration::from_millis(10)).unwrap_or(false) {
						event::read().ok()
					} else {
						None
					}
				} => {
					if let Some(CEvent::Key(key)) = result {
						self.handle_key(key);
					}
				}
			}

			if self.state.should_quit {
				break;
			}
		}

		Ok(())
	}

	/// Handle keyboard input
	fn handle_key(&mut self, key: KeyEvent) {
		if key.kind != KeyEventKind::Press {
			return;
		}

		// Global shortcuts, unless the quit popup is waiting for an answer
		if !self.state.confirm_quit {
			match (key.code, key.modifiers) {
				(KeyCode::Char('c'), KeyModifiers::CONTROL)
				| (KeyCode::Char('q'), KeyModifiers::NONE) => {
					self.state.change_view(ViewType::Dashboard);
					self.state.confirm_quit = true;
					return;
				}
				(KeyCode::Char('?'), _) => {
					let view = match self.state.current_view {
						ViewType::Help => ViewType::Dashboard,
						ViewType::Dashboard => ViewType::Help,
					};
					self.state.change_view(view);
					return;
				}
				_ => {}
			}
		}

		let command = match self.state.current_view {
			ViewType::Dashboard => views::dashboard::handle_key(&mut self.state, key),
			ViewType::Help => {
				views::help::handle_key(&mut self.state, key);
				None
			}
		};

		if let Some(command) = command {
			self.dispatch(command);
		}
	}

	/// Apply an operator command to the controller
	fn dispatch(&mut self, command: TuiCommand) {
		match command {
			TuiCommand::StartSync => {
				if let Err(e) = self.controller.start() {
					self.state.add_log(StyleHint::Warning, e.to_string());
				}
			}
			TuiCommand::TogglePause => {
				self.controller.toggle_pause();
			}
			TuiCommand::ResumeSync => {
				self.controller.resume();
			}
			TuiCommand::Reconnect => {
				// outcome is reported through the observer
				drop(self.controller.force_reconnect());
			}
			TuiCommand::Quit => self.controller.quit(),
		}
	}

	/// Render the current view
	fn render(&self, frame: &mut ratatui::Frame) {
		match self.state.current_view {
			ViewType::Dashboard => views::dashboard::render(frame, &self.state),
			ViewType::Help => views::help::render(frame, &self.state),
		}
	}
}

/// Entry point for TUI mode
pub async fn run_tui(config: Config) -> Result<(), Box<dyn Error>> {
	// Terminal is restored when the guard drops
	let _tui_guard = TuiGuard::new()?;

	// Channel first: tracing is routed into it from here on
	let (bridge, receivers) = TuiBridge::channel();
	let bridge: Arc<dyn MirrorObserver> = Arc::new(bridge);
	crate::logging::init_observer_tracing(bridge.clone());

	let mut stdout = io::stdout();
	execute!(stdout, EnterAlternateScreen)?;
	let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

	let controller = SyncController::new(FtpClient::from_config(&config), &config, bridge);
	let mut app = TuiApp::new(config, controller, receivers);

	app.run(&mut terminal).await
}

// vim: ts=4
