//! Dashboard view: settings, status, current directory and the two logs

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
	layout::{Alignment, Constraint, Rect},
	text::{Line, Span},
	widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
	Frame,
};
use std::collections::VecDeque;

use crate::state::RunPhase;
use crate::tui::event::TuiCommand;
use crate::tui::state::{AppState, LogEntry};
use crate::tui::ui::layout::{centered_rect, horizontal_split, vertical_split};
use crate::tui::ui::theme::Theme;

/// Render the dashboard view
pub fn render(frame: &mut Frame, state: &AppState) {
	let theme = Theme::default();
	let rows = vertical_split(
		frame.area(),
		&[
			Constraint::Percentage(20),
			Constraint::Percentage(20),
			Constraint::Min(5),
			Constraint::Length(1),
		],
	);

	let top = horizontal_split(
		rows[0],
		&[Constraint::Percentage(33), Constraint::Percentage(34), Constraint::Percentage(33)],
	);
	render_ftp_details(frame, top[0], state, &theme);
	render_path_settings(frame, top[1], state, &theme);
	render_status(frame, top[2], state, &theme);

	render_progress(frame, rows[1], state, &theme);

	let logs = horizontal_split(rows[2], &[Constraint::Percentage(70), Constraint::Percentage(30)]);
	render_log(frame, logs[0], " Processing Log ", &state.logs, &theme, true);
	render_log(frame, logs[1], " Sync Log ", &state.sync_logs, &theme, false);

	render_footer(frame, rows[3], state, &theme);

	if state.confirm_quit {
		render_confirm_quit(frame, &theme);
	}
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
	Block::default()
		.borders(Borders::ALL)
		.title(Span::styled(title, theme.header_style()))
}

fn render_ftp_details(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
	let ftp = &state.config.ftp_config;
	let user = if ftp.user.is_empty() { "anonymous" } else { ftp.user.as_str() };

	let lines = vec![
		Line::from(format!("Host: {}", ftp.host)),
		Line::from(format!("User: {}", user)),
		Line::from("Pass: ********"),
		Line::from(format!("Port: {}", ftp.port)),
	];

	let paragraph = Paragraph::new(lines).style(theme.text_style()).block(panel(" FTP Details ", theme));
	frame.render_widget(paragraph, area);
}

fn render_path_settings(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
	let config = &state.config;
	let lines = vec![
		Line::from(format!("USB directory: {}", config.local_dir.display())),
		Line::from(format!("Patch Directory: {}", config.patch_dir.display())),
		Line::from(format!("FTP path: {}", config.remote_dir)),
	];

	let paragraph =
		Paragraph::new(lines).style(theme.text_style()).block(panel(" Path Settings ", theme));
	frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
	let status = &state.status;
	let phase = match state.phase {
		RunPhase::Idle => "idle",
		RunPhase::Running => "running",
		RunPhase::Paused => "paused",
	};

	let items = vec![
		ListItem::new(format!("elapsed time: {}", status.elapsed)),
		ListItem::new(format!("files processed: {} @ {}", status.file_counter, status.rate)),
		ListItem::new(format!("files synchronized: {}", status.sync_counter)),
		ListItem::new(format!("Download: {}", status.download_status)),
	];

	let title = format!(" Status ({}) ", phase);
	let list = List::new(items).style(theme.text_style()).block(
		Block::default().borders(Borders::ALL).title(Span::styled(title, theme.header_style())),
	);
	frame.render_widget(list, area);
}

fn render_progress(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
	let line = match &state.current_dir {
		Some(dir) => Line::from(format!("current remote directory: {}", dir)),
		None => Line::from(Span::styled("press [s] to start", theme.muted_style())),
	};

	let paragraph = Paragraph::new(line).block(panel(" Sync Progress ", theme));
	frame.render_widget(paragraph, area);
}

/// Render the tail of a log that fits into `area`
fn render_log(
	frame: &mut Frame,
	area: Rect,
	title: &str,
	log: &VecDeque<LogEntry>,
	theme: &Theme,
	processing: bool,
) {
	let visible = area.height.saturating_sub(2) as usize;
	let items: Vec<ListItem> = log
		.iter()
		.skip(log.len().saturating_sub(visible))
		.map(|entry| {
			let style =
				if processing { theme.log_style(entry.style) } else { theme.hint_style(entry.style) };
			ListItem::new(Span::styled(entry.message.clone(), style))
		})
		.collect();

	let list = List::new(items).block(panel(title, theme));
	frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
	let pause = if state.phase == RunPhase::Paused { "[x] Resume" } else { "[x] Pause" };
	let footer = Paragraph::new(format!(
		"[s] Start  {}  [c] Continue  [r] Reconnect  [?] Help  [q] Quit",
		pause
	))
	.style(theme.muted_style());

	frame.render_widget(footer, area);
}

fn render_confirm_quit(frame: &mut Frame, theme: &Theme) {
	let area = centered_rect(50, 20, frame.area());
	let popup = Paragraph::new(vec![
		Line::from("Are you sure to quit?"),
		Line::from(""),
		Line::from("[y] Yes  [n] No"),
	])
	.alignment(Alignment::Center)
	.style(theme.text_style())
	.block(panel(" Confirm ", theme));

	frame.render_widget(Clear, area);
	frame.render_widget(popup, area);
}

/// Map a key pressed on the dashboard to a controller command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<TuiCommand> {
	if state.confirm_quit {
		match key.code {
			KeyCode::Char('y') | KeyCode::Char('Y') => {
				state.confirm_quit = false;
				state.should_quit = true;
				return Some(TuiCommand::Quit);
			}
			KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
				state.confirm_quit = false;
			}
			_ => {}
		}
		return None;
	}

	match key.code {
		KeyCode::Char('s') => Some(TuiCommand::StartSync),
		KeyCode::Char('x') => Some(TuiCommand::TogglePause),
		KeyCode::Char('c') => Some(TuiCommand::ResumeSync),
		KeyCode::Char('r') => Some(TuiCommand::Reconnect),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Config;
	use crossterm::event::KeyModifiers;
	use ratatui::{backend::TestBackend, Terminal};

	fn test_state() -> AppState {
		let config: Config = serde_json::from_str(
			r#"{
				"ftpConfig": { "host": "ftp.example.com", "user": "", "password": "secret" },
				"localDir": "/mnt/usb",
				"remoteDir": "/pub",
				"patchDir": "/var/patch"
			}"#,
		)
		.unwrap();
		AppState::new(config)
	}

	fn key(c: char) -> KeyEvent {
		KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
	}

	#[test]
	fn test_command_keys() {
		let mut state = test_state();
		assert_eq!(handle_key(&mut state, key('s')), Some(TuiCommand::StartSync));
		assert_eq!(handle_key(&mut state, key('x')), Some(TuiCommand::TogglePause));
		assert_eq!(handle_key(&mut state, key('c')), Some(TuiCommand::ResumeSync));
		assert_eq!(handle_key(&mut state, key('r')), Some(TuiCommand::Reconnect));
		assert_eq!(handle_key(&mut state, key('z')), None);
	}

	#[test]
	fn test_confirm_popup_swallows_keys() {
		let mut state = test_state();
		state.confirm_quit = true;

		assert_eq!(handle_key(&mut state, key('s')), None);
		assert!(state.confirm_quit);

		assert_eq!(handle_key(&mut state, key('n')), None);
		assert!(!state.confirm_quit);
		assert!(!state.should_quit);

		state.confirm_quit = true;
		assert_eq!(handle_key(&mut state, key('y')), Some(TuiCommand::Quit));
		assert!(state.should_quit);
	}

	#[test]
	fn test_render_shows_settings_and_popup() {
		let mut state = test_state();
		state.confirm_quit = true;

		let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
		terminal.draw(|f| render(f, &state)).unwrap();

		let buffer = terminal.backend().buffer();
		let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
		assert!(text.contains("Host: ftp.example.com"));
		assert!(text.contains("User: anonymous"));
		assert!(text.contains("Pass: ********"));
		assert!(text.contains("Are you sure to quit?"));
		assert!(!text.contains("secret"));
	}
}

// vim: ts=4
