//! Help and keybindings view

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
	layout::{Constraint, Rect},
	style::{Modifier, Style},
	text::{Line, Span},
	widgets::{Block, Borders, Paragraph},
	Frame,
};

use crate::tui::state::{AppState, ViewType};
use crate::tui::ui::layout::vertical_split;
use crate::tui::ui::theme::Theme;

/// Render the help view
pub fn render(frame: &mut Frame, _state: &AppState) {
	let theme = Theme::default();
	let chunks = vertical_split(
		frame.area(),
		&[Constraint::Length(3), Constraint::Min(10), Constraint::Length(3)],
	);

	render_header(frame, chunks[0], &theme);
	render_content(frame, chunks[1]);
	render_footer(frame, chunks[2], &theme);
}

fn render_header(frame: &mut Frame, area: Rect, theme: &Theme) {
	let header = Paragraph::new("Help - Keybindings")
		.style(theme.header_style())
		.block(Block::default().borders(Borders::ALL).title(" Help "));

	frame.render_widget(header, area);
}

fn render_content(frame: &mut Frame, area: Rect) {
	let bold = Style::default().add_modifier(Modifier::BOLD);
	let lines = vec![
		Line::from(Span::styled("Mirror Commands:", bold)),
		Line::from("  s             Start a mirror run"),
		Line::from("  x             Pause/Resume processing"),
		Line::from("  c             Continue a paused run"),
		Line::from("  r             Force a reconnect to the FTP server"),
		Line::from(""),
		Line::from(Span::styled("Global Commands:", bold)),
		Line::from("  Ctrl+C, q     Quit (asks for confirmation)"),
		Line::from("  ?             Show this help"),
		Line::from(""),
		Line::from(Span::styled("Sync Log Colors:", bold)),
		Line::from("  yellow        Download in progress"),
		Line::from("  green         Downloaded"),
		Line::from("  gray          Re-downloaded after a long idle period"),
	];

	let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));

	frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, theme: &Theme) {
	let footer = Paragraph::new("[Esc] Back to dashboard")
		.style(theme.muted_style())
		.block(Block::default().borders(Borders::ALL));

	frame.render_widget(footer, area);
}

/// Handle keyboard input in help view
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
	if key.code == KeyCode::Esc {
		state.change_view(ViewType::Dashboard);
	}
}

// vim: ts=4
