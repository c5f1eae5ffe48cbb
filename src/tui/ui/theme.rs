//! Color themes and styling

use ratatui::style::{Color, Modifier, Style};

use crate::observer::StyleHint;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
	pub primary: Color,
	pub success: Color,
	pub warning: Color,
	pub error: Color,
	pub text: Color,
	pub text_muted: Color,
	pub log: Color,
}

impl Theme {
	/// Style for normal text
	pub fn text_style(&self) -> Style {
		Style::default().fg(self.text)
	}

	/// Style for muted/secondary text
	pub fn muted_style(&self) -> Style {
		Style::default().fg(self.text_muted)
	}

	/// Style for panel titles
	pub fn header_style(&self) -> Style {
		Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
	}

	/// Style of a processing log line
	pub fn log_style(&self, hint: StyleHint) -> Style {
		match hint {
			StyleHint::Info => Style::default().fg(self.log),
			_ => self.hint_style(hint),
		}
	}

	/// Style of a sync log line
	pub fn hint_style(&self, hint: StyleHint) -> Style {
		match hint {
			StyleHint::Info => self.text_style(),
			StyleHint::Warning => Style::default().fg(self.warning),
			StyleHint::Success => Style::default().fg(self.success).add_modifier(Modifier::BOLD),
			StyleHint::Muted => self.muted_style(),
			StyleHint::Error => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Theme {
			primary: Color::Cyan,
			success: Color::Green,
			warning: Color::Yellow,
			error: Color::Red,
			text: Color::White,
			text_muted: Color::DarkGray,
			log: Color::Green,
		}
	}
}

// vim: ts=4
