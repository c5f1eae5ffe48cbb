//! Control channel text encodings
//!
//! FTP has no notion of a character set; servers send file names as raw
//! bytes. The configured encoding decides how listing lines are decoded and
//! how paths are encoded into commands.

use std::fmt;

/// Text encoding of the FTP control and listing data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
	Utf8,
	/// ISO-8859-1: every byte maps to the code point of the same value
	Latin1,
}

impl TextEncoding {
	/// Look up an encoding by its config label
	pub fn from_label(label: &str) -> Option<Self> {
		match label.trim().to_ascii_lowercase().as_str() {
			"utf8" | "utf-8" => Some(TextEncoding::Utf8),
			"latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" | "binary" => Some(TextEncoding::Latin1),
			_ => None,
		}
	}

	/// Decode bytes received from the server; `None` when they are not valid text
	pub fn decode(self, bytes: &[u8]) -> Option<String> {
		match self {
			TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
			TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
		}
	}

	/// Encode text for the server; `None` when a character has no mapping
	pub fn encode(self, text: &str) -> Option<Vec<u8>> {
		match self {
			TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
			TextEncoding::Latin1 => text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect(),
		}
	}
}

impl fmt::Display for TextEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TextEncoding::Utf8 => write!(f, "utf8"),
			TextEncoding::Latin1 => write!(f, "latin1"),
		}
	}
}


// vim: ts=4
