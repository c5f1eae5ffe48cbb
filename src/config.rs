//! Configuration for ftpmirror
//!
//! A mirror profile is a single file holding the FTP credentials and the three
//! directory roots. JSON (and JSON5) as well as TOML are accepted; the format
//! is picked by file extension.
//!
//! ```json
//! {
//!     "ftpConfig": { "host": "ftp.example.com", "user": "me", "password": "secret" },
//!     "localDir": "/mnt/usb",
//!     "remoteDir": "/pub/data",
//!     "patchDir": "/var/lib/ftpmirror/patch"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::transport::{ReconnectPolicy, TextEncoding};

/// Directory searched for config names that are not a path
pub const CONFIG_DIR: &str = "configs";

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// Complete mirror profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
	/// FTP connection settings
	pub ftp_config: FtpConfig,

	/// Primary local mirror root (read only, used for change detection)
	pub local_dir: PathBuf,

	/// Remote root directory to mirror
	pub remote_dir: String,

	/// Staging root where downloads land
	pub patch_dir: PathBuf,

	/// Engine tuning knobs
	#[serde(default)]
	pub sync: SyncTuning,
}

/// FTP connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtpConfig {
	pub host: String,

	#[serde(default = "default_user")]
	pub user: String,

	#[serde(default)]
	pub password: String,

	#[serde(default = "default_port")]
	pub port: u16,

	/// Control channel text encoding
	#[serde(default = "default_encoding")]
	pub default_encoding: String,
}

impl FtpConfig {
	/// Parsed `defaultEncoding`; `None` for an unknown label
	pub fn encoding(&self) -> Option<TextEncoding> {
		TextEncoding::from_label(&self.default_encoding)
	}
}

fn default_user() -> String {
	"anonymous".to_string()
}

fn default_port() -> u16 {
	21
}

fn default_encoding() -> String {
	"latin1".to_string()
}

/// Timing and retry settings of the sync engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncTuning {
	/// Idle time after which matching files are re-downloaded
	pub safety_window_secs: u64,

	/// Continue-flag poll interval while paused
	pub poll_interval_ms: u64,

	/// Status refresh period of the dashboard
	pub status_refresh_ms: u64,

	/// Reconnect attempts used by the session guard
	pub reconnect_attempts: u32,

	/// First backoff delay; doubles after each failed attempt
	pub reconnect_delay_ms: u64,

	/// Reconnect attempts for an operator-forced reconnect
	pub forced_reconnect_attempts: u32,

	/// Connect, reply and data read timeout of the FTP client
	pub timeout_secs: u64,
}

impl Default for SyncTuning {
	fn default() -> Self {
		SyncTuning {
			safety_window_secs: 60,
			poll_interval_ms: 100,
			status_refresh_ms: 1000,
			reconnect_attempts: 3,
			reconnect_delay_ms: 2000,
			forced_reconnect_attempts: 5,
			timeout_secs: 30,
		}
	}
}

impl SyncTuning {
	pub fn safety_window(&self) -> Duration {
		Duration::from_secs(self.safety_window_secs)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn status_refresh(&self) -> Duration {
		Duration::from_millis(self.status_refresh_ms)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Policy used whenever the session guard has to reconnect
	pub fn reconnect_policy(&self) -> ReconnectPolicy {
		ReconnectPolicy {
			max_retries: self.reconnect_attempts,
			initial_delay: Duration::from_millis(self.reconnect_delay_ms),
		}
	}

	/// Policy used when the operator forces a reconnect
	pub fn forced_reconnect_policy(&self) -> ReconnectPolicy {
		ReconnectPolicy {
			max_retries: self.forced_reconnect_attempts,
			initial_delay: Duration::from_millis(self.reconnect_delay_ms),
		}
	}
}

// ============================================================================
// LOADING & VALIDATION
// ============================================================================

impl Config {
	/// Parse a config from text; `toml` selects TOML, anything else JSON5
	pub fn parse(text: &str, path: &Path) -> Result<Config, ConfigError> {
		let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");

		let parsed = if is_toml {
			toml::from_str::<Config>(text).map_err(|e| e.to_string())
		} else {
			json5::from_str::<Config>(text).map_err(|e| e.to_string())
		};

		let config = parsed
			.map_err(|message| ConfigError::Parse { path: path.to_path_buf(), message })?;
		config.validate()?;
		Ok(config)
	}

	/// Read, parse and validate a config file
	pub fn load(path: &Path) -> Result<Config, ConfigError> {
		let text = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
		Config::parse(&text, path)
	}

	/// Check that every field the engine relies on is usable
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.ftp_config.host.trim().is_empty() {
			return Err(invalid("ftpConfig.host must not be empty"));
		}
		if self.ftp_config.port == 0 {
			return Err(invalid("ftpConfig.port must be greater than 0"));
		}
		if self.ftp_config.encoding().is_none() {
			return Err(invalid("ftpConfig.defaultEncoding must be one of utf8, latin1"));
		}
		if self.local_dir.as_os_str().is_empty() {
			return Err(invalid("localDir must not be empty"));
		}
		if self.patch_dir.as_os_str().is_empty() {
			return Err(invalid("patchDir must not be empty"));
		}
		if self.remote_dir.trim().is_empty() {
			return Err(invalid("remoteDir must not be empty"));
		}
		if self.local_dir == self.patch_dir {
			return Err(invalid("localDir and patchDir must be different directories"));
		}
		if self.sync.reconnect_attempts == 0 || self.sync.forced_reconnect_attempts == 0 {
			return Err(invalid("reconnect attempts must be at least 1"));
		}
		if self.sync.poll_interval_ms == 0 || self.sync.status_refresh_ms == 0 {
			return Err(invalid("poll and refresh intervals must be greater than 0"));
		}
		if self.sync.timeout_secs == 0 {
			return Err(invalid("sync.timeoutSecs must be greater than 0"));
		}
		Ok(())
	}
}

fn invalid(message: &str) -> ConfigError {
	ConfigError::Invalid { message: message.to_string() }
}

/// Resolve a config argument: an existing path wins, otherwise the name is
/// looked up in the `configs/` directory.
pub fn resolve_config_path(arg: &str) -> PathBuf {
	let direct = PathBuf::from(arg);
	if direct.exists() {
		return direct;
	}
	PathBuf::from(CONFIG_DIR).join(arg)
}


// vim: ts=4
