//! Shared fixtures: a scripted in-memory FTP client, a loopback FTP server
//! and an event recorder

#![allow(dead_code)]

pub mod fake_ftp;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use ftpmirror::error::TransportError;
use ftpmirror::observer::{MirrorEvent, MirrorObserver, StyleHint};
use ftpmirror::state::{lock, RunState, SharedRunState};
use ftpmirror::sync::{EngineSettings, SyncEngine, SyncRoots};
use ftpmirror::transport::{
	ProgressHandler, ReconnectPolicy, RemoteClient, RemoteEntry, TransportResult, TransportSession,
};

/// Remote root used by every test tree
pub const REMOTE_ROOT: &str = "remote";

/// Server side of the mock: the tree plus failure scripts and call counters
#[derive(Default)]
pub struct MockServer {
	pub listings: HashMap<String, Vec<RemoteEntry>>,
	pub contents: HashMap<String, Vec<u8>>,
	pub connected: bool,

	pub connects: u32,
	pub listed: Vec<String>,
	pub downloaded: Vec<String>,

	/// Fail the next N connect calls
	pub connect_failures: u32,
	/// Fail the next N list calls
	pub list_failures: u32,
	/// Fail the next N retrieve calls after writing some garbage
	pub download_failures: u32,
}

/// Client handle; clones share the same server
#[derive(Clone, Default)]
pub struct MockClient {
	server: Arc<Mutex<MockServer>>,
}

impl MockClient {
	/// Client with an empty remote root
	pub fn new() -> Self {
		let client = MockClient::default();
		client.with(|server| server.listings.insert(REMOTE_ROOT.to_string(), Vec::new()));
		client
	}

	pub fn with<R>(&self, f: impl FnOnce(&mut MockServer) -> R) -> R {
		f(&mut self.server.lock().unwrap())
	}

	/// Add a file entry to `dir`
	pub fn add_file(&self, dir: &str, name: &str, content: &[u8]) -> &Self {
		self.add_entry(dir, RemoteEntry::file(name, content.len() as u64), Some(content))
	}

	/// Add a file entry with a modification time
	pub fn add_file_modified(
		&self,
		dir: &str,
		name: &str,
		content: &[u8],
		modified: SystemTime,
	) -> &Self {
		let entry = RemoteEntry::file(name, content.len() as u64).with_modified(modified);
		self.add_entry(dir, entry, Some(content))
	}

	/// Add a subdirectory entry to `dir`
	pub fn add_dir(&self, dir: &str, name: &str) -> &Self {
		self.with(|server| {
			server.listings.entry(format!("{}/{}", dir, name)).or_default();
		});
		self.add_entry(dir, RemoteEntry::dir(name), None)
	}

	/// Add the "." and ".." artifacts some servers list
	pub fn add_dot_entries(&self, dir: &str) -> &Self {
		self.add_entry(dir, RemoteEntry::dir("."), None);
		self.add_entry(dir, RemoteEntry::dir(".."), None)
	}

	/// Change a file's content (and size) on the server
	pub fn replace_file(&self, dir: &str, name: &str, content: &[u8]) {
		self.with(|server| {
			let listing = server.listings.entry(dir.to_string()).or_default();
			if let Some(entry) = listing.iter_mut().find(|e| e.name == name) {
				entry.size = content.len() as u64;
			}
			server.contents.insert(format!("{}/{}", dir, name), content.to_vec());
		});
	}

	fn add_entry(&self, dir: &str, entry: RemoteEntry, content: Option<&[u8]>) -> &Self {
		self.with(|server| {
			if let Some(content) = content {
				server.contents.insert(format!("{}/{}", dir, entry.name), content.to_vec());
			}
			server.listings.entry(dir.to_string()).or_default().push(entry);
		});
		self
	}

	pub fn connects(&self) -> u32 {
		self.with(|server| server.connects)
	}

	pub fn downloaded(&self) -> Vec<String> {
		self.with(|server| server.downloaded.clone())
	}

	pub fn listed(&self) -> Vec<String> {
		self.with(|server| server.listed.clone())
	}
}

fn refused(what: &str) -> Box<dyn std::error::Error + Send + Sync> {
	format!("{}: connection reset by peer", what).into()
}

#[async_trait]
impl RemoteClient for MockClient {
	async fn connect(&mut self) -> TransportResult<()> {
		self.with(|server| {
			server.connects += 1;
			if server.connect_failures > 0 {
				server.connect_failures -= 1;
				return Err(TransportError::Connect {
					host: "mock".to_string(),
					source: refused("connect"),
				});
			}
			server.connected = true;
			Ok(())
		})
	}

	async fn list(&mut self, path: &str) -> TransportResult<Vec<RemoteEntry>> {
		self.with(|server| {
			server.listed.push(path.to_string());
			if !server.connected {
				return Err(TransportError::NotConnected);
			}
			if server.list_failures > 0 {
				server.list_failures -= 1;
				return Err(TransportError::List { path: path.to_string(), source: refused("list") });
			}
			server.listings.get(path).cloned().ok_or_else(|| TransportError::List {
				path: path.to_string(),
				source: "550 No such directory".into(),
			})
		})
	}

	async fn retrieve(
		&mut self,
		path: &str,
		mut sink: File,
		progress: Option<ProgressHandler>,
	) -> TransportResult<u64> {
		let content = self.with(|server| {
			server.downloaded.push(path.to_string());
			if !server.connected {
				return Err(TransportError::NotConnected);
			}
			if server.download_failures > 0 {
				server.download_failures -= 1;
				let _ = sink.write_all(b"partial garbage");
				return Err(TransportError::Download {
					path: path.to_string(),
					source: refused("retr"),
				});
			}
			server.contents.get(path).cloned().ok_or_else(|| TransportError::Download {
				path: path.to_string(),
				source: "550 No such file".into(),
			})
		})?;

		// two chunks, so progress sees an intermediate value
		let half = content.len() / 2;
		let mut written = 0u64;
		for chunk in [&content[..half], &content[half..]] {
			sink.write_all(chunk).map_err(TransportError::Io)?;
			written += chunk.len() as u64;
			if let Some(progress) = &progress {
				progress(written);
			}
		}
		sink.flush().map_err(TransportError::Io)?;
		Ok(written)
	}

	fn close(&mut self) {
		self.with(|server| server.connected = false);
	}
}

/// Observer that records every event
#[derive(Default)]
pub struct Recorder {
	events: Mutex<Vec<MirrorEvent>>,
}

impl Recorder {
	pub fn events(&self) -> Vec<MirrorEvent> {
		self.events.lock().unwrap().clone()
	}

	/// Processing log lines
	pub fn logs(&self) -> Vec<(String, StyleHint)> {
		self.events()
			.into_iter()
			.filter_map(|event| match event {
				MirrorEvent::Log { text, style } => Some((text, style)),
				_ => None,
			})
			.collect()
	}

	/// Sync log as the dashboard would show it
	pub fn sync_log(&self) -> Vec<(String, StyleHint)> {
		let mut lines: Vec<(String, StyleHint)> = Vec::new();
		for event in self.events() {
			if let MirrorEvent::SyncLog { text, style, replace_previous } = event {
				match lines.last_mut() {
					Some(last) if replace_previous => *last = (text, style),
					_ => lines.push((text, style)),
				}
			}
		}
		lines
	}

	pub fn directories(&self) -> Vec<String> {
		self.events()
			.into_iter()
			.filter_map(|event| match event {
				MirrorEvent::CurrentDirectory { path } => Some(path),
				_ => None,
			})
			.collect()
	}

	pub fn download_statuses(&self) -> Vec<String> {
		self.events()
			.into_iter()
			.filter_map(|event| match event {
				MirrorEvent::Status(snapshot) => Some(snapshot.download_status),
				_ => None,
			})
			.collect()
	}

	pub fn has_log(&self, text: &str) -> bool {
		self.logs().iter().any(|(line, _)| line.contains(text))
	}
}

impl MirrorObserver for Recorder {
	fn on_event(&self, event: MirrorEvent) {
		self.events.lock().unwrap().push(event);
	}
}

/// Guard policy with no real waiting
pub fn fast_policy() -> ReconnectPolicy {
	ReconnectPolicy::new(3, Duration::from_millis(1))
}

pub fn fast_settings() -> EngineSettings {
	EngineSettings { safety_window: Duration::from_secs(60), poll_interval: Duration::from_millis(5) }
}

/// Roots inside a temp dir; the local and staging roots are created
pub fn roots(base: &Path) -> SyncRoots {
	let roots = SyncRoots {
		local: base.join("local"),
		remote: REMOTE_ROOT.to_string(),
		staging: base.join("patch"),
	};
	std::fs::create_dir_all(&roots.local).unwrap();
	std::fs::create_dir_all(&roots.staging).unwrap();
	roots
}

/// Engine over `client` with the continue flag set
pub fn engine(client: &MockClient, recorder: Arc<Recorder>) -> SyncEngine<MockClient> {
	let session =
		Arc::new(tokio::sync::Mutex::new(TransportSession::with_policy(client.clone(), fast_policy())));
	let state = RunState::shared();
	lock(&state).running = true;
	SyncEngine::new(session, state, recorder, fast_settings())
}

/// Pretend the last transfer happened `secs` ago
pub fn age_last_operation(state: &SharedRunState, secs: u64) {
	let past = std::time::Instant::now()
		.checked_sub(Duration::from_secs(secs))
		.expect("monotonic clock too close to its origin");
	lock(state).last_operation = past;
}

// vim: ts=4
