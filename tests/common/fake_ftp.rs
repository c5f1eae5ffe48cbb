//! Scripted FTP server on a loopback socket
//!
//! Speaks just enough of the protocol for `FtpClient`: login, TYPE, PASV,
//! LIST, RETR and QUIT. Paths and listings are raw bytes so tests can serve
//! names that are not UTF-8. Every command line is recorded as received.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ftpmirror::config::FtpConfig;

/// How long a silent server keeps the control connection open
const SILENT_HOLD: Duration = Duration::from_secs(5);

#[derive(Default)]
pub struct FakeFtpState {
	/// LIST responses keyed by raw path
	pub listings: HashMap<Vec<u8>, Vec<u8>>,
	/// RETR contents keyed by raw path
	pub files: HashMap<Vec<u8>, Vec<u8>>,
	/// Raw command lines without CRLF
	pub commands: Vec<Vec<u8>>,
	/// Sleep before sending RETR data
	pub retr_stall: Option<Duration>,
	/// Accept connections but never send the greeting
	pub silent: bool,
}

pub struct FakeFtpServer {
	port: u16,
	state: Arc<Mutex<FakeFtpState>>,
}

impl FakeFtpServer {
	pub fn start(state: FakeFtpState) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let port = listener.local_addr().unwrap().port();
		let state = Arc::new(Mutex::new(state));

		let shared = state.clone();
		thread::spawn(move || {
			for control in listener.incoming().flatten() {
				let shared = shared.clone();
				thread::spawn(move || {
					// a client hanging up mid-session is not a server failure
					let _ = serve(control, shared);
				});
			}
		});

		FakeFtpServer { port, state }
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	/// Client settings pointing at this server
	pub fn ftp_config(&self, encoding: &str) -> FtpConfig {
		FtpConfig {
			host: "127.0.0.1".to_string(),
			user: "mirror".to_string(),
			password: "secret".to_string(),
			port: self.port,
			default_encoding: encoding.to_string(),
		}
	}

	pub fn commands(&self) -> Vec<Vec<u8>> {
		self.state.lock().unwrap().commands.clone()
	}

	/// Whether a command starting with `verb` was received
	pub fn saw(&self, verb: &str) -> bool {
		self.commands().iter().any(|line| line.starts_with(verb.as_bytes()))
	}

	pub fn count(&self, verb: &str) -> usize {
		self.commands().iter().filter(|line| line.starts_with(verb.as_bytes())).count()
	}
}

fn reply(control: &mut TcpStream, line: &str) -> std::io::Result<()> {
	control.write_all(line.as_bytes())?;
	control.write_all(b"\r\n")
}

fn serve(mut control: TcpStream, state: Arc<Mutex<FakeFtpState>>) -> std::io::Result<()> {
	if state.lock().unwrap().silent {
		thread::sleep(SILENT_HOLD);
		return Ok(());
	}

	let mut reader = BufReader::new(control.try_clone()?);
	let mut passive: Option<TcpListener> = None;
	reply(&mut control, "220 fake server ready")?;

	loop {
		let mut line = Vec::new();
		if reader.read_until(b'\n', &mut line)? == 0 {
			return Ok(());
		}
		while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
			line.pop();
		}
		state.lock().unwrap().commands.push(line.clone());

		let (verb, arg) = match line.iter().position(|&b| b == b' ') {
			Some(i) => (line[..i].to_vec(), line[i + 1..].to_vec()),
			None => (line.clone(), Vec::new()),
		};

		match verb.as_slice() {
			b"USER" => reply(&mut control, "331 password please")?,
			b"PASS" => reply(&mut control, "230 logged in")?,
			b"TYPE" => reply(&mut control, "200 type set")?,
			b"PASV" => {
				let listener = TcpListener::bind("127.0.0.1:0")?;
				let port = listener.local_addr()?.port();
				passive = Some(listener);
				reply(
					&mut control,
					&format!("227 Entering Passive Mode (127,0,0,1,{},{})", port >> 8, port & 0xff),
				)?;
			}
			b"LIST" | b"RETR" => {
				let (payload, stall) = {
					let state = state.lock().unwrap();
					let payload = if verb == b"LIST" {
						state.listings.get(&arg).cloned()
					} else {
						state.files.get(&arg).cloned()
					};
					(payload, if verb == b"RETR" { state.retr_stall } else { None })
				};

				let (Some(payload), Some(listener)) = (payload, passive.take()) else {
					reply(&mut control, "550 no such file or directory")?;
					continue;
				};

				let (mut data, _) = listener.accept()?;
				reply(&mut control, "150 opening data connection")?;
				if let Some(stall) = stall {
					thread::sleep(stall);
				}
				data.write_all(&payload)?;
				drop(data);
				reply(&mut control, "226 transfer complete")?;
			}
			b"QUIT" => {
				reply(&mut control, "221 bye")?;
				return Ok(());
			}
			_ => reply(&mut control, "502 not implemented")?,
		}
	}
}

// vim: ts=4
