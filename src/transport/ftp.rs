//! FTP client backed by `suppaftp`
//!
//! `suppaftp::FtpStream` is blocking, so every call runs on the blocking
//! thread pool. The stream is moved into the blocking task and handed back
//! afterwards; a failed call drops it, leaving the client disconnected.
//!
//! `suppaftp` opens the control connection, logs in and sets the transfer
//! type. LIST and RETR are driven over its control socket here, because file
//! names travel as raw bytes in the configured [`TextEncoding`] and the
//! library only speaks UTF-8. Data connections are always passive.

use async_trait::async_trait;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, UNIX_EPOCH};
use suppaftp::types::FileType;
use suppaftp::FtpStream;

use super::encoding::TextEncoding;
use super::{EntryKind, ProgressHandler, RemoteClient, RemoteEntry, TransportResult};
use crate::config::{Config, FtpConfig};
use crate::error::{BoxError, TransportError};
use crate::logging::*;

/// Read buffer size for file retrieval; progress is reported once per chunk
const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;

/// Socket timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production [`RemoteClient`] speaking FTP
pub struct FtpClient {
	config: FtpConfig,
	encoding: TextEncoding,
	timeout: Duration,
	stream: Option<FtpStream>,
}

impl FtpClient {
	pub fn new(config: FtpConfig) -> Self {
		let encoding = config.encoding().unwrap_or_else(|| {
			warn!("Unsupported encoding '{}', falling back to latin1", config.default_encoding);
			TextEncoding::Latin1
		});
		FtpClient { config, encoding, timeout: DEFAULT_TIMEOUT, stream: None }
	}

	/// Client for a loaded mirror profile
	pub fn from_config(config: &Config) -> Self {
		Self::new(config.ftp_config.clone()).with_timeout(config.sync.timeout())
	}

	/// Bound connect, control replies and data reads by `timeout`
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	fn take_stream(&mut self) -> TransportResult<FtpStream> {
		self.stream.take().ok_or(TransportError::NotConnected)
	}

	/// Build "<verb> <path>\r\n" in the control encoding
	fn command(&self, verb: &str, path: &str) -> Result<Vec<u8>, BoxError> {
		if path.contains(['\r', '\n']) {
			return Err(format!("line break in remote path {:?}", path).into());
		}
		let encoded = self
			.encoding
			.encode(path)
			.ok_or_else(|| format!("{} cannot be encoded as {}", path, self.encoding))?;

		let mut line = format!("{} ", verb).into_bytes();
		line.extend_from_slice(&encoded);
		line.extend_from_slice(b"\r\n");
		Ok(line)
	}
}

fn join_error(e: tokio::task::JoinError) -> BoxError {
	Box::new(e)
}

#[async_trait]
impl RemoteClient for FtpClient {
	async fn connect(&mut self) -> TransportResult<()> {
		self.close();

		let config = self.config.clone();
		let host = config.host.clone();
		let timeout = self.timeout;

		// the greeting is read before the socket timeouts can be set
		let task = tokio::task::spawn_blocking(move || open_control(&config, timeout));
		let result = match tokio::time::timeout(timeout, task).await {
			Ok(joined) => joined.map_err(join_error).and_then(|r| r),
			Err(_) => Err(format!("no answer within {}s", timeout.as_secs_f64()).into()),
		};

		match result {
			Ok(stream) => {
				self.stream = Some(stream);
				Ok(())
			}
			Err(source) => Err(TransportError::Connect { host, source }),
		}
	}

	async fn list(&mut self, path: &str) -> TransportResult<Vec<RemoteEntry>> {
		let list_error = |source| TransportError::List { path: path.to_string(), source };

		let command = self.command("LIST", path).map_err(list_error)?;
		let stream = self.take_stream()?;
		let timeout = self.timeout;

		let (stream, result) = tokio::task::spawn_blocking(move || {
			let result = read_listing(&stream, &command, timeout);
			(stream, result)
		})
		.await
		.map_err(|e| list_error(join_error(e)))?;

		match result {
			Ok(raw) => {
				self.stream = Some(stream);
				Ok(parse_listing(&raw, self.encoding))
			}
			Err(source) => Err(list_error(source)),
		}
	}

	async fn retrieve(
		&mut self,
		path: &str,
		sink: File,
		progress: Option<ProgressHandler>,
	) -> TransportResult<u64> {
		let download_error = |source| TransportError::Download { path: path.to_string(), source };

		let command = self.command("RETR", path).map_err(download_error)?;
		let stream = self.take_stream()?;
		let timeout = self.timeout;

		let (stream, result) = tokio::task::spawn_blocking(move || {
			let result = copy_remote_file(&stream, &command, timeout, sink, progress);
			(stream, result)
		})
		.await
		.map_err(|e| download_error(join_error(e)))?;

		match result {
			Ok(bytes) => {
				self.stream = Some(stream);
				Ok(bytes)
			}
			Err(source) => Err(download_error(source)),
		}
	}

	fn close(&mut self) {
		let Some(mut stream) = self.stream.take() else {
			return;
		};

		// QUIT waits for the server, keep it off the runtime threads
		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				handle.spawn_blocking(move || {
					// fails on a dead connection; the socket is dropped either way
					let _ = stream.quit();
				});
			}
			Err(_) => drop(stream),
		}
	}
}

/// Connect, log in and switch to binary transfers
fn open_control(config: &FtpConfig, timeout: Duration) -> Result<FtpStream, BoxError> {
	let addr = (config.host.as_str(), config.port)
		.to_socket_addrs()?
		.next()
		.ok_or("host name did not resolve to an address")?;

	let mut stream = FtpStream::connect(addr)?;
	let control = stream.get_ref();
	control.set_read_timeout(Some(timeout))?;
	control.set_write_timeout(Some(timeout))?;

	stream.login(config.user.as_str(), config.password.as_str())?;
	stream.transfer_type(FileType::Binary)?;
	Ok(stream)
}

// ============================================================================
// CONTROL CHANNEL
// ============================================================================

/// One server reply; multi-line replies are joined with '\n'
#[derive(Debug)]
struct Reply {
	code: u32,
	text: String,
}

impl Reply {
	fn expect(self, codes: &[u32]) -> Result<Reply, BoxError> {
		if codes.contains(&self.code) {
			Ok(self)
		} else {
			Err(format!("unexpected reply: {}", self.text).into())
		}
	}
}

fn send(control: &TcpStream, line: &[u8]) -> Result<(), BoxError> {
	let mut control = control;
	control.write_all(line)?;
	Ok(())
}

/// Read one control line without the line terminator.
///
/// Reads byte by byte, so nothing past the reply is taken off the socket.
fn read_control_line(control: &TcpStream) -> Result<String, BoxError> {
	let mut reader = control;
	let mut line = Vec::new();
	let mut byte = [0u8; 1];

	loop {
		if reader.read(&mut byte)? == 0 {
			return Err("control connection closed by server".into());
		}
		if byte[0] == b'\n' {
			break;
		}
		line.push(byte[0]);
	}

	if line.last() == Some(&b'\r') {
		line.pop();
	}
	Ok(String::from_utf8_lossy(&line).into_owned())
}

fn read_reply(control: &TcpStream) -> Result<Reply, BoxError> {
	let first = read_control_line(control)?;
	let code = first
		.get(..3)
		.and_then(|code| code.parse::<u32>().ok())
		.ok_or_else(|| format!("malformed reply '{}'", first))?;

	let mut text = first.clone();
	if first.as_bytes().get(3) == Some(&b'-') {
		let last_prefix = format!("{} ", code);
		loop {
			let line = read_control_line(control)?;
			let done = line.starts_with(&last_prefix);
			text.push('\n');
			text.push_str(&line);
			if done {
				break;
			}
		}
	}

	Ok(Reply { code, text })
}

/// Parse the address of a "227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)" reply
fn parse_pasv(text: &str, control_peer: IpAddr) -> Result<SocketAddr, BoxError> {
	let malformed = || -> BoxError { format!("malformed PASV reply '{}'", text).into() };

	let start = text.find('(').ok_or_else(malformed)? + 1;
	let end = text[start..].find(')').ok_or_else(malformed)? + start;
	let numbers = text[start..end]
		.split(',')
		.map(|n| n.trim().parse::<u8>())
		.collect::<Result<Vec<u8>, _>>()
		.map_err(|_| malformed())?;
	if numbers.len() != 6 {
		return Err(malformed());
	}

	let announced = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
	let port = (u16::from(numbers[4]) << 8) | u16::from(numbers[5]);

	// servers behind NAT announce an address we cannot reach
	let ip = if announced.is_unspecified() || (announced.is_private() && !is_local(control_peer)) {
		control_peer
	} else {
		IpAddr::V4(announced)
	};
	Ok(SocketAddr::new(ip, port))
}

fn is_local(ip: IpAddr) -> bool {
	match ip {
		IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
		IpAddr::V6(v6) => v6.is_loopback(),
	}
}

/// Enter passive mode, send `command` and return the data connection
fn open_data(control: &TcpStream, command: &[u8], timeout: Duration) -> Result<TcpStream, BoxError> {
	send(control, b"PASV\r\n")?;
	let reply = read_reply(control)?.expect(&[227])?;
	let addr = parse_pasv(&reply.text, control.peer_addr()?.ip())?;

	let data = TcpStream::connect_timeout(&addr, timeout)?;
	data.set_read_timeout(Some(timeout))?;
	data.set_write_timeout(Some(timeout))?;

	send(control, command)?;
	read_reply(control)?.expect(&[125, 150])?;
	Ok(data)
}

/// Wait for the transfer-complete reply once the data connection is closed
fn finish_data(control: &TcpStream) -> Result<(), BoxError> {
	read_reply(control)?.expect(&[226, 250])?;
	Ok(())
}

/// Run LIST and return the raw listing bytes
fn read_listing(stream: &FtpStream, command: &[u8], timeout: Duration) -> Result<Vec<u8>, BoxError> {
	let control = stream.get_ref();
	let mut data = open_data(control, command, timeout)?;

	let mut raw = Vec::new();
	data.read_to_end(&mut raw)?;
	drop(data);

	finish_data(control)?;
	Ok(raw)
}

/// Copy a remote file into `sink` chunk by chunk
fn copy_remote_file(
	stream: &FtpStream,
	command: &[u8],
	timeout: Duration,
	sink: File,
	progress: Option<ProgressHandler>,
) -> Result<u64, BoxError> {
	let control = stream.get_ref();
	let mut reader = open_data(control, command, timeout)?;
	let mut writer = BufWriter::new(sink);
	let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
	let mut total: u64 = 0;

	loop {
		let n = reader.read(&mut buf)?;
		if n == 0 {
			break;
		}
		writer.write_all(&buf[..n])?;
		total += n as u64;
		if let Some(ref progress) = progress {
			progress(total);
		}
	}

	writer.flush()?;
	drop(reader);
	finish_data(control)?;
	Ok(total)
}

// ============================================================================
// LISTING
// ============================================================================

/// Decode and parse a raw LIST response; undecodable or unparsable lines are skipped
fn parse_listing(raw: &[u8], encoding: TextEncoding) -> Vec<RemoteEntry> {
	raw.split(|&b| b == b'\n')
		.map(|line| line.strip_suffix(&b"\r"[..]).unwrap_or(line))
		.filter(|line| !line.is_empty())
		.filter_map(|line| match encoding.decode(line) {
			Some(text) => parse_list_line(&text),
			None => {
				warn!(
					"Skipping listing line that is not valid {}: {}",
					encoding,
					String::from_utf8_lossy(line)
				);
				None
			}
		})
		.collect()
}

/// Parse one LIST line (unix or DOS style)
fn parse_list_line(line: &str) -> Option<RemoteEntry> {
	match line.parse::<suppaftp::list::File>() {
		Ok(file) => {
			let modified = file.modified();
			Some(RemoteEntry {
				name: file.name().to_string(),
				kind: if file.is_directory() { EntryKind::Directory } else { EntryKind::File },
				size: file.size() as u64,
				modified_at: (modified > UNIX_EPOCH).then(|| modified),
			})
		}
		Err(e) => {
			warn!("Skipping unparsable listing line '{}': {:?}", line, e);
			None
		}
	}
}


// vim: ts=4
