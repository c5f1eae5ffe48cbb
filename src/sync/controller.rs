//! Run controller: Idle / Running / Paused state machine around the engine

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::{EngineSettings, SharedSession, SyncEngine, SyncRoots};
use crate::config::Config;
use crate::error::SyncError;
use crate::logging::*;
use crate::observer::{MirrorEvent, MirrorObserver, ObserverExt, StyleHint};
use crate::state::{lock, RunPhase, RunState, SharedRunState, StatusSnapshot};
use crate::transport::{ReconnectPolicy, RemoteClient, TransportSession};

/// Drives mirror runs and reacts to operator commands
pub struct SyncController<C> {
	engine: Arc<SyncEngine<C>>,
	roots: SyncRoots,
	observer: Arc<dyn MirrorObserver>,
	status_refresh: Duration,
	forced_policy: ReconnectPolicy,
	run_task: Option<JoinHandle<Result<(), SyncError>>>,
	timer: Option<JoinHandle<()>>,
}

impl<C: RemoteClient + 'static> SyncController<C> {
	/// Build a controller (and its session and engine) from the loaded config
	pub fn new(client: C, config: &Config, observer: Arc<dyn MirrorObserver>) -> Self {
		let tuning = &config.sync;
		let session = Arc::new(tokio::sync::Mutex::new(TransportSession::with_policy(
			client,
			tuning.reconnect_policy(),
		)));
		let engine = SyncEngine::new(
			session,
			RunState::shared(),
			observer.clone(),
			EngineSettings::from_tuning(tuning),
		);

		Self::with_engine(
			engine,
			SyncRoots::from_config(config),
			observer,
			tuning.status_refresh(),
			tuning.forced_reconnect_policy(),
		)
	}

	/// Build a controller around an existing engine
	pub fn with_engine(
		engine: SyncEngine<C>,
		roots: SyncRoots,
		observer: Arc<dyn MirrorObserver>,
		status_refresh: Duration,
		forced_policy: ReconnectPolicy,
	) -> Self {
		SyncController {
			engine: Arc::new(engine),
			roots,
			observer,
			status_refresh,
			forced_policy,
			run_task: None,
			timer: None,
		}
	}

	pub fn phase(&self) -> RunPhase {
		lock(self.engine.state()).phase
	}

	pub fn state(&self) -> SharedRunState {
		self.engine.state().clone()
	}

	pub fn session(&self) -> SharedSession<C> {
		self.engine.session().clone()
	}

	/// Current status values for the dashboard
	pub fn snapshot(&self) -> StatusSnapshot {
		lock(self.engine.state()).snapshot(Instant::now())
	}

	/// Start a new run from the configured roots
	pub fn start(&mut self) -> Result<(), SyncError> {
		{
			let mut state = lock(self.engine.state());
			if state.phase != RunPhase::Idle {
				return Err(SyncError::AlreadyRunning);
			}
			state.begin_run(Instant::now());
			state.phase = RunPhase::Running;
			state.running = true;
		}

		info!("Starting mirror of {} into {}", self.roots.remote, self.roots.staging.display());
		self.start_timer();

		let engine = self.engine.clone();
		let roots = self.roots.clone();
		let observer = self.observer.clone();

		self.run_task = Some(tokio::spawn(async move {
			if let Err(e) = engine.session().lock().await.connect().await {
				// the guard reconnects with backoff on the first listing
				warn!("Initial connect failed: {}", e);
			}

			let result = engine.run(&roots).await;
			finish_run(&engine, observer.as_ref(), &result);
			result
		}));

		Ok(())
	}

	/// Stop before the next entry; returns false when not running
	pub fn pause(&mut self) -> bool {
		{
			let mut state = lock(self.engine.state());
			if state.phase != RunPhase::Running {
				return false;
			}
			state.phase = RunPhase::Paused;
			state.running = false;
		}

		self.stop_timer();
		self.observer.log("processing stopped...", StyleHint::Info);
		true
	}

	/// Continue a paused run; returns false when not paused
	pub fn resume(&mut self) -> bool {
		{
			let mut state = lock(self.engine.state());
			if state.phase != RunPhase::Paused {
				return false;
			}
			state.phase = RunPhase::Running;
			state.running = true;
		}

		self.start_timer();
		self.observer.log("processing continues...", StyleHint::Info);
		true
	}

	pub fn toggle_pause(&mut self) -> bool {
		match self.phase() {
			RunPhase::Running => self.pause(),
			RunPhase::Paused => self.resume(),
			RunPhase::Idle => false,
		}
	}

	/// Tear down the connection and connect again in the background.
	///
	/// Waits for the operation in flight; the run phase is left untouched.
	pub fn force_reconnect(&self) -> JoinHandle<Result<(), SyncError>> {
		let session = self.engine.session().clone();
		let observer = self.observer.clone();
		let policy = self.forced_policy;

		observer.log("forcing reconnect...", StyleHint::Warning);

		tokio::spawn(async move {
			let result = session.lock().await.reconnect(policy).await;
			match &result {
				Ok(()) => observer.log("reconnected to FTP server", StyleHint::Success),
				Err(e) => {
					debug!("Forced reconnect failed: {:?}", e);
					observer.log(format!("reconnect failed: {}", e), StyleHint::Error);
				}
			}
			result.map_err(SyncError::from)
		})
	}

	/// Abort everything and drop the connection
	pub fn quit(&mut self) {
		self.stop_timer();
		if let Some(task) = self.run_task.take() {
			task.abort();
		}

		{
			let mut state = lock(self.engine.state());
			state.phase = RunPhase::Idle;
			state.running = false;
		}

		match self.engine.session().try_lock() {
			Ok(mut session) => session.close(),
			Err(_) => debug!("Session busy on quit, leaving it to the runtime"),
		}
	}

	/// Wait for the current run to end
	pub async fn wait(&mut self) -> Result<(), SyncError> {
		let Some(task) = self.run_task.take() else {
			return Ok(());
		};

		let result = match task.await {
			Ok(result) => result,
			Err(e) => Err(SyncError::Task { message: e.to_string() }),
		};
		self.stop_timer();
		result
	}

	/// Publish a status snapshot every refresh period until the run goes idle
	fn start_timer(&mut self) {
		self.stop_timer();

		let state = self.engine.state().clone();
		let observer = self.observer.clone();
		let period = self.status_refresh;

		self.timer = Some(tokio::spawn(async move {
			let mut interval = tokio::time::interval(period);
			loop {
				interval.tick().await;
				let (phase, snapshot) = {
					let state = lock(&state);
					(state.phase, state.snapshot(Instant::now()))
				};
				observer.on_event(MirrorEvent::Status(snapshot));
				if phase == RunPhase::Idle {
					break;
				}
			}
		}));
	}

	fn stop_timer(&mut self) {
		if let Some(timer) = self.timer.take() {
			timer.abort();
		}
	}
}

impl<C> Drop for SyncController<C> {
	fn drop(&mut self) {
		if let Some(timer) = self.timer.take() {
			timer.abort();
		}
	}
}

/// Report the outcome of a run and return to Idle
fn finish_run<C: RemoteClient>(
	engine: &SyncEngine<C>,
	observer: &dyn MirrorObserver,
	result: &Result<(), SyncError>,
) {
	let snapshot = {
		let mut state = lock(engine.state());
		state.phase = RunPhase::Idle;
		state.running = false;
		state.snapshot(Instant::now())
	};

	match result {
		Ok(()) => {
			debug!("Synchronization finished: {} files synchronized", snapshot.sync_counter);
			observer.log("synchronization finished", StyleHint::Success);
		}
		Err(e) => {
			debug!("Run aborted: {:?}", e);
			observer.log(format!("Error syncing FTP: {}", e), StyleHint::Error);
		}
	}

	observer.on_event(MirrorEvent::Status(snapshot));
}

// vim: ts=4
