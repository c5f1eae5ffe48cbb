//! Sync engine tests - traversal, change detection and download side effects

mod common;

use filetime::FileTime;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use common::{age_last_operation, engine, roots, MockClient, Recorder, REMOTE_ROOT};
use ftpmirror::error::{SyncError, TransportError};
use ftpmirror::observer::StyleHint;
use ftpmirror::state::{lock, IDLE_DOWNLOAD_STATUS};
use ftpmirror::sync::SyncDecision;
use ftpmirror::transport::RemoteEntry;

#[tokio::test]
async fn test_dot_entries_never_processed() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	client.add_dot_entries(REMOTE_ROOT).add_file(REMOTE_ROOT, "a.txt", b"hello");
	let recorder = Arc::new(Recorder::default());
	let engine = engine(&client, recorder.clone());

	engine.run(&roots).await.unwrap();

	assert_eq!(client.listed(), vec!["remote"]);
	assert_eq!(client.downloaded(), vec!["remote/a.txt"]);
	assert_eq!(lock(engine.state()).file_counter, 1);
	assert!(recorder.directories().is_empty());
}

#[tokio::test]
async fn test_recursion_mirrors_tree_into_staging() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "top.txt", b"top").add_dir(REMOTE_ROOT, "dir1");
	client.add_dot_entries("remote/dir1").add_file("remote/dir1", "nested.txt", b"nested");
	let recorder = Arc::new(Recorder::default());
	let engine = engine(&client, recorder.clone());

	engine.run(&roots).await.unwrap();

	assert_eq!(fs::read(roots.staging.join("top.txt")).unwrap(), b"top");
	assert_eq!(fs::read(roots.staging.join("dir1").join("nested.txt")).unwrap(), b"nested");
	assert_eq!(client.listed(), vec!["remote", "remote/dir1"]);
	assert_eq!(recorder.directories(), vec!["remote/dir1"]);

	// nothing lands in the primary mirror
	assert!(!roots.local.join("top.txt").exists());

	let state = lock(engine.state());
	assert_eq!(state.file_counter, 2);
	assert_eq!(state.sync_counter, 2);
	assert_eq!(state.download_status, IDLE_DOWNLOAD_STATUS);
}

#[tokio::test]
async fn test_sync_log_line_replaced_on_completion() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"0123456789");
	let recorder = Arc::new(Recorder::default());
	let engine = engine(&client, recorder.clone());

	engine.run(&roots).await.unwrap();

	assert_eq!(recorder.sync_log(), vec![("✓ a.txt".to_string(), StyleHint::Success)]);

	let statuses = recorder.download_statuses();
	assert!(statuses.iter().any(|s| s.starts_with("50.00% @ ")), "{:?}", statuses);
	assert!(statuses.iter().any(|s| s.starts_with("100.00% @ ") && s.ends_with(" kB/s")));
	assert_eq!(statuses.last().map(String::as_str), Some(IDLE_DOWNLOAD_STATUS));
}

#[tokio::test]
async fn test_local_copy_with_same_size_is_in_sync() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	fs::write(roots.local.join("a.txt"), b"HELLO").unwrap();
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"hello");
	let recorder = Arc::new(Recorder::default());
	let engine = engine(&client, recorder.clone());

	engine.run(&roots).await.unwrap();

	assert!(client.downloaded().is_empty());
	assert!(!roots.staging.join("a.txt").exists());
	assert!(recorder.logs().contains(&("a.txt in sync".to_string(), StyleHint::Info)));
	assert_eq!(lock(engine.state()).file_counter, 1);
}

#[tokio::test]
async fn test_local_size_mismatch_downloads_to_staging() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	fs::write(roots.local.join("a.txt"), b"old").unwrap();
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"new content");
	let engine = engine(&client, Arc::new(Recorder::default()));

	engine.run(&roots).await.unwrap();

	assert_eq!(fs::read(roots.staging.join("a.txt")).unwrap(), b"new content");
	assert_eq!(fs::read(roots.local.join("a.txt")).unwrap(), b"old");
}

#[tokio::test]
async fn test_local_takes_precedence_over_staging() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	fs::write(roots.local.join("a.txt"), b"12345").unwrap();
	fs::write(roots.staging.join("a.txt"), b"1").unwrap();
	let client = MockClient::new();
	let engine = engine(&client, Arc::new(Recorder::default()));

	let decision = engine
		.should_download(
			&roots.local.join("a.txt"),
			&RemoteEntry::file("a.txt", 5),
			&roots.staging.join("a.txt"),
		)
		.await;

	assert_eq!(decision, SyncDecision::InSync);
}

#[tokio::test]
async fn test_second_run_without_changes_downloads_nothing() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"hello").add_dir(REMOTE_ROOT, "sub");
	client.add_file("remote/sub", "b.txt", b"world");
	let engine = engine(&client, Arc::new(Recorder::default()));

	engine.run(&roots).await.unwrap();
	assert_eq!(client.downloaded().len(), 2);

	engine.run(&roots).await.unwrap();
	assert_eq!(client.downloaded().len(), 2);

	// a remote change is picked up by the next run
	client.replace_file(REMOTE_ROOT, "a.txt", b"hello, world");
	engine.run(&roots).await.unwrap();
	assert_eq!(client.downloaded().len(), 3);
	assert_eq!(fs::read(roots.staging.join("a.txt")).unwrap(), b"hello, world");
}

#[tokio::test]
async fn test_stale_window_triggers_safety_resync() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	fs::write(roots.local.join("a.txt"), b"hello").unwrap();
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"hello");
	let recorder = Arc::new(Recorder::default());
	let engine = engine(&client, recorder.clone());
	age_last_operation(engine.state(), 120);

	engine.run(&roots).await.unwrap();

	assert_eq!(client.downloaded(), vec!["remote/a.txt"]);
	assert!(recorder.has_log("safety sync: a.txt"));
	assert_eq!(recorder.sync_log(), vec![("✓ a.txt".to_string(), StyleHint::Muted)]);

	let state = lock(engine.state());
	assert_eq!(state.file_counter, 1);
	assert_eq!(state.sync_counter, 0);
	assert!(!state.pending_safety_reconfirm);
	assert!(state.last_operation.elapsed() < Duration::from_secs(60));
}

#[tokio::test]
async fn test_safety_resync_refreshes_window() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	fs::write(roots.local.join("a.txt"), b"hello").unwrap();
	fs::write(roots.local.join("b.txt"), b"world").unwrap();
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"hello").add_file(REMOTE_ROOT, "b.txt", b"world");
	let engine = engine(&client, Arc::new(Recorder::default()));
	age_last_operation(engine.state(), 120);

	engine.run(&roots).await.unwrap();

	// the first re-download resets the window, the second file stays in sync
	assert_eq!(client.downloaded(), vec!["remote/a.txt"]);
}

#[tokio::test]
async fn test_missing_file_is_new_even_when_stale() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	let engine = engine(&client, Arc::new(Recorder::default()));
	age_last_operation(engine.state(), 120);

	let decision = engine
		.should_download(
			&roots.local.join("a.txt"),
			&RemoteEntry::file("a.txt", 5),
			&roots.staging.join("a.txt"),
		)
		.await;

	assert_eq!(decision, SyncDecision::New);
	assert_eq!(lock(engine.state()).file_counter, 1);
}

#[tokio::test]
async fn test_remote_mtime_copied_to_staging_file() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
	let client = MockClient::new();
	client.add_file_modified(REMOTE_ROOT, "a.txt", b"hello", modified);
	client.add_file(REMOTE_ROOT, "b.txt", b"no mtime");
	let engine = engine(&client, Arc::new(Recorder::default()));

	engine.run(&roots).await.unwrap();

	let meta = fs::metadata(roots.staging.join("a.txt")).unwrap();
	assert_eq!(FileTime::from_last_modification_time(&meta).unix_seconds(), 1_000_000_000);

	let meta = fs::metadata(roots.staging.join("b.txt")).unwrap();
	assert!(FileTime::from_last_modification_time(&meta).unix_seconds() > 1_000_000_000);
}

#[tokio::test]
async fn test_download_failure_aborts_run_and_resets_status() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"hello").add_file(REMOTE_ROOT, "b.txt", b"world");
	client.with(|server| server.download_failures = 2);
	let recorder = Arc::new(Recorder::default());
	let engine = engine(&client, recorder.clone());

	let err = engine.run(&roots).await.unwrap_err();

	assert!(
		matches!(err, SyncError::Transport(TransportError::Download { .. })),
		"unexpected error: {:?}",
		err
	);
	// b.txt is never reached
	assert_eq!(client.downloaded(), vec!["remote/a.txt", "remote/a.txt"]);
	assert_eq!(recorder.sync_log(), vec![("- a.txt".to_string(), StyleHint::Warning)]);

	let state = lock(engine.state());
	assert_eq!(state.sync_counter, 0);
	assert_eq!(state.download_status, IDLE_DOWNLOAD_STATUS);
}

#[tokio::test]
async fn test_listing_error_aborts_run() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	client.with(|server| {
		server.listings.clear();
	});
	let engine = engine(&client, Arc::new(Recorder::default()));

	let err = engine.run(&roots).await.unwrap_err();
	assert!(matches!(err, SyncError::Transport(TransportError::List { .. })));
}

#[tokio::test]
async fn test_cleared_flag_blocks_next_entry() {
	let temp = TempDir::new().unwrap();
	let roots = roots(temp.path());
	let client = MockClient::new();
	client.add_file(REMOTE_ROOT, "a.txt", b"hello").add_file(REMOTE_ROOT, "b.txt", b"world");
	let engine = Arc::new(engine(&client, Arc::new(Recorder::default())));
	lock(engine.state()).running = false;

	let task = {
		let engine = engine.clone();
		let roots = roots.clone();
		tokio::spawn(async move { engine.run(&roots).await })
	};

	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(lock(engine.state()).file_counter, 0);
	assert!(client.downloaded().is_empty());
	assert!(!task.is_finished());

	lock(engine.state()).running = true;
	task.await.unwrap().unwrap();

	assert_eq!(client.downloaded().len(), 2);
	// the root was listed once, resuming does not re-list
	assert_eq!(client.listed(), vec!["remote"]);
}

// vim: ts=4
