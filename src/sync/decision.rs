//! Change detection: does a remote file need to be downloaded?

/// Outcome of comparing a remote file against the local and staging copies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
	/// Neither the local nor the staging copy exists
	New,
	/// The compared copy differs in size
	SizeChanged,
	/// The copy matches, but the safety window elapsed; re-download to re-verify
	SafetyResync,
	/// The copy matches and the window is fresh
	InSync,
}

impl SyncDecision {
	pub fn needs_download(self) -> bool {
		!matches!(self, SyncDecision::InSync)
	}

	pub fn is_safety(self) -> bool {
		matches!(self, SyncDecision::SafetyResync)
	}
}

/// Classify a remote file.
///
/// The local copy takes precedence over the staging copy; a file present in
/// neither is always new, regardless of staleness.
pub fn classify(
	local_size: Option<u64>,
	staging_size: Option<u64>,
	remote_size: u64,
	stale: bool,
) -> SyncDecision {
	match local_size.or(staging_size) {
		None => SyncDecision::New,
		Some(size) if size != remote_size => SyncDecision::SizeChanged,
		Some(_) if stale => SyncDecision::SafetyResync,
		Some(_) => SyncDecision::InSync,
	}
}


// vim: ts=4
