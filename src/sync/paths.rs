//! Path mapping between the remote tree, the local root and the staging root

use std::path::{Path, PathBuf};

/// Paths derived for one listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
	pub local_file: PathBuf,
	pub remote_file: String,
	pub staging_file: PathBuf,
}

impl SyncPaths {
	/// Derive the child paths of `name` inside the three parallel directories
	pub fn derive(local_dir: &Path, remote_dir: &str, staging_dir: &Path, name: &str) -> Self {
		SyncPaths {
			local_file: local_dir.join(name),
			remote_file: remote_join(remote_dir, name),
			staging_file: staging_dir.join(name),
		}
	}
}

/// Join a remote directory and an entry name with POSIX separators
pub fn remote_join(dir: &str, name: &str) -> String {
	let name = name.trim_start_matches('/');
	if dir.is_empty() {
		return name.to_string();
	}

	let dir = dir.trim_end_matches('/');
	if dir.is_empty() {
		format!("/{}", name)
	} else {
		format!("{}/{}", dir, name)
	}
}


// vim: ts=4
