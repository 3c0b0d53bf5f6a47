//! Filesystem access for script sources.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One directory entry as seen by [`SourceFs::read_dir`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceEntry {
	pub path: PathBuf,
	pub is_dir: bool,
}

/// The filesystem operations the engine performs on script sources.
pub trait SourceFs {
	fn read_to_string(&self, path: &Path) -> io::Result<String>;

	fn modified(&self, path: &Path) -> io::Result<SystemTime>;

	/// Entries of `path` in no particular order.
	fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>>;

	fn is_dir(&self, path: &Path) -> bool;

	/// Stable identity of `path` for cache keys.
	fn canonicalize(&self, path: &Path) -> PathBuf {
		path.to_path_buf()
	}
}

/// [`SourceFs`] over `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFs;

impl SourceFs for OsFs {
	fn read_to_string(&self, path: &Path) -> io::Result<String> {
		std::fs::read_to_string(path)
	}

	fn modified(&self, path: &Path) -> io::Result<SystemTime> {
		std::fs::metadata(path)?.modified()
	}

	fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>> {
		let mut entries = Vec::new();
		for entry in std::fs::read_dir(path)? {
			let entry = entry?;
			entries.push(SourceEntry {
				path: entry.path(),
				is_dir: entry.file_type()?.is_dir(),
			});
		}
		Ok(entries)
	}

	fn is_dir(&self, path: &Path) -> bool {
		path.is_dir()
	}

	fn canonicalize(&self, path: &Path) -> PathBuf {
		std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
	}
}
