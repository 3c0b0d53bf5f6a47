//! Compiled-unit cache keyed by source path.
//!
//! An entry records the modification time observed just before its source was
//! read. A lookup recompiles only when the file's current time is strictly newer,
//! so an edit that lands during compilation is picked up by the next lookup.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::diagnostic::Diagnostic;
use crate::fs::SourceFs;

struct CacheEntry<U> {
	unit: Rc<U>,
	modified: SystemTime,
}

/// Cache of compiled units shared by every run in a process.
pub struct ScriptCache<U> {
	entries: FxHashMap<PathBuf, CacheEntry<U>>,
}

impl<U> Default for ScriptCache<U> {
	fn default() -> Self {
		Self::new()
	}
}

impl<U> std::fmt::Debug for ScriptCache<U> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScriptCache").field("len", &self.entries.len()).finish()
	}
}

impl<U> ScriptCache<U> {
	pub fn new() -> Self {
		Self {
			entries: FxHashMap::default(),
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, fs: &(impl SourceFs + ?Sized), path: &Path) -> bool {
		self.entries.contains_key(&fs.canonicalize(path))
	}

	/// Drops the entry for `path`; the next lookup compiles from source.
	pub fn invalidate(&mut self, fs: &(impl SourceFs + ?Sized), path: &Path) -> bool {
		self.entries.remove(&fs.canonicalize(path)).is_some()
	}

	/// Returns the compiled unit for `path`, compiling when absent, outdated or forced.
	///
	/// A failed compile leaves any previous entry in place, except when `force` is
	/// set, where the old entry is evicted.
	pub fn get_or_compile<F>(&mut self, fs: &(impl SourceFs + ?Sized), path: &Path, force: bool, compile: F) -> Result<Rc<U>, Diagnostic>
	where
		F: FnOnce(&str, &str) -> Result<U, Diagnostic>,
	{
		let key = fs.canonicalize(path);
		let source_name = path.display().to_string();
		let modified = fs.modified(path).map_err(|error| Diagnostic::io(&source_name, &error))?;

		if !force
			&& let Some(entry) = self.entries.get(&key)
			&& modified <= entry.modified
		{
			trace!(path = %source_name, "script.cache.hit");
			return Ok(Rc::clone(&entry.unit));
		}

		let compiled = fs
			.read_to_string(path)
			.map_err(|error| Diagnostic::io(&source_name, &error))
			.and_then(|source| compile(&source, &source_name));

		match compiled {
			Ok(unit) => {
				debug!(path = %source_name, force, "script.cache.compile");
				let unit = Rc::new(unit);
				self.entries.insert(
					key,
					CacheEntry {
						unit: Rc::clone(&unit),
						modified,
					},
				);
				Ok(unit)
			}
			Err(diagnostic) => {
				warn!(path = %source_name, force, %diagnostic, "script.cache.compile_failed");
				if force {
					self.entries.remove(&key);
				}
				Err(diagnostic)
			}
		}
	}
}
