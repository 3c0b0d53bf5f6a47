//! Engine configuration loaded from `graver.toml`.

use std::io;
use std::path::{Path, PathBuf};

use graver_document::DEFAULT_MAX_FLUSH_ROUNDS;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File name looked up by [`EngineConfig::load`].
pub const CONFIG_FILE_NAME: &str = "graver.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("invalid config {}: {source}", path.display())]
	Toml {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

/// Engine settings. Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
	/// Root for relative script paths.
	pub script_dir: PathBuf,
	/// Scripts run by [`Engine::run_startup`](crate::Engine::run_startup), relative to `script_dir`.
	pub startup_dir: PathBuf,
	/// Extension of source files picked up by directory runs, without the dot.
	pub extension: String,
	/// Worklist bound handed to the commit manager.
	pub max_flush_rounds: usize,
	/// Source name reported for source text runs.
	pub console_name: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			script_dir: PathBuf::from("."),
			startup_dir: PathBuf::from("startup"),
			extension: "rhai".to_owned(),
			max_flush_rounds: DEFAULT_MAX_FLUSH_ROUNDS,
			console_name: "console".to_owned(),
		}
	}
}

impl EngineConfig {
	/// Reads `dir/graver.toml`, falling back to defaults when it does not exist.
	///
	/// A relative `script_dir` is anchored at `dir`.
	pub fn load(dir: &Path) -> Result<Self, ConfigError> {
		let path = dir.join(CONFIG_FILE_NAME);
		let mut config = match std::fs::read_to_string(&path) {
			Ok(content) => Self::from_toml_str(&content).map_err(|source| ConfigError::Toml { path: path.clone(), source })?,
			Err(error) if error.kind() == io::ErrorKind::NotFound => Self::default(),
			Err(source) => return Err(ConfigError::Io { path, source }),
		};
		config.script_dir = anchor(dir, &config.script_dir);
		debug!(path = %path.display(), script_dir = %config.script_dir.display(), "config.load");
		Ok(config)
	}

	pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(content)
	}

	/// Resolves a script path against `script_dir`.
	pub fn resolve(&self, path: &Path) -> PathBuf {
		anchor(&self.script_dir, path)
	}

	pub fn startup_path(&self) -> PathBuf {
		self.resolve(&self.startup_dir)
	}

	/// Whether `path` carries the configured source extension.
	pub fn is_source(&self, path: &Path) -> bool {
		path.extension().is_some_and(|extension| extension == self.extension.as_str())
	}
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else if path == Path::new(".") {
		base.to_path_buf()
	} else {
		base.join(path)
	}
}

#[cfg(test)]
mod tests;
