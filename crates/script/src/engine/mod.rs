//! The script run loop.
//!
//! Every top-level run follows the same sequence: compile (cached for files),
//! suppress console output, execute, flush the backend's pending edits, report
//! any failure, release the console. The flush happens even when the script
//! failed, so edits made before the failure are committed.
//!
//! Script failures are recovered here and reported as [`RunOutcome::Failed`].
//! Flush failures are fatal and surface as [`EngineError`].

use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use graver_document::{CommitError, FlushStats};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::ScriptBackend;
use crate::cache::ScriptCache;
use crate::config::EngineConfig;
use crate::console::{Console, ConsoleSink, StdioSink};
use crate::diagnostic::Diagnostic;
use crate::fs::{OsFs, SourceFs};

#[derive(Debug, Error)]
pub enum EngineError {
	#[error("flush failed: {0}")]
	Commit(#[from] CommitError),
	#[error("failed to list {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// Result of one top-level run that did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
	Completed { flushed: FlushStats },
	/// The script did not compile or stopped with an error. Edits made before the
	/// error are in `flushed`.
	Failed { diagnostic: Diagnostic, flushed: FlushStats },
}

impl RunOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Completed { .. })
	}

	pub fn flushed(&self) -> FlushStats {
		match self {
			Self::Completed { flushed } | Self::Failed { flushed, .. } => *flushed,
		}
	}

	pub fn diagnostic(&self) -> Option<&Diagnostic> {
		match self {
			Self::Completed { .. } => None,
			Self::Failed { diagnostic, .. } => Some(diagnostic),
		}
	}
}

/// Summary of a directory run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
	pub executed: usize,
	pub failed: usize,
}

impl BatchReport {
	pub fn is_success(&self) -> bool {
		self.failed == 0
	}

	pub fn record(&mut self, outcome: &RunOutcome) {
		self.executed += 1;
		if !outcome.is_success() {
			self.failed += 1;
		}
	}

	pub fn merge(&mut self, other: BatchReport) {
		self.executed += other.executed;
		self.failed += other.failed;
	}
}

/// Runs scripts through a [`ScriptBackend`], caching compiled files.
pub struct Engine<B: ScriptBackend, F = OsFs> {
	backend: B,
	fs: F,
	config: EngineConfig,
	cache: ScriptCache<B::Unit>,
	console: Console,
	diagnostics: Vec<Diagnostic>,
}

impl<B: ScriptBackend> Engine<B> {
	/// An engine on the real filesystem printing to stdout and stderr.
	pub fn new(backend: B, config: EngineConfig) -> Self {
		Self::with_parts(backend, OsFs, config, StdioSink)
	}
}

impl<B: ScriptBackend, F: SourceFs> Engine<B, F> {
	pub fn with_parts(mut backend: B, fs: F, config: EngineConfig, sink: impl ConsoleSink + 'static) -> Self {
		let console = Console::new(sink);
		backend.attach_console(console.clone());
		Self {
			backend,
			fs,
			config,
			cache: ScriptCache::new(),
			console,
			diagnostics: Vec::new(),
		}
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn backend_mut(&mut self) -> &mut B {
		&mut self.backend
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn cache(&self) -> &ScriptCache<B::Unit> {
		&self.cache
	}

	pub fn console(&self) -> &Console {
		&self.console
	}

	/// Every diagnostic reported since the last [`Engine::take_diagnostics`].
	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}

	pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
		std::mem::take(&mut self.diagnostics)
	}

	pub fn into_backend(self) -> B {
		self.backend
	}

	/// Compiled unit for a script file, recompiling when the file changed or `force` is set.
	pub fn get_or_compile(&mut self, path: impl AsRef<Path>, force: bool) -> Result<Rc<B::Unit>, Diagnostic> {
		let path = self.config.resolve(path.as_ref());
		self.compile_file(&path, force)
	}

	/// Runs a script file, creating a fresh scope unless one is supplied.
	pub fn run_file(&mut self, path: impl AsRef<Path>, scope: Option<&mut B::Scope>) -> Result<RunOutcome, EngineError> {
		let path = self.config.resolve(path.as_ref());
		self.run_resolved(&path, scope)
	}

	/// Compiles and runs source text. The compiled unit is not cached.
	pub fn run_source_text(&mut self, source: &str, scope: Option<&mut B::Scope>) -> Result<RunOutcome, EngineError> {
		let source_name = self.config.console_name.clone();
		let unit = match self.backend.compile(source, &source_name) {
			Ok(unit) => unit,
			Err(diagnostic) => return Ok(self.compile_failed(diagnostic)),
		};
		self.run_unit(&unit, scope, &source_name)
	}

	/// Runs every source file under `dir`, recursively, in lexicographic path order.
	///
	/// A failing script is reported and the batch continues. A failed flush aborts it.
	pub fn run_directory(&mut self, dir: impl AsRef<Path>) -> Result<BatchReport, EngineError> {
		let dir = self.config.resolve(dir.as_ref());
		self.run_directory_resolved(&dir)
	}

	/// Runs the startup directory, if it exists.
	pub fn run_startup(&mut self) -> Result<BatchReport, EngineError> {
		let dir = self.config.startup_path();
		if !self.fs.is_dir(&dir) {
			debug!(dir = %dir.display(), "script.startup.absent");
			return Ok(BatchReport::default());
		}
		self.run_directory_resolved(&dir)
	}

	fn run_directory_resolved(&mut self, dir: &Path) -> Result<BatchReport, EngineError> {
		let mut files = Vec::new();
		self.collect_sources(dir, &mut files)?;

		let mut report = BatchReport::default();
		for file in files {
			let outcome = self.run_resolved(&file, None)?;
			report.record(&outcome);
		}
		info!(dir = %dir.display(), executed = report.executed, failed = report.failed, "script.batch.done");
		Ok(report)
	}

	fn run_resolved(&mut self, path: &Path, scope: Option<&mut B::Scope>) -> Result<RunOutcome, EngineError> {
		let unit = match self.compile_file(path, false) {
			Ok(unit) => unit,
			Err(diagnostic) => return Ok(self.compile_failed(diagnostic)),
		};
		let source_name = path.display().to_string();
		self.run_unit(&unit, scope, &source_name)
	}

	fn compile_file(&mut self, path: &Path, force: bool) -> Result<Rc<B::Unit>, Diagnostic> {
		let backend = &mut self.backend;
		self.cache
			.get_or_compile(&self.fs, path, force, |source, source_name| backend.compile(source, source_name))
	}

	fn compile_failed(&mut self, diagnostic: Diagnostic) -> RunOutcome {
		self.report(diagnostic.clone());
		RunOutcome::Failed {
			diagnostic,
			flushed: FlushStats::default(),
		}
	}

	fn run_unit(&mut self, unit: &B::Unit, scope: Option<&mut B::Scope>, source_name: &str) -> Result<RunOutcome, EngineError> {
		let quiet = self.console.suppress();
		debug!(source = source_name, "script.run");

		let mut fresh;
		let scope = match scope {
			Some(scope) => scope,
			None => {
				fresh = self.backend.new_scope();
				&mut fresh
			}
		};
		let result = self.backend.execute(unit, scope);
		let flushed = self.backend.flush();

		if let Err(diagnostic) = &result {
			warn!(source = source_name, %diagnostic, "script.run.failed");
			self.report(diagnostic.clone());
		}
		drop(quiet);

		let flushed = flushed.inspect_err(|error| warn!(source = source_name, %error, "script.run.flush_failed"))?;
		Ok(match result {
			Ok(()) => RunOutcome::Completed { flushed },
			Err(diagnostic) => RunOutcome::Failed { diagnostic, flushed },
		})
	}

	fn report(&mut self, diagnostic: Diagnostic) {
		self.console.report(diagnostic.clone());
		self.diagnostics.push(diagnostic);
	}

	fn collect_sources(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), EngineError> {
		let mut entries = self.fs.read_dir(dir).map_err(|source| EngineError::Io {
			path: dir.to_path_buf(),
			source,
		})?;
		entries.sort();
		for entry in entries {
			if entry.is_dir {
				self.collect_sources(&entry.path, files)?;
			} else if self.config.is_source(&entry.path) {
				files.push(entry.path);
			}
		}
		Ok(())
	}
}
