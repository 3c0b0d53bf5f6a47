//! Wires a JSON document, the rhai backend and the script engine together.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use graver_document::{CommitManager, MemoryDocument, Session};
use graver_rhai::{RhaiBackend, SharedSession};
use graver_script::{BatchReport, ConsoleSink, Engine, EngineConfig, OsFs};
use tracing::info;

use crate::cli::{Cli, Command};

type CliEngine = Engine<RhaiBackend<MemoryDocument>, OsFs>;

/// What a finished invocation did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
	pub report: BatchReport,
	/// Whether the document file was rewritten.
	pub saved: bool,
}

/// Runs the requested command, then saves the document if anything was committed.
///
/// The document is saved even when a fatal error cut the run short, so commits
/// that already reached it are kept.
pub fn execute(cli: &Cli, sink: impl ConsoleSink + 'static) -> anyhow::Result<Summary> {
	let config_dir = match &cli.config {
		Some(dir) => std::path::absolute(dir).with_context(|| format!("resolving {}", dir.display()))?,
		None => std::env::current_dir().context("resolving the working directory")?,
	};
	let config = EngineConfig::load(&config_dir)?;

	let document_path = cli.command.document();
	let document = load_document(document_path)?;
	let commits = CommitManager::with_max_rounds(config.max_flush_rounds);
	let session: SharedSession<MemoryDocument> = Rc::new(RefCell::new(Session::with_commit_manager(document, commits)));

	let mut engine = Engine::with_parts(RhaiBackend::with_shared(Rc::clone(&session)), OsFs, config, sink);
	let result = run_command(&mut engine, cli);

	let saved = {
		let session = session.borrow();
		let native = session.native();
		if native.commit_count() > 0 {
			save_document(document_path, native)?;
			true
		} else {
			false
		}
	};

	let report = result?;
	info!(executed = report.executed, failed = report.failed, saved, "cli.done");
	Ok(Summary { report, saved })
}

fn run_command(engine: &mut CliEngine, cli: &Cli) -> anyhow::Result<BatchReport> {
	let mut report = BatchReport::default();
	if !cli.no_startup {
		report.merge(engine.run_startup()?);
	}

	match &cli.command {
		Command::Run { path, .. } => {
			// Absolute once resolved, so the engine resolving it again is a no-op.
			let path = engine.config().resolve(path);
			if path.is_dir() {
				report.merge(engine.run_directory(&path)?);
			} else {
				report.record(&engine.run_file(&path, None)?);
			}
		}
		Command::Eval { source, .. } => report.record(&engine.run_source_text(source, None)?),
	}
	Ok(report)
}

pub fn load_document(path: &Path) -> anyhow::Result<MemoryDocument> {
	let json = std::fs::read_to_string(path).with_context(|| format!("reading document {}", path.display()))?;
	MemoryDocument::from_json(&json).with_context(|| format!("parsing document {}", path.display()))
}

pub fn save_document(path: &Path, document: &MemoryDocument) -> anyhow::Result<()> {
	let json = document.to_json().context("serializing document")?;
	std::fs::write(path, json).with_context(|| format!("writing document {}", path.display()))?;
	info!(path = %path.display(), version = %document.version(), "cli.document.saved");
	Ok(())
}
