//! Engine behaviour against the real filesystem.

use std::cell::Cell;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use graver_document::{CommitError, FlushStats};
use graver_script::{CaptureSink, Console, Diagnostic, Engine, EngineConfig, OsFs, ScriptBackend};
use pretty_assertions::assert_eq;

/// Echoes every source line as output; lines starting with `#` fail to compile.
#[derive(Default)]
struct EchoBackend {
	console: Option<Console>,
	compiles: Rc<Cell<usize>>,
	flushes: Rc<Cell<usize>>,
}

impl ScriptBackend for EchoBackend {
	type Unit = Vec<String>;
	type Scope = ();

	fn compile(&mut self, source: &str, source_name: &str) -> Result<Vec<String>, Diagnostic> {
		self.compiles.set(self.compiles.get() + 1);
		if let Some(line) = source.lines().position(|line| line.starts_with('#')) {
			return Err(Diagnostic::compile(source_name, "comments are not allowed").at(Some(line + 1), Some(1)));
		}
		Ok(source.lines().map(str::to_owned).collect())
	}

	fn new_scope(&mut self) {}

	fn execute(&mut self, unit: &Vec<String>, _scope: &mut ()) -> Result<(), Diagnostic> {
		if let Some(console) = &self.console {
			for line in unit {
				console.print(line.clone());
			}
		}
		Ok(())
	}

	fn attach_console(&mut self, console: Console) {
		self.console = Some(console);
	}

	fn flush(&mut self) -> Result<FlushStats, CommitError> {
		self.flushes.set(self.flushes.get() + 1);
		Ok(FlushStats::default())
	}
}

fn write(path: &Path, source: &str, modified: SystemTime) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap();
	}
	std::fs::write(path, source).unwrap();
	File::options().write(true).open(path).unwrap().set_modified(modified).unwrap();
}

fn engine(dir: &Path) -> (Engine<EchoBackend>, CaptureSink, Rc<Cell<usize>>) {
	let config = EngineConfig::load(dir).unwrap();
	let backend = EchoBackend::default();
	let compiles = backend.compiles.clone();
	let sink = CaptureSink::new();
	(Engine::with_parts(backend, OsFs, config, sink.clone()), sink, compiles)
}

#[test]
fn modified_file_is_recompiled_and_unchanged_file_is_not() {
	let dir = tempfile::tempdir().unwrap();
	let script = dir.path().join("hello.rhai");
	let base = SystemTime::now() - Duration::from_secs(3600);
	write(&script, "first", base);
	let (mut engine, sink, compiles) = engine(dir.path());

	engine.run_file("hello.rhai", None).unwrap();
	engine.run_file("hello.rhai", None).unwrap();
	assert_eq!(compiles.get(), 1);

	write(&script, "second", base + Duration::from_secs(10));
	engine.run_file("hello.rhai", None).unwrap();
	assert_eq!(compiles.get(), 2);
	assert_eq!(sink.outputs(), vec!["first", "first", "second"]);
}

#[test]
fn directory_run_skips_other_files_and_survives_compile_errors() {
	let dir = tempfile::tempdir().unwrap();
	let now = SystemTime::now();
	write(&dir.path().join("tools/a.rhai"), "a", now);
	write(&dir.path().join("tools/deep/b.rhai"), "# broken", now);
	write(&dir.path().join("tools/deep/c.rhai"), "c", now);
	write(&dir.path().join("tools/readme.md"), "not a script", now);
	let (mut engine, sink, _) = engine(dir.path());
	let flushes = engine.backend().flushes.clone();

	let report = engine.run_directory("tools").unwrap();
	assert_eq!((report.executed, report.failed), (3, 1));
	assert_eq!(flushes.get(), 2, "only executed units flush");
	assert_eq!(sink.outputs(), vec!["a", "c"]);

	let diagnostics = engine.take_diagnostics();
	assert_eq!(diagnostics.len(), 1);
	assert!(diagnostics[0].source_name.ends_with("b.rhai"), "{}", diagnostics[0]);
	assert_eq!(diagnostics[0].line, Some(1));
	assert!(engine.diagnostics().is_empty());
}

#[test]
fn startup_directory_comes_from_config() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join("graver.toml"), "startup_dir = \"boot\"\n").unwrap();
	write(&dir.path().join("boot/01.rhai"), "one", SystemTime::now());
	write(&dir.path().join("boot/02.rhai"), "two", SystemTime::now());
	let (mut engine, sink, _) = engine(dir.path());

	let report = engine.run_startup().unwrap();
	assert!(report.is_success());
	assert_eq!(report.executed, 2);
	assert_eq!(sink.outputs(), vec!["one", "two"]);
}
