use graver_document::{CommitError, FlushStats};

use crate::console::Console;
use crate::diagnostic::Diagnostic;

/// An interpreter the [`Engine`](crate::Engine) drives.
///
/// The backend owns the document session scripts write to; the engine only asks
/// it to flush at the end of every run.
pub trait ScriptBackend {
	/// A compiled script, reusable across runs.
	type Unit;
	/// Variables persisting across runs that share it.
	type Scope;

	fn compile(&mut self, source: &str, source_name: &str) -> Result<Self::Unit, Diagnostic>;

	fn new_scope(&mut self) -> Self::Scope;

	fn execute(&mut self, unit: &Self::Unit, scope: &mut Self::Scope) -> Result<(), Diagnostic>;

	/// Routes script output to `console`. Called once when the engine is built.
	fn attach_console(&mut self, console: Console);

	/// Commits every pending document edit.
	fn flush(&mut self) -> Result<FlushStats, CommitError>;
}
