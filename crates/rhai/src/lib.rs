//! [Rhai](https://rhai.rs) backend for the graver script engine.
//!
//! Scripts see the document through a shared [`Session`]:
//!
//! ```rhai
//! let style = item(1).style;
//! style.fill_color = rgb(1, 0.5, 0);
//! style.dash_array = [4, 2];
//! print(style.stroke_width);
//! ```
//!
//! Undefined attributes read as `()`; assigning `()` clears one.

use std::cell::RefCell;
use std::rc::Rc;

use graver_document::{CommitError, FlushStats, ItemDirectory, NativeDocument, Session};
use graver_script::{Console, Diagnostic, ScriptBackend};
use rhai::{AST, EvalAltResult, ParseError, Position, Scope};
use tracing::{debug, warn};

mod api;
mod values;

/// A session shared between the backend and the functions it registers.
pub type SharedSession<N> = Rc<RefCell<Session<N>>>;

/// A compiled script together with the name diagnostics report it under.
#[derive(Debug, Clone)]
pub struct RhaiUnit {
	ast: AST,
	source_name: String,
}

impl RhaiUnit {
	pub fn source_name(&self) -> &str {
		&self.source_name
	}
}

pub struct RhaiBackend<N> {
	engine: rhai::Engine,
	session: SharedSession<N>,
	console: Rc<RefCell<Option<Console>>>,
}

impl<N: NativeDocument + ItemDirectory + 'static> RhaiBackend<N> {
	pub fn new(session: Session<N>) -> Self {
		Self::with_shared(Rc::new(RefCell::new(session)))
	}

	/// Builds a backend over a session the host keeps a handle to.
	pub fn with_shared(session: SharedSession<N>) -> Self {
		let console: Rc<RefCell<Option<Console>>> = Rc::default();
		let mut engine = rhai::Engine::new();

		let printer = Rc::clone(&console);
		engine.on_print(move |text| match printer.borrow().as_ref() {
			Some(console) => console.print(text),
			None => warn!(text, "script.print.detached"),
		});
		engine.on_debug(|text, source, position| {
			debug!(source = source.unwrap_or("<unnamed>"), %position, text, "script.debug");
		});

		api::register_colors(&mut engine);
		api::register_styles(&mut engine, &session);
		api::register_items(&mut engine, &session);

		Self { engine, session, console }
	}

	pub fn session(&self) -> &SharedSession<N> {
		&self.session
	}

	/// The underlying interpreter, for hosts that register further functions.
	pub fn engine_mut(&mut self) -> &mut rhai::Engine {
		&mut self.engine
	}
}

fn position(position: Position) -> (Option<usize>, Option<usize>) {
	(position.line(), position.position())
}

fn compile_diagnostic(source_name: &str, err: ParseError) -> Diagnostic {
	let ParseError(kind, at) = err;
	let (line, column) = position(at);
	Diagnostic::compile(source_name, kind.to_string()).at(line, column)
}

fn runtime_diagnostic(source_name: &str, mut err: EvalAltResult) -> Diagnostic {
	let (line, column) = position(err.take_position());
	Diagnostic::runtime(source_name, err.to_string()).at(line, column)
}

impl<N: NativeDocument + ItemDirectory + 'static> ScriptBackend for RhaiBackend<N> {
	type Unit = RhaiUnit;
	type Scope = Scope<'static>;

	fn compile(&mut self, source: &str, source_name: &str) -> Result<RhaiUnit, Diagnostic> {
		let mut ast = self.engine.compile(source).map_err(|err| compile_diagnostic(source_name, err))?;
		ast.set_source(source_name);
		Ok(RhaiUnit {
			ast,
			source_name: source_name.to_owned(),
		})
	}

	fn new_scope(&mut self) -> Scope<'static> {
		Scope::new()
	}

	fn execute(&mut self, unit: &RhaiUnit, scope: &mut Scope<'static>) -> Result<(), Diagnostic> {
		self.engine
			.run_ast_with_scope(scope, &unit.ast)
			.map_err(|err| runtime_diagnostic(&unit.source_name, *err))
	}

	fn attach_console(&mut self, console: Console) {
		*self.console.borrow_mut() = Some(console);
	}

	fn flush(&mut self) -> Result<FlushStats, CommitError> {
		self.session.borrow_mut().flush()
	}
}

#[cfg(test)]
mod tests;
