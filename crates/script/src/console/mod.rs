//! Ordered console output with suppression while scripts run.
//!
//! Script output and diagnostics share one queue so their relative order
//! survives buffering. While any [`Suppression`] is alive events are queued;
//! dropping the last one releases the queue to the sink in order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write as _};
use std::rc::Rc;

use crate::diagnostic::Diagnostic;

/// One line of script output or one diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleEvent {
	Output(String),
	Diagnostic(Diagnostic),
}

/// Destination of released console events.
pub trait ConsoleSink {
	fn output(&mut self, line: &str);

	fn diagnostic(&mut self, diagnostic: &Diagnostic);
}

/// Writes output to stdout and diagnostics to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdioSink;

impl ConsoleSink for StdioSink {
	fn output(&mut self, line: &str) {
		let _ = writeln!(io::stdout().lock(), "{line}");
	}

	fn diagnostic(&mut self, diagnostic: &Diagnostic) {
		let _ = writeln!(io::stderr().lock(), "{diagnostic}");
	}
}

/// Records released events for inspection.
#[derive(Clone, Debug, Default)]
pub struct CaptureSink {
	events: Rc<RefCell<Vec<ConsoleEvent>>>,
}

impl CaptureSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<ConsoleEvent> {
		self.events.borrow().clone()
	}

	pub fn outputs(&self) -> Vec<String> {
		self.events
			.borrow()
			.iter()
			.filter_map(|event| match event {
				ConsoleEvent::Output(line) => Some(line.clone()),
				ConsoleEvent::Diagnostic(_) => None,
			})
			.collect()
	}
}

impl ConsoleSink for CaptureSink {
	fn output(&mut self, line: &str) {
		self.events.borrow_mut().push(ConsoleEvent::Output(line.to_owned()));
	}

	fn diagnostic(&mut self, diagnostic: &Diagnostic) {
		self.events.borrow_mut().push(ConsoleEvent::Diagnostic(diagnostic.clone()));
	}
}

struct ConsoleState {
	suppressed: usize,
	queue: VecDeque<ConsoleEvent>,
	sink: Box<dyn ConsoleSink>,
}

impl ConsoleState {
	fn deliver(&mut self, event: ConsoleEvent) {
		match &event {
			ConsoleEvent::Output(line) => self.sink.output(line),
			ConsoleEvent::Diagnostic(diagnostic) => self.sink.diagnostic(diagnostic),
		}
	}
}

/// Shared handle to the console. Clones refer to the same queue.
#[derive(Clone)]
pub struct Console {
	state: Rc<RefCell<ConsoleState>>,
}

impl fmt::Debug for Console {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("Console")
			.field("suppressed", &state.suppressed)
			.field("queued", &state.queue.len())
			.finish_non_exhaustive()
	}
}

impl Console {
	pub fn new(sink: impl ConsoleSink + 'static) -> Self {
		Self {
			state: Rc::new(RefCell::new(ConsoleState {
				suppressed: 0,
				queue: VecDeque::new(),
				sink: Box::new(sink),
			})),
		}
	}

	pub fn print(&self, line: impl Into<String>) {
		self.emit(ConsoleEvent::Output(line.into()));
	}

	pub fn report(&self, diagnostic: Diagnostic) {
		self.emit(ConsoleEvent::Diagnostic(diagnostic));
	}

	pub fn is_suppressed(&self) -> bool {
		self.state.borrow().suppressed > 0
	}

	/// Number of events waiting for release.
	pub fn queued(&self) -> usize {
		self.state.borrow().queue.len()
	}

	/// Queues events until the returned guard is dropped. Nests.
	pub fn suppress(&self) -> Suppression {
		self.state.borrow_mut().suppressed += 1;
		Suppression { console: self.clone() }
	}

	fn emit(&self, event: ConsoleEvent) {
		let mut state = self.state.borrow_mut();
		if state.suppressed > 0 {
			state.queue.push_back(event);
		} else {
			state.deliver(event);
		}
	}

	fn resume(&self) {
		let mut state = self.state.borrow_mut();
		state.suppressed = state.suppressed.saturating_sub(1);
		if state.suppressed > 0 {
			return;
		}
		while let Some(event) = state.queue.pop_front() {
			state.deliver(event);
		}
	}
}

/// Keeps console output queued while alive.
#[must_use = "output is only suppressed while the guard is alive"]
pub struct Suppression {
	console: Console,
}

impl fmt::Debug for Suppression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Suppression").finish_non_exhaustive()
	}
}

impl Drop for Suppression {
	fn drop(&mut self) {
		self.console.resume();
	}
}
