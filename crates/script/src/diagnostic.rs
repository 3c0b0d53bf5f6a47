//! Structured compile and runtime errors.

use std::fmt;
use std::io;

/// Which stage produced a [`Diagnostic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
	Compile,
	Runtime,
	Io,
}

impl DiagnosticKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Compile => "compile",
			Self::Runtime => "runtime",
			Self::Io => "io",
		}
	}
}

impl fmt::Display for DiagnosticKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A recoverable script failure, reported on the diagnostics stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
	pub kind: DiagnosticKind,
	pub source_name: String,
	/// One-based, if the backend knows it.
	pub line: Option<usize>,
	pub column: Option<usize>,
	pub message: String,
}

impl Diagnostic {
	pub fn new(kind: DiagnosticKind, source_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			kind,
			source_name: source_name.into(),
			line: None,
			column: None,
			message: message.into(),
		}
	}

	pub fn compile(source_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(DiagnosticKind::Compile, source_name, message)
	}

	pub fn runtime(source_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(DiagnosticKind::Runtime, source_name, message)
	}

	pub fn io(source_name: impl Into<String>, error: &io::Error) -> Self {
		Self::new(DiagnosticKind::Io, source_name, error.to_string())
	}

	pub fn at(mut self, line: Option<usize>, column: Option<usize>) -> Self {
		self.line = line;
		self.column = column;
		self
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source_name)?;
		if let Some(line) = self.line {
			write!(f, ":{line}")?;
			if let Some(column) = self.column {
				write!(f, ",{column}")?;
			}
		}
		write!(f, ": {} error: {}", self.kind, self.message)
	}
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_includes_known_position() {
		let diagnostic = Diagnostic::runtime("scripts/a.rhai", "boom").at(Some(3), Some(7));
		assert_eq!(diagnostic.to_string(), "scripts/a.rhai:3,7: runtime error: boom");
	}

	#[test]
	fn display_omits_unknown_position() {
		let diagnostic = Diagnostic::compile("console", "unexpected end of input");
		assert_eq!(diagnostic.to_string(), "console: compile error: unexpected end of input");

		let line_only = Diagnostic::compile("console", "bad token").at(Some(2), None);
		assert_eq!(line_only.to_string(), "console:2: compile error: bad token");
	}
}
