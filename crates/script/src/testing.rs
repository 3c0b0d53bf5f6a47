//! Fakes shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use graver_document::{CommitError, FlushStats, MemoryDocument, Session, StoredItem};
use graver_primitives::{Color, ItemId};

use crate::backend::ScriptBackend;
use crate::console::Console;
use crate::diagnostic::Diagnostic;
use crate::fs::{SourceEntry, SourceFs};

/// In-memory [`SourceFs`] with explicit modification times.
#[derive(Default)]
pub(crate) struct FakeFs {
	files: RefCell<BTreeMap<PathBuf, (String, SystemTime)>>,
}

impl FakeFs {
	pub(crate) fn write(&self, path: &str, source: &str, secs: u64) {
		self.files
			.borrow_mut()
			.insert(PathBuf::from(path), (source.to_owned(), UNIX_EPOCH + Duration::from_secs(secs)));
	}

	fn not_found() -> io::Error {
		io::Error::new(io::ErrorKind::NotFound, "no such file")
	}
}

impl SourceFs for FakeFs {
	fn read_to_string(&self, path: &Path) -> io::Result<String> {
		self.files.borrow().get(path).map(|(source, _)| source.clone()).ok_or_else(Self::not_found)
	}

	fn modified(&self, path: &Path) -> io::Result<SystemTime> {
		self.files.borrow().get(path).map(|(_, modified)| *modified).ok_or_else(Self::not_found)
	}

	fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>> {
		if !self.is_dir(path) {
			return Err(Self::not_found());
		}
		let mut entries: Vec<SourceEntry> = Vec::new();
		for file in self.files.borrow().keys() {
			let Ok(rest) = file.strip_prefix(path) else {
				continue;
			};
			let mut components = rest.components();
			let Some(first) = components.next() else {
				continue;
			};
			let entry = SourceEntry {
				path: path.join(first),
				is_dir: components.next().is_some(),
			};
			if !entries.contains(&entry) {
				entries.push(entry);
			}
		}
		// Unordered on purpose: the engine sorts.
		entries.reverse();
		Ok(entries)
	}

	fn is_dir(&self, path: &Path) -> bool {
		self.files.borrow().keys().any(|file| file != path && file.starts_with(path))
	}
}

#[derive(Clone, Debug)]
pub(crate) enum Command {
	Print(String),
	/// Sets the fill of an item to a gray level.
	Fill(u64, f32),
	Fail(String),
	Let(String, String),
	Echo(String),
}

#[derive(Debug)]
pub(crate) struct LineUnit {
	pub(crate) source_name: String,
	pub(crate) commands: Vec<(usize, Command)>,
}

/// A line-oriented toy language over a [`Session`] with items 1 to 3.
pub(crate) struct LineBackend {
	pub(crate) session: Session<MemoryDocument>,
	pub(crate) console: Option<Console>,
	pub(crate) compiles: Rc<Cell<usize>>,
}

impl LineBackend {
	pub(crate) fn new() -> Self {
		let mut document = MemoryDocument::new();
		for id in 1..=3 {
			document.insert(ItemId(id), StoredItem::default());
		}
		Self {
			session: Session::new(document),
			console: None,
			compiles: Rc::default(),
		}
	}

	pub(crate) fn fill_of(&self, id: u64) -> Option<Color> {
		self.session.native().item(ItemId(id)).and_then(|item| item.style.fill.color)
	}
}

impl ScriptBackend for LineBackend {
	type Unit = LineUnit;
	type Scope = BTreeMap<String, String>;

	fn compile(&mut self, source: &str, source_name: &str) -> Result<LineUnit, Diagnostic> {
		self.compiles.set(self.compiles.get() + 1);
		let mut commands = Vec::new();
		for (index, line) in source.lines().enumerate() {
			let line_no = index + 1;
			let words: Vec<&str> = line.split_whitespace().collect();
			let command = match words.as_slice() {
				[] => continue,
				["print", rest @ ..] => Command::Print(rest.join(" ")),
				["fill", id, gray] => match (id.parse(), gray.parse()) {
					(Ok(id), Ok(gray)) => Command::Fill(id, gray),
					_ => return Err(Diagnostic::compile(source_name, "bad fill arguments").at(Some(line_no), Some(1))),
				},
				["fail", rest @ ..] => Command::Fail(rest.join(" ")),
				["let", name, value] => Command::Let((*name).to_owned(), (*value).to_owned()),
				["echo", name] => Command::Echo((*name).to_owned()),
				[other, ..] => {
					return Err(Diagnostic::compile(source_name, format!("unknown command `{other}`")).at(Some(line_no), Some(1)));
				}
			};
			commands.push((line_no, command));
		}
		Ok(LineUnit {
			source_name: source_name.to_owned(),
			commands,
		})
	}

	fn new_scope(&mut self) -> Self::Scope {
		BTreeMap::new()
	}

	fn execute(&mut self, unit: &LineUnit, scope: &mut Self::Scope) -> Result<(), Diagnostic> {
		let error = |line: usize, message: String| Diagnostic::runtime(&unit.source_name, message).at(Some(line), None);
		for (line, command) in &unit.commands {
			match command {
				Command::Print(text) => {
					if let Some(console) = &self.console {
						console.print(text.clone());
					}
				}
				Command::Fill(id, gray) => {
					let item = self.session.item(ItemId(*id)).ok_or_else(|| error(*line, format!("no item {id}")))?;
					self.session
						.write(&item.style(), |style| style.fill.color = Some(Color::gray(*gray)))
						.map_err(|native| error(*line, native.to_string()))?;
				}
				Command::Fail(message) => return Err(error(*line, message.clone())),
				Command::Let(name, value) => {
					scope.insert(name.clone(), value.clone());
				}
				Command::Echo(name) => {
					let value = scope.get(name).cloned().ok_or_else(|| error(*line, format!("`{name}` is not defined")))?;
					if let Some(console) = &self.console {
						console.print(value);
					}
				}
			}
		}
		Ok(())
	}

	fn attach_console(&mut self, console: Console) {
		self.console = Some(console);
	}

	fn flush(&mut self) -> Result<FlushStats, CommitError> {
		self.session.flush()
	}
}
