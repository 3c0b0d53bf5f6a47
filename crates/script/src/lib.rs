//! Script execution layer for graver.
//!
//! The interpreter itself is a [`ScriptBackend`]; this crate owns everything
//! around it: compiled-unit caching keyed by source path and modification time,
//! console buffering while a script runs, and the [`Engine`] run loop that flushes
//! the document's pending edits after every top-level run.

pub mod backend;
pub mod cache;
pub mod console;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod fs;
#[cfg(test)]
mod testing;

pub use backend::ScriptBackend;
pub use cache::ScriptCache;
pub use console::{CaptureSink, Console, ConsoleEvent, ConsoleSink, StdioSink, Suppression};
pub use config::{CONFIG_FILE_NAME, ConfigError, EngineConfig};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use engine::{BatchReport, Engine, EngineError, RunOutcome};
pub use fs::{OsFs, SourceEntry, SourceFs};
