//! Command-line schema.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "graver")]
#[command(about = "Run scripts against a vector document")]
#[command(version)]
pub struct Cli {
	/// Directory holding graver.toml; relative script paths resolve against it
	#[arg(short, long, value_name = "DIR", global = true)]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Skip the startup scripts
	#[arg(long, global = true)]
	pub no_startup: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Run a script file, or every script under a directory
	Run {
		path: PathBuf,

		/// JSON document the scripts edit
		#[arg(short, long, value_name = "FILE")]
		document: PathBuf,
	},
	/// Run source text without caching it
	Eval {
		source: String,

		/// JSON document the script edits
		#[arg(short, long, value_name = "FILE")]
		document: PathBuf,
	},
}

impl Command {
	pub fn document(&self) -> &Path {
		match self {
			Self::Run { document, .. } | Self::Eval { document, .. } => document,
		}
	}
}
