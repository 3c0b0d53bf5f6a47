//! graver command-line entry point.

mod app;
mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use graver_script::StdioSink;

fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let summary = app::execute(&cli, StdioSink)?;
	Ok(if summary.report.is_success() {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}

/// Logs to stderr so script output on stdout stays clean.
fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("GRAVER_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("graver=debug,graver_script=debug,graver_document=debug,graver_rhai=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
