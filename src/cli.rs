// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Command-line runner shared by the per-day executables.

use std::{fmt::Display, io, path::PathBuf, process::ExitCode};
use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::debug;


#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Challenge {
	#[value(name = "1")]
	First,
	#[value(name = "2")]
	Second,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogLevel {
	Debug,
	Info,
	#[default]
	Warn,
	Error,
	Silent,
}

impl LogLevel {
	fn to_tracing_level(self) -> Option<tracing::Level> {
		match self {
			LogLevel::Debug => Some(tracing::Level::DEBUG),
			LogLevel::Info => Some(tracing::Level::INFO),
			LogLevel::Warn => Some(tracing::Level::WARN),
			LogLevel::Error => Some(tracing::Level::ERROR),
			LogLevel::Silent => None,
		}
	}
}

#[derive(Debug, Parser)]
#[command(about)]
struct Cli {
	/// Challenge to run (1 or 2)
	#[arg(value_enum)]
	challenge_num: Challenge,

	/// Input file
	filename: PathBuf,

	/// Diagnostics written to standard error
	#[arg(long, short, value_enum, default_value_t)]
	log_level: LogLevel,
}


#[derive(Debug, Error)]
pub enum RunError<E: std::error::Error + 'static> {
	#[error("unable to read {}: {source}", path.display())]
	Io { path: PathBuf, #[source] source: io::Error },
	#[error(transparent)]
	Solve(E),
}

fn setup_tracing(log_level: LogLevel) {
	if let Some(level) = log_level.to_tracing_level() {
		tracing_subscriber::fmt()
			.with_max_level(level)
			.with_writer(io::stderr)
			.without_time()
			.compact()
			.init();
	}
}

fn try_run<A, E, F>(cli: &Cli, solve: F) -> Result<A, RunError<E>>
where E: std::error::Error + 'static, F: FnOnce(Challenge, &str) -> Result<A, E> {
	let input = std::fs::read_to_string(&cli.filename)
		.map_err(|source| RunError::Io { path: cli.filename.clone(), source })?;
	debug!(bytes = input.len(), "read {}", cli.filename.display());
	solve(cli.challenge_num, &input).map_err(RunError::Solve)
}

/// Parses the command line, solves the requested challenge for the given
/// input file and prints `Answer: <n>`. Errors go to standard error and
/// yield a failing exit code.
pub fn run<A, E, F>(solve: F) -> ExitCode
where A: Display, E: std::error::Error + 'static, F: FnOnce(Challenge, &str) -> Result<A, E> {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(e) => {
			// Help output is not a failure; usage errors are, with code 1 rather than clap’s 2
			let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
			_ = e.print();
			return code
		}
	};
	setup_tracing(cli.log_level);
	debug!("parsed arguments: {cli:?}");

	match try_run(&cli, solve) {
		Ok(answer) => {
			println!("Answer: {answer}");
			ExitCode::SUCCESS
		}
		Err(e) => {
			eprintln!("[ERROR] {e}");
			ExitCode::FAILURE
		}
	}
}
