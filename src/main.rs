use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{debug, error, LevelFilter};

use smallsh::config::{default_history_path, ShellConfig, DEFAULT_PROMPT};
use smallsh::prompt::{Editor, Piped};
use smallsh::{reap, signal, ShResult, Shell};

const LOG_ENV: &str = "SMALLSH_LOG";

#[derive(Debug, Parser)]
#[command(name = "smallsh", version, about = "A small shell with background jobs and a foreground-only mode")]
struct Args {
	/// Run a single line and exit.
	#[arg(short, long, value_name = "LINE")]
	command: Option<String>,

	/// Prompt shown before each line.
	#[arg(long, default_value = DEFAULT_PROMPT)]
	prompt: String,

	/// History file for the interactive editor. Defaults to ~/.smallsh_history.
	#[arg(long, value_name = "PATH")]
	history: Option<PathBuf>,

	/// Do not load or save history.
	#[arg(long, conflicts_with = "history")]
	no_history: bool,

	/// Log level. Falls back to $SMALLSH_LOG, then `warn`.
	#[arg(long, value_enum, value_name = "LEVEL")]
	log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

impl From<LogLevel> for LevelFilter {
	fn from(level: LogLevel) -> Self {
		match level {
			LogLevel::Error => LevelFilter::Error,
			LogLevel::Warn => LevelFilter::Warn,
			LogLevel::Info => LevelFilter::Info,
			LogLevel::Debug => LevelFilter::Debug,
			LogLevel::Trace => LevelFilter::Trace,
		}
	}
}

fn init_logger(level: Option<LogLevel>) {
	let mut builder = env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn"));
	if let Some(level) = level {
		builder.filter_level(level.into());
	}
	builder.format_timestamp(None).init();
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_logger(args.log_level);
	debug!("{:?}", args);

	match run(args) {
		Ok(code) => ExitCode::from(code),
		Err(e) => {
			error!("{e}");
			eprintln!("smallsh: {e}");
			ExitCode::FAILURE
		}
	}
}

fn run(args: Args) -> ShResult<u8> {
	signal::ignore_interrupts()?;
	signal::install_listeners()?;

	if let Some(line) = args.command {
		let mut shell = Shell::new(ShellConfig::noninteractive().with_prompt(args.prompt));
		let result = shell.execute_line(&line);
		reap::final_sweep();
		result?;
		return Ok(shell.last_status().code() as u8)
	}

	let config = if io::stdin().is_terminal() {
		let history = if args.no_history { None } else { args.history.or_else(default_history_path) };
		ShellConfig::interactive(history)
	} else {
		ShellConfig::noninteractive()
	};
	let mut shell = Shell::new(config.with_prompt(args.prompt));
	if shell.config().interactive {
		let mut editor = Editor::new(shell.config().history.clone())?;
		shell.run(&mut editor)?;
	} else {
		shell.run(&mut Piped::new(io::stdin().lock()))?;
	}
	Ok(0)
}
