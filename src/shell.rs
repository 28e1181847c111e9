use log::{debug, error, warn};
use nix::unistd::{getpid, Pid};

use crate::builtin::{self, Builtin, Flow};
use crate::command::{parse_line, Command, Parsed};
use crate::config::ShellConfig;
use crate::error::ShResult;
use crate::expand::expand_command;
use crate::jobmode::{JobMode, JOB_MODE};
use crate::launch::{launch, Launched};
use crate::prompt::LineReader;
use crate::reap::{self, Outcome};

/// The interpreter: reads lines, runs them, remembers how the last
/// foreground command ended.
pub struct Shell {
	config: ShellConfig,
	mode: &'static JobMode,
	pid: Pid,
	last_status: Outcome,
}

impl Shell {
	pub fn new(config: ShellConfig) -> Self {
		Self::with_mode(config, &JOB_MODE)
	}

	pub fn with_mode(config: ShellConfig, mode: &'static JobMode) -> Self {
		Self {
			config,
			mode,
			pid: getpid(),
			last_status: Outcome::default(),
		}
	}

	pub fn config(&self) -> &ShellConfig {
		&self.config
	}

	/// Outcome of the most recent foreground command.
	///
	/// Background completions and built-ins never change it.
	pub fn last_status(&self) -> Outcome {
		self.last_status
	}

	/// Parse, expand and run a single line.
	pub fn execute_line(&mut self, line: &str) -> ShResult<Flow> {
		let mut command = match parse_line(line)? {
			Parsed::Noop => return Ok(Flow::Continue),
			Parsed::Command(command) => command,
		};
		expand_command(&mut command, self.pid);
		debug!("dispatching {:?}", command);
		self.dispatch(command)
	}

	fn dispatch(&mut self, command: Command) -> ShResult<Flow> {
		match Builtin::lookup(command.program()) {
			Some(Builtin::Exit) => return Ok(Flow::Exit),
			Some(Builtin::Cd) => builtin::cd(command.args())?,
			Some(Builtin::Status) => builtin::status_to_stdout(&self.last_status)?,
			None => {
				if let Launched::Foreground(_, outcome) = launch(&command, self.mode)? {
					self.last_status = outcome;
				}
			}
		}
		Ok(Flow::Continue)
	}

	/// Run lines from `reader` until `exit` or end of input, then collect any
	/// children that have already finished.
	///
	/// Errors are reported and the loop carries on; only a fatal one
	/// (a failed fork) is returned.
	pub fn run(&mut self, reader: &mut impl LineReader) -> ShResult<()> {
		let result = self.read_eval_loop(reader);
		reap::final_sweep();
		result
	}

	fn read_eval_loop(&mut self, reader: &mut impl LineReader) -> ShResult<()> {
		loop {
			let line = match reader.read_line(&self.config.prompt) {
				Ok(Some(line)) => line,
				Ok(None) => {
					debug!("end of input");
					return Ok(())
				}
				Err(e) if e.is_bad_line() => {
					warn!("{e}");
					eprintln!("smallsh: {e}");
					continue
				}
				Err(e) => return Err(e),
			};
			match self.execute_line(&line) {
				Ok(Flow::Continue) => {}
				Ok(Flow::Exit) => return Ok(()),
				Err(e) if e.is_fatal() => {
					error!("fatal: {e}");
					return Err(e)
				}
				Err(e) => {
					warn!("{e}");
					eprintln!("smallsh: {e}");
				}
			}
		}
	}
}
