use std::ffi::CString;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, info};
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{execvp, fork, ForkResult, Pid};

use crate::command::Command;
use crate::error::{ShErr, ShResult};
use crate::jobmode::JobMode;
use crate::reap::{self, Outcome};
use crate::redirect::{self, Stream};
use crate::signal;

/// A redirect target could not be opened.
pub const OPEN_FAILED: i32 = 1;
/// The program could not be exec'd.
pub const EXEC_FAILED: i32 = 2;

/// What the parent knows once [`launch`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
	/// Still running; it shows up later in a reap sweep.
	Background(Pid),
	Foreground(Pid, Outcome),
}

/// Fork and exec `command`.
///
/// The command runs in the background only if it asked for `&` and `mode` is
/// not foreground-only. Otherwise this blocks until the child terminates.
/// A failed fork is the only error that leaves the parent's state unknown and
/// is reported as [`ShErr::Fork`].
pub fn launch(command: &Command, mode: &JobMode) -> ShResult<Launched> {
	let background = mode.allows_background(command.background());
	if command.background() && !background {
		debug!("{}: running `{}` in the foreground", mode.state(), command.program());
	}
	let argv = command.exec_argv()?;
	signal::install_listeners()?;

	// Held until the child is accounted for, so the SIGCHLD listener can
	// neither collect a foreground child nor report a background one before
	// its pid is printed.
	let guard = reap::hold();
	match unsafe { fork() } {
		Ok(ForkResult::Child) => exec_child(command, &argv, background),
		Ok(ForkResult::Parent { child }) => {
			if background {
				let mut stdout = io::stdout().lock();
				writeln!(stdout, "background pid is {child}")?;
				stdout.flush()?;
				drop(guard);
				info!("started `{}` in the background as {child}", command.program());
				return Ok(Launched::Background(child))
			}
			let outcome = wait_for(child);
			drop(guard);
			let outcome = outcome?;
			debug!("`{}` ({child}) finished: {outcome}", command.program());
			if let Outcome::Signaled(_) = outcome {
				println!("{outcome}");
			}
			Ok(Launched::Foreground(child, outcome))
		}
		Err(e) => Err(ShErr::Fork(e)),
	}
}

fn wait_for(child: Pid) -> ShResult<Outcome> {
	loop {
		match waitpid(child, None) {
			Ok(status) => {
				if let Some((_, outcome)) = Outcome::from_wait_status(status) {
					return Ok(outcome)
				}
			}
			Err(Errno::EINTR) => continue,
			Err(e) => return Err(ShErr::errno("waitpid", e)),
		}
	}
}

/// Runs in the child: set dispositions, apply redirects, become the program.
fn exec_child(command: &Command, argv: &[CString], background: bool) -> ! {
	if let Err(e) = signal::child_dispositions(!background) {
		die(EXEC_FAILED, &format!("{}: cannot set signal dispositions", command.program()), e)
	}
	if let Some(path) = command.infile() {
		attach_or_die(path, Stream::Input);
	}
	if let Some(path) = command.outfile() {
		attach_or_die(path, Stream::Output);
	}
	match execvp(&argv[0], argv) {
		Ok(never) => match never {},
		Err(e) => die(EXEC_FAILED, command.program(), e),
	}
}

fn attach_or_die(path: &Path, stream: Stream) {
	if let Err(e) = redirect::attach(path, stream) {
		die(OPEN_FAILED, &format!("cannot open {} for {}", path.display(), stream.describe()), e)
	}
}

/// Report a child-side failure on fd 2 and leave without unwinding.
///
/// The message goes straight to the descriptor, bypassing the std handles
/// whose locks may have been held by another thread at fork time.
fn die(code: i32, context: &str, errno: Errno) -> ! {
	let msg = format!("smallsh: {context}: {}\n", errno.desc());
	let _ = nix::unistd::write(io::stderr(), msg.as_bytes());
	unsafe { libc::_exit(code) }
}
