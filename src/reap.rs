//! Collecting children and reporting how they ended.
//!
//! Foreground children are waited for by the launcher while it holds the reap
//! lock. Background children are collected by [`reap_background`], which the
//! SIGCHLD listener runs whenever a child changes state, and by
//! [`final_sweep`] when the interpreter exits.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{trace, warn};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

static REAP_LOCK: Mutex<()> = Mutex::new(());

/// How a child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Exited(i32),
	Signaled(Signal),
}

impl Outcome {
	/// Extract the terminal outcome from a wait status.
	///
	/// Stops, continues and `StillAlive` are not terminal and yield `None`.
	pub fn from_wait_status(status: WaitStatus) -> Option<(Pid, Outcome)> {
		match status {
			WaitStatus::Exited(pid, code) => Some((pid, Outcome::Exited(code))),
			WaitStatus::Signaled(pid, signal, _) => Some((pid, Outcome::Signaled(signal))),
			_ => None,
		}
	}

	/// The status a shell conventionally hands back for this outcome.
	pub fn code(&self) -> i32 {
		match self {
			Outcome::Exited(code) => *code,
			Outcome::Signaled(signal) => 128 + *signal as i32,
		}
	}
}

impl Default for Outcome {
	fn default() -> Self {
		Outcome::Exited(0)
	}
}

impl fmt::Display for Outcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Outcome::Exited(code) => write!(f, "exit value {code}"),
			Outcome::Signaled(signal) => write!(f, "terminated by signal {} ({})", *signal as i32, signal.as_str()),
		}
	}
}

/// Holding this keeps every sweep from calling `waitpid`.
///
/// The launcher takes it before forking so a foreground child's status can
/// only be collected by the launcher itself.
pub struct ReapGuard {
	_guard: MutexGuard<'static, ()>,
}

pub fn hold() -> ReapGuard {
	let _guard = REAP_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
	ReapGuard { _guard }
}

/// Collect every child that has already terminated, without blocking.
///
/// Callers are expected to hold a [`ReapGuard`].
pub fn sweep(_guard: &ReapGuard) -> Vec<(Pid, Outcome)> {
	let mut reaped = vec![];
	loop {
		match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
			Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
			Ok(status) => {
				trace!("sweep collected {:?}", status);
				if let Some(done) = Outcome::from_wait_status(status) {
					reaped.push(done);
				}
			}
			Err(Errno::EINTR) => continue,
			Err(e) => {
				warn!("waitpid failed during sweep: {e}");
				break
			}
		}
	}
	reaped
}

pub fn background_report(pid: Pid, outcome: Outcome) -> String {
	format!("background pid {pid} is done: {outcome}")
}

fn report_all(reaped: Vec<(Pid, Outcome)>) {
	if reaped.is_empty() {
		return
	}
	let mut stdout = io::stdout().lock();
	for (pid, outcome) in reaped {
		let _ = writeln!(stdout, "{}", background_report(pid, outcome));
	}
	let _ = stdout.flush();
}

/// Collect and report finished background children.
pub fn reap_background() {
	let guard = hold();
	report_all(sweep(&guard));
}

/// One last non-blocking pass before the interpreter exits. Returns what it
/// reported.
pub fn final_sweep() -> Vec<(Pid, Outcome)> {
	let guard = hold();
	let reaped = sweep(&guard);
	trace!("final sweep collected {} children", reaped.len());
	report_all(reaped.clone());
	reaped
}
