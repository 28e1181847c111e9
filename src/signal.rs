//! Signal dispositions for the interpreter and its children.
//!
//! The interpreter ignores SIGINT for its whole life. SIGCHLD and SIGTSTP are
//! caught by signal-hook, which only writes to a self-pipe inside the real
//! handler; the reaping and the mode toggle then run on listener threads,
//! outside of any signal context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::{debug, error, trace};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use signal_hook::consts::signal::{SIGCHLD, SIGTSTP};
use signal_hook::iterator::Signals;

use crate::error::{ShErr, ShResult};
use crate::jobmode::JOB_MODE;
use crate::reap;

static LISTENERS_INSTALLED: AtomicBool = AtomicBool::new(false);

fn set_disposition(signal: Signal, handler: SigHandler) -> nix::Result<()> {
	let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
	// SIG_IGN and SIG_DFL carry no handler code, so swapping them in is sound.
	unsafe { sigaction(signal, &action) }?;
	Ok(())
}

/// Make the interpreter immune to Ctrl-C.
pub fn ignore_interrupts() -> ShResult<()> {
	set_disposition(Signal::SIGINT, SigHandler::SigIgn).map_err(|e| ShErr::errno("sigaction(SIGINT)", e))
}

/// Dispositions a freshly forked child sets up before exec.
///
/// A foreground child gets the default SIGINT back so Ctrl-C reaches it; a
/// background child keeps the inherited ignore. No child ever reacts to the
/// suspend signal, which belongs to the interpreter alone.
pub fn child_dispositions(foreground: bool) -> nix::Result<()> {
	if foreground {
		set_disposition(Signal::SIGINT, SigHandler::SigDfl)?;
	}
	set_disposition(Signal::SIGTSTP, SigHandler::SigIgn)
}

/// Start the SIGCHLD and SIGTSTP listeners. Safe to call any number of times.
///
/// They run on separate threads: the reaper may block on the reap lock while
/// a foreground child runs, and the mode toggle must still answer Ctrl-Z then.
pub fn install_listeners() -> ShResult<()> {
	if LISTENERS_INSTALLED.swap(true, Ordering::SeqCst) {
		return Ok(())
	}
	if let Err(e) = spawn_listeners() {
		LISTENERS_INSTALLED.store(false, Ordering::SeqCst);
		return Err(e)
	}
	debug!("signal listeners installed");
	Ok(())
}

fn spawn_listeners() -> ShResult<()> {
	let mut completions = Signals::new([SIGCHLD])?;
	let mut suspends = Signals::new([SIGTSTP])?;

	thread::Builder::new()
		.name("sigchld".into())
		.spawn(move || {
			for _ in completions.forever() {
				trace!("SIGCHLD received");
				reap::reap_background();
			}
			error!("SIGCHLD listener stopped");
		})?;

	thread::Builder::new()
		.name("sigtstp".into())
		.spawn(move || {
			for _ in suspends.forever() {
				let state = JOB_MODE.toggle();
				debug!("job mode is now {state}");
			}
			error!("SIGTSTP listener stopped");
		})?;

	Ok(())
}
