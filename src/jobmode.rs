//! Foreground-only mode.
//!
//! A single flag shared between the suspend-signal listener, which flips it,
//! and the launcher, which reads it before every fork.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// The interpreter's job mode. Only the SIGTSTP listener toggles it.
pub static JOB_MODE: JobMode = JobMode::new();

const ENTER_NOTICE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_NOTICE: &[u8] = b"\nExiting foreground-only mode\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobModeState {
	BackgroundAllowed,
	ForegroundOnly,
}

impl JobModeState {
	fn notice(self) -> &'static [u8] {
		match self {
			JobModeState::ForegroundOnly => ENTER_NOTICE,
			JobModeState::BackgroundAllowed => EXIT_NOTICE,
		}
	}
}

impl fmt::Display for JobModeState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			JobModeState::BackgroundAllowed => write!(f, "background allowed"),
			JobModeState::ForegroundOnly => write!(f, "foreground only"),
		}
	}
}

#[derive(Debug, Default)]
pub struct JobMode {
	foreground_only: AtomicBool,
}

impl JobMode {
	pub const fn new() -> Self {
		Self { foreground_only: AtomicBool::new(false) }
	}

	pub fn is_foreground_only(&self) -> bool {
		self.foreground_only.load(Ordering::SeqCst)
	}

	pub fn state(&self) -> JobModeState {
		if self.is_foreground_only() {
			JobModeState::ForegroundOnly
		} else {
			JobModeState::BackgroundAllowed
		}
	}

	/// Flip the mode without announcing it.
	pub fn flip(&self) -> JobModeState {
		let was_foreground_only = self.foreground_only.fetch_xor(true, Ordering::SeqCst);
		if was_foreground_only {
			JobModeState::BackgroundAllowed
		} else {
			JobModeState::ForegroundOnly
		}
	}

	/// Flip the mode and announce the new one on stdout.
	///
	/// The notice is a static buffer handed to a single `write(2)`; nothing is
	/// formatted or allocated, so this is safe to call from a signal context.
	pub fn toggle(&self) -> JobModeState {
		let state = self.flip();
		let _ = nix::unistd::write(io::stdout(), state.notice());
		state
	}

	/// Whether a command that asked for `&` actually runs in the background.
	pub fn allows_background(&self, requested: bool) -> bool {
		requested && !self.is_foreground_only()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_with_background_allowed() {
		let mode = JobMode::new();
		assert_eq!(mode.state(), JobModeState::BackgroundAllowed);
		assert!(!mode.is_foreground_only());
	}

	#[test]
	fn two_flips_restore_the_original_state() {
		let mode = JobMode::new();
		assert_eq!(mode.flip(), JobModeState::ForegroundOnly);
		assert!(mode.is_foreground_only());
		assert_eq!(mode.flip(), JobModeState::BackgroundAllowed);
		assert_eq!(mode.state(), JobModeState::BackgroundAllowed);
	}

	#[test]
	fn foreground_only_demotes_background_requests() {
		let mode = JobMode::new();
		assert!(mode.allows_background(true));
		assert!(!mode.allows_background(false));
		mode.flip();
		assert!(!mode.allows_background(true));
		assert!(!mode.allows_background(false));
	}

	#[test]
	fn notices() {
		insta::assert_snapshot!(String::from_utf8_lossy(JobModeState::ForegroundOnly.notice()).trim(), @"Entering foreground-only mode (& is now ignored)");
		insta::assert_snapshot!(String::from_utf8_lossy(JobModeState::BackgroundAllowed.notice()).trim(), @"Exiting foreground-only mode");
	}
}
