use std::{io, path::PathBuf};

use nix::errno::Errno;
use rustyline::error::ReadlineError;
use thiserror::Error;

pub type ShResult<T> = Result<T, ShErr>;

/// Everything that can go wrong between reading a line and reporting its outcome.
///
/// Only [`ShErr::Fork`] is fatal; every other variant is printed by the loop,
/// which then prompts again.
#[derive(Debug, Error)]
pub enum ShErr {
	#[error("syntax error: {0}")]
	Syntax(String),

	#[error("{0}")]
	Usage(String),

	#[error("cd: {}: {source}", .path.display())]
	Chdir { path: PathBuf, source: io::Error },

	#[error("{context}: {}", .errno.desc())]
	Errno { context: String, errno: Errno },

	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	/// A line of input that could not be decoded. The rest of the input is still readable.
	#[error("input line is not valid UTF-8")]
	Encoding,

	#[error("unable to fork: {}", .0.desc())]
	Fork(Errno),

	#[error("readline error: {0}")]
	Readline(#[from] ReadlineError),
}

impl ShErr {
	pub fn syntax(msg: impl Into<String>) -> Self {
		Self::Syntax(msg.into())
	}

	pub fn usage(msg: impl Into<String>) -> Self {
		Self::Usage(msg.into())
	}

	pub fn errno(context: impl Into<String>, errno: Errno) -> Self {
		Self::Errno { context: context.into(), errno }
	}

	/// Failing to duplicate the interpreter leaves nothing to fall back on.
	pub fn is_fatal(&self) -> bool {
		matches!(self, ShErr::Fork(_))
	}

	/// The reader lost one line but can go on reading.
	pub fn is_bad_line(&self) -> bool {
		match self {
			ShErr::Encoding => true,
			ShErr::Io(e) | ShErr::Readline(ReadlineError::Io(e)) => e.kind() == io::ErrorKind::InvalidData,
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_fork_failures_are_fatal() {
		assert!(ShErr::Fork(Errno::EAGAIN).is_fatal());
		assert!(!ShErr::syntax("x").is_fatal());
		assert!(!ShErr::usage("cd: too many arguments").is_fatal());
		assert!(!ShErr::errno("waitpid", Errno::ECHILD).is_fatal());
		assert!(!ShErr::Encoding.is_fatal());
	}

	#[test]
	fn undecodable_lines_are_skippable() {
		assert!(ShErr::Encoding.is_bad_line());
		assert!(ShErr::from(io::Error::from(io::ErrorKind::InvalidData)).is_bad_line());
		assert!(!ShErr::from(io::Error::from(io::ErrorKind::BrokenPipe)).is_bad_line());
		assert!(!ShErr::syntax("x").is_bad_line());
	}

	#[test]
	fn messages() {
		insta::assert_snapshot!(ShErr::syntax("expected a file after `>`").to_string(), @"syntax error: expected a file after `>`");
		insta::assert_snapshot!(ShErr::errno("waitpid", Errno::ECHILD).to_string(), @"waitpid: No child processes");
	}
}
