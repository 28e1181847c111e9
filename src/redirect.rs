use std::os::fd::RawFd;
use std::path::Path;

use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};

/// Which standard stream a redirect target replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
	Input,
	Output,
}

impl Stream {
	pub fn fd(self) -> RawFd {
		match self {
			Stream::Input => STDIN_FILENO,
			Stream::Output => STDOUT_FILENO,
		}
	}

	fn flags(self) -> OFlag {
		match self {
			Stream::Input => OFlag::O_RDONLY,
			Stream::Output => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
		}
	}

	pub fn describe(self) -> &'static str {
		match self {
			Stream::Input => "input",
			Stream::Output => "output",
		}
	}
}

/// Open a redirect target the way `stream` needs it.
///
/// Output targets are created with mode 0644 when missing and truncated when present.
pub fn open_target(path: &Path, stream: Stream) -> nix::Result<RawFd> {
	open(path, stream.flags(), Mode::from_bits_truncate(0o644))
}

/// Open `path` and make it the process's `stream`.
///
/// Only the standard descriptor survives; the temporary one is closed, so
/// nothing extra leaks into the program that is exec'd next.
pub fn attach(path: &Path, stream: Stream) -> nix::Result<()> {
	let fd = open_target(path, stream)?;
	if fd != stream.fd() {
		dup2(fd, stream.fd())?;
		close(fd)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	#[test]
	fn output_targets_are_created_then_truncated() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.txt");

		let fd = open_target(&path, Stream::Output).unwrap();
		nix::unistd::write(unsafe { std::os::fd::BorrowedFd::borrow_raw(fd) }, b"first run\n").unwrap();
		close(fd).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "first run\n");

		let fd = open_target(&path, Stream::Output).unwrap();
		close(fd).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "");
	}

	#[test]
	fn missing_input_target_fails() {
		let dir = tempfile::tempdir().unwrap();
		let err = open_target(&dir.path().join("nope"), Stream::Input).unwrap_err();
		assert_eq!(err, nix::errno::Errno::ENOENT);
	}

	#[test]
	fn input_targets_are_read_only() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("in.txt");
		fs::write(&path, "data").unwrap();
		let fd = open_target(&path, Stream::Input).unwrap();
		let written = nix::unistd::write(unsafe { std::os::fd::BorrowedFd::borrow_raw(fd) }, b"x");
		assert_eq!(written, Err(nix::errno::Errno::EBADF));
		close(fd).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "data");
	}
}
