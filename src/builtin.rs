use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use log::debug;

use crate::error::{ShErr, ShResult};
use crate::reap::Outcome;

/// Commands handled inside the interpreter instead of being exec'd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
	Exit,
	Cd,
	Status,
}

/// Whether the loop keeps reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Exit,
}

impl Builtin {
	pub fn lookup(name: &str) -> Option<Self> {
		match name {
			"exit" => Some(Builtin::Exit),
			"cd" => Some(Builtin::Cd),
			"status" => Some(Builtin::Status),
			_ => None,
		}
	}
}

/// `cd [dir]`. With no argument, go to `$HOME`.
pub fn cd(args: &[String]) -> ShResult<()> {
	let target = match args {
		[] => env::var_os("HOME")
			.map(PathBuf::from)
			.ok_or_else(|| ShErr::usage("cd: HOME not set"))?,
		[dir] => PathBuf::from(dir),
		_ => return Err(ShErr::usage("cd: too many arguments")),
	};
	debug!("changing directory to {}", target.display());
	env::set_current_dir(&target).map_err(|source| ShErr::Chdir { path: target, source })
}

/// `status`: how the last foreground command ended.
pub fn status(last: &Outcome, out: &mut impl Write) -> ShResult<()> {
	writeln!(out, "{last}")?;
	out.flush()?;
	Ok(())
}

pub fn status_to_stdout(last: &Outcome) -> ShResult<()> {
	status(last, &mut io::stdout().lock())
}

#[cfg(test)]
mod tests {
	use nix::sys::signal::Signal;

	use super::*;

	#[test]
	fn lookup_knows_only_three_names() {
		assert_eq!(Builtin::lookup("exit"), Some(Builtin::Exit));
		assert_eq!(Builtin::lookup("cd"), Some(Builtin::Cd));
		assert_eq!(Builtin::lookup("status"), Some(Builtin::Status));
		assert_eq!(Builtin::lookup("echo"), None);
		assert_eq!(Builtin::lookup("Exit"), None);
	}

	#[test]
	fn cd_with_too_many_arguments_changes_nothing() {
		let before = env::current_dir().unwrap();
		let err = cd(&["/".to_string(), "/tmp".to_string()]).unwrap_err();
		assert!(matches!(err, ShErr::Usage(_)));
		insta::assert_snapshot!(err.to_string(), @"cd: too many arguments");
		assert_eq!(env::current_dir().unwrap(), before);
	}

	#[test]
	fn cd_to_missing_directory_reports_the_path() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("missing");
		let err = cd(&[missing.display().to_string()]).unwrap_err();
		assert!(matches!(err, ShErr::Chdir { .. }));
		assert!(err.to_string().starts_with(&format!("cd: {}: ", missing.display())));
	}

	#[test]
	fn status_prints_the_outcome() {
		let mut out = vec![];
		status(&Outcome::Exited(0), &mut out).unwrap();
		status(&Outcome::Signaled(Signal::SIGKILL), &mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "exit value 0\nterminated by signal 9 (SIGKILL)\n");
	}
}
