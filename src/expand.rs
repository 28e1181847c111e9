use nix::unistd::Pid;

use crate::command::Command;

pub const PID_MARKER: &str = "$$";

/// Replace every `$$` in `word` with `pid`, scanning left to right.
///
/// `$$$` becomes `<pid>$`; no other character is touched.
pub fn expand_pid(word: &str, pid: Pid) -> String {
	if !word.contains(PID_MARKER) {
		return word.to_string()
	}
	word.replace(PID_MARKER, &pid.to_string())
}

/// Expand the pid marker in every word of `command`, including argument zero
/// and both redirect targets.
pub fn expand_command(command: &mut Command, pid: Pid) {
	command.map_words(|word| expand_pid(word, pid));
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;
	use crate::command::{parse_line, Parsed};

	const PID: Pid = Pid::from_raw(4242);

	#[test]
	fn replaces_every_occurrence() {
		assert_eq!(expand_pid("$$", PID), "4242");
		assert_eq!(expand_pid("a$$b$$c", PID), "a4242b4242c");
		assert_eq!(expand_pid("$$$$", PID), "42424242");
		assert_eq!(expand_pid("$$$", PID), "4242$");
	}

	#[test]
	fn leaves_other_text_alone() {
		for word in ["", "$", "a$b", "$HOME", "plain"] {
			assert_eq!(expand_pid(word, PID), word);
		}
	}

	#[test]
	fn expansion_is_idempotent_once_markers_are_gone() {
		let once = expand_pid("dir-$$/file", PID);
		assert_eq!(expand_pid(&once, PID), once);
	}

	#[test]
	fn expands_program_args_and_targets() {
		let Parsed::Command(mut cmd) = parse_line("run$$ -p $$ < in.$$ > out.$$").unwrap() else {
			panic!("expected a command")
		};
		expand_command(&mut cmd, PID);
		assert_eq!(cmd.argv(), ["run4242", "-p", "4242"]);
		assert_eq!(cmd.infile(), Some(Path::new("in.4242")));
		assert_eq!(cmd.outfile(), Some(Path::new("out.4242")));
	}
}
