use std::ffi::CString;
use std::path::Path;

use log::trace;

use crate::error::{ShErr, ShResult};

/// One parsed input line.
///
/// `argv[0]` is the program name. The descriptor is handed by value to the
/// dispatcher, so it never lives past the loop iteration that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	argv: Vec<String>,
	infile: Option<String>,
	outfile: Option<String>,
	background: bool,
}

/// What a line turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
	/// Blank line or `#` comment; nothing runs this cycle.
	Noop,
	Command(Command),
}

impl Command {
	pub fn new(program: impl Into<String>) -> Self {
		Self {
			argv: vec![program.into()],
			infile: None,
			outfile: None,
			background: false,
		}
	}

	pub fn program(&self) -> &str {
		&self.argv[0]
	}

	pub fn argv(&self) -> &[String] {
		&self.argv
	}

	/// Arguments after the program name.
	pub fn args(&self) -> &[String] {
		&self.argv[1..]
	}

	pub fn infile(&self) -> Option<&Path> {
		self.infile.as_deref().map(Path::new)
	}

	pub fn outfile(&self) -> Option<&Path> {
		self.outfile.as_deref().map(Path::new)
	}

	/// Whether the line asked for `&`. The job mode decides if it is honored.
	pub fn background(&self) -> bool {
		self.background
	}

	/// Rewrite every word of the descriptor in place: arguments and redirect targets.
	pub fn map_words(&mut self, mut f: impl FnMut(&str) -> String) {
		for arg in self.argv.iter_mut() {
			*arg = f(arg);
		}
		for target in [&mut self.infile, &mut self.outfile].into_iter().flatten() {
			*target = f(target);
		}
	}

	/// The NUL-terminated argument vector handed to `execvp`.
	pub fn exec_argv(&self) -> ShResult<Vec<CString>> {
		self.argv
			.iter()
			.map(|arg| CString::new(arg.as_str()).map_err(|_| ShErr::syntax(format!("argument `{}` contains a NUL byte", arg.escape_debug()))))
			.collect()
	}
}

/// Turn one line of input into a [`Command`].
///
/// Words are split on whitespace. The first word is always the program, and
/// a first word starting with `#` makes the whole line a comment.
/// `<` and `>` take the following word as a redirect target and `&` as the
/// final word requests background execution. A line is rejected when a
/// redirect has no target, when a stream is redirected twice, or when `&` is
/// followed by anything.
pub fn parse_line(line: &str) -> ShResult<Parsed> {
	let mut words = line.split_ascii_whitespace().peekable();
	let Some(program) = words.next().filter(|word| !word.starts_with('#')) else {
		return Ok(Parsed::Noop)
	};

	let mut command = Command::new(program);
	while let Some(word) = words.next() {
		match word {
			">" => {
				let target = words.next().ok_or_else(|| ShErr::syntax("expected a file after `>`"))?;
				if command.outfile.replace(target.to_string()).is_some() {
					return Err(ShErr::syntax("output redirected more than once"))
				}
			}
			"<" => {
				let target = words.next().ok_or_else(|| ShErr::syntax("expected a file after `<`"))?;
				if command.infile.replace(target.to_string()).is_some() {
					return Err(ShErr::syntax("input redirected more than once"))
				}
			}
			"&" => {
				if words.peek().is_some() {
					return Err(ShErr::syntax("`&` is only allowed at the end of a line"))
				}
				command.background = true;
			}
			_ => command.argv.push(word.to_string()),
		}
	}
	trace!("parsed {:?}", command);
	Ok(Parsed::Command(command))
}
