use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{ShErr, ShResult};

/// Source of input lines for the interpreter loop.
pub trait LineReader {
	/// Show `prompt` and read one line. `None` means the input is exhausted.
	fn read_line(&mut self, prompt: &str) -> ShResult<Option<String>>;
}

/// Line editor used when stdin is a terminal.
pub struct Editor {
	rl: DefaultEditor,
	history: Option<PathBuf>,
}

impl Editor {
	pub fn new(history: Option<PathBuf>) -> ShResult<Self> {
		let mut rl = DefaultEditor::new()?;
		if let Some(path) = &history {
			if let Err(e) = rl.load_history(path) {
				debug!("no history loaded from {}: {e}", path.display());
			}
		}
		Ok(Self { rl, history })
	}
}

impl LineReader for Editor {
	fn read_line(&mut self, prompt: &str) -> ShResult<Option<String>> {
		match self.rl.readline(prompt) {
			Ok(line) => {
				if !line.trim().is_empty() {
					self.rl.add_history_entry(line.as_str())?;
				}
				Ok(Some(line))
			}
			// Ctrl-C at the prompt just abandons the line.
			Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
			Err(ReadlineError::Eof) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}
}

impl Drop for Editor {
	fn drop(&mut self) {
		if let Some(path) = &self.history {
			if let Err(e) = self.rl.save_history(path) {
				warn!("failed to save history to {}: {e}", path.display());
			}
		}
	}
}

/// Plain buffered reader for piped input. Still prints the prompt, so a
/// transcript looks the same as an interactive session.
pub struct Piped<R> {
	input: R,
}

impl<R: BufRead> Piped<R> {
	pub fn new(input: R) -> Self {
		Self { input }
	}
}

impl<R: BufRead> LineReader for Piped<R> {
	fn read_line(&mut self, prompt: &str) -> ShResult<Option<String>> {
		let mut stdout = io::stdout().lock();
		write!(stdout, "{prompt}")?;
		stdout.flush()?;
		drop(stdout);

		let mut buf = vec![];
		loop {
			match self.input.read_until(b'\n', &mut buf) {
				Ok(0) if buf.is_empty() => return Ok(None),
				Ok(_) => break,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			}
		}
		// The bytes are consumed either way, so a bad line only costs itself.
		let mut line = String::from_utf8(buf).map_err(|_| ShErr::Encoding)?;
		let trimmed = line.trim_end_matches(['\n', '\r']).len();
		line.truncate(trimmed);
		Ok(Some(line))
	}
}
