use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = ": ";
pub const HISTORY_FILE_NAME: &str = ".smallsh_history";

/// Settings the interpreter is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
	pub prompt: String,
	/// Where the line editor keeps history. Only used when interactive.
	pub history: Option<PathBuf>,
	/// Read lines with the line editor instead of plain buffered stdin.
	pub interactive: bool,
}

impl ShellConfig {
	pub fn interactive(history: Option<PathBuf>) -> Self {
		Self {
			interactive: true,
			history,
			..Self::default()
		}
	}

	pub fn noninteractive() -> Self {
		Self::default()
	}

	pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
		self.prompt = prompt.into();
		self
	}
}

impl Default for ShellConfig {
	fn default() -> Self {
		Self {
			prompt: DEFAULT_PROMPT.to_string(),
			history: None,
			interactive: false,
		}
	}
}

/// `$HOME/.smallsh_history`, if `HOME` is set.
pub fn default_history_path() -> Option<PathBuf> {
	std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE_NAME))
}
